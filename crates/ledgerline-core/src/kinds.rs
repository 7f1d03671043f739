use std::fmt;

use serde::{Deserialize, Serialize};

use crate::models::{AccountType, TaxGroupKind};

/// The account slots a product or category can carry.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[serde(rename_all = "snake_case")]
pub enum AccountKind {
    Expense,
    Revenue,
    Depreciation,
    Asset,
}

impl AccountKind {
    pub const ALL: [AccountKind; 4] = [
        AccountKind::Expense,
        AccountKind::Revenue,
        AccountKind::Depreciation,
        AccountKind::Asset,
    ];

    pub fn label(self) -> &'static str {
        match self {
            AccountKind::Expense => "expense",
            AccountKind::Revenue => "revenue",
            AccountKind::Depreciation => "depreciation",
            AccountKind::Asset => "asset",
        }
    }

    /// Column / field name the value is stored under.
    pub fn field_name(self) -> &'static str {
        match self {
            AccountKind::Expense => "account_expense",
            AccountKind::Revenue => "account_revenue",
            AccountKind::Depreciation => "account_depreciation",
            AccountKind::Asset => "account_asset",
        }
    }

    pub fn from_field_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|kind| kind.field_name() == name)
    }

    /// Name of the account type flag this slot requires.
    pub fn required_type(self) -> &'static str {
        match self {
            AccountKind::Expense => "expense",
            AccountKind::Revenue => "revenue",
            AccountKind::Depreciation | AccountKind::Asset => "fixed_asset",
        }
    }

    pub fn accepts(self, kind: &AccountType) -> bool {
        match self {
            AccountKind::Expense => kind.expense,
            AccountKind::Revenue => kind.revenue,
            AccountKind::Depreciation | AccountKind::Asset => kind.fixed_asset,
        }
    }
}

impl fmt::Display for AccountKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum TaxKind {
    Customer,
    Supplier,
}

impl TaxKind {
    pub fn label(self) -> &'static str {
        match self {
            TaxKind::Customer => "customer",
            TaxKind::Supplier => "supplier",
        }
    }

    /// Taxes without a group are accepted on both sides.
    pub fn accepts_group(self, group: Option<TaxGroupKind>) -> bool {
        match (self, group) {
            (_, None) | (_, Some(TaxGroupKind::Both)) => true,
            (TaxKind::Customer, Some(TaxGroupKind::Sale)) => true,
            (TaxKind::Supplier, Some(TaxGroupKind::Purchase)) => true,
            _ => false,
        }
    }
}

impl fmt::Display for TaxKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}
