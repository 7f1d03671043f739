use ledgerline_core::{CompanyValues, Context};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Per-company default accounts offered to new templates.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct AccountConfiguration {
    #[serde(default)]
    pub default_product_account_expense: CompanyValues<Uuid>,
    #[serde(default)]
    pub default_product_account_revenue: CompanyValues<Uuid>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct ProductConfiguration {
    #[serde(default)]
    pub default_accounts_category: bool,
    #[serde(default)]
    pub default_taxes_category: bool,
}

/// Defaults used to prefill new templates.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct AccountingDefaults {
    #[serde(default)]
    pub account: AccountConfiguration,
    #[serde(default)]
    pub product: ProductConfiguration,
}

impl AccountingDefaults {
    pub fn from_json(raw: &str) -> serde_json::Result<Self> {
        serde_json::from_str(raw)
    }

    pub fn default_account_expense(&self, ctx: &Context) -> Option<Uuid> {
        self.account.default_product_account_expense.current(ctx).copied()
    }

    pub fn default_account_revenue(&self, ctx: &Context) -> Option<Uuid> {
        self.account.default_product_account_revenue.current(ctx).copied()
    }

    pub fn default_accounts_category(&self) -> bool {
        self.product.default_accounts_category
    }

    pub fn default_taxes_category(&self) -> bool {
        self.product.default_taxes_category
    }

    pub fn default_supplier_taxes_deductible_rate(&self) -> Decimal {
        Decimal::ONE
    }
}
