use ledgerline_core::AccountKind;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// The four account slots stored per company, for a template or a category.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct AccountAssignment {
    pub account_expense: Option<Uuid>,
    pub account_revenue: Option<Uuid>,
    pub account_depreciation: Option<Uuid>,
    pub account_asset: Option<Uuid>,
}

pub type TemplateAccount = AccountAssignment;
pub type CategoryAccount = AccountAssignment;

impl AccountAssignment {
    pub fn get(&self, kind: AccountKind) -> Option<Uuid> {
        match kind {
            AccountKind::Expense => self.account_expense,
            AccountKind::Revenue => self.account_revenue,
            AccountKind::Depreciation => self.account_depreciation,
            AccountKind::Asset => self.account_asset,
        }
    }

    pub fn set(&mut self, kind: AccountKind, account: Option<Uuid>) {
        let slot = match kind {
            AccountKind::Expense => &mut self.account_expense,
            AccountKind::Revenue => &mut self.account_revenue,
            AccountKind::Depreciation => &mut self.account_depreciation,
            AccountKind::Asset => &mut self.account_asset,
        };
        *slot = account;
    }

    /// Assigned slots, in `AccountKind::ALL` order.
    pub fn assigned(&self) -> impl Iterator<Item = (AccountKind, Uuid)> + '_ {
        AccountKind::ALL
            .into_iter()
            .filter_map(|kind| self.get(kind).map(|account| (kind, account)))
    }

    pub fn is_empty(&self) -> bool {
        self.assigned().next().is_none()
    }
}
