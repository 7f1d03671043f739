use std::collections::HashMap;

use uuid::Uuid;

use crate::context::Context;
use crate::models::{Account, Tax};

/// Read access to the chart of accounts and the tax table.
pub trait ChartLookup {
    fn account(&self, id: Uuid) -> Option<&Account>;
    fn tax(&self, id: Uuid) -> Option<&Tax>;

    /// Taxes from `ids` owned by the context's company, in the given order.
    /// Ids with no tax record are dropped.
    fn company_taxes(&self, ids: &[Uuid], ctx: &Context) -> Vec<Uuid> {
        ids.iter()
            .copied()
            .filter(|id| {
                self.tax(*id)
                    .is_some_and(|tax| Some(tax.company) == ctx.company)
            })
            .collect()
    }
}

#[derive(Debug, Clone, Default)]
pub struct Chart {
    accounts: HashMap<Uuid, Account>,
    taxes: HashMap<Uuid, Tax>,
}

impl Chart {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert_account(&mut self, account: Account) -> Option<Account> {
        self.accounts.insert(account.id, account)
    }

    pub fn insert_tax(&mut self, tax: Tax) -> Option<Tax> {
        self.taxes.insert(tax.id, tax)
    }

    pub fn remove_tax(&mut self, id: Uuid) -> Option<Tax> {
        self.taxes.remove(&id)
    }

    /// Sorts tax ids into display order; unknown ids go last.
    pub fn sort_taxes(&self, ids: &mut [Uuid]) {
        ids.sort_by_key(|id| match self.taxes.get(id) {
            Some(tax) => (false, tax.sort_key()),
            None => (true, (true, 0, *id)),
        });
    }
}

impl ChartLookup for Chart {
    fn account(&self, id: Uuid) -> Option<&Account> {
        self.accounts.get(&id)
    }

    fn tax(&self, id: Uuid) -> Option<&Tax> {
        self.taxes.get(&id)
    }
}
