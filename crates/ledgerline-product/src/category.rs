use std::collections::{HashMap, HashSet};

use ledgerline_core::{
    AccountKind, AccountingError, ChartLookup, CompanyValues, Context, Result, TaxKind,
};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::debug;
use uuid::Uuid;

use crate::assignment::CategoryAccount;

/// Accounting category. Templates that defer to their category read accounts
/// and taxes from here; a category may itself defer to its parent.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Category {
    pub id: Uuid,
    pub name: String,
    pub parent: Option<Uuid>,
    pub accounting: bool,
    pub account_parent: bool,
    pub taxes_parent: bool,
    pub accounts: CompanyValues<CategoryAccount>,
    pub customer_taxes: Vec<Uuid>,
    pub supplier_taxes: Vec<Uuid>,
    pub supplier_taxes_deductible_rate: Decimal,
}

pub trait CategoryLookup {
    fn category(&self, id: Uuid) -> Option<&Category>;
}

impl CategoryLookup for HashMap<Uuid, Category> {
    fn category(&self, id: Uuid) -> Option<&Category> {
        self.get(&id)
    }
}

impl Category {
    /// Plain catalogue category; set `accounting` before templates use it.
    pub fn new(name: &str) -> Self {
        Self {
            id: Uuid::new_v4(),
            name: name.to_string(),
            parent: None,
            accounting: false,
            account_parent: false,
            taxes_parent: false,
            accounts: CompanyValues::new(),
            customer_taxes: Vec::new(),
            supplier_taxes: Vec::new(),
            supplier_taxes_deductible_rate: Decimal::ONE,
        }
    }

    pub fn child_of(name: &str, parent: &Category) -> Self {
        Self {
            parent: Some(parent.id),
            ..Self::new(name)
        }
    }

    pub fn set_account(&mut self, company: Uuid, kind: AccountKind, account: Option<Uuid>) {
        self.accounts.entry_or_default(company).set(kind, account);
    }

    pub fn taxes(&self, kind: TaxKind) -> &[Uuid] {
        match kind {
            TaxKind::Customer => &self.customer_taxes,
            TaxKind::Supplier => &self.supplier_taxes,
        }
    }

    pub fn taxes_mut(&mut self, kind: TaxKind) -> &mut Vec<Uuid> {
        match kind {
            TaxKind::Customer => &mut self.customer_taxes,
            TaxKind::Supplier => &mut self.supplier_taxes,
        }
    }

    /// Account for `kind` in the context's company, following `account_parent`.
    /// Returns `None` when nothing is configured.
    pub fn get_account<L>(
        &self,
        categories: &L,
        kind: AccountKind,
        ctx: &Context,
    ) -> Result<Option<Uuid>>
    where
        L: CategoryLookup + ?Sized,
    {
        let owner = resolve_owner(categories, self, |category| category.account_parent)?;
        let account = owner
            .and_then(|category| category.accounts.current(ctx))
            .and_then(|accounts| accounts.get(kind));
        debug!(
            category = %self.id,
            owner = ?owner.map(|category| category.id),
            %kind,
            ?account,
            "resolved category account"
        );
        Ok(account)
    }

    /// Account for direct usage in postings. Fails when none is configured.
    pub fn account_used<L>(&self, categories: &L, kind: AccountKind, ctx: &Context) -> Result<Uuid>
    where
        L: CategoryLookup + ?Sized,
    {
        self.get_account(categories, kind, ctx)?
            .ok_or_else(|| AccountingError::Configuration {
                kind,
                name: self.name.clone(),
            })
    }

    /// Taxes of `kind` for the context's company, following `taxes_parent`.
    pub fn taxes_used<L, C>(
        &self,
        categories: &L,
        chart: &C,
        kind: TaxKind,
        ctx: &Context,
    ) -> Result<Vec<Uuid>>
    where
        L: CategoryLookup + ?Sized,
        C: ChartLookup + ?Sized,
    {
        let owner = resolve_owner(categories, self, |category| category.taxes_parent)?;
        Ok(owner
            .map(|category| chart.company_taxes(category.taxes(kind), ctx))
            .unwrap_or_default())
    }

    pub fn supplier_taxes_deductible_rate_used<L>(&self, categories: &L) -> Result<Option<Decimal>>
    where
        L: CategoryLookup + ?Sized,
    {
        let owner = resolve_owner(categories, self, |category| category.taxes_parent)?;
        Ok(owner.map(|category| category.supplier_taxes_deductible_rate))
    }
}

/// Walks up from `start` while `defers` holds and returns the first category
/// answering for itself. A deferring root yields `None`.
fn resolve_owner<'a, L>(
    categories: &'a L,
    start: &'a Category,
    defers: impl Fn(&Category) -> bool,
) -> Result<Option<&'a Category>>
where
    L: CategoryLookup + ?Sized,
{
    let mut visited = HashSet::new();
    let mut current = start;
    loop {
        if !visited.insert(current.id) {
            return Err(AccountingError::CategoryCycle(current.id));
        }
        if !defers(current) {
            return Ok(Some(current));
        }
        let Some(parent) = current.parent else {
            return Ok(None);
        };
        current = categories
            .category(parent)
            .ok_or(AccountingError::UnknownCategory(parent))?;
    }
}
