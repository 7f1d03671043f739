use std::collections::HashSet;

use ledgerline_core::{
    AccountKind, AccountingError, ChartLookup, CompanyValues, Context, Result, TaxKind,
};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::debug;
use uuid::Uuid;

use crate::assignment::TemplateAccount;
use crate::category::{Category, CategoryLookup};
use crate::config::AccountingDefaults;

/// Product template with its accounting configuration.
///
/// `accounts_category` and `taxes_category` choose between the template's own
/// per-company values and those of its `account_category`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Template {
    pub id: Uuid,
    pub name: String,
    pub account_category: Option<Uuid>,
    pub accounts_category: bool,
    pub taxes_category: bool,
    pub accounts: CompanyValues<TemplateAccount>,
    pub customer_taxes: Vec<Uuid>,
    pub supplier_taxes: Vec<Uuid>,
    pub supplier_taxes_deductible_rate: Decimal,
}

impl Template {
    /// New template prefilled from `defaults`; default accounts are those of
    /// the context's company.
    pub fn new(name: &str, defaults: &AccountingDefaults, ctx: &Context) -> Self {
        let mut accounts = CompanyValues::new();
        if let Some(company) = ctx.company {
            let row = TemplateAccount {
                account_expense: defaults.default_account_expense(ctx),
                account_revenue: defaults.default_account_revenue(ctx),
                ..TemplateAccount::default()
            };
            if !row.is_empty() {
                accounts.set(company, row);
            }
        }

        Self {
            id: Uuid::new_v4(),
            name: name.to_string(),
            account_category: None,
            accounts_category: defaults.default_accounts_category(),
            taxes_category: defaults.default_taxes_category(),
            accounts,
            customer_taxes: Vec::new(),
            supplier_taxes: Vec::new(),
            supplier_taxes_deductible_rate: defaults.default_supplier_taxes_deductible_rate(),
        }
    }

    /// Stored override for the context's company, regardless of
    /// `accounts_category`.
    pub fn account(&self, kind: AccountKind, ctx: &Context) -> Option<Uuid> {
        self.accounts.current(ctx).and_then(|row| row.get(kind))
    }

    /// Sets the override for the context's company, creating its template
    /// account row on first use.
    pub fn set_account(
        &mut self,
        kind: AccountKind,
        ctx: &Context,
        account: Option<Uuid>,
    ) -> Result<()> {
        let company = ctx
            .company
            .ok_or(AccountingError::MissingCompany(kind.field_name()))?;
        self.accounts.entry_or_default(company).set(kind, account);
        Ok(())
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

    pub fn category<'a, L>(&self, categories: &'a L) -> Result<Option<&'a Category>>
    where
        L: CategoryLookup + ?Sized,
    {
        match self.account_category {
            None => Ok(None),
            Some(id) => categories
                .category(id)
                .map(Some)
                .ok_or(AccountingError::UnknownCategory(id)),
        }
    }

    /// Effective account for `kind`, or `None` when nothing is configured.
    pub fn get_account<L>(
        &self,
        categories: &L,
        kind: AccountKind,
        ctx: &Context,
    ) -> Result<Option<Uuid>>
    where
        L: CategoryLookup + ?Sized,
    {
        if !self.accounts_category {
            return Ok(self.account(kind, ctx));
        }
        match self.category(categories)? {
            Some(category) => category.get_account(categories, kind, ctx),
            None => {
                debug!(template = %self.id, %kind, "template defers to a missing account category");
                Ok(None)
            }
        }
    }

    /// Effective account for direct usage in postings. Fails with a
    /// configuration error when nothing is configured.
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

    /// Effective taxes of `kind` for the context's company.
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
        if self.taxes_category {
            if let Some(category) = self.category(categories)? {
                let taxes = category.taxes_used(categories, chart, kind, ctx)?;
                if !taxes.is_empty() {
                    return Ok(dedup(taxes));
                }
            }
            debug!(template = %self.id, %kind, "category has no taxes, using the template's own");
        }
        Ok(chart.company_taxes(self.taxes(kind), ctx))
    }

    pub fn supplier_taxes_deductible_rate_used<L>(&self, categories: &L) -> Result<Option<Decimal>>
    where
        L: CategoryLookup + ?Sized,
    {
        if !self.taxes_category {
            return Ok(Some(self.supplier_taxes_deductible_rate));
        }
        match self.category(categories)? {
            Some(category) => category.supplier_taxes_deductible_rate_used(categories),
            None => Ok(None),
        }
    }
}

fn dedup(ids: Vec<Uuid>) -> Vec<Uuid> {
    let mut seen = HashSet::new();
    ids.into_iter().filter(|id| seen.insert(*id)).collect()
}
