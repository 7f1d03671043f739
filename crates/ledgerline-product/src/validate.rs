use ledgerline_core::{
    Account, AccountKind, AccountingError, ChartLookup, CompanyValues, Result, TaxKind,
    ValidationError,
};
use rust_decimal::Decimal;
use uuid::Uuid;

use crate::assignment::AccountAssignment;
use crate::category::{Category, CategoryLookup};
use crate::template::Template;

/// `account` must carry the type flag `kind` requires and belong to `company`.
pub fn check_account<C>(chart: &C, company: Uuid, kind: AccountKind, account: Uuid) -> Result<()>
where
    C: ChartLookup + ?Sized,
{
    let record = chart
        .account(account)
        .ok_or(AccountingError::UnknownAccount(account))?;
    check_account_record(record, company, kind)
}

/// Same as [`check_account`] for a record that is not in the chart yet.
pub fn check_account_record(record: &Account, company: Uuid, kind: AccountKind) -> Result<()> {
    if !kind.accepts(&record.kind) {
        return Err(ValidationError::AccountType {
            account: record.id,
            kind,
            required: kind.required_type(),
        }
        .into());
    }
    if record.company != company {
        return Err(ValidationError::AccountCompany {
            account: record.id,
            company,
        }
        .into());
    }
    Ok(())
}

/// Only top-level taxes whose group allows `kind` can be assigned.
pub fn check_tax<C>(chart: &C, kind: TaxKind, tax: Uuid) -> Result<()>
where
    C: ChartLookup + ?Sized,
{
    let record = chart.tax(tax).ok_or(AccountingError::UnknownTax(tax))?;
    if !record.is_top_level() {
        return Err(ValidationError::ChildTax { tax }.into());
    }
    if !kind.accepts_group(record.group) {
        return Err(ValidationError::TaxGroup { tax, kind }.into());
    }
    Ok(())
}

pub fn check_deductible_rate(rate: Decimal) -> Result<()> {
    if rate < Decimal::ZERO || rate > Decimal::ONE {
        return Err(ValidationError::DeductibleRate { rate }.into());
    }
    Ok(())
}

fn check_assignments<C>(chart: &C, accounts: &CompanyValues<AccountAssignment>) -> Result<()>
where
    C: ChartLookup + ?Sized,
{
    for (company, row) in accounts.iter() {
        for (kind, account) in row.assigned() {
            check_account(chart, company, kind, account)?;
        }
    }
    Ok(())
}

fn check_taxes<C>(chart: &C, customer: &[Uuid], supplier: &[Uuid]) -> Result<()>
where
    C: ChartLookup + ?Sized,
{
    for tax in customer {
        check_tax(chart, TaxKind::Customer, *tax)?;
    }
    for tax in supplier {
        check_tax(chart, TaxKind::Supplier, *tax)?;
    }
    Ok(())
}

fn check_accounting_category<L>(categories: &L, id: Uuid) -> Result<()>
where
    L: CategoryLookup + ?Sized,
{
    let category = categories
        .category(id)
        .ok_or(AccountingError::UnknownCategory(id))?;
    if !category.accounting {
        return Err(ValidationError::NotAccountingCategory { category: id }.into());
    }
    Ok(())
}

pub fn check_template<L, C>(template: &Template, categories: &L, chart: &C) -> Result<()>
where
    L: CategoryLookup + ?Sized,
    C: ChartLookup + ?Sized,
{
    check_assignments(chart, &template.accounts)?;
    check_taxes(chart, &template.customer_taxes, &template.supplier_taxes)?;
    check_deductible_rate(template.supplier_taxes_deductible_rate)?;

    match template.account_category {
        Some(id) => check_accounting_category(categories, id),
        None if template.accounts_category || template.taxes_category => {
            Err(ValidationError::CategoryRequired {
                name: template.name.clone(),
            }
            .into())
        }
        None => Ok(()),
    }
}

pub fn check_category<L, C>(category: &Category, categories: &L, chart: &C) -> Result<()>
where
    L: CategoryLookup + ?Sized,
    C: ChartLookup + ?Sized,
{
    check_assignments(chart, &category.accounts)?;
    check_taxes(chart, &category.customer_taxes, &category.supplier_taxes)?;
    check_deductible_rate(category.supplier_taxes_deductible_rate)?;

    if let Some(parent) = category.parent {
        if category.account_parent || category.taxes_parent {
            check_accounting_category(categories, parent)?;
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use ledgerline_core::{Account, AccountType, Chart, Context, Tax, TaxGroupKind};

    use super::*;
    use crate::config::AccountingDefaults;

    fn invalid(err: ValidationError) -> Result<()> {
        Err(err.into())
    }

    #[test]
    fn account_type_and_company_are_enforced() {
        let company = Uuid::new_v4();
        let mut chart = Chart::new();
        let expense = Account::new(company, "6000", "Purchases", AccountType::expense());
        let foreign = Account::new(Uuid::new_v4(), "6000", "Purchases", AccountType::expense());
        chart.insert_account(expense.clone());
        chart.insert_account(foreign.clone());

        assert_eq!(check_account(&chart, company, AccountKind::Expense, expense.id), Ok(()));
        assert_eq!(
            check_account(&chart, company, AccountKind::Depreciation, expense.id),
            invalid(ValidationError::AccountType {
                account: expense.id,
                kind: AccountKind::Depreciation,
                required: "fixed_asset",
            })
        );
        assert_eq!(
            check_account(&chart, company, AccountKind::Expense, foreign.id),
            invalid(ValidationError::AccountCompany {
                account: foreign.id,
                company,
            })
        );
    }

    #[test]
    fn child_and_wrong_group_taxes_are_rejected() {
        let company = Uuid::new_v4();
        let mut chart = Chart::new();
        let sale = Tax::new(company, "Sales VAT", Some(TaxGroupKind::Sale));
        let mut child = Tax::new(company, "Component", None);
        child.parent = Some(sale.id);
        chart.insert_tax(sale.clone());
        chart.insert_tax(child.clone());

        assert_eq!(check_tax(&chart, TaxKind::Customer, sale.id), Ok(()));
        assert_eq!(
            check_tax(&chart, TaxKind::Supplier, sale.id),
            invalid(ValidationError::TaxGroup {
                tax: sale.id,
                kind: TaxKind::Supplier,
            })
        );
        assert_eq!(
            check_tax(&chart, TaxKind::Customer, child.id),
            invalid(ValidationError::ChildTax { tax: child.id })
        );
    }

    #[test]
    fn deductible_rate_bounds_are_inclusive() {
        assert!(check_deductible_rate(Decimal::ZERO).is_ok());
        assert!(check_deductible_rate(Decimal::ONE).is_ok());
        assert!(check_deductible_rate(Decimal::new(11, 1)).is_err());
        assert!(check_deductible_rate(Decimal::new(-1, 2)).is_err());
    }

    #[test]
    fn deferring_template_needs_an_accounting_category() {
        let chart = Chart::new();
        let mut categories: HashMap<Uuid, Category> = HashMap::new();
        let mut template =
            Template::new("Widget", &AccountingDefaults::default(), &Context::default());
        template.accounts_category = true;

        assert_eq!(
            check_template(&template, &categories, &chart),
            invalid(ValidationError::CategoryRequired {
                name: "Widget".to_string(),
            })
        );

        let plain = Category::new("Catalogue only");
        template.account_category = Some(plain.id);
        categories.insert(plain.id, plain.clone());
        assert_eq!(
            check_template(&template, &categories, &chart),
            invalid(ValidationError::NotAccountingCategory { category: plain.id })
        );
    }
}
