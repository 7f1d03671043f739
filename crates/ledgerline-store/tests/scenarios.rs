use ledgerline_core::{
    Account, AccountKind, AccountType, AccountingError, Context, Tax, TaxGroupKind, TaxKind,
    ValidationError,
};
use ledgerline_product::{AccountingDefaults, Category};
use ledgerline_store::{InMemoryProductStore, ProductAccountingStore};
use rust_decimal::Decimal;
use uuid::Uuid;

struct Setup {
    store: InMemoryProductStore,
    company: Uuid,
    expense: Account,
    revenue: Account,
    fixed_asset: Account,
}

impl Setup {
    async fn new() -> Self {
        Self::with_defaults(AccountingDefaults::default()).await
    }

    async fn with_defaults(defaults: AccountingDefaults) -> Self {
        let store = InMemoryProductStore::new(defaults);
        let company = Uuid::new_v4();
        let expense = Account::new(company, "6000", "Expense", AccountType::expense());
        let revenue = Account::new(company, "7000", "Revenue", AccountType::revenue());
        let fixed_asset = Account::new(company, "2150", "Machinery", AccountType::fixed_asset());
        for account in [&expense, &revenue, &fixed_asset] {
            store.put_account(account.clone()).await.unwrap();
        }
        Self {
            store,
            company,
            expense,
            revenue,
            fixed_asset,
        }
    }

    fn ctx(&self) -> Context {
        Context::for_company(self.company)
    }

    async fn add_expense_account(&self, code: &str) -> Account {
        let account = Account::new(self.company, code, code, AccountType::expense());
        self.store.put_account(account.clone()).await.unwrap();
        account
    }

    async fn add_tax(&self, company: Uuid, name: &str, group: TaxGroupKind) -> Tax {
        let tax = Tax::new(company, name, Some(group));
        self.store.put_tax(tax.clone()).await.unwrap();
        tax
    }
}

#[tokio::test]
async fn unset_override_fails_only_at_direct_usage() {
    let setup = Setup::new().await;
    let template = setup
        .store
        .create_template("Service", None, setup.ctx())
        .await
        .unwrap();

    for kind in AccountKind::ALL {
        assert_eq!(
            setup.store.get_account(template.id, kind, setup.ctx()).await,
            Ok(None)
        );
        assert_eq!(
            setup.store.account_used(template.id, kind, setup.ctx()).await,
            Err(AccountingError::Configuration {
                kind,
                name: "Service".to_string(),
            })
        );
    }
}

#[tokio::test]
async fn override_then_category_accounts() {
    let setup = Setup::new().await;
    let category_account = setup.add_expense_account("6100").await;
    let mut category = Category::new("Goods");
    category.accounting = true;
    category.set_account(setup.company, AccountKind::Expense, Some(category_account.id));
    let category = setup.store.save_category(category).await.unwrap();

    let mut template = setup
        .store
        .create_template("Widget", Some(category.id), setup.ctx())
        .await
        .unwrap();
    template
        .set_account(AccountKind::Expense, &setup.ctx(), Some(setup.expense.id))
        .unwrap();
    let mut template = setup.store.save_template(template).await.unwrap();
    assert_eq!(
        setup
            .store
            .account_used(template.id, AccountKind::Expense, setup.ctx())
            .await,
        Ok(setup.expense.clone())
    );

    template.accounts_category = true;
    let template = setup.store.save_template(template).await.unwrap();
    assert_eq!(
        setup
            .store
            .account_used(template.id, AccountKind::Expense, setup.ctx())
            .await,
        Ok(category_account)
    );

    let stored = setup.store.template(template.id).await.unwrap();
    assert_eq!(
        stored.account(AccountKind::Expense, &setup.ctx()),
        Some(setup.expense.id)
    );
}

#[tokio::test]
async fn child_category_and_deferring_template_resolve_to_parent() {
    let setup = Setup::new().await;
    let parent_account = setup.add_expense_account("6200").await;
    let mut parent = Category::new("Parent");
    parent.accounting = true;
    parent.set_account(setup.company, AccountKind::Expense, Some(parent_account.id));
    let parent = setup.store.save_category(parent).await.unwrap();

    let mut child = Category::child_of("Child", &parent);
    child.accounting = true;
    child.account_parent = true;
    let child = setup.store.save_category(child).await.unwrap();

    assert_eq!(
        setup
            .store
            .category_account_used(child.id, AccountKind::Expense, setup.ctx())
            .await,
        Ok(parent_account.clone())
    );

    let mut template = setup
        .store
        .create_template("Widget", Some(child.id), setup.ctx())
        .await
        .unwrap();
    template.accounts_category = true;
    let template = setup.store.save_template(template).await.unwrap();
    assert_eq!(
        setup
            .store
            .account_used(template.id, AccountKind::Expense, setup.ctx())
            .await,
        Ok(parent_account)
    );
}

#[tokio::test]
async fn fixed_asset_overrides_resolve() {
    let setup = Setup::new().await;
    let mut template = setup
        .store
        .create_template("Press", None, setup.ctx())
        .await
        .unwrap();
    template
        .set_account(AccountKind::Depreciation, &setup.ctx(), Some(setup.fixed_asset.id))
        .unwrap();
    template
        .set_account(AccountKind::Asset, &setup.ctx(), Some(setup.fixed_asset.id))
        .unwrap();
    let template = setup.store.save_template(template).await.unwrap();

    for kind in [AccountKind::Depreciation, AccountKind::Asset] {
        assert_eq!(
            setup.store.account_used(template.id, kind, setup.ctx()).await,
            Ok(setup.fixed_asset.clone())
        );
    }
}

#[tokio::test]
async fn customer_taxes_are_filtered_by_company() {
    let setup = Setup::new().await;
    let other_company = Uuid::new_v4();
    let ours = setup.add_tax(setup.company, "VAT 21%", TaxGroupKind::Sale).await;
    let theirs = setup.add_tax(other_company, "VAT 20%", TaxGroupKind::Both).await;

    let mut template = setup
        .store
        .create_template("Widget", None, setup.ctx())
        .await
        .unwrap();
    template.customer_taxes = vec![ours.id, theirs.id];
    let template = setup.store.save_template(template).await.unwrap();

    assert_eq!(
        setup
            .store
            .taxes_used(template.id, TaxKind::Customer, setup.ctx())
            .await,
        Ok(vec![ours.clone()])
    );
    assert_eq!(
        setup
            .store
            .taxes_used(template.id, TaxKind::Customer, Context::for_company(other_company))
            .await,
        Ok(vec![theirs.clone()])
    );

    let product = setup.store.create_product(template.id, "W-1").await.unwrap();
    assert_eq!(
        setup
            .store
            .product_taxes(product.id, TaxKind::Customer, setup.ctx())
            .await,
        Ok(vec![ours])
    );
}

#[tokio::test]
async fn deductible_rate_defaults_to_one_and_follows_category() {
    let setup = Setup::new().await;
    let mut category = Category::new("Goods");
    category.accounting = true;
    category.supplier_taxes_deductible_rate = Decimal::new(5, 1);
    let category = setup.store.save_category(category).await.unwrap();

    let mut template = setup
        .store
        .create_template("Widget", Some(category.id), setup.ctx())
        .await
        .unwrap();
    assert_eq!(template.supplier_taxes_deductible_rate, Decimal::ONE);
    assert_eq!(
        setup
            .store
            .supplier_taxes_deductible_rate_used(template.id)
            .await,
        Ok(Some(Decimal::ONE))
    );

    template.taxes_category = true;
    let template = setup.store.save_template(template).await.unwrap();
    assert_eq!(
        setup
            .store
            .supplier_taxes_deductible_rate_used(template.id)
            .await,
        Ok(Some(Decimal::new(5, 1)))
    );
}

#[tokio::test]
async fn override_survives_unrelated_save() {
    let setup = Setup::new().await;
    let mut template = setup
        .store
        .create_template("Widget", None, setup.ctx())
        .await
        .unwrap();
    template
        .set_account(AccountKind::Revenue, &setup.ctx(), Some(setup.revenue.id))
        .unwrap();
    let template = setup.store.save_template(template).await.unwrap();
    assert_eq!(
        template.account(AccountKind::Revenue, &setup.ctx()),
        Some(setup.revenue.id)
    );

    let mut reread = setup.store.template(template.id).await.unwrap();
    reread.name = "Widget XL".to_string();
    setup.store.save_template(reread).await.unwrap();

    let reread = setup.store.template(template.id).await.unwrap();
    assert_eq!(
        reread.account(AccountKind::Revenue, &setup.ctx()),
        Some(setup.revenue.id)
    );
    assert_eq!(reread.accounts, template.accounts);
}

#[tokio::test]
async fn configured_defaults_prefill_new_templates() {
    let company = Uuid::new_v4();
    let expense = Account::new(company, "6000", "Expense", AccountType::expense());
    let mut defaults = AccountingDefaults::default();
    defaults
        .account
        .default_product_account_expense
        .set(company, expense.id);

    let store = InMemoryProductStore::new(defaults);
    store.put_account(expense.clone()).await.unwrap();
    let ctx = Context::for_company(company);
    let template = store.create_template("Widget", None, ctx).await.unwrap();

    assert_eq!(
        store.account_used(template.id, AccountKind::Expense, ctx).await,
        Ok(expense)
    );
    assert_eq!(
        store.get_account(template.id, AccountKind::Revenue, ctx).await,
        Ok(None)
    );
}

#[tokio::test]
async fn invalid_writes_are_rejected() {
    let setup = Setup::new().await;
    let mut template = setup
        .store
        .create_template("Widget", None, setup.ctx())
        .await
        .unwrap();

    let mut wrong_type = template.clone();
    wrong_type
        .set_account(AccountKind::Expense, &setup.ctx(), Some(setup.revenue.id))
        .unwrap();
    assert_eq!(
        setup.store.save_template(wrong_type).await,
        Err(AccountingError::Validation(ValidationError::AccountType {
            account: setup.revenue.id,
            kind: AccountKind::Expense,
            required: "expense",
        }))
    );

    let purchase = setup.add_tax(setup.company, "Input VAT", TaxGroupKind::Purchase).await;
    let mut wrong_group = template.clone();
    wrong_group.customer_taxes = vec![purchase.id];
    assert_eq!(
        setup.store.save_template(wrong_group).await,
        Err(AccountingError::Validation(ValidationError::TaxGroup {
            tax: purchase.id,
            kind: TaxKind::Customer,
        }))
    );

    template.supplier_taxes_deductible_rate = Decimal::new(2, 0);
    assert_eq!(
        setup.store.save_template(template).await,
        Err(AccountingError::Validation(ValidationError::DeductibleRate {
            rate: Decimal::new(2, 0),
        }))
    );
}

#[tokio::test]
async fn deleting_a_template_cascades_and_taxes_are_restricted() {
    let setup = Setup::new().await;
    let tax = setup.add_tax(setup.company, "VAT", TaxGroupKind::Both).await;
    let mut template = setup
        .store
        .create_template("Widget", None, setup.ctx())
        .await
        .unwrap();
    template.supplier_taxes = vec![tax.id];
    template
        .set_account(AccountKind::Expense, &setup.ctx(), Some(setup.expense.id))
        .unwrap();
    let template = setup.store.save_template(template).await.unwrap();
    let product = setup.store.create_product(template.id, "W-1").await.unwrap();

    assert_eq!(
        setup.store.delete_tax(tax.id).await,
        Err(AccountingError::TaxInUse {
            tax: tax.id,
            holder: template.id,
        })
    );

    setup.store.delete_template(template.id).await.unwrap();
    assert_eq!(
        setup.store.template(template.id).await,
        Err(AccountingError::UnknownTemplate(template.id))
    );
    assert_eq!(
        setup
            .store
            .product_account_used(product.id, AccountKind::Expense, setup.ctx())
            .await,
        Err(AccountingError::UnknownProduct(product.id))
    );
    assert_eq!(setup.store.delete_tax(tax.id).await, Ok(()));
}

#[tokio::test]
async fn accounting_category_cannot_be_demoted_while_in_use() {
    let setup = Setup::new().await;
    let mut parent = Category::new("Goods");
    parent.accounting = true;
    let parent = setup.store.save_category(parent).await.unwrap();
    let mut category = Category::child_of("Hardware", &parent);
    category.accounting = true;
    category.set_account(setup.company, AccountKind::Expense, Some(setup.expense.id));
    let category = setup.store.save_category(category).await.unwrap();

    let mut template = setup
        .store
        .create_template("Widget", Some(category.id), setup.ctx())
        .await
        .unwrap();
    template.accounts_category = true;
    let template = setup.store.save_template(template).await.unwrap();

    let mut demoted = category.clone();
    demoted.accounting = false;
    assert_eq!(
        setup.store.save_category(demoted).await,
        Err(AccountingError::Validation(ValidationError::AccountingCategoryInUse {
            category: category.id,
            holder: template.id,
        }))
    );
    assert_eq!(
        setup
            .store
            .account_used(template.id, AccountKind::Expense, setup.ctx())
            .await,
        Ok(setup.expense.clone())
    );

    // A child that keeps its own accounts does not pin the parent.
    let mut parent_demoted = parent.clone();
    parent_demoted.accounting = false;
    assert!(setup.store.save_category(parent_demoted).await.is_ok());
}

#[tokio::test]
async fn deferring_child_pins_its_parent_as_accounting() {
    let setup = Setup::new().await;
    let mut parent = Category::new("Goods");
    parent.accounting = true;
    let parent = setup.store.save_category(parent).await.unwrap();
    let mut child = Category::child_of("Hardware", &parent);
    child.taxes_parent = true;
    let child = setup.store.save_category(child).await.unwrap();

    let mut demoted = parent.clone();
    demoted.accounting = false;
    assert_eq!(
        setup.store.save_category(demoted).await,
        Err(AccountingError::Validation(ValidationError::AccountingCategoryInUse {
            category: parent.id,
            holder: child.id,
        }))
    );
}

#[tokio::test]
async fn assigned_account_cannot_change_type_or_company() {
    let setup = Setup::new().await;
    let mut template = setup
        .store
        .create_template("Widget", None, setup.ctx())
        .await
        .unwrap();
    template
        .set_account(AccountKind::Expense, &setup.ctx(), Some(setup.expense.id))
        .unwrap();
    let template = setup.store.save_template(template).await.unwrap();

    let mut retyped = setup.expense.clone();
    retyped.kind = AccountType::revenue();
    assert_eq!(
        setup.store.put_account(retyped).await,
        Err(AccountingError::Validation(ValidationError::AccountType {
            account: setup.expense.id,
            kind: AccountKind::Expense,
            required: "expense",
        }))
    );

    let mut moved = setup.expense.clone();
    moved.company = Uuid::new_v4();
    assert_eq!(
        setup.store.put_account(moved).await,
        Err(AccountingError::Validation(ValidationError::AccountCompany {
            account: setup.expense.id,
            company: setup.company,
        }))
    );

    let mut renamed = setup.expense.clone();
    renamed.name = "Purchases".to_string();
    assert_eq!(setup.store.put_account(renamed.clone()).await, Ok(()));
    assert_eq!(
        setup
            .store
            .account_used(template.id, AccountKind::Expense, setup.ctx())
            .await,
        Ok(renamed)
    );
}

#[tokio::test]
async fn repeated_taxes_are_stored_once() {
    let setup = Setup::new().await;
    let vat = setup.add_tax(setup.company, "VAT", TaxGroupKind::Purchase).await;
    let levy = setup.add_tax(setup.company, "Levy", TaxGroupKind::Purchase).await;
    let mut template = setup
        .store
        .create_template("Widget", None, setup.ctx())
        .await
        .unwrap();
    template.supplier_taxes = vec![vat.id, levy.id, vat.id];
    let template = setup.store.save_template(template).await.unwrap();

    assert_eq!(template.supplier_taxes.len(), 2);
    let used = setup
        .store
        .taxes_used(template.id, TaxKind::Supplier, setup.ctx())
        .await
        .unwrap();
    assert_eq!(used.len(), 2);
    assert!(used.contains(&vat) && used.contains(&levy));
}
