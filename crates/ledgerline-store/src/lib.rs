use std::collections::HashMap;

use async_trait::async_trait;
use ledgerline_core::{
    Account, AccountKind, AccountingError, Chart, ChartLookup, Context, Result, Tax, TaxKind,
    ValidationError,
};
use ledgerline_product::validate::{check_account_record, check_category, check_template};
use ledgerline_product::{AccountingDefaults, Category, CategoryLookup, Product, Template};
use rust_decimal::Decimal;
use tokio::sync::RwLock;
use tracing::info;
use uuid::Uuid;

/// Product accounting records and the resolution entry points over them.
#[async_trait]
pub trait ProductAccountingStore: Send + Sync {
    async fn put_account(&self, account: Account) -> Result<()>;
    async fn put_tax(&self, tax: Tax) -> Result<()>;
    async fn delete_tax(&self, id: Uuid) -> Result<()>;
    async fn save_category(&self, category: Category) -> Result<Category>;

    async fn create_template(
        &self,
        name: &str,
        account_category: Option<Uuid>,
        ctx: Context,
    ) -> Result<Template>;
    async fn save_template(&self, template: Template) -> Result<Template>;
    async fn template(&self, id: Uuid) -> Result<Template>;
    async fn delete_template(&self, id: Uuid) -> Result<()>;
    async fn create_product(&self, template: Uuid, code: &str) -> Result<Product>;

    async fn get_account(
        &self,
        template: Uuid,
        kind: AccountKind,
        ctx: Context,
    ) -> Result<Option<Account>>;
    async fn account_used(
        &self,
        template: Uuid,
        kind: AccountKind,
        ctx: Context,
    ) -> Result<Account>;
    async fn taxes_used(&self, template: Uuid, kind: TaxKind, ctx: Context) -> Result<Vec<Tax>>;
    async fn supplier_taxes_deductible_rate_used(&self, template: Uuid) -> Result<Option<Decimal>>;
    async fn category_account_used(
        &self,
        category: Uuid,
        kind: AccountKind,
        ctx: Context,
    ) -> Result<Account>;

    async fn product_taxes(&self, product: Uuid, kind: TaxKind, ctx: Context) -> Result<Vec<Tax>>;
    async fn product_account_used(
        &self,
        product: Uuid,
        kind: AccountKind,
        ctx: Context,
    ) -> Result<Account>;
}

#[derive(Debug, Default)]
struct Catalog {
    chart: Chart,
    categories: HashMap<Uuid, Category>,
    templates: HashMap<Uuid, Template>,
    products: HashMap<Uuid, Product>,
}

impl CategoryLookup for Catalog {
    fn category(&self, id: Uuid) -> Option<&Category> {
        self.categories.get(&id)
    }
}

impl Catalog {
    fn template(&self, id: Uuid) -> Result<&Template> {
        self.templates
            .get(&id)
            .ok_or(AccountingError::UnknownTemplate(id))
    }

    fn category_record(&self, id: Uuid) -> Result<&Category> {
        self.categories
            .get(&id)
            .ok_or(AccountingError::UnknownCategory(id))
    }

    fn product(&self, id: Uuid) -> Result<&Product> {
        self.products
            .get(&id)
            .ok_or(AccountingError::UnknownProduct(id))
    }

    fn account(&self, id: Uuid) -> Result<Account> {
        self.chart
            .account(id)
            .cloned()
            .ok_or(AccountingError::UnknownAccount(id))
    }

    fn taxes(&self, ids: &[Uuid]) -> Result<Vec<Tax>> {
        ids.iter()
            .map(|id| {
                self.chart
                    .tax(*id)
                    .cloned()
                    .ok_or(AccountingError::UnknownTax(*id))
            })
            .collect()
    }

    /// Display order without repeats.
    fn normalize_taxes(&self, ids: &mut Vec<Uuid>) {
        self.chart.sort_taxes(ids);
        ids.dedup();
    }

    fn store_template(&mut self, mut template: Template) -> Result<Template> {
        check_template(&template, &*self, &self.chart)?;
        self.normalize_taxes(&mut template.customer_taxes);
        self.normalize_taxes(&mut template.supplier_taxes);
        info!(
            template = %template.id,
            name = %template.name,
            companies = template.accounts.len(),
            "template saved"
        );
        self.templates.insert(template.id, template.clone());
        Ok(template)
    }

    fn tax_holder(&self, tax: Uuid) -> Option<Uuid> {
        let in_template = self
            .templates
            .values()
            .find(|template| {
                template.customer_taxes.contains(&tax) || template.supplier_taxes.contains(&tax)
            })
            .map(|template| template.id);
        in_template.or_else(|| {
            self.categories
                .values()
                .find(|category| {
                    category.customer_taxes.contains(&tax) || category.supplier_taxes.contains(&tax)
                })
                .map(|category| category.id)
        })
    }

    /// First template or child category whose accounting depends on
    /// `category`.
    fn accounting_dependent(&self, category: Uuid) -> Option<Uuid> {
        let template = self
            .templates
            .values()
            .find(|template| template.account_category == Some(category))
            .map(|template| template.id);
        template.or_else(|| {
            self.categories
                .values()
                .find(|child| {
                    child.id != category
                        && child.parent == Some(category)
                        && (child.account_parent || child.taxes_parent)
                })
                .map(|child| child.id)
        })
    }

    /// Every (company, slot) where `account` is assigned, on templates and
    /// categories alike.
    fn account_slots(&self, account: Uuid) -> Vec<(Uuid, AccountKind)> {
        let rows = self
            .templates
            .values()
            .map(|template| &template.accounts)
            .chain(self.categories.values().map(|category| &category.accounts));
        let mut slots = Vec::new();
        for accounts in rows {
            for (company, row) in accounts.iter() {
                slots.extend(
                    row.assigned()
                        .filter(|(_, assigned)| *assigned == account)
                        .map(|(kind, _)| (company, kind)),
                );
            }
        }
        slots
    }
}

#[derive(Default)]
pub struct InMemoryProductStore {
    defaults: AccountingDefaults,
    catalog: RwLock<Catalog>,
}

impl InMemoryProductStore {
    pub fn new(defaults: AccountingDefaults) -> Self {
        Self {
            defaults,
            catalog: RwLock::new(Catalog::default()),
        }
    }

    pub fn defaults(&self) -> &AccountingDefaults {
        &self.defaults
    }
}

#[async_trait]
impl ProductAccountingStore for InMemoryProductStore {
    async fn put_account(&self, account: Account) -> Result<()> {
        let mut catalog = self.catalog.write().await;
        let slots = catalog.account_slots(account.id);
        for (company, kind) in &slots {
            check_account_record(&account, *company, *kind)?;
        }
        if !slots.is_empty() {
            info!(account = %account.id, slots = slots.len(), "assigned account updated");
        }
        catalog.chart.insert_account(account);
        Ok(())
    }

    async fn put_tax(&self, tax: Tax) -> Result<()> {
        let mut catalog = self.catalog.write().await;
        catalog.chart.insert_tax(tax);
        Ok(())
    }

    async fn delete_tax(&self, id: Uuid) -> Result<()> {
        let mut catalog = self.catalog.write().await;
        if let Some(holder) = catalog.tax_holder(id) {
            return Err(AccountingError::TaxInUse { tax: id, holder });
        }
        catalog
            .chart
            .remove_tax(id)
            .ok_or(AccountingError::UnknownTax(id))?;
        info!(tax = %id, "tax deleted");
        Ok(())
    }

    async fn save_category(&self, mut category: Category) -> Result<Category> {
        let mut catalog = self.catalog.write().await;
        check_category(&category, &*catalog, &catalog.chart)?;
        if !category.accounting {
            if let Some(holder) = catalog.accounting_dependent(category.id) {
                return Err(ValidationError::AccountingCategoryInUse {
                    category: category.id,
                    holder,
                }
                .into());
            }
        }
        catalog.normalize_taxes(&mut category.customer_taxes);
        catalog.normalize_taxes(&mut category.supplier_taxes);
        info!(category = %category.id, name = %category.name, "category saved");
        catalog.categories.insert(category.id, category.clone());
        Ok(category)
    }

    async fn create_template(
        &self,
        name: &str,
        account_category: Option<Uuid>,
        ctx: Context,
    ) -> Result<Template> {
        let mut template = Template::new(name, &self.defaults, &ctx);
        template.account_category = account_category;
        let mut catalog = self.catalog.write().await;
        catalog.store_template(template)
    }

    async fn save_template(&self, template: Template) -> Result<Template> {
        let mut catalog = self.catalog.write().await;
        catalog.store_template(template)
    }

    async fn template(&self, id: Uuid) -> Result<Template> {
        let catalog = self.catalog.read().await;
        catalog.template(id).cloned()
    }

    async fn delete_template(&self, id: Uuid) -> Result<()> {
        let mut catalog = self.catalog.write().await;
        catalog
            .templates
            .remove(&id)
            .ok_or(AccountingError::UnknownTemplate(id))?;
        let before = catalog.products.len();
        catalog.products.retain(|_, product| product.template != id);
        info!(
            template = %id,
            products = before - catalog.products.len(),
            "template deleted"
        );
        Ok(())
    }

    async fn create_product(&self, template: Uuid, code: &str) -> Result<Product> {
        let mut catalog = self.catalog.write().await;
        let product = Product::new(catalog.template(template)?, code);
        catalog.products.insert(product.id, product.clone());
        Ok(product)
    }

    async fn get_account(
        &self,
        template: Uuid,
        kind: AccountKind,
        ctx: Context,
    ) -> Result<Option<Account>> {
        let catalog = self.catalog.read().await;
        let template = catalog.template(template)?;
        template
            .get_account(&*catalog, kind, &ctx)?
            .map(|id| catalog.account(id))
            .transpose()
    }

    async fn account_used(
        &self,
        template: Uuid,
        kind: AccountKind,
        ctx: Context,
    ) -> Result<Account> {
        let catalog = self.catalog.read().await;
        let id = catalog.template(template)?.account_used(&*catalog, kind, &ctx)?;
        catalog.account(id)
    }

    async fn taxes_used(&self, template: Uuid, kind: TaxKind, ctx: Context) -> Result<Vec<Tax>> {
        let catalog = self.catalog.read().await;
        let ids = catalog
            .template(template)?
            .taxes_used(&*catalog, &catalog.chart, kind, &ctx)?;
        catalog.taxes(&ids)
    }

    async fn supplier_taxes_deductible_rate_used(&self, template: Uuid) -> Result<Option<Decimal>> {
        let catalog = self.catalog.read().await;
        catalog
            .template(template)?
            .supplier_taxes_deductible_rate_used(&*catalog)
    }

    async fn category_account_used(
        &self,
        category: Uuid,
        kind: AccountKind,
        ctx: Context,
    ) -> Result<Account> {
        let catalog = self.catalog.read().await;
        let id = catalog
            .category_record(category)?
            .account_used(&*catalog, kind, &ctx)?;
        catalog.account(id)
    }

    async fn product_taxes(&self, product: Uuid, kind: TaxKind, ctx: Context) -> Result<Vec<Tax>> {
        let catalog = self.catalog.read().await;
        let product = catalog.product(product)?;
        let template = catalog.template(product.template)?;
        let ids = product.taxes(template, &catalog.chart, kind, &ctx)?;
        catalog.taxes(&ids)
    }

    async fn product_account_used(
        &self,
        product: Uuid,
        kind: AccountKind,
        ctx: Context,
    ) -> Result<Account> {
        let catalog = self.catalog.read().await;
        let product = catalog.product(product)?;
        let id = catalog
            .template(product.template)?
            .account_used(&*catalog, kind, &ctx)?;
        catalog.account(id)
    }
}
