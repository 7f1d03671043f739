use std::collections::BTreeMap;

use anyhow::{Context, Result};
use chrono::Utc;
use ledgerline_core::AccountKind;
use ledgerline_product::TemplateAccount;
use sqlx::{PgConnection, PgPool, Row};
use tracing::{info, warn};
use uuid::Uuid;

const MODULE_TABLE: &str = "ir_module_module";
const PROPERTY_TABLE: &str = "ir_property";
const TEMPLATE_TABLE: &str = "product_template";
const TEMPLATE_ACCOUNT_TABLE: &str = "product_template_account";

const RENAME_ACCOUNTS_CATEGORY_SQL: &str =
    "ALTER TABLE product_template RENAME COLUMN account_category TO accounts_category";

const TEMPLATE_COLUMNS_SQL: &str = r#"
ALTER TABLE product_template
    ADD COLUMN IF NOT EXISTS accounts_category BOOLEAN NOT NULL DEFAULT FALSE,
    ADD COLUMN IF NOT EXISTS taxes_category BOOLEAN NOT NULL DEFAULT FALSE,
    ADD COLUMN IF NOT EXISTS account_category UUID REFERENCES product_category (id),
    ADD COLUMN IF NOT EXISTS supplier_taxes_deductible_rate NUMERIC(14, 10) NOT NULL DEFAULT 1
        CHECK (supplier_taxes_deductible_rate >= 0 AND supplier_taxes_deductible_rate <= 1)
"#;

const CATEGORY_COLUMNS_SQL: &str = r#"
ALTER TABLE product_category
    ADD COLUMN IF NOT EXISTS accounting BOOLEAN NOT NULL DEFAULT FALSE
"#;

const TEMPLATE_ACCOUNT_SQL: &str = r#"
CREATE TABLE product_template_account (
    id UUID PRIMARY KEY,
    template UUID NOT NULL REFERENCES product_template (id) ON DELETE CASCADE,
    company UUID NOT NULL,
    account_expense UUID,
    account_revenue UUID,
    account_depreciation UUID,
    account_asset UUID,
    create_date TIMESTAMPTZ NOT NULL,
    UNIQUE (template, company)
)
"#;

const TAX_RELATION_SQL: [&str; 2] = [
    r#"
    CREATE TABLE IF NOT EXISTS product_customer_taxes_rel (
        id UUID PRIMARY KEY,
        product UUID NOT NULL REFERENCES product_template (id) ON DELETE CASCADE,
        tax UUID NOT NULL REFERENCES account_tax (id) ON DELETE RESTRICT
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS product_supplier_taxes_rel (
        id UUID PRIMARY KEY,
        product UUID NOT NULL REFERENCES product_template (id) ON DELETE CASCADE,
        tax UUID NOT NULL REFERENCES account_tax (id) ON DELETE RESTRICT
    )
    "#,
];

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MigrationReport {
    pub renamed_accounts_category: bool,
    pub templates_linked_to_category: u64,
    pub template_accounts_created: bool,
    pub ported_template_accounts: usize,
    pub skipped_properties: usize,
}

/// Company-scoped property row from the legacy property table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LegacyProperty {
    pub field: String,
    pub res: Option<String>,
    pub value: Option<String>,
    pub company: Option<Uuid>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlannedTemplateAccount {
    pub template: Uuid,
    pub company: Uuid,
    pub accounts: TemplateAccount,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MigrationPlan {
    pub rows: Vec<PlannedTemplateAccount>,
    pub skipped: usize,
}

/// Parses a `model,id` reference, returning the id when the model matches.
pub fn parse_reference(raw: &str, model: &str) -> Option<Uuid> {
    let (name, id) = raw.split_once(',')?;
    if name.trim() != model {
        return None;
    }
    Uuid::parse_str(id.trim()).ok()
}

/// Groups legacy account properties into one template account row per
/// (template, company). Properties without a template, company or account
/// reference are skipped.
pub fn plan_template_accounts(properties: &[LegacyProperty]) -> MigrationPlan {
    let mut rows: BTreeMap<(Uuid, Uuid), TemplateAccount> = BTreeMap::new();
    let mut skipped = 0;

    for property in properties {
        let kind = AccountKind::from_field_name(&property.field);
        let template = property
            .res
            .as_deref()
            .and_then(|res| parse_reference(res, "product.template"));
        let account = property
            .value
            .as_deref()
            .and_then(|value| parse_reference(value, "account.account"));

        match (kind, template, property.company, account) {
            (Some(kind), Some(template), Some(company), Some(account)) => {
                rows.entry((template, company))
                    .or_default()
                    .set(kind, Some(account));
            }
            _ => {
                warn!(
                    field = %property.field,
                    res = ?property.res,
                    value = ?property.value,
                    company = ?property.company,
                    "skipping legacy property"
                );
                skipped += 1;
            }
        }
    }

    MigrationPlan {
        rows: rows
            .into_iter()
            .map(|((template, company), accounts)| PlannedTemplateAccount {
                template,
                company,
                accounts,
            })
            .collect(),
        skipped,
    }
}

/// Schema facts read before the upgrade touches anything.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SchemaState {
    pub module_table: bool,
    pub category_column: bool,
    pub account_category_column: bool,
    pub accounts_category_column: bool,
    pub template_account_table: bool,
    pub property_table: bool,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct UpgradeSteps {
    pub rename_accounts_category: bool,
    pub copy_category: bool,
    pub create_template_accounts: bool,
    pub port_properties: bool,
}

/// Decides which one-time steps still apply.
///
/// An `account_category` column without `accounts_category` is the old
/// boolean flag and gets renamed. The category copy only runs while the
/// category reference column does not exist yet, and legacy properties are
/// ported only together with the creation of their target table.
pub fn plan_steps(state: &SchemaState) -> UpgradeSteps {
    let rename_accounts_category = state.module_table
        && state.account_category_column
        && !state.accounts_category_column;
    let category_reference_exists = state.account_category_column && !rename_accounts_category;
    let create_template_accounts = !state.template_account_table;

    UpgradeSteps {
        rename_accounts_category,
        copy_category: state.category_column && !category_reference_exists,
        create_template_accounts,
        port_properties: create_template_accounts && state.property_table,
    }
}

async fn table_exists(conn: &mut PgConnection, table: &str) -> Result<bool> {
    let exists: bool = sqlx::query_scalar(
        "SELECT EXISTS (SELECT 1 FROM information_schema.tables WHERE table_schema = current_schema() AND table_name = $1)",
    )
    .bind(table)
    .fetch_one(&mut *conn)
    .await?;
    Ok(exists)
}

async fn column_exists(conn: &mut PgConnection, table: &str, column: &str) -> Result<bool> {
    let exists: bool = sqlx::query_scalar(
        "SELECT EXISTS (SELECT 1 FROM information_schema.columns WHERE table_schema = current_schema() AND table_name = $1 AND column_name = $2)",
    )
    .bind(table)
    .bind(column)
    .fetch_one(&mut *conn)
    .await?;
    Ok(exists)
}

async fn inspect_schema(conn: &mut PgConnection) -> Result<SchemaState> {
    Ok(SchemaState {
        module_table: table_exists(conn, MODULE_TABLE).await?,
        category_column: column_exists(conn, TEMPLATE_TABLE, "category").await?,
        account_category_column: column_exists(conn, TEMPLATE_TABLE, "account_category").await?,
        accounts_category_column: column_exists(conn, TEMPLATE_TABLE, "accounts_category").await?,
        template_account_table: table_exists(conn, TEMPLATE_ACCOUNT_TABLE).await?,
        property_table: table_exists(conn, PROPERTY_TABLE).await?,
    })
}

async fn load_legacy_properties(conn: &mut PgConnection) -> Result<Vec<LegacyProperty>> {
    let fields: Vec<String> = AccountKind::ALL
        .iter()
        .map(|kind| kind.field_name().to_string())
        .collect();
    let rows = sqlx::query(
        r#"
        SELECT f.name AS field, p.res, p.value, p.company
        FROM ir_property p
        JOIN ir_model_field f ON f.id = p.field
        WHERE f.model = 'product.template' AND f.name = ANY($1)
        "#,
    )
    .bind(fields)
    .fetch_all(&mut *conn)
    .await?;

    rows.iter()
        .map(|row| -> Result<LegacyProperty> {
            Ok(LegacyProperty {
                field: row.try_get("field")?,
                res: row.try_get("res")?,
                value: row.try_get("value")?,
                company: row.try_get("company")?,
            })
        })
        .collect()
}

async fn insert_template_accounts(
    conn: &mut PgConnection,
    rows: &[PlannedTemplateAccount],
) -> Result<()> {
    for row in rows {
        sqlx::query(
            r#"
            INSERT INTO product_template_account (
                id, template, company, account_expense, account_revenue,
                account_depreciation, account_asset, create_date
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(row.template)
        .bind(row.company)
        .bind(row.accounts.account_expense)
        .bind(row.accounts.account_revenue)
        .bind(row.accounts.account_depreciation)
        .bind(row.accounts.account_asset)
        .bind(Utc::now())
        .execute(&mut *conn)
        .await
        .with_context(|| format!("failed to port accounts of template {}", row.template))?;
    }
    Ok(())
}

/// Brings the product accounting schema up to date in one transaction.
/// Steps are chosen by [`plan_steps`] from the schema found before any
/// change, so running it again after a successful upgrade changes nothing.
pub async fn register(pool: &PgPool) -> Result<MigrationReport> {
    let mut tx = pool.begin().await?;
    let mut report = MigrationReport::default();

    let state = inspect_schema(&mut tx)
        .await
        .context("failed to inspect the product schema")?;
    let steps = plan_steps(&state);
    info!(?state, ?steps, "planned product accounting upgrade");

    if steps.rename_accounts_category {
        sqlx::query(RENAME_ACCOUNTS_CATEGORY_SQL)
            .execute(&mut *tx)
            .await
            .context("failed to rename account_category")?;
        report.renamed_accounts_category = true;
        info!("renamed product_template.account_category to accounts_category");
    }

    sqlx::query(CATEGORY_COLUMNS_SQL).execute(&mut *tx).await?;
    sqlx::query(TEMPLATE_COLUMNS_SQL).execute(&mut *tx).await?;

    if steps.copy_category {
        sqlx::query("UPDATE product_category SET accounting = TRUE")
            .execute(&mut *tx)
            .await?;
        report.templates_linked_to_category =
            sqlx::query("UPDATE product_template SET account_category = category")
                .execute(&mut *tx)
                .await?
                .rows_affected();
        info!(
            templates = report.templates_linked_to_category,
            "copied product category into account category"
        );
    }

    if steps.create_template_accounts {
        sqlx::query(TEMPLATE_ACCOUNT_SQL).execute(&mut *tx).await?;
        report.template_accounts_created = true;
    } else {
        info!("product_template_account already exists, legacy properties left untouched");
    }

    if steps.port_properties {
        let properties = load_legacy_properties(&mut tx)
            .await
            .context("failed to read legacy account properties")?;
        let plan = plan_template_accounts(&properties);
        insert_template_accounts(&mut tx, &plan.rows).await?;
        report.ported_template_accounts = plan.rows.len();
        report.skipped_properties = plan.skipped;
        info!(
            ported = plan.rows.len(),
            skipped = plan.skipped,
            "ported legacy account properties"
        );
    } else if steps.create_template_accounts {
        warn!("no legacy property table, nothing to port");
    }

    for sql in TAX_RELATION_SQL {
        sqlx::query(sql).execute(&mut *tx).await?;
    }

    tx.commit().await?;
    Ok(report)
}
