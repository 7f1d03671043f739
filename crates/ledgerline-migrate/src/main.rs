use anyhow::{Context, Result};
use ledgerline_platform::{ServiceConfig, connect_database, register};
use tracing::info;

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            std::env::var("RUST_LOG")
                .unwrap_or_else(|_| "ledgerline_migrate=info,ledgerline_platform=info".to_string()),
        )
        .init();

    let config = ServiceConfig::from_env()?;
    let pool = connect_database(&config).await?;

    info!("upgrading product accounting schema");
    let report = register(&pool)
        .await
        .context("product accounting migration failed")?;

    info!(
        renamed_accounts_category = report.renamed_accounts_category,
        templates_linked_to_category = report.templates_linked_to_category,
        template_accounts_created = report.template_accounts_created,
        ported_template_accounts = report.ported_template_accounts,
        skipped_properties = report.skipped_properties,
        "product accounting schema is up to date"
    );
    Ok(())
}
