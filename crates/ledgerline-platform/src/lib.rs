pub mod config;
pub mod db;
pub mod migration;

pub use config::ServiceConfig;
pub use db::connect_database;
pub use migration::{MigrationReport, SchemaState, UpgradeSteps, plan_steps, register};
