pub mod context;
pub mod error;
pub mod kinds;
pub mod models;
pub mod multivalue;
pub mod storage;

pub use context::Context;
pub use error::{AccountingError, Result, ValidationError};
pub use kinds::{AccountKind, TaxKind};
pub use models::{Account, AccountType, Company, Tax, TaxGroupKind};
pub use multivalue::CompanyValues;
pub use storage::{Chart, ChartLookup};
