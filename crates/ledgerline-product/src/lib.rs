pub mod assignment;
pub mod category;
pub mod config;
pub mod product;
pub mod template;
pub mod validate;

pub use assignment::{AccountAssignment, CategoryAccount, TemplateAccount};
pub use category::{Category, CategoryLookup};
pub use config::{AccountConfiguration, AccountingDefaults, ProductConfiguration};
pub use product::Product;
pub use template::Template;
