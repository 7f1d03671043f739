use rust_decimal::Decimal;
use thiserror::Error;
use uuid::Uuid;

use crate::kinds::{AccountKind, TaxKind};

/// Constraint violations rejected when a record is written.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("account {account} cannot be used as {kind} account: it is not a {required} account")]
    AccountType {
        account: Uuid,
        kind: AccountKind,
        required: &'static str,
    },

    #[error("account {account} does not belong to company {company}")]
    AccountCompany { account: Uuid, company: Uuid },

    #[error("tax {tax} is a child tax and cannot be assigned to a product")]
    ChildTax { tax: Uuid },

    #[error("tax {tax} belongs to a group that excludes {kind} taxes")]
    TaxGroup { tax: Uuid, kind: TaxKind },

    #[error("supplier taxes deductible rate {rate} is outside [0, 1]")]
    DeductibleRate { rate: Decimal },

    #[error("\"{name}\" uses its category's accounts or taxes but has no account category")]
    CategoryRequired { name: String },

    #[error("category {category} is not an accounting category")]
    NotAccountingCategory { category: Uuid },

    #[error("category {category} is still used for accounting by record {holder}")]
    AccountingCategoryInUse { category: Uuid, holder: Uuid },
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AccountingError {
    #[error("no {kind} account configured for \"{name}\"")]
    Configuration { kind: AccountKind, name: String },

    #[error("validation failed: {0}")]
    Validation(#[from] ValidationError),

    #[error("category chain loops back to category {0}")]
    CategoryCycle(Uuid),

    #[error("unknown category: {0}")]
    UnknownCategory(Uuid),

    #[error("unknown template: {0}")]
    UnknownTemplate(Uuid),

    #[error("unknown product: {0}")]
    UnknownProduct(Uuid),

    #[error("unknown account: {0}")]
    UnknownAccount(Uuid),

    #[error("unknown tax: {0}")]
    UnknownTax(Uuid),

    #[error("tax {tax} is still assigned to record {holder}")]
    TaxInUse { tax: Uuid, holder: Uuid },

    #[error("a company is required in the context to set {0}")]
    MissingCompany(&'static str),
}

pub type Result<T> = std::result::Result<T, AccountingError>;
