use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Company {
    pub id: Uuid,
    pub name: String,
}

impl Company {
    pub fn new(name: &str) -> Self {
        Self {
            id: Uuid::new_v4(),
            name: name.to_string(),
        }
    }
}

/// Type flags of an account, as carried by its account type in the chart.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct AccountType {
    pub expense: bool,
    pub revenue: bool,
    pub fixed_asset: bool,
}

impl AccountType {
    pub fn expense() -> Self {
        Self {
            expense: true,
            ..Self::default()
        }
    }

    pub fn revenue() -> Self {
        Self {
            revenue: true,
            ..Self::default()
        }
    }

    pub fn fixed_asset() -> Self {
        Self {
            fixed_asset: true,
            ..Self::default()
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Account {
    pub id: Uuid,
    pub company: Uuid,
    pub code: String,
    pub name: String,
    pub kind: AccountType,
}

impl Account {
    pub fn new(company: Uuid, code: &str, name: &str, kind: AccountType) -> Self {
        Self {
            id: Uuid::new_v4(),
            company,
            code: code.to_string(),
            name: name.to_string(),
            kind,
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum TaxGroupKind {
    Sale,
    Purchase,
    Both,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Tax {
    pub id: Uuid,
    pub company: Uuid,
    pub name: String,
    pub parent: Option<Uuid>,
    pub group: Option<TaxGroupKind>,
    pub sequence: Option<i32>,
}

impl Tax {
    pub fn new(company: Uuid, name: &str, group: Option<TaxGroupKind>) -> Self {
        Self {
            id: Uuid::new_v4(),
            company,
            name: name.to_string(),
            parent: None,
            group,
            sequence: None,
        }
    }

    pub fn is_top_level(&self) -> bool {
        self.parent.is_none()
    }

    /// Display order of taxes on a product: by sequence with unsequenced
    /// taxes last, then by id.
    pub fn sort_key(&self) -> (bool, i32, Uuid) {
        (self.sequence.is_none(), self.sequence.unwrap_or_default(), self.id)
    }
}
