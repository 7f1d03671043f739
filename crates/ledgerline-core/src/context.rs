use uuid::Uuid;

/// Ambient request context. Per-company values are read for `company`;
/// without a company every per-company read comes back empty.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Context {
    pub company: Option<Uuid>,
}

impl Context {
    pub fn for_company(company: Uuid) -> Self {
        Self {
            company: Some(company),
        }
    }
}
