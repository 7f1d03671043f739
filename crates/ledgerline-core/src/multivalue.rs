use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::context::Context;

/// One logical field holding a separate value per company.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CompanyValues<V> {
    values: BTreeMap<Uuid, V>,
}

impl<V> Default for CompanyValues<V> {
    fn default() -> Self {
        Self {
            values: BTreeMap::new(),
        }
    }
}

impl<V> CompanyValues<V> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, company: Uuid) -> Option<&V> {
        self.values.get(&company)
    }

    /// Value for the context's company, if the context has one.
    pub fn current(&self, ctx: &Context) -> Option<&V> {
        ctx.company.and_then(|company| self.get(company))
    }

    pub fn set(&mut self, company: Uuid, value: V) -> Option<V> {
        self.values.insert(company, value)
    }

    pub fn remove(&mut self, company: Uuid) -> Option<V> {
        self.values.remove(&company)
    }

    pub fn entry_or_default(&mut self, company: Uuid) -> &mut V
    where
        V: Default,
    {
        self.values.entry(company).or_default()
    }

    pub fn iter(&self) -> impl Iterator<Item = (Uuid, &V)> {
        self.values.iter().map(|(company, value)| (*company, value))
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn values_are_isolated_per_company() {
        let a = Uuid::new_v4();
        let b = Uuid::new_v4();
        let mut values = CompanyValues::new();
        values.set(a, 1);
        values.set(b, 2);

        assert_eq!(values.current(&Context::for_company(a)), Some(&1));
        assert_eq!(values.current(&Context::for_company(b)), Some(&2));
        assert_eq!(values.current(&Context::default()), None);

        assert_eq!(values.set(a, 3), Some(1));
        assert_eq!(values.get(b), Some(&2));
    }

    #[test]
    fn deserializes_from_company_keyed_object() {
        let company = Uuid::new_v4();
        let account = Uuid::new_v4();
        let json = format!(r#"{{"{company}": "{account}"}}"#);

        let values: CompanyValues<Uuid> = serde_json::from_str(&json).unwrap();
        assert_eq!(values.get(company), Some(&account));
        assert_eq!(values.len(), 1);
    }
}
