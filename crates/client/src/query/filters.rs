//! Filter map for list queries.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Filter values keyed by name.
///
/// Key order carries no meaning; a sorted map keeps query strings stable.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Filters(BTreeMap<String, Value>);

impl Filters {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set one filter, replacing any previous value.
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<Value>) {
        self.0.insert(key.into(), value.into());
    }

    /// Merge several filters.
    pub fn merge<K, V>(&mut self, values: impl IntoIterator<Item = (K, V)>)
    where
        K: Into<String>,
        V: Into<Value>,
    {
        self.0
            .extend(values.into_iter().map(|(k, v)| (k.into(), v.into())));
    }

    /// Drop one filter. Returns whether it was present.
    pub fn remove(&mut self, key: &str) -> bool {
        self.0.remove(key).is_some()
    }

    pub fn clear(&mut self) {
        self.0.clear();
    }

    #[must_use]
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &Value)> {
        self.0.iter()
    }

    /// Render as URL query pairs.
    ///
    /// Strings are sent verbatim, arrays as comma-separated lists, and
    /// nulls are skipped.
    #[must_use]
    pub fn to_query_pairs(&self) -> Vec<(String, String)> {
        self.0
            .iter()
            .filter_map(|(key, value)| query_value(value).map(|v| (key.clone(), v)))
            .collect()
    }
}

fn query_value(value: &Value) -> Option<String> {
    match value {
        Value::Null => None,
        Value::String(s) => Some(s.clone()),
        Value::Array(items) => Some(
            items
                .iter()
                .filter_map(query_value)
                .collect::<Vec<_>>()
                .join(","),
        ),
        other => Some(other.to_string()),
    }
}

impl<K: Into<String>, V: Into<Value>> FromIterator<(K, V)> for Filters {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut filters = Self::new();
        filters.merge(iter);
        filters
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_merge_overrides() {
        let mut filters: Filters = [("category", json!(1)), ("sort", json!("rating"))]
            .into_iter()
            .collect();
        filters.merge([("sort", "distance")]);
        assert_eq!(filters.get("sort"), Some(&json!("distance")));
        assert_eq!(filters.len(), 2);
    }

    #[test]
    fn test_query_pairs() {
        let filters: Filters = [
            ("q", json!("bun cha")),
            ("category", json!([1, 2])),
            ("open", json!(true)),
            ("ignored", Value::Null),
        ]
        .into_iter()
        .collect();

        assert_eq!(
            filters.to_query_pairs(),
            vec![
                ("category".to_string(), "1,2".to_string()),
                ("open".to_string(), "true".to_string()),
                ("q".to_string(), "bun cha".to_string()),
            ]
        );
    }
}
