//! Query string builder
//!
//! Each `add_*` method applies a filtering rule so callers can pass optional
//! filters straight through: empty strings, non-positive numbers and unset
//! times are dropped instead of being sent as `key=`.

use std::collections::{BTreeMap, HashMap};

use chrono::{DateTime, SecondsFormat, Utc};

/// Fluent accumulator of query parameters
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct QueryBuilder {
    params: BTreeMap<String, String>,
}

impl QueryBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a string value, skipping empty strings
    pub fn add_string(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        let value = value.into();
        if !value.is_empty() {
            self.params.insert(key.into(), value);
        }
        self
    }

    /// Add an integer, skipping zero and negative values
    pub fn add_int(self, key: impl Into<String>, value: i32) -> Self {
        self.add_int64(key, i64::from(value))
    }

    /// Add a 64-bit integer, skipping zero and negative values
    pub fn add_int64(mut self, key: impl Into<String>, value: i64) -> Self {
        if value > 0 {
            self.params.insert(key.into(), value.to_string());
        }
        self
    }

    /// Add a boolean; both `true` and `false` are always sent
    pub fn add_bool(mut self, key: impl Into<String>, value: bool) -> Self {
        self.params.insert(key.into(), value.to_string());
        self
    }

    /// Add a timestamp in RFC 3339, skipping `None`
    pub fn add_time(mut self, key: impl Into<String>, value: Option<DateTime<Utc>>) -> Self {
        if let Some(time) = value {
            self.params
                .insert(key.into(), time.to_rfc3339_opts(SecondsFormat::Secs, true));
        }
        self
    }

    /// Add a comma-joined list, dropping empty elements
    pub fn add_string_slice<S: AsRef<str>>(mut self, key: impl Into<String>, values: &[S]) -> Self {
        let joined = values
            .iter()
            .map(AsRef::as_ref)
            .filter(|v| !v.is_empty())
            .collect::<Vec<_>>()
            .join(",");
        if !joined.is_empty() {
            self.params.insert(key.into(), joined);
        }
        self
    }

    /// Add a comma-joined list of integers, skipping empty slices
    pub fn add_int_slice(mut self, key: impl Into<String>, values: &[i64]) -> Self {
        if !values.is_empty() {
            let joined = values
                .iter()
                .map(i64::to_string)
                .collect::<Vec<_>>()
                .join(",");
            self.params.insert(key.into(), joined);
        }
        self
    }

    /// Add a pre-formatted value as-is, skipping empty strings
    pub fn add_custom(self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.add_string(key, value)
    }

    /// Copy entries from a map, skipping empty values
    pub fn merge<K, V, I>(mut self, other: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        for (key, value) in other {
            let value = value.into();
            if !value.is_empty() {
                self.params.insert(key.into(), value);
            }
        }
        self
    }

    pub fn remove(mut self, key: &str) -> Self {
        self.params.remove(key);
        self
    }

    pub fn has(&self, key: &str) -> bool {
        self.params.contains_key(key)
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.params.get(key).map(String::as_str)
    }

    pub fn count(&self) -> usize {
        self.params.len()
    }

    pub fn is_empty(&self) -> bool {
        self.params.is_empty()
    }

    /// Copy of the accumulated parameters
    pub fn build(&self) -> HashMap<String, String> {
        self.params
            .iter()
            .map(|(k, v)| (k.clone(), v.clone()))
            .collect()
    }

    /// Percent-encoded `key=value` pairs joined with `&`, sorted by key
    pub fn build_string(&self) -> String {
        self.params
            .iter()
            .map(|(k, v)| format!("{}={}", urlencoding::encode(k), urlencoding::encode(v)))
            .collect::<Vec<_>>()
            .join("&")
    }

    /// Borrowed pairs for handing to the transport
    pub(crate) fn pairs(&self) -> impl Iterator<Item = (&str, &str)> {
        self.params.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for QueryBuilder {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        QueryBuilder::new().merge(iter)
    }
}
