//! URL query encoding for list and filter options

use chrono::{DateTime, SecondsFormat, Utc};
use std::fmt::Display;

/// Options that flatten into URL query pairs
///
/// Unset fields must not emit a pair.
pub trait QueryParams {
    /// Ordered key/value pairs
    fn query_pairs(&self) -> Vec<(&'static str, String)>;

    /// Encode the pairs as a query string, or `None` when there are none
    fn to_query_string(&self) -> Option<String> {
        encode_pairs(&self.query_pairs())
    }
}

impl QueryParams for () {
    fn query_pairs(&self) -> Vec<(&'static str, String)> {
        Vec::new()
    }
}

impl<T: QueryParams> QueryParams for Option<T> {
    fn query_pairs(&self) -> Vec<(&'static str, String)> {
        self.as_ref().map(QueryParams::query_pairs).unwrap_or_default()
    }
}

impl<T: QueryParams + ?Sized> QueryParams for &T {
    fn query_pairs(&self) -> Vec<(&'static str, String)> {
        (**self).query_pairs()
    }
}

/// Percent-encode pairs as `k=v&k=v`
pub(crate) fn encode_pairs(pairs: &[(&'static str, String)]) -> Option<String> {
    if pairs.is_empty() {
        return None;
    }
    // Serializing string pairs cannot fail
    serde_urlencoded::to_string(pairs).ok()
}

/// Collects query pairs, skipping unset values
#[derive(Debug, Default)]
pub struct QueryBuilder {
    pairs: Vec<(&'static str, String)>,
}

impl QueryBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Always add a pair
    pub fn push(mut self, key: &'static str, value: impl Display) -> Self {
        self.pairs.push((key, value.to_string()));
        self
    }

    /// Add a pair when the value is set
    pub fn opt<V: Display>(self, key: &'static str, value: Option<V>) -> Self {
        match value {
            Some(value) => self.push(key, value),
            None => self,
        }
    }

    /// Add one pair per value, repeating the key
    pub fn many<I>(mut self, key: &'static str, values: I) -> Self
    where
        I: IntoIterator,
        I::Item: Display,
    {
        self.pairs
            .extend(values.into_iter().map(|v| (key, v.to_string())));
        self
    }

    /// Add a timestamp as unix seconds
    pub fn opt_unix(self, key: &'static str, value: Option<DateTime<Utc>>) -> Self {
        self.opt(key, value.map(|t| t.timestamp()))
    }

    /// Add a timestamp as RFC 3339
    pub fn opt_rfc3339(self, key: &'static str, value: Option<DateTime<Utc>>) -> Self {
        self.opt(
            key,
            value.map(|t| t.to_rfc3339_opts(SecondsFormat::AutoSi, true)),
        )
    }

    pub fn build(self) -> Vec<(&'static str, String)> {
        self.pairs
    }
}
