//! Lenient query-string parsing
//!
//! Listing filters never reject a request: a malformed value simply turns
//! the filter off.

use axum::extract::{FromRequestParts, Query};
use http::request::Parts;
use rust_decimal::Decimal;
use shared::PageRequest;
use std::collections::HashMap;
use std::convert::Infallible;
use std::str::FromStr;

/// Raw query parameters with typed, forgiving accessors
#[derive(Debug, Clone, Default)]
pub struct QueryParams(HashMap<String, String>);

impl QueryParams {
    pub fn from_pairs<I, K, V>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        Self(
            pairs
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        )
    }

    /// Raw value as sent
    pub fn raw(&self, key: &str) -> Option<&str> {
        self.0.get(key).map(String::as_str)
    }

    /// Trimmed, non-empty value
    pub fn text(&self, key: &str) -> Option<&str> {
        self.raw(key).map(str::trim).filter(|v| !v.is_empty())
    }

    pub fn i64(&self, key: &str) -> Option<i64> {
        self.text(key).and_then(|v| v.parse().ok())
    }

    /// `true/1/yes` or `false/0/no`, case-insensitive
    pub fn bool(&self, key: &str) -> Option<bool> {
        match self.text(key)?.to_ascii_lowercase().as_str() {
            "true" | "1" | "yes" => Some(true),
            "false" | "0" | "no" => Some(false),
            _ => None,
        }
    }

    pub fn decimal(&self, key: &str) -> Option<Decimal> {
        self.text(key).and_then(|v| Decimal::from_str(v).ok())
    }

    /// Comma-separated ids; any malformed entry drops the whole list
    pub fn id_list(&self, key: &str) -> Option<Vec<i64>> {
        let raw = self.text(key)?;
        raw.split(',')
            .map(|part| part.trim().parse::<i64>().ok())
            .collect()
    }

    /// Comma-separated strings, blanks removed
    pub fn text_list(&self, key: &str) -> Option<Vec<String>> {
        let items: Vec<String> = self
            .text(key)?
            .split(',')
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(String::from)
            .collect();
        (!items.is_empty()).then_some(items)
    }

    /// Positive limit, capped at `max`, else `default`
    pub fn limit(&self, key: &str, default: i64, max: i64) -> i64 {
        self.i64(key)
            .filter(|n| *n > 0)
            .map(|n| n.min(max))
            .unwrap_or(default)
    }

    pub fn page(&self) -> PageRequest {
        PageRequest::from_raw(self.raw("page"))
    }
}

impl<S: Send + Sync> FromRequestParts<S> for QueryParams {
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let params = Query::<HashMap<String, String>>::from_request_parts(parts, state)
            .await
            .map(|Query(map)| Self(map))
            .unwrap_or_default();
        Ok(params)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_malformed_values_are_ignored() {
        let params = QueryParams::from_pairs([
            ("min_price", "abc"),
            ("in_stock", "maybe"),
            ("categories", "1,x,3"),
            ("limit", "-4"),
            ("page", "zero"),
        ]);
        assert_eq!(params.decimal("min_price"), None);
        assert_eq!(params.bool("in_stock"), None);
        assert_eq!(params.id_list("categories"), None);
        assert_eq!(params.limit("limit", 20, 100), 20);
        assert_eq!(params.page().page, 1);
    }

    #[test]
    fn test_well_formed_values() {
        let params = QueryParams::from_pairs([
            ("min_price", "10"),
            ("in_stock", "TRUE"),
            ("categories", "1, 2,3"),
            ("brands", "Apple,,Samsung"),
            ("limit", "500"),
            ("search", "  "),
        ]);
        assert_eq!(params.decimal("min_price"), Some(Decimal::from(10)));
        assert_eq!(params.bool("in_stock"), Some(true));
        assert_eq!(params.id_list("categories"), Some(vec![1, 2, 3]));
        assert_eq!(
            params.text_list("brands"),
            Some(vec!["Apple".to_string(), "Samsung".to_string()])
        );
        assert_eq!(params.limit("limit", 20, 100), 100);
        assert_eq!(params.text("search"), None);
    }
}
