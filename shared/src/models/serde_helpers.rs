//! Common serde helpers for request payloads

use serde::{Deserialize, Deserializer};

/// Distinguish an absent field from an explicit `null`
///
/// Use with `#[serde(default, deserialize_with = "serde_helpers::double_option")]`:
/// - field absent -> `None`
/// - field `null` -> `Some(None)`
/// - field value  -> `Some(Some(v))`
pub fn double_option<'de, T, D>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    T: Deserialize<'de>,
    D: Deserializer<'de>,
{
    Option::<T>::deserialize(deserializer).map(Some)
}

/// Deserialize bool that treats null as true
pub fn bool_true<'de, D>(deserializer: D) -> Result<bool, D::Error>
where
    D: Deserializer<'de>,
{
    Option::<bool>::deserialize(deserializer).map(|opt| opt.unwrap_or(true))
}

/// Deserialize bool that treats null as false
pub fn bool_false<'de, D>(deserializer: D) -> Result<bool, D::Error>
where
    D: Deserializer<'de>,
{
    Option::<bool>::deserialize(deserializer).map(|opt| opt.unwrap_or(false))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Deserialize)]
    struct Patch {
        #[serde(default, deserialize_with = "double_option")]
        parent: Option<Option<i64>>,
        #[serde(default = "yes", deserialize_with = "bool_true")]
        is_active: bool,
    }

    fn yes() -> bool {
        true
    }

    #[test]
    fn test_double_option_states() {
        let absent: Patch = serde_json::from_str("{}").unwrap();
        assert_eq!(absent.parent, None);
        assert!(absent.is_active);

        let null: Patch = serde_json::from_str(r#"{"parent":null,"is_active":null}"#).unwrap();
        assert_eq!(null.parent, Some(None));
        assert!(null.is_active);

        let set: Patch = serde_json::from_str(r#"{"parent":7,"is_active":false}"#).unwrap();
        assert_eq!(set.parent, Some(Some(7)));
        assert!(!set.is_active);
    }
}
