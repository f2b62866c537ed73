//! Serde adapter for boolean flags that older artifacts store as `0`/`1`.
//!
//! Use with `#[serde(with = "fxpca_model::flag")]`. Always writes a bool.

use serde::de::Error as _;
use serde::{Deserialize, Deserializer, Serializer};

#[derive(Deserialize)]
#[serde(untagged)]
enum RawFlag {
    Bool(bool),
    Int(i64),
}

pub fn serialize<S: Serializer>(value: &bool, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.serialize_bool(*value)
}

pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<bool, D::Error> {
    match RawFlag::deserialize(deserializer)? {
        RawFlag::Bool(b) => Ok(b),
        RawFlag::Int(0) => Ok(false),
        RawFlag::Int(1) => Ok(true),
        RawFlag::Int(n) => Err(D::Error::custom(format!("expected 0 or 1 for flag, got {n}"))),
    }
}

#[cfg(test)]
mod tests {
    use serde::{Deserialize, Serialize};

    #[derive(Debug, Serialize, Deserialize)]
    struct Row {
        #[serde(with = "crate::flag")]
        attack: bool,
    }

    #[test]
    fn test_accepts_bool_and_int() {
        let a: Row = serde_json::from_str(r#"{"attack": 1}"#).unwrap();
        let b: Row = serde_json::from_str(r#"{"attack": false}"#).unwrap();
        assert!(a.attack);
        assert!(!b.attack);
        assert!(serde_json::from_str::<Row>(r#"{"attack": 2}"#).is_err());
    }

    #[test]
    fn test_writes_bool() {
        let json = serde_json::to_string(&Row { attack: true }).unwrap();
        assert_eq!(json, r#"{"attack":true}"#);
    }
}
