use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// A document value stored in a collection.
///
/// Collections are heterogeneous: the physical column is an untyped blob, so
/// one collection may hold integers next to nested maps. `Map` keys are kept
/// in a `BTreeMap` so structural equality does not depend on insertion order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Value {
    Null,
    Bool(bool),
    Integer(i64),
    Real(f64),
    Text(String),
    Blob(Vec<u8>),
    Array(Vec<Value>),
    Map(BTreeMap<String, Value>),
}

impl Value {
    /// Serialize to the opaque blob form stored in the `value` column.
    ///
    /// The byte layout is internal and not guaranteed stable across crate
    /// versions; blobs are only meaningful to the version that wrote them.
    pub(crate) fn encode(&self) -> Result<Vec<u8>> {
        bincode::serialize(self).map_err(|e| Error::Serialization(e.to_string()))
    }

    /// Inverse of [`Value::encode`]. Fails on truncated or foreign blobs.
    pub(crate) fn decode(bytes: &[u8]) -> Result<Value> {
        bincode::deserialize(bytes).map_err(|e| Error::Serialization(e.to_string()))
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    pub fn as_integer(&self) -> Option<i64> {
        match self {
            Value::Integer(n) => Some(*n),
            _ => None,
        }
    }

    pub fn as_real(&self) -> Option<f64> {
        match self {
            Value::Real(f) => Some(*f),
            _ => None,
        }
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            Value::Text(s) => Some(s),
            _ => None,
        }
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Bool(b)
    }
}

impl From<i32> for Value {
    fn from(n: i32) -> Self {
        Value::Integer(n as i64)
    }
}

impl From<i64> for Value {
    fn from(n: i64) -> Self {
        Value::Integer(n)
    }
}

impl From<f64> for Value {
    fn from(f: f64) -> Self {
        Value::Real(f)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::Text(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::Text(s)
    }
}

impl From<Vec<u8>> for Value {
    fn from(b: Vec<u8>) -> Self {
        Value::Blob(b)
    }
}

impl From<Vec<Value>> for Value {
    fn from(items: Vec<Value>) -> Self {
        Value::Array(items)
    }
}

impl From<BTreeMap<String, Value>> for Value {
    fn from(map: BTreeMap<String, Value>) -> Self {
        Value::Map(map)
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(opt: Option<T>) -> Self {
        match opt {
            Some(v) => v.into(),
            None => Value::Null,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn roundtrip(v: Value) {
        let bytes = v.encode().unwrap();
        assert_eq!(Value::decode(&bytes).unwrap(), v);
    }

    #[test]
    fn roundtrip_scalars() {
        roundtrip(Value::Null);
        roundtrip(Value::Bool(true));
        roundtrip(Value::Integer(-42));
        roundtrip(Value::Integer(i64::MAX));
        roundtrip(Value::Real(3.14));
        roundtrip(Value::Text(String::new()));
        roundtrip(Value::Text("hello world!".into()));
        roundtrip(Value::Blob(vec![0, 255, 1, 254]));
    }

    #[test]
    fn roundtrip_nested() {
        let grades: BTreeMap<String, Value> = [
            ("john".to_string(), Value::Real(3.5)),
            ("jim".to_string(), Value::Real(4.0)),
            ("james".to_string(), Value::Integer(2)),
        ]
        .into_iter()
        .collect();
        roundtrip(Value::Map(grades.clone()));
        roundtrip(Value::Array(vec![
            Value::Map(grades),
            Value::Null,
            Value::Array(vec![Value::Text("deep".into())]),
        ]));
    }

    #[test]
    fn decode_rejects_garbage() {
        assert!(matches!(
            Value::decode(&[0xde, 0xad, 0xbe, 0xef, 0x00]),
            Err(Error::Serialization(_))
        ));
        assert!(matches!(Value::decode(&[]), Err(Error::Serialization(_))));
    }

    #[test]
    fn from_impls() {
        assert_eq!(Value::from(5i64), Value::Integer(5));
        assert_eq!(Value::from(5i32), Value::Integer(5));
        assert_eq!(Value::from("abc"), Value::Text("abc".into()));
        assert_eq!(Value::from(2.71), Value::Real(2.71));
        assert_eq!(Value::from(None::<i64>), Value::Null);
        assert_eq!(Value::from(Some("x")), Value::Text("x".into()));
    }
}
