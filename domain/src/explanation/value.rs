//! Field values carried by explanation records

use serde::ser::Error as _;
use serde::{Deserialize, Serialize, Serializer};
use std::collections::BTreeMap;

/// A JSON-like value with integers and floats kept apart
///
/// Floats always encode with a fractional part or exponent (`1.0`, not
/// `1`), so an `Int` never decodes as a `Float` or vice versa. Non-finite
/// floats have no textual form: encoding one is an error.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum FieldValue {
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    Text(String),
    List(Vec<FieldValue>),
    Map(BTreeMap<String, FieldValue>),
}

impl FieldValue {
    /// Numeric view of `Int` and `Float` values.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            FieldValue::Int(i) => Some(*i as f64),
            FieldValue::Float(f) => Some(*f),
            _ => None,
        }
    }

    pub fn as_i64(&self) -> Option<i64> {
        match self {
            FieldValue::Int(i) => Some(*i),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            FieldValue::Text(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_list(&self) -> Option<&[FieldValue]> {
        match self {
            FieldValue::List(items) => Some(items),
            _ => None,
        }
    }

    /// A list of numbers as `Vec<f64>`; `None` if any element is not numeric.
    pub fn as_f64_vec(&self) -> Option<Vec<f64>> {
        self.as_list()?.iter().map(FieldValue::as_f64).collect()
    }

    /// False if a NaN or infinite float appears anywhere inside.
    pub fn is_finite(&self) -> bool {
        match self {
            FieldValue::Float(f) => f.is_finite(),
            FieldValue::List(items) => items.iter().all(FieldValue::is_finite),
            FieldValue::Map(entries) => entries.values().all(FieldValue::is_finite),
            _ => true,
        }
    }
}

impl Serialize for FieldValue {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match self {
            FieldValue::Null => serializer.serialize_unit(),
            FieldValue::Bool(b) => serializer.serialize_bool(*b),
            FieldValue::Int(i) => serializer.serialize_i64(*i),
            FieldValue::Float(f) if !f.is_finite() => Err(S::Error::custom(format!(
                "non-finite number {} has no textual form",
                f
            ))),
            FieldValue::Float(f) => serializer.serialize_f64(*f),
            FieldValue::Text(s) => serializer.serialize_str(s),
            FieldValue::List(items) => items.serialize(serializer),
            FieldValue::Map(entries) => entries.serialize(serializer),
        }
    }
}

impl From<f64> for FieldValue {
    fn from(value: f64) -> Self {
        FieldValue::Float(value)
    }
}

impl From<i64> for FieldValue {
    fn from(value: i64) -> Self {
        FieldValue::Int(value)
    }
}

impl From<usize> for FieldValue {
    fn from(value: usize) -> Self {
        FieldValue::Int(i64::try_from(value).unwrap_or(i64::MAX))
    }
}

impl From<bool> for FieldValue {
    fn from(value: bool) -> Self {
        FieldValue::Bool(value)
    }
}

impl From<&str> for FieldValue {
    fn from(value: &str) -> Self {
        FieldValue::Text(value.to_string())
    }
}

impl From<String> for FieldValue {
    fn from(value: String) -> Self {
        FieldValue::Text(value)
    }
}

impl<T: Into<FieldValue>> From<Vec<T>> for FieldValue {
    fn from(values: Vec<T>) -> Self {
        FieldValue::List(values.into_iter().map(Into::into).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_int_and_float_stay_distinct() {
        let int: FieldValue = serde_json::from_str("3").unwrap();
        let float: FieldValue = serde_json::from_str("3.0").unwrap();
        assert_eq!(int, FieldValue::Int(3));
        assert_eq!(float, FieldValue::Float(3.0));
        assert_eq!(serde_json::to_string(&float).unwrap(), "3.0");
    }

    #[test]
    fn test_nested_lists() {
        let matrix = FieldValue::from(vec![vec![0.5, 1.5], vec![2.0, -1.0]]);
        let json = serde_json::to_string(&matrix).unwrap();
        assert_eq!(json, "[[0.5,1.5],[2.0,-1.0]]");
        assert_eq!(serde_json::from_str::<FieldValue>(&json).unwrap(), matrix);
    }

    #[test]
    fn test_numeric_views() {
        assert_eq!(FieldValue::Int(2).as_f64(), Some(2.0));
        assert_eq!(FieldValue::from("x").as_f64(), None);
        assert_eq!(
            FieldValue::from(vec![1.0, 2.0]).as_f64_vec(),
            Some(vec![1.0, 2.0])
        );
        assert_eq!(
            FieldValue::List(vec![FieldValue::Int(1), FieldValue::Null]).as_f64_vec(),
            None
        );
    }

    #[test]
    fn test_non_finite_refuses_to_encode() {
        for value in [f64::NAN, f64::INFINITY, f64::NEG_INFINITY] {
            assert!(serde_json::to_string(&FieldValue::Float(value)).is_err());
            let nested = FieldValue::from(vec![FieldValue::Float(0.5), FieldValue::Float(value)]);
            assert!(serde_json::to_string(&nested).is_err());
            assert!(!nested.is_finite());
        }
    }

    #[test]
    fn test_null_still_encodes() {
        assert_eq!(serde_json::to_string(&FieldValue::Null).unwrap(), "null");
        assert!(FieldValue::Null.is_finite());
    }
}
