//! Per-instance explanation records

use super::value::FieldValue;
use serde::de::{self, Visitor};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::collections::BTreeMap;

/// Algorithm-specific fields of one record, ordered by key
pub type Fields = BTreeMap<String, FieldValue>;

/// Which instance a record explains
///
/// Encodes as the instance's position in the query batch, or as the
/// string `"global"` for a model-level explanation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum InstanceId {
    Index(usize),
    Global,
}

impl InstanceId {
    pub fn is_global(&self) -> bool {
        matches!(self, InstanceId::Global)
    }

    pub fn index(&self) -> Option<usize> {
        match self {
            InstanceId::Index(i) => Some(*i),
            InstanceId::Global => None,
        }
    }
}

impl std::fmt::Display for InstanceId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            InstanceId::Index(i) => write!(f, "{}", i),
            InstanceId::Global => write!(f, "global"),
        }
    }
}

impl Serialize for InstanceId {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match self {
            InstanceId::Index(i) => serializer.serialize_u64(*i as u64),
            InstanceId::Global => serializer.serialize_str("global"),
        }
    }
}

struct InstanceIdVisitor;

impl Visitor<'_> for InstanceIdVisitor {
    type Value = InstanceId;

    fn expecting(&self, formatter: &mut std::fmt::Formatter) -> std::fmt::Result {
        formatter.write_str("a non-negative instance index or \"global\"")
    }

    fn visit_u64<E: de::Error>(self, v: u64) -> Result<Self::Value, E> {
        usize::try_from(v)
            .map(InstanceId::Index)
            .map_err(|_| E::custom(format!("instance index {} out of range", v)))
    }

    fn visit_i64<E: de::Error>(self, v: i64) -> Result<Self::Value, E> {
        if v < 0 {
            return Err(E::invalid_value(de::Unexpected::Signed(v), &self));
        }
        self.visit_u64(v as u64)
    }

    fn visit_str<E: de::Error>(self, v: &str) -> Result<Self::Value, E> {
        if v == "global" {
            Ok(InstanceId::Global)
        } else {
            Err(E::invalid_value(de::Unexpected::Str(v), &self))
        }
    }
}

impl<'de> Deserialize<'de> for InstanceId {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        deserializer.deserialize_any(InstanceIdVisitor)
    }
}

/// One explanation payload: an instance identifier plus keyed fields
///
/// Records are immutable once they are part of an
/// [`Explanation`](super::Explanation).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ExplanationRecord {
    instance_id: InstanceId,
    fields: Fields,
}

impl ExplanationRecord {
    pub(crate) fn new(instance_id: InstanceId, fields: Fields) -> Self {
        Self {
            instance_id,
            fields,
        }
    }

    pub fn instance_id(&self) -> InstanceId {
        self.instance_id
    }

    pub fn fields(&self) -> &Fields {
        &self.fields
    }

    pub fn get(&self, key: &str) -> Option<&FieldValue> {
        self.fields.get(key)
    }

    /// Shorthand for `get(key)` as a number.
    pub fn get_f64(&self, key: &str) -> Option<f64> {
        self.get(key).and_then(FieldValue::as_f64)
    }
}

impl std::ops::Index<&str> for ExplanationRecord {
    type Output = FieldValue;

    fn index(&self, key: &str) -> &Self::Output {
        &self.fields[key]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_instance_id_encoding() {
        assert_eq!(serde_json::to_string(&InstanceId::Index(4)).unwrap(), "4");
        assert_eq!(
            serde_json::to_string(&InstanceId::Global).unwrap(),
            "\"global\""
        );
        assert_eq!(
            serde_json::from_str::<InstanceId>("\"global\"").unwrap(),
            InstanceId::Global
        );
        assert_eq!(
            serde_json::from_str::<InstanceId>("12").unwrap(),
            InstanceId::Index(12)
        );
    }

    #[test]
    fn test_instance_id_rejects_garbage() {
        assert!(serde_json::from_str::<InstanceId>("-1").is_err());
        assert!(serde_json::from_str::<InstanceId>("1.5").is_err());
        assert!(serde_json::from_str::<InstanceId>("\"local\"").is_err());
        assert!(serde_json::from_str::<InstanceId>("null").is_err());
    }

    #[test]
    fn test_record_requires_instance_id() {
        let missing = serde_json::from_str::<ExplanationRecord>(r#"{"fields":{"score":1.0}}"#);
        assert!(missing.is_err());
    }

    #[test]
    fn test_record_accessors() {
        let mut fields = Fields::new();
        fields.insert("score".to_string(), FieldValue::Float(0.5));
        let record = ExplanationRecord::new(InstanceId::Index(0), fields);
        assert_eq!(record.get_f64("score"), Some(0.5));
        assert_eq!(record["score"], FieldValue::Float(0.5));
        assert!(record.get("missing").is_none());
    }
}
