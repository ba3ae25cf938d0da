//! # Typed Values
//!
//! What a validated record holds: the untyped tree with nested records
//! materialized as [`Record`] instances and containers rebuilt into their
//! declared kind.

use std::fmt;

use mspec_core::{Map, Value};

use crate::record::Record;
use crate::types::{ScalarKind, SequenceKind};

/// A validated value.
#[derive(Debug, Clone)]
pub enum TypedValue {
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    Str(String),
    List(Vec<TypedValue>),
    Set(Vec<TypedValue>),
    Tuple(Vec<TypedValue>),
    /// Entries in input order.
    Map(Vec<(TypedValue, TypedValue)>),
    Record(Box<Record>),
}

impl TypedValue {
    /// Lower into the untyped tree. Nested records serialize through
    /// [`Record::to_map`], so their union tags are restored.
    pub fn to_value(&self) -> Value {
        match self {
            Self::Null => Value::Null,
            Self::Bool(b) => Value::Bool(*b),
            Self::Int(i) => Value::Int(*i),
            Self::Float(x) => Value::Float(*x),
            Self::Str(s) => Value::Str(s.clone()),
            Self::List(items) => Value::List(items.iter().map(Self::to_value).collect()),
            Self::Set(items) => Value::Set(items.iter().map(Self::to_value).collect()),
            Self::Tuple(items) => Value::Tuple(items.iter().map(Self::to_value).collect()),
            Self::Map(entries) => Value::Map(
                entries
                    .iter()
                    .map(|(k, v)| (k.to_value(), v.to_value()))
                    .collect::<Map>(),
            ),
            Self::Record(record) => record.to_map(),
        }
    }

    pub(crate) fn scalar_kind(&self) -> Option<ScalarKind> {
        match self {
            Self::Null => Some(ScalarKind::Null),
            Self::Bool(_) => Some(ScalarKind::Bool),
            Self::Int(_) => Some(ScalarKind::Int),
            Self::Float(_) => Some(ScalarKind::Float),
            Self::Str(_) => Some(ScalarKind::Str),
            _ => None,
        }
    }

    pub(crate) fn sequence_kind(&self) -> Option<SequenceKind> {
        match self {
            Self::List(_) => Some(SequenceKind::List),
            Self::Set(_) => Some(SequenceKind::Set),
            Self::Tuple(_) => Some(SequenceKind::Tuple),
            _ => None,
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Self::Bool(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_int(&self) -> Option<i64> {
        match self {
            Self::Int(i) => Some(*i),
            _ => None,
        }
    }

    pub fn as_float(&self) -> Option<f64> {
        match self {
            Self::Float(x) => Some(*x),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::Str(s) => Some(s),
            _ => None,
        }
    }

    /// Elements of any sequence kind.
    pub fn as_sequence(&self) -> Option<&[TypedValue]> {
        match self {
            Self::List(items) | Self::Set(items) | Self::Tuple(items) => Some(items),
            _ => None,
        }
    }

    pub fn as_map(&self) -> Option<&[(TypedValue, TypedValue)]> {
        match self {
            Self::Map(entries) => Some(entries),
            _ => None,
        }
    }

    pub fn as_record(&self) -> Option<&Record> {
        match self {
            Self::Record(record) => Some(record),
            _ => None,
        }
    }

    /// Look up a string key of a map value.
    pub fn get(&self, key: &str) -> Option<&TypedValue> {
        self.as_map()?
            .iter()
            .find(|(k, _)| k.as_str() == Some(key))
            .map(|(_, v)| v)
    }
}

/// Structural lift: containers keep their kind, maps keep their order.
impl From<&Value> for TypedValue {
    fn from(value: &Value) -> Self {
        match value {
            Value::Null => Self::Null,
            Value::Bool(b) => Self::Bool(*b),
            Value::Int(i) => Self::Int(*i),
            Value::Float(x) => Self::Float(*x),
            Value::Str(s) => Self::Str(s.clone()),
            Value::List(items) => Self::List(items.iter().map(Self::from).collect()),
            Value::Set(items) => Self::Set(items.iter().map(Self::from).collect()),
            Value::Tuple(items) => Self::Tuple(items.iter().map(Self::from).collect()),
            Value::Map(map) => Self::Map(
                map.iter()
                    .map(|(k, v)| (Self::from(k), Self::from(v)))
                    .collect(),
            ),
        }
    }
}

fn unordered_eq<T: PartialEq>(a: &[T], b: &[T]) -> bool {
    a.len() == b.len() && a.iter().all(|x| b.contains(x)) && b.iter().all(|y| a.contains(y))
}

impl PartialEq for TypedValue {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::Null, Self::Null) => true,
            (Self::Bool(a), Self::Bool(b)) => a == b,
            (Self::Int(a), Self::Int(b)) => a == b,
            (Self::Float(a), Self::Float(b)) => a == b,
            (Self::Str(a), Self::Str(b)) => a == b,
            (Self::List(a), Self::List(b)) | (Self::Tuple(a), Self::Tuple(b)) => a == b,
            (Self::Set(a), Self::Set(b)) => unordered_eq(a, b),
            (Self::Map(a), Self::Map(b)) => unordered_eq(a, b),
            (Self::Record(a), Self::Record(b)) => a == b,
            _ => false,
        }
    }
}

impl fmt::Display for TypedValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fn join(f: &mut fmt::Formatter<'_>, items: &[TypedValue]) -> fmt::Result {
            for (i, item) in items.iter().enumerate() {
                if i > 0 {
                    f.write_str(", ")?;
                }
                write!(f, "{item}")?;
            }
            Ok(())
        }

        match self {
            Self::Null => f.write_str("None"),
            Self::Bool(b) => write!(f, "{b}"),
            Self::Int(i) => write!(f, "{i}"),
            Self::Float(x) => write!(f, "{x:?}"),
            Self::Str(s) => write!(f, "{s:?}"),
            Self::List(items) => {
                f.write_str("[")?;
                join(f, items)?;
                f.write_str("]")
            }
            Self::Set(items) => {
                f.write_str("{")?;
                join(f, items)?;
                f.write_str("}")
            }
            Self::Tuple(items) => {
                f.write_str("(")?;
                join(f, items)?;
                f.write_str(")")
            }
            Self::Map(entries) => {
                f.write_str("{")?;
                for (i, (k, v)) in entries.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{k}: {v}")?;
                }
                f.write_str("}")
            }
            Self::Record(record) => write!(f, "{record}"),
        }
    }
}

impl From<bool> for TypedValue {
    fn from(b: bool) -> Self {
        Self::Bool(b)
    }
}

impl From<i64> for TypedValue {
    fn from(i: i64) -> Self {
        Self::Int(i)
    }
}

impl From<i32> for TypedValue {
    fn from(i: i32) -> Self {
        Self::Int(i64::from(i))
    }
}

impl From<f64> for TypedValue {
    fn from(x: f64) -> Self {
        Self::Float(x)
    }
}

impl From<&str> for TypedValue {
    fn from(s: &str) -> Self {
        Self::Str(s.to_string())
    }
}

impl From<String> for TypedValue {
    fn from(s: String) -> Self {
        Self::Str(s)
    }
}

impl From<Vec<TypedValue>> for TypedValue {
    fn from(items: Vec<TypedValue>) -> Self {
        Self::List(items)
    }
}

impl From<Record> for TypedValue {
    fn from(record: Record) -> Self {
        Self::Record(Box::new(record))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lift_and_lower() {
        let v: Value = serde_json::from_str(r#"{"a": [1, "x", null], "b": 1.5}"#).unwrap();
        let typed = TypedValue::from(&v);
        assert_eq!(typed.get("b"), Some(&TypedValue::Float(1.5)));
        assert_eq!(typed.to_value(), v);
    }

    #[test]
    fn test_map_equality_ignores_order() {
        let a = TypedValue::Map(vec![
            (TypedValue::from("a"), TypedValue::Int(1)),
            (TypedValue::from("b"), TypedValue::Int(2)),
        ]);
        let b = TypedValue::Map(vec![
            (TypedValue::from("b"), TypedValue::Int(2)),
            (TypedValue::from("a"), TypedValue::Int(1)),
        ]);
        assert_eq!(a, b);
    }

    #[test]
    fn test_display() {
        let v = TypedValue::Map(vec![(
            TypedValue::from("a"),
            TypedValue::List(vec![TypedValue::Int(1), TypedValue::Null]),
        )]);
        assert_eq!(v.to_string(), r#"{"a": [1, None]}"#);
        assert_eq!(TypedValue::from("value").to_string(), r#""value""#);
    }

    #[test]
    fn test_accessors() {
        assert_eq!(TypedValue::Int(3).as_int(), Some(3));
        assert_eq!(TypedValue::from("s").as_str(), Some("s"));
        assert!(TypedValue::Null.is_null());
        assert!(TypedValue::Int(3).as_record().is_none());
        assert_eq!(
            TypedValue::Set(vec![TypedValue::Int(1)]).as_sequence().map(<[_]>::len),
            Some(1)
        );
    }
}
