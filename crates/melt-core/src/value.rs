//! Dynamically typed attribute values.

use std::{collections::BTreeMap, fmt};

use serde::{Deserialize, Deserializer};

/// Attribute bundle attached to entities, relationships and telemetry records.
///
/// Keys are kept sorted so that the same bundle always coerces into the same
/// sequence of OTLP key-values.
pub type Attributes = BTreeMap<String, AttributeValue>;

/// A loosely typed attribute value, as supplied by callers.
#[derive(Debug, Clone, PartialEq)]
pub enum AttributeValue {
    Bool(bool),
    Int(i64),
    /// Unsigned values are reinterpreted as `i64` on the wire, so values at or
    /// above 2^63 come out negative.
    Unsigned(u64),
    Double(f64),
    String(String),
    /// An unset value. Coercion drops the key.
    Null,
    /// Any other caller type, already rendered into its canonical text form.
    Other(String),
}

impl AttributeValue {
    /// Captures an arbitrary value through its `Display` rendering.
    pub fn display(value: impl fmt::Display) -> Self {
        AttributeValue::Other(value.to_string())
    }

    pub fn is_null(&self) -> bool {
        matches!(self, AttributeValue::Null)
    }
}

impl fmt::Display for AttributeValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AttributeValue::Bool(v) => write!(f, "{v}"),
            AttributeValue::Int(v) => write!(f, "{v}"),
            AttributeValue::Unsigned(v) => write!(f, "{v}"),
            AttributeValue::Double(v) => write!(f, "{v}"),
            AttributeValue::String(v) | AttributeValue::Other(v) => f.write_str(v),
            AttributeValue::Null => f.write_str("<nil>"),
        }
    }
}

macro_rules! impl_from {
    ($variant:ident, $target:ty: $($source:ty),+) => {
        $(
            impl From<$source> for AttributeValue {
                fn from(v: $source) -> Self {
                    AttributeValue::$variant(v as $target)
                }
            }
        )+
    };
}

impl_from!(Int, i64: i8, i16, i32, i64, isize);
impl_from!(Unsigned, u64: u8, u16, u32, u64, usize);
impl_from!(Double, f64: f32, f64);

impl From<bool> for AttributeValue {
    fn from(v: bool) -> Self {
        AttributeValue::Bool(v)
    }
}

impl From<String> for AttributeValue {
    fn from(v: String) -> Self {
        AttributeValue::String(v)
    }
}

impl From<&str> for AttributeValue {
    fn from(v: &str) -> Self {
        AttributeValue::String(v.to_owned())
    }
}

impl<T: Into<AttributeValue>> From<Option<T>> for AttributeValue {
    fn from(v: Option<T>) -> Self {
        v.map_or(AttributeValue::Null, Into::into)
    }
}

/// Shape accepted from model files. Nested values fall through to `Other`.
#[derive(Deserialize)]
#[serde(untagged)]
enum RawValue {
    Bool(bool),
    Int(i64),
    Unsigned(u64),
    Double(f64),
    String(String),
    Null(()),
    Other(serde_json::Value),
}

impl<'de> Deserialize<'de> for AttributeValue {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        Ok(match RawValue::deserialize(deserializer)? {
            RawValue::Bool(v) => AttributeValue::Bool(v),
            RawValue::Int(v) => AttributeValue::Int(v),
            RawValue::Unsigned(v) => AttributeValue::Unsigned(v),
            RawValue::Double(v) => AttributeValue::Double(v),
            RawValue::String(v) => AttributeValue::String(v),
            RawValue::Null(()) => AttributeValue::Null,
            RawValue::Other(serde_json::Value::Null) => AttributeValue::Null,
            RawValue::Other(v) => AttributeValue::Other(v.to_string()),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_integer_widths_pick_signedness() {
        assert_eq!(AttributeValue::from(-3i8), AttributeValue::Int(-3));
        assert_eq!(AttributeValue::from(7i32), AttributeValue::Int(7));
        assert_eq!(AttributeValue::from(7u16), AttributeValue::Unsigned(7));
        assert_eq!(AttributeValue::from(u64::MAX), AttributeValue::Unsigned(u64::MAX));
        assert_eq!(AttributeValue::from(1.5f32), AttributeValue::Double(1.5));
    }

    #[test]
    fn test_option_maps_none_to_null() {
        let unset: Option<i32> = None;
        assert!(AttributeValue::from(unset).is_null());
        assert_eq!(AttributeValue::from(Some("x")), AttributeValue::from("x"));
    }

    #[test]
    fn test_display_captures_foreign_types() {
        let addr = std::net::Ipv4Addr::new(10, 0, 0, 1);
        assert_eq!(
            AttributeValue::display(addr),
            AttributeValue::Other("10.0.0.1".to_owned())
        );
    }

    #[test]
    fn test_deserialize_from_yaml() {
        let attrs: Attributes = serde_yaml::from_str(
            "flag: true\ncount: -4\nbig: 18446744073709551615\nratio: 0.25\nname: svc\nmissing: ~\nlist: [1, 2]\n",
        )
        .expect("valid yaml");
        assert_eq!(attrs["flag"], AttributeValue::Bool(true));
        assert_eq!(attrs["count"], AttributeValue::Int(-4));
        assert_eq!(attrs["big"], AttributeValue::Unsigned(u64::MAX));
        assert_eq!(attrs["ratio"], AttributeValue::Double(0.25));
        assert_eq!(attrs["name"], AttributeValue::String("svc".to_owned()));
        assert!(attrs["missing"].is_null());
        assert_eq!(attrs["list"], AttributeValue::Other("[1,2]".to_owned()));
    }
}
