//! In-memory datum representation.
//!
//! A datum is a single value conforming to a schema. Union datums carry no
//! wrapper: the writer picks the first branch the value is valid for, and the
//! reader returns the branch's value directly.

/// A decoded (or to-be-encoded) Avro datum.
#[derive(Debug, Clone, PartialEq)]
pub enum AvroValue {
    /// Null value
    Null,
    /// Boolean value
    Boolean(bool),
    /// 32-bit signed integer
    Int(i32),
    /// 64-bit signed integer
    Long(i64),
    /// 32-bit floating point
    Float(f32),
    /// 64-bit floating point
    Double(f64),
    /// Byte array
    Bytes(Vec<u8>),
    /// Text
    String(String),
    /// Array of values
    Array(Vec<AvroValue>),
    /// Map with string keys, in insertion order
    Map(Vec<(String, AvroValue)>),
    /// Record with named fields
    Record(Vec<(String, AvroValue)>),
    /// Enum symbol
    Enum(String),
    /// Fixed-size byte array
    Fixed(Vec<u8>),
}

impl AvroValue {
    /// Build a record datum from `(name, value)` pairs.
    pub fn record<K, I>(fields: I) -> Self
    where
        K: Into<String>,
        I: IntoIterator<Item = (K, AvroValue)>,
    {
        AvroValue::Record(fields.into_iter().map(|(k, v)| (k.into(), v)).collect())
    }

    /// Build a map datum from `(key, value)` pairs.
    pub fn map<K, I>(entries: I) -> Self
    where
        K: Into<String>,
        I: IntoIterator<Item = (K, AvroValue)>,
    {
        AvroValue::Map(entries.into_iter().map(|(k, v)| (k.into(), v)).collect())
    }

    /// Look up a record field (or map entry) by name.
    pub fn field(&self, name: &str) -> Option<&AvroValue> {
        match self {
            AvroValue::Record(fields) | AvroValue::Map(fields) => {
                fields.iter().find(|(k, _)| k == name).map(|(_, v)| v)
            }
            _ => None,
        }
    }

    /// Short name of the variant, used in diagnostics.
    pub fn type_name(&self) -> &'static str {
        match self {
            AvroValue::Null => "null",
            AvroValue::Boolean(_) => "boolean",
            AvroValue::Int(_) => "int",
            AvroValue::Long(_) => "long",
            AvroValue::Float(_) => "float",
            AvroValue::Double(_) => "double",
            AvroValue::Bytes(_) => "bytes",
            AvroValue::String(_) => "string",
            AvroValue::Array(_) => "array",
            AvroValue::Map(_) => "map",
            AvroValue::Record(_) => "record",
            AvroValue::Enum(_) => "enum",
            AvroValue::Fixed(_) => "fixed",
        }
    }

    /// Integer view of `Int` and `Long`.
    pub fn as_i64(&self) -> Option<i64> {
        match self {
            AvroValue::Int(i) => Some(i64::from(*i)),
            AvroValue::Long(l) => Some(*l),
            _ => None,
        }
    }

    /// Floating-point view of any numeric variant.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            AvroValue::Int(i) => Some(f64::from(*i)),
            AvroValue::Long(l) => Some(*l as f64),
            AvroValue::Float(f) => Some(f64::from(*f)),
            AvroValue::Double(d) => Some(*d),
            _ => None,
        }
    }

    /// Byte view of `String`, `Bytes` and `Fixed`.
    pub fn as_bytes(&self) -> Option<&[u8]> {
        match self {
            AvroValue::Bytes(b) | AvroValue::Fixed(b) => Some(b),
            AvroValue::String(s) => Some(s.as_bytes()),
            _ => None,
        }
    }

    /// Text view of `String` and `Enum`.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            AvroValue::String(s) | AvroValue::Enum(s) => Some(s),
            _ => None,
        }
    }
}

impl From<()> for AvroValue {
    fn from(_: ()) -> Self {
        AvroValue::Null
    }
}

impl From<bool> for AvroValue {
    fn from(value: bool) -> Self {
        AvroValue::Boolean(value)
    }
}

impl From<i32> for AvroValue {
    fn from(value: i32) -> Self {
        AvroValue::Int(value)
    }
}

impl From<i64> for AvroValue {
    fn from(value: i64) -> Self {
        AvroValue::Long(value)
    }
}

impl From<f32> for AvroValue {
    fn from(value: f32) -> Self {
        AvroValue::Float(value)
    }
}

impl From<f64> for AvroValue {
    fn from(value: f64) -> Self {
        AvroValue::Double(value)
    }
}

impl From<&str> for AvroValue {
    fn from(value: &str) -> Self {
        AvroValue::String(value.to_string())
    }
}

impl From<String> for AvroValue {
    fn from(value: String) -> Self {
        AvroValue::String(value)
    }
}

impl From<Vec<u8>> for AvroValue {
    fn from(value: Vec<u8>) -> Self {
        AvroValue::Bytes(value)
    }
}

impl<T: Into<AvroValue>> From<Option<T>> for AvroValue {
    fn from(value: Option<T>) -> Self {
        value.map_or(AvroValue::Null, Into::into)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_field_lookup() {
        let record = AvroValue::record([("a", AvroValue::Int(1)), ("b", AvroValue::Null)]);
        assert_eq!(record.field("a"), Some(&AvroValue::Int(1)));
        assert_eq!(record.field("b"), Some(&AvroValue::Null));
        assert_eq!(record.field("c"), None);
        assert_eq!(AvroValue::Int(1).field("a"), None);
    }

    #[test]
    fn test_numeric_views() {
        assert_eq!(AvroValue::Int(-3).as_i64(), Some(-3));
        assert_eq!(AvroValue::Long(1 << 40).as_i64(), Some(1 << 40));
        assert_eq!(AvroValue::Float(1.5).as_i64(), None);
        assert_eq!(AvroValue::Float(1.5).as_f64(), Some(1.5));
        assert_eq!(AvroValue::String("x".into()).as_f64(), None);
    }

    #[test]
    fn test_from_option() {
        assert_eq!(AvroValue::from(None::<i32>), AvroValue::Null);
        assert_eq!(AvroValue::from(Some("x")), AvroValue::String("x".into()));
    }
}
