//! Reader/writer schema resolution helpers.
//!
//! Numeric promotion of decoded values, and materialization of field
//! defaults declared in the reader's schema.

use serde_json::Value;

use crate::error::DecodeError;
use crate::schema::{AvroSchema, Schema};
use crate::value::AvroValue;

/// Type promotions supported by Avro schema resolution.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TypePromotion {
    /// int → long
    IntToLong,
    /// int → float
    IntToFloat,
    /// int → double
    IntToDouble,
    /// long → float
    LongToFloat,
    /// long → double
    LongToDouble,
    /// float → double
    FloatToDouble,
}

impl TypePromotion {
    /// Determine the widening promotion from `writer` to `reader`, if any.
    ///
    /// Identical types need no promotion and return `None`, as do
    /// incompatible ones; use [`schemas_match`](super::schemas_match) to
    /// tell the two apart.
    pub fn from_schemas(writer: &AvroSchema, reader: &AvroSchema) -> Option<Self> {
        match (writer, reader) {
            (AvroSchema::Int, AvroSchema::Long) => Some(TypePromotion::IntToLong),
            (AvroSchema::Int, AvroSchema::Float) => Some(TypePromotion::IntToFloat),
            (AvroSchema::Int, AvroSchema::Double) => Some(TypePromotion::IntToDouble),
            (AvroSchema::Long, AvroSchema::Float) => Some(TypePromotion::LongToFloat),
            (AvroSchema::Long, AvroSchema::Double) => Some(TypePromotion::LongToDouble),
            (AvroSchema::Float, AvroSchema::Double) => Some(TypePromotion::FloatToDouble),
            _ => None,
        }
    }

    /// Apply the promotion to a value decoded with the writer's type.
    ///
    /// Values of any other variant pass through unchanged.
    pub fn apply(self, value: AvroValue) -> AvroValue {
        match (self, value) {
            (TypePromotion::IntToLong, AvroValue::Int(v)) => AvroValue::Long(i64::from(v)),
            (TypePromotion::IntToFloat, AvroValue::Int(v)) => AvroValue::Float(v as f32),
            (TypePromotion::IntToDouble, AvroValue::Int(v)) => AvroValue::Double(f64::from(v)),
            (TypePromotion::LongToFloat, AvroValue::Long(v)) => AvroValue::Float(v as f32),
            (TypePromotion::LongToDouble, AvroValue::Long(v)) => AvroValue::Double(v as f64),
            (TypePromotion::FloatToDouble, AvroValue::Float(v)) => {
                AvroValue::Double(f64::from(v))
            }
            (_, value) => value,
        }
    }
}

/// Convert a default value from schema JSON into a datum of type `node`.
///
/// Unions take their default from the first branch. Records fill each
/// sub-field from the default object, falling back to the sub-field's own
/// default. Numbers may be given as JSON numbers or numeric strings, and
/// `bytes`/`fixed` defaults are the UTF-8 bytes of a string.
///
/// # Errors
/// Returns `DecodeError::InvalidDefault` if the JSON does not fit the type.
pub fn default_value(
    schema: &Schema,
    node: &AvroSchema,
    json: &Value,
) -> Result<AvroValue, DecodeError> {
    let invalid = |message: String| DecodeError::InvalidDefault {
        schema: node.to_string(),
        message,
    };

    match node {
        AvroSchema::Null => Ok(AvroValue::Null),
        AvroSchema::Boolean => match json {
            Value::Bool(b) => Ok(AvroValue::Boolean(*b)),
            Value::String(s) => s
                .parse::<bool>()
                .map(AvroValue::Boolean)
                .map_err(|_| invalid(format!("{:?} is not a boolean", s))),
            other => Err(invalid(format!("{} is not a boolean", other))),
        },
        AvroSchema::Int => {
            let v = json_integer(json).ok_or_else(|| invalid(format!("{} is not an int", json)))?;
            i32::try_from(v)
                .map(AvroValue::Int)
                .map_err(|_| invalid(format!("{} is out of range for int", v)))
        }
        AvroSchema::Long => json_integer(json)
            .map(AvroValue::Long)
            .ok_or_else(|| invalid(format!("{} is not a long", json))),
        AvroSchema::Float => json_float(json)
            .map(|v| AvroValue::Float(v as f32))
            .ok_or_else(|| invalid(format!("{} is not a float", json))),
        AvroSchema::Double => json_float(json)
            .map(AvroValue::Double)
            .ok_or_else(|| invalid(format!("{} is not a double", json))),
        AvroSchema::String => match json {
            Value::String(s) => Ok(AvroValue::String(s.clone())),
            other => Err(invalid(format!("{} is not a string", other))),
        },
        AvroSchema::Bytes => match json {
            Value::String(s) => Ok(AvroValue::Bytes(s.as_bytes().to_vec())),
            other => Err(invalid(format!("{} is not a byte string", other))),
        },
        // The declared size is not enforced on defaults
        AvroSchema::Fixed(_) => match json {
            Value::String(s) => Ok(AvroValue::Fixed(s.as_bytes().to_vec())),
            other => Err(invalid(format!("{} is not a byte string", other))),
        },
        AvroSchema::Enum(e) => match json {
            Value::String(s) if e.symbol_index(s).is_some() => Ok(AvroValue::Enum(s.clone())),
            other => Err(invalid(format!("{} is not a symbol of {}", other, e.name))),
        },
        AvroSchema::Array(items) => match json {
            Value::Array(elements) => elements
                .iter()
                .map(|element| default_value(schema, items, element))
                .collect::<Result<Vec<_>, _>>()
                .map(AvroValue::Array),
            other => Err(invalid(format!("{} is not an array", other))),
        },
        AvroSchema::Map(values) => match json {
            Value::Object(entries) => entries
                .iter()
                .map(|(key, value)| Ok((key.clone(), default_value(schema, values, value)?)))
                .collect::<Result<Vec<_>, DecodeError>>()
                .map(AvroValue::Map),
            other => Err(invalid(format!("{} is not a map", other))),
        },
        AvroSchema::Union(branches) => match branches.first() {
            Some(first) => default_value(schema, first, json),
            None => Err(invalid("empty union has no default".to_string())),
        },
        AvroSchema::Record(record) => {
            let Value::Object(obj) = json else {
                return Err(invalid(format!("{} is not a record", json)));
            };
            let mut fields = Vec::with_capacity(record.fields.len());
            for field in &record.fields {
                let value = match (obj.get(&field.name), &field.default) {
                    (Some(value), _) | (None, Some(value)) => {
                        default_value(schema, &field.schema, value)?
                    }
                    (None, None) => {
                        return Err(invalid(format!("no value for field {}", field.name)))
                    }
                };
                fields.push((field.name.clone(), value));
            }
            Ok(AvroValue::Record(fields))
        }
        AvroSchema::Named(name) => {
            let definition = schema
                .resolve(node)
                .ok_or_else(|| DecodeError::UnknownNamedType(name.fullname().to_string()))?;
            default_value(schema, definition, json)
        }
    }
}

/// Integer from a JSON number (fractions truncate) or numeric string.
fn json_integer(json: &Value) -> Option<i64> {
    match json {
        Value::Number(n) => n.as_i64().or_else(|| n.as_f64().map(|f| f.trunc() as i64)),
        Value::String(s) => s.trim().parse::<i64>().ok(),
        _ => None,
    }
}

/// Float from a JSON number or numeric string.
fn json_float(json: &Value) -> Option<f64> {
    match json {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    }
}
