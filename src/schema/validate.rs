//! Datum validity predicate.
//!
//! The writer checks every value against its schema right before encoding
//! it; union encoding uses the predicate to pick a branch.

use crate::schema::{AvroSchema, Schema};
use crate::value::AvroValue;

/// Whether `datum` is a valid instance of `node`.
///
/// `schema` is the document `node` belongs to and resolves named
/// references. A dangling reference validates nothing.
///
/// Records require every field to be present and valid, or absent with a
/// declared default. Unknown extra fields in the datum are ignored.
pub fn is_valid_datum(schema: &Schema, node: &AvroSchema, datum: &AvroValue) -> bool {
    match node {
        AvroSchema::Null => matches!(datum, AvroValue::Null),
        AvroSchema::Boolean => matches!(datum, AvroValue::Boolean(_)),
        AvroSchema::Int => match datum {
            AvroValue::Int(_) => true,
            AvroValue::Long(l) => i32::try_from(*l).is_ok(),
            _ => false,
        },
        AvroSchema::Long => matches!(datum, AvroValue::Int(_) | AvroValue::Long(_)),
        AvroSchema::Float | AvroSchema::Double => datum.as_f64().is_some(),
        AvroSchema::Bytes | AvroSchema::String => {
            matches!(datum, AvroValue::Bytes(_) | AvroValue::String(_))
        }
        AvroSchema::Array(items) => match datum {
            AvroValue::Array(elements) => elements
                .iter()
                .all(|element| is_valid_datum(schema, items, element)),
            _ => false,
        },
        AvroSchema::Map(values) => match datum {
            AvroValue::Map(entries) => entries
                .iter()
                .all(|(_, value)| is_valid_datum(schema, values, value)),
            _ => false,
        },
        AvroSchema::Union(branches) => branches
            .iter()
            .any(|branch| is_valid_datum(schema, branch, datum)),
        AvroSchema::Enum(e) => match datum {
            AvroValue::Enum(symbol) | AvroValue::String(symbol) => e.symbol_index(symbol).is_some(),
            _ => false,
        },
        AvroSchema::Fixed(f) => match datum {
            AvroValue::Fixed(_) | AvroValue::Bytes(_) | AvroValue::String(_) => {
                datum.as_bytes().map_or(false, |b| b.len() == f.size)
            }
            _ => false,
        },
        AvroSchema::Record(r) => match datum {
            AvroValue::Record(_) => r.fields.iter().all(|field| match datum.field(&field.name) {
                Some(value) => is_valid_datum(schema, &field.schema, value),
                None => field.has_default(),
            }),
            _ => false,
        },
        AvroSchema::Named(_) => schema
            .resolve(node)
            .map_or(false, |definition| is_valid_datum(schema, definition, datum)),
    }
}
