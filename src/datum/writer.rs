//! Schema-directed datum encoding.

use std::io::Write;

use crate::binary::BinaryEncoder;
use crate::error::EncodeError;
use crate::schema::{is_valid_datum, AvroSchema, Schema};
use crate::value::AvroValue;

/// Encodes datums against a fixed schema.
///
/// Every value is checked with the validity predicate before any of its
/// bytes are written, at every level of nesting.
#[derive(Debug, Clone)]
pub struct DatumWriter {
    schema: Schema,
}

impl DatumWriter {
    pub fn new(schema: Schema) -> Self {
        Self { schema }
    }

    pub fn schema(&self) -> &Schema {
        &self.schema
    }

    /// Encode `datum` against the root schema.
    ///
    /// # Errors
    /// - `EncodeError::InvalidDatum` if the datum does not fit the schema
    /// - `EncodeError::MissingField` if a record datum lacks a field
    /// - `EncodeError::Io` if the sink fails
    pub fn write<W: Write>(
        &self,
        datum: &AvroValue,
        encoder: &mut BinaryEncoder<W>,
    ) -> Result<(), EncodeError> {
        self.write_data(self.schema.root(), datum, encoder)
    }

    /// Encode `datum` against `node`, a node of this writer's schema.
    pub fn write_data<W: Write>(
        &self,
        node: &AvroSchema,
        datum: &AvroValue,
        encoder: &mut BinaryEncoder<W>,
    ) -> Result<(), EncodeError> {
        let node = self.schema.resolve(node).ok_or_else(|| {
            EncodeError::UnknownNamedType(
                node.name().map(|n| n.fullname().to_string()).unwrap_or_default(),
            )
        })?;

        if !is_valid_datum(&self.schema, node, datum) {
            return Err(EncodeError::InvalidDatum {
                schema: node.to_string(),
                datum: format!("{:?}", datum),
            });
        }

        match (node, datum) {
            (AvroSchema::Null, _) => encoder.write_null(),
            (AvroSchema::Boolean, AvroValue::Boolean(b)) => encoder.write_boolean(*b),
            (AvroSchema::Int, AvroValue::Int(v)) => encoder.write_int(*v),
            (AvroSchema::Int, AvroValue::Long(v)) => encoder.write_int(*v as i32),
            (AvroSchema::Long, _) => encoder.write_long(datum.as_i64().unwrap_or_default()),
            (AvroSchema::Float, _) => {
                encoder.write_float(datum.as_f64().unwrap_or_default() as f32)
            }
            (AvroSchema::Double, _) => encoder.write_double(datum.as_f64().unwrap_or_default()),
            (AvroSchema::Bytes | AvroSchema::String, _) => {
                encoder.write_bytes(datum.as_bytes().unwrap_or_default())
            }
            (AvroSchema::Fixed(_), _) => encoder.write_fixed(datum.as_bytes().unwrap_or_default()),
            (AvroSchema::Enum(e), _) => {
                let index = datum
                    .as_str()
                    .and_then(|symbol| e.symbol_index(symbol))
                    .unwrap_or_default();
                encoder.write_int(index as i32)
            }
            (AvroSchema::Array(items), AvroValue::Array(elements)) => {
                if !elements.is_empty() {
                    encoder.write_long(elements.len() as i64)?;
                    for element in elements {
                        self.write_data(items, element, encoder)?;
                    }
                }
                encoder.write_long(0)
            }
            (AvroSchema::Map(values), AvroValue::Map(entries)) => {
                if !entries.is_empty() {
                    encoder.write_long(entries.len() as i64)?;
                    for (key, value) in entries {
                        encoder.write_string(key)?;
                        self.write_data(values, value, encoder)?;
                    }
                }
                encoder.write_long(0)
            }
            (AvroSchema::Union(branches), _) => {
                let (index, branch) = branches
                    .iter()
                    .enumerate()
                    .find(|(_, branch)| is_valid_datum(&self.schema, branch, datum))
                    .ok_or_else(|| EncodeError::InvalidDatum {
                        schema: node.to_string(),
                        datum: format!("{:?}", datum),
                    })?;
                encoder.write_long(index as i64)?;
                self.write_data(branch, datum, encoder)
            }
            (AvroSchema::Record(record), _) => {
                for field in &record.fields {
                    let value = datum.field(&field.name).ok_or_else(|| EncodeError::MissingField {
                        record: record.fullname().to_string(),
                        field: field.name.clone(),
                    })?;
                    self.write_data(&field.schema, value, encoder)?;
                }
                Ok(())
            }
            // Unreachable once the datum has been validated
            _ => Err(EncodeError::InvalidDatum {
                schema: node.to_string(),
                datum: format!("{:?}", datum),
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn encode(schema: &str, datum: AvroValue) -> Result<Vec<u8>, EncodeError> {
        let writer = DatumWriter::new(Schema::parse(schema).unwrap());
        let mut encoder = BinaryEncoder::new(Vec::new()).unwrap();
        writer.write(&datum, &mut encoder)?;
        Ok(encoder.into_inner())
    }

    #[test]
    fn test_write_array_single_block() {
        let bytes = encode(
            r#"{"type": "array", "items": "int"}"#,
            AvroValue::Array(vec![AvroValue::Int(1), AvroValue::Int(2), AvroValue::Int(3)]),
        )
        .unwrap();
        assert_eq!(bytes, vec![0x06, 0x02, 0x04, 0x06, 0x00]);
    }

    #[test]
    fn test_write_empty_map() {
        let bytes = encode(r#"{"type": "map", "values": "int"}"#, AvroValue::Map(vec![])).unwrap();
        assert_eq!(bytes, vec![0x00]);
    }

    #[test]
    fn test_write_union_picks_first_valid_branch() {
        assert_eq!(encode(r#"["null", "int"]"#, AvroValue::Int(1)).unwrap(), vec![0x02, 0x02]);
        assert_eq!(encode(r#"["null", "int"]"#, AvroValue::Null).unwrap(), vec![0x00]);
        // A long in int range matches the int branch before the long one
        assert_eq!(encode(r#"["int", "long"]"#, AvroValue::Long(3)).unwrap(), vec![0x00, 0x06]);
    }

    #[test]
    fn test_write_enum_index() {
        let schema = r#"{"type": "enum", "name": "E", "symbols": ["A", "B", "C"]}"#;
        assert_eq!(encode(schema, AvroValue::Enum("B".into())).unwrap(), vec![0x02]);
    }

    #[test]
    fn test_write_invalid_datum() {
        let err = encode(r#""int""#, AvroValue::from("one")).unwrap_err();
        assert!(matches!(err, EncodeError::InvalidDatum { .. }));
    }

    #[test]
    fn test_write_record_missing_field_with_default() {
        let schema = r#"{"type": "record", "name": "R", "fields": [
            {"name": "a", "type": "int"},
            {"name": "b", "type": "int", "default": 0}]}"#;
        let err = encode(schema, AvroValue::record([("a", AvroValue::Int(1))])).unwrap_err();
        assert!(matches!(err, EncodeError::MissingField { ref field, .. } if field == "b"));
    }
}
