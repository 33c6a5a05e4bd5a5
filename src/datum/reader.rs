//! Schema-resolving datum decoding.
//!
//! Data is always decoded with the writer's schema. The reader's schema
//! decides which record fields are kept, which numeric promotions apply and
//! which defaults fill fields the writer never wrote.

use std::io::Read;

use crate::binary::BinaryDecoder;
use crate::error::DecodeError;
use crate::schema::{default_value, schemas_match_nodes, AvroSchema, Schema, TypePromotion};
use crate::value::AvroValue;

/// Decodes datums written with one schema into the shape of another.
#[derive(Debug, Clone)]
pub struct DatumReader {
    writer_schema: Schema,
    reader_schema: Schema,
}

impl DatumReader {
    /// Create a reader that projects onto the writer's own schema.
    pub fn new(writer_schema: Schema) -> Self {
        Self {
            reader_schema: writer_schema.clone(),
            writer_schema,
        }
    }

    /// Use `reader_schema` as the target shape.
    pub fn with_reader_schema(mut self, reader_schema: Schema) -> Self {
        self.reader_schema = reader_schema;
        self
    }

    pub fn writer_schema(&self) -> &Schema {
        &self.writer_schema
    }

    pub fn reader_schema(&self) -> &Schema {
        &self.reader_schema
    }

    /// Decode one datum.
    ///
    /// # Errors
    /// - `DecodeError::SchemaMismatch` if the schemas cannot be resolved
    /// - `DecodeError::InvalidDefault` if a reader-only default is malformed
    /// - `DecodeError::UnexpectedEof` if the input is truncated
    /// - `DecodeError::InvalidData` if a map key is not valid UTF-8
    pub fn read<R: Read>(&self, decoder: &mut BinaryDecoder<R>) -> Result<AvroValue, DecodeError> {
        self.read_data(self.writer_schema.root(), self.reader_schema.root(), decoder)
    }

    /// Decode a value written as `writer` into the shape of `reader`.
    ///
    /// A `string` value that is not valid UTF-8 comes back as
    /// `AvroValue::Bytes`. Map keys have no such fallback, since
    /// `AvroValue::Map` keys are `String`, and fail with
    /// `DecodeError::InvalidData` instead.
    pub fn read_data<R: Read>(
        &self,
        writer: &AvroSchema,
        reader: &AvroSchema,
        decoder: &mut BinaryDecoder<R>,
    ) -> Result<AvroValue, DecodeError> {
        let w = resolve(&self.writer_schema, writer)?;
        let r = resolve(&self.reader_schema, reader)?;

        if !schemas_match_nodes(&self.writer_schema, w, &self.reader_schema, r) {
            return Err(mismatch(w, r));
        }

        // A reader union accepts a plain writer value through its first
        // compatible branch
        if let AvroSchema::Union(branches) = r {
            if !matches!(w, AvroSchema::Union(_)) {
                let branch = branches
                    .iter()
                    .find(|branch| {
                        schemas_match_nodes(&self.writer_schema, w, &self.reader_schema, branch)
                    })
                    .ok_or_else(|| mismatch(w, r))?;
                return self.read_data(w, branch, decoder);
            }
        }

        let value = match w {
            AvroSchema::Null => {
                decoder.read_null()?;
                AvroValue::Null
            }
            AvroSchema::Boolean => AvroValue::Boolean(decoder.read_boolean()?),
            AvroSchema::Int => AvroValue::Int(decoder.read_int()?),
            AvroSchema::Long => AvroValue::Long(decoder.read_long()?),
            AvroSchema::Float => AvroValue::Float(decoder.read_float()?),
            AvroSchema::Double => AvroValue::Double(decoder.read_double()?),
            AvroSchema::Bytes => AvroValue::Bytes(decoder.read_bytes()?),
            AvroSchema::String => match String::from_utf8(decoder.read_string()?) {
                Ok(s) => AvroValue::String(s),
                Err(err) => AvroValue::Bytes(err.into_bytes()),
            },
            AvroSchema::Fixed(fixed) => AvroValue::Fixed(decoder.read_fixed(fixed.size)?),
            AvroSchema::Enum(w_enum) => {
                let index = decoder.read_int()?;
                let symbol = usize::try_from(index)
                    .ok()
                    .and_then(|i| w_enum.symbol_by_index(i))
                    .ok_or_else(|| {
                        DecodeError::InvalidData(format!(
                            "Enum index {} out of range for {}",
                            index, w_enum.name
                        ))
                    })?;
                if let AvroSchema::Enum(r_enum) = r {
                    if r_enum.symbol_index(symbol).is_none() {
                        return Err(mismatch(w, r));
                    }
                }
                AvroValue::Enum(symbol.to_string())
            }
            AvroSchema::Array(w_items) => {
                let AvroSchema::Array(r_items) = r else {
                    return Err(mismatch(w, r));
                };
                let mut elements = Vec::new();
                loop {
                    let (count, _) = decoder.read_block_count()?;
                    if count == 0 {
                        break;
                    }
                    for _ in 0..count {
                        elements.push(self.read_data(w_items, r_items, decoder)?);
                    }
                }
                AvroValue::Array(elements)
            }
            AvroSchema::Map(w_values) => {
                let AvroSchema::Map(r_values) = r else {
                    return Err(mismatch(w, r));
                };
                let mut entries = Vec::new();
                loop {
                    let (count, _) = decoder.read_block_count()?;
                    if count == 0 {
                        break;
                    }
                    for _ in 0..count {
                        let key = String::from_utf8(decoder.read_string()?).map_err(|err| {
                            DecodeError::InvalidData(format!("Map key is not UTF-8: {}", err))
                        })?;
                        entries.push((key, self.read_data(w_values, r_values, decoder)?));
                    }
                }
                AvroValue::Map(entries)
            }
            AvroSchema::Union(w_branches) => {
                let index = decoder.read_long()?;
                let branch = usize::try_from(index)
                    .ok()
                    .and_then(|i| w_branches.get(i))
                    .ok_or_else(|| {
                        DecodeError::InvalidData(format!(
                            "Union index {} out of range for {} branches",
                            index,
                            w_branches.len()
                        ))
                    })?;
                return self.read_data(branch, r, decoder);
            }
            AvroSchema::Record(w_record) => {
                let AvroSchema::Record(r_record) = r else {
                    return Err(mismatch(w, r));
                };
                let mut read = Vec::with_capacity(w_record.fields.len());
                for w_field in &w_record.fields {
                    match r_record.field(&w_field.name) {
                        Some(r_field) => {
                            let value = self.read_data(&w_field.schema, &r_field.schema, decoder)?;
                            read.push((w_field.name.as_str(), value));
                        }
                        None => self.skip_data(&w_field.schema, decoder)?,
                    }
                }

                let mut fields = Vec::with_capacity(r_record.fields.len());
                for r_field in &r_record.fields {
                    if let Some(pos) = read.iter().position(|(name, _)| *name == r_field.name) {
                        let (_, value) = read.swap_remove(pos);
                        fields.push((r_field.name.clone(), value));
                    } else if let Some(default) = &r_field.default {
                        let value = default_value(&self.reader_schema, &r_field.schema, default)?;
                        fields.push((r_field.name.clone(), value));
                    }
                }
                AvroValue::Record(fields)
            }
            AvroSchema::Named(_) => return Err(mismatch(w, r)),
        };

        Ok(match TypePromotion::from_schemas(w, r) {
            Some(promotion) => promotion.apply(value),
            None => value,
        })
    }

    /// Advance past a value written as `writer` without building it.
    pub fn skip_data<R: Read>(
        &self,
        writer: &AvroSchema,
        decoder: &mut BinaryDecoder<R>,
    ) -> Result<(), DecodeError> {
        match resolve(&self.writer_schema, writer)? {
            AvroSchema::Null => decoder.skip_null(),
            AvroSchema::Boolean => decoder.skip_boolean(),
            AvroSchema::Int => decoder.skip_int(),
            AvroSchema::Long => decoder.skip_long(),
            AvroSchema::Float => decoder.skip_float(),
            AvroSchema::Double => decoder.skip_double(),
            AvroSchema::Bytes => decoder.skip_bytes(),
            AvroSchema::String => decoder.skip_string(),
            AvroSchema::Fixed(fixed) => decoder.skip_fixed(fixed.size),
            AvroSchema::Enum(_) => decoder.skip_int(),
            AvroSchema::Array(items) => self.skip_blocks(decoder, |d| self.skip_data(items, d)),
            AvroSchema::Map(values) => self.skip_blocks(decoder, |d| {
                d.skip_string()?;
                self.skip_data(values, d)
            }),
            AvroSchema::Union(branches) => {
                let index = decoder.read_long()?;
                let branch = usize::try_from(index)
                    .ok()
                    .and_then(|i| branches.get(i))
                    .ok_or_else(|| {
                        DecodeError::InvalidData(format!("Union index {} out of range", index))
                    })?;
                self.skip_data(branch, decoder)
            }
            AvroSchema::Record(record) => {
                for field in &record.fields {
                    self.skip_data(&field.schema, decoder)?;
                }
                Ok(())
            }
            AvroSchema::Named(name) => {
                Err(DecodeError::UnknownNamedType(name.fullname().to_string()))
            }
        }
    }

    /// Skip array or map blocks, jumping over sized blocks in one step.
    fn skip_blocks<R, F>(
        &self,
        decoder: &mut BinaryDecoder<R>,
        mut skip_item: F,
    ) -> Result<(), DecodeError>
    where
        R: Read,
        F: FnMut(&mut BinaryDecoder<R>) -> Result<(), DecodeError>,
    {
        loop {
            match decoder.read_block_count()? {
                (0, _) => return Ok(()),
                (_, Some(size)) => decoder.skip_raw(size)?,
                (count, None) => {
                    for _ in 0..count {
                        skip_item(decoder)?;
                    }
                }
            }
        }
    }
}

fn resolve<'a>(schema: &'a Schema, node: &'a AvroSchema) -> Result<&'a AvroSchema, DecodeError> {
    schema.resolve(node).ok_or_else(|| {
        DecodeError::UnknownNamedType(
            node.name().map(|n| n.fullname().to_string()).unwrap_or_default(),
        )
    })
}

fn mismatch(writer: &AvroSchema, reader: &AvroSchema) -> DecodeError {
    DecodeError::SchemaMismatch {
        writer: writer.to_string(),
        reader: reader.to_string(),
    }
}
