//! Writer/reader schema matching.
//!
//! Decides, node by node, whether data written under one schema can be read
//! under another. The check is shallow: arrays and maps only compare the
//! type tag of their items or values, and records and enums compare
//! fullnames. Deeper mismatches surface while reading.

use crate::schema::{AvroSchema, RecordKind, Schema, TypePromotion};

/// Whether data written with `writer` can be read with `reader`.
///
/// # Example
/// ```
/// use avrolite::schema::{schemas_match, Schema};
///
/// let int = Schema::parse(r#""int""#).unwrap();
/// let double = Schema::parse(r#""double""#).unwrap();
/// assert!(schemas_match(&int, &double));
/// assert!(!schemas_match(&double, &int));
/// ```
pub fn schemas_match(writer: &Schema, reader: &Schema) -> bool {
    schemas_match_nodes(writer, writer.root(), reader, reader.root())
}

/// Node-level form of [`schemas_match`].
///
/// `w` belongs to the `writer` document and `r` to the `reader` document;
/// each side resolves its named references through its own registry.
pub fn schemas_match_nodes(
    writer: &Schema,
    w: &AvroSchema,
    reader: &Schema,
    r: &AvroSchema,
) -> bool {
    let (Some(w), Some(r)) = (writer.resolve(w), reader.resolve(r)) else {
        return false;
    };

    match (w, r) {
        (AvroSchema::Union(_), _) | (_, AvroSchema::Union(_)) => true,

        (AvroSchema::Array(w_items), AvroSchema::Array(r_items)) => {
            writer.kind_of(w_items) == reader.kind_of(r_items)
        }
        (AvroSchema::Map(w_values), AvroSchema::Map(r_values)) => {
            writer.kind_of(w_values) == reader.kind_of(r_values)
        }

        (AvroSchema::Record(w_rec), AvroSchema::Record(r_rec)) if w_rec.kind == r_rec.kind => {
            w_rec.kind == RecordKind::Request || w_rec.fullname() == r_rec.fullname()
        }
        (AvroSchema::Enum(w_enum), AvroSchema::Enum(r_enum)) => {
            w_enum.fullname() == r_enum.fullname()
        }
        (AvroSchema::Fixed(w_fixed), AvroSchema::Fixed(r_fixed)) => {
            w_fixed.fullname() == r_fixed.fullname() && w_fixed.size == r_fixed.size
        }

        (w, r) if w.is_primitive() && w.type_name() == r.type_name() => true,

        (w, r) => TypePromotion::from_schemas(w, r).is_some(),
    }
}
