//! Registry of named schemas.
//!
//! A `Schemata` maps fullnames to record, enum and fixed definitions. It is
//! persistent: extending it yields a new registry that shares every existing
//! entry, while the original stays untouched. The parser threads the current
//! registry through the recursive descent, so a definition only becomes
//! visible to the schemas parsed after it.

use std::collections::HashMap;
use std::sync::Arc;

use crate::error::SchemaError;

use super::types::{AvroSchema, PRIMITIVE_TYPE_NAMES};

/// Type names that can never be used as the fullname of a named schema.
pub const RESERVED_TYPE_NAMES: [&str; 5] = ["array", "map", "union", "request", "error_union"];

/// Named-type keywords.
pub const NAMED_TYPE_NAMES: [&str; 4] = ["fixed", "enum", "record", "error"];

/// Whether `name` is a built-in type name (primitive, named-type keyword or
/// other reserved word).
pub fn is_reserved_type_name(name: &str) -> bool {
    PRIMITIVE_TYPE_NAMES.contains(&name)
        || NAMED_TYPE_NAMES.contains(&name)
        || RESERVED_TYPE_NAMES.contains(&name)
}

/// Persistent fullname -> named schema registry.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Schemata {
    types: Arc<HashMap<String, Arc<AvroSchema>>>,
}

impl Schemata {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of registered names.
    pub fn len(&self) -> usize {
        self.types.len()
    }

    /// Whether no names are registered.
    pub fn is_empty(&self) -> bool {
        self.types.is_empty()
    }

    /// Whether `fullname` is registered.
    pub fn contains(&self, fullname: &str) -> bool {
        self.types.contains_key(fullname)
    }

    /// Look up a definition by fullname.
    pub fn get(&self, fullname: &str) -> Option<&AvroSchema> {
        self.types.get(fullname).map(|schema| schema.as_ref())
    }

    /// Registered fullnames, in no particular order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.types.keys().map(String::as_str)
    }

    /// Return a new registry with `schema` added.
    ///
    /// # Errors
    /// - `SchemaError::ReservedName` if the fullname is a built-in type name
    /// - `SchemaError::DuplicateName` if the fullname is already registered
    /// - `SchemaError::UnknownType` if `schema` is not a named definition
    pub fn with_schema(&self, schema: AvroSchema) -> Result<Schemata, SchemaError> {
        let fullname = match &schema {
            AvroSchema::Record(_) | AvroSchema::Enum(_) | AvroSchema::Fixed(_) => schema
                .name()
                .map(|n| n.fullname().to_string())
                .unwrap_or_default(),
            other => {
                return Err(SchemaError::UnknownType(format!(
                    "only named schemas can be registered, got {}",
                    other.type_name()
                )))
            }
        };

        if is_reserved_type_name(&fullname) {
            return Err(SchemaError::ReservedName(fullname));
        }
        if self.contains(&fullname) {
            return Err(SchemaError::DuplicateName(fullname));
        }

        Ok(self.extended(fullname, schema))
    }

    /// Return a new registry where the declaration registered under the
    /// schema's fullname is replaced by the completed definition.
    ///
    /// Used once a record's fields have been parsed.
    pub(crate) fn with_definition(&self, schema: AvroSchema) -> Schemata {
        let fullname = schema
            .name()
            .map(|n| n.fullname().to_string())
            .unwrap_or_default();
        self.extended(fullname, schema)
    }

    fn extended(&self, fullname: String, schema: AvroSchema) -> Schemata {
        let mut types = HashMap::clone(&self.types);
        types.insert(fullname, Arc::new(schema));
        Schemata {
            types: Arc::new(types),
        }
    }
}
