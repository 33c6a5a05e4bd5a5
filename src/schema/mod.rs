//! Avro schema types and parsing.
//!
//! This module defines the schema graph, JSON parsing with named type
//! registration, the datum validity predicate, writer/reader schema matching
//! and default value materialization.

mod compatibility;
mod name;
mod parser;
mod resolution;
mod schemata;
mod types;
mod validate;

use std::fmt;
use std::str::FromStr;

use serde_json::Value;

use crate::error::SchemaError;
use crate::value::AvroValue;

pub use compatibility::{schemas_match, schemas_match_nodes};
pub use name::{is_well_formed_name, split_fullname, Name, NAME_SEPARATOR};
pub use parser::{parse_schema, parse_schema_value, SchemaParser};
pub use resolution::{default_value, TypePromotion};
pub use schemata::{is_reserved_type_name, Schemata, NAMED_TYPE_NAMES, RESERVED_TYPE_NAMES};
pub use types::*;
pub use validate::is_valid_datum;

/// A parsed schema document: the root node plus every named type it declares.
///
/// `Named` references anywhere under the root resolve through
/// [`Schema::resolve`]. A `Schema` is immutable and cheap to clone.
#[derive(Debug, Clone, PartialEq)]
pub struct Schema {
    root: AvroSchema,
    schemata: Schemata,
}

impl Schema {
    /// Parse a schema document from JSON text.
    pub fn parse(json: &str) -> Result<Self, SchemaError> {
        parse_schema(json)
    }

    /// Parse a schema document from a decoded JSON value.
    pub fn from_json_value(value: &Value) -> Result<Self, SchemaError> {
        parse_schema_value(value)
    }

    /// Assemble a document from a root node and the registry it refers to.
    pub fn from_parts(root: AvroSchema, schemata: Schemata) -> Self {
        Self { root, schemata }
    }

    /// The root schema node.
    pub fn root(&self) -> &AvroSchema {
        &self.root
    }

    /// The named types declared by this document.
    pub fn schemata(&self) -> &Schemata {
        &self.schemata
    }

    /// Follow a `Named` reference to its definition; other nodes resolve to
    /// themselves. Returns `None` for a dangling reference.
    pub fn resolve<'a>(&'a self, node: &'a AvroSchema) -> Option<&'a AvroSchema> {
        match node {
            AvroSchema::Named(name) => self.schemata.get(name.fullname()),
            other => Some(other),
        }
    }

    /// Type tag of `node` after resolving named references.
    pub fn kind_of(&self, node: &AvroSchema) -> &'static str {
        self.resolve(node).map_or("named", AvroSchema::type_name)
    }

    /// Whether `datum` is a valid instance of the root schema.
    pub fn is_valid_datum(&self, datum: &AvroValue) -> bool {
        is_valid_datum(self, &self.root, datum)
    }

    /// Serialize the document back to its JSON form.
    pub fn to_json_value(&self) -> Value {
        self.root.to_json_value()
    }
}

impl From<AvroSchema> for Schema {
    /// Wrap a node that contains no `Named` references.
    fn from(root: AvroSchema) -> Self {
        Self::from_parts(root, Schemata::new())
    }
}

impl FromStr for Schema {
    type Err = SchemaError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl fmt::Display for Schema {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.root, f)
    }
}
