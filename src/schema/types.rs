//! Avro schema types and representations.
//!
//! This module defines the schema graph: primitives, named types (record,
//! enum, fixed), unnamed containers (array, map) and unions. Named types are
//! referenced by [`AvroSchema::Named`], a lookup into the registry of the
//! document the schema came from.

use std::fmt;

use serde_json::{json, Map, Value};

use super::name::Name;

/// Represents an Avro schema node.
#[derive(Debug, Clone, PartialEq)]
pub enum AvroSchema {
    // Primitive types
    /// Null type - no value.
    Null,
    /// Boolean type.
    Boolean,
    /// 32-bit signed integer.
    Int,
    /// 64-bit signed integer.
    Long,
    /// 32-bit IEEE 754 floating-point.
    Float,
    /// 64-bit IEEE 754 floating-point.
    Double,
    /// Sequence of bytes.
    Bytes,
    /// Unicode string.
    String,

    // Complex types
    /// Record, error or request with named fields.
    Record(RecordSchema),
    /// Enumeration type.
    Enum(EnumSchema),
    /// Fixed-size byte array.
    Fixed(FixedSchema),
    /// Array of items with a single schema.
    Array(Box<AvroSchema>),
    /// Map with string keys and values of a single schema.
    Map(Box<AvroSchema>),
    /// Union of multiple schemas.
    Union(Vec<AvroSchema>),

    /// Reference to a named type registered in the document's `Schemata`.
    ///
    /// Serialized relative to the namespace the reference is written in.
    Named(Name),
}

/// Primitive type names, in declaration order.
pub const PRIMITIVE_TYPE_NAMES: [&str; 8] = [
    "null", "boolean", "int", "long", "float", "double", "bytes", "string",
];

impl AvroSchema {
    /// Look up a primitive schema by its type name.
    pub fn primitive(name: &str) -> Option<AvroSchema> {
        match name {
            "null" => Some(AvroSchema::Null),
            "boolean" => Some(AvroSchema::Boolean),
            "int" => Some(AvroSchema::Int),
            "long" => Some(AvroSchema::Long),
            "float" => Some(AvroSchema::Float),
            "double" => Some(AvroSchema::Double),
            "bytes" => Some(AvroSchema::Bytes),
            "string" => Some(AvroSchema::String),
            _ => None,
        }
    }

    /// Check if this is a primitive type.
    pub fn is_primitive(&self) -> bool {
        matches!(
            self,
            AvroSchema::Null
                | AvroSchema::Boolean
                | AvroSchema::Int
                | AvroSchema::Long
                | AvroSchema::Float
                | AvroSchema::Double
                | AvroSchema::Bytes
                | AvroSchema::String
        )
    }

    /// Check if this is a named type definition or a reference to one.
    pub fn is_named(&self) -> bool {
        matches!(
            self,
            AvroSchema::Record(_)
                | AvroSchema::Enum(_)
                | AvroSchema::Fixed(_)
                | AvroSchema::Named(_)
        )
    }

    /// The type tag of this node.
    ///
    /// A `Named` reference reports `"named"`; resolve it through the owning
    /// [`Schema`](super::Schema) to get the referenced kind.
    pub fn type_name(&self) -> &'static str {
        match self {
            AvroSchema::Null => "null",
            AvroSchema::Boolean => "boolean",
            AvroSchema::Int => "int",
            AvroSchema::Long => "long",
            AvroSchema::Float => "float",
            AvroSchema::Double => "double",
            AvroSchema::Bytes => "bytes",
            AvroSchema::String => "string",
            AvroSchema::Record(r) => r.kind.as_str(),
            AvroSchema::Enum(_) => "enum",
            AvroSchema::Fixed(_) => "fixed",
            AvroSchema::Array(_) => "array",
            AvroSchema::Map(_) => "map",
            AvroSchema::Union(_) => "union",
            AvroSchema::Named(_) => "named",
        }
    }

    /// The name of a named definition or reference.
    pub fn name(&self) -> Option<&Name> {
        match self {
            AvroSchema::Record(r) => Some(&r.name),
            AvroSchema::Enum(e) => Some(&e.name),
            AvroSchema::Fixed(f) => Some(&f.name),
            AvroSchema::Named(n) => Some(n),
            _ => None,
        }
    }

    /// Serialize the schema to a JSON Value.
    pub fn to_json_value(&self) -> Value {
        self.to_json_in(None)
    }

    /// Serialize the schema as it appears inside `namespace`.
    ///
    /// Names are shortened only where the short form resolves back to the
    /// same fullname when the output is parsed again.
    pub fn to_json_in(&self, namespace: Option<&str>) -> Value {
        match self {
            AvroSchema::Null
            | AvroSchema::Boolean
            | AvroSchema::Int
            | AvroSchema::Long
            | AvroSchema::Float
            | AvroSchema::Double
            | AvroSchema::Bytes
            | AvroSchema::String => json!(self.type_name()),
            AvroSchema::Record(r) => r.to_json_in(namespace),
            AvroSchema::Enum(e) => e.to_json_in(namespace),
            AvroSchema::Fixed(f) => f.to_json_in(namespace),
            AvroSchema::Array(items) => json!({
                "type": "array",
                "items": items.to_json_in(namespace)
            }),
            AvroSchema::Map(values) => json!({
                "type": "map",
                "values": values.to_json_in(namespace)
            }),
            AvroSchema::Union(branches) => {
                Value::Array(branches.iter().map(|b| b.to_json_in(namespace)).collect())
            }
            AvroSchema::Named(name) => json!(name.relative_to(namespace)),
        }
    }
}

impl fmt::Display for AvroSchema {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_json_value())
    }
}

/// Insert `name`, `namespace` and `doc` the way every named type emits them.
fn insert_name(
    obj: &mut Map<String, Value>,
    name: &Name,
    enclosing: Option<&str>,
    doc: Option<&str>,
) {
    let (simple, namespace) = name.attributes_relative_to(enclosing);
    obj.insert("name".to_string(), json!(simple));
    if let Some(ns) = namespace {
        obj.insert("namespace".to_string(), json!(ns));
    }
    if let Some(doc) = doc {
        obj.insert("doc".to_string(), json!(doc));
    }
}

/// Flavor of a record-like schema.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RecordKind {
    /// Plain record.
    #[default]
    Record,
    /// Protocol error type; encoded exactly like a record.
    Error,
    /// Parameter list of a protocol message; unnamed on output.
    Request,
}

impl RecordKind {
    /// The type tag written in schema JSON.
    pub fn as_str(&self) -> &'static str {
        match self {
            RecordKind::Record => "record",
            RecordKind::Error => "error",
            RecordKind::Request => "request",
        }
    }
}

/// Schema for a record type.
#[derive(Debug, Clone, PartialEq)]
pub struct RecordSchema {
    /// The name of the record.
    pub name: Name,
    /// The fields of the record, in declaration order.
    pub fields: Vec<FieldSchema>,
    /// Optional documentation.
    pub doc: Option<String>,
    /// Record, error or request.
    pub kind: RecordKind,
}

impl RecordSchema {
    /// Create a new plain record with the given name and fields.
    pub fn new(name: Name, fields: Vec<FieldSchema>) -> Self {
        Self {
            name,
            fields,
            doc: None,
            kind: RecordKind::Record,
        }
    }

    /// Set the record kind.
    pub fn with_kind(mut self, kind: RecordKind) -> Self {
        self.kind = kind;
        self
    }

    /// Set the documentation.
    pub fn with_doc(mut self, doc: impl Into<String>) -> Self {
        self.doc = Some(doc.into());
        self
    }

    /// Get the fully qualified name.
    pub fn fullname(&self) -> &str {
        self.name.fullname()
    }

    /// Find a field by name.
    pub fn field(&self, name: &str) -> Option<&FieldSchema> {
        self.fields.iter().find(|f| f.name == name)
    }

    /// Serialize the record schema to a JSON Value.
    ///
    /// A request serializes to its bare field list.
    pub fn to_json_value(&self) -> Value {
        self.to_json_in(None)
    }

    /// Serialize the record as it appears inside `namespace`. Field types
    /// are written relative to the record's own namespace.
    pub fn to_json_in(&self, namespace: Option<&str>) -> Value {
        let own = self.name.namespace();
        let fields: Vec<Value> = self.fields.iter().map(|f| f.to_json_in(own)).collect();
        if self.kind == RecordKind::Request {
            return Value::Array(fields);
        }

        let mut obj = Map::new();
        obj.insert("type".to_string(), json!(self.kind.as_str()));
        insert_name(&mut obj, &self.name, namespace, self.doc.as_deref());
        obj.insert("fields".to_string(), Value::Array(fields));

        Value::Object(obj)
    }
}

/// Schema for a field within a record.
#[derive(Debug, Clone, PartialEq)]
pub struct FieldSchema {
    /// The name of the field.
    pub name: String,
    /// The schema of the field's value.
    pub schema: AvroSchema,
    /// Default value exactly as written in the schema JSON.
    pub default: Option<Value>,
    /// Explicit sort order, if one was declared.
    pub order: Option<FieldOrder>,
    /// Optional documentation.
    pub doc: Option<String>,
}

impl FieldSchema {
    /// Create a new FieldSchema with the given name and schema.
    pub fn new(name: impl Into<String>, schema: AvroSchema) -> Self {
        Self {
            name: name.into(),
            schema,
            default: None,
            order: None,
            doc: None,
        }
    }

    /// Set the default value.
    pub fn with_default(mut self, default: Value) -> Self {
        self.default = Some(default);
        self
    }

    /// Set the sort order.
    pub fn with_order(mut self, order: FieldOrder) -> Self {
        self.order = Some(order);
        self
    }

    /// Set the documentation.
    pub fn with_doc(mut self, doc: impl Into<String>) -> Self {
        self.doc = Some(doc.into());
        self
    }

    /// Whether the field declares a default value.
    pub fn has_default(&self) -> bool {
        self.default.is_some()
    }

    /// Serialize the field schema to a JSON Value.
    pub fn to_json_value(&self) -> Value {
        self.to_json_in(None)
    }

    /// Serialize the field as it appears in a record of `namespace`.
    pub fn to_json_in(&self, namespace: Option<&str>) -> Value {
        let mut obj = Map::new();
        obj.insert("name".to_string(), json!(&self.name));
        obj.insert("type".to_string(), self.schema.to_json_in(namespace));

        if let Some(default) = &self.default {
            obj.insert("default".to_string(), default.clone());
        }

        if let Some(order) = self.order {
            obj.insert("order".to_string(), json!(order.as_str()));
        }

        if let Some(doc) = &self.doc {
            obj.insert("doc".to_string(), json!(doc));
        }

        Value::Object(obj)
    }
}

/// Field ordering for record comparison.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldOrder {
    Ascending,
    Descending,
    Ignore,
}

impl FieldOrder {
    /// Parse an `order` attribute value.
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "ascending" => Some(FieldOrder::Ascending),
            "descending" => Some(FieldOrder::Descending),
            "ignore" => Some(FieldOrder::Ignore),
            _ => None,
        }
    }

    /// The attribute value.
    pub fn as_str(&self) -> &'static str {
        match self {
            FieldOrder::Ascending => "ascending",
            FieldOrder::Descending => "descending",
            FieldOrder::Ignore => "ignore",
        }
    }
}

/// Schema for an enumeration type.
#[derive(Debug, Clone, PartialEq)]
pub struct EnumSchema {
    /// The name of the enum.
    pub name: Name,
    /// The symbols of the enum, in index order.
    pub symbols: Vec<String>,
    /// Optional documentation.
    pub doc: Option<String>,
}

impl EnumSchema {
    /// Create a new EnumSchema with the given name and symbols.
    pub fn new(name: Name, symbols: Vec<String>) -> Self {
        Self {
            name,
            symbols,
            doc: None,
        }
    }

    /// Set the documentation.
    pub fn with_doc(mut self, doc: impl Into<String>) -> Self {
        self.doc = Some(doc.into());
        self
    }

    /// Get the fully qualified name.
    pub fn fullname(&self) -> &str {
        self.name.fullname()
    }

    /// Index of `symbol`, if declared.
    pub fn symbol_index(&self, symbol: &str) -> Option<usize> {
        self.symbols.iter().position(|s| s == symbol)
    }

    /// Symbol at `index`, if in range.
    pub fn symbol_by_index(&self, index: usize) -> Option<&str> {
        self.symbols.get(index).map(String::as_str)
    }

    /// Serialize the enum schema to a JSON Value.
    pub fn to_json_value(&self) -> Value {
        self.to_json_in(None)
    }

    pub fn to_json_in(&self, namespace: Option<&str>) -> Value {
        let mut obj = Map::new();
        obj.insert("type".to_string(), json!("enum"));
        insert_name(&mut obj, &self.name, namespace, self.doc.as_deref());
        obj.insert("symbols".to_string(), json!(&self.symbols));
        Value::Object(obj)
    }
}

/// Schema for a fixed-size type.
#[derive(Debug, Clone, PartialEq)]
pub struct FixedSchema {
    /// The name of the fixed type.
    pub name: Name,
    /// The size in bytes.
    pub size: usize,
}

impl FixedSchema {
    /// Create a new FixedSchema with the given name and size.
    pub fn new(name: Name, size: usize) -> Self {
        Self { name, size }
    }

    /// Get the fully qualified name.
    pub fn fullname(&self) -> &str {
        self.name.fullname()
    }

    /// Serialize the fixed schema to a JSON Value.
    pub fn to_json_value(&self) -> Value {
        self.to_json_in(None)
    }

    pub fn to_json_in(&self, namespace: Option<&str>) -> Value {
        let mut obj = Map::new();
        obj.insert("type".to_string(), json!("fixed"));
        insert_name(&mut obj, &self.name, namespace, None);
        obj.insert("size".to_string(), json!(self.size));
        Value::Object(obj)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn name(n: &str, ns: Option<&str>) -> Name {
        Name::new(n, ns, None).unwrap()
    }

    #[test]
    fn test_primitive_lookup() {
        for type_name in PRIMITIVE_TYPE_NAMES {
            let schema = AvroSchema::primitive(type_name).unwrap();
            assert!(schema.is_primitive());
            assert_eq!(schema.type_name(), type_name);
            assert_eq!(schema.to_json_value(), json!(type_name));
        }
        assert!(AvroSchema::primitive("record").is_none());
    }

    #[test]
    fn test_record_json_key_order() {
        let record = RecordSchema::new(
            name("User", Some("com.example")),
            vec![FieldSchema::new("id", AvroSchema::Long)],
        );
        let text = AvroSchema::Record(record).to_string();
        assert_eq!(
            text,
            r#"{"type":"record","name":"User","namespace":"com.example","fields":[{"name":"id","type":"long"}]}"#
        );
    }

    #[test]
    fn test_request_serializes_to_field_list() {
        let record = RecordSchema::new(
            name("hello", None),
            vec![FieldSchema::new("greeting", AvroSchema::String)],
        )
        .with_kind(RecordKind::Request);
        assert_eq!(
            record.to_json_value(),
            json!([{"name": "greeting", "type": "string"}])
        );
    }

    #[test]
    fn test_field_order_emitted_only_when_declared() {
        let plain = FieldSchema::new("a", AvroSchema::Int);
        assert!(plain.to_json_value().get("order").is_none());

        let ordered = FieldSchema::new("a", AvroSchema::Int).with_order(FieldOrder::Ascending);
        assert_eq!(ordered.to_json_value()["order"], json!("ascending"));
    }

    #[test]
    fn test_enum_symbol_lookup() {
        let e = EnumSchema::new(name("Suit", None), vec!["A".into(), "B".into()]);
        assert_eq!(e.symbol_index("B"), Some(1));
        assert_eq!(e.symbol_index("C"), None);
        assert_eq!(e.symbol_by_index(0), Some("A"));
        assert_eq!(e.symbol_by_index(2), None);
    }
}
