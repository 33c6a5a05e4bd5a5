//! JSON schema parser for Avro schemas.
//!
//! Parses Avro schema JSON into the AvroSchema type hierarchy, registering
//! every named type in a [`Schemata`] as it goes.

use serde_json::{Map, Value};

use crate::error::SchemaError;
use crate::schema::name::{is_well_formed_name, Name};
use crate::schema::schemata::Schemata;
use crate::schema::types::{
    AvroSchema, EnumSchema, FieldOrder, FieldSchema, FixedSchema, RecordKind, RecordSchema,
};
use crate::schema::Schema;

/// Parse an Avro schema document from a JSON string.
///
/// # Arguments
/// * `json` - JSON string representing an Avro schema
///
/// # Returns
/// The parsed Schema (root node plus named-type registry) or a SchemaError
///
/// # Example
/// ```
/// use avrolite::schema::parse_schema;
///
/// let schema = parse_schema(r#"{"type": "array", "items": "long"}"#).unwrap();
/// assert_eq!(schema.to_string(), r#"{"type":"array","items":"long"}"#);
/// ```
pub fn parse_schema(json: &str) -> Result<Schema, SchemaError> {
    let value: Value =
        serde_json::from_str(json).map_err(|e| SchemaError::InvalidJson(e.to_string()))?;
    parse_schema_value(&value)
}

/// Parse an Avro schema document from an already decoded JSON value.
pub fn parse_schema_value(value: &Value) -> Result<Schema, SchemaError> {
    let mut parser = SchemaParser::new();
    let root = parser.parse(value)?;
    Ok(Schema::from_parts(root, parser.into_schemata()))
}

/// Schema parser with named type resolution context.
///
/// The registry is replaced, never mutated, each time a named type is
/// declared; a failed parse leaves any registry the caller holds untouched.
#[derive(Debug, Default, Clone)]
pub struct SchemaParser {
    /// Named types declared so far
    schemata: Schemata,
}

impl SchemaParser {
    /// Create a parser with an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a parser that resolves names against an existing registry,
    /// e.g. the types section of a protocol.
    pub fn with_schemata(schemata: Schemata) -> Self {
        Self { schemata }
    }

    /// The registry as of the last successful declaration.
    pub fn schemata(&self) -> &Schemata {
        &self.schemata
    }

    /// Consume the parser, returning its registry.
    pub fn into_schemata(self) -> Schemata {
        self.schemata
    }

    /// Parse a JSON value with no enclosing namespace.
    pub fn parse(&mut self, value: &Value) -> Result<AvroSchema, SchemaError> {
        self.parse_in_namespace(value, None)
    }

    /// Parse a JSON value, inheriting `default_namespace` for unqualified names.
    pub fn parse_in_namespace(
        &mut self,
        value: &Value,
        default_namespace: Option<&str>,
    ) -> Result<AvroSchema, SchemaError> {
        match value {
            Value::String(s) => self.parse_type_name(s, default_namespace),
            Value::Object(obj) => self.parse_object_schema(obj, default_namespace),
            Value::Array(arr) => self.parse_union_schema(arr, default_namespace),
            other => Err(SchemaError::UnknownType(format!(
                "{} is not a schema we know about",
                other
            ))),
        }
    }

    /// Build the request schema of a protocol message from its parameter list.
    ///
    /// The request is named after the message but never registered.
    pub fn parse_request(
        &mut self,
        message: &str,
        fields: &Value,
        namespace: Option<&str>,
    ) -> Result<AvroSchema, SchemaError> {
        let name = Name::new(message, None, namespace)?;
        let fields = fields.as_array().ok_or_else(|| SchemaError::InvalidAttribute {
            attribute: "request",
            message: format!("request must be a list of fields: {}", fields),
        })?;
        let fields = self.parse_fields(fields, namespace, name.fullname())?;
        let record = RecordSchema::new(name, fields).with_kind(RecordKind::Request);
        Ok(AvroSchema::Record(record))
    }

    /// Resolve a bare type name: primitive first, then the registry.
    fn parse_type_name(
        &self,
        s: &str,
        default_namespace: Option<&str>,
    ) -> Result<AvroSchema, SchemaError> {
        if let Some(primitive) = AvroSchema::primitive(s) {
            return Ok(primitive);
        }

        let registered = Name::new(s, None, default_namespace)
            .ok()
            .and_then(|name| self.schemata.get(name.fullname()))
            .and_then(|schema| schema.name());

        match registered {
            // Keep the declaring context's name so it serializes the same way
            Some(name) => Ok(AvroSchema::Named(name.clone())),
            None => Err(SchemaError::UnknownType(format!(
                "{:?} is not a schema we know about",
                s
            ))),
        }
    }

    /// Parse a complex type from a JSON object.
    fn parse_object_schema(
        &mut self,
        obj: &Map<String, Value>,
        default_namespace: Option<&str>,
    ) -> Result<AvroSchema, SchemaError> {
        let type_str = match obj.get("type") {
            Some(Value::String(s)) => s.as_str(),
            _ => {
                return Err(SchemaError::UnknownType(format!(
                    "Undefined type: {}",
                    Value::Object(obj.clone())
                )))
            }
        };

        if let Some(primitive) = AvroSchema::primitive(type_str) {
            return Ok(primitive);
        }

        match type_str {
            "record" => self.parse_record_schema(obj, default_namespace, RecordKind::Record),
            "error" => self.parse_record_schema(obj, default_namespace, RecordKind::Error),
            "enum" => self.parse_enum_schema(obj, default_namespace),
            "fixed" => self.parse_fixed_schema(obj, default_namespace),
            "array" => {
                let items = required(obj, "array", "items")?;
                let items = self.parse_in_namespace(items, default_namespace)?;
                Ok(AvroSchema::Array(Box::new(items)))
            }
            "map" => {
                let values = required(obj, "map", "values")?;
                let values = self.parse_in_namespace(values, default_namespace)?;
                Ok(AvroSchema::Map(Box::new(values)))
            }
            other => Err(SchemaError::UnknownType(format!(
                "Unknown type: {}",
                other
            ))),
        }
    }

    /// Parse a union schema from a JSON array.
    ///
    /// Checked branch by branch: no nested unions, no repeated unnamed kind,
    /// no repeated named type.
    fn parse_union_schema(
        &mut self,
        arr: &[Value],
        default_namespace: Option<&str>,
    ) -> Result<AvroSchema, SchemaError> {
        let mut branches: Vec<AvroSchema> = Vec::with_capacity(arr.len());
        let mut seen_kinds: Vec<&'static str> = Vec::new();
        let mut seen_names: Vec<String> = Vec::new();

        for value in arr {
            let branch = self.parse_in_namespace(value, default_namespace)?;

            if let Some(name) = branch.name() {
                if seen_names.iter().any(|n| n == name.fullname()) {
                    return Err(SchemaError::InvalidUnion(format!(
                        "{} is already in union",
                        name.fullname()
                    )));
                }
                seen_names.push(name.fullname().to_string());
            } else {
                let kind = branch.type_name();
                if kind == "union" {
                    return Err(SchemaError::InvalidUnion(
                        "Unions cannot contain other unions".to_string(),
                    ));
                }
                if seen_kinds.contains(&kind) {
                    return Err(SchemaError::InvalidUnion(format!(
                        "{} is already in union",
                        kind
                    )));
                }
                seen_kinds.push(kind);
            }

            branches.push(branch);
        }

        Ok(AvroSchema::Union(branches))
    }

    /// Parse a record or error schema.
    ///
    /// The record is declared before its fields are parsed so fields can
    /// refer to it; the completed definition replaces the declaration.
    fn parse_record_schema(
        &mut self,
        obj: &Map<String, Value>,
        default_namespace: Option<&str>,
        kind: RecordKind,
    ) -> Result<AvroSchema, SchemaError> {
        let name = parse_name(obj, default_namespace)?;
        let doc = parse_doc(obj)?;

        let mut record = RecordSchema::new(name, Vec::new()).with_kind(kind);
        record.doc = doc;
        self.schemata = self.schemata.with_schema(AvroSchema::Record(record.clone()))?;

        let fields = match obj.get("fields") {
            Some(Value::Array(fields)) => fields,
            Some(other) => {
                return Err(SchemaError::InvalidAttribute {
                    attribute: "fields",
                    message: format!("fields must be a list: {}", other),
                })
            }
            None => {
                return Err(SchemaError::MissingAttribute {
                    kind: "record",
                    attribute: "fields",
                    fragment: Value::Object(obj.clone()).to_string(),
                })
            }
        };

        // Fields inherit the record's own namespace
        let namespace = record.name.namespace().map(String::from);
        let fullname = record.name.fullname().to_string();
        record.fields = self.parse_fields(fields, namespace.as_deref(), &fullname)?;

        let schema = AvroSchema::Record(record);
        self.schemata = self.schemata.with_definition(schema.clone());

        Ok(schema)
    }

    /// Parse the field list of a record or request.
    fn parse_fields(
        &mut self,
        fields: &[Value],
        default_namespace: Option<&str>,
        record: &str,
    ) -> Result<Vec<FieldSchema>, SchemaError> {
        let mut parsed: Vec<FieldSchema> = Vec::with_capacity(fields.len());

        for value in fields {
            let field = self.parse_field_schema(value, default_namespace)?;
            if parsed.iter().any(|f| f.name == field.name) {
                return Err(SchemaError::DuplicateField {
                    record: record.to_string(),
                    field: field.name,
                });
            }
            parsed.push(field);
        }

        Ok(parsed)
    }

    /// Parse a field schema within a record.
    fn parse_field_schema(
        &mut self,
        value: &Value,
        default_namespace: Option<&str>,
    ) -> Result<FieldSchema, SchemaError> {
        let obj = value.as_object().ok_or_else(|| SchemaError::InvalidAttribute {
            attribute: "fields",
            message: format!("field must be an object: {}", value),
        })?;

        let name = match obj.get("name") {
            Some(Value::String(name)) if is_well_formed_name(name) => name.clone(),
            Some(other) => return Err(SchemaError::InvalidName(other.to_string())),
            None => {
                return Err(SchemaError::MissingAttribute {
                    kind: "field",
                    attribute: "name",
                    fragment: value.to_string(),
                })
            }
        };

        let type_value = required(obj, "field", "type")?;
        let schema = self.parse_in_namespace(type_value, default_namespace)?;

        let order = match obj.get("order") {
            None => None,
            Some(Value::String(s)) => Some(FieldOrder::parse(s).ok_or_else(|| {
                SchemaError::InvalidAttribute {
                    attribute: "order",
                    message: format!("Invalid field sort order {:?}", s),
                }
            })?),
            Some(other) => {
                return Err(SchemaError::InvalidAttribute {
                    attribute: "order",
                    message: format!("Invalid field sort order {}", other),
                })
            }
        };

        Ok(FieldSchema {
            name,
            schema,
            default: obj.get("default").cloned(),
            order,
            doc: parse_doc(obj)?,
        })
    }

    /// Parse an enum schema.
    fn parse_enum_schema(
        &mut self,
        obj: &Map<String, Value>,
        default_namespace: Option<&str>,
    ) -> Result<AvroSchema, SchemaError> {
        let name = parse_name(obj, default_namespace)?;
        let doc = parse_doc(obj)?;

        let symbols = match required(obj, "enum", "symbols")? {
            Value::Array(symbols) => symbols,
            other => {
                return Err(SchemaError::InvalidAttribute {
                    attribute: "symbols",
                    message: format!("Enum symbols are not a list: {}", other),
                })
            }
        };

        if symbols.is_empty() {
            return Err(SchemaError::InvalidAttribute {
                attribute: "symbols",
                message: format!("Enum {} has no symbols", name),
            });
        }

        let mut parsed: Vec<String> = Vec::with_capacity(symbols.len());
        for symbol in symbols {
            match symbol {
                Value::String(s) if !s.is_empty() => {
                    if parsed.contains(s) {
                        return Err(SchemaError::InvalidAttribute {
                            attribute: "symbols",
                            message: format!("Duplicate enum symbol {:?}", s),
                        });
                    }
                    parsed.push(s.clone());
                }
                other => {
                    return Err(SchemaError::InvalidAttribute {
                        attribute: "symbols",
                        message: format!("Enum symbol is not a non-empty string: {}", other),
                    })
                }
            }
        }

        let mut schema = EnumSchema::new(name, parsed);
        schema.doc = doc;
        let schema = AvroSchema::Enum(schema);
        self.schemata = self.schemata.with_schema(schema.clone())?;

        Ok(schema)
    }

    /// Parse a fixed schema. A `doc` attribute is accepted and dropped.
    fn parse_fixed_schema(
        &mut self,
        obj: &Map<String, Value>,
        default_namespace: Option<&str>,
    ) -> Result<AvroSchema, SchemaError> {
        let name = parse_name(obj, default_namespace)?;

        let size = required(obj, "fixed", "size")?;
        let size = size
            .as_u64()
            .and_then(|s| usize::try_from(s).ok())
            .ok_or_else(|| SchemaError::InvalidAttribute {
                attribute: "size",
                message: format!("Fixed size must be a non-negative integer: {}", size),
            })?;

        let schema = AvroSchema::Fixed(FixedSchema::new(name, size));
        self.schemata = self.schemata.with_schema(schema.clone())?;

        Ok(schema)
    }
}

/// Fetch a required attribute.
fn required<'a>(
    obj: &'a Map<String, Value>,
    kind: &'static str,
    attribute: &'static str,
) -> Result<&'a Value, SchemaError> {
    obj.get(attribute)
        .ok_or_else(|| SchemaError::MissingAttribute {
            kind,
            attribute,
            fragment: Value::Object(obj.clone()).to_string(),
        })
}

/// Build the `Name` of a named type from its `name` and `namespace`.
fn parse_name(
    obj: &Map<String, Value>,
    default_namespace: Option<&str>,
) -> Result<Name, SchemaError> {
    let name = match obj.get("name") {
        Some(Value::String(name)) => name.as_str(),
        Some(other) => return Err(SchemaError::InvalidName(other.to_string())),
        None => return Err(SchemaError::InvalidName(String::new())),
    };

    let namespace = match obj.get("namespace") {
        None | Some(Value::Null) => None,
        Some(Value::String(ns)) => Some(ns.as_str()),
        Some(other) => return Err(SchemaError::InvalidNamespace(other.to_string())),
    };

    Name::new(name, namespace, default_namespace)
}

/// Read an optional `doc` attribute, which must be a string.
fn parse_doc(obj: &Map<String, Value>) -> Result<Option<String>, SchemaError> {
    match obj.get("doc") {
        None | Some(Value::Null) => Ok(None),
        Some(Value::String(doc)) => Ok(Some(doc.clone())),
        Some(other) => Err(SchemaError::InvalidAttribute {
            attribute: "doc",
            message: format!("doc must be a string: {}", other),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn parse(json: &str) -> Result<Schema, SchemaError> {
        parse_schema(json)
    }

    #[test]
    fn test_parse_primitives() {
        assert_eq!(parse(r#""int""#).unwrap().root(), &AvroSchema::Int);
        assert_eq!(parse(r#"{"type": "bytes"}"#).unwrap().root(), &AvroSchema::Bytes);
        assert!(matches!(
            parse(r#""True""#),
            Err(SchemaError::UnknownType(_))
        ));
        assert!(parse(r#"{"no_type": "test"}"#).is_err());
        assert!(parse(r#"{"type": "panther"}"#).is_err());
    }

    #[test]
    fn test_self_reference_resolves() {
        let schema = parse(
            r#"{"type": "record", "name": "ListLink", "fields": [
                {"name": "car", "type": "int"},
                {"name": "cdr", "type": "ListLink"}]}"#,
        )
        .unwrap();

        let AvroSchema::Record(record) = schema.root() else {
            panic!("expected record");
        };
        assert!(matches!(
            &record.fields[1].schema,
            AvroSchema::Named(n) if n.fullname() == "ListLink"
        ));
        // Registry holds the completed definition
        assert_eq!(schema.schemata().get("ListLink"), Some(schema.root()));
    }

    #[test]
    fn test_record_namespace_inherited_by_fields() {
        let schema = parse(
            r#"{"type": "record", "name": "Outer", "namespace": "a.b", "fields": [
                {"name": "inner", "type": {"type": "fixed", "name": "Inner", "size": 2}}]}"#,
        )
        .unwrap();
        assert!(schema.schemata().contains("a.b.Inner"));
        assert!(schema.schemata().contains("a.b.Outer"));
    }

    #[test]
    fn test_sibling_definitions_visible_in_order() {
        // The second field may reference the first field's type...
        assert!(parse(
            r#"{"type": "record", "name": "R", "fields": [
                {"name": "a", "type": {"type": "enum", "name": "E", "symbols": ["X"]}},
                {"name": "b", "type": "E"}]}"#
        )
        .is_ok());
        // ...but not the other way round
        assert!(parse(
            r#"{"type": "record", "name": "R", "fields": [
                {"name": "b", "type": "E"},
                {"name": "a", "type": {"type": "enum", "name": "E", "symbols": ["X"]}}]}"#
        )
        .is_err());
    }

    #[test]
    fn test_duplicate_definitions_rejected() {
        let err = parse(
            r#"{"type": "record", "name": "R", "fields": [
                {"name": "a", "type": {"type": "fixed", "name": "F", "size": 1}},
                {"name": "b", "type": {"type": "fixed", "name": "F", "size": 1}}]}"#,
        )
        .unwrap_err();
        assert!(matches!(err, SchemaError::DuplicateName(n) if n == "F"));
    }

    #[test]
    fn test_reserved_record_name_rejected() {
        let err = parse(r#"{"type": "record", "name": "int", "fields": []}"#).unwrap_err();
        assert!(matches!(err, SchemaError::ReservedName(_)));
    }

    #[test]
    fn test_union_rules() {
        assert!(parse(r#"["string", "null", "long"]"#).is_ok());
        assert!(matches!(
            parse(r#"["long", "long"]"#),
            Err(SchemaError::InvalidUnion(_))
        ));
        assert!(matches!(
            parse(r#"["long", {"type": "long"}, "int"]"#),
            Err(SchemaError::InvalidUnion(_))
        ));
        assert!(matches!(
            parse(r#"["long", ["string", "null"], "int"]"#),
            Err(SchemaError::InvalidUnion(m)) if m == "Unions cannot contain other unions"
        ));
        assert!(parse(
            r#"[{"type": "fixed", "name": "A", "size": 1}, {"type": "fixed", "name": "B", "size": 1}]"#
        )
        .is_ok());
    }

    #[test]
    fn test_union_rejects_same_named_type_twice() {
        let err = parse(
            r#"{"type": "record", "name": "R", "fields": [
                {"name": "a", "type": {"type": "fixed", "name": "F", "size": 1}},
                {"name": "b", "type": ["F", "F"]}]}"#,
        )
        .unwrap_err();
        assert!(matches!(err, SchemaError::InvalidUnion(_)));
    }

    #[test]
    fn test_field_attributes() {
        assert!(matches!(
            parse(r#"{"type":"record","name":"foo","fields":[{"name":"bar","type":"int","order":"bad"}]}"#),
            Err(SchemaError::InvalidAttribute { attribute: "order", .. })
        ));
        assert!(matches!(
            parse(r#"{"type":"record","name":"Event","fields":[{"name":"Sponsor"}]}"#),
            Err(SchemaError::MissingAttribute { attribute: "type", .. })
        ));
        assert!(matches!(
            parse(r#"{"type":"record","name":"R","fields":[{"name":"a","type":"int"},{"name":"a","type":"long"}]}"#),
            Err(SchemaError::DuplicateField { .. })
        ));
        assert!(matches!(
            parse(r#"{"type":"record","name":"R"}"#),
            Err(SchemaError::MissingAttribute { attribute: "fields", .. })
        ));
    }

    #[test]
    fn test_enum_attributes() {
        assert!(parse(r#"{"type": "enum", "name": "T", "symbols": ["", "B"]}"#).is_err());
        assert!(parse(r#"{"type": "enum", "name": "T", "symbols": ["A", 1]}"#).is_err());
        assert!(parse(r#"{"type": "enum", "name": "T", "symbols": ["AA", "AA"]}"#).is_err());
        assert!(parse(r#"{"type": "enum", "name": "T", "symbols": "A"}"#).is_err());
        assert!(parse(r#"{"type": "enum", "name": "T", "symbols": []}"#).is_err());
        assert!(parse(r#"{"type": "enum", "name": "T", "doc": 16, "symbols": ["A"]}"#).is_err());
    }

    #[test]
    fn test_fixed_attributes() {
        assert!(parse(r#"{"type": "fixed", "name": "Missing"}"#).is_err());
        assert!(parse(r#"{"type": "fixed", "size": 314}"#).is_err());
        assert!(parse(r#"{"type": "fixed", "name": "F", "size": "16"}"#).is_err());
        assert!(parse(r#"{"type": "fixed", "name": "F", "size": -1}"#).is_err());
        let schema = parse(r#"{"type":"fixed","name":"ex","doc":"ignored","size":314}"#).unwrap();
        assert_eq!(
            schema.to_json_value(),
            json!({"type": "fixed", "name": "ex", "size": 314})
        );
    }

    #[test]
    fn test_parse_request() {
        let mut parser = SchemaParser::new();
        let request = parser
            .parse_request(
                "add",
                &json!([{"name": "a", "type": "int"}, {"name": "b", "type": "int"}]),
                Some("com.example"),
            )
            .unwrap();

        assert_eq!(request.type_name(), "request");
        assert_eq!(
            request.to_json_value(),
            json!([{"name": "a", "type": "int"}, {"name": "b", "type": "int"}])
        );
        // Requests are not registered
        assert!(parser.schemata().is_empty());
    }

    #[test]
    fn test_seeded_parser_resolves_protocol_types() {
        let mut parser = SchemaParser::new();
        parser
            .parse_in_namespace(
                &json!({"type": "record", "name": "Greeting", "fields": [{"name": "message", "type": "string"}]}),
                Some("org.example"),
            )
            .unwrap();

        let mut seeded = SchemaParser::with_schemata(parser.into_schemata());
        let response = seeded
            .parse_in_namespace(&json!("Greeting"), Some("org.example"))
            .unwrap();
        assert!(matches!(response, AvroSchema::Named(n) if n.fullname() == "org.example.Greeting"));
    }
}
