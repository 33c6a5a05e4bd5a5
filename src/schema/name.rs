//! Names of record, enum and fixed schemas.
//!
//! A name is either simple (`Foo`) and placed in an explicit or inherited
//! namespace, or already fully qualified (`org.example.Foo`). Every
//! dot-separated component must match `[A-Za-z_][A-Za-z0-9_]*`.

use std::fmt;

use crate::error::SchemaError;

/// Separator between namespace components.
pub const NAME_SEPARATOR: char = '.';

/// A validated, normalized schema name.
///
/// `qualified_name` is the shortest form that still resolves correctly in
/// the context the name was declared in: the simple name when the namespace
/// equals the enclosing default namespace, else the fullname.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Name {
    name: String,
    namespace: Option<String>,
    fullname: String,
    qualified_name: String,
}

impl Name {
    /// Build a name from its parts.
    ///
    /// # Arguments
    /// * `name` - Simple or fully qualified name
    /// * `namespace` - Explicit namespace attribute, if any
    /// * `default_namespace` - Namespace inherited from the enclosing schema
    ///
    /// # Errors
    /// Returns `SchemaError::InvalidName` for an empty or malformed name, and
    /// `SchemaError::InvalidNamespace` for an empty or malformed namespace.
    pub fn new(
        name: &str,
        namespace: Option<&str>,
        default_namespace: Option<&str>,
    ) -> Result<Self, SchemaError> {
        if name.is_empty() {
            return Err(SchemaError::InvalidName(name.to_string()));
        }

        let fullname = if name.contains(NAME_SEPARATOR) {
            check_components(name).map_err(|_| SchemaError::InvalidName(name.to_string()))?;
            name.to_string()
        } else if !is_well_formed_name(name) {
            return Err(SchemaError::InvalidName(name.to_string()));
        } else if let Some(ns) = namespace {
            compose(name, ns)?
        } else if let Some(ns) = default_namespace {
            compose(name, ns)?
        } else {
            name.to_string()
        };

        let (simple, namespace) = split_fullname(&fullname);
        let qualified_name = match namespace {
            Some(ns) if Some(ns) != default_namespace => fullname.clone(),
            _ => simple.to_string(),
        };

        Ok(Self {
            name: simple.to_string(),
            namespace: namespace.map(String::from),
            fullname,
            qualified_name,
        })
    }

    /// The simple (unqualified) name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The namespace, if any.
    pub fn namespace(&self) -> Option<&str> {
        self.namespace.as_deref()
    }

    /// The fully qualified name, used as registry key.
    pub fn fullname(&self) -> &str {
        &self.fullname
    }

    /// The name as it should be written in the declaring context.
    pub fn qualified_name(&self) -> &str {
        &self.qualified_name
    }

    /// The shortest form of this name that resolves back to it when written
    /// inside `namespace`.
    pub fn relative_to(&self, namespace: Option<&str>) -> &str {
        if self.namespace() == namespace {
            &self.name
        } else {
            &self.fullname
        }
    }

    /// The `(name, namespace)` attributes a definition emits when written
    /// inside `namespace`; the namespace is omitted when it is inherited.
    pub fn attributes_relative_to(&self, namespace: Option<&str>) -> (&str, Option<&str>) {
        if self.namespace() == namespace {
            (&self.name, None)
        } else {
            (&self.name, self.namespace())
        }
    }
}

impl fmt::Display for Name {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.fullname)
    }
}

/// Check a single name component against `[A-Za-z_][A-Za-z0-9_]*`.
pub fn is_well_formed_name(name: &str) -> bool {
    let mut chars = name.chars();
    match chars.next() {
        Some(first) if first.is_ascii_alphabetic() || first == '_' => {
            chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
        }
        _ => false,
    }
}

/// Split `a.b.C` into `("C", Some("a.b"))`.
pub fn split_fullname(fullname: &str) -> (&str, Option<&str>) {
    match fullname.rsplit_once(NAME_SEPARATOR) {
        Some((namespace, name)) => (name, Some(namespace)),
        None => (fullname, None),
    }
}

fn check_components(dotted: &str) -> Result<(), SchemaError> {
    for component in dotted.split(NAME_SEPARATOR) {
        if !is_well_formed_name(component) {
            return Err(SchemaError::InvalidNamespace(dotted.to_string()));
        }
    }
    Ok(())
}

fn compose(name: &str, namespace: &str) -> Result<String, SchemaError> {
    if namespace.is_empty() {
        return Err(SchemaError::InvalidNamespace(namespace.to_string()));
    }
    check_components(namespace)?;
    Ok(format!("{}{}{}", namespace, NAME_SEPARATOR, name))
}
