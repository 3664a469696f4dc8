//! Schema files describing bean and record classes
//!
//! A schema lists classes and their members with type expressions:
//! `bool`, `int`, `float`, `string`, `any`, `[T]` for a sequence of `T`, or
//! the name of another class in the same schema. Classes may be declared in
//! any order; a class that (directly or through sequences) contains itself
//! is rejected because class descriptors are immutable once built.
//!
//! ```toml
//! [[record]]
//! name = "Person"
//! components = [
//!     { name = "name", type = "string" },
//!     { name = "age", type = "int" },
//! ]
//!
//! [[bean]]
//! name = "Team"
//! properties = [
//!     { name = "members", type = "[Person]" },
//!     { name = "id", type = "int", access = "read-only", rename = "team_id" },
//! ]
//! ```

use objmap_model::{
    Access, BeanClass, Component, Property, RecordClass, TypeDescriptor,
};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashSet};
use std::path::Path;
use thiserror::Error;

/// Errors raised while loading or resolving a schema
#[derive(Debug, Error)]
pub enum SchemaError {
    /// Schema file could not be read
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    /// TOML schema failed to parse
    #[error("TOML error: {0}")]
    Toml(#[from] toml::de::Error),
    /// JSON schema failed to parse
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
    /// File extension is neither `.toml` nor `.json`
    #[error("Unsupported schema format: {0}")]
    UnsupportedFormat(String),
    /// Two classes share a name
    #[error("Duplicate class '{0}'")]
    DuplicateClass(String),
    /// A type expression names no scalar and no declared class
    #[error("Unknown type '{ty}' in {context}")]
    UnknownType {
        /// Offending type expression
        ty: String,
        /// Where it was used
        context: String,
    },
    /// A type expression is syntactically broken
    #[error("Invalid type expression '{0}'")]
    InvalidTypeExpr(String),
    /// A class contains itself
    #[error("Class '{0}' contains itself")]
    Cycle(String),
}

/// Accessor set of a bean property in a schema file
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum AccessSpec {
    /// Getter and setter
    #[default]
    ReadWrite,
    /// Getter only
    ReadOnly,
    /// Setter only
    WriteOnly,
}

impl From<AccessSpec> for Access {
    fn from(spec: AccessSpec) -> Self {
        match spec {
            AccessSpec::ReadWrite => Access::ReadWrite,
            AccessSpec::ReadOnly => Access::ReadOnly,
            AccessSpec::WriteOnly => Access::WriteOnly,
        }
    }
}

/// One member of a class in a schema file
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct MemberSpec {
    /// Structural name
    pub name: String,
    /// Type expression
    #[serde(rename = "type")]
    pub ty: String,
    /// Emitted name override
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rename: Option<String>,
    /// Accessor set (beans only)
    #[serde(default)]
    pub access: AccessSpec,
}

/// Bean class declaration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct BeanSpec {
    /// Class name
    pub name: String,
    /// Properties
    #[serde(default)]
    pub properties: Vec<MemberSpec>,
}

/// Record class declaration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RecordSpec {
    /// Record name
    pub name: String,
    /// Components in declared order
    #[serde(default)]
    pub components: Vec<MemberSpec>,
}

/// Raw schema file contents
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SchemaFile {
    /// Bean classes
    #[serde(default, rename = "bean")]
    pub beans: Vec<BeanSpec>,
    /// Record classes
    #[serde(default, rename = "record")]
    pub records: Vec<RecordSpec>,
}

impl SchemaFile {
    /// Parse TOML schema text
    pub fn from_toml_str(text: &str) -> Result<Self, SchemaError> {
        Ok(toml::from_str(text)?)
    }

    /// Parse JSON schema text
    pub fn from_json_str(text: &str) -> Result<Self, SchemaError> {
        Ok(serde_json::from_str(text)?)
    }

    /// Read a schema file, choosing the format by extension
    pub fn load(path: &Path) -> Result<Self, SchemaError> {
        let text = std::fs::read_to_string(path)?;
        match path.extension().and_then(|ext| ext.to_str()) {
            Some("toml") => Self::from_toml_str(&text),
            Some("json") => Self::from_json_str(&text),
            _ => Err(SchemaError::UnsupportedFormat(path.display().to_string())),
        }
    }
}

enum ClassSpec<'a> {
    Bean(&'a BeanSpec),
    Record(&'a RecordSpec),
}

/// Resolved classes of a schema, by name
#[derive(Debug, Clone, Default)]
pub struct Schema {
    classes: BTreeMap<String, TypeDescriptor>,
}

impl Schema {
    /// Build every class declared in `file`
    pub fn resolve(file: &SchemaFile) -> Result<Self, SchemaError> {
        let mut specs: BTreeMap<&str, ClassSpec<'_>> = BTreeMap::new();
        let declared = file
            .beans
            .iter()
            .map(|b| (b.name.as_str(), ClassSpec::Bean(b)))
            .chain(
                file.records
                    .iter()
                    .map(|r| (r.name.as_str(), ClassSpec::Record(r))),
            );
        for (name, spec) in declared {
            if specs.insert(name, spec).is_some() {
                return Err(SchemaError::DuplicateClass(name.to_string()));
            }
        }

        let mut resolver = Resolver {
            specs: &specs,
            built: BTreeMap::new(),
            in_progress: HashSet::new(),
        };
        for name in specs.keys() {
            resolver.class(name)?;
        }
        Ok(Self {
            classes: resolver.built,
        })
    }

    /// Load and resolve a schema file
    pub fn load(path: &Path) -> Result<Self, SchemaError> {
        Self::resolve(&SchemaFile::load(path)?)
    }

    /// Descriptor of class `name`
    pub fn class(&self, name: &str) -> Option<&TypeDescriptor> {
        self.classes.get(name)
    }

    /// All classes, ordered by name
    pub fn classes(&self) -> impl Iterator<Item = (&str, &TypeDescriptor)> {
        self.classes.iter().map(|(name, ty)| (name.as_str(), ty))
    }

    /// Resolve a type expression against this schema's classes
    pub fn type_of(&self, expr: &str) -> Result<TypeDescriptor, SchemaError> {
        parse_type_expr(expr, &mut |name: &str| {
            self.classes
                .get(name)
                .cloned()
                .ok_or_else(|| SchemaError::UnknownType {
                    ty: expr.to_string(),
                    context: "type expression".to_string(),
                })
        })
    }
}

struct Resolver<'s, 'a> {
    specs: &'s BTreeMap<&'a str, ClassSpec<'a>>,
    built: BTreeMap<String, TypeDescriptor>,
    in_progress: HashSet<String>,
}

impl Resolver<'_, '_> {
    fn class(&mut self, name: &str) -> Result<TypeDescriptor, SchemaError> {
        if let Some(ty) = self.built.get(name) {
            return Ok(ty.clone());
        }
        let specs = self.specs;
        let spec = specs.get(name).ok_or_else(|| SchemaError::UnknownType {
            ty: name.to_string(),
            context: "schema".to_string(),
        })?;
        if !self.in_progress.insert(name.to_string()) {
            return Err(SchemaError::Cycle(name.to_string()));
        }

        let ty = match spec {
            ClassSpec::Bean(bean) => {
                let mut builder = BeanClass::builder(bean.name.clone());
                for member in &bean.properties {
                    let ty = self.member_type(&bean.name, member)?;
                    let mut property =
                        Property::new(member.name.clone(), ty).with_access(member.access.into());
                    if let Some(rename) = &member.rename {
                        property = property.renamed(rename.clone());
                    }
                    builder = builder.property_with(property);
                }
                TypeDescriptor::Bean(builder.build())
            }
            ClassSpec::Record(record) => {
                let mut builder = RecordClass::builder(record.name.clone());
                for member in &record.components {
                    let ty = self.member_type(&record.name, member)?;
                    let mut component = Component::new(member.name.clone(), ty);
                    if let Some(rename) = &member.rename {
                        component = component.renamed(rename.clone());
                    }
                    builder = builder.component_with(component);
                }
                TypeDescriptor::Record(builder.build())
            }
        };

        self.in_progress.remove(name);
        self.built.insert(name.to_string(), ty.clone());
        Ok(ty)
    }

    fn member_type(&mut self, class: &str, member: &MemberSpec) -> Result<TypeDescriptor, SchemaError> {
        let context = format!("{}.{}", class, member.name);
        parse_type_expr(&member.ty, &mut |name: &str| {
            self.class(name).map_err(|err| match err {
                SchemaError::UnknownType { ty, context: inner } if inner == "schema" => {
                    SchemaError::UnknownType {
                        ty,
                        context: context.clone(),
                    }
                }
                other => other,
            })
        })
    }
}

fn parse_type_expr(
    expr: &str,
    lookup: &mut dyn FnMut(&str) -> Result<TypeDescriptor, SchemaError>,
) -> Result<TypeDescriptor, SchemaError> {
    let expr = expr.trim();
    if let Some(inner) = expr.strip_prefix('[') {
        let inner = inner
            .strip_suffix(']')
            .ok_or_else(|| SchemaError::InvalidTypeExpr(expr.to_string()))?;
        return Ok(TypeDescriptor::sequence_of(parse_type_expr(inner, lookup)?));
    }
    match expr {
        "bool" => Ok(TypeDescriptor::Bool),
        "int" => Ok(TypeDescriptor::Int),
        "float" => Ok(TypeDescriptor::Float),
        "string" => Ok(TypeDescriptor::String),
        "any" => Ok(TypeDescriptor::Any),
        "" => Err(SchemaError::InvalidTypeExpr(expr.to_string())),
        name if name.chars().all(|c| c.is_alphanumeric() || c == '_') => lookup(name),
        other => Err(SchemaError::InvalidTypeExpr(other.to_string())),
    }
}
