//! Descriptor registry: the declarative configuration the engine consumes
//!
//! Instead of discovering fields reflectively at mapping time, every
//! structural type is described once, at registration time, by a
//! [`TypeDescriptor`] held in a [`TypeRegistry`]. A descriptor carries the
//! type's ordered fields, its optional parent type (one level, never deeper),
//! whether it is itself a mapping destination (the nested-mapping marker),
//! and whether it can be constructed with zero arguments.
//!
//! Mapping directives are authored by the data-model layer and are read-only
//! configuration to the engine: a list of context tokens for which the field
//! is active plus an optional explicit source-field binding.

use crate::error::{Error, Result};
use crate::value::{CollectionKind, CollectionValue, ObjectValue, Value};
use serde::Serialize;
use std::collections::HashMap;
use std::fmt;

/// Opaque identity used to gate directive-controlled fields
///
/// A target field participates in a mapping only when its directive lists
/// the caller-supplied token; tokens are compared by equality only.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct ContextToken(String);

impl ContextToken {
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    pub fn name(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ContextToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Per-field declarative mapping metadata
#[derive(Debug, Clone, PartialEq)]
pub struct MappingDirective {
    contexts: Vec<ContextToken>,
    bound_name: Option<String>,
}

impl MappingDirective {
    /// A directive active for the given context tokens
    pub fn new(contexts: impl IntoIterator<Item = ContextToken>) -> Self {
        Self {
            contexts: contexts.into_iter().collect(),
            bound_name: None,
        }
    }

    /// Bind this field to an explicitly named source field instead of its
    /// own name
    pub fn bound_to(mut self, source_field: impl Into<String>) -> Self {
        self.bound_name = Some(source_field.into());
        self
    }

    /// Whether this directive activates the field for `token`
    ///
    /// A directive with an empty context list never applies.
    pub fn applies_to(&self, token: &ContextToken) -> bool {
        self.contexts.contains(token)
    }

    /// The explicit source binding, if present and non-empty
    pub fn bound_name(&self) -> Option<&str> {
        self.bound_name.as_deref().filter(|name| !name.is_empty())
    }
}

/// Declared type of a field slot
#[derive(Debug, Clone, PartialEq)]
pub enum FieldType {
    Bool,
    Int,
    Float,
    Str,
    /// A named structural type
    Object(String),
    /// A single-parameter generic container
    Collection {
        kind: CollectionKind,
        element: Box<FieldType>,
    },
}

impl FieldType {
    pub fn object(name: impl Into<String>) -> Self {
        FieldType::Object(name.into())
    }

    pub fn list_of(element: impl Into<String>) -> Self {
        FieldType::Collection {
            kind: CollectionKind::List,
            element: Box::new(FieldType::Object(element.into())),
        }
    }

    pub fn set_of(element: impl Into<String>) -> Self {
        FieldType::Collection {
            kind: CollectionKind::Set,
            element: Box::new(FieldType::Object(element.into())),
        }
    }

    pub fn queue_of(element: impl Into<String>) -> Self {
        FieldType::Collection {
            kind: CollectionKind::PriorityQueue,
            element: Box::new(FieldType::Object(element.into())),
        }
    }

    /// The zero value a freshly constructed instance carries in this slot
    pub fn zero(&self) -> Value {
        match self {
            FieldType::Bool => Value::Bool(false),
            FieldType::Int => Value::Int(0),
            FieldType::Float => Value::Float(0.0),
            FieldType::Str => Value::Str(String::new()),
            FieldType::Object(_) => Value::Null,
            FieldType::Collection { kind, .. } => Value::Collection(CollectionValue::empty(*kind)),
        }
    }

    /// The named type whose nested-mapping marker decides whether this slot
    /// triggers recursive mapping: the type itself, or a container's element
    /// type
    pub(crate) fn nested_type_name(&self) -> Option<&str> {
        match self {
            FieldType::Object(name) => Some(name),
            FieldType::Collection { element, .. } => element.nested_type_name(),
            _ => None,
        }
    }

    pub(crate) fn collection_kind(&self) -> Option<CollectionKind> {
        match self {
            FieldType::Collection { kind, .. } => Some(*kind),
            _ => None,
        }
    }
}

impl fmt::Display for FieldType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FieldType::Bool => write!(f, "Bool"),
            FieldType::Int => write!(f, "Int"),
            FieldType::Float => write!(f, "Float"),
            FieldType::Str => write!(f, "Str"),
            FieldType::Object(name) => write!(f, "{name}"),
            FieldType::Collection { kind, element } => write!(f, "{kind}<{element}>"),
        }
    }
}

/// A named, typed slot on a structural type, with its optional directive
#[derive(Debug, Clone)]
pub struct FieldDescriptor {
    name: String,
    field_type: FieldType,
    directive: Option<MappingDirective>,
}

impl FieldDescriptor {
    pub fn new(name: impl Into<String>, field_type: FieldType) -> Self {
        Self {
            name: name.into(),
            field_type,
            directive: None,
        }
    }

    pub fn with_directive(mut self, directive: MappingDirective) -> Self {
        self.directive = Some(directive);
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn field_type(&self) -> &FieldType {
        &self.field_type
    }

    pub fn directive(&self) -> Option<&MappingDirective> {
        self.directive.as_ref()
    }

    /// The source field name this slot binds to: the directive's explicit
    /// binding when present and non-empty, else the field's own name
    pub(crate) fn resolved_source_name(&self) -> &str {
        self.directive
            .as_ref()
            .and_then(MappingDirective::bound_name)
            .unwrap_or(&self.name)
    }
}

/// Structural description of one registered type
#[derive(Debug, Clone)]
pub struct TypeDescriptor {
    name: String,
    parent: Option<String>,
    mapping_target: bool,
    default_constructible: bool,
    fields: Vec<FieldDescriptor>,
}

impl TypeDescriptor {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            parent: None,
            mapping_target: false,
            default_constructible: true,
            fields: Vec::new(),
        }
    }

    /// Declare the immediate parent type; only this one level contributes
    /// fields, never deeper ancestors
    pub fn extends(mut self, parent: impl Into<String>) -> Self {
        self.parent = Some(parent.into());
        self
    }

    /// Mark this type as a mapping destination, enabling recursive mapping
    /// into it
    pub fn mapping_target(mut self) -> Self {
        self.mapping_target = true;
        self
    }

    /// Declare that this type has no zero-argument initializer
    pub fn without_default_constructor(mut self) -> Self {
        self.default_constructible = false;
        self
    }

    pub fn field(mut self, field: FieldDescriptor) -> Self {
        self.fields.push(field);
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn parent(&self) -> Option<&str> {
        self.parent.as_deref()
    }

    pub fn is_mapping_target(&self) -> bool {
        self.mapping_target
    }

    pub fn fields(&self) -> &[FieldDescriptor] {
        &self.fields
    }
}

/// Registry of all structural types known to the engine
#[derive(Debug, Default)]
pub struct TypeRegistry {
    types: HashMap<String, TypeDescriptor>,
}

impl TypeRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a type, replacing any previous descriptor with the same name
    pub fn register(&mut self, descriptor: TypeDescriptor) -> &mut Self {
        self.types.insert(descriptor.name.clone(), descriptor);
        self
    }

    pub fn get(&self, name: &str) -> Option<&TypeDescriptor> {
        self.types.get(name)
    }

    pub fn is_mapping_target(&self, name: &str) -> bool {
        self.types
            .get(name)
            .map(TypeDescriptor::is_mapping_target)
            .unwrap_or(false)
    }

    /// The type's declared fields followed by its immediate parent's declared
    /// fields
    ///
    /// This one-level union is the complete field set on both the source and
    /// target side, at every recursion depth.
    pub fn effective_fields(&self, name: &str) -> Result<Vec<&FieldDescriptor>> {
        let descriptor = self.require(name)?;
        let mut fields: Vec<&FieldDescriptor> = descriptor.fields.iter().collect();
        if let Some(parent) = descriptor.parent() {
            let parent_descriptor = self.types.get(parent).ok_or_else(|| Error::Validation {
                field: name.to_string(),
                message: format!("parent type '{parent}' is not registered"),
            })?;
            fields.extend(parent_descriptor.fields.iter());
        }
        Ok(fields)
    }

    /// Construct a fresh, zero-valued instance of a registered type
    ///
    /// The instance carries one slot per effective field. Field names shadowed
    /// across the parent boundary resolve to the child's declaration.
    pub fn new_instance(&self, name: &str) -> Result<ObjectValue> {
        let descriptor = self.types.get(name).ok_or_else(|| Error::InstanceCreation {
            type_name: name.to_string(),
        })?;
        if !descriptor.default_constructible {
            return Err(Error::MissingDefaultConstructor {
                type_name: name.to_string(),
            });
        }
        let mut instance = ObjectValue::new(name);
        for field in self.effective_fields(name)? {
            if instance.get(field.name()).is_none() {
                instance.insert(field.name(), field.field_type().zero());
            }
        }
        Ok(instance)
    }

    fn require(&self, name: &str) -> Result<&TypeDescriptor> {
        self.types.get(name).ok_or_else(|| Error::Validation {
            field: name.to_string(),
            message: "type is not registered".to_string(),
        })
    }
}
