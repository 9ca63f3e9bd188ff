//! Dynamic value model for source and target object graphs
//!
//! The engine does not operate on native Rust structs; it operates on a small
//! closed value enum that can represent a persistence-layer entity graph
//! (typed objects, scalars, ordered lists, hashed sets, lazily-loaded proxy
//! collections) and the freshly constructed DTO graph it maps into.
//!
//! `Value` serializes to JSON so mapped targets can be rendered or asserted
//! against with `serde_json`.

use crate::error::{Error, Result};
use serde::ser::{Serialize, SerializeMap, SerializeSeq, Serializer};
use std::cmp::Ordering;
use std::fmt;

/// Output category of a collection field
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize)]
pub enum CollectionKind {
    /// Ordered list; preserves source iteration order
    List,
    /// Unique set; deduplicates by element equality
    Set,
    /// Priority-ordered output; sorted by [`priority_cmp`]
    PriorityQueue,
}

impl fmt::Display for CollectionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CollectionKind::List => write!(f, "List"),
            CollectionKind::Set => write!(f, "Set"),
            CollectionKind::PriorityQueue => write!(f, "PriorityQueue"),
        }
    }
}

/// A node in an object graph
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    Str(String),
    Object(ObjectValue),
    Collection(CollectionValue),
}

impl Value {
    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    pub fn as_object(&self) -> Option<&ObjectValue> {
        match self {
            Value::Object(obj) => Some(obj),
            _ => None,
        }
    }

    pub fn as_collection(&self) -> Option<&CollectionValue> {
        match self {
            Value::Collection(col) => Some(col),
            _ => None,
        }
    }

    pub fn as_int(&self) -> Option<i64> {
        match self {
            Value::Int(i) => Some(*i),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::Str(s) => Some(s),
            _ => None,
        }
    }

    /// Render this value as a `serde_json::Value`
    pub fn to_json(&self) -> serde_json::Value {
        serde_json::to_value(self).unwrap_or(serde_json::Value::Null)
    }
}

impl From<bool> for Value {
    fn from(v: bool) -> Self {
        Value::Bool(v)
    }
}

impl From<i64> for Value {
    fn from(v: i64) -> Self {
        Value::Int(v)
    }
}

impl From<f64> for Value {
    fn from(v: f64) -> Self {
        Value::Float(v)
    }
}

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Value::Str(v.to_string())
    }
}

impl From<String> for Value {
    fn from(v: String) -> Self {
        Value::Str(v)
    }
}

/// A typed structural instance: a type name plus its fields in declaration
/// order
#[derive(Debug, Clone, PartialEq)]
pub struct ObjectValue {
    type_name: String,
    fields: Vec<(String, Value)>,
}

impl ObjectValue {
    pub fn new(type_name: impl Into<String>) -> Self {
        Self {
            type_name: type_name.into(),
            fields: Vec::new(),
        }
    }

    /// Builder-style field insertion, for constructing fixture graphs
    pub fn with_field(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.insert(name, value.into());
        self
    }

    pub fn type_name(&self) -> &str {
        &self.type_name
    }

    /// Add a field, replacing any existing field of the same name
    pub fn insert(&mut self, name: impl Into<String>, value: Value) {
        let name = name.into();
        if let Some(slot) = self.fields.iter_mut().find(|(n, _)| *n == name) {
            slot.1 = value;
        } else {
            self.fields.push((name, value));
        }
    }

    pub fn get(&self, name: &str) -> Option<&Value> {
        self.fields
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, v)| v)
    }

    /// Write to an existing field slot; writing to a slot the instance does
    /// not carry is a [`Error::FieldAccess`]
    pub fn set(&mut self, name: &str, value: Value) -> Result<()> {
        match self.fields.iter_mut().find(|(n, _)| n == name) {
            Some(slot) => {
                slot.1 = value;
                Ok(())
            }
            None => Err(Error::FieldAccess {
                type_name: self.type_name.clone(),
                field: name.to_string(),
            }),
        }
    }

    pub fn fields(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.fields.iter().map(|(n, v)| (n.as_str(), v))
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

/// A collection value with a closed tagged shape
///
/// Source shapes the engine recognizes: an ordered list, a hashed set, and a
/// lazily-initialized persistence proxy (list-like once loaded). The `lazy`
/// flag marks a proxy; `materialized` says whether the proxy has been loaded.
/// The engine never touches the elements of an unmaterialized proxy.
#[derive(Debug, Clone, PartialEq)]
pub struct CollectionValue {
    kind: CollectionKind,
    lazy: bool,
    materialized: bool,
    elements: Vec<Value>,
}

impl CollectionValue {
    /// An ordered, materialized list
    pub fn list(elements: Vec<Value>) -> Self {
        Self {
            kind: CollectionKind::List,
            lazy: false,
            materialized: true,
            elements,
        }
    }

    /// A materialized unique set
    pub fn set(elements: Vec<Value>) -> Self {
        Self {
            kind: CollectionKind::Set,
            lazy: false,
            materialized: true,
            elements,
        }
    }

    /// A persistence proxy that has been loaded
    pub fn lazy_loaded(elements: Vec<Value>) -> Self {
        Self {
            kind: CollectionKind::List,
            lazy: true,
            materialized: true,
            elements,
        }
    }

    /// A persistence proxy that has not been loaded; `elements` model the
    /// rows the proxy would load and must never be observed by the engine
    pub fn lazy_unloaded(elements: Vec<Value>) -> Self {
        Self {
            kind: CollectionKind::List,
            lazy: true,
            materialized: false,
            elements,
        }
    }

    /// An empty collection of the given output category
    pub fn empty(kind: CollectionKind) -> Self {
        Self {
            kind,
            lazy: false,
            materialized: true,
            elements: Vec::new(),
        }
    }

    pub fn kind(&self) -> CollectionKind {
        self.kind
    }

    pub fn is_lazy(&self) -> bool {
        self.lazy
    }

    /// Whether the underlying collection has been populated; always true for
    /// non-proxy collections
    pub fn is_loaded(&self) -> bool {
        !self.lazy || self.materialized
    }

    pub fn elements(&self) -> &[Value] {
        &self.elements
    }

    pub fn len(&self) -> usize {
        self.elements.len()
    }

    pub fn is_empty(&self) -> bool {
        self.elements.is_empty()
    }

    pub(crate) fn push(&mut self, value: Value) {
        self.elements.push(value);
    }

    /// Push unless an equal element is already present
    pub(crate) fn push_unique(&mut self, value: Value) {
        if !self.elements.contains(&value) {
            self.elements.push(value);
        }
    }

    /// Sort elements into priority order
    pub(crate) fn sort_by_priority(&mut self) {
        self.elements.sort_by(priority_cmp);
    }
}

/// Deterministic total order over values, used to finalize
/// [`CollectionKind::PriorityQueue`] outputs
///
/// Variants order by rank (null < bool < int < float < str < object <
/// collection); like variants compare by value, objects by type name then
/// field-wise in declaration order, floats by `total_cmp`.
pub fn priority_cmp(a: &Value, b: &Value) -> Ordering {
    fn rank(v: &Value) -> u8 {
        match v {
            Value::Null => 0,
            Value::Bool(_) => 1,
            Value::Int(_) => 2,
            Value::Float(_) => 3,
            Value::Str(_) => 4,
            Value::Object(_) => 5,
            Value::Collection(_) => 6,
        }
    }

    fn seq_cmp<'a>(
        xs: impl Iterator<Item = &'a Value>,
        ys: impl Iterator<Item = &'a Value>,
        x_len: usize,
        y_len: usize,
    ) -> Ordering {
        for (x, y) in xs.zip(ys) {
            let ord = priority_cmp(x, y);
            if ord != Ordering::Equal {
                return ord;
            }
        }
        x_len.cmp(&y_len)
    }

    match (a, b) {
        (Value::Null, Value::Null) => Ordering::Equal,
        (Value::Bool(x), Value::Bool(y)) => x.cmp(y),
        (Value::Int(x), Value::Int(y)) => x.cmp(y),
        (Value::Float(x), Value::Float(y)) => x.total_cmp(y),
        (Value::Str(x), Value::Str(y)) => x.cmp(y),
        (Value::Object(x), Value::Object(y)) => x.type_name.cmp(&y.type_name).then_with(|| {
            seq_cmp(
                x.fields.iter().map(|(_, v)| v),
                y.fields.iter().map(|(_, v)| v),
                x.fields.len(),
                y.fields.len(),
            )
        }),
        (Value::Collection(x), Value::Collection(y)) => seq_cmp(
            x.elements.iter(),
            y.elements.iter(),
            x.elements.len(),
            y.elements.len(),
        ),
        _ => rank(a).cmp(&rank(b)),
    }
}

impl Serialize for Value {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        match self {
            Value::Null => serializer.serialize_unit(),
            Value::Bool(b) => serializer.serialize_bool(*b),
            Value::Int(i) => serializer.serialize_i64(*i),
            Value::Float(f) => serializer.serialize_f64(*f),
            Value::Str(s) => serializer.serialize_str(s),
            Value::Object(obj) => {
                let mut map = serializer.serialize_map(Some(obj.fields.len()))?;
                for (name, value) in &obj.fields {
                    map.serialize_entry(name, value)?;
                }
                map.end()
            }
            Value::Collection(col) => {
                let mut seq = serializer.serialize_seq(Some(col.elements.len()))?;
                for value in &col.elements {
                    seq.serialize_element(value)?;
                }
                seq.end()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_object_insert_and_get() {
        let mut obj = ObjectValue::new("Order");
        obj.insert("id", Value::Int(7));
        assert_eq!(obj.get("id"), Some(&Value::Int(7)));
        assert_eq!(obj.get("missing"), None);

        obj.insert("id", Value::Int(9));
        assert_eq!(obj.get("id"), Some(&Value::Int(9)));
        assert_eq!(obj.len(), 1);
    }

    #[test]
    fn test_object_set_requires_existing_slot() {
        let mut obj = ObjectValue::new("Order").with_field("id", 1i64);
        assert!(obj.set("id", Value::Int(2)).is_ok());

        let err = obj.set("nope", Value::Int(3)).unwrap_err();
        assert!(matches!(err, Error::FieldAccess { ref field, .. } if field == "nope"));
    }

    #[test]
    fn test_lazy_flags() {
        assert!(CollectionValue::list(vec![]).is_loaded());
        assert!(CollectionValue::lazy_loaded(vec![]).is_loaded());

        let proxy = CollectionValue::lazy_unloaded(vec![Value::Int(1)]);
        assert!(proxy.is_lazy());
        assert!(!proxy.is_loaded());
        assert_eq!(proxy.len(), 1);
    }

    #[test]
    fn test_push_unique_deduplicates() {
        let mut set = CollectionValue::empty(CollectionKind::Set);
        set.push_unique(Value::Str("a".into()));
        set.push_unique(Value::Str("b".into()));
        set.push_unique(Value::Str("a".into()));
        assert_eq!(set.len(), 2);
    }

    #[test]
    fn test_priority_cmp_scalars() {
        assert_eq!(priority_cmp(&Value::Int(1), &Value::Int(2)), Ordering::Less);
        assert_eq!(
            priority_cmp(&Value::Str("b".into()), &Value::Str("a".into())),
            Ordering::Greater
        );
        // Mixed variants order by rank
        assert_eq!(
            priority_cmp(&Value::Int(100), &Value::Str("a".into())),
            Ordering::Less
        );
    }

    #[test]
    fn test_priority_cmp_objects_field_wise() {
        let a = Value::Object(ObjectValue::new("Line").with_field("sku", "A"));
        let b = Value::Object(ObjectValue::new("Line").with_field("sku", "B"));
        assert_eq!(priority_cmp(&a, &b), Ordering::Less);
        assert_eq!(priority_cmp(&a, &a), Ordering::Equal);
    }

    #[test]
    fn test_serialize_to_json() {
        let value = Value::Object(
            ObjectValue::new("Order")
                .with_field("id", 7i64)
                .with_field("note", Value::Null)
                .with_field(
                    "items",
                    Value::Collection(CollectionValue::list(vec![Value::Object(
                        ObjectValue::new("Line").with_field("sku", "A"),
                    )])),
                ),
        );
        assert_eq!(
            value.to_json(),
            json!({"id": 7, "note": null, "items": [{"sku": "A"}]})
        );
    }
}
