//! entmap-core - declarative entity-to-DTO object graph mapping
//!
//! This crate copies data from a source object graph (a persistence-layer
//! entity, possibly with lazily-loaded collections) into a freshly
//! constructed target graph (a plain DTO), driven by per-field mapping
//! directives instead of hand-written copying code.
//!
//! # Main Components
//!
//! - **Value model**: a closed dynamic representation of object graphs,
//!   including lazy persistence-proxy collections
//! - **Descriptor registry**: registration-time type and field descriptors
//!   carrying mapping directives and the nested-mapping marker
//! - **Mapping engine**: context-gated, recursion-capable field copying with
//!   an observable skip report
//!
//! # Example
//!
//! ```
//! use entmap_core::{
//!     map, ContextToken, FieldDescriptor, FieldType, MappingDirective, ObjectValue,
//!     TypeDescriptor, TypeRegistry, Value,
//! };
//!
//! # fn example() -> entmap_core::Result<()> {
//! let summary = ContextToken::new("SUMMARY");
//!
//! let mut registry = TypeRegistry::new();
//! registry.register(
//!     TypeDescriptor::new("Order").field(FieldDescriptor::new("id", FieldType::Int)),
//! );
//! registry.register(
//!     TypeDescriptor::new("OrderDTO").mapping_target().field(
//!         FieldDescriptor::new("id", FieldType::Int)
//!             .with_directive(MappingDirective::new([summary.clone()])),
//!     ),
//! );
//!
//! let order = Value::Object(ObjectValue::new("Order").with_field("id", 7i64));
//! let dto = map(&registry, &order, "OrderDTO", &summary)?;
//! assert_eq!(dto.as_object().unwrap().get("id"), Some(&Value::Int(7)));
//! # Ok(())
//! # }
//! # example().unwrap();
//! ```

pub mod error;
pub mod mapping;
pub mod probe;
pub mod schema;
pub mod value;

pub use error::{Error, Result};
pub use mapping::{
    map, MappingInvoker, MappingMetadata, MappingOutcome, SkipItem, SkipReason, SkipReport,
    SkipSummary,
};
pub use probe::{FlagProbe, MaterializationProbe};
pub use schema::{
    ContextToken, FieldDescriptor, FieldType, MappingDirective, TypeDescriptor, TypeRegistry,
};
pub use value::{priority_cmp, CollectionKind, CollectionValue, ObjectValue, Value};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_library_version() {
        assert!(!VERSION.is_empty());
    }

    #[test]
    fn test_error_display() {
        let err = Error::InstanceCreation {
            type_name: "Ghost".to_string(),
        };
        assert!(err.to_string().contains("Ghost"));
    }
}
