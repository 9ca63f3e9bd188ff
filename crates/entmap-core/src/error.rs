//! Error types for the entmap core library
//!
//! This module defines the error handling system for entmap, using thiserror
//! for ergonomic error definitions. Every error here is fatal to the mapping
//! that raised it: the full recursive call stack unwinds and the caller never
//! receives a partially filled target.

use thiserror::Error;

/// Main error type for mapping operations
#[derive(Error, Debug)]
pub enum Error {
    /// A target or nested-element type cannot be constructed
    #[error("cannot create new instance of type '{type_name}'")]
    InstanceCreation { type_name: String },

    /// A type is registered but declares no zero-argument initializer
    #[error("type '{type_name}' has no default constructor without any parameters")]
    MissingDefaultConstructor { type_name: String },

    /// Internal-invariant guard for the collection path; the empty-collection
    /// short-circuit makes this effectively unreachable
    #[error("collection is empty")]
    EmptyCollection,

    /// A declared field could not be read from or written to an instance
    #[error("field '{field}' is not accessible on type '{type_name}'")]
    FieldAccess { type_name: String, field: String },

    /// Malformed inputs to the mapping entry point
    #[error("validation error: {field} - {message}")]
    Validation { field: String, message: String },
}

/// Convenience type alias for Results using our Error type
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_instance_creation_display() {
        let err = Error::InstanceCreation {
            type_name: "OrderDTO".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "cannot create new instance of type 'OrderDTO'"
        );
    }

    #[test]
    fn test_missing_default_constructor_display() {
        let err = Error::MissingDefaultConstructor {
            type_name: "AuditDTO".to_string(),
        };
        assert!(err.to_string().contains("no default constructor"));
    }

    #[test]
    fn test_field_access_display() {
        let err = Error::FieldAccess {
            type_name: "Order".to_string(),
            field: "id".to_string(),
        };
        assert_eq!(err.to_string(), "field 'id' is not accessible on type 'Order'");
    }

    #[test]
    fn test_validation_display() {
        let err = Error::Validation {
            field: "source".to_string(),
            message: "must be an object".to_string(),
        };
        assert!(err.to_string().contains("source"));
        assert!(err.to_string().contains("must be an object"));
    }
}
