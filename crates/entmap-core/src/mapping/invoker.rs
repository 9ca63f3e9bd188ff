//! Entry point for mapping an entity graph into a DTO graph

use super::engine;
use super::session::{MappingSession, SourceFieldList};
use super::{MappingMetadata, MappingOutcome};
use crate::error::{Error, Result};
use crate::probe::{FlagProbe, MaterializationProbe};
use crate::schema::{ContextToken, TypeRegistry};
use crate::value::Value;
use std::time::Instant;
use tracing::debug;

static DEFAULT_PROBE: FlagProbe = FlagProbe;

/// Maps a source instance into a freshly constructed target instance
///
/// The invoker borrows the type registry and the persistence layer's
/// materialization probe; it holds no per-invocation state, so one invoker
/// can serve any number of mappings, interleaved or not.
pub struct MappingInvoker<'a> {
    registry: &'a TypeRegistry,
    probe: &'a dyn MaterializationProbe,
}

impl<'a> MappingInvoker<'a> {
    /// An invoker using the default flag-reading probe
    pub fn new(registry: &'a TypeRegistry) -> Self {
        Self {
            registry,
            probe: &DEFAULT_PROBE,
        }
    }

    /// An invoker asking the given probe whether lazy collections are loaded
    pub fn with_probe(registry: &'a TypeRegistry, probe: &'a dyn MaterializationProbe) -> Self {
        Self { registry, probe }
    }

    /// Map `source` into a new instance of `target_type` under `token`
    ///
    /// The target is always freshly constructed; an existing target is never
    /// mutated. On any error the whole mapping aborts and no target is
    /// returned.
    pub fn map(&self, source: &Value, target_type: &str, token: &ContextToken) -> Result<Value> {
        self.map_with_report(source, target_type, token)
            .map(|outcome| outcome.target)
    }

    /// Like [`map`](Self::map), but also returns the skip report and mapping
    /// metadata
    pub fn map_with_report(
        &self,
        source: &Value,
        target_type: &str,
        token: &ContextToken,
    ) -> Result<MappingOutcome> {
        let started = Instant::now();
        let Value::Object(source_object) = source else {
            return Err(Error::Validation {
                field: "source".to_string(),
                message: "source value must be a structural object".to_string(),
            });
        };
        debug!(
            source_type = source_object.type_name(),
            target_type,
            context = %token,
            "mapping entity to DTO"
        );

        let mut target = self.registry.new_instance(target_type)?;
        let target_fields = self.registry.effective_fields(target_type)?;
        let mut source_fields =
            SourceFieldList::new(self.registry.effective_fields(source_object.type_name())?);

        let mut session = MappingSession::new(token.clone(), self.registry, self.probe);
        engine::map_fields(
            &mut session,
            source_object,
            &mut source_fields,
            &mut target,
            &target_fields,
            "",
        )?;

        let metadata = MappingMetadata {
            source_type: source_object.type_name().to_string(),
            target_type: target_type.to_string(),
            context: token.name().to_string(),
            timestamp: chrono::Utc::now().to_rfc3339(),
            duration_ms: started.elapsed().as_millis() as u64,
        };
        Ok(MappingOutcome {
            target: Value::Object(target),
            skips: session.skips.build_report(),
            metadata,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::{FieldDescriptor, FieldType, MappingDirective, TypeDescriptor};
    use crate::value::ObjectValue;

    fn registry() -> TypeRegistry {
        let mut registry = TypeRegistry::new();
        registry.register(TypeDescriptor::new("Order").field(FieldDescriptor::new("id", FieldType::Int)));
        registry.register(
            TypeDescriptor::new("OrderDTO").mapping_target().field(
                FieldDescriptor::new("id", FieldType::Int)
                    .with_directive(MappingDirective::new([ContextToken::new("SUMMARY")])),
            ),
        );
        registry
    }

    #[test]
    fn test_non_object_source_rejected() {
        let registry = registry();
        let invoker = MappingInvoker::new(&registry);
        let err = invoker
            .map(&Value::Int(1), "OrderDTO", &ContextToken::new("SUMMARY"))
            .unwrap_err();
        assert!(matches!(err, Error::Validation { ref field, .. } if field == "source"));
    }

    #[test]
    fn test_metadata_describes_invocation() {
        let registry = registry();
        let invoker = MappingInvoker::new(&registry);
        let source = Value::Object(ObjectValue::new("Order").with_field("id", 7i64));

        let outcome = invoker
            .map_with_report(&source, "OrderDTO", &ContextToken::new("SUMMARY"))
            .unwrap();
        assert_eq!(outcome.metadata.source_type, "Order");
        assert_eq!(outcome.metadata.target_type, "OrderDTO");
        assert_eq!(outcome.metadata.context, "SUMMARY");
        assert!(!outcome.metadata.timestamp.is_empty());
        assert!(outcome.skips.is_clean());
    }

    #[test]
    fn test_invoker_is_reusable_across_contexts() {
        let registry = registry();
        let invoker = MappingInvoker::new(&registry);
        let source = Value::Object(ObjectValue::new("Order").with_field("id", 7i64));

        let summary = invoker
            .map(&source, "OrderDTO", &ContextToken::new("SUMMARY"))
            .unwrap();
        let detail = invoker
            .map(&source, "OrderDTO", &ContextToken::new("DETAIL"))
            .unwrap();

        assert_eq!(summary.as_object().unwrap().get("id"), Some(&Value::Int(7)));
        // DETAIL is not listed by the directive; the field stays at zero
        assert_eq!(detail.as_object().unwrap().get("id"), Some(&Value::Int(0)));
    }
}
