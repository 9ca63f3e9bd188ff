//! The transformation engine
//!
//! For each target field, in declared order: resolve the matching source
//! field (own name or explicit binding, first unclaimed candidate), gate on
//! the session's context token, read the source value, and either copy it
//! directly or recurse into nested mapped objects and collections of mapped
//! objects. Matching claims the source field before the gate runs, so a
//! gated-out target field still consumes its match.

use super::session::{MappingSession, SourceFieldList};
use crate::error::{Error, Result};
use crate::schema::{FieldDescriptor, FieldType};
use crate::value::{CollectionKind, CollectionValue, ObjectValue, Value};
use tracing::{debug, trace};

/// Copy every mappable target field from `source` onto `target`
pub(crate) fn map_fields(
    session: &mut MappingSession<'_>,
    source: &ObjectValue,
    source_fields: &mut SourceFieldList<'_>,
    target: &mut ObjectValue,
    target_fields: &[&FieldDescriptor],
    path: &str,
) -> Result<()> {
    for field in target_fields {
        handle_target_field(session, source, source_fields, target, field, path)?;
    }
    Ok(())
}

fn handle_target_field(
    session: &mut MappingSession<'_>,
    source: &ObjectValue,
    source_fields: &mut SourceFieldList<'_>,
    target: &mut ObjectValue,
    field: &FieldDescriptor,
    path: &str,
) -> Result<()> {
    let field_path = join_path(path, field.name());
    let resolved_name = field.resolved_source_name();

    let Some(matched) = source_fields.claim(resolved_name) else {
        trace!(field = %field_path, source_name = resolved_name, "no source field match");
        session.skips.add_no_source_match(&field_path, resolved_name);
        return Ok(());
    };
    debug!(field = %field_path, source_field = matched.name(), "matched source field");

    let Some(directive) = field.directive() else {
        trace!(field = %field_path, "target field has no mapping directive");
        session.skips.add_no_directive(&field_path);
        return Ok(());
    };
    if !directive.applies_to(&session.token) {
        trace!(field = %field_path, context = %session.token, "directive excludes context");
        session.skips.add_context_gated(&field_path, &session.token);
        return Ok(());
    }

    let value = source.get(matched.name()).ok_or_else(|| Error::FieldAccess {
        type_name: source.type_name().to_string(),
        field: matched.name().to_string(),
    })?;
    if value.is_null() {
        trace!(field = %field_path, "source value is null");
        session.skips.add_null_source(&field_path, matched.name());
        return Ok(());
    }

    let nested = field
        .field_type()
        .nested_type_name()
        .map(|name| session.registry.is_mapping_target(name))
        .unwrap_or(false);
    let mapped = if nested {
        debug!(field = %field_path, "field targets a nested mapping destination");
        map_nested_value(session, value, field, &field_path)?
    } else {
        value.clone()
    };

    target.set(field.name(), mapped)
}

/// Produce the transformed value for a nested-mapped target field
///
/// The source value is classified at runtime: a collection shape takes the
/// collection path, anything else is mapped as a single structural object.
fn map_nested_value(
    session: &mut MappingSession<'_>,
    value: &Value,
    field: &FieldDescriptor,
    path: &str,
) -> Result<Value> {
    match value {
        Value::Collection(collection) => map_collection(session, collection, field, path),
        _ => map_single_object(session, value, field, path),
    }
}

fn map_single_object(
    session: &mut MappingSession<'_>,
    value: &Value,
    field: &FieldDescriptor,
    path: &str,
) -> Result<Value> {
    let Value::Object(source) = value else {
        return Err(Error::Validation {
            field: path.to_string(),
            message: "nested field value is not a structural object".to_string(),
        });
    };
    let target_type = match field.field_type() {
        FieldType::Object(name) => name.as_str(),
        // A single value cannot populate a declared container
        other => {
            return Err(Error::InstanceCreation {
                type_name: other.to_string(),
            })
        }
    };

    let registry = session.registry;
    let mut source_fields = SourceFieldList::new(registry.effective_fields(source.type_name())?);
    let target_fields = registry.effective_fields(target_type)?;
    let mut instance = registry.new_instance(target_type)?;
    map_fields(
        session,
        source,
        &mut source_fields,
        &mut instance,
        &target_fields,
        path,
    )?;
    Ok(Value::Object(instance))
}

fn map_collection(
    session: &mut MappingSession<'_>,
    collection: &CollectionValue,
    field: &FieldDescriptor,
    path: &str,
) -> Result<Value> {
    // The output category comes from the target field's declared container
    let kind = field
        .field_type()
        .collection_kind()
        .ok_or_else(|| Error::InstanceCreation {
            type_name: field.field_type().to_string(),
        })?;

    // Never force materialization, never iterate an unloaded proxy
    if !session.probe.is_materialized(collection) {
        debug!(field = %path, "lazy collection not materialized, producing empty output");
        session.skips.add_lazy_uninitialized(path);
        return Ok(Value::Collection(CollectionValue::empty(kind)));
    }
    if collection.is_empty() {
        return Ok(Value::Collection(CollectionValue::empty(kind)));
    }

    let element_type = match field.field_type() {
        FieldType::Collection { element, .. } => match element.as_ref() {
            FieldType::Object(name) => name.as_str(),
            other => {
                return Err(Error::InstanceCreation {
                    type_name: other.to_string(),
                })
            }
        },
        other => {
            return Err(Error::InstanceCreation {
                type_name: other.to_string(),
            })
        }
    };

    // Source fields come from the first element's type; the collection is
    // assumed type-homogeneous. The empty guard above makes this unreachable.
    let first = collection.elements().first().ok_or(Error::EmptyCollection)?;
    let Value::Object(first_object) = first else {
        return Err(Error::Validation {
            field: path.to_string(),
            message: "collection elements are not structural objects".to_string(),
        });
    };

    let registry = session.registry;
    let element_source_fields = registry.effective_fields(first_object.type_name())?;
    let element_target_fields = registry.effective_fields(element_type)?;

    let mut output = CollectionValue::empty(kind);
    for (index, element) in collection.elements().iter().enumerate() {
        let element_path = format!("{path}[{index}]");
        let Value::Object(element_object) = element else {
            return Err(Error::Validation {
                field: element_path,
                message: "collection elements are not structural objects".to_string(),
            });
        };
        let mut source_fields = SourceFieldList::new(element_source_fields.clone());
        let mut instance = registry.new_instance(element_type)?;
        map_fields(
            session,
            element_object,
            &mut source_fields,
            &mut instance,
            &element_target_fields,
            &element_path,
        )?;
        match kind {
            CollectionKind::Set => output.push_unique(Value::Object(instance)),
            _ => output.push(Value::Object(instance)),
        }
    }
    if kind == CollectionKind::PriorityQueue {
        output.sort_by_priority();
    }
    Ok(Value::Collection(output))
}

fn join_path(path: &str, name: &str) -> String {
    if path.is_empty() {
        name.to_string()
    } else {
        format!("{path}.{name}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::probe::FlagProbe;
    use crate::schema::{ContextToken, MappingDirective, TypeDescriptor, TypeRegistry};

    static PROBE: FlagProbe = FlagProbe;

    fn registry() -> TypeRegistry {
        let mut registry = TypeRegistry::new();
        registry.register(
            TypeDescriptor::new("Line").field(FieldDescriptor::new("sku", FieldType::Str)),
        );
        registry.register(
            TypeDescriptor::new("LineDTO").mapping_target().field(
                FieldDescriptor::new("sku", FieldType::Str)
                    .with_directive(MappingDirective::new([ContextToken::new("SUMMARY")])),
            ),
        );
        registry
    }

    fn session(registry: &TypeRegistry) -> MappingSession<'_> {
        MappingSession::new(ContextToken::new("SUMMARY"), registry, &PROBE)
    }

    #[test]
    fn test_join_path() {
        assert_eq!(join_path("", "id"), "id");
        assert_eq!(join_path("order", "id"), "order.id");
    }

    #[test]
    fn test_single_value_into_declared_container_fails() {
        let registry = registry();
        let mut session = session(&registry);
        let field = FieldDescriptor::new("items", FieldType::list_of("LineDTO"));
        let value = Value::Object(ObjectValue::new("Line").with_field("sku", "A"));

        let err = map_single_object(&mut session, &value, &field, "items").unwrap_err();
        assert!(matches!(err, Error::InstanceCreation { .. }));
    }

    #[test]
    fn test_collection_into_declared_object_fails() {
        let registry = registry();
        let mut session = session(&registry);
        let field = FieldDescriptor::new("line", FieldType::object("LineDTO"));
        let collection = CollectionValue::list(vec![]);

        let err = map_collection(&mut session, &collection, &field, "line").unwrap_err();
        assert!(matches!(err, Error::InstanceCreation { .. }));
    }

    #[test]
    fn test_non_object_elements_fail() {
        let registry = registry();
        let mut session = session(&registry);
        let field = FieldDescriptor::new("items", FieldType::list_of("LineDTO"));
        let collection = CollectionValue::list(vec![Value::Int(1)]);

        let err = map_collection(&mut session, &collection, &field, "items").unwrap_err();
        assert!(matches!(err, Error::Validation { .. }));
    }

    #[test]
    fn test_non_object_nested_value_fails() {
        let registry = registry();
        let mut session = session(&registry);
        let field = FieldDescriptor::new("line", FieldType::object("LineDTO"));

        let err = map_single_object(&mut session, &Value::Int(3), &field, "line").unwrap_err();
        assert!(matches!(err, Error::Validation { .. }));
    }
}
