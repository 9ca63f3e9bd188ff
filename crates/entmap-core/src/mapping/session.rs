//! Per-invocation mapping state
//!
//! The context token is session state, not engine state: it travels inside
//! [`MappingSession`] through every recursive call, so one invoker can serve
//! interleaved mappings without any shared mutable token.

use super::skips::SkipTracker;
use crate::probe::MaterializationProbe;
use crate::schema::{ContextToken, FieldDescriptor, TypeRegistry};

/// Transient state for one top-level mapping invocation
pub(crate) struct MappingSession<'a> {
    pub(crate) token: ContextToken,
    pub(crate) registry: &'a TypeRegistry,
    pub(crate) probe: &'a dyn MaterializationProbe,
    pub(crate) skips: SkipTracker,
}

impl<'a> MappingSession<'a> {
    pub(crate) fn new(
        token: ContextToken,
        registry: &'a TypeRegistry,
        probe: &'a dyn MaterializationProbe,
    ) -> Self {
        Self {
            token,
            registry,
            probe,
            skips: SkipTracker::new(),
        }
    }
}

/// Source fields with per-slot claimed markers
///
/// Each source field can be matched at most once per field-mapping pass;
/// claiming marks the slot instead of removing it, so iteration order stays
/// the declared order and duplicate names resolve to the first unclaimed
/// candidate.
pub(crate) struct SourceFieldList<'a> {
    slots: Vec<(&'a FieldDescriptor, bool)>,
}

impl<'a> SourceFieldList<'a> {
    pub(crate) fn new(fields: Vec<&'a FieldDescriptor>) -> Self {
        Self {
            slots: fields.into_iter().map(|field| (field, false)).collect(),
        }
    }

    /// Claim the first unclaimed field with the given name
    pub(crate) fn claim(&mut self, name: &str) -> Option<&'a FieldDescriptor> {
        for (field, claimed) in &mut self.slots {
            if !*claimed && field.name() == name {
                *claimed = true;
                return Some(field);
            }
        }
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::FieldType;

    #[test]
    fn test_claim_is_one_shot() {
        let id = FieldDescriptor::new("id", FieldType::Int);
        let sku = FieldDescriptor::new("sku", FieldType::Str);
        let mut list = SourceFieldList::new(vec![&id, &sku]);

        assert!(list.claim("id").is_some());
        assert!(list.claim("id").is_none());
        assert!(list.claim("sku").is_some());
        assert!(list.claim("missing").is_none());
    }

    #[test]
    fn test_duplicate_names_resolve_in_order() {
        let first = FieldDescriptor::new("id", FieldType::Int);
        let second = FieldDescriptor::new("id", FieldType::Str);
        let mut list = SourceFieldList::new(vec![&first, &second]);

        let claimed = list.claim("id").unwrap();
        assert_eq!(claimed.field_type(), &FieldType::Int);
        let claimed = list.claim("id").unwrap();
        assert_eq!(claimed.field_type(), &FieldType::Str);
        assert!(list.claim("id").is_none());
    }
}
