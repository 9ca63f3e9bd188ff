//! Lazy-collection materialization probe
//!
//! The persistence layer supplies the one capability the engine needs from
//! it: "has this lazily-loaded collection been populated?". The engine only
//! ever asks; it never calls anything that would force a load.

use crate::value::CollectionValue;

/// Read-only probe against the originating persistence layer
pub trait MaterializationProbe {
    fn is_materialized(&self, collection: &CollectionValue) -> bool;
}

/// Default probe that reads the proxy flag carried on the collection value
#[derive(Debug, Default, Clone, Copy)]
pub struct FlagProbe;

impl MaterializationProbe for FlagProbe {
    fn is_materialized(&self, collection: &CollectionValue) -> bool {
        collection.is_loaded()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::value::Value;

    #[test]
    fn test_flag_probe() {
        let probe = FlagProbe;
        assert!(probe.is_materialized(&CollectionValue::list(vec![Value::Int(1)])));
        assert!(probe.is_materialized(&CollectionValue::lazy_loaded(vec![])));
        assert!(!probe.is_materialized(&CollectionValue::lazy_unloaded(vec![Value::Int(1)])));
    }
}
