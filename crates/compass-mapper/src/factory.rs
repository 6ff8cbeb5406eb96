//! Mapper construction by ID

use crate::mapper::{Mapper, MapperId};
use crate::plugins::basic::BasicMapper;

/// Build an empty mapper for the given ID
///
/// Every ID currently yields a [`BasicMapper`] registered under that ID,
/// so the mapper's plugin name always matches the key it was built for.
pub fn mapper_by_id(id: &MapperId) -> Box<dyn Mapper> {
    Box::new(BasicMapper::with_id(id.clone()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mapper_by_id_keeps_id() {
        for id in ["opa", "kyverno", "basic"] {
            let mapper = mapper_by_id(&MapperId::from(id));
            assert_eq!(mapper.plugin_name().as_str(), id);
            assert!(mapper.plans().is_empty());
        }
    }
}
