//! # Skirmish Common
//!
//! Common types shared by the Skirmish combat core and its runner:
//! - ID types (EntityId, CheckpointId)
//! - 2D positions and facing
//! - Actor tags and collision layer masks
//! - Common error types
//! - Prelude for convenient imports

#![warn(missing_docs)]
#![warn(clippy::all)]
#![deny(clippy::unwrap_used)]

pub mod coords;
pub mod error;
pub mod ids;
pub mod tags;

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::coords::*;
    pub use crate::error::*;
    pub use crate::ids::*;
    pub use crate::tags::*;
}

pub use prelude::*;

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_entity_id_generation() {
        let id1 = EntityId::new();
        let id2 = EntityId::new();
        assert_ne!(id1, id2);
        assert!(id1 < id2);
        assert!(!EntityId::NULL.is_valid());
    }

    #[test]
    fn test_tag_layers_are_hostile_to_each_other() {
        assert!(ActorTag::Player
            .hostile_layers()
            .intersects(ActorTag::Enemy.layer()));
        assert!(!ActorTag::Enemy
            .hostile_layers()
            .intersects(ActorTag::Enemy.layer()));
        assert!(LayerMask::NONE.is_empty());
    }

    #[test]
    fn test_missing_dependency_is_not_fatal() {
        let err = SkirmishError::missing(EntityId::from_raw(3), "target");
        assert!(!err.is_fatal());
        assert!(SkirmishError::invalid("health.max", "must be positive").is_fatal());
        assert_eq!(err.to_string(), "missing dependency for #3: target");
    }

    proptest! {
        #[test]
        fn prop_layer_union_contains_both(a in 0u32..64, b in 0u32..64) {
            let ma = LayerMask::from_bits(1 << (a % 32));
            let mb = LayerMask::from_bits(1 << (b % 32));
            let union = ma | mb;
            prop_assert!(union.intersects(ma));
            prop_assert!(union.intersects(mb));
        }
    }
}
