//! # Skirmish Common
//!
//! Common types, utilities, and shared abstractions for Skirmish.
//!
//! This crate provides foundational types used across all Skirmish crates:
//! - ID types (EntityId)
//! - Planar vector math on top of `glam`
//! - Common error types
//! - Prelude for convenient imports

#![warn(missing_docs)]
#![warn(clippy::all)]
#![deny(clippy::unwrap_used)]

pub mod error;
pub mod ids;
pub mod math;

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::error::*;
    pub use crate::ids::*;
    pub use crate::math::*;
}

pub use prelude::*;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_entity_id_generation() {
        let id1 = EntityId::new();
        let id2 = EntityId::new();
        assert_ne!(id1, id2);
        assert!(id1.is_valid());
        assert!(!EntityId::NULL.is_valid());
        assert_eq!(EntityId::NULL.to_string(), "#0");
        assert!(id1 < id2);
    }

    #[test]
    fn test_store_error_converts() {
        let err: SkirmishError = StoreError::InvalidKey("../x".to_string()).into();
        assert!(matches!(err, SkirmishError::Storage(_)));
        assert_eq!(err.to_string(), "Storage error: invalid store key: ../x");
    }

    #[test]
    fn test_direction_is_unit_length() {
        let dir = direction(Vec2::new(0.0, 0.0), Vec2::new(3.0, 4.0));
        assert!(approx_eq(dir.length(), 1.0));
        assert!(approx_eq(dir.x, 0.6));
        assert!(approx_eq(dir.y, 0.8));
    }
}
