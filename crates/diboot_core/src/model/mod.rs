//! Domain model for framework-managed entities.
//!
//! # Responsibility
//! - Define canonical data structures used by core business logic.
//! - Keep storage mapping out of the model (see `repo::table`).
//!
//! # Invariants
//! - Every persisted entity is identified by a store-assigned `EntityId`.
//! - Deletion is represented by soft-delete tombstones, not hard delete.

pub mod dictionary;
pub mod entity;
pub mod key_value;
