//! Repository layer abstractions and persistence implementations.
//!
//! # Responsibility
//! - Define use-case oriented data access contracts.
//! - Isolate SQLite query details from service orchestration.
//!
//! # Invariants
//! - Repository writes validate entities before persistence.
//! - Repository APIs return semantic errors (`NotFound`, `UnknownColumn`,
//!   `RelatedEntityNotOwned`) in addition to DB transport errors.

pub mod crud_repo;
pub mod dictionary_repo;
pub mod error;
pub mod query;
pub mod relation;
pub mod table;
