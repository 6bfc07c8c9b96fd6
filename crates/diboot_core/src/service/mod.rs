//! Core use-case services.
//!
//! # Responsibility
//! - Orchestrate repository calls into use-case level APIs.
//! - Map persistence failures into service errors and response statuses.

pub mod base_service;
pub mod dictionary_service;
pub mod error;
