//! Serialization-facing view objects: response envelopes and paging metadata.

pub mod json_result;
pub mod pagination;
