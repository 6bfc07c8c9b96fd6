//! IAM use-case services.

pub mod base_iam_service;
pub mod role_permission_service;
