//! IAM base layer for diboot.
//! Role/permission association entity and the services built on the core
//! CRUD layer.

pub mod model;
pub mod repo;
pub mod service;

pub use model::{IamRolePermission, IamRolePermissionVo};
pub use repo::{RolePermissionRepository, SqliteRolePermissionRepository};
pub use service::base_iam_service::BaseIamService;
pub use service::role_permission_service::IamRolePermissionService;
