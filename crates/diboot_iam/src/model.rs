//! IAM entities and view objects.
//!
//! # Invariants
//! - `role_id` and `permission_id` are positive on every written row.
//! - Reads only return active rows, so loaded entities carry
//!   `is_deleted == false`.

use diboot_core::repo::table::{TableEntity, CREATE_TIME_COLUMN};
use diboot_core::{Entity, EntityId, RepoError, RepoResult};
use rusqlite::types::Value;
use rusqlite::Row;
use serde::{Deserialize, Serialize};
use std::ops::{Deref, DerefMut};

/// Grant of one permission to one role.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IamRolePermission {
    pub id: Option<EntityId>,
    pub role_id: EntityId,
    pub permission_id: EntityId,
    #[serde(default)]
    pub is_deleted: bool,
    pub create_time: Option<i64>,
}

impl IamRolePermission {
    pub fn new(role_id: EntityId, permission_id: EntityId) -> Self {
        Self {
            id: None,
            role_id,
            permission_id,
            is_deleted: false,
            create_time: None,
        }
    }
}

impl Entity for IamRolePermission {
    fn id(&self) -> Option<EntityId> {
        self.id
    }

    fn set_id(&mut self, id: EntityId) {
        self.id = Some(id);
    }
}

impl TableEntity for IamRolePermission {
    const TABLE: &'static str = "iam_role_permission";
    const COLUMNS: &'static [&'static str] = &["role_id", "permission_id"];

    fn column_values(&self) -> Vec<Value> {
        vec![
            Value::Integer(self.role_id),
            Value::Integer(self.permission_id),
        ]
    }

    fn from_row(row: &Row<'_>) -> RepoResult<Self> {
        Ok(Self {
            id: Some(row.get("id")?),
            role_id: row.get("role_id")?,
            permission_id: row.get("permission_id")?,
            is_deleted: false,
            create_time: row.get(CREATE_TIME_COLUMN)?,
        })
    }

    fn validate_for_write(&self) -> RepoResult<()> {
        if self.role_id <= 0 {
            return Err(RepoError::validation(format!(
                "role id must be positive, got {}",
                self.role_id
            )));
        }
        if self.permission_id <= 0 {
            return Err(RepoError::validation(format!(
                "permission id must be positive, got {}",
                self.permission_id
            )));
        }
        Ok(())
    }
}

/// View object over `IamRolePermission`. Serializes exactly like the entity.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IamRolePermissionVo {
    #[serde(flatten)]
    pub entity: IamRolePermission,
}

impl From<IamRolePermission> for IamRolePermissionVo {
    fn from(entity: IamRolePermission) -> Self {
        Self { entity }
    }
}

impl From<IamRolePermissionVo> for IamRolePermission {
    fn from(vo: IamRolePermissionVo) -> Self {
        vo.entity
    }
}

impl Deref for IamRolePermissionVo {
    type Target = IamRolePermission;

    fn deref(&self) -> &Self::Target {
        &self.entity
    }
}

impl DerefMut for IamRolePermissionVo {
    fn deref_mut(&mut self) -> &mut Self::Target {
        &mut self.entity
    }
}

#[cfg(test)]
mod tests {
    use super::{IamRolePermission, IamRolePermissionVo};
    use diboot_core::TableEntity;

    #[test]
    fn vo_serializes_like_the_entity() {
        let mut entity = IamRolePermission::new(3, 11);
        entity.id = Some(1);
        let vo = IamRolePermissionVo::from(entity.clone());

        let entity_json = serde_json::to_value(&entity).expect("entity should serialize");
        let vo_json = serde_json::to_value(&vo).expect("vo should serialize");
        assert_eq!(entity_json, vo_json);
        assert_eq!(vo_json["roleId"], 3);
        assert_eq!(vo.permission_id, 11);
    }

    #[test]
    fn write_validation_rejects_non_positive_ids() {
        assert!(IamRolePermission::new(0, 1).validate_for_write().is_err());
        assert!(IamRolePermission::new(1, -2).validate_for_write().is_err());
        assert!(IamRolePermission::new(1, 2).validate_for_write().is_ok());
    }
}
