//! Role/permission grant management.
//!
//! # Invariants
//! - Role and permission ids are positive; checked before any write.
//! - Each operation commits all of its row changes or none.

use crate::model::IamRolePermission;
use crate::repo::RolePermissionRepository;
use crate::service::base_iam_service::BaseIamService;
use diboot_core::{
    CrudRepository, EntityId, EntityQuery, RelationWriteSummary, ServiceError, ServiceResult,
};
use log::{info, warn};
use std::collections::BTreeSet;

pub struct IamRolePermissionService<R> {
    base: BaseIamService<IamRolePermission, R>,
}

impl<R> IamRolePermissionService<R>
where
    R: CrudRepository<IamRolePermission> + RolePermissionRepository,
{
    pub fn new(repo: R) -> Self {
        Self {
            base: BaseIamService::new(repo),
        }
    }

    /// Generic CRUD over grant rows.
    pub fn base(&self) -> &BaseIamService<IamRolePermission, R> {
        &self.base
    }

    /// Active permission ids granted to `role_id`, ascending.
    pub fn get_permission_ids(&self, role_id: EntityId) -> ServiceResult<Vec<EntityId>> {
        Ok(self.base.repo().list_permission_ids(role_id)?)
    }

    /// Grants every permission in `permission_ids` to `role_id`.
    /// Returns the number of new grants.
    pub fn create_role_permission_relations(
        &self,
        role_id: EntityId,
        permission_ids: &[EntityId],
    ) -> ServiceResult<usize> {
        validate_ids(role_id, permission_ids)?;
        let summary = self
            .base
            .repo()
            .apply_permission_diff(role_id, permission_ids, &[])
            .map_err(|err| log_failure("role_permission_create", role_id, err.into()))?;
        info!(
            "event=role_permission_create module=iam status=ok role_id={role_id} inserted={}",
            summary.inserted
        );
        Ok(summary.inserted)
    }

    /// Makes the grants of `role_id` equal `permission_ids`.
    ///
    /// An empty list revokes everything.
    pub fn update_role_permission_relations(
        &self,
        role_id: EntityId,
        permission_ids: &[EntityId],
    ) -> ServiceResult<RelationWriteSummary> {
        validate_ids(role_id, permission_ids)?;
        let target: BTreeSet<EntityId> = permission_ids.iter().copied().collect();
        let revoke: Vec<EntityId> = self
            .get_permission_ids(role_id)?
            .into_iter()
            .filter(|id| !target.contains(id))
            .collect();
        let grant: Vec<EntityId> = target.into_iter().collect();

        let summary = self
            .base
            .repo()
            .apply_permission_diff(role_id, &grant, &revoke)
            .map_err(|err| log_failure("role_permission_update", role_id, err.into()))?;
        info!(
            "event=role_permission_update module=iam status=ok role_id={role_id} inserted={} deleted={}",
            summary.inserted, summary.deleted
        );
        Ok(summary)
    }

    /// Revokes every grant of `role_id`. Returns the number revoked.
    pub fn delete_role_permission_relations(&self, role_id: EntityId) -> ServiceResult<usize> {
        let deleted = self
            .base
            .delete_entities(&EntityQuery::new().eq("role_id", role_id))?;
        info!("event=role_permission_delete module=iam status=ok role_id={role_id} deleted={deleted}");
        Ok(deleted)
    }
}

fn validate_ids(role_id: EntityId, permission_ids: &[EntityId]) -> ServiceResult<()> {
    if role_id <= 0 {
        return Err(ServiceError::Validation(format!(
            "role id must be positive, got {role_id}"
        )));
    }
    if let Some(bad) = permission_ids.iter().find(|id| **id <= 0) {
        return Err(ServiceError::Validation(format!(
            "permission id must be positive, got {bad}"
        )));
    }
    Ok(())
}

fn log_failure(event: &str, role_id: EntityId, err: ServiceError) -> ServiceError {
    warn!("event={event} module=iam status=error role_id={role_id} error={err}");
    err
}
