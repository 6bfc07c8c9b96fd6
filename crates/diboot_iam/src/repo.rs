//! Role/permission persistence.
//!
//! # Responsibility
//! - Read the permission set granted to a role.
//! - Apply grant/revoke diffs for one role atomically.
//!
//! # Invariants
//! - A role holds at most one active row per permission.
//! - Revokes are soft deletes, like every other table.

use crate::model::IamRolePermission;
use diboot_core::repo::table::{insert_row, soft_delete_ids};
use diboot_core::{
    CrudRepository, EntityId, EntityQuery, RelationWriteSummary, RepoResult,
    SqliteCrudRepository,
};
use log::debug;
use rusqlite::{Transaction, TransactionBehavior};
use std::collections::{BTreeMap, BTreeSet};

/// Role/permission repository over the shared SQLite CRUD implementation.
pub type SqliteRolePermissionRepository<'conn> = SqliteCrudRepository<'conn, IamRolePermission>;

/// Role-scoped grant operations.
pub trait RolePermissionRepository {
    /// Active permission ids of `role_id`, ascending and distinct.
    fn list_permission_ids(&self, role_id: EntityId) -> RepoResult<Vec<EntityId>>;

    /// Grants `grant` and revokes `revoke` for `role_id` in one transaction.
    /// Already-granted ids in `grant` and absent ids in `revoke` are no-ops.
    /// New rows pass the entity's write validation; any failure rolls back the diff.
    fn apply_permission_diff(
        &self,
        role_id: EntityId,
        grant: &[EntityId],
        revoke: &[EntityId],
    ) -> RepoResult<RelationWriteSummary>;
}

impl RolePermissionRepository for SqliteRolePermissionRepository<'_> {
    fn list_permission_ids(&self, role_id: EntityId) -> RepoResult<Vec<EntityId>> {
        let rows = self.get_entity_list(&EntityQuery::new().eq("role_id", role_id))?;
        let ids: BTreeSet<EntityId> = rows.into_iter().map(|row| row.permission_id).collect();
        Ok(ids.into_iter().collect())
    }

    fn apply_permission_diff(
        &self,
        role_id: EntityId,
        grant: &[EntityId],
        revoke: &[EntityId],
    ) -> RepoResult<RelationWriteSummary> {
        let tx = Transaction::new_unchecked(self.connection(), TransactionBehavior::Immediate)?;

        // permission_id -> active row ids
        let mut current: BTreeMap<EntityId, Vec<EntityId>> = BTreeMap::new();
        {
            let mut stmt = tx.prepare(
                "SELECT id, permission_id FROM iam_role_permission
                 WHERE role_id = ?1 AND is_deleted = 0;",
            )?;
            let rows = stmt.query_map([role_id], |row| {
                Ok((row.get::<_, EntityId>(0)?, row.get::<_, EntityId>(1)?))
            })?;
            for row in rows {
                let (id, permission_id) = row?;
                current.entry(permission_id).or_default().push(id);
            }
        }

        let revoked_rows: Vec<EntityId> = revoke
            .iter()
            .collect::<BTreeSet<_>>()
            .into_iter()
            .filter_map(|permission_id| current.get(permission_id))
            .flatten()
            .copied()
            .collect();
        let deleted = soft_delete_ids::<IamRolePermission>(&tx, &revoked_rows)?;

        let mut inserted = 0;
        let mut seen = BTreeSet::new();
        for permission_id in grant {
            if current.contains_key(permission_id) || !seen.insert(*permission_id) {
                continue;
            }
            insert_row(&tx, &IamRolePermission::new(role_id, *permission_id))?;
            inserted += 1;
        }
        tx.commit()?;

        debug!(
            "event=role_permission_apply module=iam status=ok role_id={role_id} inserted={inserted} deleted={deleted}"
        );
        Ok(RelationWriteSummary {
            parent_id: role_id,
            inserted,
            updated: 0,
            deleted,
        })
    }
}
