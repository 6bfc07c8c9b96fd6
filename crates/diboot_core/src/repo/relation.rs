//! One-to-many parent/children persistence.
//!
//! # Responsibility
//! - Write a parent entity together with its child collection.
//! - Reconcile persisted children against a target list by diff.
//!
//! # Invariants
//! - The parent is written first; its id is applied to every written child
//!   through the foreign key setter.
//! - Delete, update and insert of children plus the parent write commit as
//!   one transaction; any failure rolls all of them back.
//! - Ids are written back into entities only after commit.
//! - An empty target list removes every current child.
//! - A child with an id that is not a current child of the parent is
//!   rejected with `RepoError::RelatedEntityNotOwned`.

use crate::model::entity::{Entity, EntityId};
use crate::repo::crud_repo::SqliteCrudRepository;
use crate::repo::error::{RepoError, RepoResult};
use crate::repo::table::{
    insert_row, list_ids_where, resolve_column, soft_delete_ids, soft_delete_where, update_row,
    TableEntity,
};
use log::{debug, warn};
use rusqlite::{Connection, Transaction, TransactionBehavior};
use std::collections::BTreeSet;

/// Binding from a child entity to its parent: the foreign key column plus
/// the setter that writes the parent id into a child.
pub struct ForeignKey<C> {
    column: &'static str,
    setter: fn(&mut C, EntityId),
}

impl<C> Clone for ForeignKey<C> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<C> Copy for ForeignKey<C> {}

impl<C: TableEntity> ForeignKey<C> {
    pub fn new(column: &'static str, setter: fn(&mut C, EntityId)) -> Self {
        Self { column, setter }
    }

    pub fn column(&self) -> &'static str {
        self.column
    }

    fn link(&self, child: &mut C, parent_id: EntityId) {
        (self.setter)(child, parent_id);
    }

    fn resolved_column(&self) -> RepoResult<&'static str> {
        resolve_column::<C>(self.column)
    }
}

/// Row counts produced by one relation write.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RelationWriteSummary {
    pub parent_id: EntityId,
    pub inserted: usize,
    pub updated: usize,
    pub deleted: usize,
}

/// Children partitioned against the parent's current child set.
#[derive(Debug, Default, PartialEq, Eq)]
struct ChildPartition {
    /// Indexes into the target list of children without identity.
    to_insert: Vec<usize>,
    /// Indexes into the target list of children that already belong to the parent.
    to_update: Vec<usize>,
    /// Current child ids absent from the target list.
    to_delete: Vec<EntityId>,
}

/// Repository interface for parent + children writes.
pub trait RelatedEntityRepository<P: Entity> {
    /// Creates the parent, then inserts every child linked to it.
    fn create_entity_and_related_entities<C: TableEntity>(
        &self,
        parent: &mut P,
        children: &mut [C],
        foreign_key: ForeignKey<C>,
    ) -> RepoResult<RelationWriteSummary>;

    /// Updates the parent and reconciles its children to exactly `children`.
    fn update_entity_and_related_entities<C: TableEntity>(
        &self,
        parent: &P,
        children: &mut [C],
        foreign_key: ForeignKey<C>,
    ) -> RepoResult<RelationWriteSummary>;

    /// Deletes every child referencing the parent, then the parent.
    fn delete_entity_and_related_entities<C: TableEntity>(
        &self,
        parent_id: EntityId,
        foreign_key: ForeignKey<C>,
    ) -> RepoResult<RelationWriteSummary>;
}

impl<P: TableEntity> RelatedEntityRepository<P> for SqliteCrudRepository<'_, P> {
    fn create_entity_and_related_entities<C: TableEntity>(
        &self,
        parent: &mut P,
        children: &mut [C],
        foreign_key: ForeignKey<C>,
    ) -> RepoResult<RelationWriteSummary> {
        foreign_key.resolved_column()?;

        let tx = Transaction::new_unchecked(self.conn, TransactionBehavior::Immediate)?;
        let parent_id = insert_row(&tx, parent)?;

        let mut assigned = Vec::with_capacity(children.len());
        for child in children.iter_mut() {
            foreign_key.link(child, parent_id);
            assigned.push(insert_row(&tx, child)?);
        }
        tx.commit()?;

        parent.set_id(parent_id);
        for (child, id) in children.iter_mut().zip(assigned) {
            child.set_id(id);
        }

        let summary = RelationWriteSummary {
            parent_id,
            inserted: children.len(),
            ..RelationWriteSummary::default()
        };
        debug!(
            "event=relation_create module=repo status=ok parent_table={} child_table={} parent_id={} inserted={}",
            P::TABLE,
            C::TABLE,
            parent_id,
            summary.inserted
        );
        Ok(summary)
    }

    fn update_entity_and_related_entities<C: TableEntity>(
        &self,
        parent: &P,
        children: &mut [C],
        foreign_key: ForeignKey<C>,
    ) -> RepoResult<RelationWriteSummary> {
        let column = foreign_key.resolved_column()?;
        let parent_id = parent.id().ok_or(RepoError::MissingId(P::TABLE))?;

        let tx = Transaction::new_unchecked(self.conn, TransactionBehavior::Immediate)?;
        update_row(&tx, parent)?;

        let current_ids = list_ids_where::<C>(&tx, column, parent_id)?;
        let partition = partition_children::<C>(parent_id, children, &current_ids)?;

        let deleted = soft_delete_ids::<C>(&tx, &partition.to_delete)?;
        for index in &partition.to_update {
            let child = &mut children[*index];
            foreign_key.link(child, parent_id);
            update_row(&tx, child)?;
        }
        let mut assigned = Vec::with_capacity(partition.to_insert.len());
        for index in &partition.to_insert {
            let child = &mut children[*index];
            foreign_key.link(child, parent_id);
            assigned.push((*index, insert_row(&tx, child)?));
        }
        tx.commit()?;

        for (index, id) in assigned {
            children[index].set_id(id);
        }

        let summary = RelationWriteSummary {
            parent_id,
            inserted: partition.to_insert.len(),
            updated: partition.to_update.len(),
            deleted,
        };
        debug!(
            "event=relation_update module=repo status=ok parent_table={} child_table={} parent_id={} inserted={} updated={} deleted={}",
            P::TABLE,
            C::TABLE,
            parent_id,
            summary.inserted,
            summary.updated,
            summary.deleted
        );
        Ok(summary)
    }

    fn delete_entity_and_related_entities<C: TableEntity>(
        &self,
        parent_id: EntityId,
        foreign_key: ForeignKey<C>,
    ) -> RepoResult<RelationWriteSummary> {
        let column = foreign_key.resolved_column()?;

        let tx = Transaction::new_unchecked(self.conn, TransactionBehavior::Immediate)?;
        let deleted_children = soft_delete_where::<C>(&tx, column, parent_id)?;
        if soft_delete_ids::<P>(&tx, &[parent_id])? == 0 {
            // Dropping `tx` rolls back the child deletes.
            return Err(RepoError::NotFound {
                table: P::TABLE,
                id: parent_id,
            });
        }
        tx.commit()?;

        debug!(
            "event=relation_delete module=repo status=ok parent_table={} child_table={} parent_id={} deleted={}",
            P::TABLE,
            C::TABLE,
            parent_id,
            deleted_children
        );
        Ok(RelationWriteSummary {
            parent_id,
            deleted: deleted_children + 1,
            ..RelationWriteSummary::default()
        })
    }
}

fn partition_children<C: TableEntity>(
    parent_id: EntityId,
    children: &[C],
    current_ids: &[EntityId],
) -> RepoResult<ChildPartition> {
    let current: BTreeSet<EntityId> = current_ids.iter().copied().collect();
    let mut kept = BTreeSet::new();
    let mut partition = ChildPartition::default();

    for (index, child) in children.iter().enumerate() {
        match child.id() {
            None => partition.to_insert.push(index),
            Some(child_id) if current.contains(&child_id) => {
                kept.insert(child_id);
                partition.to_update.push(index);
            }
            Some(child_id) => {
                warn!(
                    "event=relation_update module=repo status=error error_code=child_not_owned table={} parent_id={parent_id} child_id={child_id}",
                    C::TABLE
                );
                return Err(RepoError::RelatedEntityNotOwned {
                    table: C::TABLE,
                    parent_id,
                    child_id,
                });
            }
        }
    }

    partition.to_delete = current.difference(&kept).copied().collect();
    Ok(partition)
}

/// Lists active child ids of `parent_id` through `foreign_key`.
pub fn related_entity_ids<C: TableEntity>(
    conn: &Connection,
    parent_id: EntityId,
    foreign_key: ForeignKey<C>,
) -> RepoResult<Vec<EntityId>> {
    list_ids_where::<C>(conn, foreign_key.resolved_column()?, parent_id)
}

#[cfg(test)]
mod tests {
    use super::{partition_children, ChildPartition};
    use crate::model::dictionary::Dictionary;
    use crate::repo::error::RepoError;

    fn persisted(id: i64, name: &str) -> Dictionary {
        let mut item = Dictionary::item("ID_TYPE", name, name);
        item.id = Some(id);
        item.parent_id = 1;
        item
    }

    #[test]
    fn partition_splits_new_kept_and_removed_children() {
        let children = vec![
            persisted(2, "ID card"),
            Dictionary::item("ID_TYPE", "Travel permit", "TP"),
            persisted(4, "Passport"),
        ];
        let partition =
            partition_children(1, &children, &[2, 3, 4]).expect("partition should succeed");
        assert_eq!(
            partition,
            ChildPartition {
                to_insert: vec![1],
                to_update: vec![0, 2],
                to_delete: vec![3],
            }
        );
    }

    #[test]
    fn empty_target_deletes_every_current_child() {
        let partition = partition_children::<Dictionary>(1, &[], &[5, 6])
            .expect("partition should succeed");
        assert_eq!(partition.to_delete, vec![5, 6]);
        assert!(partition.to_insert.is_empty());
        assert!(partition.to_update.is_empty());
    }

    #[test]
    fn foreign_child_is_rejected() {
        let children = vec![persisted(9, "Other")];
        let err = partition_children(1, &children, &[2]).expect_err("must reject");
        assert!(matches!(
            err,
            RepoError::RelatedEntityNotOwned {
                parent_id: 1,
                child_id: 9,
                ..
            }
        ));
    }
}
