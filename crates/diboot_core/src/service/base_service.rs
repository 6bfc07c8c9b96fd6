//! Generic CRUD use-case service.
//!
//! # Responsibility
//! - Provide stable CRUD and parent/children entry points for any entity.
//! - Delegate persistence to repository implementations.
//! - Emit metadata-only write events.
//!
//! # Invariants
//! - Service APIs never bypass repository validation/persistence contracts.
//! - Service layer remains storage-agnostic.

use crate::model::entity::{Entity, EntityId};
use crate::repo::crud_repo::CrudRepository;
use crate::repo::query::{EntityQuery, FilterValue};
use crate::repo::relation::{ForeignKey, RelatedEntityRepository, RelationWriteSummary};
use crate::repo::table::TableEntity;
use crate::service::error::{ServiceError, ServiceResult};
use crate::vo::pagination::{Page, Pagination};
use log::{info, warn};
use std::marker::PhantomData;

/// Use-case service wrapper for entity CRUD operations.
pub struct BaseService<T, R> {
    repo: R,
    _entity: PhantomData<fn() -> T>,
}

impl<T: Entity, R: CrudRepository<T>> BaseService<T, R> {
    /// Creates a service using the provided repository implementation.
    pub fn new(repo: R) -> Self {
        Self {
            repo,
            _entity: PhantomData,
        }
    }

    pub fn repo(&self) -> &R {
        &self.repo
    }

    /// Creates one entity; its id is written back on success.
    pub fn create_entity(&self, entity: &mut T) -> ServiceResult<EntityId> {
        let id = self.repo.create_entity(entity).map_err(log_failure("entity_create"))?;
        info!("event=entity_create module=service status=ok id={id}");
        Ok(id)
    }

    /// Creates all entities atomically.
    pub fn create_entities(&self, entities: &mut [T]) -> ServiceResult<usize> {
        let count = self
            .repo
            .create_entities(entities)
            .map_err(log_failure("entity_batch_create"))?;
        info!("event=entity_batch_create module=service status=ok count={count}");
        Ok(count)
    }

    pub fn update_entity(&self, entity: &T) -> ServiceResult<()> {
        self.repo
            .update_entity(entity)
            .map_err(log_failure("entity_update"))?;
        Ok(())
    }

    /// Updates all entities atomically.
    pub fn update_entities(&self, entities: &[T]) -> ServiceResult<usize> {
        Ok(self
            .repo
            .update_entities(entities)
            .map_err(log_failure("entity_batch_update"))?)
    }

    pub fn get_entity(&self, id: EntityId) -> ServiceResult<Option<T>> {
        Ok(self.repo.get_entity(id)?)
    }

    pub fn get_entity_list(&self, query: &EntityQuery) -> ServiceResult<Vec<T>> {
        Ok(self.repo.get_entity_list(query)?)
    }

    pub fn get_entity_list_count(&self, query: &EntityQuery) -> ServiceResult<u64> {
        Ok(self.repo.get_entity_list_count(query)?)
    }

    /// Lists one page; `pagination.total_count` is refreshed.
    pub fn get_entity_list_paged(
        &self,
        query: &EntityQuery,
        pagination: &mut Pagination,
    ) -> ServiceResult<Vec<T>> {
        Ok(self.repo.get_entity_list_paged(query, pagination)?)
    }

    /// Fills `page` with records and total. Page orders apply when the
    /// query has none of its own, and an unordered page sorts `id DESC`.
    /// The returned page reports the orders actually applied.
    pub fn get_page(&self, query: &EntityQuery, page: Page<T>) -> ServiceResult<Page<T>> {
        let mut pagination = page.to_pagination();
        let records = self.repo.get_entity_list_paged(query, &mut pagination)?;
        let orders = if query.orders.is_empty() {
            pagination.order_items()
        } else {
            query.orders.clone()
        };
        Ok(Page {
            records,
            current: page.current.max(1),
            size: pagination.effective_page_size(),
            total: pagination.total_count,
            orders,
        })
    }

    pub fn get_entity_list_by_ids(&self, ids: &[EntityId]) -> ServiceResult<Vec<T>> {
        Ok(self.repo.get_entity_list_by_ids(ids)?)
    }

    /// Returns whether any active row has `column = value`.
    pub fn exists(
        &self,
        column: impl Into<String>,
        value: impl Into<FilterValue>,
    ) -> ServiceResult<bool> {
        self.exists_by(&EntityQuery::new().eq(column, value))
    }

    pub fn exists_by(&self, query: &EntityQuery) -> ServiceResult<bool> {
        Ok(self.repo.exists(query)?)
    }

    pub fn delete_entity(&self, id: EntityId) -> ServiceResult<()> {
        self.repo
            .delete_entity(id)
            .map_err(log_failure("entity_delete"))?;
        info!("event=entity_delete module=service status=ok id={id}");
        Ok(())
    }

    pub fn delete_entities(&self, query: &EntityQuery) -> ServiceResult<usize> {
        let deleted = self
            .repo
            .delete_entities(query)
            .map_err(log_failure("entity_batch_delete"))?;
        info!("event=entity_batch_delete module=service status=ok count={deleted}");
        Ok(deleted)
    }
}

impl<T: Entity, R: CrudRepository<T> + RelatedEntityRepository<T>> BaseService<T, R> {
    /// Creates `parent`, then every child linked through `foreign_key`.
    pub fn create_entity_and_related_entities<C: TableEntity>(
        &self,
        parent: &mut T,
        children: &mut [C],
        foreign_key: ForeignKey<C>,
    ) -> ServiceResult<RelationWriteSummary> {
        let summary = self
            .repo
            .create_entity_and_related_entities(parent, children, foreign_key)
            .map_err(log_failure("relation_create"))?;
        info!(
            "event=relation_create module=service status=ok parent_id={} inserted={}",
            summary.parent_id, summary.inserted
        );
        Ok(summary)
    }

    /// Updates `parent` and reconciles its children to exactly `children`.
    ///
    /// An empty `children` slice removes every existing child.
    pub fn update_entity_and_related_entities<C: TableEntity>(
        &self,
        parent: &T,
        children: &mut [C],
        foreign_key: ForeignKey<C>,
    ) -> ServiceResult<RelationWriteSummary> {
        let summary = self
            .repo
            .update_entity_and_related_entities(parent, children, foreign_key)
            .map_err(log_failure("relation_update"))?;
        info!(
            "event=relation_update module=service status=ok parent_id={} inserted={} updated={} deleted={}",
            summary.parent_id, summary.inserted, summary.updated, summary.deleted
        );
        Ok(summary)
    }

    /// Deletes the parent row and every child referencing it.
    pub fn delete_entity_and_related_entities<C: TableEntity>(
        &self,
        parent_id: EntityId,
        foreign_key: ForeignKey<C>,
    ) -> ServiceResult<RelationWriteSummary> {
        let summary = self
            .repo
            .delete_entity_and_related_entities(parent_id, foreign_key)
            .map_err(log_failure("relation_delete"))?;
        info!(
            "event=relation_delete module=service status=ok parent_id={parent_id} deleted={}",
            summary.deleted
        );
        Ok(summary)
    }
}

fn log_failure<E: Into<ServiceError>>(event: &'static str) -> impl Fn(E) -> ServiceError {
    move |err| {
        let err = err.into();
        warn!("event={event} module=service status=error error={err}");
        err
    }
}
