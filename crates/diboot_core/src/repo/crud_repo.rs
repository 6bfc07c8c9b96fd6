//! Generic CRUD repository contract and SQLite implementation.
//!
//! # Responsibility
//! - Provide create/read/update/delete APIs for any `TableEntity`.
//! - Keep SQL details inside the persistence boundary.
//!
//! # Invariants
//! - Write paths run `TableEntity::validate_for_write` before SQL mutations.
//! - Deletes are soft; every read filters `is_deleted = 0`.
//! - Batch writes are all-or-nothing.

use crate::model::entity::{Entity, EntityId};
use crate::repo::error::{RepoError, RepoResult};
use crate::repo::query::{order_sql, EntityQuery};
use crate::repo::table::{
    count_sql, ensure_table_ready, insert_row, select_sql, soft_delete_ids, update_row,
    TableEntity,
};
use crate::vo::pagination::Pagination;
use log::debug;
use rusqlite::types::Value;
use rusqlite::{params_from_iter, Connection, Transaction, TransactionBehavior};
use std::marker::PhantomData;

/// Repository interface for generic entity CRUD.
pub trait CrudRepository<T: Entity> {
    /// Inserts one entity and writes the assigned id back into it.
    fn create_entity(&self, entity: &mut T) -> RepoResult<EntityId>;
    /// Inserts all entities in one transaction. Returns the inserted count.
    fn create_entities(&self, entities: &mut [T]) -> RepoResult<usize>;
    fn update_entity(&self, entity: &T) -> RepoResult<()>;
    /// Updates all entities in one transaction.
    fn update_entities(&self, entities: &[T]) -> RepoResult<usize>;
    fn get_entity(&self, id: EntityId) -> RepoResult<Option<T>>;
    fn get_entity_list(&self, query: &EntityQuery) -> RepoResult<Vec<T>>;
    fn get_entity_list_count(&self, query: &EntityQuery) -> RepoResult<u64>;
    /// Lists one page and stores the unpaged total in `pagination`.
    fn get_entity_list_paged(
        &self,
        query: &EntityQuery,
        pagination: &mut Pagination,
    ) -> RepoResult<Vec<T>>;
    fn get_entity_list_by_ids(&self, ids: &[EntityId]) -> RepoResult<Vec<T>>;
    fn exists(&self, query: &EntityQuery) -> RepoResult<bool>;
    fn delete_entity(&self, id: EntityId) -> RepoResult<()>;
    /// Soft-deletes every row matching `query`. Returns the deleted count.
    fn delete_entities(&self, query: &EntityQuery) -> RepoResult<usize>;
}

/// SQLite-backed repository for one entity type.
pub struct SqliteCrudRepository<'conn, T> {
    pub(crate) conn: &'conn Connection,
    _entity: PhantomData<fn() -> T>,
}

impl<'conn, T: TableEntity> SqliteCrudRepository<'conn, T> {
    /// Creates repository from a migrated connection.
    pub fn try_new(conn: &'conn Connection) -> RepoResult<Self> {
        ensure_table_ready::<T>(conn)?;
        Ok(Self {
            conn,
            _entity: PhantomData,
        })
    }

    pub fn connection(&self) -> &'conn Connection {
        self.conn
    }

    fn query_entities(&self, sql: &str, bind_values: Vec<Value>) -> RepoResult<Vec<T>> {
        let mut stmt = self.conn.prepare(sql)?;
        let mut rows = stmt.query(params_from_iter(bind_values))?;
        let mut entities = Vec::new();
        while let Some(row) = rows.next()? {
            entities.push(T::from_row(row)?);
        }
        Ok(entities)
    }
}

impl<T: TableEntity> CrudRepository<T> for SqliteCrudRepository<'_, T> {
    fn create_entity(&self, entity: &mut T) -> RepoResult<EntityId> {
        let id = insert_row(self.conn, entity)?;
        entity.set_id(id);
        debug!("event=entity_create module=repo status=ok table={} id={id}", T::TABLE);
        Ok(id)
    }

    fn create_entities(&self, entities: &mut [T]) -> RepoResult<usize> {
        if entities.is_empty() {
            return Ok(0);
        }

        let tx = Transaction::new_unchecked(self.conn, TransactionBehavior::Immediate)?;
        let mut assigned = Vec::with_capacity(entities.len());
        for entity in entities.iter() {
            assigned.push(insert_row(&tx, entity)?);
        }
        tx.commit()?;

        for (entity, id) in entities.iter_mut().zip(assigned) {
            entity.set_id(id);
        }
        debug!(
            "event=entity_batch_create module=repo status=ok table={} count={}",
            T::TABLE,
            entities.len()
        );
        Ok(entities.len())
    }

    fn update_entity(&self, entity: &T) -> RepoResult<()> {
        update_row(self.conn, entity)
    }

    fn update_entities(&self, entities: &[T]) -> RepoResult<usize> {
        if entities.is_empty() {
            return Ok(0);
        }

        let tx = Transaction::new_unchecked(self.conn, TransactionBehavior::Immediate)?;
        for entity in entities {
            update_row(&tx, entity)?;
        }
        tx.commit()?;
        Ok(entities.len())
    }

    fn get_entity(&self, id: EntityId) -> RepoResult<Option<T>> {
        let sql = format!("{} AND id = ?;", select_sql::<T>());
        Ok(self
            .query_entities(&sql, vec![Value::Integer(id)])?
            .into_iter()
            .next())
    }

    fn get_entity_list(&self, query: &EntityQuery) -> RepoResult<Vec<T>> {
        let mut bind_values = Vec::new();
        let mut sql = select_sql::<T>();
        sql.push_str(&query.where_sql::<T>(&mut bind_values)?);
        sql.push_str(&order_sql::<T>(&query.orders)?);
        self.query_entities(&sql, bind_values)
    }

    fn get_entity_list_count(&self, query: &EntityQuery) -> RepoResult<u64> {
        let mut bind_values = Vec::new();
        let mut sql = count_sql::<T>();
        sql.push_str(&query.where_sql::<T>(&mut bind_values)?);
        let count: i64 =
            self.conn
                .query_row(&sql, params_from_iter(bind_values), |row| row.get(0))?;
        u64::try_from(count)
            .map_err(|_| RepoError::InvalidData(format!("negative row count `{count}`")))
    }

    fn get_entity_list_paged(
        &self,
        query: &EntityQuery,
        pagination: &mut Pagination,
    ) -> RepoResult<Vec<T>> {
        pagination.total_count = self.get_entity_list_count(query)?;

        let orders = if query.orders.is_empty() {
            pagination.order_items()
        } else {
            query.orders.clone()
        };

        let mut bind_values = Vec::new();
        let mut sql = select_sql::<T>();
        sql.push_str(&query.where_sql::<T>(&mut bind_values)?);
        sql.push_str(&order_sql::<T>(&orders)?);
        sql.push_str(" LIMIT ? OFFSET ?");
        bind_values.push(Value::Integer(i64::from(pagination.effective_page_size())));
        bind_values.push(Value::Integer(
            i64::try_from(pagination.offset()).unwrap_or(i64::MAX),
        ));
        self.query_entities(&sql, bind_values)
    }

    fn get_entity_list_by_ids(&self, ids: &[EntityId]) -> RepoResult<Vec<T>> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }
        self.get_entity_list(&EntityQuery::new().in_ids(ids))
    }

    fn exists(&self, query: &EntityQuery) -> RepoResult<bool> {
        Ok(self.get_entity_list_count(query)? > 0)
    }

    fn delete_entity(&self, id: EntityId) -> RepoResult<()> {
        if soft_delete_ids::<T>(self.conn, &[id])? == 0 {
            return Err(RepoError::NotFound {
                table: T::TABLE,
                id,
            });
        }
        Ok(())
    }

    fn delete_entities(&self, query: &EntityQuery) -> RepoResult<usize> {
        let ids = self
            .get_entity_list(query)?
            .into_iter()
            .filter_map(|entity| entity.id())
            .collect::<Vec<_>>();
        if ids.is_empty() {
            return Ok(0);
        }

        let tx = Transaction::new_unchecked(self.conn, TransactionBehavior::Immediate)?;
        let deleted = soft_delete_ids::<T>(&tx, &ids)?;
        tx.commit()?;
        Ok(deleted)
    }
}
