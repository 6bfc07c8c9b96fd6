//! Entity to table mapping and shared SQL helpers.
//!
//! # Responsibility
//! - Describe how an entity maps onto one SQLite table.
//! - Own the SQL text for single-row writes and soft deletes.
//!
//! # Invariants
//! - Every mapped table has `id`, `is_deleted` and `create_time` columns.
//! - Reads never return rows with `is_deleted = 1`.
//! - Column names reaching SQL text come from `COLUMNS`, never from callers.

use crate::model::entity::{Entity, EntityId};
use crate::repo::error::{RepoError, RepoResult};
use rusqlite::types::Value;
use rusqlite::{params_from_iter, Connection, Row};

/// Columns every mapped table carries besides the entity's own.
pub const ID_COLUMN: &str = "id";
pub const CREATE_TIME_COLUMN: &str = "create_time";
const IS_DELETED_COLUMN: &str = "is_deleted";

/// Storage mapping for one entity type.
pub trait TableEntity: Entity + Sized {
    const TABLE: &'static str;
    /// Writable columns, in the same order as `column_values`. Excludes `id`.
    const COLUMNS: &'static [&'static str];

    /// Values bound to `COLUMNS` on insert and update.
    fn column_values(&self) -> Vec<Value>;

    /// Builds an entity from a row selected with `select_sql`.
    fn from_row(row: &Row<'_>) -> RepoResult<Self>;

    /// Field-level checks run before every write.
    fn validate_for_write(&self) -> RepoResult<()> {
        Ok(())
    }
}

/// Returns the mapped column name equal to `column`, or `UnknownColumn`.
pub(crate) fn resolve_column<T: TableEntity>(column: &str) -> RepoResult<&'static str> {
    if column == ID_COLUMN {
        return Ok(ID_COLUMN);
    }
    if column == CREATE_TIME_COLUMN {
        return Ok(CREATE_TIME_COLUMN);
    }
    T::COLUMNS
        .iter()
        .copied()
        .find(|known| *known == column)
        .ok_or_else(|| RepoError::UnknownColumn {
            table: T::TABLE,
            column: column.to_string(),
        })
}

pub(crate) fn select_sql<T: TableEntity>() -> String {
    format!(
        "SELECT {ID_COLUMN}, {}, {CREATE_TIME_COLUMN} FROM {} WHERE {IS_DELETED_COLUMN} = 0",
        T::COLUMNS.join(", "),
        T::TABLE
    )
}

pub(crate) fn count_sql<T: TableEntity>() -> String {
    format!(
        "SELECT COUNT(*) FROM {} WHERE {IS_DELETED_COLUMN} = 0",
        T::TABLE
    )
}

/// Inserts one entity row and returns the assigned id.
///
/// Runs `validate_for_write` first. Callers own any surrounding transaction.
pub fn insert_row<T: TableEntity>(conn: &Connection, entity: &T) -> RepoResult<EntityId> {
    entity.validate_for_write()?;
    let placeholders = (1..=T::COLUMNS.len())
        .map(|index| format!("?{index}"))
        .collect::<Vec<_>>()
        .join(", ");
    let sql = format!(
        "INSERT INTO {} ({}) VALUES ({placeholders});",
        T::TABLE,
        T::COLUMNS.join(", ")
    );
    conn.execute(&sql, params_from_iter(entity.column_values()))?;
    Ok(conn.last_insert_rowid())
}

/// Updates one active entity row by id.
pub(crate) fn update_row<T: TableEntity>(conn: &Connection, entity: &T) -> RepoResult<()> {
    let id = entity.id().ok_or(RepoError::MissingId(T::TABLE))?;
    entity.validate_for_write()?;

    let assignments = T::COLUMNS
        .iter()
        .enumerate()
        .map(|(index, column)| format!("{column} = ?{}", index + 1))
        .collect::<Vec<_>>()
        .join(", ");
    let sql = format!(
        "UPDATE {} SET {assignments} WHERE {ID_COLUMN} = ?{} AND {IS_DELETED_COLUMN} = 0;",
        T::TABLE,
        T::COLUMNS.len() + 1
    );

    let mut values = entity.column_values();
    values.push(Value::Integer(id));
    let changed = conn.execute(&sql, params_from_iter(values))?;
    if changed == 0 {
        return Err(RepoError::NotFound {
            table: T::TABLE,
            id,
        });
    }
    Ok(())
}

/// Soft-deletes active rows by id. Returns the number of rows tombstoned.
pub fn soft_delete_ids<T: TableEntity>(
    conn: &Connection,
    ids: &[EntityId],
) -> RepoResult<usize> {
    let mut changed = 0;
    let sql = format!(
        "UPDATE {} SET {IS_DELETED_COLUMN} = 1 WHERE {ID_COLUMN} = ?1 AND {IS_DELETED_COLUMN} = 0;",
        T::TABLE
    );
    let mut stmt = conn.prepare(&sql)?;
    for id in ids {
        changed += stmt.execute([id])?;
    }
    Ok(changed)
}

/// Soft-deletes every active row where `column = value`.
pub(crate) fn soft_delete_where<T: TableEntity>(
    conn: &Connection,
    column: &'static str,
    value: EntityId,
) -> RepoResult<usize> {
    let sql = format!(
        "UPDATE {} SET {IS_DELETED_COLUMN} = 1 WHERE {column} = ?1 AND {IS_DELETED_COLUMN} = 0;",
        T::TABLE
    );
    Ok(conn.execute(&sql, [value])?)
}

/// Lists active ids where `column = value`, ascending.
pub(crate) fn list_ids_where<T: TableEntity>(
    conn: &Connection,
    column: &'static str,
    value: EntityId,
) -> RepoResult<Vec<EntityId>> {
    let sql = format!(
        "SELECT {ID_COLUMN} FROM {} WHERE {column} = ?1 AND {IS_DELETED_COLUMN} = 0 ORDER BY {ID_COLUMN} ASC;",
        T::TABLE
    );
    let mut stmt = conn.prepare(&sql)?;
    let mut rows = stmt.query([value])?;
    let mut ids = Vec::new();
    while let Some(row) = rows.next()? {
        ids.push(row.get(0)?);
    }
    Ok(ids)
}

/// Verifies the connection carries the table and columns `T` maps onto.
pub(crate) fn ensure_table_ready<T: TableEntity>(conn: &Connection) -> RepoResult<()> {
    let exists: i64 = conn.query_row(
        "SELECT EXISTS(
            SELECT 1
            FROM sqlite_master
            WHERE type = 'table' AND name = ?1
        );",
        [T::TABLE],
        |row| row.get(0),
    )?;
    if exists != 1 {
        return Err(RepoError::MissingRequiredTable(T::TABLE));
    }

    let mut present = Vec::new();
    let mut stmt = conn.prepare(&format!("PRAGMA table_info({});", T::TABLE))?;
    let mut rows = stmt.query([])?;
    while let Some(row) = rows.next()? {
        let name: String = row.get(1)?;
        present.push(name);
    }

    let required = [ID_COLUMN, IS_DELETED_COLUMN, CREATE_TIME_COLUMN];
    for column in required.iter().chain(T::COLUMNS.iter()) {
        if !present.iter().any(|name| name == *column) {
            return Err(RepoError::MissingRequiredColumn {
                table: T::TABLE,
                column: *column,
            });
        }
    }
    Ok(())
}

/// Reads an `INTEGER` 0/1 column as bool, rejecting other values.
pub fn read_flag(row: &Row<'_>, table: &str, column: &str) -> RepoResult<bool> {
    match row.get::<_, i64>(column)? {
        0 => Ok(false),
        1 => Ok(true),
        other => Err(RepoError::InvalidData(format!(
            "invalid flag value `{other}` in {table}.{column}"
        ))),
    }
}

pub fn bool_to_int(value: bool) -> i64 {
    if value {
        1
    } else {
        0
    }
}
