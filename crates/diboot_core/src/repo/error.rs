//! Repository error type shared by CRUD and relation operations.

use crate::db::DbError;
use crate::model::entity::EntityId;
use std::error::Error;
use std::fmt::{Display, Formatter};

pub type RepoResult<T> = Result<T, RepoError>;

/// Generic repository error for persistence and query operations.
#[derive(Debug)]
pub enum RepoError {
    /// Entity failed field-level validation before a write.
    Validation(String),
    Db(DbError),
    NotFound {
        table: &'static str,
        id: EntityId,
    },
    /// Operation requires a persisted entity but got a new one.
    MissingId(&'static str),
    /// Filter/order/foreign-key column is not mapped on the table.
    UnknownColumn {
        table: &'static str,
        column: String,
    },
    /// Child carries an identity that does not belong to the parent.
    RelatedEntityNotOwned {
        table: &'static str,
        parent_id: EntityId,
        child_id: EntityId,
    },
    InvalidData(String),
    MissingRequiredTable(&'static str),
    MissingRequiredColumn {
        table: &'static str,
        column: &'static str,
    },
}

impl RepoError {
    pub fn validation(err: impl Display) -> Self {
        Self::Validation(err.to_string())
    }
}

impl Display for RepoError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Validation(message) => write!(f, "{message}"),
            Self::Db(err) => write!(f, "{err}"),
            Self::NotFound { table, id } => write!(f, "{table} not found: {id}"),
            Self::MissingId(table) => write!(f, "{table} entity has no id"),
            Self::UnknownColumn { table, column } => {
                write!(f, "unknown column `{column}` on table `{table}`")
            }
            Self::RelatedEntityNotOwned {
                table,
                parent_id,
                child_id,
            } => write!(
                f,
                "{table} {child_id} is not a current child of parent {parent_id}"
            ),
            Self::InvalidData(message) => write!(f, "invalid persisted data: {message}"),
            Self::MissingRequiredTable(table) => write!(f, "repository requires table `{table}`"),
            Self::MissingRequiredColumn { table, column } => write!(
                f,
                "repository requires column `{column}` in table `{table}`"
            ),
        }
    }
}

impl Error for RepoError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Db(err) => Some(err),
            _ => None,
        }
    }
}

impl From<DbError> for RepoError {
    fn from(value: DbError) -> Self {
        Self::Db(value)
    }
}

impl From<rusqlite::Error> for RepoError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Db(DbError::Sqlite(value))
    }
}
