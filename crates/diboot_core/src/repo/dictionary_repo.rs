//! Dictionary table mapping and dictionary-specific queries.
//!
//! # Invariants
//! - Item lookups only return rows with `parent_id <> 0`.
//! - Key-value order is `sort_id ASC, id ASC`.

use crate::model::dictionary::Dictionary;
use crate::model::entity::ROOT_PARENT_ID;
use crate::model::key_value::KeyValue;
use crate::repo::crud_repo::{CrudRepository, SqliteCrudRepository};
use crate::repo::error::{RepoError, RepoResult};
use crate::repo::query::EntityQuery;
use crate::repo::relation::ForeignKey;
use crate::repo::table::{bool_to_int, read_flag, TableEntity};
use rusqlite::types::Value;
use rusqlite::Row;

const TABLE: &str = "dictionary";

/// Dictionary repository over the shared SQLite CRUD implementation.
pub type SqliteDictionaryRepository<'conn> = SqliteCrudRepository<'conn, Dictionary>;

/// Binding that links dictionary items to their definition row.
pub fn dictionary_parent_key() -> ForeignKey<Dictionary> {
    ForeignKey::new("parent_id", Dictionary::set_parent_id)
}

impl TableEntity for Dictionary {
    const TABLE: &'static str = TABLE;
    const COLUMNS: &'static [&'static str] = &[
        "parent_id",
        "type",
        "item_name",
        "item_value",
        "description",
        "sort_id",
        "is_editable",
    ];

    fn column_values(&self) -> Vec<Value> {
        vec![
            Value::Integer(self.parent_id),
            Value::Text(self.dict_type.clone()),
            Value::Text(self.item_name.clone()),
            self.item_value.clone().map_or(Value::Null, Value::Text),
            self.description.clone().map_or(Value::Null, Value::Text),
            Value::Integer(self.sort_id),
            Value::Integer(bool_to_int(self.is_editable)),
        ]
    }

    fn from_row(row: &Row<'_>) -> RepoResult<Self> {
        let dictionary = Dictionary {
            id: Some(row.get("id")?),
            parent_id: row.get("parent_id")?,
            dict_type: row.get("type")?,
            item_name: row.get("item_name")?,
            item_value: row.get("item_value")?,
            description: row.get("description")?,
            sort_id: row.get("sort_id")?,
            is_editable: read_flag(row, TABLE, "is_editable")?,
            is_deleted: false,
            create_time: row.get("create_time")?,
        };
        dictionary.validate().map_err(|err| {
            RepoError::InvalidData(format!("dictionary {:?}: {err}", dictionary.id))
        })?;
        Ok(dictionary)
    }

    fn validate_for_write(&self) -> RepoResult<()> {
        self.validate().map_err(RepoError::validation)
    }
}

/// Dictionary-specific read helpers.
pub trait DictionaryQueries {
    /// Item rows of `dict_type` in display order.
    fn list_items_by_type(&self, dict_type: &str) -> RepoResult<Vec<Dictionary>>;
    /// `(item_name, item_value)` pairs of `dict_type` in display order.
    fn list_key_values(&self, dict_type: &str) -> RepoResult<Vec<KeyValue>>;
    /// Root definition row of `dict_type`, if any.
    fn find_definition(&self, dict_type: &str) -> RepoResult<Option<Dictionary>>;
}

impl DictionaryQueries for SqliteDictionaryRepository<'_> {
    fn list_items_by_type(&self, dict_type: &str) -> RepoResult<Vec<Dictionary>> {
        let query = EntityQuery::new()
            .eq("type", dict_type)
            .ne("parent_id", ROOT_PARENT_ID)
            .order_by_asc("sort_id")
            .order_by_asc("id");
        self.get_entity_list(&query)
    }

    fn list_key_values(&self, dict_type: &str) -> RepoResult<Vec<KeyValue>> {
        Ok(self
            .list_items_by_type(dict_type)?
            .into_iter()
            .map(|item| KeyValue::new(item.item_name, item.item_value.unwrap_or_default()))
            .collect())
    }

    fn find_definition(&self, dict_type: &str) -> RepoResult<Option<Dictionary>> {
        let query = EntityQuery::new()
            .eq("type", dict_type)
            .eq("parent_id", ROOT_PARENT_ID)
            .order_by_asc("id");
        Ok(self.get_entity_list(&query)?.into_iter().next())
    }
}
