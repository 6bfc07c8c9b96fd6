//! Dictionary domain model.
//!
//! # Responsibility
//! - Define the self-referencing dictionary row (definition + items).
//! - Provide validation used by repository write paths.
//!
//! # Invariants
//! - `parent_id == 0` marks a root definition; children are items.
//! - Items share `dict_type` with their parent definition.
//! - `parent_id` forms a tree; acyclicity is a convention, not enforced.

use crate::model::entity::{Entity, EntityId, ROOT_PARENT_ID};
use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};

const DEFAULT_SORT_ID: i64 = 99;

/// One dictionary row. Roots define a category, children are its items.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Dictionary {
    /// Store-assigned id. `None` until first insert.
    pub id: Option<EntityId>,
    /// Parent definition id. `0` for root rows.
    pub parent_id: EntityId,
    /// Category code, serialized as `type`.
    #[serde(rename = "type")]
    pub dict_type: String,
    /// Display name of the definition or item.
    pub item_name: String,
    /// Stored value of an item. Usually `None` on root definitions.
    pub item_value: Option<String>,
    pub description: Option<String>,
    /// Ascending display order among siblings.
    pub sort_id: i64,
    /// System-seeded rows are locked against edits from management UIs.
    pub is_editable: bool,
    /// Soft-delete tombstone. Always `false` on loaded rows.
    #[serde(default)]
    pub is_deleted: bool,
    /// Epoch milliseconds, assigned by storage.
    pub create_time: Option<i64>,
}

impl Dictionary {
    /// Creates a root definition row for `dict_type`.
    pub fn root(dict_type: impl Into<String>, item_name: impl Into<String>) -> Self {
        Self {
            id: None,
            parent_id: ROOT_PARENT_ID,
            dict_type: dict_type.into(),
            item_name: item_name.into(),
            item_value: None,
            description: None,
            sort_id: DEFAULT_SORT_ID,
            is_editable: true,
            is_deleted: false,
            create_time: None,
        }
    }

    /// Creates an item row. `parent_id` is linked later by the relation helper
    /// or set explicitly by the caller.
    pub fn item(
        dict_type: impl Into<String>,
        item_name: impl Into<String>,
        item_value: impl Into<String>,
    ) -> Self {
        let mut item = Self::root(dict_type, item_name);
        item.item_value = Some(item_value.into());
        item
    }

    pub fn with_sort_id(mut self, sort_id: i64) -> Self {
        self.sort_id = sort_id;
        self
    }

    pub fn is_root(&self) -> bool {
        self.parent_id == ROOT_PARENT_ID
    }

    /// Foreign key setter used to link items to their definition.
    pub fn set_parent_id(&mut self, parent_id: EntityId) {
        self.parent_id = parent_id;
    }

    /// Validates field-level invariants before persistence.
    pub fn validate(&self) -> Result<(), DictionaryValidationError> {
        if self.dict_type.trim().is_empty() {
            return Err(DictionaryValidationError::BlankType);
        }
        if self.item_name.trim().is_empty() {
            return Err(DictionaryValidationError::BlankItemName);
        }
        if self.parent_id < 0 {
            return Err(DictionaryValidationError::NegativeParentId(self.parent_id));
        }
        if Some(self.parent_id) == self.id && !self.is_root() {
            return Err(DictionaryValidationError::SelfParent(self.parent_id));
        }
        Ok(())
    }
}

impl Entity for Dictionary {
    fn id(&self) -> Option<EntityId> {
        self.id
    }

    fn set_id(&mut self, id: EntityId) {
        self.id = Some(id);
    }
}

/// Dictionary definition together with its items.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DictionaryVo {
    #[serde(flatten)]
    pub dictionary: Dictionary,
    #[serde(default)]
    pub children: Vec<Dictionary>,
}

impl DictionaryVo {
    pub fn new(dictionary: Dictionary, children: Vec<Dictionary>) -> Self {
        Self {
            dictionary,
            children,
        }
    }
}

/// Field-level dictionary validation failures.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DictionaryValidationError {
    BlankType,
    BlankItemName,
    NegativeParentId(EntityId),
    SelfParent(EntityId),
}

impl Display for DictionaryValidationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::BlankType => write!(f, "dictionary type must not be blank"),
            Self::BlankItemName => write!(f, "dictionary item name must not be blank"),
            Self::NegativeParentId(id) => write!(f, "dictionary parent id must be >= 0, got {id}"),
            Self::SelfParent(id) => write!(f, "dictionary {id} cannot be its own parent"),
        }
    }
}

impl Error for DictionaryValidationError {}

#[cfg(test)]
mod tests {
    use super::{Dictionary, DictionaryValidationError};

    #[test]
    fn root_defaults_are_editable_and_parentless() {
        let root = Dictionary::root("GENDER", "Gender");
        assert!(root.is_root());
        assert!(root.is_editable);
        assert_eq!(root.item_value, None);
        assert!(root.validate().is_ok());
    }

    #[test]
    fn validate_rejects_blank_fields() {
        let blank_type = Dictionary::root("  ", "Gender");
        assert_eq!(
            blank_type.validate(),
            Err(DictionaryValidationError::BlankType)
        );

        let blank_name = Dictionary::item("GENDER", "", "M");
        assert_eq!(
            blank_name.validate(),
            Err(DictionaryValidationError::BlankItemName)
        );
    }

    #[test]
    fn validate_rejects_self_parent() {
        let mut item = Dictionary::item("GENDER", "Male", "M");
        item.id = Some(7);
        item.parent_id = 7;
        assert_eq!(
            item.validate(),
            Err(DictionaryValidationError::SelfParent(7))
        );
    }

    #[test]
    fn serializes_type_field_with_external_name() {
        let item = Dictionary::item("GENDER", "Male", "M");
        let json = serde_json::to_value(&item).expect("dictionary should serialize");
        assert_eq!(json["type"], "GENDER");
        assert_eq!(json["itemName"], "Male");
        assert_eq!(json["parentId"], 0);
    }
}
