//! Dictionary use-case service.
//!
//! # Responsibility
//! - Key-value lookup over dictionary items of one type.
//! - Create/update/delete a definition together with its items.
//!
//! # Invariants
//! - At most one active root definition exists per `type`.
//! - Items written through this service carry their definition's `type`.

use crate::model::dictionary::{Dictionary, DictionaryVo};
use crate::model::entity::{Entity, EntityId, ROOT_PARENT_ID};
use crate::model::key_value::{key_value_list_to_map, KeyValue};
use crate::repo::crud_repo::CrudRepository;
use crate::repo::dictionary_repo::{dictionary_parent_key, DictionaryQueries};
use crate::repo::query::EntityQuery;
use crate::repo::relation::{RelatedEntityRepository, RelationWriteSummary};
use crate::service::base_service::BaseService;
use crate::service::error::{ServiceError, ServiceResult};
use log::info;
use std::collections::BTreeMap;

const ENTITY_NAME: &str = "dictionary";

/// Dictionary service facade over repository implementations.
pub struct DictionaryService<R> {
    base: BaseService<Dictionary, R>,
}

impl<R> DictionaryService<R>
where
    R: CrudRepository<Dictionary> + RelatedEntityRepository<Dictionary> + DictionaryQueries,
{
    pub fn new(repo: R) -> Self {
        Self {
            base: BaseService::new(repo),
        }
    }

    /// Generic CRUD operations over dictionary rows.
    pub fn base(&self) -> &BaseService<Dictionary, R> {
        &self.base
    }

    /// Lists `(item_name, item_value)` pairs of `dict_type` in display order.
    pub fn get_key_value_list(&self, dict_type: &str) -> ServiceResult<Vec<KeyValue>> {
        Ok(self.base.repo().list_key_values(dict_type)?)
    }

    /// Lookup map from item name to item value for `dict_type`.
    pub fn get_key_value_map(&self, dict_type: &str) -> ServiceResult<BTreeMap<String, String>> {
        Ok(key_value_list_to_map(&self.get_key_value_list(dict_type)?))
    }

    /// Returns whether a root definition of `dict_type` exists.
    pub fn exists_type(&self, dict_type: &str) -> ServiceResult<bool> {
        Ok(self.base.repo().find_definition(dict_type)?.is_some())
    }

    /// Loads one row with its direct children.
    pub fn get_dictionary_with_children(&self, id: EntityId) -> ServiceResult<Option<DictionaryVo>> {
        let Some(dictionary) = self.base.get_entity(id)? else {
            return Ok(None);
        };
        let children = self.base.get_entity_list(
            &EntityQuery::new()
                .eq("parent_id", id)
                .order_by_asc("sort_id")
                .order_by_asc("id"),
        )?;
        Ok(Some(DictionaryVo::new(dictionary, children)))
    }

    /// Creates a root definition and its items atomically.
    ///
    /// Fails with `DuplicateType` when a definition of the same type exists.
    pub fn create_dict_and_children(&self, vo: &mut DictionaryVo) -> ServiceResult<EntityId> {
        if !vo.dictionary.is_new() {
            return Err(ServiceError::Validation(
                "dictionary definition to create must not carry an id".to_string(),
            ));
        }
        prepare_definition(vo)?;
        if self.exists_type(&vo.dictionary.dict_type)? {
            return Err(ServiceError::DuplicateType(vo.dictionary.dict_type.clone()));
        }

        let summary = self.base.create_entity_and_related_entities(
            &mut vo.dictionary,
            &mut vo.children,
            dictionary_parent_key(),
        )?;
        info!(
            "event=dict_create module=service status=ok id={} items={}",
            summary.parent_id, summary.inserted
        );
        Ok(summary.parent_id)
    }

    /// Updates a root definition and reconciles its items to `vo.children`.
    pub fn update_dict_and_children(
        &self,
        vo: &mut DictionaryVo,
    ) -> ServiceResult<RelationWriteSummary> {
        let Some(id) = vo.dictionary.id else {
            return Err(ServiceError::Validation(
                "dictionary definition to update must carry an id".to_string(),
            ));
        };
        prepare_definition(vo)?;
        if let Some(existing) = self.base.repo().find_definition(&vo.dictionary.dict_type)? {
            if existing.id != Some(id) {
                return Err(ServiceError::DuplicateType(vo.dictionary.dict_type.clone()));
            }
        }

        let summary = self.base.update_entity_and_related_entities(
            &vo.dictionary,
            &mut vo.children,
            dictionary_parent_key(),
        )?;
        info!(
            "event=dict_update module=service status=ok id={id} inserted={} updated={} deleted={}",
            summary.inserted, summary.updated, summary.deleted
        );
        Ok(summary)
    }

    /// Deletes one row and every item under it.
    pub fn delete_dict_and_children(&self, id: EntityId) -> ServiceResult<()> {
        if self.base.get_entity(id)?.is_none() {
            return Err(ServiceError::NotFound {
                entity: ENTITY_NAME,
                id,
            });
        }
        let summary = self
            .base
            .delete_entity_and_related_entities(id, dictionary_parent_key())?;
        info!(
            "event=dict_delete module=service status=ok id={id} deleted={}",
            summary.deleted
        );
        Ok(())
    }
}

/// Normalizes the definition and forces item `type` to match it.
fn prepare_definition(vo: &mut DictionaryVo) -> ServiceResult<()> {
    if vo.dictionary.parent_id != ROOT_PARENT_ID {
        return Err(ServiceError::Validation(
            "dictionary definition must be a root row".to_string(),
        ));
    }
    vo.dictionary.dict_type = vo.dictionary.dict_type.trim().to_string();
    vo.dictionary
        .validate()
        .map_err(|err| ServiceError::Validation(err.to_string()))?;

    for child in &mut vo.children {
        child.dict_type.clone_from(&vo.dictionary.dict_type);
    }
    Ok(())
}
