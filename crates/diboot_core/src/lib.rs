//! Core framework layer for diboot.
//! Generic CRUD scaffolding, dictionary management, paging and response
//! envelopes over SQLite.

pub mod config;
pub mod db;
pub mod logging;
pub mod model;
pub mod repo;
pub mod service;
pub mod vo;

pub use config::{active_config, install_config, ConfigError, CoreConfig};
pub use logging::{default_log_level, init_logging, logging_status};
pub use model::dictionary::{Dictionary, DictionaryValidationError, DictionaryVo};
pub use model::entity::{Entity, EntityId, ROOT_PARENT_ID};
pub use model::key_value::{key_value_list_to_map, KeyValue};
pub use repo::crud_repo::{CrudRepository, SqliteCrudRepository};
pub use repo::dictionary_repo::{dictionary_parent_key, DictionaryQueries, SqliteDictionaryRepository};
pub use repo::error::{RepoError, RepoResult};
pub use repo::query::{Condition, EntityQuery, FilterValue};
pub use repo::relation::{ForeignKey, RelatedEntityRepository, RelationWriteSummary};
pub use repo::table::TableEntity;
pub use service::base_service::BaseService;
pub use service::dictionary_service::DictionaryService;
pub use service::error::{ServiceError, ServiceResult};
pub use vo::json_result::{JsonResult, PagingJsonResult, Status};
pub use vo::pagination::{OrderItem, Page, Pagination};

/// Minimal health-check API for early integration.
pub fn ping() -> &'static str {
    "pong"
}

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
