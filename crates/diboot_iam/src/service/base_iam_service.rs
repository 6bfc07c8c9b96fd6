//! Base service shared by IAM entities.

use diboot_core::{BaseService, CrudRepository, TableEntity};
use log::debug;
use std::ops::Deref;

/// IAM-layer service over the generic CRUD service.
pub struct BaseIamService<T, R> {
    base: BaseService<T, R>,
}

impl<T: TableEntity, R: CrudRepository<T>> BaseIamService<T, R> {
    pub fn new(repo: R) -> Self {
        debug!(
            "event=iam_service_init module=iam status=ok table={}",
            T::TABLE
        );
        Self {
            base: BaseService::new(repo),
        }
    }
}

impl<T, R> Deref for BaseIamService<T, R> {
    type Target = BaseService<T, R>;

    fn deref(&self) -> &Self::Target {
        &self.base
    }
}
