//! Service error type and its mapping onto response statuses.

use crate::model::entity::EntityId;
use crate::repo::error::RepoError;
use crate::vo::json_result::{JsonResult, Status};
use std::error::Error;
use std::fmt::{Display, Formatter};

pub type ServiceResult<T> = Result<T, ServiceError>;

/// Service error for framework use-cases.
#[derive(Debug)]
pub enum ServiceError {
    /// Input failed field-level or relation validation.
    Validation(String),
    /// Request referenced an unmapped column or malformed parameter.
    InvalidParam(String),
    NotFound {
        entity: &'static str,
        id: EntityId,
    },
    /// A dictionary definition with this type already exists.
    DuplicateType(String),
    /// Persistence-layer failure.
    Repo(RepoError),
}

impl Display for ServiceError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Validation(message) => write!(f, "{message}"),
            Self::InvalidParam(message) => write!(f, "{message}"),
            Self::NotFound { entity, id } => write!(f, "{entity} not found: {id}"),
            Self::DuplicateType(dict_type) => {
                write!(f, "dictionary type already exists: `{dict_type}`")
            }
            Self::Repo(err) => write!(f, "{err}"),
        }
    }
}

impl Error for ServiceError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Repo(err) => Some(err),
            _ => None,
        }
    }
}

impl From<RepoError> for ServiceError {
    fn from(value: RepoError) -> Self {
        match value {
            RepoError::Validation(message) => Self::Validation(message),
            RepoError::NotFound { table, id } => Self::NotFound { entity: table, id },
            err @ RepoError::RelatedEntityNotOwned { .. } => Self::Validation(err.to_string()),
            err @ RepoError::UnknownColumn { .. } => Self::InvalidParam(err.to_string()),
            err @ RepoError::MissingId(_) => Self::Validation(err.to_string()),
            other => Self::Repo(other),
        }
    }
}

impl From<&ServiceError> for Status {
    fn from(value: &ServiceError) -> Self {
        match value {
            ServiceError::Validation(_) | ServiceError::DuplicateType(_) => Status::FailValidation,
            ServiceError::InvalidParam(_) => Status::FailInvalidParam,
            ServiceError::NotFound { .. } => Status::FailNotFound,
            ServiceError::Repo(_) => Status::FailException,
        }
    }
}

impl<T> From<&ServiceError> for JsonResult<T> {
    fn from(value: &ServiceError) -> Self {
        JsonResult::with_status(Status::from(value), value.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::ServiceError;
    use crate::repo::error::RepoError;
    use crate::vo::json_result::{JsonResult, Status};

    #[test]
    fn repo_validation_maps_to_fail_validation() {
        let err = ServiceError::from(RepoError::Validation("item name blank".to_string()));
        assert_eq!(Status::from(&err), Status::FailValidation);

        let result: JsonResult = JsonResult::from(&err);
        assert_eq!(result.code, Status::FailValidation.code());
        assert!(result.msg.ends_with("item name blank"));
    }

    #[test]
    fn repo_not_found_maps_to_fail_not_found() {
        let err = ServiceError::from(RepoError::NotFound {
            table: "dictionary",
            id: 3,
        });
        assert_eq!(Status::from(&err), Status::FailNotFound);
    }
}
