//! JSON response envelopes.
//!
//! # Invariants
//! - `JsonResult::ok(data)` always carries `Status::Ok` and `data` unchanged.
//! - Failure messages end with the caller-provided detail.

use crate::vo::pagination::{Page, Pagination};
use serde::{Deserialize, Serialize};

/// Response status codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Status {
    Ok,
    WarnPartialSuccess,
    WarnPerformanceIssue,
    FailInvalidParam,
    FailInvalidToken,
    FailNoPermission,
    FailNotFound,
    FailValidation,
    FailOperation,
    FailRequestTimeout,
    FailException,
}

impl Status {
    pub fn code(self) -> i32 {
        match self {
            Self::Ok => 0,
            Self::WarnPartialSuccess => 1001,
            Self::WarnPerformanceIssue => 1002,
            Self::FailInvalidParam => 4000,
            Self::FailInvalidToken => 4001,
            Self::FailNoPermission => 4003,
            Self::FailNotFound => 4004,
            Self::FailValidation => 4005,
            Self::FailOperation => 4006,
            Self::FailRequestTimeout => 4008,
            Self::FailException => 5000,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::Ok => "success",
            Self::WarnPartialSuccess => "partial success",
            Self::WarnPerformanceIssue => "potential performance issue",
            Self::FailInvalidParam => "invalid request parameter",
            Self::FailInvalidToken => "invalid or expired token",
            Self::FailNoPermission => "permission denied",
            Self::FailNotFound => "resource not found",
            Self::FailValidation => "validation failed",
            Self::FailOperation => "operation failed",
            Self::FailRequestTimeout => "request timeout",
            Self::FailException => "internal error",
        }
    }

    pub fn is_ok(self) -> bool {
        self == Self::Ok
    }
}

/// Generic response envelope: status code, message and optional payload.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JsonResult<T = serde_json::Value> {
    pub code: i32,
    pub msg: String,
    pub data: Option<T>,
}

impl<T> JsonResult<T> {
    /// Successful result carrying `data` unchanged.
    pub fn ok(data: T) -> Self {
        Self {
            code: Status::Ok.code(),
            msg: Status::Ok.label().to_string(),
            data: Some(data),
        }
    }

    /// Result with the given status. `msg` is appended to the status label.
    pub fn with_status(status: Status, msg: impl AsRef<str>) -> Self {
        let detail = msg.as_ref();
        let msg = if detail.is_empty() {
            status.label().to_string()
        } else {
            format!("{}: {detail}", status.label())
        };
        Self {
            code: status.code(),
            msg,
            data: None,
        }
    }

    pub fn fail_validation(msg: impl AsRef<str>) -> Self {
        Self::with_status(Status::FailValidation, msg)
    }

    pub fn fail_not_found(msg: impl AsRef<str>) -> Self {
        Self::with_status(Status::FailNotFound, msg)
    }

    pub fn is_ok(&self) -> bool {
        self.code == Status::Ok.code()
    }

    pub fn data(&self) -> Option<&T> {
        self.data.as_ref()
    }
}

/// Response envelope for paged lists.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PagingJsonResult<T> {
    pub code: i32,
    pub msg: String,
    pub data: Option<Vec<T>>,
    pub page: Pagination,
}

impl<T> PagingJsonResult<T> {
    /// Successful paged result from records and the pagination that produced them.
    pub fn new(records: Vec<T>, page: Pagination) -> Self {
        Self {
            code: Status::Ok.code(),
            msg: Status::Ok.label().to_string(),
            data: Some(records),
            page,
        }
    }

    pub fn page(&self) -> &Pagination {
        &self.page
    }
}

impl<T> From<Page<T>> for PagingJsonResult<T> {
    fn from(page: Page<T>) -> Self {
        let pagination = page.to_pagination();
        Self::new(page.records, pagination)
    }
}
