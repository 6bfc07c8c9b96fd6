//! Pagination request/response metadata and page container.
//!
//! # Invariants
//! - `page_index` is 1-based; values below 1 are treated as 1.
//! - `order_by` uses `"<field>:<ASC|DESC>"` items joined by `,`.

use crate::config;
use serde::{Deserialize, Serialize};

const DEFAULT_ORDER_BY: &str = "id:DESC";
const ORDER_ASC: &str = "ASC";
const ORDER_DESC: &str = "DESC";

/// One ordering column.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderItem {
    pub column: String,
    pub asc: bool,
}

impl OrderItem {
    pub fn asc(column: impl Into<String>) -> Self {
        Self {
            column: column.into(),
            asc: true,
        }
    }

    pub fn desc(column: impl Into<String>) -> Self {
        Self {
            column: column.into(),
            asc: false,
        }
    }

    fn render(&self) -> String {
        let direction = if self.asc { ORDER_ASC } else { ORDER_DESC };
        format!("{}:{direction}", self.column)
    }
}

/// Paging state shared by requests and responses.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Pagination {
    pub page_index: u32,
    pub page_size: u32,
    /// Filled by paged queries.
    pub total_count: u64,
    pub order_by: Option<String>,
}

impl Default for Pagination {
    fn default() -> Self {
        Self {
            page_index: 1,
            page_size: config::page_size(),
            total_count: 0,
            order_by: Some(DEFAULT_ORDER_BY.to_string()),
        }
    }
}

impl Pagination {
    pub fn new(page_index: u32, page_size: u32) -> Self {
        Self {
            page_index,
            page_size,
            ..Self::default()
        }
    }

    /// Page size after applying configured defaults and bounds.
    pub fn effective_page_size(&self) -> u32 {
        config::active_config().clamp_page_size(self.page_size)
    }

    /// Row offset of the first record on the current page.
    pub fn offset(&self) -> u64 {
        u64::from(self.page_index.max(1) - 1) * u64::from(self.effective_page_size())
    }

    /// Number of pages needed for `total_count`.
    pub fn total_page(&self) -> u64 {
        let size = u64::from(self.effective_page_size().max(1));
        self.total_count.div_ceil(size)
    }

    /// Parses `order_by` into order items. Blank entries are skipped and a
    /// missing or unknown direction falls back to ascending.
    pub fn order_items(&self) -> Vec<OrderItem> {
        let Some(order_by) = self.order_by.as_deref() else {
            return Vec::new();
        };
        order_by
            .split(',')
            .filter_map(|entry| {
                let mut parts = entry.splitn(2, ':');
                let column = parts.next()?.trim();
                if column.is_empty() {
                    return None;
                }
                let asc = !parts
                    .next()
                    .is_some_and(|direction| direction.trim().eq_ignore_ascii_case(ORDER_DESC));
                Some(OrderItem {
                    column: column.to_string(),
                    asc,
                })
            })
            .collect()
    }

    /// Renders order items back into the `order_by` string form.
    pub fn set_order_items(&mut self, items: &[OrderItem]) {
        self.order_by = if items.is_empty() {
            None
        } else {
            Some(
                items
                    .iter()
                    .map(OrderItem::render)
                    .collect::<Vec<_>>()
                    .join(","),
            )
        };
    }
}

/// One page of records with its position and ordering.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Page<T> {
    pub records: Vec<T>,
    /// 1-based page number.
    pub current: u32,
    pub size: u32,
    pub total: u64,
    pub orders: Vec<OrderItem>,
}

impl<T> Page<T> {
    /// Empty first page with the given size.
    pub fn new(size: u32) -> Self {
        Self {
            records: Vec::new(),
            current: 1,
            size,
            total: 0,
            orders: Vec::new(),
        }
    }

    pub fn add_order(mut self, item: OrderItem) -> Self {
        self.orders.push(item);
        self
    }

    /// Converts the page position back into pagination metadata. A page
    /// without orders keeps the default `id:DESC`.
    pub fn to_pagination(&self) -> Pagination {
        let mut pagination = Pagination {
            page_index: self.current,
            page_size: self.size,
            total_count: self.total,
            order_by: Some(DEFAULT_ORDER_BY.to_string()),
        };
        if !self.orders.is_empty() {
            pagination.set_order_items(&self.orders);
        }
        pagination
    }

    /// Builds a page request equivalent to the given pagination.
    pub fn from_pagination(pagination: &Pagination) -> Self {
        Self {
            records: Vec::new(),
            current: pagination.page_index.max(1),
            size: pagination.effective_page_size(),
            total: pagination.total_count,
            orders: pagination.order_items(),
        }
    }
}
