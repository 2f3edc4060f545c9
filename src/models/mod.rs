pub mod daily_record;
pub mod entry;
pub mod prompt;

use serde::Serialize;

/// Pagination metadata attached to every list response.
#[derive(Debug, Serialize)]
pub struct Pagination {
    pub page: u32,
    pub limit: u32,
    pub total: i64,
    pub pages: i64,
}

impl Pagination {
    pub fn new(page: u32, limit: u32, total: i64) -> Self {
        let pages = if limit > 0 {
            (total + limit as i64 - 1) / limit as i64
        } else {
            0
        };
        Self {
            page,
            limit,
            total,
            pages,
        }
    }
}
