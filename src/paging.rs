use serde::Deserialize;

use crate::error::{ServiceError, ServiceResult};

pub const DEFAULT_LIMIT: i64 = 20;
pub const MAX_SEARCH_LIMIT: i64 = 50;

/// Raw `limit`/`offset` query parameters.
#[derive(Debug, Default, Clone, Copy, Deserialize)]
pub struct PageQuery {
    pub limit: Option<i64>,
    pub offset: Option<i64>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Page {
    pub limit: i64,
    pub offset: i64,
}

impl Default for Page {
    fn default() -> Self {
        Self {
            limit: DEFAULT_LIMIT,
            offset: 0,
        }
    }
}

impl Page {
    pub fn new(limit: i64, offset: i64) -> ServiceResult<Self> {
        if limit <= 0 {
            return Err(ServiceError::InvalidPagination(
                "limit must be greater than zero".into(),
            ));
        }
        if offset < 0 {
            return Err(ServiceError::InvalidPagination(
                "offset must not be negative".into(),
            ));
        }
        Ok(Self { limit, offset })
    }

    pub fn from_query(query: PageQuery) -> ServiceResult<Self> {
        Self::new(
            query.limit.unwrap_or(DEFAULT_LIMIT),
            query.offset.unwrap_or(0),
        )
    }

    /// Same as [`Page::from_query`] but caps the limit at `max`.
    pub fn from_query_capped(query: PageQuery, max: i64) -> ServiceResult<Self> {
        let page = Self::from_query(query)?;
        Ok(Self {
            limit: page.limit.min(max),
            offset: page.offset,
        })
    }
}
