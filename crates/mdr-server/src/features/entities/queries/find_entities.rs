//! Find entities query
//!
//! Filtered listing by any subset of `{repository_id, file_name,
//! project_code}`; unset fields are wildcards. Results are ordered by id and
//! paginated.

use mdr_common::Entity;
use serde::{Deserialize, Serialize};

use crate::store::{EntityCriteria, EntityStore, PageRequest, StoreError};

/// Default items per page.
const DEFAULT_PER_PAGE: i64 = 20;

/// Upper bound for items per page.
const MAX_PER_PAGE: i64 = 100;

/// Query parameters for entity listings
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FindEntitiesQuery {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub repository_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub file_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub project_code: Option<String>,
    /// Page number (1-indexed). Defaults to 1.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub page: Option<i64>,
    /// Items per page. Defaults to 20, clamped to 1-100.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub per_page: Option<i64>,
}

impl FindEntitiesQuery {
    pub fn page(&self) -> i64 {
        self.page.unwrap_or(1).max(1)
    }

    pub fn per_page(&self) -> i64 {
        self.per_page.unwrap_or(DEFAULT_PER_PAGE).clamp(1, MAX_PER_PAGE)
    }

    fn criteria(&self) -> EntityCriteria {
        // Empty strings from query params act as unset filters.
        let not_blank =
            |v: &Option<String>| v.as_deref().filter(|s| !s.is_empty()).map(str::to_string);

        EntityCriteria {
            repository_id: not_blank(&self.repository_id),
            file_name: not_blank(&self.file_name),
            project_code: not_blank(&self.project_code),
        }
    }
}

/// Pagination metadata attached to listing responses
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PageInfo {
    pub page: i64,
    pub per_page: i64,
    pub total: i64,
    pub pages: i64,
}

impl PageInfo {
    fn new(page: i64, per_page: i64, total: i64) -> Self {
        let pages = if total == 0 {
            0
        } else {
            (total + per_page - 1) / per_page
        };
        Self { page, per_page, total, pages }
    }
}

pub async fn handle(
    store: &dyn EntityStore,
    query: FindEntitiesQuery,
) -> Result<(Vec<Entity>, PageInfo), StoreError> {
    let page = PageRequest {
        page: query.page(),
        per_page: query.per_page(),
    };

    let (items, total) = store.find(&query.criteria(), page).await?;

    Ok((items, PageInfo::new(page.page, page.per_page, total)))
}
