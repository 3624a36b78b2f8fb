//! Entity API routes
//!
//! Wires the entity commands and queries to Axum HTTP handlers.
//!
//! # Route Structure
//!
//! - `POST /api/v1/entities` - Register a file entity
//! - `GET /api/v1/entities` - List entities with filters and pagination
//! - `GET /api/v1/entities/:id` - Get a single entity by id
//! - `HEAD /api/v1/entities/:id` - Check whether an entity exists

use axum::{
    extract::{Path, Query, State},
    http::{HeaderValue, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use mdr_common::{RegisterEntityRequest, ENTITY_ID_HEADER};
use serde_json::json;

use crate::api::response::{ApiResponse, ErrorResponse};
use crate::error::{ApiResult, AppError};
use crate::features::FeatureState;

use super::{
    commands::{register, RegisterEntityError, Registration},
    queries::{find_entities, get_entity, FindEntitiesQuery, GetEntityQuery},
};

// ============================================================================
// Router Configuration
// ============================================================================

/// Creates the entities router with all routes configured
pub fn entities_routes() -> Router<FeatureState> {
    Router::new()
        .route("/", post(register_entity))
        .route("/", get(list_entities))
        .route("/:id", get(get_entity_by_id).head(entity_exists))
}

// ============================================================================
// Command Handlers (Write Operations)
// ============================================================================

/// Register a file entity
///
/// # Endpoint
///
/// `POST /api/v1/entities`
///
/// # Request Body
///
/// ```json
/// {
///   "repository_id": "bb44b6d8-010d-473b-8037-91530a01c24f",
///   "file_name": "sample.bam",
///   "project_code": "PACA-CA",
///   "access_level": "controlled"
/// }
/// ```
///
/// # Response
///
/// - `201 Created` - Entity registered, body carries the new record
/// - `409 Conflict` - Identity already registered; the `entity-id` response
///   header carries the existing entity's id
/// - `422 Unprocessable Entity` - Validation error
/// - `500 Internal Server Error` - Store error
#[tracing::instrument(
    skip(state, request),
    fields(repository_id = %request.repository_id, file_name = %request.file_name)
)]
async fn register_entity(
    State(state): State<FeatureState>,
    Json(request): Json<RegisterEntityRequest>,
) -> ApiResult<Response> {
    let outcome = register::handle(state.store.as_ref(), request.into()).await?;

    match outcome {
        Registration::Created(entity) => {
            tracing::info!(id = %entity.id, "Entity registered via API");
            Ok((StatusCode::CREATED, Json(ApiResponse::success(entity))).into_response())
        },
        // A duplicate is a resolution, not a failure: answer 409 and point
        // the caller at the existing record through the entity-id header.
        Registration::Duplicate(existing) => {
            tracing::info!(id = %existing.id, "Duplicate registration via API");
            let error = ErrorResponse::new(
                "CONFLICT",
                format!(
                    "Entity '{}' already registered in repository '{}'",
                    existing.file_name, existing.repository_id
                ),
            );
            let mut response = (StatusCode::CONFLICT, Json(error)).into_response();
            if let Ok(value) = HeaderValue::from_str(&existing.id) {
                response.headers_mut().insert(ENTITY_ID_HEADER, value);
            }
            Ok(response)
        },
    }
}

// ============================================================================
// Query Handlers (Read Operations)
// ============================================================================

/// Get a single entity by id
///
/// # Endpoint
///
/// `GET /api/v1/entities/:id`
///
/// # Response
///
/// - `200 OK` - Entity found
/// - `404 Not Found` - No entity with this id
#[tracing::instrument(skip(state), fields(id = %id))]
async fn get_entity_by_id(
    State(state): State<FeatureState>,
    Path(id): Path<String>,
) -> ApiResult<Response> {
    let entity = get_entity::handle(state.store.as_ref(), GetEntityQuery { id }).await?;

    Ok((StatusCode::OK, Json(ApiResponse::success(entity))).into_response())
}

/// Check whether an entity exists
///
/// # Endpoint
///
/// `HEAD /api/v1/entities/:id`
///
/// # Response
///
/// - `200 OK` - Entity exists (no body)
/// - `404 Not Found` - No entity with this id (no body)
#[tracing::instrument(skip(state), fields(id = %id))]
async fn entity_exists(
    State(state): State<FeatureState>,
    Path(id): Path<String>,
) -> ApiResult<StatusCode> {
    if get_entity::exists(state.store.as_ref(), &id).await? {
        Ok(StatusCode::OK)
    } else {
        Ok(StatusCode::NOT_FOUND)
    }
}

/// List entities with filters and pagination
///
/// # Endpoint
///
/// `GET /api/v1/entities?repository_id=...&file_name=...&page=1&per_page=20`
///
/// # Query Parameters
///
/// - `repository_id` - Filter by repository
/// - `file_name` - Filter by file name
/// - `project_code` - Filter by project
/// - `page` - Page number (default: 1)
/// - `per_page` - Items per page (default: 20, max: 100)
///
/// # Response
///
/// - `200 OK` - List of entities with pagination metadata
#[tracing::instrument(
    skip(state, query),
    fields(
        repository_id = ?query.repository_id,
        file_name = ?query.file_name,
        page = ?query.page
    )
)]
async fn list_entities(
    State(state): State<FeatureState>,
    Query(query): Query<FindEntitiesQuery>,
) -> ApiResult<Response> {
    let (items, page_info) = find_entities::handle(state.store.as_ref(), query).await?;

    tracing::debug!(count = items.len(), total = page_info.total, "Entities listed via API");

    let meta = json!({ "pagination": page_info });

    Ok((StatusCode::OK, Json(ApiResponse::success_with_meta(items, meta))).into_response())
}

// ============================================================================
// Error Conversions
// ============================================================================

impl From<RegisterEntityError> for AppError {
    fn from(err: RegisterEntityError) -> Self {
        match err {
            RegisterEntityError::Store(e) => AppError::Store(e),
            validation => AppError::Validation(validation.to_string()),
        }
    }
}

impl From<get_entity::GetEntityError> for AppError {
    fn from(err: get_entity::GetEntityError) -> Self {
        match err {
            get_entity::GetEntityError::NotFound => {
                AppError::NotFound("Entity not found".to_string())
            },
            get_entity::GetEntityError::Store(e) => AppError::Store(e),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validation_errors_map_to_validation() {
        let err: AppError = RegisterEntityError::FileNameRequired.into();
        assert!(matches!(err, AppError::Validation(_)));
    }

    #[test]
    fn test_routes_structure() {
        let router = entities_routes();
        assert!(format!("{:?}", router).contains("Router"));
    }
}
