//! HTTP API client for the MDR server
//!
//! Translates HTTP responses into registration outcomes and classified
//! faults. The retry policy never inspects HTTP; everything it needs is in
//! the `Fault` returned here.

use async_trait::async_trait;
use mdr_common::{Entity, RegisterEntityRequest, ENTITY_ID_HEADER};
use reqwest::{Client, StatusCode};
use serde::Deserialize;
use std::time::Duration;

use crate::error::Result;
use crate::retry::Fault;

// ============================================================================
// API Client Constants
// ============================================================================

/// Default timeout for API requests in seconds.
/// Can be overridden via MDR_API_TIMEOUT_SECS environment variable.
pub const DEFAULT_API_TIMEOUT_SECS: u64 = 30;

/// Default MDR server URL when not specified via environment variable.
pub const DEFAULT_SERVER_URL: &str = "http://localhost:8000";

/// Success envelope returned by the server
#[derive(Debug, Deserialize)]
struct ApiEnvelope<T> {
    data: T,
}

/// Error envelope returned by the server
#[derive(Debug, Deserialize)]
struct ErrorEnvelope {
    error: ErrorDetail,
}

#[derive(Debug, Deserialize)]
struct ErrorDetail {
    message: String,
}

/// Outcome of a single registration request
#[derive(Debug, Clone, PartialEq)]
pub enum RegisterOutcome {
    /// The server created a new entity
    Created(Entity),
    /// The identity was already registered; the server returned its id
    Duplicate { entity_id: String },
}

/// Transport seam for registration requests.
///
/// The registration client talks to this trait so tests can script outcomes
/// without a server.
#[async_trait]
pub trait RegistrationTransport: Send + Sync {
    async fn register(
        &self,
        request: &RegisterEntityRequest,
    ) -> std::result::Result<RegisterOutcome, Fault>;
}

/// API client for the MDR server
pub struct ApiClient {
    client: Client,
    base_url: String,
}

impl ApiClient {
    /// Create a new API client
    pub fn new(base_url: String) -> Result<Self> {
        let timeout_secs = std::env::var("MDR_API_TIMEOUT_SECS")
            .ok()
            .and_then(|s| s.parse().ok())
            .unwrap_or(DEFAULT_API_TIMEOUT_SECS);

        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .build()?;

        Ok(Self { client, base_url })
    }

    /// Create from environment variables
    pub fn from_env() -> Result<Self> {
        let base_url =
            std::env::var("MDR_SERVER_URL").unwrap_or_else(|_| DEFAULT_SERVER_URL.to_string());

        Self::new(base_url)
    }

    /// Check server health
    pub async fn health_check(&self) -> Result<bool> {
        let url = format!("{}/health", self.base_url);

        match self.client.get(&url).send().await {
            Ok(response) => Ok(response.status().is_success()),
            Err(_) => Ok(false),
        }
    }

    /// Register an entity, classifying the response for the retry policy.
    pub async fn register_entity(
        &self,
        request: &RegisterEntityRequest,
    ) -> std::result::Result<RegisterOutcome, Fault> {
        let url = format!("{}/api/v1/entities", self.base_url);

        let response = match self.client.post(&url).json(request).send().await {
            Ok(response) => response,
            Err(e) if e.is_timeout() => return Err(Fault::Timeout),
            Err(e) => return Err(Fault::Other(e.to_string())),
        };

        let status = response.status();

        if status.is_success() {
            let envelope: ApiEnvelope<Entity> = response
                .json()
                .await
                .map_err(|e| Fault::Other(format!("invalid success body: {}", e)))?;
            return Ok(RegisterOutcome::Created(envelope.data));
        }

        if status == StatusCode::CONFLICT {
            // The existing entity's id travels in a response header; a 409
            // without it cannot be resolved, so it is a fatal fault.
            return match response
                .headers()
                .get(ENTITY_ID_HEADER)
                .and_then(|v| v.to_str().ok())
            {
                Some(id) => Ok(RegisterOutcome::Duplicate {
                    entity_id: id.to_string(),
                }),
                None => Err(Fault::Client {
                    status: status.as_u16(),
                    message: "conflict response is missing the entity-id header".to_string(),
                }),
            };
        }

        if status == StatusCode::SERVICE_UNAVAILABLE {
            return Err(Fault::ServiceUnavailable);
        }

        let message = error_message(response).await;

        if status.is_client_error() {
            Err(Fault::Client {
                status: status.as_u16(),
                message,
            })
        } else {
            Err(Fault::Other(format!("unexpected status {}: {}", status, message)))
        }
    }

    /// Get the base URL
    pub fn base_url(&self) -> &str {
        &self.base_url
    }
}

/// Best-effort extraction of the server's error message.
async fn error_message(response: reqwest::Response) -> String {
    match response.json::<ErrorEnvelope>().await {
        Ok(envelope) => envelope.error.message,
        Err(_) => "no error detail provided".to_string(),
    }
}

#[async_trait]
impl RegistrationTransport for ApiClient {
    async fn register(
        &self,
        request: &RegisterEntityRequest,
    ) -> std::result::Result<RegisterOutcome, Fault> {
        self.register_entity(request).await
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use serde_json::json;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn request() -> RegisterEntityRequest {
        RegisterEntityRequest {
            repository_id: "repo-1".to_string(),
            file_name: "sample.bam".to_string(),
            project_code: "PACA-CA".to_string(),
            access_level: None,
        }
    }

    fn entity_json() -> serde_json::Value {
        json!({
            "id": "some-id",
            "repository_id": "repo-1",
            "file_name": "sample.bam",
            "project_code": "PACA-CA",
            "created_time": 1700000000000i64
        })
    }

    async fn client_for(server: &MockServer) -> ApiClient {
        ApiClient::new(server.uri()).unwrap()
    }

    #[tokio::test]
    async fn test_created_response_yields_entity() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/v1/entities"))
            .respond_with(
                ResponseTemplate::new(201).set_body_json(json!({
                    "success": true,
                    "data": entity_json()
                })),
            )
            .mount(&server)
            .await;

        let outcome = client_for(&server).await.register_entity(&request()).await.unwrap();

        match outcome {
            RegisterOutcome::Created(entity) => assert_eq!(entity.id, "some-id"),
            other => panic!("expected Created, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_conflict_adopts_id_from_header() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/v1/entities"))
            .respond_with(
                ResponseTemplate::new(409)
                    .insert_header(ENTITY_ID_HEADER, "existing-id")
                    .set_body_json(json!({
                        "success": false,
                        "error": { "code": "CONFLICT", "message": "already registered" }
                    })),
            )
            .mount(&server)
            .await;

        let outcome = client_for(&server).await.register_entity(&request()).await.unwrap();

        assert_eq!(
            outcome,
            RegisterOutcome::Duplicate {
                entity_id: "existing-id".to_string()
            }
        );
    }

    #[tokio::test]
    async fn test_conflict_without_header_is_fatal() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/v1/entities"))
            .respond_with(ResponseTemplate::new(409))
            .mount(&server)
            .await;

        let result = client_for(&server).await.register_entity(&request()).await;

        assert!(matches!(result, Err(Fault::Client { status: 409, .. })));
    }

    #[tokio::test]
    async fn test_service_unavailable_is_retryable_fault() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/v1/entities"))
            .respond_with(ResponseTemplate::new(503))
            .mount(&server)
            .await;

        let result = client_for(&server).await.register_entity(&request()).await;

        assert_eq!(result, Err(Fault::ServiceUnavailable));
    }

    #[tokio::test]
    async fn test_validation_failure_carries_server_message() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/v1/entities"))
            .respond_with(ResponseTemplate::new(422).set_body_json(json!({
                "success": false,
                "error": { "code": "VALIDATION_ERROR", "message": "File name is required" }
            })))
            .mount(&server)
            .await;

        let result = client_for(&server).await.register_entity(&request()).await;

        match result {
            Err(Fault::Client { status, message }) => {
                assert_eq!(status, 422);
                assert_eq!(message, "File name is required");
            },
            other => panic!("expected client fault, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_health_check() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/health"))
            .respond_with(ResponseTemplate::new(200))
            .mount(&server)
            .await;

        assert!(client_for(&server).await.health_check().await.unwrap());
    }
}
