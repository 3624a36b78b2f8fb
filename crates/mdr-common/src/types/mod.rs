//! Shared domain types for the metadata registry
//!
//! The central type is [`Entity`]: the persisted record binding a file
//! identity (`repository_id` + `file_name`) to a durable object id. Both the
//! server and the client exchange entities as JSON over the registration API.

use chrono::Utc;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Response header carrying the existing entity id on a duplicate
/// registration (409 Conflict). The client resolves duplicates from this
/// header without a second lookup round-trip.
pub const ENTITY_ID_HEADER: &str = "entity-id";

/// Namespace for version-5 entity id derivation.
///
/// Changing this value changes every derived id, so it must stay fixed for
/// the lifetime of the registry.
pub const ENTITY_ID_NAMESPACE: Uuid = Uuid::from_u128(0x1b67_1a64_40d5_491e_99b0_da01_ff1f_3341);

/// A registered file entity.
///
/// `id` is derived from the identity fields (see [`derive_entity_id`]) and is
/// immutable once assigned. `created_time` is epoch milliseconds, stamped at
/// creation and never updated.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Entity {
    pub id: String,
    pub repository_id: String,
    pub file_name: String,
    pub project_code: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub access_level: Option<String>,
    pub created_time: i64,
}

/// Registration request body sent by the client.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegisterEntityRequest {
    pub repository_id: String,
    pub file_name: String,
    pub project_code: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub access_level: Option<String>,
}

/// Derive the object id for a file identity.
///
/// The id is an RFC 4122 version-5 UUID of `repository_id + "/" + file_name`
/// against [`ENTITY_ID_NAMESPACE`]. Derivation is a pure function of the
/// identity fields: replaying the same registration after a crash produces
/// the same id, which is what makes concurrent duplicate registration safe
/// (two racers compute the same id and the store write is an upsert).
pub fn derive_entity_id(repository_id: &str, file_name: &str) -> String {
    let name = format!("{}/{}", repository_id, file_name);
    Uuid::new_v5(&ENTITY_ID_NAMESPACE, name.as_bytes()).to_string()
}

/// Current time as epoch milliseconds, the unit used by `created_time`.
pub fn now_millis() -> i64 {
    Utc::now().timestamp_millis()
}
