//! Register entity command
//!
//! The registration state machine: turn a `(repository_id, file_name,
//! project_code)` request into a persisted entity, guaranteeing at most one
//! entity per identity pair even under concurrent or repeated submission.

use mdr_common::{derive_entity_id, types::now_millis, Entity, RegisterEntityRequest};
use serde::{Deserialize, Serialize};

use crate::store::{EntityStore, StoreError};

/// Command to register a file entity
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RegisterEntityCommand {
    pub repository_id: String,
    pub file_name: String,
    pub project_code: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub access_level: Option<String>,
}

impl From<RegisterEntityRequest> for RegisterEntityCommand {
    fn from(request: RegisterEntityRequest) -> Self {
        Self {
            repository_id: request.repository_id,
            file_name: request.file_name,
            project_code: request.project_code,
            access_level: request.access_level,
        }
    }
}

/// Outcome of a registration.
///
/// `Duplicate` is a resolution signal, not a failure: it carries the
/// canonical record so the caller can adopt its id.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Registration {
    /// A new entity was persisted.
    Created(Entity),
    /// The identity pair was already registered; here is the existing record.
    Duplicate(Entity),
}

/// Error type for the register command
#[derive(Debug, thiserror::Error)]
pub enum RegisterEntityError {
    #[error("Repository id is required and cannot be empty")]
    RepositoryIdRequired,
    #[error("File name is required and cannot be empty")]
    FileNameRequired,
    #[error("File name must be a base name without path separators")]
    FileNameHasPath,
    #[error("Project code is required and cannot be empty")]
    ProjectCodeRequired,
    #[error("Store error: {0}")]
    Store(#[from] StoreError),
}

impl RegisterEntityCommand {
    pub fn validate(&self) -> Result<(), RegisterEntityError> {
        if self.repository_id.trim().is_empty() {
            return Err(RegisterEntityError::RepositoryIdRequired);
        }
        if self.file_name.trim().is_empty() {
            return Err(RegisterEntityError::FileNameRequired);
        }
        if self.file_name.contains('/') || self.file_name.contains('\\') {
            return Err(RegisterEntityError::FileNameHasPath);
        }
        if self.project_code.trim().is_empty() {
            return Err(RegisterEntityError::ProjectCodeRequired);
        }
        Ok(())
    }
}

/// Execute a registration.
///
/// The identity lookup and the write are not one atomic transaction. Two
/// concurrent registrations of the same identity can both miss the lookup;
/// both then derive the same id, and `save` upserts by id, so the race
/// collapses onto a single record instead of producing a duplicate.
#[tracing::instrument(skip(store), fields(repository_id = %command.repository_id, file_name = %command.file_name))]
pub async fn handle(
    store: &dyn EntityStore,
    command: RegisterEntityCommand,
) -> Result<Registration, RegisterEntityError> {
    command.validate()?;

    if let Some(existing) = store
        .find_by_identity(&command.repository_id, &command.file_name)
        .await?
    {
        tracing::info!(id = %existing.id, "Entity already registered");
        return Ok(Registration::Duplicate(existing));
    }

    let entity = Entity {
        id: derive_entity_id(&command.repository_id, &command.file_name),
        repository_id: command.repository_id,
        file_name: command.file_name,
        project_code: command.project_code,
        access_level: command.access_level,
        created_time: now_millis(),
    };

    let saved = store.save(entity).await?;
    tracing::info!(id = %saved.id, "Registered entity");

    Ok(Registration::Created(saved))
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use crate::store::MemoryEntityStore;

    fn command(repository_id: &str, file_name: &str) -> RegisterEntityCommand {
        RegisterEntityCommand {
            repository_id: repository_id.to_string(),
            file_name: file_name.to_string(),
            project_code: "PACA-CA".to_string(),
            access_level: Some("controlled".to_string()),
        }
    }

    #[test]
    fn test_validation_success() {
        assert!(command("repo", "sample.bam").validate().is_ok());
    }

    #[test]
    fn test_validation_empty_repository_id() {
        assert!(matches!(
            command("  ", "sample.bam").validate(),
            Err(RegisterEntityError::RepositoryIdRequired)
        ));
    }

    #[test]
    fn test_validation_empty_file_name() {
        assert!(matches!(
            command("repo", "").validate(),
            Err(RegisterEntityError::FileNameRequired)
        ));
    }

    #[test]
    fn test_validation_rejects_paths() {
        assert!(matches!(
            command("repo", "data/sample.bam").validate(),
            Err(RegisterEntityError::FileNameHasPath)
        ));
    }

    #[test]
    fn test_validation_empty_project_code() {
        let mut cmd = command("repo", "sample.bam");
        cmd.project_code = String::new();
        assert!(matches!(
            cmd.validate(),
            Err(RegisterEntityError::ProjectCodeRequired)
        ));
    }

    #[tokio::test]
    async fn test_register_creates_entity_with_derived_id() {
        let store = MemoryEntityStore::new();

        let result = handle(&store, command("repo", "sample.bam")).await.unwrap();
        let Registration::Created(entity) = result else {
            panic!("expected Created");
        };

        assert_eq!(entity.id, derive_entity_id("repo", "sample.bam"));
        assert!(entity.created_time > 0);
    }

    #[tokio::test]
    async fn test_register_twice_signals_duplicate_with_same_id() {
        let store = MemoryEntityStore::new();

        let first = handle(&store, command("repo", "sample.bam")).await.unwrap();
        let Registration::Created(created) = first else {
            panic!("expected Created");
        };

        let second = handle(&store, command("repo", "sample.bam")).await.unwrap();
        let Registration::Duplicate(existing) = second else {
            panic!("expected Duplicate");
        };

        assert_eq!(existing.id, created.id);
        assert_eq!(existing.created_time, created.created_time);
    }

    #[tokio::test]
    async fn test_register_distinct_identities_yield_distinct_entities() {
        let store = MemoryEntityStore::new();

        let a = handle(&store, command("repo", "a.bam")).await.unwrap();
        let b = handle(&store, command("repo", "b.bam")).await.unwrap();

        let (Registration::Created(a), Registration::Created(b)) = (a, b) else {
            panic!("expected two Created outcomes");
        };
        assert_ne!(a.id, b.id);
    }

    #[tokio::test]
    async fn test_register_replay_after_lost_ack_converges() {
        // A client that crashed after the store write re-registers; the
        // store already holds the derived id so the replay adopts it.
        let store = MemoryEntityStore::new();
        let cmd = command("repo", "sample.bam");

        let first = handle(&store, cmd.clone()).await.unwrap();
        let replay = handle(&store, cmd).await.unwrap();

        let id_of = |r: Registration| match r {
            Registration::Created(e) | Registration::Duplicate(e) => e.id,
        };
        assert_eq!(id_of(first), id_of(replay));
    }
}
