//! Batch registration driver
//!
//! Registers manifest entries one at a time, in input order, writing the
//! assigned (or adopted) object id back into each entry. Every request goes
//! through the retry policy; a fatal fault or exhausted retries aborts the
//! whole batch, because an output manifest missing entries is worse than no
//! manifest at all.

use colored::Colorize;
use mdr_common::RegisterEntityRequest;

use crate::api::{RegisterOutcome, RegistrationTransport};
use crate::error::Result;
use crate::manifest::ManifestEntry;
use crate::retry::RetryPolicy;

/// Drives registration of a batch of manifest entries
pub struct RegistrationClient<T> {
    transport: T,
    policy: RetryPolicy,
}

impl<T: RegistrationTransport> RegistrationClient<T> {
    pub fn new(transport: T, policy: RetryPolicy) -> Self {
        Self { transport, policy }
    }

    /// Register every entry, filling in `object_id` as it goes.
    ///
    /// Entries are processed in order; the first unrecoverable failure
    /// aborts the batch with an error naming the entry.
    pub async fn register_all(&self, entries: &mut [ManifestEntry]) -> Result<()> {
        let total = entries.len();

        for (index, entry) in entries.iter_mut().enumerate() {
            let request = RegisterEntityRequest {
                repository_id: entry.repository_id.clone(),
                file_name: entry.base_name().to_string(),
                project_code: entry.project_code.clone(),
                access_level: entry.access.clone(),
            };

            let outcome = self
                .policy
                .execute(|| self.transport.register(&request))
                .await
                .map_err(|e| {
                    tracing::error!(file = %request.file_name, error = %e, "Aborting batch");
                    anyhow::anyhow!("Failed to register '{}': {}", request.file_name, e)
                })?;

            let object_id = match outcome {
                RegisterOutcome::Created(entity) => {
                    tracing::info!(id = %entity.id, file = %entity.file_name, "Registered");
                    entity.id
                },
                RegisterOutcome::Duplicate { entity_id } => {
                    tracing::info!(id = %entity_id, file = %request.file_name, "Already registered, adopting id");
                    entity_id
                },
            };

            entry.object_id = Some(object_id);

            println!(
                "[{}/{}] {} {}",
                index + 1,
                total,
                "Registered".green(),
                entry.file_name
            );
        }

        Ok(())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use crate::retry::Fault;
    use async_trait::async_trait;
    use mdr_common::{derive_entity_id, Entity};
    use std::collections::VecDeque;
    use std::sync::Mutex;

    /// Transport that replays a fixed script of outcomes
    struct ScriptedTransport {
        outcomes: Mutex<VecDeque<std::result::Result<RegisterOutcome, Fault>>>,
        requests: Mutex<Vec<RegisterEntityRequest>>,
    }

    impl ScriptedTransport {
        fn new(outcomes: Vec<std::result::Result<RegisterOutcome, Fault>>) -> Self {
            Self {
                outcomes: Mutex::new(outcomes.into()),
                requests: Mutex::new(Vec::new()),
            }
        }

        fn requests(&self) -> Vec<RegisterEntityRequest> {
            self.requests.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl RegistrationTransport for ScriptedTransport {
        async fn register(
            &self,
            request: &RegisterEntityRequest,
        ) -> std::result::Result<RegisterOutcome, Fault> {
            self.requests.lock().unwrap().push(request.clone());
            self.outcomes
                .lock()
                .unwrap()
                .pop_front()
                .unwrap_or(Err(Fault::Other("script exhausted".to_string())))
        }
    }

    fn entry(file_name: &str) -> ManifestEntry {
        ManifestEntry {
            repository_id: "repo".to_string(),
            project_code: "PACA-CA".to_string(),
            file_name: file_name.to_string(),
            md5: "abc".to_string(),
            access: None,
            object_id: None,
        }
    }

    fn created(file_name: &str) -> std::result::Result<RegisterOutcome, Fault> {
        Ok(RegisterOutcome::Created(Entity {
            id: derive_entity_id("repo", file_name),
            repository_id: "repo".to_string(),
            file_name: file_name.to_string(),
            project_code: "PACA-CA".to_string(),
            access_level: None,
            created_time: 1,
        }))
    }

    #[tokio::test]
    async fn test_registers_in_order_and_fills_object_ids() {
        let transport = ScriptedTransport::new(vec![created("a.bam"), created("b.bam")]);
        let client = RegistrationClient::new(transport, RetryPolicy::new(0, 1, 2.0));
        let mut entries = vec![entry("a.bam"), entry("b.bam")];

        client.register_all(&mut entries).await.unwrap();

        assert_eq!(entries[0].object_id.as_deref(), Some(derive_entity_id("repo", "a.bam").as_str()));
        assert_eq!(entries[1].object_id.as_deref(), Some(derive_entity_id("repo", "b.bam").as_str()));
    }

    #[tokio::test]
    async fn test_strips_paths_before_registering() {
        let transport = ScriptedTransport::new(vec![created("sample.bam")]);
        let client = RegistrationClient::new(transport, RetryPolicy::new(0, 1, 2.0));
        let mut entries = vec![entry("data/run-1/sample.bam")];

        client.register_all(&mut entries).await.unwrap();

        let requests = client.transport.requests();
        assert_eq!(requests[0].file_name, "sample.bam");
        // The manifest keeps the original path for the output file.
        assert_eq!(entries[0].file_name, "data/run-1/sample.bam");
    }

    #[tokio::test]
    async fn test_duplicate_adopts_existing_id() {
        let transport = ScriptedTransport::new(vec![Ok(RegisterOutcome::Duplicate {
            entity_id: "existing-id".to_string(),
        })]);
        let client = RegistrationClient::new(transport, RetryPolicy::new(0, 1, 2.0));
        let mut entries = vec![entry("a.bam")];

        client.register_all(&mut entries).await.unwrap();

        assert_eq!(entries[0].object_id.as_deref(), Some("existing-id"));
    }

    #[tokio::test(start_paused = true)]
    async fn test_transient_fault_is_retried_within_entry() {
        let transport = ScriptedTransport::new(vec![
            Err(Fault::ServiceUnavailable),
            created("a.bam"),
        ]);
        let client = RegistrationClient::new(transport, RetryPolicy::new(5, 100, 2.0));
        let mut entries = vec![entry("a.bam")];

        client.register_all(&mut entries).await.unwrap();

        assert_eq!(client.transport.requests().len(), 2);
        assert!(entries[0].object_id.is_some());
    }

    #[tokio::test]
    async fn test_fatal_fault_aborts_batch_naming_entry() {
        let transport = ScriptedTransport::new(vec![
            created("a.bam"),
            Err(Fault::Client {
                status: 422,
                message: "Project code is required".to_string(),
            }),
        ]);
        let client = RegistrationClient::new(transport, RetryPolicy::new(5, 1, 2.0));
        let mut entries = vec![entry("a.bam"), entry("b.bam"), entry("c.bam")];

        let err = client.register_all(&mut entries).await.unwrap_err();

        assert!(err.to_string().contains("b.bam"));
        assert!(entries[0].object_id.is_some());
        assert!(entries[1].object_id.is_none());
        assert!(entries[2].object_id.is_none());
        // The failing entry was the last request; c.bam was never attempted.
        assert_eq!(client.transport.requests().len(), 2);
    }
}
