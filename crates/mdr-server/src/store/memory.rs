//! In-memory entity store
//!
//! Used by tests and for local runs without a database
//! (`MDR_STORE_BACKEND=memory`). Semantics match the PostgreSQL store:
//! upsert-by-id where the first write wins, id-ordered listings.

use std::collections::HashMap;
use std::sync::RwLock;

use async_trait::async_trait;
use mdr_common::Entity;

use super::{EntityCriteria, EntityStore, PageRequest, StoreError};

/// HashMap-backed entity store.
#[derive(Default)]
pub struct MemoryEntityStore {
    entities: RwLock<HashMap<String, Entity>>,
}

impl MemoryEntityStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock_poisoned() -> StoreError {
        StoreError::Backend("entity map lock poisoned".to_string())
    }
}

fn matches(entity: &Entity, criteria: &EntityCriteria) -> bool {
    criteria
        .repository_id
        .as_ref()
        .is_none_or(|v| *v == entity.repository_id)
        && criteria
            .file_name
            .as_ref()
            .is_none_or(|v| *v == entity.file_name)
        && criteria
            .project_code
            .as_ref()
            .is_none_or(|v| *v == entity.project_code)
}

#[async_trait]
impl EntityStore for MemoryEntityStore {
    async fn find_by_id(&self, id: &str) -> Result<Option<Entity>, StoreError> {
        let entities = self.entities.read().map_err(|_| Self::lock_poisoned())?;
        Ok(entities.get(id).cloned())
    }

    async fn find_by_identity(
        &self,
        repository_id: &str,
        file_name: &str,
    ) -> Result<Option<Entity>, StoreError> {
        let entities = self.entities.read().map_err(|_| Self::lock_poisoned())?;
        Ok(entities
            .values()
            .find(|e| e.repository_id == repository_id && e.file_name == file_name)
            .cloned())
    }

    async fn save(&self, entity: Entity) -> Result<Entity, StoreError> {
        let mut entities = self.entities.write().map_err(|_| Self::lock_poisoned())?;
        let stored = entities.entry(entity.id.clone()).or_insert(entity);
        Ok(stored.clone())
    }

    async fn exists(&self, id: &str) -> Result<bool, StoreError> {
        let entities = self.entities.read().map_err(|_| Self::lock_poisoned())?;
        Ok(entities.contains_key(id))
    }

    async fn find(
        &self,
        criteria: &EntityCriteria,
        page: PageRequest,
    ) -> Result<(Vec<Entity>, i64), StoreError> {
        let entities = self.entities.read().map_err(|_| Self::lock_poisoned())?;

        let mut matching: Vec<Entity> = entities
            .values()
            .filter(|e| matches(e, criteria))
            .cloned()
            .collect();
        matching.sort_by(|a, b| a.id.cmp(&b.id));

        let total = matching.len() as i64;
        let items = matching
            .into_iter()
            .skip(page.offset().max(0) as usize)
            .take(page.per_page.max(0) as usize)
            .collect();

        Ok((items, total))
    }

    async fn ping(&self) -> Result<(), StoreError> {
        Ok(())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use mdr_common::derive_entity_id;

    fn entity(repository_id: &str, file_name: &str, created_time: i64) -> Entity {
        Entity {
            id: derive_entity_id(repository_id, file_name),
            repository_id: repository_id.to_string(),
            file_name: file_name.to_string(),
            project_code: "PACA-CA".to_string(),
            access_level: Some("controlled".to_string()),
            created_time,
        }
    }

    #[tokio::test]
    async fn test_save_and_find_by_id() {
        let store = MemoryEntityStore::new();
        let saved = store.save(entity("repo", "a.bam", 1)).await.unwrap();

        let found = store.find_by_id(&saved.id).await.unwrap();
        assert_eq!(found, Some(saved));
    }

    #[tokio::test]
    async fn test_save_replay_keeps_first_write() {
        let store = MemoryEntityStore::new();
        let first = store.save(entity("repo", "a.bam", 1)).await.unwrap();
        let replayed = store.save(entity("repo", "a.bam", 999)).await.unwrap();

        assert_eq!(replayed.created_time, first.created_time);
    }

    #[tokio::test]
    async fn test_find_by_identity() {
        let store = MemoryEntityStore::new();
        store.save(entity("repo", "a.bam", 1)).await.unwrap();
        store.save(entity("repo", "b.bam", 2)).await.unwrap();

        let found = store.find_by_identity("repo", "b.bam").await.unwrap();
        assert_eq!(found.map(|e| e.file_name), Some("b.bam".to_string()));

        let missing = store.find_by_identity("repo", "c.bam").await.unwrap();
        assert!(missing.is_none());
    }

    #[tokio::test]
    async fn test_find_filters_are_conjunctive_wildcards() {
        let store = MemoryEntityStore::new();
        store.save(entity("repo-1", "a.bam", 1)).await.unwrap();
        store.save(entity("repo-1", "b.bam", 2)).await.unwrap();
        store.save(entity("repo-2", "a.bam", 3)).await.unwrap();

        let page = PageRequest { page: 1, per_page: 20 };

        let (all, total) = store.find(&EntityCriteria::default(), page).await.unwrap();
        assert_eq!(total, 3);
        assert_eq!(all.len(), 3);

        let criteria = EntityCriteria {
            repository_id: Some("repo-1".to_string()),
            file_name: Some("a.bam".to_string()),
            ..Default::default()
        };
        let (items, total) = store.find(&criteria, page).await.unwrap();
        assert_eq!(total, 1);
        assert_eq!(items[0].repository_id, "repo-1");
        assert_eq!(items[0].file_name, "a.bam");
    }

    #[tokio::test]
    async fn test_find_pages_are_id_ordered() {
        let store = MemoryEntityStore::new();
        for i in 0..5 {
            store
                .save(entity("repo", &format!("file-{i}.bam"), i))
                .await
                .unwrap();
        }

        let first = store
            .find(&EntityCriteria::default(), PageRequest { page: 1, per_page: 2 })
            .await
            .unwrap();
        let second = store
            .find(&EntityCriteria::default(), PageRequest { page: 2, per_page: 2 })
            .await
            .unwrap();

        assert_eq!(first.1, 5);
        assert_eq!(first.0.len(), 2);
        assert_eq!(second.0.len(), 2);
        assert!(first.0[1].id < second.0[0].id);
    }
}
