//! PostgreSQL entity store

use async_trait::async_trait;
use mdr_common::Entity;
use sqlx::{PgPool, Postgres, QueryBuilder};

use super::{EntityCriteria, EntityStore, PageRequest, StoreError};

const ENTITY_COLUMNS: &str =
    "id, repository_id, file_name, project_code, access_level, created_time";

/// Entity store backed by the `entities` table.
pub struct PgEntityStore {
    pool: PgPool,
}

impl PgEntityStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(Debug, sqlx::FromRow)]
struct EntityRow {
    id: String,
    repository_id: String,
    file_name: String,
    project_code: String,
    access_level: Option<String>,
    created_time: i64,
}

impl From<EntityRow> for Entity {
    fn from(row: EntityRow) -> Self {
        Entity {
            id: row.id,
            repository_id: row.repository_id,
            file_name: row.file_name,
            project_code: row.project_code,
            access_level: row.access_level,
            created_time: row.created_time,
        }
    }
}

/// Append `WHERE`/`AND` clauses for every set criteria field.
fn push_criteria<'a>(builder: &mut QueryBuilder<'a, Postgres>, criteria: &'a EntityCriteria) {
    let mut keyword = " WHERE ";

    if let Some(ref repository_id) = criteria.repository_id {
        builder.push(keyword).push("repository_id = ").push_bind(repository_id);
        keyword = " AND ";
    }
    if let Some(ref file_name) = criteria.file_name {
        builder.push(keyword).push("file_name = ").push_bind(file_name);
        keyword = " AND ";
    }
    if let Some(ref project_code) = criteria.project_code {
        builder.push(keyword).push("project_code = ").push_bind(project_code);
    }
}

#[async_trait]
impl EntityStore for PgEntityStore {
    async fn find_by_id(&self, id: &str) -> Result<Option<Entity>, StoreError> {
        let row = sqlx::query_as::<_, EntityRow>(&format!(
            "SELECT {ENTITY_COLUMNS} FROM entities WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(Entity::from))
    }

    async fn find_by_identity(
        &self,
        repository_id: &str,
        file_name: &str,
    ) -> Result<Option<Entity>, StoreError> {
        let row = sqlx::query_as::<_, EntityRow>(&format!(
            "SELECT {ENTITY_COLUMNS} FROM entities WHERE repository_id = $1 AND file_name = $2"
        ))
        .bind(repository_id)
        .bind(file_name)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(Entity::from))
    }

    async fn save(&self, entity: Entity) -> Result<Entity, StoreError> {
        // First write wins: a replay with an existing id leaves the stored
        // record (including created_time) untouched and returns it.
        sqlx::query(
            r#"
            INSERT INTO entities
                (id, repository_id, file_name, project_code, access_level, created_time)
            VALUES ($1, $2, $3, $4, $5, $6)
            ON CONFLICT (id) DO NOTHING
            "#,
        )
        .bind(&entity.id)
        .bind(&entity.repository_id)
        .bind(&entity.file_name)
        .bind(&entity.project_code)
        .bind(&entity.access_level)
        .bind(entity.created_time)
        .execute(&self.pool)
        .await?;

        let row = sqlx::query_as::<_, EntityRow>(&format!(
            "SELECT {ENTITY_COLUMNS} FROM entities WHERE id = $1"
        ))
        .bind(&entity.id)
        .fetch_one(&self.pool)
        .await?;

        Ok(row.into())
    }

    async fn exists(&self, id: &str) -> Result<bool, StoreError> {
        let found: Option<i32> = sqlx::query_scalar("SELECT 1 FROM entities WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(found.is_some())
    }

    async fn find(
        &self,
        criteria: &EntityCriteria,
        page: PageRequest,
    ) -> Result<(Vec<Entity>, i64), StoreError> {
        let mut count_builder: QueryBuilder<Postgres> =
            QueryBuilder::new("SELECT COUNT(*) FROM entities");
        push_criteria(&mut count_builder, criteria);

        let total: i64 = count_builder
            .build_query_scalar()
            .fetch_one(&self.pool)
            .await?;

        let mut builder: QueryBuilder<Postgres> =
            QueryBuilder::new(format!("SELECT {ENTITY_COLUMNS} FROM entities"));
        push_criteria(&mut builder, criteria);
        builder
            .push(" ORDER BY id")
            .push(" LIMIT ")
            .push_bind(page.per_page)
            .push(" OFFSET ")
            .push_bind(page.offset());

        let rows: Vec<EntityRow> = builder.build_query_as().fetch_all(&self.pool).await?;

        Ok((rows.into_iter().map(Entity::from).collect(), total))
    }

    async fn ping(&self) -> Result<(), StoreError> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }
}
