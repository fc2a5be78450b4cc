use sqlx::PgPool;
use tracing::instrument;
use uuid::Uuid;

use crate::utils::errors::AppError;

use super::model::{Concept, CreateConceptDto, UpdateConceptDto};

pub struct ConceptService;

impl ConceptService {
    #[instrument(skip(db, dto))]
    pub async fn create_concept(db: &PgPool, dto: CreateConceptDto) -> Result<Concept, AppError> {
        let existing: Option<Uuid> = sqlx::query_scalar("SELECT id FROM concepts WHERE name = $1")
            .bind(dto.name.trim())
            .fetch_optional(db)
            .await?;

        if existing.is_some() {
            return Err(AppError::bad_request(
                "A concept with this name already exists",
            ));
        }

        let concept = sqlx::query_as::<_, Concept>(
            "INSERT INTO concepts (name, category, description)
             VALUES ($1, $2, $3)
             RETURNING id, name, category, description, created_at",
        )
        .bind(dto.name.trim())
        .bind(dto.category.trim())
        .bind(dto.description.as_deref().map(str::trim))
        .fetch_one(db)
        .await?;

        Ok(concept)
    }

    #[instrument(skip(db))]
    pub async fn get_all_concepts(db: &PgPool) -> Result<Vec<Concept>, AppError> {
        let concepts = sqlx::query_as::<_, Concept>(
            "SELECT id, name, category, description, created_at FROM concepts
             ORDER BY category, name",
        )
        .fetch_all(db)
        .await?;

        Ok(concepts)
    }

    #[instrument(skip(db))]
    pub async fn get_concept_by_id(db: &PgPool, id: Uuid) -> Result<Concept, AppError> {
        sqlx::query_as::<_, Concept>(
            "SELECT id, name, category, description, created_at FROM concepts WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(db)
        .await?
        .ok_or_else(|| AppError::not_found("Concept not found"))
    }

    #[instrument(skip(db))]
    pub async fn get_concepts_by_category(
        db: &PgPool,
        category: &str,
    ) -> Result<Vec<Concept>, AppError> {
        let concepts = sqlx::query_as::<_, Concept>(
            "SELECT id, name, category, description, created_at FROM concepts
             WHERE category = $1
             ORDER BY name",
        )
        .bind(category)
        .fetch_all(db)
        .await?;

        Ok(concepts)
    }

    #[instrument(skip(db, dto))]
    pub async fn update_concept(
        db: &PgPool,
        id: Uuid,
        dto: UpdateConceptDto,
    ) -> Result<Concept, AppError> {
        let concept = sqlx::query_as::<_, Concept>(
            "UPDATE concepts
             SET name = COALESCE($2, name),
                 category = COALESCE($3, category),
                 description = COALESCE($4, description)
             WHERE id = $1
             RETURNING id, name, category, description, created_at",
        )
        .bind(id)
        .bind(dto.name.as_deref().map(str::trim))
        .bind(dto.category.as_deref().map(str::trim))
        .bind(dto.description.as_deref().map(str::trim))
        .fetch_optional(db)
        .await?
        .ok_or_else(|| AppError::not_found("Concept not found"))?;

        Ok(concept)
    }

    #[instrument(skip(db))]
    pub async fn delete_concept(db: &PgPool, id: Uuid) -> Result<(), AppError> {
        let question_count: i64 =
            sqlx::query_scalar("SELECT COUNT(*) FROM questions WHERE concept_id = $1")
                .bind(id)
                .fetch_one(db)
                .await?;

        if question_count > 0 {
            return Err(AppError::bad_request(
                "Cannot delete a concept that still has questions",
            ));
        }

        let result = sqlx::query("DELETE FROM concepts WHERE id = $1")
            .bind(id)
            .execute(db)
            .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::not_found("Concept not found"));
        }

        Ok(())
    }
}
