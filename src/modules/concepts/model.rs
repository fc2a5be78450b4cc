use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

/// A syllabus concept questions are tagged with.
#[derive(Serialize, Deserialize, FromRow, Debug, Clone, PartialEq, ToSchema)]
pub struct Concept {
    pub id: Uuid,
    pub name: String,
    pub category: String,
    pub description: Option<String>,
    pub created_at: chrono::DateTime<chrono::Utc>,
}

#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct CreateConceptDto {
    #[validate(length(min = 1, message = "Name is required"))]
    pub name: String,
    #[validate(length(min = 1, message = "Category is required"))]
    pub category: String,
    pub description: Option<String>,
}

#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct UpdateConceptDto {
    #[validate(length(min = 1, message = "Name is required"))]
    pub name: Option<String>,
    #[validate(length(min = 1, message = "Category is required"))]
    pub category: Option<String>,
    pub description: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use validator::Validate;

    #[test]
    fn test_create_concept_dto_requires_name_and_category() {
        let dto = CreateConceptDto {
            name: "".to_string(),
            category: "Algorithms".to_string(),
            description: None,
        };
        assert!(dto.validate().is_err());

        let dto = CreateConceptDto {
            name: "Graph Theory".to_string(),
            category: "".to_string(),
            description: None,
        };
        assert!(dto.validate().is_err());

        let dto = CreateConceptDto {
            name: "Graph Theory".to_string(),
            category: "Algorithms".to_string(),
            description: Some("Paths, trees and flows".to_string()),
        };
        assert!(dto.validate().is_ok());
    }
}
