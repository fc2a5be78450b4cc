use rand::seq::SliceRandom;
use sqlx::PgPool;
use sqlx::types::Json;
use tracing::{instrument, warn};
use uuid::Uuid;

use crate::modules::questions::model::Question;
use crate::modules::questions::service::QuestionService;
use crate::modules::trends::model::ConceptRanking;
use crate::modules::trends::service::TrendAnalysisService;
use crate::utils::errors::AppError;

use super::model::{DifficultyDistribution, GenerateTestRequest, Test, TestQuestion};

pub const DEFAULT_QUESTION_COUNT: usize = 65;
pub const DEFAULT_DURATION_SECS: i32 = 10800; // 3 hours

const DISTRIBUTION_TOLERANCE: f64 = 1e-3;

pub fn validate_difficulty_distribution(
    distribution: &DifficultyDistribution,
) -> Result<(), AppError> {
    let shares = [distribution.easy, distribution.medium, distribution.hard];
    if shares.iter().any(|share| *share < 0.0 || *share > 1.0) {
        return Err(AppError::bad_request(
            "Difficulty shares must be between 0 and 1",
        ));
    }

    let sum: f64 = shares.iter().sum();
    if (sum - 1.0).abs() > DISTRIBUTION_TOLERANCE {
        return Err(AppError::bad_request(
            "Difficulty distribution must sum to 1",
        ));
    }

    Ok(())
}

/// Split `count` across difficulty tiers, giving rounding leftovers to the
/// medium tier.
pub fn difficulty_counts(count: usize, distribution: &DifficultyDistribution) -> (usize, usize, usize) {
    let easy = (count as f64 * distribution.easy).floor() as usize;
    let hard = (count as f64 * distribution.hard).floor() as usize;
    let medium = count - easy - hard;
    (easy, medium, hard)
}

/// Allocate question slots across concepts proportionally to importance,
/// assigning rounding leftovers to the highest-importance concepts first.
pub fn allocate_by_importance(rankings: &[ConceptRanking], count: usize) -> Vec<(Uuid, usize)> {
    let total_importance: f64 = rankings.iter().map(|r| r.importance).sum();

    if total_importance <= 0.0 {
        // Degenerate trend data: spread evenly.
        let base = count / rankings.len().max(1);
        let mut leftover = count - base * rankings.len().min(count);
        return rankings
            .iter()
            .map(|r| {
                let extra = if leftover > 0 {
                    leftover -= 1;
                    1
                } else {
                    0
                };
                (r.concept_id, base + extra)
            })
            .collect();
    }

    let mut allocations: Vec<(Uuid, usize, f64)> = rankings
        .iter()
        .map(|r| {
            let exact = count as f64 * r.importance / total_importance;
            (r.concept_id, exact.floor() as usize, exact.fract())
        })
        .collect();

    let assigned: usize = allocations.iter().map(|(_, n, _)| n).sum();
    let mut leftover = count.saturating_sub(assigned);

    // Highest fractional remainder first; rankings are already importance-ordered.
    let mut order: Vec<usize> = (0..allocations.len()).collect();
    order.sort_by(|a, b| {
        allocations[*b]
            .2
            .partial_cmp(&allocations[*a].2)
            .unwrap_or(std::cmp::Ordering::Equal)
    });

    for index in order {
        if leftover == 0 {
            break;
        }
        allocations[index].1 += 1;
        leftover -= 1;
    }

    allocations
        .into_iter()
        .map(|(concept_id, n, _)| (concept_id, n))
        .collect()
}

pub struct TestGenerationService;

impl TestGenerationService {
    /// Generate a randomized mock test driven by concept rankings.
    #[instrument(skip(db, config))]
    pub async fn generate_mock_test(
        db: &PgPool,
        config: GenerateTestRequest,
    ) -> Result<Test, AppError> {
        let question_count = config
            .question_count
            .map(|n| n as usize)
            .unwrap_or(DEFAULT_QUESTION_COUNT);
        if let Some(distribution) = &config.difficulty_distribution {
            validate_difficulty_distribution(distribution)?;
        }

        let rankings = TrendAnalysisService::get_concept_ranking(db).await?;
        if rankings.is_empty() {
            return Err(AppError::bad_request(
                "No trend data available. Please ensure questions have been added to the system.",
            ));
        }

        let relevant: Vec<ConceptRanking> = match &config.focus_concepts {
            Some(focus) if !focus.is_empty() => rankings
                .into_iter()
                .filter(|r| focus.contains(&r.concept_id))
                .collect(),
            _ => rankings,
        };

        if relevant.is_empty() {
            return Err(AppError::bad_request(
                "No questions available for the specified concepts.",
            ));
        }

        let concept_ids: Vec<Uuid> = relevant.iter().map(|r| r.concept_id).collect();

        let mut questions = Vec::with_capacity(question_count);
        match &config.difficulty_distribution {
            Some(distribution) => {
                let (easy, medium, hard) = difficulty_counts(question_count, distribution);
                for (difficulty, tier_count) in
                    [("easy", easy), ("medium", medium), ("hard", hard)]
                {
                    if tier_count == 0 {
                        continue;
                    }
                    let mut tier = Self::pick_questions(
                        db,
                        &concept_ids,
                        Some(difficulty),
                        tier_count,
                        &questions,
                    )
                    .await?;
                    questions.append(&mut tier);
                }
            }
            None => {
                // Weight concepts by importance so frequently-examined
                // topics dominate the paper.
                for (concept_id, slot_count) in allocate_by_importance(&relevant, question_count) {
                    if slot_count == 0 {
                        continue;
                    }
                    let mut picked = Self::pick_questions(
                        db,
                        &[concept_id],
                        None,
                        slot_count,
                        &questions,
                    )
                    .await?;
                    questions.append(&mut picked);
                }
            }
        }

        // Backfill any per-tier shortfall from the remaining pool.
        if questions.len() < question_count {
            let missing = question_count - questions.len();
            let mut filler =
                Self::pick_questions(db, &concept_ids, None, missing, &questions).await?;
            questions.append(&mut filler);
        }

        if questions.is_empty() {
            return Err(AppError::bad_request(
                "No questions available for the specified concepts.",
            ));
        }

        if questions.len() < question_count {
            warn!(
                requested = question_count,
                available = questions.len(),
                "Question pool smaller than requested test size"
            );
        }

        let mut question_ids: Vec<Uuid> = questions.iter().map(|q| q.id).collect();
        question_ids.shuffle(&mut rand::thread_rng());

        Self::create_test(db, question_ids).await
    }

    async fn pick_questions(
        db: &PgPool,
        concept_ids: &[Uuid],
        difficulty: Option<&str>,
        count: usize,
        already_selected: &[Question],
    ) -> Result<Vec<Question>, AppError> {
        let exclude: Vec<Uuid> = already_selected.iter().map(|q| q.id).collect();

        let questions = sqlx::query_as::<_, Question>(
            "SELECT id, content, options, correct_answer, explanation, concept_id,
                    sub_concept, difficulty, source, year_appeared, created_at, updated_at
             FROM questions
             WHERE concept_id = ANY($1)
               AND ($2::varchar IS NULL OR difficulty = $2)
               AND NOT (id = ANY($3))
             ORDER BY random()
             LIMIT $4",
        )
        .bind(concept_ids)
        .bind(difficulty)
        .bind(&exclude)
        .bind(count as i64)
        .fetch_all(db)
        .await?;

        Ok(questions)
    }

    async fn create_test(db: &PgPool, question_ids: Vec<Uuid>) -> Result<Test, AppError> {
        let total = question_ids.len() as i32;

        let test = sqlx::query_as::<_, Test>(
            "INSERT INTO tests (question_ids, total_questions, duration)
             VALUES ($1, $2, $3)
             RETURNING id, question_ids, total_questions, duration, created_at",
        )
        .bind(Json(&question_ids))
        .bind(total)
        .bind(DEFAULT_DURATION_SECS)
        .fetch_one(db)
        .await?;

        Ok(test)
    }

    #[instrument(skip(db))]
    pub async fn get_test(db: &PgPool, test_id: Uuid) -> Result<Test, AppError> {
        sqlx::query_as::<_, Test>(
            "SELECT id, question_ids, total_questions, duration, created_at
             FROM tests WHERE id = $1",
        )
        .bind(test_id)
        .fetch_optional(db)
        .await?
        .ok_or_else(|| AppError::not_found("Test not found"))
    }

    /// Questions for a test in test order, with answers and explanations
    /// stripped.
    #[instrument(skip(db))]
    pub async fn get_test_questions(
        db: &PgPool,
        test_id: Uuid,
    ) -> Result<Vec<TestQuestion>, AppError> {
        let test = Self::get_test(db, test_id).await?;
        let questions = QuestionService::get_questions_by_ids(db, &test.question_ids.0).await?;

        let mut by_id: std::collections::HashMap<Uuid, Question> =
            questions.into_iter().map(|q| (q.id, q)).collect();

        Ok(test
            .question_ids
            .0
            .iter()
            .filter_map(|id| by_id.remove(id))
            .map(TestQuestion::from)
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::modules::trends::model::YearlyDistribution;

    fn ranking(importance: f64) -> ConceptRanking {
        ConceptRanking {
            concept_id: Uuid::new_v4(),
            concept_name: "Concept".to_string(),
            rank: 1,
            frequency: importance,
            importance,
            yearly_distribution: YearlyDistribution::new(),
        }
    }

    #[test]
    fn test_default_distribution_is_valid() {
        assert!(validate_difficulty_distribution(&DifficultyDistribution::default()).is_ok());
    }

    #[test]
    fn test_distribution_must_sum_to_one() {
        let distribution = DifficultyDistribution {
            easy: 0.5,
            medium: 0.5,
            hard: 0.5,
        };
        assert!(validate_difficulty_distribution(&distribution).is_err());
    }

    #[test]
    fn test_distribution_rejects_negative_share() {
        let distribution = DifficultyDistribution {
            easy: -0.1,
            medium: 0.9,
            hard: 0.2,
        };
        assert!(validate_difficulty_distribution(&distribution).is_err());
    }

    #[test]
    fn test_difficulty_counts_cover_total() {
        let (easy, medium, hard) = difficulty_counts(65, &DifficultyDistribution::default());
        assert_eq!(easy + medium + hard, 65);
        assert_eq!(easy, 19); // floor(65 * 0.3)
        assert_eq!(hard, 13); // floor(65 * 0.2)
        assert_eq!(medium, 33);
    }

    #[test]
    fn test_allocation_sums_to_count() {
        let rankings = vec![ranking(0.5), ranking(0.3), ranking(0.2)];
        let allocations = allocate_by_importance(&rankings, 10);
        let total: usize = allocations.iter().map(|(_, n)| n).sum();
        assert_eq!(total, 10);
    }

    #[test]
    fn test_allocation_favors_important_concepts() {
        let rankings = vec![ranking(0.8), ranking(0.2)];
        let allocations = allocate_by_importance(&rankings, 10);
        assert!(allocations[0].1 > allocations[1].1);
    }

    #[test]
    fn test_allocation_handles_zero_importance() {
        let rankings = vec![ranking(0.0), ranking(0.0)];
        let allocations = allocate_by_importance(&rankings, 5);
        let total: usize = allocations.iter().map(|(_, n)| n).sum();
        assert_eq!(total, 5);
    }
}
