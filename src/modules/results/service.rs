use std::collections::HashMap;

use sqlx::PgPool;
use sqlx::types::Json;
use tracing::instrument;
use uuid::Uuid;

use crate::modules::sessions::model::SessionStatus;
use crate::utils::errors::AppError;
use crate::utils::pagination::PaginationParams;

use super::model::{
    ConceptPerformance, ConceptWeakness, Feedback, Recommendation, RecommendationPriority,
    TestResult,
};

/// Accuracy below this marks a concept as weak.
pub const WEAK_CONCEPT_THRESHOLD: f64 = 0.6;
/// Accuracy at or above this marks a concept as a strength.
pub const STRENGTH_THRESHOLD: f64 = 0.8;

/// The answer-key view of a question used for scoring.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct ScoringQuestion {
    pub id: Uuid,
    pub correct_answer: String,
    pub concept_id: Uuid,
    pub concept_name: String,
    pub concept_category: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScoreSummary {
    pub correct_answers: i32,
    pub incorrect_answers: i32,
    pub unanswered: i32,
}

impl ScoreSummary {
    pub fn score(&self) -> i32 {
        self.correct_answers
    }

    pub fn total(&self) -> i32 {
        self.correct_answers + self.incorrect_answers + self.unanswered
    }

    pub fn percentage(&self) -> f64 {
        let total = self.total();
        if total == 0 {
            0.0
        } else {
            self.correct_answers as f64 / total as f64 * 100.0
        }
    }
}

/// Partition the question set into correct, incorrect, and unanswered.
pub fn score_answers(
    questions: &[ScoringQuestion],
    answers: &HashMap<Uuid, String>,
) -> ScoreSummary {
    let mut summary = ScoreSummary {
        correct_answers: 0,
        incorrect_answers: 0,
        unanswered: 0,
    };

    for question in questions {
        match answers.get(&question.id) {
            None => summary.unanswered += 1,
            Some(answer) if *answer == question.correct_answer => summary.correct_answers += 1,
            Some(_) => summary.incorrect_answers += 1,
        }
    }

    summary
}

/// Per-concept accuracy and timing, sorted weakest-first.
pub fn build_concept_performance(
    questions: &[ScoringQuestion],
    answers: &HashMap<Uuid, String>,
    times: &HashMap<Uuid, i32>,
) -> Vec<ConceptPerformance> {
    struct Bucket {
        concept_name: String,
        total: i64,
        correct: i64,
        time_spent: i64,
    }

    let mut buckets: HashMap<Uuid, Bucket> = HashMap::new();

    for question in questions {
        let bucket = buckets.entry(question.concept_id).or_insert_with(|| Bucket {
            concept_name: question.concept_name.clone(),
            total: 0,
            correct: 0,
            time_spent: 0,
        });

        bucket.total += 1;
        if answers.get(&question.id) == Some(&question.correct_answer) {
            bucket.correct += 1;
        }
        bucket.time_spent += times.get(&question.id).copied().unwrap_or(0) as i64;
    }

    let mut performance: Vec<ConceptPerformance> = buckets
        .into_iter()
        .map(|(concept_id, bucket)| ConceptPerformance {
            concept_id,
            concept_name: bucket.concept_name,
            total_questions: bucket.total,
            correct_answers: bucket.correct,
            accuracy: if bucket.total > 0 {
                bucket.correct as f64 / bucket.total as f64
            } else {
                0.0
            },
            average_time_per_question: if bucket.total > 0 {
                bucket.time_spent as f64 / bucket.total as f64
            } else {
                0.0
            },
        })
        .collect();

    performance.sort_by(|a, b| {
        a.accuracy
            .partial_cmp(&b.accuracy)
            .unwrap_or(std::cmp::Ordering::Equal)
    });

    performance
}

pub fn textbook_chapters_for(concept_name: &str, category: &str) -> Vec<String> {
    let chapters: &[(&str, &[&str])] = &[
        (
            "Data Structures",
            &[
                "Cormen - Introduction to Algorithms: Chapters 10-14",
                "Tanenbaum - Data Structures Using C: Chapters 2-6",
            ],
        ),
        (
            "Algorithms",
            &[
                "Cormen - Introduction to Algorithms: Chapters 15-17, 22-26",
                "Kleinberg - Algorithm Design: Chapters 4-6",
            ],
        ),
        (
            "Operating Systems",
            &[
                "Silberschatz - Operating System Concepts: Chapters 3-9",
                "Tanenbaum - Modern Operating Systems: Chapters 2-6",
            ],
        ),
        (
            "Database Management",
            &[
                "Korth - Database System Concepts: Chapters 1-8, 12-15",
                "Elmasri - Fundamentals of Database Systems: Chapters 3-9",
            ],
        ),
        (
            "Computer Networks",
            &[
                "Tanenbaum - Computer Networks: Chapters 1-6",
                "Kurose - Computer Networking: Chapters 1-5",
            ],
        ),
        (
            "Theory of Computation",
            &[
                "Hopcroft - Introduction to Automata Theory: Chapters 2-9",
                "Sipser - Introduction to the Theory of Computation: Chapters 1-5",
            ],
        ),
        (
            "Compiler Design",
            &["Aho - Compilers: Principles, Techniques, and Tools: Chapters 2-8"],
        ),
        ("Digital Logic", &["Morris Mano - Digital Design: Chapters 1-7"]),
    ];

    for key in [concept_name, category] {
        if let Some((_, list)) = chapters.iter().find(|(name, _)| *name == key) {
            return list.iter().map(|s| s.to_string()).collect();
        }
    }

    vec![
        "Review standard textbooks for this topic".to_string(),
        "Practice previous years' questions on this concept".to_string(),
    ]
}

pub fn practice_topics_for(concept_name: &str) -> Vec<String> {
    vec![
        format!("Solve 20+ practice problems on {}", concept_name),
        "Review fundamental theorems and definitions".to_string(),
        "Work through solved examples step-by-step".to_string(),
        "Take concept-specific mock tests".to_string(),
    ]
}

/// Feedback with strengths, weaknesses, and prioritized study
/// recommendations.
pub fn generate_feedback(
    concept_performance: &[ConceptPerformance],
    overall_percentage: f64,
    categories: &HashMap<String, String>,
) -> Feedback {
    let overall_message = if overall_percentage >= 80.0 {
        "Excellent performance! You have a strong grasp of most concepts."
    } else if overall_percentage >= 60.0 {
        "Good effort! With focused practice on weak areas, you can improve significantly."
    } else if overall_percentage >= 40.0 {
        "You need more practice. Focus on understanding fundamental concepts."
    } else {
        "Significant improvement needed. Consider revisiting the basics and practicing regularly."
    };

    let strengths: Vec<String> = concept_performance
        .iter()
        .filter(|cp| cp.accuracy >= STRENGTH_THRESHOLD)
        .map(|cp| format!("{} ({:.1}% accuracy)", cp.concept_name, cp.accuracy * 100.0))
        .collect();

    let weaknesses: Vec<ConceptWeakness> = concept_performance
        .iter()
        .filter(|cp| cp.accuracy < WEAK_CONCEPT_THRESHOLD)
        .map(|cp| ConceptWeakness {
            concept_name: cp.concept_name.clone(),
            accuracy: cp.accuracy,
            questions_attempted: cp.total_questions,
        })
        .collect();

    let mut recommendations: Vec<Recommendation> = weaknesses
        .iter()
        .map(|weakness| {
            let priority = if weakness.accuracy < 0.3 {
                RecommendationPriority::High
            } else if weakness.accuracy < 0.5 {
                RecommendationPriority::Medium
            } else {
                RecommendationPriority::Low
            };

            let category = categories
                .get(&weakness.concept_name)
                .map(String::as_str)
                .unwrap_or("");

            Recommendation {
                concept_name: weakness.concept_name.clone(),
                textbook_chapters: textbook_chapters_for(&weakness.concept_name, category),
                practice_topics: practice_topics_for(&weakness.concept_name),
                priority,
            }
        })
        .collect();

    recommendations.sort_by_key(|r| r.priority);

    Feedback {
        overall_message: overall_message.to_string(),
        strengths: if strengths.is_empty() {
            vec!["Keep practicing to build your strengths".to_string()]
        } else {
            strengths
        },
        weaknesses,
        recommendations,
    }
}

const RESULT_COLUMNS: &str = "id, session_id, user_id, score, total_questions, correct_answers, \
     incorrect_answers, unanswered, percentage, concept_performance, feedback, created_at";

pub struct ResultsService;

impl ResultsService {
    /// Score a submitted session and persist the result. Idempotent: a
    /// previously calculated result is returned as-is.
    #[instrument(skip(db))]
    pub async fn calculate_result(
        db: &PgPool,
        session_id: Uuid,
        user_id: Uuid,
    ) -> Result<TestResult, AppError> {
        #[derive(sqlx::FromRow)]
        struct SessionRow {
            user_id: Uuid,
            test_id: Uuid,
            status: String,
        }

        let session = sqlx::query_as::<_, SessionRow>(
            "SELECT user_id, test_id, status FROM test_sessions WHERE id = $1",
        )
        .bind(session_id)
        .fetch_optional(db)
        .await?
        .ok_or_else(|| AppError::not_found("Test session not found"))?;

        if session.user_id != user_id {
            return Err(AppError::forbidden("Access denied"));
        }

        if session.status == SessionStatus::InProgress.as_str() {
            return Err(AppError::bad_request("Test has not been submitted yet"));
        }

        if let Some(existing) = Self::find_by_session(db, session_id).await? {
            return Ok(existing);
        }

        let question_ids: Json<Vec<Uuid>> =
            sqlx::query_scalar("SELECT question_ids FROM tests WHERE id = $1")
                .bind(session.test_id)
                .fetch_one(db)
                .await?;

        let questions = sqlx::query_as::<_, ScoringQuestion>(
            "SELECT q.id, q.correct_answer, q.concept_id,
                    c.name AS concept_name, c.category AS concept_category
             FROM questions q
             JOIN concepts c ON q.concept_id = c.id
             WHERE q.id = ANY($1)",
        )
        .bind(&question_ids.0)
        .fetch_all(db)
        .await?;

        let answers: HashMap<Uuid, String> = sqlx::query_as::<_, (Uuid, String)>(
            "SELECT question_id, selected_answer FROM session_answers WHERE session_id = $1",
        )
        .bind(session_id)
        .fetch_all(db)
        .await?
        .into_iter()
        .collect();

        let times: HashMap<Uuid, i32> = sqlx::query_as::<_, (Uuid, i32)>(
            "SELECT question_id, time_spent FROM question_times WHERE session_id = $1",
        )
        .bind(session_id)
        .fetch_all(db)
        .await?
        .into_iter()
        .collect();

        let summary = score_answers(&questions, &answers);
        let concept_performance = build_concept_performance(&questions, &answers, &times);

        let categories: HashMap<String, String> = questions
            .iter()
            .map(|q| (q.concept_name.clone(), q.concept_category.clone()))
            .collect();
        let feedback = generate_feedback(&concept_performance, summary.percentage(), &categories);

        let result = sqlx::query_as::<_, TestResult>(&format!(
            "INSERT INTO test_results
                 (session_id, user_id, score, total_questions, correct_answers,
                  incorrect_answers, unanswered, percentage, concept_performance, feedback)
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
             RETURNING {}",
            RESULT_COLUMNS
        ))
        .bind(session_id)
        .bind(user_id)
        .bind(summary.score())
        .bind(summary.total())
        .bind(summary.correct_answers)
        .bind(summary.incorrect_answers)
        .bind(summary.unanswered)
        .bind(summary.percentage())
        .bind(Json(&concept_performance))
        .bind(Json(&feedback))
        .fetch_one(db)
        .await?;

        Ok(result)
    }

    async fn find_by_session(
        db: &PgPool,
        session_id: Uuid,
    ) -> Result<Option<TestResult>, AppError> {
        let result = sqlx::query_as::<_, TestResult>(&format!(
            "SELECT {} FROM test_results WHERE session_id = $1",
            RESULT_COLUMNS
        ))
        .bind(session_id)
        .fetch_optional(db)
        .await?;

        Ok(result)
    }

    #[instrument(skip(db))]
    pub async fn get_result(
        db: &PgPool,
        session_id: Uuid,
        user_id: Uuid,
    ) -> Result<TestResult, AppError> {
        let result = Self::find_by_session(db, session_id)
            .await?
            .ok_or_else(|| AppError::not_found("Result not found"))?;

        if result.user_id != user_id {
            return Err(AppError::forbidden("Access denied"));
        }

        Ok(result)
    }

    #[instrument(skip(db))]
    pub async fn get_user_history(
        db: &PgPool,
        user_id: Uuid,
        pagination: &PaginationParams,
    ) -> Result<Vec<TestResult>, AppError> {
        let results = sqlx::query_as::<_, TestResult>(&format!(
            "SELECT {} FROM test_results
             WHERE user_id = $1
             ORDER BY created_at DESC
             LIMIT $2 OFFSET $3",
            RESULT_COLUMNS
        ))
        .bind(user_id)
        .bind(pagination.limit())
        .bind(pagination.offset())
        .fetch_all(db)
        .await?;

        Ok(results)
    }
}
