use chrono::Utc;
use sqlx::PgPool;
use tracing::instrument;
use uuid::Uuid;

use crate::modules::tests::service::TestGenerationService;
use crate::utils::errors::AppError;

use super::model::{
    QuestionTime, SaveAnswerDto, SessionAnswer, SessionState, SessionStatus, TestSession,
    TrackTimeDto,
};

const SESSION_COLUMNS: &str =
    "id, user_id, test_id, start_time, end_time, status, total_time_spent, created_at";

pub struct TestSessionService;

impl TestSessionService {
    /// Start a session for a test. A user may have only one in-progress
    /// session per test.
    #[instrument(skip(db))]
    pub async fn start_session(
        db: &PgPool,
        user_id: Uuid,
        test_id: Uuid,
    ) -> Result<TestSession, AppError> {
        // 404 if the test does not exist.
        TestGenerationService::get_test(db, test_id).await?;

        let existing: Option<Uuid> = sqlx::query_scalar(
            "SELECT id FROM test_sessions
             WHERE user_id = $1 AND test_id = $2 AND status = 'in_progress'",
        )
        .bind(user_id)
        .bind(test_id)
        .fetch_optional(db)
        .await?;

        if existing.is_some() {
            return Err(AppError::bad_request(
                "A session for this test is already in progress",
            ));
        }

        let session = sqlx::query_as::<_, TestSession>(&format!(
            "INSERT INTO test_sessions (user_id, test_id) VALUES ($1, $2) RETURNING {}",
            SESSION_COLUMNS
        ))
        .bind(user_id)
        .bind(test_id)
        .fetch_one(db)
        .await?;

        Ok(session)
    }

    async fn get_owned_session(
        db: &PgPool,
        session_id: Uuid,
        user_id: Uuid,
    ) -> Result<TestSession, AppError> {
        let session = sqlx::query_as::<_, TestSession>(&format!(
            "SELECT {} FROM test_sessions WHERE id = $1",
            SESSION_COLUMNS
        ))
        .bind(session_id)
        .fetch_optional(db)
        .await?
        .ok_or_else(|| AppError::not_found("Test session not found"))?;

        if session.user_id != user_id {
            return Err(AppError::forbidden("Access denied"));
        }

        Ok(session)
    }

    async fn get_active_session(
        db: &PgPool,
        session_id: Uuid,
        user_id: Uuid,
    ) -> Result<TestSession, AppError> {
        let session = Self::get_owned_session(db, session_id, user_id).await?;

        if session.status != SessionStatus::InProgress.as_str() {
            return Err(AppError::bad_request("Test session is not active"));
        }

        Ok(session)
    }

    /// Record or overwrite the answer for one question.
    #[instrument(skip(db, dto))]
    pub async fn save_answer(
        db: &PgPool,
        session_id: Uuid,
        user_id: Uuid,
        dto: SaveAnswerDto,
    ) -> Result<SessionAnswer, AppError> {
        Self::get_active_session(db, session_id, user_id).await?;

        let answer = sqlx::query_as::<_, SessionAnswer>(
            "INSERT INTO session_answers (session_id, question_id, selected_answer, marked_for_review)
             VALUES ($1, $2, $3, $4)
             ON CONFLICT ON CONSTRAINT unique_session_question DO UPDATE
             SET selected_answer = EXCLUDED.selected_answer,
                 marked_for_review = EXCLUDED.marked_for_review,
                 answered_at = now()
             RETURNING id, session_id, question_id, selected_answer, marked_for_review, answered_at",
        )
        .bind(session_id)
        .bind(dto.question_id)
        .bind(&dto.selected_answer)
        .bind(dto.marked_for_review)
        .fetch_one(db)
        .await?;

        Ok(answer)
    }

    /// Accumulate time spent on one question.
    #[instrument(skip(db, dto))]
    pub async fn track_question_time(
        db: &PgPool,
        session_id: Uuid,
        user_id: Uuid,
        dto: TrackTimeDto,
    ) -> Result<QuestionTime, AppError> {
        Self::get_active_session(db, session_id, user_id).await?;

        let time = sqlx::query_as::<_, QuestionTime>(
            "INSERT INTO question_times (session_id, question_id, time_spent)
             VALUES ($1, $2, $3)
             ON CONFLICT ON CONSTRAINT unique_session_question_time DO UPDATE
             SET time_spent = question_times.time_spent + EXCLUDED.time_spent,
                 updated_at = now()
             RETURNING id, session_id, question_id, time_spent, created_at, updated_at",
        )
        .bind(session_id)
        .bind(dto.question_id)
        .bind(dto.time_spent)
        .fetch_one(db)
        .await?;

        Ok(time)
    }

    async fn finish_session(
        db: &PgPool,
        session: &TestSession,
        status: SessionStatus,
    ) -> Result<TestSession, AppError> {
        let total_time: Option<i64> =
            sqlx::query_scalar("SELECT SUM(time_spent) FROM question_times WHERE session_id = $1")
                .bind(session.id)
                .fetch_one(db)
                .await?;

        let finished = sqlx::query_as::<_, TestSession>(&format!(
            "UPDATE test_sessions
             SET status = $2, end_time = now(), total_time_spent = $3
             WHERE id = $1
             RETURNING {}",
            SESSION_COLUMNS
        ))
        .bind(session.id)
        .bind(status.as_str())
        .bind(total_time.unwrap_or(0) as i32)
        .fetch_one(db)
        .await?;

        Ok(finished)
    }

    #[instrument(skip(db))]
    pub async fn submit_test(
        db: &PgPool,
        session_id: Uuid,
        user_id: Uuid,
    ) -> Result<TestSession, AppError> {
        let session = Self::get_active_session(db, session_id, user_id).await?;
        Self::finish_session(db, &session, SessionStatus::Completed).await
    }

    /// Close an expired session. Rejected while the test duration has not
    /// elapsed.
    #[instrument(skip(db))]
    pub async fn auto_submit_on_timeout(
        db: &PgPool,
        session_id: Uuid,
        user_id: Uuid,
    ) -> Result<TestSession, AppError> {
        let session = Self::get_active_session(db, session_id, user_id).await?;
        let test = TestGenerationService::get_test(db, session.test_id).await?;

        let elapsed = (Utc::now() - session.start_time).num_seconds();
        if elapsed < test.duration as i64 {
            return Err(AppError::bad_request("Test duration has not elapsed yet"));
        }

        Self::finish_session(db, &session, SessionStatus::AutoSubmitted).await
    }

    #[instrument(skip(db))]
    pub async fn get_session_state(
        db: &PgPool,
        session_id: Uuid,
        user_id: Uuid,
    ) -> Result<SessionState, AppError> {
        let session = Self::get_owned_session(db, session_id, user_id).await?;
        let test = TestGenerationService::get_test(db, session.test_id).await?;

        let answers = sqlx::query_as::<_, SessionAnswer>(
            "SELECT id, session_id, question_id, selected_answer, marked_for_review, answered_at
             FROM session_answers WHERE session_id = $1
             ORDER BY answered_at",
        )
        .bind(session_id)
        .fetch_all(db)
        .await?;

        let question_times = sqlx::query_as::<_, QuestionTime>(
            "SELECT id, session_id, question_id, time_spent, created_at, updated_at
             FROM question_times WHERE session_id = $1",
        )
        .bind(session_id)
        .fetch_all(db)
        .await?;

        let remaining_seconds = if session.status == SessionStatus::InProgress.as_str() {
            let elapsed = (Utc::now() - session.start_time).num_seconds();
            (test.duration as i64 - elapsed).max(0)
        } else {
            0
        };

        Ok(SessionState {
            session,
            answers,
            question_times,
            remaining_seconds,
        })
    }
}
