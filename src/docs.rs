use utoipa::openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme};
use utoipa::{Modify, OpenApi};

use crate::modules::auth::controller::ErrorResponse;
use crate::modules::auth::model::{
    AuthTokens, LoginRequest, LoginResponse, MeResponse, MessageResponse, RegisterRequestDto,
};
use crate::modules::concepts::model::{Concept, CreateConceptDto, UpdateConceptDto};
use crate::modules::questions::model::{
    BulkImportDto, BulkImportResult, CreateQuestionDto, Difficulty, PaginatedQuestionsResponse,
    Question, QuestionFilterParams, QuestionOption,
};
use crate::modules::results::model::{
    ConceptPerformance, ConceptWeakness, Feedback, Recommendation, RecommendationPriority,
    TestResult,
};
use crate::modules::sessions::model::{
    QuestionTime, SaveAnswerDto, SessionAnswer, SessionState, SessionStatus, TestSession,
    TrackTimeDto,
};
use crate::modules::tests::model::{DifficultyDistribution, GenerateTestRequest, Test, TestQuestion};
use crate::modules::trends::model::{
    ConceptRanking, ConceptTrend, PredictionFallback, TopicImportance, TrendData,
};
use crate::modules::users::model::{PaginatedUsersResponse, User, UserFilterParams, UserRole};
use crate::utils::pagination::{PaginationMeta, PaginationParams};

#[derive(OpenApi)]
#[openapi(
    paths(
        crate::modules::auth::controller::register_user,
        crate::modules::auth::controller::login_user,
        crate::modules::auth::controller::google_login,
        crate::modules::auth::controller::google_callback,
        crate::modules::auth::controller::refresh_token,
        crate::modules::auth::controller::logout,
        crate::modules::auth::controller::me,
        crate::modules::users::controller::get_profile,
        crate::modules::users::controller::get_users,
        crate::modules::concepts::controller::get_concepts,
        crate::modules::concepts::controller::get_concept,
        crate::modules::concepts::controller::get_concepts_by_category,
        crate::modules::concepts::controller::create_concept,
        crate::modules::concepts::controller::update_concept,
        crate::modules::concepts::controller::delete_concept,
        crate::modules::questions::controller::get_questions,
        crate::modules::questions::controller::get_question,
        crate::modules::questions::controller::create_question,
        crate::modules::questions::controller::update_question,
        crate::modules::questions::controller::delete_question,
        crate::modules::questions::controller::bulk_import_questions,
        crate::modules::questions::controller::count_questions_by_concept,
        crate::modules::tests::controller::generate_test,
        crate::modules::tests::controller::get_test,
        crate::modules::tests::controller::get_test_questions,
        crate::modules::sessions::controller::start_session,
        crate::modules::sessions::controller::save_answer,
        crate::modules::sessions::controller::track_time,
        crate::modules::sessions::controller::submit_session,
        crate::modules::sessions::controller::auto_submit_session,
        crate::modules::sessions::controller::get_session_state,
        crate::modules::results::controller::get_result,
        crate::modules::results::controller::get_analysis,
        crate::modules::results::controller::get_user_history,
        crate::modules::results::controller::calculate_result,
        crate::modules::trends::controller::get_trends,
        crate::modules::trends::controller::get_rankings,
        crate::modules::trends::controller::refresh_trends,
        crate::modules::trends::controller::get_concept_trend,
        crate::modules::trends::controller::get_prediction,
    ),
    components(
        schemas(
            User,
            UserRole,
            UserFilterParams,
            PaginatedUsersResponse,
            RegisterRequestDto,
            LoginRequest,
            LoginResponse,
            AuthTokens,
            MessageResponse,
            MeResponse,
            ErrorResponse,
            Concept,
            CreateConceptDto,
            UpdateConceptDto,
            Difficulty,
            QuestionOption,
            Question,
            CreateQuestionDto,
            BulkImportDto,
            BulkImportResult,
            QuestionFilterParams,
            PaginatedQuestionsResponse,
            Test,
            DifficultyDistribution,
            GenerateTestRequest,
            TestQuestion,
            SessionStatus,
            TestSession,
            SessionAnswer,
            QuestionTime,
            SaveAnswerDto,
            TrackTimeDto,
            SessionState,
            ConceptPerformance,
            ConceptWeakness,
            RecommendationPriority,
            Recommendation,
            Feedback,
            TestResult,
            ConceptTrend,
            ConceptRanking,
            TrendData,
            TopicImportance,
            PredictionFallback,
            PaginationMeta,
            PaginationParams,
        )
    ),
    modifiers(&SecurityAddon),
    tags(
        (name = "Authentication", description = "User authentication endpoints"),
        (name = "Users", description = "User profile and administration"),
        (name = "Concepts", description = "Syllabus concept management"),
        (name = "Questions", description = "Question bank management"),
        (name = "Tests", description = "Mock test generation"),
        (name = "Sessions", description = "Test session lifecycle"),
        (name = "Results", description = "Scoring and feedback"),
        (name = "Trends", description = "Trend analysis and predictions")
    ),
    info(
        title = "Prepforge API",
        version = "0.1.0",
        description = "A REST API for exam preparation built with Rust, Axum, and PostgreSQL: question banks, randomized mock tests, scoring with per-concept feedback, and trend analysis.",
        contact(
            name = "API Support",
            email = "support@prepforge.dev"
        ),
        license(
            name = "MIT"
        )
    )
)]
pub struct ApiDoc;

struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "bearer_auth",
                SecurityScheme::Http(
                    HttpBuilder::new()
                        .scheme(HttpAuthScheme::Bearer)
                        .bearer_format("JWT")
                        .build(),
                ),
            )
        }
    }
}
