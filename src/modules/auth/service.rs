use serde::Deserialize;
use sqlx::PgPool;
use tracing::instrument;
use uuid::Uuid;

use crate::config::jwt::JwtConfig;
use crate::config::oauth::OAuthConfig;
use crate::middleware::role::parse_role_from_string;
use crate::modules::users::model::{OAuthProfile, User};
use crate::utils::errors::AppError;
use crate::utils::jwt::{create_access_token, create_token_pair, verify_token};
use crate::utils::password::{hash_password, verify_password};

use super::model::{AuthTokens, Claims, LoginRequest, RegisterRequestDto};

const USER_COLUMNS: &str =
    "id, google_id, email, name, profile_picture, role, created_at, last_login_at";

pub struct AuthService;

impl AuthService {
    #[instrument(skip(db, dto))]
    pub async fn register_user(db: &PgPool, dto: RegisterRequestDto) -> Result<User, AppError> {
        let existing: Option<Uuid> = sqlx::query_scalar("SELECT id FROM users WHERE email = $1")
            .bind(&dto.email)
            .fetch_optional(db)
            .await?;

        if existing.is_some() {
            return Err(AppError::bad_request("Email already exists"));
        }

        let hashed_password = hash_password(&dto.password)?;

        let user = sqlx::query_as::<_, User>(&format!(
            "INSERT INTO users (email, name, password_hash, role)
             VALUES ($1, $2, $3, 'user')
             RETURNING {}",
            USER_COLUMNS
        ))
        .bind(&dto.email)
        .bind(&dto.name)
        .bind(&hashed_password)
        .fetch_one(db)
        .await?;

        Ok(user)
    }

    /// Verify a password credential and issue the token pair. Unknown email
    /// and wrong password produce the same generic failure.
    #[instrument(skip(db, dto, jwt_config))]
    pub async fn login_user(
        db: &PgPool,
        dto: LoginRequest,
        jwt_config: &JwtConfig,
    ) -> Result<(User, AuthTokens), AppError> {
        #[derive(sqlx::FromRow)]
        struct UserWithPassword {
            id: Uuid,
            google_id: Option<String>,
            email: String,
            name: String,
            profile_picture: Option<String>,
            role: String,
            password_hash: Option<String>,
            created_at: chrono::DateTime<chrono::Utc>,
            last_login_at: chrono::DateTime<chrono::Utc>,
        }

        let row = sqlx::query_as::<_, UserWithPassword>(&format!(
            "SELECT {}, password_hash FROM users WHERE email = $1",
            USER_COLUMNS
        ))
        .bind(&dto.email)
        .fetch_optional(db)
        .await?
        .ok_or_else(|| AppError::unauthorized("Invalid email or password"))?;

        // OAuth-only identities carry no password credential.
        let hash = row
            .password_hash
            .as_deref()
            .ok_or_else(|| AppError::unauthorized("Invalid email or password"))?;

        if !verify_password(&dto.password, hash)? {
            return Err(AppError::unauthorized("Invalid email or password"));
        }

        sqlx::query("UPDATE users SET last_login_at = now() WHERE id = $1")
            .bind(row.id)
            .execute(db)
            .await?;

        let role = parse_role_from_string(&row.role)?;
        let tokens = create_token_pair(row.id, &row.email, &role, jwt_config)?;

        let user = User {
            id: row.id,
            google_id: row.google_id,
            email: row.email,
            name: row.name,
            profile_picture: row.profile_picture,
            role: row.role,
            created_at: row.created_at,
            last_login_at: row.last_login_at,
        };

        Ok((user, tokens))
    }

    /// Exchange the OAuth authorization code for the provider's profile.
    #[instrument(skip(http, oauth_config, code))]
    pub async fn exchange_oauth_code(
        http: &reqwest::Client,
        oauth_config: &OAuthConfig,
        code: &str,
    ) -> Result<OAuthProfile, AppError> {
        #[derive(Deserialize)]
        struct TokenResponse {
            access_token: String,
        }

        #[derive(Deserialize)]
        struct UserInfo {
            sub: String,
            email: Option<String>,
            name: Option<String>,
            picture: Option<String>,
        }

        let token: TokenResponse = http
            .post(&oauth_config.token_url)
            .form(&[
                ("code", code),
                ("client_id", oauth_config.client_id.as_str()),
                ("client_secret", oauth_config.client_secret.as_str()),
                ("redirect_uri", oauth_config.callback_url.as_str()),
                ("grant_type", "authorization_code"),
            ])
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;

        let info: UserInfo = http
            .get(&oauth_config.userinfo_url)
            .bearer_auth(&token.access_token)
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;

        Ok(OAuthProfile {
            google_id: info.sub,
            email: info.email.unwrap_or_default(),
            name: info.name.unwrap_or_default(),
            profile_picture: info.picture,
        })
    }

    /// Issue tokens for an identity already verified by the OAuth callback.
    pub fn issue_tokens_for(user: &User, jwt_config: &JwtConfig) -> Result<AuthTokens, AppError> {
        let role = parse_role_from_string(&user.role)?;
        create_token_pair(user.id, &user.email, &role, jwt_config)
    }

    /// Verify a refresh token and mint a fresh access token.
    pub fn refresh_access_token(
        refresh_token: &str,
        jwt_config: &JwtConfig,
    ) -> Result<String, AppError> {
        let claims: Claims = verify_token(refresh_token, jwt_config)
            .map_err(|_| AppError::forbidden("Invalid or expired refresh token"))?;

        let user_id = Uuid::parse_str(&claims.sub)
            .map_err(|_| AppError::forbidden("Invalid or expired refresh token"))?;
        let role = parse_role_from_string(&claims.role)
            .map_err(|_| AppError::forbidden("Invalid or expired refresh token"))?;

        create_access_token(user_id, &claims.email, &role, jwt_config)
    }
}
