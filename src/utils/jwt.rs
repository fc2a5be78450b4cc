use chrono::Utc;
use jsonwebtoken::{DecodingKey, EncodingKey, Header, Validation, decode, encode};
use uuid::Uuid;

use crate::config::jwt::JwtConfig;
use crate::modules::auth::model::{AuthTokens, Claims};
use crate::modules::users::model::UserRole;
use crate::utils::errors::AppError;

fn create_token(
    user_id: Uuid,
    email: &str,
    role: &UserRole,
    expiry_secs: i64,
    jwt_config: &JwtConfig,
) -> Result<String, AppError> {
    let now = Utc::now().timestamp() as usize;
    let exp = now + expiry_secs as usize;

    let claims = Claims {
        sub: user_id.to_string(),
        email: email.to_string(),
        role: role.as_str().to_string(),
        exp,
        iat: now,
    };

    encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(jwt_config.secret.as_bytes()),
    )
    .map_err(|e| AppError::internal(anyhow::anyhow!("Failed to create token: {}", e)))
}

pub fn create_access_token(
    user_id: Uuid,
    email: &str,
    role: &UserRole,
    jwt_config: &JwtConfig,
) -> Result<String, AppError> {
    create_token(user_id, email, role, jwt_config.access_token_expiry, jwt_config)
}

pub fn create_refresh_token(
    user_id: Uuid,
    email: &str,
    role: &UserRole,
    jwt_config: &JwtConfig,
) -> Result<String, AppError> {
    create_token(user_id, email, role, jwt_config.refresh_token_expiry, jwt_config)
}

/// Issue the access/refresh pair for a verified identity.
pub fn create_token_pair(
    user_id: Uuid,
    email: &str,
    role: &UserRole,
    jwt_config: &JwtConfig,
) -> Result<AuthTokens, AppError> {
    Ok(AuthTokens {
        access_token: create_access_token(user_id, email, role, jwt_config)?,
        refresh_token: create_refresh_token(user_id, email, role, jwt_config)?,
    })
}

pub fn verify_token(token: &str, jwt_config: &JwtConfig) -> Result<Claims, AppError> {
    decode::<Claims>(
        token,
        &DecodingKey::from_secret(jwt_config.secret.as_bytes()),
        &Validation::default(),
    )
    .map(|data| data.claims)
    .map_err(|_| AppError::forbidden("Invalid or expired token"))
}
