mod common;

use common::test_jwt_config;
use prepforge::config::jwt::JwtConfig;
use prepforge::modules::users::model::UserRole;
use prepforge::utils::jwt::{
    create_access_token, create_refresh_token, create_token_pair, verify_token,
};
use uuid::Uuid;

#[test]
fn test_create_access_token_success() {
    let jwt_config = test_jwt_config();
    let user_id = Uuid::new_v4();

    let result = create_access_token(user_id, "test@example.com", &UserRole::Student, &jwt_config);

    assert!(result.is_ok());
    assert!(!result.unwrap().is_empty());
}

#[test]
fn test_create_token_all_roles() {
    let jwt_config = test_jwt_config();
    let user_id = Uuid::new_v4();

    for role in [UserRole::User, UserRole::Admin, UserRole::Student] {
        let result = create_access_token(user_id, "test@example.com", &role, &jwt_config);
        assert!(result.is_ok());
    }
}

#[test]
fn test_verify_token_success() {
    let jwt_config = test_jwt_config();
    let user_id = Uuid::new_v4();
    let email = "test@example.com";

    let token = create_access_token(user_id, email, &UserRole::Student, &jwt_config).unwrap();
    let claims = verify_token(&token, &jwt_config).unwrap();

    assert_eq!(claims.email, email);
    assert_eq!(claims.sub, user_id.to_string());
    assert_eq!(claims.role, "student");
}

#[test]
fn test_verify_token_invalid() {
    let jwt_config = test_jwt_config();
    assert!(verify_token("invalid.token.here", &jwt_config).is_err());
}

#[test]
fn test_verify_token_wrong_secret() {
    let jwt_config = test_jwt_config();
    let token = create_access_token(
        Uuid::new_v4(),
        "test@example.com",
        &UserRole::User,
        &jwt_config,
    )
    .unwrap();

    let wrong_jwt_config = JwtConfig {
        secret: "different_secret_key".to_string(),
        access_token_expiry: 900,
        refresh_token_expiry: 604800,
    };

    assert!(verify_token(&token, &wrong_jwt_config).is_err());
}

#[test]
fn test_verify_token_empty() {
    let jwt_config = test_jwt_config();
    assert!(verify_token("", &jwt_config).is_err());
}

#[test]
fn test_verify_token_malformed() {
    let jwt_config = test_jwt_config();
    let malformed_tokens = vec![
        "not.enough.parts",
        "too.many.parts.here.extra",
        "!!!.invalid.chars",
        "header.payload.",
        ".payload.signature",
    ];

    for token in malformed_tokens {
        assert!(verify_token(token, &jwt_config).is_err());
    }
}

#[test]
fn test_access_token_expiry_window() {
    let jwt_config = test_jwt_config();
    let token = create_access_token(
        Uuid::new_v4(),
        "test@example.com",
        &UserRole::User,
        &jwt_config,
    )
    .unwrap();
    let claims = verify_token(&token, &jwt_config).unwrap();

    assert!(claims.exp > claims.iat);
    assert_eq!(
        claims.exp - claims.iat,
        jwt_config.access_token_expiry as usize
    );
}

#[test]
fn test_refresh_token_outlives_access_token() {
    let jwt_config = test_jwt_config();
    let user_id = Uuid::new_v4();

    let access =
        create_access_token(user_id, "test@example.com", &UserRole::User, &jwt_config).unwrap();
    let refresh =
        create_refresh_token(user_id, "test@example.com", &UserRole::User, &jwt_config).unwrap();

    let access_claims = verify_token(&access, &jwt_config).unwrap();
    let refresh_claims = verify_token(&refresh, &jwt_config).unwrap();

    assert!(refresh_claims.exp > access_claims.exp);
}

#[test]
fn test_token_pair_carries_identity() {
    let jwt_config = test_jwt_config();
    let user_id = Uuid::new_v4();
    let email = "pair@example.com";

    let tokens = create_token_pair(user_id, email, &UserRole::Admin, &jwt_config).unwrap();

    for token in [&tokens.access_token, &tokens.refresh_token] {
        let claims = verify_token(token, &jwt_config).unwrap();
        assert_eq!(claims.sub, user_id.to_string());
        assert_eq!(claims.email, email);
        assert_eq!(claims.role, "admin");
    }
}

#[test]
fn test_different_users_different_tokens() {
    let jwt_config = test_jwt_config();
    let user_id1 = Uuid::new_v4();
    let user_id2 = Uuid::new_v4();

    let token1 =
        create_access_token(user_id1, "user1@example.com", &UserRole::User, &jwt_config).unwrap();
    let token2 =
        create_access_token(user_id2, "user2@example.com", &UserRole::User, &jwt_config).unwrap();

    assert_ne!(token1, token2);

    let claims1 = verify_token(&token1, &jwt_config).unwrap();
    let claims2 = verify_token(&token2, &jwt_config).unwrap();
    assert_eq!(claims1.sub, user_id1.to_string());
    assert_eq!(claims2.sub, user_id2.to_string());
}
