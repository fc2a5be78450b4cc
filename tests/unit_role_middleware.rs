use prepforge::middleware::auth::AuthUser;
use prepforge::middleware::role::{check_any_role, check_role, parse_role_from_string};
use prepforge::modules::auth::model::Claims;
use prepforge::modules::users::model::UserRole;

fn create_test_auth_user(role: &str) -> AuthUser {
    let claims = Claims {
        sub: "00000000-0000-0000-0000-000000000000".to_string(),
        email: "test@example.com".to_string(),
        role: role.to_string(),
        exp: 9999999999,
        iat: 1234567890,
    };
    AuthUser(claims)
}

#[test]
fn test_check_role_exact_match() {
    let auth_user = create_test_auth_user("admin");
    assert!(check_role(&auth_user, UserRole::Admin).is_ok());

    let auth_user = create_test_auth_user("user");
    assert!(check_role(&auth_user, UserRole::User).is_ok());

    let auth_user = create_test_auth_user("student");
    assert!(check_role(&auth_user, UserRole::Student).is_ok());
}

#[test]
fn test_check_role_no_match() {
    let auth_user = create_test_auth_user("user");
    assert!(check_role(&auth_user, UserRole::Admin).is_err());

    let auth_user = create_test_auth_user("student");
    assert!(check_role(&auth_user, UserRole::Admin).is_err());
}

#[test]
fn test_check_role_unknown_role_string() {
    let auth_user = create_test_auth_user("superuser");
    assert!(check_role(&auth_user, UserRole::Admin).is_err());
}

#[test]
fn test_check_any_role_single_match() {
    let auth_user = create_test_auth_user("admin");
    assert!(check_any_role(&auth_user, &[UserRole::Admin]).is_ok());
}

#[test]
fn test_check_any_role_multiple() {
    let allowed = vec![UserRole::Admin, UserRole::Student];

    let auth_user = create_test_auth_user("student");
    assert!(check_any_role(&auth_user, &allowed).is_ok());

    let auth_user = create_test_auth_user("user");
    assert!(check_any_role(&auth_user, &allowed).is_err());
}

#[test]
fn test_check_any_role_empty_list() {
    let auth_user = create_test_auth_user("admin");
    assert!(check_any_role(&auth_user, &[]).is_err());
}

#[test]
fn test_parse_role_from_string() {
    assert!(matches!(parse_role_from_string("user"), Ok(UserRole::User)));
    assert!(matches!(
        parse_role_from_string("admin"),
        Ok(UserRole::Admin)
    ));
    assert!(matches!(
        parse_role_from_string("student"),
        Ok(UserRole::Student)
    ));
    assert!(parse_role_from_string("invalid").is_err());
    assert!(parse_role_from_string("").is_err());
}
