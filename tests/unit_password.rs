use prepforge::utils::password::{hash_password, verify_password};

#[test]
fn test_hash_password_produces_bcrypt_hash() {
    let hash = hash_password("correct horse battery staple").unwrap();
    assert!(hash.starts_with("$2"));
    assert_ne!(hash, "correct horse battery staple");
}

#[test]
fn test_verify_password_accepts_correct_password() {
    let hash = hash_password("s3cret-pass").unwrap();
    assert!(verify_password("s3cret-pass", &hash).unwrap());
}

#[test]
fn test_verify_password_rejects_wrong_password() {
    let hash = hash_password("s3cret-pass").unwrap();
    assert!(!verify_password("wrong-pass", &hash).unwrap());
}

#[test]
fn test_same_password_different_hashes() {
    let hash1 = hash_password("repeated").unwrap();
    let hash2 = hash_password("repeated").unwrap();
    assert_ne!(hash1, hash2);
    assert!(verify_password("repeated", &hash1).unwrap());
    assert!(verify_password("repeated", &hash2).unwrap());
}

#[test]
fn test_verify_password_garbage_hash_is_error() {
    assert!(verify_password("anything", "not-a-bcrypt-hash").is_err());
}
