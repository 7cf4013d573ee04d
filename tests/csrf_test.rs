use reqwest::Method;

use jjap_media_engine::dispatch::csrf::{requires_csrf, CsrfStore};

#[test]
fn test_token_round_trip() {
    let store = CsrfStore::new();
    assert_eq!(store.get(), None);

    store.store("abc".to_string());
    assert_eq!(store.get(), Some("abc".to_string()));

    // A second store replaces the value; only one is ever held.
    store.store("def".to_string());
    assert_eq!(store.get(), Some("def".to_string()));

    store.clear();
    assert_eq!(store.get(), None);
}

#[test]
fn test_clones_share_the_cell() {
    let store = CsrfStore::new();
    let other = store.clone();

    store.store("abc".to_string());
    assert_eq!(other.get(), Some("abc".to_string()));

    other.clear();
    assert_eq!(store.get(), None);
}

#[test]
fn test_non_mutating_methods_never_require_token() {
    assert!(!requires_csrf(&Method::GET, "/musics"));
    assert!(!requires_csrf(&Method::HEAD, "/musics/1"));
    assert!(!requires_csrf(&Method::OPTIONS, "/musics"));
    assert!(!requires_csrf(&Method::GET, "/auth/login"));
}

#[test]
fn test_mutating_methods_require_token() {
    assert!(requires_csrf(&Method::POST, "/musics"));
    assert!(requires_csrf(&Method::PUT, "/musics/1"));
    assert!(requires_csrf(&Method::DELETE, "/musics/1"));
    assert!(requires_csrf(&Method::PATCH, "/musics/1"));
}

#[test]
fn test_login_and_user_creation_are_exempt() {
    assert!(!requires_csrf(&Method::POST, "/auth/login"));
    assert!(!requires_csrf(&Method::POST, "/users"));
}

#[test]
fn test_users_exemption_is_a_literal_match() {
    // Any POST whose path contains /users stays exempt; the rule is
    // deliberately not narrowed to the exact creation endpoint.
    assert!(!requires_csrf(&Method::POST, "/users/42/playlists"));

    // Only POST is exempt there; other mutations still need the token.
    assert!(requires_csrf(&Method::PUT, "/users/42"));
    assert!(requires_csrf(&Method::DELETE, "/users/42"));
}
