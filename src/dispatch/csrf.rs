use std::sync::Arc;

use parking_lot::RwLock;
use reqwest::Method;

/// Header carrying the CSRF token on mutating requests.
pub const CSRF_HEADER: &str = "X-CSRF-TOKEN";

/// Single process-wide CSRF token cell.
///
/// Reads may happen concurrently; a store or clear is visible to every
/// subsequent read. Clones share the same cell. At most one token
/// value is held at a time.
#[derive(Clone, Default)]
pub struct CsrfStore {
    token: Arc<RwLock<Option<String>>>,
}

impl CsrfStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn store(&self, token: String) {
        *self.token.write() = Some(token);
    }

    pub fn get(&self) -> Option<String> {
        self.token.read().clone()
    }

    pub fn clear(&self) {
        *self.token.write() = None;
    }
}

/// Whether a request to `path` with `method` must carry the CSRF token.
///
/// Only mutating methods ever do. Login and account creation are
/// permanently exempt: credentials alone authenticate those calls.
/// The exemption is a literal substring match, so a POST to any path
/// containing `/users` stays exempt.
pub fn requires_csrf(method: &Method, path: &str) -> bool {
    let mutating = *method == Method::POST
        || *method == Method::PUT
        || *method == Method::DELETE
        || *method == Method::PATCH;
    if !mutating {
        return false;
    }

    let login = path.contains("/auth/login");
    let user_creation = path.contains("/users") && *method == Method::POST;

    !(login || user_creation)
}
