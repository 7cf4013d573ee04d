use reqwest::Method;
use serde_json::Value;

/// Description of one outbound request. Built once, never mutated
/// after construction; the consuming builder methods return a new
/// value each time.
#[derive(Debug, Clone)]
pub struct RequestDescriptor {
    /// Path relative to the service base URL, query string included.
    pub path: String,
    pub method: Method,
    /// Extra headers beyond what the dispatcher always sends.
    pub headers: Vec<(String, String)>,
    /// JSON body, if any.
    pub body: Option<Value>,
    /// When set, the CSRF token is never attached regardless of
    /// method or target.
    pub skip_auth_token: bool,
}

impl RequestDescriptor {
    pub fn new(method: Method, path: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            method,
            headers: Vec::new(),
            body: None,
            skip_auth_token: false,
        }
    }

    pub fn get(path: impl Into<String>) -> Self {
        Self::new(Method::GET, path)
    }

    pub fn post(path: impl Into<String>, body: Value) -> Self {
        let mut descriptor = Self::new(Method::POST, path);
        descriptor.body = Some(body);
        descriptor
    }

    pub fn delete(path: impl Into<String>) -> Self {
        Self::new(Method::DELETE, path)
    }

    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((name.into(), value.into()));
        self
    }

    pub fn skip_auth_token(mut self) -> Self {
        self.skip_auth_token = true;
        self
    }
}
