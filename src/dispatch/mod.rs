// Outbound request plumbing — CSRF token lifecycle and response classification.

pub mod csrf;
pub mod dispatcher;
pub mod request;
