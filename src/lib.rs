// Client engine for the JJAP Cloud music service — CSRF-aware request
// dispatch and adaptive byte-range media retrieval.

pub mod api;
pub mod config;
pub mod dispatch;
pub mod error;
pub mod fetch;

pub use api::client::MusicClient;
pub use dispatch::dispatcher::Dispatcher;
pub use error::{MediaLoadError, RequestError};
pub use fetch::fetcher::{MediaFetcher, MediaResource};
