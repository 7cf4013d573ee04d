use std::sync::Arc;
use std::sync::Once;

use reqwest::multipart;
use serde_json::{json, Value};
use tracing::info;
use tracing_subscriber::EnvFilter;

use super::models::{MusicSummary, Registration, User};
use crate::config::EngineConfig;
use crate::dispatch::dispatcher::Dispatcher;
use crate::dispatch::request::RequestDescriptor;
use crate::error::RequestError;
use crate::fetch::fetcher::MediaResource;

static INIT_TRACING: Once = Once::new();

/// One-shot tracing setup; safe to call from multiple entry points.
pub fn init_tracing() {
    INIT_TRACING.call_once(|| {
        let filter = EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| EnvFilter::new("info,hyper=warn,reqwest=warn"));

        let _ = tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_target(true)
            .try_init();

        info!("media engine tracing initialized");
    });
}

/// Typed wrapper over the dispatcher exposing the music service's
/// endpoints.
pub struct MusicClient {
    dispatcher: Arc<Dispatcher>,
}

impl MusicClient {
    pub fn new(config: &EngineConfig) -> Result<Self, RequestError> {
        Ok(Self {
            dispatcher: Arc::new(Dispatcher::new(config)?),
        })
    }

    /// The underlying dispatcher, shared with a `MediaFetcher`.
    pub fn dispatcher(&self) -> Arc<Dispatcher> {
        Arc::clone(&self.dispatcher)
    }

    /// List the catalog, optionally filtered by upload date
    /// (`YYYY-MM-DD`).
    pub async fn list_musics(&self, date: Option<&str>) -> Result<Vec<MusicSummary>, RequestError> {
        let path = match date {
            Some(date) => format!("/musics?date={}", date),
            None => "/musics".to_string(),
        };
        self.dispatcher.send_as(&RequestDescriptor::get(path)).await
    }

    /// Details for one catalog entry.
    ///
    /// The server keys both representations of a music off
    /// `/musics/{id}`: a plain GET returns this JSON document, while a
    /// GET carrying a `Range` header returns media bytes (see
    /// [`Self::media_resource`]). The content type of the response
    /// distinguishes the two.
    pub async fn music_details(&self, id: u64) -> Result<MusicSummary, RequestError> {
        self.dispatcher
            .send_as(&RequestDescriptor::get(format!("/musics/{}", id)))
            .await
    }

    /// Log in with credentials. Exempt from the CSRF token; the
    /// session cookie and any delivered token are stored as side
    /// effects of the response.
    pub async fn login(&self, email: &str, password: &str) -> Result<Value, RequestError> {
        let descriptor = RequestDescriptor::post(
            "/auth/login",
            json!({ "email": email, "password": password }),
        )
        .skip_auth_token();
        self.dispatcher.send(&descriptor).await
    }

    /// Create an account. Exempt from the CSRF token.
    pub async fn register(&self, registration: &Registration) -> Result<Value, RequestError> {
        let descriptor = RequestDescriptor::post(
            "/users",
            json!({
                "nickname": registration.nickname,
                "email": registration.email,
                "password": registration.password,
            }),
        )
        .skip_auth_token();
        self.dispatcher.send(&descriptor).await
    }

    pub async fn current_user(&self) -> Result<User, RequestError> {
        self.dispatcher
            .send_as(&RequestDescriptor::get("/users/me"))
            .await
    }

    /// Upload a music file with its metadata. Requires the CSRF token.
    pub async fn upload_music(
        &self,
        name: &str,
        singer: &str,
        create_time: &str,
        file_name: &str,
        file: Vec<u8>,
    ) -> Result<Value, RequestError> {
        let part = multipart::Part::bytes(file).file_name(file_name.to_string());
        let form = multipart::Form::new()
            .text("name", name.to_string())
            .text("singer", singer.to_string())
            .text("createTime", create_time.to_string())
            .part("musicFile", part);
        self.dispatcher.send_multipart("/musics", form).await
    }

    /// Client-side logout: the token cell is cleared explicitly. The
    /// session cookie simply stops being honored server-side.
    pub fn logout(&self) {
        self.dispatcher.csrf().clear();
    }

    /// Resource descriptor for streaming one catalog entry. Same path
    /// as [`Self::music_details`]; ranged requests select the media
    /// representation.
    pub fn media_resource(&self, id: u64) -> MediaResource {
        MediaResource::new(id, self.dispatcher.url_for(&format!("/musics/{}", id)))
    }
}
