// CSRF-aware request dispatcher — builds outbound requests, owns the
// token lifecycle, and classifies responses.

use std::time::Duration;

use reqwest::{Client, Method, StatusCode};
use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::{debug, warn};

use super::csrf::{requires_csrf, CsrfStore, CSRF_HEADER};
use super::request::RequestDescriptor;
use crate::config::EngineConfig;
use crate::error::{RequestError, GENERIC_REJECTION_MESSAGE};

pub struct Dispatcher {
    client: Client,
    base_url: String,
    origin: String,
    attempt_timeout: Duration,
    csrf: CsrfStore,
}

impl Dispatcher {
    /// Build a dispatcher with its own cookie store, so session
    /// cookies ride along on every request.
    pub fn new(config: &EngineConfig) -> Result<Self, RequestError> {
        let client = Client::builder().cookie_store(true).build()?;
        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            origin: config.origin.clone(),
            attempt_timeout: config.attempt_timeout(),
            csrf: CsrfStore::new(),
        })
    }

    pub fn csrf(&self) -> &CsrfStore {
        &self.csrf
    }

    /// Absolute URL for a service path.
    pub fn url_for(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// The HTTP client, sharing this dispatcher's cookie store.
    pub(crate) fn http_client(&self) -> Client {
        self.client.clone()
    }

    pub(crate) fn origin(&self) -> &str {
        &self.origin
    }

    /// Configured per-attempt timeout for range requests.
    pub(crate) fn attempt_timeout(&self) -> Duration {
        self.attempt_timeout
    }

    /// Send a request and classify the response.
    ///
    /// The CSRF token is attached iff the method is mutating, the
    /// descriptor does not opt out, and the target is not exempt.
    pub async fn send(&self, descriptor: &RequestDescriptor) -> Result<Value, RequestError> {
        let (_, value) = self.send_classified(descriptor).await?;
        Ok(value)
    }

    async fn send_classified(
        &self,
        descriptor: &RequestDescriptor,
    ) -> Result<(StatusCode, Value), RequestError> {
        let url = self.url_for(&descriptor.path);
        let mut request = self
            .client
            .request(descriptor.method.clone(), &url)
            .header("Origin", &self.origin);

        for (name, value) in &descriptor.headers {
            request = request.header(name.as_str(), value.as_str());
        }
        if let Some(body) = &descriptor.body {
            request = request.json(body);
        }
        if !descriptor.skip_auth_token && requires_csrf(&descriptor.method, &descriptor.path) {
            if let Some(token) = self.csrf.get() {
                request = request.header(CSRF_HEADER, token);
            }
        }

        debug!("dispatch {} {}", descriptor.method, url);
        let response = request.send().await?;
        self.classify(response).await
    }

    /// Send a request and deserialize the successful body into `T`.
    pub async fn send_as<T: DeserializeOwned>(
        &self,
        descriptor: &RequestDescriptor,
    ) -> Result<T, RequestError> {
        let (status, value) = self.send_classified(descriptor).await?;
        serde_json::from_value(value.clone()).map_err(|e| {
            warn!("response shape mismatch status={}: {}", status.as_u16(), e);
            RequestError::UnexpectedFormat {
                status,
                raw: value.to_string(),
            }
        })
    }

    /// Multipart POST. Token rules are identical to `send`; the body
    /// is a form instead of JSON.
    pub async fn send_multipart(
        &self,
        path: &str,
        form: reqwest::multipart::Form,
    ) -> Result<Value, RequestError> {
        let mut request = self
            .client
            .post(self.url_for(path))
            .header("Origin", &self.origin)
            .multipart(form);

        if requires_csrf(&Method::POST, path) {
            if let Some(token) = self.csrf.get() {
                request = request.header(CSRF_HEADER, token);
            }
        }

        debug!("dispatch multipart POST {}", path);
        let response = request.send().await?;
        let (_, value) = self.classify(response).await?;
        Ok(value)
    }

    /// HEAD probe for the server-declared content type of a resource.
    pub async fn probe_content_type(&self, path: &str) -> Result<Option<String>, RequestError> {
        let response = self
            .client
            .head(self.url_for(path))
            .header("Origin", &self.origin)
            .send()
            .await?;

        let status = response.status();
        if status == StatusCode::UNAUTHORIZED {
            warn!("unauthorized HEAD probe, clearing csrf token");
            self.csrf.clear();
        }
        if !status.is_success() {
            return Err(RequestError::Rejected {
                status,
                message: GENERIC_REJECTION_MESSAGE.to_string(),
            });
        }

        Ok(response
            .headers()
            .get("content-type")
            .and_then(|v| v.to_str().ok())
            .map(str::to_string))
    }

    /// Classify a response into success / structured error / format error.
    ///
    /// Side effects, in order: a delivered `X-CSRF-TOKEN` header
    /// refreshes the stored token; a 401 then clears it
    /// unconditionally. Token invalidation happens nowhere else
    /// implicitly.
    async fn classify(
        &self,
        response: reqwest::Response,
    ) -> Result<(StatusCode, Value), RequestError> {
        let status = response.status();

        if let Some(token) = response
            .headers()
            .get(CSRF_HEADER)
            .and_then(|v| v.to_str().ok())
        {
            debug!("csrf token delivered by server");
            self.csrf.store(token.to_string());
        }
        if status == StatusCode::UNAUTHORIZED {
            warn!("unauthorized response, clearing csrf token");
            self.csrf.clear();
        }

        let is_json = response
            .headers()
            .get("content-type")
            .and_then(|v| v.to_str().ok())
            .map(|ct| ct.contains("application/json"))
            .unwrap_or(false);

        let raw = response.text().await?;

        if !is_json {
            warn!(
                "non-json response status={} bytes={}",
                status.as_u16(),
                raw.len()
            );
            return Err(RequestError::UnexpectedFormat { status, raw });
        }

        let value: Value = match serde_json::from_str(&raw) {
            Ok(value) => value,
            Err(e) => {
                warn!("json decode failed status={}: {}", status.as_u16(), e);
                return Err(RequestError::UnexpectedFormat { status, raw });
            }
        };

        if !status.is_success() {
            let message = value
                .get("message")
                .and_then(Value::as_str)
                .unwrap_or(GENERIC_REJECTION_MESSAGE)
                .to_string();
            return Err(RequestError::Rejected { status, message });
        }

        Ok((status, value))
    }
}
