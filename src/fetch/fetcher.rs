// Adaptive media fetcher — walks the fallback chain until the sink
// accepts a reference or a range request yields a playable buffer.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use bytes::Bytes;
use parking_lot::Mutex;
use reqwest::Client;
use tokio::sync::broadcast;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use super::events::{EventBus, LoaderEvent};
use super::sink::{PlayableBuffer, PlayableHandle, PlaybackSink};
use super::strategy::{AttemptOutcome, RetrievalAttempt, Strategy};
use crate::config::{DEFAULT_AUDIO_MIME, MIME_CANDIDATES};
use crate::dispatch::dispatcher::Dispatcher;
use crate::error::MediaLoadError;

/// A remote audio resource. Content type and total length are unknown
/// until probed; nothing here assumes either is available up front.
#[derive(Debug, Clone)]
pub struct MediaResource {
    pub id: u64,
    /// Canonical stream URL.
    pub url: String,
}

impl MediaResource {
    pub fn new(id: u64, url: impl Into<String>) -> Self {
        Self {
            id,
            url: url.into(),
        }
    }

    /// Service path used for the HEAD probe.
    pub fn probe_path(&self) -> String {
        format!("/musics/{}", self.id)
    }
}

/// Why a single strategy gave up.
enum StrategyFailure {
    /// Ordinary failure; the chain advances to the next strategy.
    Advance(String),
    /// A newer load cancelled this chain.
    Superseded,
}

struct RangeChunk {
    bytes: Bytes,
    content_type: Option<String>,
}

pub struct MediaFetcher {
    dispatcher: Arc<Dispatcher>,
    sink: Arc<dyn PlaybackSink>,
    client: Client,
    origin: String,
    attempt_timeout: Duration,
    /// Monotonically increasing load generation; stale results are
    /// discarded against it.
    generation: AtomicU64,
    /// Cancellation token of the chain currently in flight.
    active: Mutex<CancellationToken>,
    /// Winning handle of the newest completed load, tagged with its
    /// generation so a late result can never replace a newer one.
    current: Mutex<Option<(u64, PlayableHandle)>>,
    events: EventBus,
}

impl MediaFetcher {
    /// The fetcher does its own byte-range retrieval but shares the
    /// dispatcher's HTTP client so session cookies are common to both.
    pub fn new(dispatcher: Arc<Dispatcher>, sink: Arc<dyn PlaybackSink>) -> Self {
        let client = dispatcher.http_client();
        let origin = dispatcher.origin().to_string();
        let attempt_timeout = dispatcher.attempt_timeout();
        Self {
            dispatcher,
            sink,
            client,
            origin,
            attempt_timeout,
            generation: AtomicU64::new(0),
            active: Mutex::new(CancellationToken::new()),
            current: Mutex::new(None),
            events: EventBus::new(),
        }
    }

    pub fn with_attempt_timeout(mut self, timeout: Duration) -> Self {
        self.attempt_timeout = timeout;
        self
    }

    /// Subscribe to lifecycle events. Emission never alters control
    /// flow; a lagging or absent subscriber is harmless.
    pub fn subscribe(&self) -> broadcast::Receiver<LoaderEvent> {
        self.events.subscribe()
    }

    /// Report a caller-side seek on the playing resource.
    pub fn notify_seek(&self, music_id: u64) {
        self.events.emit(LoaderEvent::SeekNotice { music_id });
    }

    /// Winning handle of the newest completed load, if any.
    pub fn current_handle(&self) -> Option<PlayableHandle> {
        self.current.lock().as_ref().map(|(_, handle)| handle.clone())
    }

    /// Record a winning handle. The stored generation is compared
    /// under the same lock as the write, so a result from an older
    /// load can never replace a newer one.
    fn publish(&self, generation: u64, handle: &PlayableHandle) -> bool {
        let mut current = self.current.lock();
        if let Some((stored, _)) = current.as_ref() {
            if *stored > generation {
                return false;
            }
        }
        *current = Some((generation, handle.clone()));
        true
    }

    /// Try each retrieval strategy in order until one yields a
    /// playable handle. Intermediate failures are recorded and logged
    /// but never surfaced; only exhaustion is. Starting a new load
    /// cancels any chain still in flight, and a result belonging to a
    /// superseded chain is discarded.
    pub async fn load(&self, resource: &MediaResource) -> Result<PlayableHandle, MediaLoadError> {
        let generation = self.generation.fetch_add(1, Ordering::SeqCst) + 1;
        let token = CancellationToken::new();
        {
            let mut active = self.active.lock();
            active.cancel();
            *active = token.clone();
        }

        self.events.emit(LoaderEvent::LoadStart {
            music_id: resource.id,
        });
        info!(
            "load start music_id={} generation={} url={}",
            resource.id, generation, resource.url
        );

        let mut attempts: Vec<RetrievalAttempt> = Vec::with_capacity(Strategy::CHAIN.len());

        for strategy in Strategy::CHAIN {
            if token.is_cancelled() {
                return Err(MediaLoadError::Superseded);
            }

            match self.run_strategy(strategy, resource, &token).await {
                Ok(handle) => {
                    // Fence: only the newest generation may publish.
                    if token.is_cancelled()
                        || self.generation.load(Ordering::SeqCst) != generation
                    {
                        debug!(
                            "discarding stale result music_id={} generation={}",
                            resource.id, generation
                        );
                        return Err(MediaLoadError::Superseded);
                    }

                    attempts.push(RetrievalAttempt {
                        strategy,
                        byte_range: strategy.byte_range(),
                        outcome: AttemptOutcome::Success {
                            content_type: handle.content_type().map(str::to_string),
                        },
                    });
                    if !self.publish(generation, &handle) {
                        debug!(
                            "discarding stale result music_id={} generation={}",
                            resource.id, generation
                        );
                        return Err(MediaLoadError::Superseded);
                    }
                    self.events.emit(LoaderEvent::ReadyToPlay {
                        music_id: resource.id,
                        content_type: handle.content_type().map(str::to_string),
                    });
                    info!(
                        "load ready music_id={} strategy={} type={:?}",
                        resource.id,
                        strategy.label(),
                        handle.content_type()
                    );
                    return Ok(handle);
                }
                Err(StrategyFailure::Superseded) => return Err(MediaLoadError::Superseded),
                Err(StrategyFailure::Advance(reason)) => {
                    // Partial buffers were dropped inside the strategy.
                    warn!(
                        "strategy {} failed music_id={}: {}",
                        strategy.label(),
                        resource.id,
                        reason
                    );
                    attempts.push(RetrievalAttempt {
                        strategy,
                        byte_range: strategy.byte_range(),
                        outcome: AttemptOutcome::Failure { reason },
                    });
                }
            }
        }

        warn!(
            "all strategies exhausted music_id={} attempts={}",
            resource.id,
            attempts.len()
        );
        self.events.emit(LoaderEvent::Failure {
            music_id: resource.id,
            attempts: attempts.len(),
        });
        Err(MediaLoadError::Unsupported {
            attempts: attempts.len(),
        })
    }

    async fn run_strategy(
        &self,
        strategy: Strategy,
        resource: &MediaResource,
        token: &CancellationToken,
    ) -> Result<PlayableHandle, StrategyFailure> {
        match strategy {
            Strategy::DirectReference => {
                let accepted = tokio::select! {
                    result = self.sink.accept_url(&resource.url) => result,
                    _ = token.cancelled() => return Err(StrategyFailure::Superseded),
                };
                match accepted {
                    Ok(()) => Ok(PlayableHandle::Remote {
                        url: resource.url.clone(),
                    }),
                    Err(reason) => Err(StrategyFailure::Advance(format!(
                        "sink rejected direct reference: {}",
                        reason
                    ))),
                }
            }
            Strategy::ChunkProbe => {
                let (start, end) = strategy.byte_range().unwrap_or((0, 0));
                let chunk = self.fetch_range(resource, start, end, token).await?;
                Ok(PlayableHandle::Buffer(PlayableBuffer::new(
                    chunk.bytes,
                    DEFAULT_AUDIO_MIME,
                )))
            }
            Strategy::ChunkProbeRetry => {
                let (start, end) = strategy.byte_range().unwrap_or((0, 0));
                let chunk = self.fetch_range(resource, start, end, token).await?;
                for candidate in MIME_CANDIDATES {
                    let buffer = PlayableBuffer::new(chunk.bytes.clone(), candidate);
                    let accepted = tokio::select! {
                        result = self.sink.accept_buffer(&buffer) => result,
                        _ = token.cancelled() => return Err(StrategyFailure::Superseded),
                    };
                    match accepted {
                        Ok(()) => return Ok(PlayableHandle::Buffer(buffer)),
                        Err(reason) => {
                            debug!("sink rejected candidate {}: {}", candidate, reason);
                        }
                    }
                }
                Err(StrategyFailure::Advance(
                    "no candidate MIME type accepted by sink".to_string(),
                ))
            }
            Strategy::MetadataProbeThenMinimalChunk => {
                // A failed HEAD probe only loses the type hint.
                let probe_path = resource.probe_path();
                let probe = tokio::select! {
                    result = self.dispatcher.probe_content_type(&probe_path) => result,
                    _ = token.cancelled() => return Err(StrategyFailure::Superseded),
                };
                let probed_type = match probe {
                    Ok(content_type) => content_type,
                    Err(e) => {
                        debug!("head probe failed music_id={}: {}", resource.id, e);
                        None
                    }
                };

                let (start, end) = strategy.byte_range().unwrap_or((0, 0));
                let chunk = self.fetch_range(resource, start, end, token).await?;
                let content_type = probed_type
                    .or(chunk.content_type)
                    .unwrap_or_else(|| DEFAULT_AUDIO_MIME.to_string());
                Ok(PlayableHandle::Buffer(PlayableBuffer::new(
                    chunk.bytes,
                    content_type,
                )))
            }
        }
    }

    /// Issue one byte-range request under the per-attempt timeout.
    /// Timeout and non-success statuses are ordinary failures that
    /// advance the chain.
    async fn fetch_range(
        &self,
        resource: &MediaResource,
        start: u64,
        end: u64,
        token: &CancellationToken,
    ) -> Result<RangeChunk, StrategyFailure> {
        let range = format!("bytes={}-{}", start, end);
        let request = self
            .client
            .get(&resource.url)
            .header("Origin", &self.origin)
            .header("Range", &range)
            .send();

        let response = tokio::select! {
            result = tokio::time::timeout(self.attempt_timeout, request) => match result {
                Ok(Ok(response)) => response,
                Ok(Err(e)) => return Err(StrategyFailure::Advance(format!("transport: {}", e))),
                Err(_) => {
                    return Err(StrategyFailure::Advance(format!(
                        "range {} timed out after {:?}",
                        range, self.attempt_timeout
                    )))
                }
            },
            _ = token.cancelled() => return Err(StrategyFailure::Superseded),
        };

        let status = response.status();
        if !status.is_success() {
            return Err(StrategyFailure::Advance(format!(
                "range {} rejected: HTTP {}",
                range,
                status.as_u16()
            )));
        }

        let content_type = response
            .headers()
            .get("content-type")
            .and_then(|v| v.to_str().ok())
            .map(str::to_string);

        let bytes = tokio::select! {
            result = tokio::time::timeout(self.attempt_timeout, response.bytes()) => match result {
                Ok(Ok(bytes)) => bytes,
                Ok(Err(e)) => return Err(StrategyFailure::Advance(format!("body read: {}", e))),
                Err(_) => {
                    return Err(StrategyFailure::Advance(format!(
                        "range {} body timed out after {:?}",
                        range, self.attempt_timeout
                    )))
                }
            },
            _ = token.cancelled() => return Err(StrategyFailure::Superseded),
        };

        if bytes.is_empty() {
            return Err(StrategyFailure::Advance(format!(
                "range {} returned an empty body",
                range
            )));
        }

        debug!(
            "range {} fetched {} bytes status={}",
            range,
            bytes.len(),
            status.as_u16()
        );
        Ok(RangeChunk {
            bytes,
            content_type,
        })
    }
}
