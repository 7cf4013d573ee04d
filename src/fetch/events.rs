use tokio::sync::broadcast;

/// Lifecycle notifications emitted while a load runs. Observation
/// only — subscribers never influence the chain.
#[derive(Debug, Clone)]
pub enum LoaderEvent {
    LoadStart {
        music_id: u64,
    },
    ReadyToPlay {
        music_id: u64,
        /// Declared type of the winning buffer; `None` when the sink
        /// took a direct reference and negotiates the type itself.
        content_type: Option<String>,
    },
    SeekNotice {
        music_id: u64,
    },
    Failure {
        music_id: u64,
        attempts: usize,
    },
}

pub(crate) struct EventBus {
    tx: broadcast::Sender<LoaderEvent>,
}

impl EventBus {
    pub fn new() -> Self {
        let (tx, _) = broadcast::channel(32);
        Self { tx }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<LoaderEvent> {
        self.tx.subscribe()
    }

    pub fn emit(&self, event: LoaderEvent) {
        // Nobody listening is fine.
        let _ = self.tx.send(event);
    }
}
