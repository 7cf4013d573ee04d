// Adaptive media retrieval — playback sink seam, loader events, and
// the fallback strategy chain.

pub mod events;
pub mod fetcher;
pub mod sink;
pub mod strategy;
