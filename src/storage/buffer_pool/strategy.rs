//! Page replacement strategies.

use serde::{Deserialize, Serialize};

/// Policy choosing which resident, unpinned frame to reuse when no free
/// frame is left.
///
/// Only FIFO and LRU carry an eviction policy. The remaining strategies can
/// be selected and serve pins while free frames last, but a pin that needs
/// an eviction fails with `UnsupportedStrategy`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReplacementStrategy {
    /// Evict in the order frames were first filled.
    #[default]
    Fifo,
    /// Evict the frame least recently pinned.
    Lru,
    /// Second-chance clock.
    Clock,
    /// Least frequently used.
    Lfu,
    /// LRU over the k-th most recent reference.
    LruK,
}

impl ReplacementStrategy {
    /// Returns true if this strategy keeps a replacement queue and can evict.
    #[must_use]
    pub const fn has_eviction_policy(self) -> bool {
        matches!(self, Self::Fifo | Self::Lru)
    }

    /// Returns true if a cache hit refreshes the frame's queue position.
    #[must_use]
    pub const fn touches_on_hit(self) -> bool {
        matches!(self, Self::Lru)
    }

    /// Returns the configuration name of the strategy.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Fifo => "fifo",
            Self::Lru => "lru",
            Self::Clock => "clock",
            Self::Lfu => "lfu",
            Self::LruK => "lru_k",
        }
    }
}

impl std::fmt::Display for ReplacementStrategy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
