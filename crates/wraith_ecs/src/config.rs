//! Entity manager configuration.

use std::time::Duration;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// Tunables for an [`EntityManager`](crate::EntityManager).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ManagerConfig {
    /// Minimum wall-clock time between two prunes of empty archetypes.
    #[serde(rename = "cleanup_interval_ms", with = "millis")]
    pub cleanup_interval: Duration,
}

impl ManagerConfig {
    /// Default pruning cadence: once a minute.
    pub const DEFAULT_CLEANUP_INTERVAL: Duration = Duration::from_secs(60);

    /// Create a config with default settings.
    #[must_use]
    pub fn new() -> Self {
        Self {
            cleanup_interval: Self::DEFAULT_CLEANUP_INTERVAL,
        }
    }

    /// Override the archetype pruning cadence.
    #[must_use]
    pub fn with_cleanup_interval(mut self, interval: Duration) -> Self {
        self.cleanup_interval = interval;
        self
    }
}

impl Default for ManagerConfig {
    fn default() -> Self {
        Self::new()
    }
}

mod millis {
    use super::*;

    pub(super) fn serialize<S: Serializer>(value: &Duration, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_u64(u64::try_from(value.as_millis()).unwrap_or(u64::MAX))
    }

    pub(super) fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Duration, D::Error> {
        u64::deserialize(deserializer).map(Duration::from_millis)
    }
}
