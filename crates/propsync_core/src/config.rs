//! Container configuration.

use crate::property::DEFAULT_MIN_INTERVAL_MS;

/// Defaults applied to properties registered in a container.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContainerConfig {
    /// Minimum milliseconds between two sends of an on-change property.
    pub default_min_interval_ms: u64,
}

impl Default for ContainerConfig {
    fn default() -> Self {
        Self {
            default_min_interval_ms: DEFAULT_MIN_INTERVAL_MS,
        }
    }
}

impl ContainerConfig {
    /// Creates a configuration with default values.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the default minimum send interval.
    #[must_use]
    pub const fn default_min_interval_ms(mut self, ms: u64) -> Self {
        self.default_min_interval_ms = ms;
        self
    }
}
