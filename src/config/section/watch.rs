//! `[watch]` section configuration.
//!
//! ```toml
//! [watch]
//! debounce_ms = 300    # quiet period before a batch is processed (0 = none)
//! cooldown_ms = 800    # minimum gap between two rebuilds
//! ```

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// File watcher timings.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct WatchConfig {
    pub debounce_ms: u64,
    pub cooldown_ms: u64,
}

impl Default for WatchConfig {
    fn default() -> Self {
        Self {
            debounce_ms: 300,
            cooldown_ms: 800,
        }
    }
}

impl WatchConfig {
    pub const fn debounce(&self) -> Duration {
        Duration::from_millis(self.debounce_ms)
    }

    pub const fn cooldown(&self) -> Duration {
        Duration::from_millis(self.cooldown_ms)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::test_parse_config;

    #[test]
    fn test_watch_defaults() {
        let config = test_parse_config("");
        assert_eq!(config.watch.debounce(), Duration::from_millis(300));
        assert_eq!(config.watch.cooldown(), Duration::from_millis(800));
    }

    #[test]
    fn test_watch_zero_debounce() {
        let config = test_parse_config("[watch]\ndebounce_ms = 0");
        assert_eq!(config.watch.debounce(), Duration::ZERO);
        assert_eq!(config.watch.cooldown_ms, 800);
    }
}
