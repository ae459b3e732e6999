/*!
 * Executor Configuration
 */

use crate::core::clock::{Clock, MonotonicClock};
use crate::core::limits::{
    DEFAULT_TIMEOUT_MESSAGE, ENV_STACK_SIZE, ENV_WATCHER_NAME, MIN_WATCHER_STACK_SIZE,
    WATCHER_STACK_SIZE, WATCHER_THREAD_NAME,
};
use std::sync::Arc;
use tracing::warn;

/// Configuration for a timeout executor
#[derive(Debug, Clone)]
pub struct ExecutorConfig {
    /// Name of the watcher thread
    pub thread_name: String,
    /// Stack size of the watcher thread, in bytes
    pub stack_size: usize,
    /// Message used by guards that do not set one
    pub default_message: Arc<str>,
    /// Time source for deadlines
    pub clock: Arc<dyn Clock>,
}

impl ExecutorConfig {
    /// Create default configuration
    pub fn new() -> Self {
        Self {
            thread_name: WATCHER_THREAD_NAME.to_string(),
            stack_size: WATCHER_STACK_SIZE,
            default_message: Arc::from(DEFAULT_TIMEOUT_MESSAGE),
            clock: Arc::new(MonotonicClock),
        }
    }

    /// Default configuration with environment overrides applied
    ///
    /// Environment variables:
    /// - TIMEOUT_GUARD_WATCHER_NAME: watcher thread name
    /// - TIMEOUT_GUARD_STACK_SIZE: watcher stack size in bytes
    pub fn from_env() -> Self {
        let mut config = Self::new();

        if let Ok(name) = std::env::var(ENV_WATCHER_NAME) {
            if !name.trim().is_empty() {
                config.thread_name = name;
            }
        }

        if let Ok(raw) = std::env::var(ENV_STACK_SIZE) {
            match raw.trim().parse::<usize>() {
                Ok(size) => config = config.with_stack_size(size),
                Err(e) => warn!(value = %raw, error = %e, "Ignoring invalid {}", ENV_STACK_SIZE),
            }
        }

        config
    }

    pub fn with_thread_name(mut self, name: impl Into<String>) -> Self {
        self.thread_name = name.into();
        self
    }

    /// Set the watcher stack size (clamped to a safe minimum)
    pub fn with_stack_size(mut self, size: usize) -> Self {
        self.stack_size = size.max(MIN_WATCHER_STACK_SIZE);
        self
    }

    pub fn with_default_message(mut self, message: impl Into<Arc<str>>) -> Self {
        self.default_message = message.into();
        self
    }

    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }
}

impl Default for ExecutorConfig {
    fn default() -> Self {
        Self::new()
    }
}
