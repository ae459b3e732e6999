/*!
 * Tracing
 * Structured logging for guarded calls using the tracing crate
 *
 * The library only emits events; installing a subscriber is left to the
 * application. [`init_tracing`] is a convenience for binaries and tests.
 */

use crate::core::id::GuardId;
use crate::core::limits::ENV_TRACE_JSON;
use std::time::Duration;
use tracing::{info, span, Level, Span};
use tracing_subscriber::{fmt::format::FmtSpan, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Install a global subscriber
///
/// Environment variables:
/// - RUST_LOG: Set log level (default: info)
/// - TIMEOUT_GUARD_TRACE_JSON: Enable JSON output (default: false)
///
/// Returns `false` if a global subscriber was already set.
pub fn init_tracing() -> bool {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    let use_json = std::env::var(ENV_TRACE_JSON)
        .map(|v| v == "1" || v == "true")
        .unwrap_or(false);

    let registry = tracing_subscriber::registry().with(env_filter);

    let installed = if use_json {
        registry
            .with(
                tracing_subscriber::fmt::layer()
                    .json()
                    .with_target(true)
                    .with_thread_ids(true)
                    .with_thread_names(true)
                    .with_current_span(true)
                    .with_span_events(FmtSpan::CLOSE),
            )
            .try_init()
            .is_ok()
    } else {
        registry
            .with(
                tracing_subscriber::fmt::layer()
                    .with_target(true)
                    .with_thread_names(true)
                    .with_span_events(FmtSpan::CLOSE)
                    .compact(),
            )
            .try_init()
            .is_ok()
    };

    if installed {
        info!(json = use_json, "Tracing initialized");
    }
    installed
}

/// Span covering one guarded call
#[inline]
pub fn span_guarded(id: GuardId, duration: Duration) -> Span {
    span!(
        Level::DEBUG,
        "guarded",
        guard_id = id.as_u64(),
        duration_ms = duration.as_millis() as u64,
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_init_is_idempotent() {
        init_tracing();
        assert!(!init_tracing());
    }

    #[test]
    fn test_guarded_span_enters() {
        init_tracing();
        let span = span_guarded(GuardId::next(), Duration::from_millis(5));
        let _entered = span.enter();
        tracing::debug!("inside guarded span");
    }
}
