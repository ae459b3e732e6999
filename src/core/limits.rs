/*!
 * Limits and Constants
 *
 * Centralized location for the guard's defaults and thresholds.
 * Performance-critical constants are marked with [PERF].
 */

use std::time::Duration;

// =============================================================================
// SIGNALS
// =============================================================================

/// Message carried by a timeout signal when the caller gives none
pub const DEFAULT_TIMEOUT_MESSAGE: &str = "execution expired";

// =============================================================================
// WATCHER THREAD
// =============================================================================

/// Name of the background thread that interrupts expired requests
pub const WATCHER_THREAD_NAME: &str = "timeout-watcher";

/// Stack size for the watcher thread (64KB)
/// The watcher only holds a vector of request handles
/// [PERF] Keeps the single process-wide thread cheap
pub const WATCHER_STACK_SIZE: usize = 64 * 1024;

/// Smallest stack size accepted from configuration (16KB)
pub const MIN_WATCHER_STACK_SIZE: usize = 16 * 1024;

/// Initial capacity of the watcher's working set
/// [PERF] Avoids regrowth for the common handful of outstanding guards
pub const WATCHER_INITIAL_CAPACITY: usize = 64;

// =============================================================================
// SCOPE
// =============================================================================

/// Upper bound on a single park inside `Scope::sleep` (50ms)
/// Unparks are best-effort; this caps how long a lost unpark can delay observation
pub const MAX_PARK_SLICE: Duration = Duration::from_millis(50);

// =============================================================================
// ENVIRONMENT
// =============================================================================

/// Overrides the watcher thread name
pub const ENV_WATCHER_NAME: &str = "TIMEOUT_GUARD_WATCHER_NAME";

/// Overrides the watcher stack size, in bytes
pub const ENV_STACK_SIZE: &str = "TIMEOUT_GUARD_STACK_SIZE";

/// Enables JSON log output when set to `1` or `true`
pub const ENV_TRACE_JSON: &str = "TIMEOUT_GUARD_TRACE_JSON";
