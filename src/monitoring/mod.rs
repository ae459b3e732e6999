/*!
 * Monitoring
 * Tracing setup for the watcher and guarded calls
 */

mod tracer;

pub use tracer::{init_tracing, span_guarded};
