/*!
 * Core Module
 * Identifiers, clocks, limits and error types shared by every layer
 */

pub mod clock;
pub mod errors;
pub mod id;
pub mod limits;

pub use clock::{Clock, MonotonicClock};
pub use errors::{Error, ExecutorError, Expired, GuardResult};
pub use id::GuardId;
