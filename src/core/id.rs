/*!
 * Guard Identity
 *
 * Every guarded call gets a process-unique id. Ids only grow, so on a single
 * thread a nested guard always carries a larger id than the guards around it.
 */

use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};

/// Identity of one guarded call
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct GuardId(u64);

static NEXT_GUARD_ID: AtomicU64 = AtomicU64::new(1);

impl GuardId {
    /// Allocate the next id
    #[inline]
    pub fn next() -> Self {
        Self(NEXT_GUARD_ID.fetch_add(1, Ordering::Relaxed))
    }

    /// Raw numeric value
    #[inline(always)]
    pub fn as_u64(&self) -> u64 {
        self.0
    }
}

impl fmt::Display for GuardId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "guard#{}", self.0)
    }
}
