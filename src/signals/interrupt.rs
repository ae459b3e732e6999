/*!
 * Interrupt Signal
 * The value the watcher delivers into a guarded call that ran out of time
 */

use crate::core::id::GuardId;
use miette::Diagnostic;
use std::sync::Arc;
use thiserror::Error;

/// Which signal a guard raises when its deadline passes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SignalKind {
    /// Cannot be swallowed by the work; resolved by the raising guard only
    Default,
    /// Ordinary error of the named type; the work may catch it
    Custom(&'static str),
}

impl SignalKind {
    #[inline(always)]
    pub fn is_default(&self) -> bool {
        matches!(self, Self::Default)
    }
}

/// Signal delivered into the work of an expired guard
///
/// Observed through [`Scope::checkpoint`](super::Scope::checkpoint) and
/// friends. It implements [`std::error::Error`], so work error types can
/// absorb it with `?`.
#[derive(Error, Debug, Clone, PartialEq, Eq, Diagnostic)]
#[error("{message}")]
#[diagnostic(code(timeout::interrupted))]
pub struct Interrupt {
    origin: GuardId,
    kind: SignalKind,
    message: Arc<str>,
}

impl Interrupt {
    pub(crate) fn new(origin: GuardId, kind: SignalKind, message: Arc<str>) -> Self {
        Self {
            origin,
            kind,
            message,
        }
    }

    /// Guard whose deadline fired
    #[inline]
    pub fn origin(&self) -> GuardId {
        self.origin
    }

    #[inline]
    pub fn kind(&self) -> SignalKind {
        self.kind
    }

    #[inline]
    pub fn message(&self) -> &str {
        &self.message
    }

    /// Whether this interrupt was raised by the guard with `id`
    #[inline]
    pub fn is_from(&self, id: GuardId) -> bool {
        self.origin == id
    }
}

/// What a request raises on expiry, minus the origin
#[derive(Debug, Clone)]
pub(crate) struct Signal {
    pub kind: SignalKind,
    pub message: Arc<str>,
}

impl Signal {
    pub fn new(kind: SignalKind, message: Arc<str>) -> Self {
        Self { kind, message }
    }

    pub fn raise(&self, origin: GuardId) -> Interrupt {
        Interrupt::new(origin, self.kind, Arc::clone(&self.message))
    }
}
