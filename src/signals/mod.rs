/*!
 * Signals Module
 * Cooperative interruption of guarded work
 *
 * The watcher cannot raise inside another thread's stack. Instead it drops an
 * [`Interrupt`] into the owning thread's mailbox and unparks that thread; the
 * work observes the interrupt through its [`Scope`].
 */

mod interrupt;
mod owner;
mod scope;

pub use interrupt::{Interrupt, SignalKind};
pub use scope::Scope;

pub(crate) use interrupt::Signal;
pub(crate) use owner::Owner;
