//! `critiq-notify` — user-visible status notifications.
//!
//! Notifications are append-only side effects of review transitions. The
//! only mutation ever applied is flipping the read flag. Emission is
//! best-effort relative to the transition that triggered it: a lost
//! notification is acceptable, a lost state transition is not.

pub mod emitter;
pub mod notification;
pub mod store;

pub use emitter::NotificationEmitter;
pub use notification::Notification;
pub use store::{InMemoryNotificationStore, NotificationStore, NotifyError};
