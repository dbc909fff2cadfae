//! Push notification module
//!
//! Delivers notification events to every browser subscription of a
//! subscriber.
//!
//! # Features
//!
//! - VAPID key material, generated once and persisted (RFC 8292)
//! - Web Push encryption (RFC 8188, 8291)
//! - Fan-out dispatch with per-endpoint failure aggregation

#![deny(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
#![forbid(unsafe_code)]

pub mod dispatch;
pub mod send;
pub mod vapid;

mod prelude;

pub use dispatch::{DispatchOutcome, Dispatcher};
pub use send::{Notification, NotificationData, NotificationPayload, PushSender, WebPushSender};
pub use vapid::KeyPair;

// vim: ts=4
