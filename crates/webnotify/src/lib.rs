//! Web Push notification server
//!
//! Browsers register their push subscriptions for a subscriber id; a
//! publisher posts an event for that subscriber and it is pushed to every
//! registered browser.
//!
//! # Routes
//!
//! - `POST /api/v1/register` - register a subscription
//! - `DELETE /api/v1/register` - unregister a subscription
//! - `POST /api/v1/push` - dispatch an event to a subscriber
//! - `GET /scripts/*`, `GET /service-worker.js` - client scripts with the
//!   VAPID public key filled in
//! - everything else is served from the web directory

#![deny(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
#![forbid(unsafe_code)]

pub mod app;
pub mod handler;
pub mod prelude;
pub mod routes;
pub mod template;

pub use app::{App, AppBuilder, AppBuilderOpts, AppState};
pub use webnotify_push::vapid;

// vim: ts=4
