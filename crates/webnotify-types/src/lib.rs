//! Shared types, adapter traits, and the error type for webnotify.
//!
//! The registration adapter trait lives here so that storage backends can be
//! compiled and tested independently of the push and HTTP crates.

#![deny(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
#![forbid(unsafe_code)]

pub mod error;
pub mod prelude;
pub mod registration;
pub mod registration_adapter;
pub mod types;

// vim: ts=4
