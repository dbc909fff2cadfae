//! JSON-file Registration Adapter
//!
//! Implements the RegistrationAdapter trait by keeping every registration in
//! memory and mirroring the whole collection to a single JSON document.
//!
//! # Storage Layout
//!
//! One file, an array of `{subscriber, subscription, created, updated}`
//! objects, rewritten completely by every `persist()`. The file is created
//! lazily on the first persist; opening a missing file yields an empty store.
//!
//! # Locking
//!
//! A single async mutex guards the collection. Reads, mutations and
//! `persist()` each hold it for their whole duration, so a persist never
//! serializes a half-applied mutation and two persists never interleave their
//! writes.

#![deny(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
#![forbid(unsafe_code)]

use async_trait::async_trait;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tokio::sync::Mutex;

use webnotify_types::prelude::*;
use webnotify_types::registration::{Registration, RegistrationList};
use webnotify_types::registration_adapter::{RegistrationAdapter, RegistrationFilter};

#[derive(Debug)]
pub struct RegistrationAdapterJson {
	path: Box<Path>,
	registrations: Mutex<Vec<Registration>>,
}

impl RegistrationAdapterJson {
	/// Opens the store at `path`.
	///
	/// A missing file is an empty store. A file that exists but cannot be read
	/// or parsed is reported as [`Error::CorruptState`]; callers are expected
	/// to treat it as fatal rather than start over with an empty collection.
	pub async fn open(path: impl Into<PathBuf>) -> ClResult<Self> {
		let path: Box<Path> = path.into().into_boxed_path();

		let registrations = match tokio::fs::read(&path).await {
			Ok(buf) => {
				let registrations: Option<Vec<Registration>> = serde_json::from_slice(&buf)
					.map_err(|e| {
						error!(path = %path.display(), error = %e, "Unable to deserialize the registrations file");
						Error::CorruptState(format!("{}: {}", path.display(), e))
					})?;
				registrations.unwrap_or_default()
			}
			Err(e) if e.kind() == ErrorKind::NotFound => {
				info!(path = %path.display(), "No registrations file yet, starting empty");
				Vec::new()
			}
			Err(e) => {
				error!(path = %path.display(), error = %e, "Unable to read the registrations file");
				return Err(Error::CorruptState(format!("{}: {}", path.display(), e)));
			}
		};

		info!(path = %path.display(), count = registrations.len(), "Registrations loaded");
		Ok(Self { path, registrations: Mutex::new(registrations) })
	}
}

/// Fills in `created` on first insertion and refreshes `updated`
fn stamp(mut registration: Registration) -> Registration {
	let now = Timestamp::now();
	if registration.created.is_zero() {
		registration.created = now;
	}
	registration.updated = now;
	registration
}

#[async_trait]
impl RegistrationAdapter for RegistrationAdapterJson {
	async fn find(&self, subscriber: &str) -> RegistrationList {
		let registrations = self.registrations.lock().await;
		registrations.iter().filter(|reg| reg.subscriber.as_ref() == subscriber).cloned().collect()
	}

	async fn filter(&self, predicate: RegistrationFilter<'_>) -> RegistrationList {
		let registrations = self.registrations.lock().await;
		registrations.iter().filter(|reg| predicate(*reg)).cloned().collect()
	}

	async fn register(&self, registration: Registration) {
		let registration = stamp(registration);
		debug!(subscriber = %registration.subscriber, "Registering subscription");
		self.registrations.lock().await.push(registration);
	}

	async fn register_unique(&self, registration: Registration) -> bool {
		let mut registrations = self.registrations.lock().await;
		if registrations.iter().any(|reg| reg.same_binding(&registration)) {
			debug!(subscriber = %registration.subscriber, "Subscription already registered");
			return false;
		}
		let registration = stamp(registration);
		debug!(subscriber = %registration.subscriber, "Registering subscription");
		registrations.push(registration);
		true
	}

	async fn unregister(&self, registration: &Registration) -> usize {
		let mut registrations = self.registrations.lock().await;
		let before = registrations.len();
		registrations.retain(|reg| !reg.same_binding(registration));
		let removed = before - registrations.len();
		debug!(subscriber = %registration.subscriber, removed, "Unregistered subscription");
		removed
	}

	async fn persist(&self) -> ClResult<()> {
		let registrations = self.registrations.lock().await;
		let json = serde_json::to_vec(&*registrations)?;
		tokio::fs::write(&self.path, json).await.inspect_err(|e| {
			error!(path = %self.path.display(), error = %e, "Unable to write the registrations file");
		})?;
		debug!(path = %self.path.display(), count = registrations.len(), "Registrations persisted");
		Ok(())
	}
}


// vim: ts=4
