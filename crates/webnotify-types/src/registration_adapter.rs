//! Adapter that stores subscriber registrations.

use async_trait::async_trait;
use std::fmt::Debug;

use crate::prelude::*;
use crate::registration::{Registration, RegistrationList};

/// Predicate used by [`RegistrationAdapter::filter`]
pub type RegistrationFilter<'a> = &'a (dyn Fn(&Registration) -> bool + Send + Sync);

/// Registration store
///
/// Implementations own the canonical collection and hand out copies only.
/// Every call is serialized against every other call on the same store.
#[async_trait]
pub trait RegistrationAdapter: Debug + Send + Sync {
	/// All registrations of `subscriber`, in insertion order
	async fn find(&self, subscriber: &str) -> RegistrationList;

	/// All registrations matching `predicate`, in insertion order
	async fn filter(&self, predicate: RegistrationFilter<'_>) -> RegistrationList;

	/// Appends a registration, stamping `created`/`updated`.
	///
	/// Does not check for an existing binding. Use [`Self::register_unique`]
	/// when duplicates must be avoided under concurrency.
	async fn register(&self, registration: Registration);

	/// Appends a registration unless the same binding is already stored.
	/// The check and the insert happen under one lock acquisition.
	///
	/// Returns `true` if a record was inserted.
	async fn register_unique(&self, registration: Registration) -> bool;

	/// Removes every record with the same binding. Returns the number removed.
	async fn unregister(&self, registration: &Registration) -> usize;

	/// Writes the whole collection to durable storage
	async fn persist(&self) -> ClResult<()>;

	async fn contains(&self, subscriber: &str, subscription: &str) -> bool {
		!self
			.filter(&|reg: &Registration| {
				reg.subscriber.as_ref() == subscriber && reg.subscription.as_ref() == subscription
			})
			.await
			.is_empty()
	}
}

// vim: ts=4
