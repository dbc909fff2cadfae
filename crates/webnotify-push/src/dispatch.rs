//! Fan-out of one notification event to every subscription of a subscriber

use futures::future::join_all;
use serde::Serialize;
use std::sync::Arc;
use std::time::Duration;

use crate::prelude::*;
use crate::send::{NotificationPayload, PushSender};
use webnotify_types::registration::Registration;
use webnotify_types::registration_adapter::RegistrationAdapter;

/// Default bound on a single delivery
pub const DEFAULT_PUSH_TIMEOUT: Duration = Duration::from_secs(10);

/// Aggregate result of a dispatch with at least one success, or no
/// registrations at all
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct DispatchOutcome {
	pub attempted: usize,
	pub failed: usize,
}

impl DispatchOutcome {
	pub fn succeeded(&self) -> usize {
		self.attempted - self.failed
	}
}

#[derive(Debug)]
pub struct Dispatcher {
	registrations: Arc<dyn RegistrationAdapter>,
	sender: Arc<dyn PushSender>,
	timeout: Duration,
}

impl Dispatcher {
	pub fn new(
		registrations: Arc<dyn RegistrationAdapter>,
		sender: Arc<dyn PushSender>,
		timeout: Duration,
	) -> Self {
		Self { registrations, sender, timeout }
	}

	/// Delivers `payload` to every registration of `subscriber`.
	///
	/// Every registration gets exactly one attempt, concurrently, regardless of
	/// how the others fare. Fails with [`Error::DeliveryFailed`] only when
	/// there was at least one registration and every attempt failed; the cause
	/// is the failure of the earliest registration.
	pub async fn dispatch(
		&self,
		subscriber: &str,
		payload: &NotificationPayload,
	) -> ClResult<DispatchOutcome> {
		let registrations = self.registrations.find(subscriber).await;
		if registrations.is_empty() {
			info!(subscriber = %subscriber, "No registrations, nothing to dispatch");
			return Ok(DispatchOutcome::default());
		}

		let payload = serde_json::to_vec(payload)?;
		debug!(subscriber = %subscriber, event = %String::from_utf8_lossy(&payload), "Dispatching event");

		// join_all keeps registration order, so the first error is deterministic
		let results =
			join_all(registrations.iter().map(|reg| self.deliver(subscriber, reg, &payload))).await;

		let attempted = results.len();
		let mut errors = results.into_iter().filter_map(Result::err);
		let first_error = errors.next();
		let failed = usize::from(first_error.is_some()) + errors.count();

		info!(subscriber = %subscriber, attempted, failed, "Dispatch finished");

		match first_error {
			Some(cause) if failed == attempted => Err(Error::DeliveryFailed { attempted, cause }),
			_ => Ok(DispatchOutcome { attempted, failed }),
		}
	}

	async fn deliver(
		&self,
		subscriber: &str,
		registration: &Registration,
		payload: &[u8],
	) -> Result<(), PushError> {
		let send = self.sender.send(subscriber, &registration.subscription, payload);
		let result = match tokio::time::timeout(self.timeout, send).await {
			Ok(result) => result,
			Err(_) => Err(PushError::Timeout),
		};

		match &result {
			Ok(()) => debug!(subscriber = %subscriber, "Push notification sent"),
			Err(PushError::Gone(status)) => {
				info!(subscriber = %subscriber, status, "Push subscription is gone");
			}
			Err(e) => warn!(subscriber = %subscriber, error = %e, "Push notification failed"),
		}
		result
	}
}

// vim: ts=4
