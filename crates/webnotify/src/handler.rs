//! Registration and push HTTP handlers

use axum::{Json, extract::State};
use serde::Serialize;
use serde_json::{Value, json};

use crate::prelude::*;
use webnotify_push::Notification;
use webnotify_types::registration::Registration;

/// Response of a dispatch with at least one successful delivery
#[derive(Debug, Serialize)]
pub struct PushResponse {
	pub ok: bool,
	pub attempted: usize,
	pub success: usize,
	pub failed: usize,
}

fn validate(registration: &Registration) -> ClResult<()> {
	if registration.subscriber.is_empty() {
		return Err(Error::ValidationError("subscriber is required".into()));
	}
	if registration.subscription.is_empty() {
		return Err(Error::ValidationError("subscription is required".into()));
	}
	Ok(())
}

/// POST /api/v1/register
///
/// Registers a browser subscription for a subscriber. The store is written
/// even when the binding already exists, so a retry after a failed write
/// still lands on disk.
pub async fn post_register(
	State(app): State<App>,
	Json(registration): Json<Registration>,
) -> ClResult<Json<Value>> {
	validate(&registration)?;
	info!(subscriber = %registration.subscriber, "Registering push subscription");

	if !app.registrations.register_unique(registration).await {
		debug!("Subscription already registered");
	}
	app.registrations.persist().await?;

	Ok(Json(json!({ "ok": true })))
}

/// DELETE /api/v1/register
///
/// Removes a browser subscription. Unknown bindings are not an error; the
/// store is written either way.
pub async fn delete_register(
	State(app): State<App>,
	Json(registration): Json<Registration>,
) -> ClResult<Json<Value>> {
	validate(&registration)?;
	info!(subscriber = %registration.subscriber, "Unregistering push subscription");

	let removed = app.registrations.unregister(&registration).await;
	debug!(removed, "Unregistered push subscriptions");
	app.registrations.persist().await?;

	Ok(Json(json!({ "ok": true })))
}

/// POST /api/v1/push
///
/// Pushes an event to every subscription of a subscriber. Fails only when
/// every delivery failed, with the first failure as message.
pub async fn post_push(
	State(app): State<App>,
	Json(notification): Json<Notification>,
) -> ClResult<Json<PushResponse>> {
	let outcome = app
		.dispatcher
		.dispatch(&notification.subscriber, &notification.event)
		.await
		.inspect_err(|e| {
			warn!(subscriber = %notification.subscriber, error = %e, "Push dispatch failed");
		})?;

	Ok(Json(PushResponse {
		ok: true,
		attempted: outcome.attempted,
		success: outcome.succeeded(),
		failed: outcome.failed,
	}))
}

// vim: ts=4
