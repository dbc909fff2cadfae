//! Web Push notification sending
//!
//! Implements RFC 8030 (Push), RFC 8188 (Encrypted Content-Encoding),
//! RFC 8291 (Message Encryption for Web Push), and RFC 8292 (VAPID).

use async_trait::async_trait;
use base64::{Engine, engine::general_purpose::URL_SAFE_NO_PAD};
use http_body_util::{BodyExt, Full};
use hyper::body::Bytes;
use hyper_rustls::{HttpsConnector, HttpsConnectorBuilder};
use hyper_util::client::legacy::{Client, connect::HttpConnector};
use hyper_util::rt::TokioExecutor;
use jsonwebtoken::{Algorithm, EncodingKey, Header};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::{Duration, SystemTime, UNIX_EPOCH};

use crate::prelude::*;
use crate::vapid::KeyPair;

/// Default time a push service keeps an undelivered message (24 hours)
pub const DEFAULT_TTL: u32 = 86400;

/// VAPID JWT lifetime (12 hours)
const VAPID_EXPIRE: u64 = 12 * 3600;

/// Link opened when the notification is clicked
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NotificationData {
	#[serde(default)]
	pub href: String,
}

/// Notification payload delivered to the service worker
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct NotificationPayload {
	pub title: String,
	pub body: String,
	pub icon: String,
	pub badge: String,
	pub data: NotificationData,
}

/// One notification event addressed to every subscription of a subscriber
#[derive(Debug, Clone, Deserialize)]
pub struct Notification {
	pub subscriber: String,
	pub event: NotificationPayload,
}

/// Browser's PushSubscription format (`PushSubscription.toJSON()`)
#[derive(Debug, Clone, Deserialize)]
pub struct Subscription {
	/// Push endpoint URL
	pub endpoint: String,
	/// Expiration time (Unix timestamp in ms, from browser)
	#[serde(rename = "expirationTime", default)]
	pub expiration_time: Option<i64>,
	pub keys: SubscriptionKeys,
}

/// Browser subscription keys format
#[derive(Debug, Clone, Deserialize)]
pub struct SubscriptionKeys {
	/// P-256 public key (base64url encoded)
	pub p256dh: String,
	/// Auth secret (base64url encoded)
	pub auth: String,
}

impl Subscription {
	/// Decodes an opaque subscription token as stored in a registration
	pub fn decode(token: &str) -> Result<Self, PushError> {
		serde_json::from_str(token).map_err(|e| PushError::InvalidSubscription(e.to_string()))
	}
}

/// Delivers one encrypted message to one subscription
#[async_trait]
pub trait PushSender: fmt::Debug + Send + Sync {
	/// `subscriber` identifies the sender contact in the VAPID claims,
	/// `subscription` is the opaque token stored for the registration.
	async fn send(&self, subscriber: &str, subscription: &str, payload: &[u8])
	-> Result<(), PushError>;
}

/// Builds signed, encrypted push requests for one VAPID identity
struct RequestBuilder {
	public_key: Box<str>,
	encoding_key: EncodingKey,
	ttl: u32,
}

impl RequestBuilder {
	fn new(keys: &KeyPair, ttl: u32) -> ClResult<Self> {
		Ok(Self { public_key: keys.public.clone(), encoding_key: encoding_key(keys)?, ttl })
	}

	fn build_request(
		&self,
		subscriber: &str,
		subscription: &Subscription,
		payload: &[u8],
	) -> Result<hyper::Request<Full<Bytes>>, PushError> {
		let body = encrypt_payload(payload, &subscription.keys)?;
		let vapid_jwt = create_vapid_jwt(&subscription.endpoint, subscriber, &self.encoding_key)?;

		hyper::Request::builder()
			.method(hyper::Method::POST)
			.uri(&subscription.endpoint)
			.header("Content-Type", "application/octet-stream")
			.header("Content-Encoding", "aes128gcm")
			.header("TTL", self.ttl.to_string())
			.header("Authorization", format!("vapid t={}, k={}", vapid_jwt, self.public_key))
			.body(Full::new(Bytes::from(body)))
			.map_err(|e| PushError::Transport(format!("Request build error: {}", e)))
	}
}

/// Maps a push service response onto the delivery result
///
/// 2xx is delivered, 404/410 mean the subscription is gone, anything else is
/// a rejection carrying the response body.
async fn classify<B>(response: hyper::Response<B>) -> Result<(), PushError>
where
	B: hyper::body::Body,
{
	let status = response.status();
	if status.is_success() {
		Ok(())
	} else if status == hyper::StatusCode::GONE || status == hyper::StatusCode::NOT_FOUND {
		Err(PushError::Gone(status.as_u16()))
	} else {
		let body_bytes = response.into_body().collect().await.ok().map(|b| b.to_bytes());
		let body = body_bytes
			.as_ref()
			.and_then(|b| std::str::from_utf8(b).ok())
			.unwrap_or("")
			.to_string();
		Err(PushError::Rejected { status: status.as_u16(), body })
	}
}

/// [`PushSender`] talking to real push services over HTTPS
pub struct WebPushSender {
	client: Client<HttpsConnector<HttpConnector>, Full<Bytes>>,
	requests: RequestBuilder,
}

impl fmt::Debug for WebPushSender {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("WebPushSender")
			.field("public_key", &self.requests.public_key)
			.field("ttl", &self.requests.ttl)
			.finish_non_exhaustive()
	}
}

impl WebPushSender {
	pub fn new(keys: &KeyPair, ttl: u32) -> ClResult<Self> {
		let requests = RequestBuilder::new(keys, ttl)?;

		let connector = HttpsConnectorBuilder::new()
			.with_native_roots()
			.map_err(|e| Error::Internal(format!("TLS error: {}", e)))?
			.https_only()
			.enable_http1()
			.enable_http2()
			.build();
		let client = Client::builder(TokioExecutor::new()).build(connector);

		Ok(Self { client, requests })
	}
}

#[async_trait]
impl PushSender for WebPushSender {
	async fn send(
		&self,
		subscriber: &str,
		subscription: &str,
		payload: &[u8],
	) -> Result<(), PushError> {
		let subscription = Subscription::decode(subscription)?;
		let request = self.requests.build_request(subscriber, &subscription, payload)?;

		let response = self
			.client
			.request(request)
			.await
			.map_err(|e| PushError::Transport(e.to_string()))?;

		classify(response).await
	}
}

/// Decodes base64url that may or may not carry padding
fn decode_base64url(value: &str) -> Result<Vec<u8>, base64::DecodeError> {
	URL_SAFE_NO_PAD.decode(value.trim_end_matches('='))
}

/// Encrypt payload using ECE with the aes128gcm scheme (RFC 8188, 8291)
///
/// The result carries salt, record size and the ephemeral public key in its
/// header and is sent as the request body unchanged.
fn encrypt_payload(payload: &[u8], keys: &SubscriptionKeys) -> Result<Vec<u8>, PushError> {
	let p256dh = decode_base64url(&keys.p256dh)
		.map_err(|e| PushError::InvalidSubscription(format!("Invalid p256dh: {}", e)))?;
	let auth = decode_base64url(&keys.auth)
		.map_err(|e| PushError::InvalidSubscription(format!("Invalid auth: {}", e)))?;

	ece::encrypt(&p256dh, &auth, payload)
		.map_err(|e| PushError::Encryption(format!("ECE encryption failed: {:?}", e)))
}

/// Converts the raw VAPID scalar into a signing key for jsonwebtoken
fn encoding_key(keys: &KeyPair) -> ClResult<EncodingKey> {
	use p256::pkcs8::{EncodePrivateKey, LineEnding};

	let pem = keys
		.secret_key()?
		.to_pkcs8_pem(LineEnding::LF)
		.map_err(|e| Error::Crypto(format!("Failed to encode private key: {:?}", e)))?;

	EncodingKey::from_ec_pem(pem.as_bytes())
		.map_err(|e| Error::Crypto(format!("Invalid VAPID private key: {}", e)))
}

/// Contact for the `sub` claim: push services expect a `mailto:` or `https:`
/// URI, so bare identifiers are treated as email addresses.
fn vapid_subject(subscriber: &str) -> String {
	if subscriber.starts_with("mailto:") || subscriber.starts_with("https:") {
		subscriber.to_string()
	} else {
		format!("mailto:{}", subscriber)
	}
}

/// Create VAPID JWT (RFC 8292)
fn create_vapid_jwt(
	endpoint: &str,
	subscriber: &str,
	encoding_key: &EncodingKey,
) -> Result<String, PushError> {
	#[derive(Serialize)]
	struct VapidClaims {
		aud: String,
		exp: u64,
		sub: String,
	}

	let url = url::Url::parse(endpoint)
		.map_err(|e| PushError::InvalidSubscription(format!("Invalid endpoint URL: {}", e)))?;
	let origin = url.origin();
	if !origin.is_tuple() {
		return Err(PushError::InvalidSubscription(format!("Endpoint has no origin: {}", endpoint)));
	}

	let exp = SystemTime::now().duration_since(UNIX_EPOCH).unwrap_or(Duration::ZERO).as_secs()
		+ VAPID_EXPIRE;
	let claims =
		VapidClaims { aud: origin.ascii_serialization(), exp, sub: vapid_subject(subscriber) };

	// VAPID uses ES256 (P-256 curve, SHA-256)
	jsonwebtoken::encode(&Header::new(Algorithm::ES256), &claims, encoding_key)
		.map_err(|e| PushError::Signing(format!("JWT encoding failed: {}", e)))
}


// vim: ts=4
