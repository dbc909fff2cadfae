//! VAPID key material
//!
//! The key pair identifies this application server to push services. Browser
//! subscriptions are bound to the public key, so the pair is generated once,
//! persisted, and reused on every start.

use base64::{Engine, engine::general_purpose::URL_SAFE_NO_PAD};
use p256::elliptic_curve::rand_core::OsRng;
use p256::elliptic_curve::sec1::ToEncodedPoint;
use serde::{Deserialize, Serialize};
use std::io::ErrorKind;
use std::path::Path;
use tokio::io::AsyncWriteExt;

use crate::prelude::*;

/// VAPID key pair
///
/// `public` is the uncompressed P-256 point (65 bytes) and `private` the raw
/// 32-byte scalar, both base64url encoded without padding.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct KeyPair {
	pub public: Box<str>,
	pub private: Box<str>,
}

impl KeyPair {
	/// Generates a fresh P-256 key pair
	pub fn generate() -> Self {
		let secret = p256::SecretKey::random(&mut OsRng);
		let public = secret.public_key().to_encoded_point(false);

		KeyPair {
			public: URL_SAFE_NO_PAD.encode(public.as_bytes()).into(),
			private: URL_SAFE_NO_PAD.encode(secret.to_bytes()).into(),
		}
	}

	/// Decodes the private scalar
	pub fn secret_key(&self) -> ClResult<p256::SecretKey> {
		let bytes = URL_SAFE_NO_PAD
			.decode(self.private.as_bytes())
			.map_err(|e| Error::Crypto(format!("Invalid base64url private key: {}", e)))?;
		p256::SecretKey::from_slice(&bytes)
			.map_err(|e| Error::Crypto(format!("Invalid P-256 private key: {}", e)))
	}
}

/// Loads the key pair stored at `path`, generating and saving one if the
/// file does not exist yet.
///
/// Every failure is meant to stop the process: starting with a different key
/// would silently invalidate every existing subscription.
pub async fn get_or_create(path: impl AsRef<Path>) -> ClResult<KeyPair> {
	let path = path.as_ref();

	match tokio::fs::read(path).await {
		Ok(buf) => {
			let keys = parse(path, &buf)?;
			info!(path = %path.display(), "VAPID keys loaded");
			Ok(keys)
		}
		Err(e) if e.kind() == ErrorKind::NotFound => {
			let keys = KeyPair::generate();
			save(path, &keys).await?;
			info!(path = %path.display(), "VAPID keys created");
			Ok(keys)
		}
		Err(e) => {
			error!(path = %path.display(), error = %e, "Unable to read VAPID keys");
			Err(Error::CorruptState(format!("{}: {}", path.display(), e)))
		}
	}
}

fn parse(path: &Path, buf: &[u8]) -> ClResult<KeyPair> {
	let keys: KeyPair = serde_json::from_slice(buf).map_err(|e| {
		error!(path = %path.display(), error = %e, "Unable to deserialize VAPID keys");
		Error::CorruptState(format!("{}: {}", path.display(), e))
	})?;
	keys.secret_key().map_err(|e| {
		error!(path = %path.display(), error = %e, "Stored VAPID private key is unusable");
		Error::CorruptState(format!("{}: {}", path.display(), e))
	})?;
	Ok(keys)
}

/// Writes the key file. Refuses to overwrite an existing file.
///
/// The content goes to a sibling `.tmp` file first and is linked into place
/// only once synced, so an interrupted write never leaves a truncated key
/// file behind.
async fn save(path: &Path, keys: &KeyPair) -> ClResult<()> {
	let json = serde_json::to_vec(keys)?;
	let tmp = path.with_extension("json.tmp");

	let result = write_then_link(&tmp, path, &json).await;
	if let Err(e) = tokio::fs::remove_file(&tmp).await
		&& e.kind() != ErrorKind::NotFound
	{
		warn!(path = %tmp.display(), error = %e, "Unable to remove temporary VAPID key file");
	}

	result.map_err(|e| {
		error!(path = %path.display(), error = %e, "Unable to create VAPID key file");
		Error::CorruptState(format!("cannot create {}: {}", path.display(), e))
	})
}

async fn write_then_link(tmp: &Path, path: &Path, json: &[u8]) -> std::io::Result<()> {
	let mut file = tokio::fs::File::create(tmp).await?;
	file.write_all(json).await?;
	file.sync_all().await?;
	drop(file);
	tokio::fs::hard_link(tmp, path).await
}

#[cfg(test)]
mod tests {
	use super::*;
	use tempfile::TempDir;

	#[test]
	fn test_generate_shapes() {
		let keys = KeyPair::generate();
		let public = URL_SAFE_NO_PAD.decode(keys.public.as_bytes()).unwrap();
		let private = URL_SAFE_NO_PAD.decode(keys.private.as_bytes()).unwrap();

		assert_eq!(public.len(), 65);
		assert_eq!(public[0], 0x04);
		assert_eq!(private.len(), 32);
		assert!(keys.secret_key().is_ok());
	}

	#[test]
	fn test_generate_is_random() {
		assert_ne!(KeyPair::generate(), KeyPair::generate());
	}

	#[tokio::test]
	async fn test_get_or_create_is_stable() {
		let tmp = TempDir::new().unwrap();
		let path = tmp.path().join("vapid.json");

		let created = get_or_create(&path).await.unwrap();
		assert!(path.exists());
		let first_bytes = std::fs::read(&path).unwrap();

		let loaded = get_or_create(&path).await.unwrap();
		let again = get_or_create(&path).await.unwrap();
		assert_eq!(created, loaded);
		assert_eq!(loaded, again);
		assert_eq!(std::fs::read(&path).unwrap(), first_bytes);
	}

	#[tokio::test]
	async fn test_file_format() {
		let tmp = TempDir::new().unwrap();
		let path = tmp.path().join("vapid.json");
		let keys = get_or_create(&path).await.unwrap();

		let value: serde_json::Value =
			serde_json::from_slice(&std::fs::read(&path).unwrap()).unwrap();
		assert_eq!(value["public"], keys.public.as_ref());
		assert_eq!(value["private"], keys.private.as_ref());
	}

	#[tokio::test]
	async fn test_corrupt_file_is_fatal() {
		let tmp = TempDir::new().unwrap();
		let path = tmp.path().join("vapid.json");
		std::fs::write(&path, b"garbage").unwrap();

		let err = get_or_create(&path).await.unwrap_err();
		assert!(matches!(err, Error::CorruptState(_)));
		assert_eq!(std::fs::read(&path).unwrap(), b"garbage");
	}

	#[tokio::test]
	async fn test_unusable_private_key_is_fatal() {
		let tmp = TempDir::new().unwrap();
		let path = tmp.path().join("vapid.json");
		std::fs::write(&path, br#"{"public":"abc","private":"not-a-key"}"#).unwrap();

		assert!(matches!(get_or_create(&path).await, Err(Error::CorruptState(_))));
	}

	#[tokio::test]
	async fn test_unwritable_location_is_corrupt_state() {
		let tmp = TempDir::new().unwrap();
		let path = tmp.path().join("no-such-dir").join("vapid.json");

		let err = get_or_create(&path).await.unwrap_err();
		assert!(matches!(err, Error::CorruptState(_)), "unexpected error: {:?}", err);
		assert!(!path.exists());
	}

	#[tokio::test]
	async fn test_leftover_temp_file_is_replaced() {
		let tmp = TempDir::new().unwrap();
		let path = tmp.path().join("vapid.json");
		let leftover = tmp.path().join("vapid.json.tmp");
		std::fs::write(&leftover, b"{\"public\":\"trunc").unwrap();

		let keys = get_or_create(&path).await.unwrap();
		assert!(!leftover.exists());
		assert_eq!(get_or_create(&path).await.unwrap(), keys);
	}

	#[tokio::test]
	async fn test_save_refuses_to_overwrite() {
		let tmp = TempDir::new().unwrap();
		let path = tmp.path().join("vapid.json");
		let keys = get_or_create(&path).await.unwrap();

		let err = save(&path, &KeyPair::generate()).await.unwrap_err();
		assert!(matches!(err, Error::CorruptState(_)));
		assert_eq!(get_or_create(&path).await.unwrap(), keys);
		assert!(!tmp.path().join("vapid.json.tmp").exists());
	}
}

// vim: ts=4
