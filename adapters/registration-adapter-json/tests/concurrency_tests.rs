//! Registration adapter concurrency tests
//!
//! Tests that concurrent registrations and persists never lose records
#![allow(clippy::panic, clippy::expect_used, clippy::unwrap_used)]

use std::sync::Arc;
use tempfile::TempDir;
use webnotify_registration_adapter_json::RegistrationAdapterJson;
use webnotify_types::registration::Registration;
use webnotify_types::registration_adapter::RegistrationAdapter;

async fn create_test_adapter() -> (Arc<RegistrationAdapterJson>, TempDir) {
	let temp_dir = TempDir::new().expect("Failed to create temp directory");
	let adapter = RegistrationAdapterJson::open(temp_dir.path().join("registrations.json"))
		.await
		.expect("Failed to open adapter");
	(Arc::new(adapter), temp_dir)
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_register_different_subscribers() {
	let (adapter, temp) = create_test_adapter().await;

	let mut handles = vec![];
	for i in 0..50 {
		let adapter_clone = Arc::clone(&adapter);
		handles.push(tokio::spawn(async move {
			adapter_clone
				.register(Registration::new(format!("user{}", i), format!("sub{}", i)))
				.await;
			adapter_clone.persist().await.expect("Failed to persist");
		}));
	}
	for handle in handles {
		handle.await.expect("Task panicked");
	}

	for i in 0..50 {
		assert_eq!(adapter.find(&format!("user{}", i)).await.len(), 1, "user{} lost", i);
	}

	// The last persist saw every record
	let reopened = RegistrationAdapterJson::open(temp.path().join("registrations.json"))
		.await
		.unwrap();
	assert_eq!(reopened.filter(&|_: &Registration| true).await.len(), 50);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_register_unique_same_pair() {
	let (adapter, _temp) = create_test_adapter().await;

	let mut handles = vec![];
	for _ in 0..20 {
		let adapter_clone = Arc::clone(&adapter);
		handles.push(tokio::spawn(async move {
			adapter_clone.register_unique(Registration::new("alice", "same-sub")).await
		}));
	}

	let mut inserted = 0;
	for handle in handles {
		if handle.await.expect("Task panicked") {
			inserted += 1;
		}
	}

	assert_eq!(inserted, 1);
	assert_eq!(adapter.find("alice").await.len(), 1);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_register_and_unregister() {
	let (adapter, _temp) = create_test_adapter().await;

	for i in 0..10 {
		adapter.register(Registration::new("alice", format!("old{}", i))).await;
	}

	let mut handles = vec![];
	for i in 0..10 {
		let adapter_clone = Arc::clone(&adapter);
		handles.push(tokio::spawn(async move {
			adapter_clone.unregister(&Registration::new("alice", format!("old{}", i))).await;
			adapter_clone.register(Registration::new("alice", format!("new{}", i))).await;
		}));
	}
	for handle in handles {
		handle.await.expect("Task panicked");
	}

	let alice = adapter.find("alice").await;
	assert_eq!(alice.len(), 10);
	assert!(alice.iter().all(|r| r.subscription.starts_with("new")));
}
