//! Registration records and query results

use serde::{Deserialize, Serialize};

use crate::types::Timestamp;

/// A durable binding between a subscriber and one push subscription token.
///
/// `subscription` is the JSON-serialized browser `PushSubscription` exactly
/// as the client sent it. The store compares it as an opaque string.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Registration {
	pub subscriber: Box<str>,
	pub subscription: Box<str>,
	#[serde(default)]
	pub created: Timestamp,
	#[serde(default)]
	pub updated: Timestamp,
}

impl Registration {
	pub fn new(subscriber: impl Into<Box<str>>, subscription: impl Into<Box<str>>) -> Self {
		Self {
			subscriber: subscriber.into(),
			subscription: subscription.into(),
			created: Timestamp::default(),
			updated: Timestamp::default(),
		}
	}

	/// Identity used for deduplication: exact `(subscriber, subscription)` match
	pub fn same_binding(&self, other: &Registration) -> bool {
		self.subscriber == other.subscriber && self.subscription == other.subscription
	}
}

/// Snapshot of registrations returned by store queries, in insertion order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct RegistrationList(Vec<Registration>);

impl RegistrationList {
	pub fn len(&self) -> usize {
		self.0.len()
	}

	pub fn is_empty(&self) -> bool {
		self.0.is_empty()
	}

	pub fn iter(&self) -> std::slice::Iter<'_, Registration> {
		self.0.iter()
	}

	pub fn first(&self) -> Option<&Registration> {
		self.0.first()
	}

	pub fn into_vec(self) -> Vec<Registration> {
		self.0
	}
}

impl From<Vec<Registration>> for RegistrationList {
	fn from(registrations: Vec<Registration>) -> Self {
		Self(registrations)
	}
}

impl FromIterator<Registration> for RegistrationList {
	fn from_iter<I: IntoIterator<Item = Registration>>(iter: I) -> Self {
		Self(iter.into_iter().collect())
	}
}

impl IntoIterator for RegistrationList {
	type Item = Registration;
	type IntoIter = std::vec::IntoIter<Registration>;

	fn into_iter(self) -> Self::IntoIter {
		self.0.into_iter()
	}
}

impl<'a> IntoIterator for &'a RegistrationList {
	type Item = &'a Registration;
	type IntoIter = std::slice::Iter<'a, Registration>;

	fn into_iter(self) -> Self::IntoIter {
		self.0.iter()
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn test_same_binding_ignores_timestamps() {
		let a = Registration::new("alice", "{\"endpoint\":\"https://push/1\"}");
		let mut b = a.clone();
		b.created = Timestamp(42);
		b.updated = Timestamp(43);
		assert!(a.same_binding(&b));

		let c = Registration::new("alice", "{\"endpoint\":\"https://push/2\"}");
		assert!(!a.same_binding(&c));
		let d = Registration::new("bob", "{\"endpoint\":\"https://push/1\"}");
		assert!(!a.same_binding(&d));
	}

	#[test]
	fn test_deserialize_without_timestamps() {
		let reg: Registration =
			serde_json::from_str(r#"{"subscriber":"alice","subscription":"tok"}"#).unwrap();
		assert_eq!(reg.subscriber.as_ref(), "alice");
		assert!(reg.created.is_zero());
		assert!(reg.updated.is_zero());
	}

	#[test]
	fn test_list_len() {
		let list: RegistrationList =
			vec![Registration::new("a", "1"), Registration::new("a", "2")].into();
		assert_eq!(list.len(), 2);
		assert!(!list.is_empty());
		assert!(RegistrationList::default().is_empty());
	}
}

// vim: ts=4
