//! Common value types

use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::{SystemTime, UNIX_EPOCH};

/// Unix time in nanoseconds. Zero means "not set".
#[derive(
	Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct Timestamp(pub i64);

impl Timestamp {
	pub fn now() -> Self {
		let nanos = SystemTime::now()
			.duration_since(UNIX_EPOCH)
			.map(|d| i64::try_from(d.as_nanos()).unwrap_or(i64::MAX))
			.unwrap_or(0);
		Timestamp(nanos)
	}

	pub fn is_zero(&self) -> bool {
		self.0 == 0
	}
}

impl fmt::Display for Timestamp {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(f, "{}", self.0)
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn test_now_is_set() {
		let ts = Timestamp::now();
		assert!(!ts.is_zero());
		assert!(Timestamp::default().is_zero());
	}

	#[test]
	fn test_serializes_as_plain_number() {
		let json = serde_json::to_string(&Timestamp(1_700_000_000_000_000_000)).unwrap();
		assert_eq!(json, "1700000000000000000");
	}
}

// vim: ts=4
