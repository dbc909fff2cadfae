//! Command line and environment configuration

use clap::Parser;
use std::path::PathBuf;
use std::time::Duration;

pub const DEFAULT_LISTEN: &str = "0.0.0.0:8000";

#[derive(Debug, Parser)]
#[command(name = "web-push-notification", version, about = "Web Push notification server")]
pub struct Config {
	/// Address or port to listen to
	#[arg(short, long, env = "PORT", default_value = DEFAULT_LISTEN)]
	pub port: String,

	/// Directory holding vapid.json and registrations.json
	#[arg(long, env = "DATA_DIR", default_value = ".")]
	pub data_dir: PathBuf,

	/// Directory of the static web client
	#[arg(long, env = "WEB_DIR", default_value = "web")]
	pub web_dir: PathBuf,

	/// Per-delivery push timeout in seconds
	#[arg(long, env = "PUSH_TIMEOUT_SECS", default_value_t = 10)]
	pub push_timeout: u64,
}

impl Config {
	/// Listen address; a bare port binds every interface
	pub fn listen(&self) -> String {
		if self.port.contains(':') {
			self.port.clone()
		} else {
			format!("0.0.0.0:{}", self.port)
		}
	}

	pub fn push_timeout(&self) -> Duration {
		Duration::from_secs(self.push_timeout)
	}

	pub fn vapid_path(&self) -> PathBuf {
		self.data_dir.join("vapid.json")
	}

	pub fn registrations_path(&self) -> PathBuf {
		self.data_dir.join("registrations.json")
	}
}


// vim: ts=4
