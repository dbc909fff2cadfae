use clap::Parser;
use std::process::ExitCode;
use std::sync::Arc;
use tracing::{error, info};

use webnotify::{AppBuilder, vapid};
use webnotify_registration_adapter_json::RegistrationAdapterJson;

mod config;

use config::Config;

#[tokio::main]
async fn main() -> ExitCode {
	let config = Config::parse();
	let mut builder = AppBuilder::new();

	let keys = match vapid::get_or_create(config.vapid_path()).await {
		Ok(keys) => keys,
		Err(e) => {
			error!("FATAL: Unable to load VAPID keys: {}", e);
			return ExitCode::FAILURE;
		}
	};
	let registrations = match RegistrationAdapterJson::open(config.registrations_path()).await {
		Ok(registrations) => registrations,
		Err(e) => {
			error!("FATAL: Unable to open the registrations store: {}", e);
			return ExitCode::FAILURE;
		}
	};
	info!("VAPID public key: {}", keys.public);

	builder
		.listen(config.listen())
		.web_dir(config.web_dir.as_path())
		.push_timeout(config.push_timeout())
		.keys(keys)
		.registration_adapter(Arc::new(registrations));

	match builder.run().await {
		Ok(()) => ExitCode::SUCCESS,
		Err(e) => {
			error!("FATAL: {}", e);
			ExitCode::FAILURE
		}
	}
}

// vim: ts=4
