//! App builder - constructs and runs the webnotify application

use std::{path::Path, path::PathBuf, sync::Arc, time::Duration};

use crate::prelude::*;
use crate::routes;
use webnotify_push::dispatch::DEFAULT_PUSH_TIMEOUT;
use webnotify_push::send::DEFAULT_TTL;
use webnotify_push::{Dispatcher, KeyPair, PushSender, WebPushSender};
use webnotify_types::registration_adapter::RegistrationAdapter;

pub const VERSION: &str = env!("CARGO_PKG_VERSION");

#[derive(Debug, Clone)]
pub struct AppBuilderOpts {
	pub listen: Box<str>,
	pub web_dir: Box<Path>,
	pub push_timeout: Duration,
	pub push_ttl: u32,
}

#[derive(Debug)]
pub struct AppState {
	pub opts: AppBuilderOpts,
	pub keys: Arc<KeyPair>,
	pub registrations: Arc<dyn RegistrationAdapter>,
	pub dispatcher: Dispatcher,
}

pub type App = Arc<AppState>;

pub struct AppBuilder {
	opts: AppBuilderOpts,
	keys: Option<KeyPair>,
	registration_adapter: Option<Arc<dyn RegistrationAdapter>>,
	push_sender: Option<Arc<dyn PushSender>>,
}

impl AppBuilder {
	pub fn new() -> Self {
		let _ = tracing_subscriber::fmt()
			.with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
			.with_target(false)
			.try_init();
		AppBuilder {
			opts: AppBuilderOpts {
				listen: "0.0.0.0:8000".into(),
				web_dir: PathBuf::from("./web").into(),
				push_timeout: DEFAULT_PUSH_TIMEOUT,
				push_ttl: DEFAULT_TTL,
			},
			keys: None,
			registration_adapter: None,
			push_sender: None,
		}
	}

	// Opts
	pub fn listen(&mut self, listen: impl Into<Box<str>>) -> &mut Self {
		self.opts.listen = listen.into();
		self
	}
	pub fn web_dir(&mut self, web_dir: impl Into<Box<Path>>) -> &mut Self {
		self.opts.web_dir = web_dir.into();
		self
	}
	pub fn push_timeout(&mut self, push_timeout: Duration) -> &mut Self {
		self.opts.push_timeout = push_timeout;
		self
	}
	pub fn push_ttl(&mut self, push_ttl: u32) -> &mut Self {
		self.opts.push_ttl = push_ttl;
		self
	}

	// Components
	pub fn keys(&mut self, keys: KeyPair) -> &mut Self {
		self.keys = Some(keys);
		self
	}
	pub fn registration_adapter(
		&mut self,
		registration_adapter: Arc<dyn RegistrationAdapter>,
	) -> &mut Self {
		self.registration_adapter = Some(registration_adapter);
		self
	}
	/// Overrides the Web Push delivery. Defaults to [`WebPushSender`].
	pub fn push_sender(&mut self, push_sender: Arc<dyn PushSender>) -> &mut Self {
		self.push_sender = Some(push_sender);
		self
	}

	pub fn build(self) -> ClResult<App> {
		let Some(keys) = self.keys else {
			error!("FATAL: No VAPID keys configured");
			return Err(Error::Internal("No VAPID keys configured".to_string()));
		};
		let Some(registrations) = self.registration_adapter else {
			error!("FATAL: No registration adapter configured");
			return Err(Error::Internal("No registration adapter configured".to_string()));
		};
		let keys = Arc::new(keys);

		let push_sender: Arc<dyn PushSender> = match self.push_sender {
			Some(sender) => sender,
			None => {
				if rustls::crypto::CryptoProvider::install_default(
					rustls::crypto::aws_lc_rs::default_provider(),
				)
				.is_err()
				{
					debug!("Crypto provider already installed");
				}
				Arc::new(WebPushSender::new(&keys, self.opts.push_ttl).inspect_err(|e| {
					error!("FATAL: Cannot create push client: {}", e);
				})?)
			}
		};

		let dispatcher =
			Dispatcher::new(registrations.clone(), push_sender, self.opts.push_timeout);

		Ok(Arc::new(AppState { opts: self.opts, keys, registrations, dispatcher }))
	}

	pub async fn run(self) -> ClResult<()> {
		info!("webnotify V{}", VERSION);

		let app = self.build()?;
		let router = routes::init(app.clone());

		let listener =
			tokio::net::TcpListener::bind(app.opts.listen.as_ref()).await.inspect_err(|e| {
				error!("FATAL: Unable to listen to {}: {}", app.opts.listen, e);
			})?;
		info!("Listening on {}", app.opts.listen);
		info!("Serving web files from {}", app.opts.web_dir.display());

		axum::serve(listener, router).await?;
		Ok(())
	}
}

impl Default for AppBuilder {
	fn default() -> Self {
		Self::new()
	}
}

// vim: ts=4
