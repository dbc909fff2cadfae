use axum::{
	Router,
	routing::{get, post},
};
use tower_http::{services::ServeDir, trace::TraceLayer};

use crate::prelude::*;
use crate::{handler, template};

pub fn init(app: App) -> Router {
	let api_router = Router::new()
		.route("/api/v1/push", post(handler::post_push))
		.route("/api/v1/register", post(handler::post_register).delete(handler::delete_register));

	let script_router = Router::new()
		.route("/scripts/{*path}", get(template::get_script))
		.route("/service-worker.js", get(template::get_service_worker));

	Router::new()
		.merge(api_router)
		.merge(script_router)
		.fallback_service(ServeDir::new(&app.opts.web_dir))
		.layer(TraceLayer::new_for_http())
		.with_state(app)
}

// vim: ts=4
