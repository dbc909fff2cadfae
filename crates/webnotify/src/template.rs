//! Client scripts with the VAPID public key filled in
//!
//! Browser code needs the application server key to subscribe. Scripts under
//! the web directory reference it as `%{PUBLIC_KEY}%`.

use axum::{
	extract::{Path, State},
	http::header,
	response::{IntoResponse, Response},
};

use crate::prelude::*;

pub const PUBLIC_KEY_PLACEHOLDER: &str = "%{PUBLIC_KEY}%";

pub fn render(template: &str, public_key: &str) -> String {
	template.replace(PUBLIC_KEY_PLACEHOLDER, public_key)
}

async fn render_file(app: &App, relative: &str) -> ClResult<Response> {
	if relative.split(['/', '\\']).any(|segment| segment == "..") {
		warn!(path = %relative, "Refusing script path outside the web directory");
		return Err(Error::NotFound);
	}

	let path = app.opts.web_dir.join(relative);
	let template = tokio::fs::read_to_string(&path).await.map_err(|e| {
		debug!(path = %path.display(), error = %e, "Script not readable");
		Error::NotFound
	})?;

	Ok(([(header::CONTENT_TYPE, "application/javascript")], render(&template, &app.keys.public))
		.into_response())
}

/// GET /scripts/{*path}
pub async fn get_script(State(app): State<App>, Path(path): Path<String>) -> ClResult<Response> {
	render_file(&app, &format!("scripts/{}", path)).await
}

/// GET /service-worker.js
pub async fn get_service_worker(State(app): State<App>) -> ClResult<Response> {
	render_file(&app, "service-worker.js").await
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn test_render_replaces_every_placeholder() {
		let rendered = render("const a = '%{PUBLIC_KEY}%';\nconst b = '%{PUBLIC_KEY}%';", "BKey");
		assert_eq!(rendered, "const a = 'BKey';\nconst b = 'BKey';");
	}

	#[test]
	fn test_render_without_placeholder() {
		assert_eq!(render("console.log(1);", "BKey"), "console.log(1);");
	}
}

// vim: ts=4
