use std::sync::Arc;

use aide::{axum::ApiRouter, openapi::OpenApi};
use axum::{http::HeaderName, Extension, Router};
use tower_http::{
	compression::CompressionLayer,
	request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer},
	trace::TraceLayer,
};

use crate::{openapi, ratelimit::Limits, AppState};

pub mod auth;
pub mod chat;
pub mod comment;
pub mod docs;
pub mod location;
pub mod model;
pub mod post;
pub mod user;

const REQUEST_ID_HEADER: HeaderName = HeaderName::from_static("x-request-id");

/// Builds the whole application, with its OpenAPI document served under `/docs`.
///
/// Rate limits key on the peer address, so they are only applied when the
/// router is served with connect info.
pub fn app(state: AppState, limits: Option<&Limits>) -> Router {
	aide::gen::on_error(|error| tracing::warn!("openapi generation error: {error}"));
	aide::gen::extract_schemas(true);

	let mut auth = auth::routes();

	if let Some(limits) = limits {
		auth = auth.layer(limits.secure_layer());
	}

	let mut api = OpenApi::default();
	let mut router = ApiRouter::new()
		.nest("/auth", auth)
		.nest("/users", user::routes())
		.nest("/post", post::routes())
		.nest("/comment", comment::routes())
		.nest("/location", location::routes())
		.nest("/chat", chat::routes())
		.nest("/docs", docs::routes())
		.finish_api_with(&mut api, openapi::docs)
		.layer(Extension(Arc::new(api)));

	if let Some(limits) = limits {
		router = router.layer(limits.default_layer());
	}

	router
		.layer(CompressionLayer::new())
		.layer(PropagateRequestIdLayer::new(REQUEST_ID_HEADER))
		.layer(TraceLayer::new_for_http())
		.layer(SetRequestIdLayer::new(REQUEST_ID_HEADER, MakeRequestUuid))
		.with_state(state)
}
