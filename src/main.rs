#![warn(clippy::pedantic)]

mod chat;
mod config;
mod error;
mod extract;
mod openapi;
mod ratelimit;
mod route;
mod session;
mod trace;

use std::{net::SocketAddr, sync::Arc};

use argon2::Argon2;
use axum::{
	extract::Request,
	http::{header, HeaderValue, Method},
	ServiceExt,
};
use tower::Layer;
use tower_http::{cors::CorsLayer, normalize_path::NormalizePathLayer};

pub type Database = sqlx::PgPool;
pub type AppState = State;

/// The shared application state.
///
/// This should contain all shared dependencies that handlers need to access,
/// such as a database connection pool, a hash configuration (if it's expensive to create),
/// or the live chat connections.
#[derive(Clone, axum::extract::FromRef)]
pub struct State {
	pub database: Database,
	pub hasher: Argon2<'static>,
	pub keys: session::Keys,
	pub chat: Arc<chat::Hub>,
}

impl State {
	pub fn new(database: Database, keys: session::Keys) -> Self {
		Self {
			database,
			hasher: Argon2::default(),
			keys,
			chat: Arc::new(chat::Hub::new()),
		}
	}
}

#[derive(Debug, thiserror::Error)]
enum Error {
	#[error(transparent)]
	Config(#[from] config::Error),
	#[error(transparent)]
	Trace(#[from] trace::Error),
	#[error("database error: {0}")]
	Database(#[from] sqlx::Error),
	#[error("migration error: {0}")]
	Migrate(#[from] sqlx::migrate::MigrateError),
	#[error("invalid CORS_ORIGIN: {0}")]
	Cors(#[from] header::InvalidHeaderValue),
	#[error("invalid rate limit configuration")]
	RateLimit,
	#[error("io error: {0}")]
	Io(#[from] std::io::Error),
}

fn cors(origin: &str) -> Result<CorsLayer, header::InvalidHeaderValue> {
	Ok(CorsLayer::new()
		.allow_origin(origin.parse::<HeaderValue>()?)
		.allow_credentials(true)
		.allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE])
		.allow_headers([header::AUTHORIZATION, header::CONTENT_TYPE]))
}

async fn shutdown_signal() {
	if let Err(e) = tokio::signal::ctrl_c().await {
		tracing::error!("failed to listen for shutdown signal: {e}");
		std::future::pending::<()>().await;
	}

	tracing::info!("shutting down");
}

#[tokio::main]
async fn main() -> Result<(), Error> {
	dotenvy::dotenv().ok();

	let _guard = trace::init_tracing_subscriber(config::otel_enabled())?;
	let config = config::Config::from_env()?;

	let database = Database::connect(&config.database_url).await?;

	sqlx::migrate!().run(&database).await?;

	let state = State::new(
		database,
		session::Keys::new(config.jwt_secret.as_bytes(), config.token_ttl),
	);

	let limits = ratelimit::Limits::new().ok_or(Error::RateLimit)?;
	limits.cleanup_old_limits();

	let mut app = route::app(state, Some(&limits));

	if let Some(origin) = &config.cors_origin {
		app = app.layer(cors(origin)?);
	}

	let app = NormalizePathLayer::trim_trailing_slash().layer(app);
	let listener = tokio::net::TcpListener::bind((config.host, config.port)).await?;

	tracing::info!("listening on {}", listener.local_addr()?);

	axum::serve(
		listener,
		ServiceExt::<Request>::into_make_service_with_connect_info::<SocketAddr>(app),
	)
	.with_graceful_shutdown(shutdown_signal())
	.await?;

	Ok(())
}
