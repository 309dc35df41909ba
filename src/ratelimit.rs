use std::{sync::Arc, time::Duration};

use axum::{
	body::Body,
	response::{IntoResponse, Response},
};
use governor::middleware::StateInformationMiddleware;
use tower_governor::{
	governor::{GovernorConfig, GovernorConfigBuilder},
	key_extractor::PeerIpKeyExtractor,
	GovernorError, GovernorLayer,
};

use crate::error::AppError;

type Config = Arc<GovernorConfig<PeerIpKeyExtractor, StateInformationMiddleware>>;

/// Per-IP rate limits. Keys are peer addresses, so the service must be
/// served with connect info.
#[derive(Clone)]
pub struct Limits {
	/// Applied to the whole API.
	pub default: Config,
	/// Applied to login and registration.
	pub secure: Config,
}

impl Limits {
	pub fn new() -> Option<Self> {
		Some(Self {
			default: Arc::new(
				GovernorConfigBuilder::default()
					.per_second(10)
					.burst_size(50)
					.use_headers()
					.error_handler(error_handler)
					.finish()?,
			),
			secure: Arc::new(
				GovernorConfigBuilder::default()
					.per_second(2)
					.burst_size(5)
					.use_headers()
					.error_handler(error_handler)
					.finish()?,
			),
		})
	}

	pub fn default_layer(&self) -> GovernorLayer<PeerIpKeyExtractor, StateInformationMiddleware> {
		GovernorLayer {
			config: self.default.clone(),
		}
	}

	pub fn secure_layer(&self) -> GovernorLayer<PeerIpKeyExtractor, StateInformationMiddleware> {
		GovernorLayer {
			config: self.secure.clone(),
		}
	}

	/// Periodically drops stale entries from the limiter storage.
	pub fn cleanup_old_limits(&self) {
		let limiters = [self.default.limiter().clone(), self.secure.limiter().clone()];
		let interval = Duration::from_secs(60);

		std::thread::spawn(move || loop {
			std::thread::sleep(interval);

			for limiter in &limiters {
				tracing::debug!("rate limiting storage size: {}", limiter.len());

				limiter.retain_recent();
			}
		});
	}
}

fn error_handler(error: GovernorError) -> Response<Body> {
	AppError::from(error).into_response()
}
