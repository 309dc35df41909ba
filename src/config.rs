use std::{env, fmt::Display, net::IpAddr, str::FromStr};

use chrono::Duration;
use tracing::info;

#[derive(Debug, thiserror::Error)]
pub enum Error {
	#[error("{0} must be set")]
	Missing(&'static str),
	#[error("invalid {key}: {message}")]
	Invalid { key: &'static str, message: String },
}

/// Runtime configuration, read from the environment (and `.env` if present).
#[derive(Debug)]
pub struct Config {
	pub database_url: String,
	pub host: IpAddr,
	pub port: u16,
	pub jwt_secret: String,
	pub token_ttl: Duration,
	/// The browser origin allowed to make credentialed requests.
	pub cors_origin: Option<String>,
}

impl Config {
	pub fn from_env() -> Result<Self, Error> {
		Ok(Self {
			database_url: required("DATABASE_URL")?,
			host: try_load("HOST", "127.0.0.1")?,
			port: try_load("PORT", "3000")?,
			jwt_secret: required("JWT_SECRET")?,
			token_ttl: Duration::hours(try_load("TOKEN_TTL_HOURS", "168")?),
			cors_origin: env::var("CORS_ORIGIN").ok(),
		})
	}
}

/// Whether traces and metrics should be exported over OTLP.
pub fn otel_enabled() -> bool {
	env::var("OTEL_EXPORTER_OTLP_ENDPOINT").is_ok()
}

fn required(key: &'static str) -> Result<String, Error> {
	env::var(key).map_err(|_| Error::Missing(key))
}

fn try_load<T: FromStr>(key: &'static str, default: &str) -> Result<T, Error>
where
	T::Err: Display,
{
	let value = env::var(key).unwrap_or_else(|_| {
		info!("{key} not set, using default: {default}");
		default.to_string()
	});

	parse(key, &value)
}

fn parse<T: FromStr>(key: &'static str, value: &str) -> Result<T, Error>
where
	T::Err: Display,
{
	value.parse().map_err(|e: T::Err| Error::Invalid {
		key,
		message: e.to_string(),
	})
}

#[cfg(test)]
mod test {
	use super::*;

	#[test]
	fn test_parse() {
		assert_eq!(parse::<u16>("PORT", "8080").unwrap(), 8080);
		assert!(matches!(
			parse::<u16>("PORT", "eighty"),
			Err(Error::Invalid { key: "PORT", .. })
		));
		assert!(parse::<IpAddr>("HOST", "0.0.0.0").is_ok());
	}
}
