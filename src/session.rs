use std::sync::Arc;

use chrono::{Duration, Utc};
use jsonwebtoken::{DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

pub const COOKIE_NAME: &str = "token";

/// The claims carried by every access token.
#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
	/// The user id.
	pub sub: Uuid,
	pub email: String,
	pub iat: i64,
	pub exp: i64,
}

/// Signs and verifies access tokens with a shared HMAC secret.
#[derive(Clone)]
pub struct Keys {
	inner: Arc<KeysInner>,
}

struct KeysInner {
	encoding: EncodingKey,
	decoding: DecodingKey,
	ttl: Duration,
}

impl Keys {
	pub fn new(secret: &[u8], ttl: Duration) -> Self {
		Self {
			inner: Arc::new(KeysInner {
				encoding: EncodingKey::from_secret(secret),
				decoding: DecodingKey::from_secret(secret),
				ttl,
			}),
		}
	}

	/// Issues a token for the user that expires after the configured lifetime.
	pub fn issue(&self, user_id: Uuid, email: &str) -> Result<String, jsonwebtoken::errors::Error> {
		let now = Utc::now();
		let claims = Claims {
			sub: user_id,
			email: email.to_owned(),
			iat: now.timestamp(),
			exp: (now + self.inner.ttl).timestamp(),
		};

		jsonwebtoken::encode(&Header::default(), &claims, &self.inner.encoding)
	}

	/// Verifies the signature and expiry of a token.
	pub fn verify(&self, token: &str) -> Result<Claims, jsonwebtoken::errors::Error> {
		jsonwebtoken::decode::<Claims>(token, &self.inner.decoding, &Validation::default())
			.map(|data| data.claims)
	}

	pub fn ttl(&self) -> Duration {
		self.inner.ttl
	}
}

/// Creates an http-only cookie holding the access token
pub fn create_cookie(token: String, ttl: Duration) -> cookie::Cookie<'static> {
	cookie::Cookie::build((COOKIE_NAME, token))
		.secure(!cfg!(debug_assertions))
		.http_only(true)
		.same_site(cookie::SameSite::Lax)
		.max_age(cookie::time::Duration::seconds(ttl.num_seconds()))
		.path("/")
		.into()
}

/// Creates an empty token cookie used to invalidate a previous one
pub fn clear_cookie() -> cookie::Cookie<'static> {
	cookie::Cookie::build(COOKIE_NAME)
		.http_only(true)
		.path("/")
		.max_age(cookie::time::Duration::ZERO)
		.into()
}
