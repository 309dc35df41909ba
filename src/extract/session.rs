use aide::OperationInput;
use axum::{
	extract::{FromRef, FromRequestParts},
	http::{header, request},
};

use crate::{
	error::RouteError,
	openapi::{SECURITY_SCHEME_BEARER, SECURITY_SCHEME_COOKIE},
	route::auth::{self, model::UserStatus},
	session, Database,
};

pub const AUTHORIZATION_PREFIX: &str = "Bearer ";

/// Extracts the access token and related user from the request.
///
/// The token is read from the `Authorization` header first, then from the
/// token cookie. If neither exists, a [`auth::Error::NoToken`] is returned.
/// If the user no longer exists, a [`auth::Error::InvalidToken`] is returned.
/// Users that are suspended, banned or deactivated get [`auth::Error::AccountDisabled`].
///
/// ```rust
/// async fn route(session: Session) {
///   println!("{:?}", session.user);
/// }
/// ```
#[derive(Debug)]
pub struct Session {
	pub user: auth::model::User,
}

/// Reads the raw token from the request headers.
fn token(parts: &request::Parts) -> Option<String> {
	if let Some(value) = parts.headers.get(header::AUTHORIZATION) {
		return value
			.to_str()
			.ok()
			.and_then(|value| value.strip_prefix(AUTHORIZATION_PREFIX))
			.map(str::to_owned);
	}

	parts
		.headers
		.get_all(header::COOKIE)
		.into_iter()
		.filter_map(|value| value.to_str().ok())
		.flat_map(cookie::Cookie::split_parse)
		.filter_map(Result::ok)
		.find(|cookie| cookie.name() == session::COOKIE_NAME)
		.map(|cookie| cookie.value().to_owned())
}

#[axum::async_trait]
impl<S> FromRequestParts<S> for Session
where
	Database: FromRef<S>,
	session::Keys: FromRef<S>,
	S: Sync + Send,
{
	type Rejection = RouteError<auth::Error>;

	/// Extracts the session from the request using a bearer token or token cookie.
	async fn from_request_parts(
		parts: &mut request::Parts,
		state: &S,
	) -> Result<Self, Self::Rejection> {
		let token = token(parts).ok_or(auth::Error::NoToken)?;
		let claims = session::Keys::from_ref(state)
			.verify(&token)
			.map_err(|_| auth::Error::InvalidToken)?;

		let database = Database::from_ref(state);
		let user = sqlx::query_as::<_, auth::model::User>(r#"SELECT * FROM "user" WHERE id = $1"#)
			.bind(claims.sub)
			.fetch_optional(&database)
			.await?
			.ok_or(auth::Error::InvalidToken)?;

		if !user.is_active || user.status != UserStatus::Active {
			return Err(auth::Error::AccountDisabled.into());
		}

		Ok(Session { user })
	}
}

impl OperationInput for Session {
	/// Operation input for the session extractor.
	///
	/// This adds a bearer token or token cookie requirement to the `OpenAPI` operation.
	fn operation_input(_ctx: &mut aide::gen::GenContext, operation: &mut aide::openapi::Operation) {
		operation.security.extend([
			[(SECURITY_SCHEME_BEARER.to_string(), Vec::new())]
				.into_iter()
				.collect(),
			[(SECURITY_SCHEME_COOKIE.to_string(), Vec::new())]
				.into_iter()
				.collect(),
		]);
	}
}
