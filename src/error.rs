use std::{borrow::Cow, fmt};

use aide::OperationOutput;
use axum::{
	body::Body,
	extract::rejection,
	http::{Response, StatusCode},
	response::IntoResponse,
};
use schemars::JsonSchema;
use serde::Serialize;
use axum_jsonschema::JsonSchemaRejection;
use tower_governor::GovernorError;

use crate::extract::Json;

pub type Map = serde_json::Map<String, serde_json::Value>;

/// Errors shared by every route.
///
/// The Display trait is not sent to the client, so it can show
/// sensitive information.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
	#[error("validation error: {0}")]
	Validation(#[from] validator::ValidationErrors),
	#[error("json error: {0:?}")]
	Json(JsonSchemaRejection),
	#[error("query error: {0}")]
	Query(#[from] rejection::QueryRejection),
	#[error("path error: {0}")]
	Path(#[from] rejection::PathRejection),
	#[error("database error: {0}")]
	Database(#[from] sqlx::Error),
	#[error("token error: {0}")]
	Token(#[from] jsonwebtoken::errors::Error),
	#[error("rate limit error: {0}")]
	RateLimit(#[from] GovernorError),
}

impl From<JsonSchemaRejection> for AppError {
	fn from(rejection: JsonSchemaRejection) -> Self {
		Self::Json(rejection)
	}
}

/// Turns a JSON pointer such as `/taste/roast` into a dotted field name.
fn pointer_field(pointer: &str) -> Option<String> {
	let field = pointer
		.split('/')
		.skip(1)
		.map(|segment| segment.replace("~1", "/").replace("~0", "~"))
		.collect::<Vec<_>>()
		.join(".");

	(!field.is_empty()).then_some(field)
}

fn json_errors(rejection: JsonSchemaRejection) -> Vec<Message<'static>> {
	match rejection {
		JsonSchemaRejection::Json(error) => Message::new(error.body_text()).into_vec(),
		JsonSchemaRejection::Serde(error) => {
			let path = error.path().to_string();
			let message = Message::new(error.into_inner().to_string());

			match path.as_str() {
				"." => message.into_vec(),
				_ => message.field(path).into_vec(),
			}
		}
		JsonSchemaRejection::Schema(errors) => errors
			.into_iter()
			.map(|error| {
				let message = Message::new(error.error_description().to_string());

				match pointer_field(&error.instance_location().to_string()) {
					Some(field) => message.field(field),
					None => message,
				}
			})
			.collect(),
	}
}

/// A single error message presented to the client.
#[derive(Debug, Serialize, JsonSchema)]
pub struct Message<'a> {
	pub content: Cow<'a, str>,
	#[serde(skip_serializing_if = "Option::is_none")]
	pub field: Option<Cow<'a, str>>,
	#[serde(skip_serializing_if = "Option::is_none")]
	pub details: Option<Cow<'a, Map>>,
}

impl<'a> Message<'a> {
	pub fn new(content: impl Into<Cow<'a, str>>) -> Self {
		Self {
			content: content.into(),
			field: None,
			details: None,
		}
	}

	pub fn field(mut self, field: impl Into<Cow<'a, str>>) -> Self {
		self.field = Some(field.into());
		self
	}

	pub fn detail(mut self, key: &str, value: impl Into<serde_json::Value>) -> Self {
		self.details
			.get_or_insert_with(|| Cow::Owned(Map::new()))
			.to_mut()
			.insert(key.to_owned(), value.into());
		self
	}

	pub fn into_vec(self) -> Vec<Self> {
		vec![self]
	}
}

/// The body of every error response.
#[derive(Debug, Serialize, JsonSchema)]
pub struct ErrorResponse<'a> {
	pub success: bool,
	pub errors: Vec<Message<'a>>,
}

/// Describes how a route-specific error is presented to the client.
pub trait ErrorShape: fmt::Display {
	fn status(&self) -> StatusCode;

	fn into_errors(self) -> Vec<Message<'static>>
	where
		Self: Sized,
	{
		Message::new(self.to_string()).into_vec()
	}
}

impl AppError {
	fn status(&self) -> StatusCode {
		match self {
			Self::Validation(..) | Self::Json(..) | Self::Query(..) | Self::Path(..) => {
				StatusCode::BAD_REQUEST
			}
			Self::Token(..) => StatusCode::UNAUTHORIZED,
			Self::RateLimit(GovernorError::TooManyRequests { .. }) => StatusCode::TOO_MANY_REQUESTS,
			Self::Database(sqlx::Error::RowNotFound) => StatusCode::NOT_FOUND,
			Self::Database(..) | Self::RateLimit(..) => StatusCode::INTERNAL_SERVER_ERROR,
		}
	}

	fn into_errors(self) -> Vec<Message<'static>> {
		match self {
			Self::Validation(errors) => errors
				.field_errors()
				.into_iter()
				.flat_map(|(field, errors)| {
					errors.iter().map(move |error| {
						let content = error
							.message
							.as_ref()
							.map_or_else(|| error.code.to_string(), ToString::to_string);

						Message::new(content).field(field.to_string())
					})
				})
				.collect(),
			Self::Json(rejection) => json_errors(rejection),
			Self::Query(error) => Message::new(error.body_text()).into_vec(),
			Self::Path(error) => Message::new(error.body_text()).into_vec(),
			Self::Token(..) => Message::new("invalid token").into_vec(),
			Self::RateLimit(GovernorError::TooManyRequests { wait_time, .. }) => {
				Message::new("too many requests")
					.detail("wait_time", wait_time)
					.into_vec()
			}
			Self::Database(sqlx::Error::RowNotFound) => Message::new("not found").into_vec(),
			Self::Database(..) | Self::RateLimit(..) => Vec::new(),
		}
	}
}

/// An error returned from a route, either shared or specific to the route.
#[derive(Debug)]
pub enum RouteError<T> {
	App(AppError),
	Route(T),
}

impl<T: ErrorShape> From<T> for RouteError<T> {
	fn from(error: T) -> Self {
		Self::Route(error)
	}
}

impl<T> From<AppError> for RouteError<T> {
	fn from(error: AppError) -> Self {
		Self::App(error)
	}
}

impl<T> From<sqlx::Error> for RouteError<T> {
	fn from(error: sqlx::Error) -> Self {
		Self::App(AppError::Database(error))
	}
}

impl<T> From<jsonwebtoken::errors::Error> for RouteError<T> {
	fn from(error: jsonwebtoken::errors::Error) -> Self {
		Self::App(AppError::Token(error))
	}
}

impl<T> From<validator::ValidationErrors> for RouteError<T> {
	fn from(error: validator::ValidationErrors) -> Self {
		Self::App(AppError::Validation(error))
	}
}

impl<T: ErrorShape> RouteError<T> {
	pub fn status(&self) -> StatusCode {
		match self {
			Self::App(error) => error.status(),
			Self::Route(error) => error.status(),
		}
	}
}

impl<T> IntoResponse for RouteError<T>
where
	T: ErrorShape + fmt::Debug,
{
	fn into_response(self) -> Response<Body> {
		let status = self.status();

		if status.is_server_error() {
			tracing::error!(error = ?self, "request failed");
		}

		let errors = match self {
			Self::App(error) => error.into_errors(),
			Self::Route(error) => error.into_errors(),
		};

		(
			status,
			Json(ErrorResponse {
				success: false,
				errors,
			}),
		)
			.into_response()
	}
}

impl<T> OperationOutput for RouteError<T> {
	type Inner = ErrorResponse<'static>;
}

/// Used where no route-specific error exists, such as in extractors.
#[derive(Debug)]
pub enum Never {}

impl fmt::Display for Never {
	fn fmt(&self, _: &mut fmt::Formatter<'_>) -> fmt::Result {
		match *self {}
	}
}

impl ErrorShape for Never {
	fn status(&self) -> StatusCode {
		match *self {}
	}
}

impl IntoResponse for AppError {
	fn into_response(self) -> Response<Body> {
		RouteError::<Never>::App(self).into_response()
	}
}

/// Maps a unique constraint violation to a route error, leaving other errors as-is.
pub fn on_constraint<T>(
	error: sqlx::Error,
	map: impl FnOnce(&str) -> Option<T>,
) -> RouteError<T>
where
	T: ErrorShape,
{
	if let sqlx::Error::Database(ref database) = error {
		if let Some(error) = database.constraint().and_then(map) {
			return RouteError::Route(error);
		}
	}

	error.into()
}

#[cfg(test)]
mod test {
	use super::*;

	#[derive(Debug, thiserror::Error)]
	enum TestError {
		#[error("nope")]
		Nope,
	}

	impl ErrorShape for TestError {
		fn status(&self) -> StatusCode {
			StatusCode::CONFLICT
		}
	}

	#[test]
	fn test_route_error_status() {
		let error = RouteError::from(TestError::Nope);

		assert_eq!(error.status(), StatusCode::CONFLICT);

		let error = RouteError::<TestError>::from(sqlx::Error::RowNotFound);

		assert_eq!(error.status(), StatusCode::NOT_FOUND);

		let error = RouteError::<TestError>::from(sqlx::Error::PoolTimedOut);

		assert_eq!(error.status(), StatusCode::INTERNAL_SERVER_ERROR);
	}

	#[test]
	fn test_message_details() {
		let message = Message::new("unknown_post").detail("post", 5).detail("user", "a");
		let details = message.details.unwrap();

		assert_eq!(details["post"], 5);
		assert_eq!(details["user"], "a");
		assert!(message.field.is_none());
	}

	#[test]
	fn test_pointer_field() {
		assert_eq!(pointer_field("/rating").as_deref(), Some("rating"));
		assert_eq!(pointer_field("/taste/roast").as_deref(), Some("taste.roast"));
		assert_eq!(pointer_field("/a~1b").as_deref(), Some("a/b"));
		assert_eq!(pointer_field(""), None);
	}

	#[test]
	fn test_validation_messages_carry_field() {
		let mut errors = validator::ValidationErrors::new();
		errors.add("title", validator::ValidationError::new("length"));

		let messages = AppError::from(errors).into_errors();

		assert_eq!(messages.len(), 1);
		assert_eq!(messages[0].field.as_deref(), Some("title"));
		assert_eq!(messages[0].content, "length");
	}
}
