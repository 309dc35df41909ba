mod session;

pub use session::Session;

use aide::OperationIo;
use axum::{
	body::Body,
	extract::{FromRequest, FromRequestParts, Request},
	http::{request, Response},
	response::IntoResponse,
};
use schemars::JsonSchema;
use serde::de;
use validator::Validate;

use crate::error::AppError;

/// Runs the `validator` rules of an extracted value.
fn validated<T: Validate>(value: T) -> Result<T, AppError> {
	value.validate()?;
	Ok(value)
}

/// Extractor that deserializes a JSON body and validates it.
///
/// ```rust
/// async fn create_post(Json(input): Json<CreatePostInput>) {
///   // `input.rating` is already known to be within 1..=5
/// }
/// ```
#[derive(OperationIo)]
#[aide(
	input_with = "axum_jsonschema::Json<T>",
	output_with = "axum_jsonschema::Json<T>",
	json_schema
)]
pub struct Json<T>(pub T);

impl<T> IntoResponse for Json<T>
where
	T: serde::Serialize,
{
	fn into_response(self) -> Response<Body> {
		axum::extract::Json(self.0).into_response()
	}
}

#[axum::async_trait]
impl<T, S> FromRequest<S> for Json<T>
where
	T: de::DeserializeOwned + Validate + JsonSchema + 'static,
	S: Send + Sync,
{
	type Rejection = AppError;

	async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
		let axum_jsonschema::Json(value) =
			axum_jsonschema::Json::<T>::from_request(req, state).await?;

		validated(value).map(Self)
	}
}

/// Extractor that deserializes a query string and validates it.
///
/// ```rust
/// async fn search_users(Query(search): Query<SearchInput>) {
///   // ...
/// }
/// ```
#[derive(OperationIo)]
#[aide(
	input_with = "axum::extract::Query<T>",
	output_with = "axum_jsonschema::Json<T>",
	json_schema
)]
pub struct Query<T>(pub T);

#[axum::async_trait]
impl<T, S> FromRequestParts<S> for Query<T>
where
	T: de::DeserializeOwned + Validate,
	S: Send + Sync,
{
	type Rejection = AppError;

	async fn from_request_parts(
		parts: &mut request::Parts,
		state: &S,
	) -> Result<Self, Self::Rejection> {
		let axum::extract::Query(value) =
			axum::extract::Query::<T>::from_request_parts(parts, state).await?;

		validated(value).map(Self)
	}
}

/// Extractor that deserializes path parameters and validates them.
///
/// ```rust
/// async fn get_post(Path(path): Path<IdInput>) {
///   // ...
/// }
/// ```
#[derive(OperationIo)]
#[aide(
	input_with = "axum::extract::Path<T>",
	output_with = "axum_jsonschema::Json<T>",
	json_schema
)]
pub struct Path<T>(pub T);

#[axum::async_trait]
impl<T, S> FromRequestParts<S> for Path<T>
where
	T: de::DeserializeOwned + Validate + Send,
	S: Send + Sync,
{
	type Rejection = AppError;

	async fn from_request_parts(
		parts: &mut request::Parts,
		state: &S,
	) -> Result<Self, Self::Rejection> {
		let axum::extract::Path(value) =
			axum::extract::Path::<T>::from_request_parts(parts, state).await?;

		validated(value).map(Self)
	}
}

#[cfg(test)]
mod test {
	use axum::http::{self, header, StatusCode};
	use serde::Deserialize;

	use super::*;

	#[derive(Debug, Deserialize, Validate, JsonSchema)]
	struct Review {
		#[validate(range(min = 1, max = 5))]
		rating: i16,
	}

	async fn reject(body: &'static str) -> (StatusCode, serde_json::Value) {
		let request = http::Request::builder()
			.method("POST")
			.header(header::CONTENT_TYPE, "application/json")
			.body(Body::from(body))
			.unwrap();

		let Err(error) = Json::<Review>::from_request(request, &()).await else {
			panic!("{body} was accepted");
		};

		let response = error.into_response();
		let status = response.status();
		let body = axum::body::to_bytes(response.into_body(), usize::MAX)
			.await
			.unwrap();

		(status, serde_json::from_slice(&body).unwrap())
	}

	#[tokio::test]
	async fn test_out_of_range_names_field() {
		let (status, body) = reject(r#"{ "rating": 9 }"#).await;

		assert_eq!(status, StatusCode::BAD_REQUEST);
		assert_eq!(body["success"], false);
		assert_eq!(body["errors"][0]["field"], "rating");
	}

	#[tokio::test]
	async fn test_wrong_type_names_field() {
		let (status, body) = reject(r#"{ "rating": "five" }"#).await;

		assert_eq!(status, StatusCode::BAD_REQUEST);
		assert_eq!(body["errors"][0]["field"], "rating");
	}

	#[tokio::test]
	async fn test_malformed_body() {
		let (status, body) = reject("{").await;

		assert_eq!(status, StatusCode::BAD_REQUEST);
		assert!(body["errors"][0].get("field").is_none());
	}
}
