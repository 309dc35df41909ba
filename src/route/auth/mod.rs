use aide::axum::{
	routing::{get_with, post_with, put_with},
	ApiRouter,
};
use axum::http::StatusCode;

use crate::{error, AppState};

pub mod model;
pub mod profile;
pub mod route;

/// An error that can occur during authentication.
///
/// Note that the messages are presented to the client, so they should not contain
/// sensitive information.
#[derive(Debug, thiserror::Error)]
pub enum Error {
	#[error("invalid email or password")]
	InvalidEmailOrPassword,
	#[error("password validation error")]
	Argon(#[from] argon2::Error),
	#[error("no access token")]
	NoToken,
	#[error("invalid access token")]
	InvalidToken,
	#[error("account is disabled")]
	AccountDisabled,
	#[error("username already taken")]
	UsernameTaken,
	#[error("email already taken")]
	EmailTaken,
	#[error("unknown {category} question {key}")]
	UnknownQuestion { category: &'static str, key: String },
	#[error("answer to {0} is too long")]
	AnswerTooLong(String),
}

pub type RouteError = error::RouteError<Error>;

pub fn routes() -> ApiRouter<AppState> {
	use route::*;

	ApiRouter::new()
		.api_route("/login", post_with(login, login_docs))
		.api_route("/logout", get_with(logout, logout_docs))
		.api_route("/register", post_with(register, register_docs))
		.api_route("/me", get_with(get_me, get_me_docs))
		.api_route("/profile", put_with(update_profile, update_profile_docs))
		.api_route(
			"/profile/questions",
			get_with(get_questions, get_questions_docs),
		)
		.api_route("/profile/answers", put_with(update_answers, update_answers_docs))
}

impl error::ErrorShape for Error {
	fn status(&self) -> StatusCode {
		match self {
			Self::InvalidEmailOrPassword | Self::NoToken | Self::InvalidToken => {
				StatusCode::UNAUTHORIZED
			}
			Self::AccountDisabled => StatusCode::FORBIDDEN,
			Self::Argon(..) => StatusCode::INTERNAL_SERVER_ERROR,
			Self::UsernameTaken | Self::EmailTaken => StatusCode::CONFLICT,
			Self::UnknownQuestion { .. } | Self::AnswerTooLong(..) => StatusCode::BAD_REQUEST,
		}
	}

	fn into_errors(self) -> Vec<error::Message<'static>> {
		let message = error::Message::new(self.to_string());

		match self {
			Self::UsernameTaken => message.field("username").into_vec(),
			Self::EmailTaken => message.field("email").into_vec(),
			Self::UnknownQuestion { category, key } => message
				.field(category)
				.detail("question", key)
				.into_vec(),
			Self::AnswerTooLong(key) => message
				.detail("question", key)
				.detail("max", profile::MAX_ANSWER_LENGTH)
				.into_vec(),
			_ => message.into_vec(),
		}
	}
}

#[cfg(test)]
mod test {
	use crate::test::*;

	#[sqlx::test]
	#[ignore = "needs a Postgres DATABASE_URL"]
	async fn test_signup_flow(pool: Database) {
		let app = app(pool);

		let response = app
			.post("/auth/register")
			.json(&json!({
				"email": "john@smith.com",
				"username": "john",
				"password": "hunter2hunter",
			}))
			.await;

		assert_eq!(response.status_code(), 200);

		assert!(response
			.header("set-cookie")
			.to_str()
			.unwrap()
			.contains("token="));

		let response = app
			.post("/auth/login")
			.json(&json!({
				"email": "john@smith.com",
				"password": "hunter2hunter",
			}))
			.await;

		assert_eq!(response.status_code(), 200);

		let token = response.json::<Value>()["token"]
			.as_str()
			.unwrap()
			.to_owned();

		let response = app
			.get("/auth/me")
			.add_header(AUTHORIZATION, bearer(&token))
			.await;

		assert_eq!(response.status_code(), 200);
		assert_eq!(response.json::<Value>()["username"], "john");
	}

	#[sqlx::test]
	#[ignore = "needs a Postgres DATABASE_URL"]
	async fn test_wrong_password(pool: Database) {
		let app = app(pool);
		register(&app, "john").await;

		let response = app
			.post("/auth/login")
			.json(&json!({
				"email": "john@example.com",
				"password": "not-the-password",
			}))
			.await;

		assert_eq!(response.status_code(), 401);
	}

	#[sqlx::test]
	#[ignore = "needs a Postgres DATABASE_URL"]
	async fn test_duplicate_username(pool: Database) {
		let app = app(pool);
		register(&app, "john").await;

		let response = app
			.post("/auth/register")
			.json(&json!({
				"email": "other@example.com",
				"username": "john",
				"password": "hunter2hunter",
			}))
			.await;

		assert_eq!(response.status_code(), 409);
		assert_eq!(response.json::<Value>()["errors"][0]["field"], "username");
	}

	#[sqlx::test]
	#[ignore = "needs a Postgres DATABASE_URL"]
	async fn test_no_token(pool: Database) {
		let app = app(pool);

		assert_eq!(app.get("/auth/me").await.status_code(), 401);
	}

	#[sqlx::test]
	#[ignore = "needs a Postgres DATABASE_URL"]
	async fn test_coffee_profile(pool: Database) {
		let app = app(pool);
		let john = register(&app, "john").await;

		let response = app.get("/auth/profile/questions").await;

		assert_eq!(response.status_code(), 200);
		assert!(!response.json::<Vec<Value>>().is_empty());

		let response = app
			.put("/auth/profile/answers")
			.add_header(AUTHORIZATION, bearer(&john.token))
			.json(&json!({ "taste": { "roast": " dark " } }))
			.await;

		assert_eq!(response.status_code(), 200);
		assert_eq!(response.json::<Value>()["coffee_profile"]["taste"]["roast"], "dark");

		let response = app
			.put("/auth/profile/answers")
			.add_header(AUTHORIZATION, bearer(&john.token))
			.json(&json!({ "taste": { "favourite_band": "x" } }))
			.await;

		assert_eq!(response.status_code(), 400);
	}

	#[sqlx::test]
	#[ignore = "needs a Postgres DATABASE_URL"]
	async fn test_update_profile(pool: Database) {
		let app = app(pool);
		let john = register(&app, "john").await;

		let response = app
			.put("/auth/profile")
			.add_header(AUTHORIZATION, bearer(&john.token))
			.json(&json!({ "place": "Lisbon" }))
			.await;

		assert_eq!(response.status_code(), 200);

		let user = response.json::<Value>();

		assert_eq!(user["place"], "Lisbon");
		assert_eq!(user["username"], "john");
	}
}
