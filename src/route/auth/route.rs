use aide::axum::IntoApiResponse;
use argon2::Argon2;
use axum::{
	extract::State,
	http::{header, StatusCode},
};
use macros::route;
use uuid::Uuid;

use crate::{
	error,
	extract::{Json, Session},
	openapi::tag,
	session, AppState, Database,
};

use super::{
	model::{self, UserStatus},
	profile, Error, RouteError,
};

pub const KEY_LENGTH: usize = 32;

/// Hashes a password with Argon2, using the user's id as a salt.
fn hash_password(
	hasher: &Argon2,
	password: &str,
	id: &Uuid,
) -> Result<[u8; KEY_LENGTH], argon2::Error> {
	let mut hash = [0; KEY_LENGTH];

	hasher.hash_password_into(password.as_bytes(), id.as_bytes(), &mut hash)?;
	Ok(hash)
}

/// Issues a token for `user`, returning it along with the cookie header that carries it.
fn authenticate(
	keys: &session::Keys,
	user: model::User,
) -> Result<impl IntoApiResponse, RouteError> {
	let token = keys.issue(user.id, &user.email)?;
	let cookie = session::create_cookie(token.clone(), keys.ttl());

	Ok((
		[(header::SET_COOKIE, cookie.to_string())],
		Json(model::AuthResponse { token, user }),
	))
}

fn email_or_username_taken(constraint: &str) -> Option<Error> {
	match constraint {
		"user_email_key" => Some(Error::EmailTaken),
		"user_username_key" => Some(Error::UsernameTaken),
		_ => None,
	}
}

/// Log in
/// Logs in to an account, returning an access token and setting it as a cookie.
#[route(tag = tag::AUTH, response(status = 200, description = "Logged in successfully.", shape = "Json<model::AuthResponse>"))]
pub async fn login(
	State(state): State<AppState>,
	Json(auth): Json<model::LoginInput>,
) -> Result<impl IntoApiResponse, RouteError> {
	let user = sqlx::query_as::<_, model::User>(r#"SELECT * FROM "user" WHERE email = $1"#)
		.bind(&auth.email)
		.fetch_optional(&state.database)
		.await?;

	let Some(user) = user else {
		return Err(Error::InvalidEmailOrPassword.into());
	};

	let hashed = hash_password(&state.hasher, &auth.password, &user.id).map_err(Error::Argon)?;

	if user.password != hashed {
		return Err(Error::InvalidEmailOrPassword.into());
	}

	if !user.is_active || user.status != UserStatus::Active {
		return Err(Error::AccountDisabled.into());
	}

	tracing::info!(user = %user.id, "user logged in");

	authenticate(&state.keys, user)
}

/// Log out
/// Clears the token cookie. Tokens are stateless, so bearer tokens stay valid until they expire.
#[route(tag = tag::AUTH, response(status = 204, description = "Logged out successfully."))]
pub async fn logout() -> impl IntoApiResponse {
	(
		[(header::SET_COOKIE, session::clear_cookie().to_string())],
		StatusCode::NO_CONTENT,
	)
}

/// Register account
/// Registers a new account, returning an access token and setting it as a cookie.
#[route(tag = tag::AUTH, response(status = 200, description = "Registered successfully.", shape = "Json<model::AuthResponse>"))]
pub async fn register(
	State(state): State<AppState>,
	Json(auth): Json<model::RegisterInput>,
) -> Result<impl IntoApiResponse, RouteError> {
	let user_id = Uuid::new_v4();
	let hashed = hash_password(&state.hasher, &auth.password, &user_id).map_err(Error::Argon)?;

	let user = sqlx::query_as::<_, model::User>(
		r#"
			INSERT INTO "user" (id, email, username, password, place)
			VALUES ($1, $2, $3, $4, $5)
			RETURNING *
		"#,
	)
	.bind(user_id)
	.bind(&auth.email)
	.bind(&auth.username)
	.bind(&hashed[..])
	.bind(&auth.place)
	.fetch_one(&state.database)
	.await
	.map_err(|e| error::on_constraint(e, email_or_username_taken))?;

	tracing::info!(user = %user.id, "user registered");

	authenticate(&state.keys, user)
}

/// Get user
/// Returns the authenticated user.
#[route(tag = tag::AUTH)]
pub async fn get_me(session: Session) -> Json<model::User> {
	Json(session.user)
}

/// Update profile
/// Updates the public profile of the authenticated user. Omitted fields are left unchanged.
#[route(tag = tag::AUTH)]
pub async fn update_profile(
	State(database): State<Database>,
	session: Session,
	Json(input): Json<model::UpdateUserInput>,
) -> Result<Json<model::User>, RouteError> {
	let user = sqlx::query_as::<_, model::User>(
		r#"
			UPDATE "user"
			SET
				email = COALESCE($1, email),
				username = COALESCE($2, username),
				place = COALESCE($3, place),
				photo_url = COALESCE($4, photo_url),
				cover_image_url = COALESCE($5, cover_image_url)
			WHERE id = $6
			RETURNING *
		"#,
	)
	.bind(input.email)
	.bind(input.username)
	.bind(input.place)
	.bind(input.photo_url)
	.bind(input.cover_image_url)
	.bind(session.user.id)
	.fetch_one(&database)
	.await
	.map_err(|e| error::on_constraint(e, email_or_username_taken))?;

	Ok(Json(user))
}

/// Get profile questions
/// Returns the catalog of coffee profile questions, grouped by category.
#[route(tag = tag::AUTH)]
pub async fn get_questions() -> Json<&'static [profile::Question]> {
	Json(profile::QUESTIONS)
}

/// Save profile answers
/// Replaces the coffee profile answers of the authenticated user. Blank answers are removed.
#[route(tag = tag::AUTH)]
pub async fn update_answers(
	State(database): State<Database>,
	session: Session,
	Json(answers): Json<model::CoffeeProfile>,
) -> Result<Json<model::User>, RouteError> {
	let answers = answers.normalize()?;

	let user = sqlx::query_as::<_, model::User>(
		r#"
			UPDATE "user"
			SET coffee_profile = $1
			WHERE id = $2
			RETURNING *
		"#,
	)
	.bind(sqlx::types::Json(answers))
	.bind(session.user.id)
	.fetch_one(&database)
	.await?;

	Ok(Json(user))
}

#[cfg(test)]
mod test {
	use super::*;

	#[test]
	fn test_hash_password_is_salted_by_id() {
		let hasher = Argon2::default();
		let a = Uuid::new_v4();
		let b = Uuid::new_v4();

		let first = hash_password(&hasher, "hunter2hunter", &a).unwrap();

		assert_eq!(first, hash_password(&hasher, "hunter2hunter", &a).unwrap());
		assert_ne!(first, hash_password(&hasher, "hunter2hunter", &b).unwrap());
		assert_ne!(first, hash_password(&hasher, "hunter3hunter", &a).unwrap());
	}

	#[test]
	fn test_constraint_mapping() {
		assert!(matches!(
			email_or_username_taken("user_email_key"),
			Some(Error::EmailTaken)
		));
		assert!(matches!(
			email_or_username_taken("user_username_key"),
			Some(Error::UsernameTaken)
		));
		assert!(email_or_username_taken("post_pkey").is_none());
	}
}
