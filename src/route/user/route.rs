use axum::{extract::State, http::StatusCode};
use macros::route;

use crate::{
	extract::{Json, Path, Query, Session},
	openapi::tag,
	Database,
};

use super::{model, Error, RouteError};

/// The most users returned by a single search.
const SEARCH_LIMIT: i64 = 20;

fn require_admin(session: &Session) -> Result<(), Error> {
	if session.user.is_admin() {
		Ok(())
	} else {
		Err(Error::NotAdmin)
	}
}

/// Get all users
/// Returns a paginated response of all users, newest first.
#[route(tag = tag::USER)]
pub async fn get_users(
	State(database): State<Database>,
	Query(paginate): Query<model::Paginate>,
) -> Result<Json<Vec<model::User>>, RouteError> {
	let users = sqlx::query_as::<_, model::User>(
		r#"
			SELECT * FROM "user"
			ORDER BY created_at DESC
			LIMIT $1 OFFSET $2
		"#,
	)
	.bind(paginate.limit())
	.bind(paginate.offset())
	.fetch_all(&database)
	.await?;

	Ok(Json(users))
}

/// Search users
/// Returns users whose username contains the query, ignoring case.
#[route(tag = tag::USER)]
pub async fn search_users(
	State(database): State<Database>,
	Query(search): Query<model::SearchInput>,
) -> Result<Json<Vec<model::User>>, RouteError> {
	let users = sqlx::query_as::<_, model::User>(
		r#"
			SELECT * FROM "user"
			WHERE username ILIKE $1 ESCAPE '\'
			ORDER BY username ASC
			LIMIT $2
		"#,
	)
	.bind(format!("%{}%", crate::route::model::escape_like(&search.q)))
	.bind(SEARCH_LIMIT)
	.fetch_all(&database)
	.await?;

	Ok(Json(users))
}

/// Get single user
/// Returns the public profile of a user by their unique id.
#[route(tag = tag::USER)]
pub async fn get_user(
	State(database): State<Database>,
	Path(path): Path<model::IdInput>,
) -> Result<Json<model::User>, RouteError> {
	let user = sqlx::query_as::<_, model::User>(r#"SELECT * FROM "user" WHERE id = $1"#)
		.bind(path.id)
		.fetch_optional(&database)
		.await?;

	Ok(Json(user.ok_or(Error::UnknownUser(path.id))?))
}

/// Moderate user
/// Changes the role, status or activity of a user. Requires an administrator.
#[route(tag = tag::USER)]
pub async fn moderate_user(
	State(database): State<Database>,
	session: Session,
	Path(path): Path<model::IdInput>,
	Json(input): Json<model::ModerationInput>,
) -> Result<Json<model::User>, RouteError> {
	require_admin(&session)?;

	if path.id == session.user.id {
		return Err(Error::SelfModeration.into());
	}

	let user = sqlx::query_as::<_, model::User>(
		r#"
			UPDATE "user"
			SET
				role = COALESCE($1, role),
				status = COALESCE($2, status),
				is_active = COALESCE($3, is_active)
			WHERE id = $4
			RETURNING *
		"#,
	)
	.bind(input.role)
	.bind(input.status)
	.bind(input.is_active)
	.bind(path.id)
	.fetch_optional(&database)
	.await?
	.ok_or(Error::UnknownUser(path.id))?;

	tracing::info!(
		admin = %session.user.id,
		user = %user.id,
		role = ?user.role,
		status = ?user.status,
		is_active = user.is_active,
		"user moderated"
	);

	Ok(Json(user))
}

/// Delete user
/// Deletes a user along with their posts, comments and likes. Requires an administrator.
#[route(tag = tag::USER, response(status = 204, description = "Deleted successfully."))]
pub async fn delete_user(
	State(database): State<Database>,
	session: Session,
	Path(path): Path<model::IdInput>,
) -> Result<StatusCode, RouteError> {
	require_admin(&session)?;

	if path.id == session.user.id {
		return Err(Error::SelfModeration.into());
	}

	let mut tx = database.begin().await?;

	// replies by other users hang off these comments through `parent_id`,
	// which the foreign key cascade on `user_id` does not follow
	let replies = sqlx::query(
		r#"
			WITH RECURSIVE thread AS (
				SELECT id FROM comment WHERE user_id = $1
				UNION
				SELECT comment.id FROM comment
				JOIN thread ON comment.parent_id = thread.id
			)
			DELETE FROM comment WHERE id IN (SELECT id FROM thread)
		"#,
	)
	.bind(path.id)
	.execute(&mut *tx)
	.await?
	.rows_affected();

	let result = sqlx::query(r#"DELETE FROM "user" WHERE id = $1"#)
		.bind(path.id)
		.execute(&mut *tx)
		.await?;

	if result.rows_affected() == 0 {
		return Err(Error::UnknownUser(path.id).into());
	}

	tx.commit().await?;

	tracing::info!(admin = %session.user.id, user = %path.id, comments = replies, "user deleted");

	Ok(StatusCode::NO_CONTENT)
}
