use axum::{extract::State, http::StatusCode};
use macros::route;
use sqlx::PgExecutor;
use uuid::Uuid;

use crate::{
	extract::{Json, Path, Session},
	openapi::tag,
	Database,
};

use super::{model, tree, Error, RouteError};

const SELECT_COMMENT_VIEW: &str = r#"
	SELECT comment.*, "user".username
	FROM comment
	JOIN "user" ON "user".id = comment.user_id
"#;

async fn fetch_comment(
	executor: impl PgExecutor<'_>,
	comment_id: Uuid,
) -> Result<Option<model::CommentView>, sqlx::Error> {
	sqlx::query_as::<_, model::CommentView>(&format!(
		"{SELECT_COMMENT_VIEW} WHERE comment.id = $1"
	))
	.bind(comment_id)
	.fetch_optional(executor)
	.await
}

/// Makes sure the comment exists and that `session` may change it.
async fn check_owner(
	executor: impl PgExecutor<'_>,
	session: &Session,
	comment_id: Uuid,
	allow_admin: bool,
) -> Result<(), RouteError> {
	let owner = sqlx::query_scalar::<_, Uuid>("SELECT user_id FROM comment WHERE id = $1")
		.bind(comment_id)
		.fetch_optional(executor)
		.await?
		.ok_or(Error::UnknownComment(comment_id))?;

	if owner == session.user.id || (allow_admin && session.user.is_admin()) {
		Ok(())
	} else {
		Err(Error::NotOwner(comment_id).into())
	}
}

/// Get post comments
/// Returns the comments of a post as reply trees, oldest first.
#[route(tag = tag::COMMENT)]
pub async fn get_post_comments(
	State(database): State<Database>,
	Path(path): Path<model::PostIdInput>,
) -> Result<Json<Vec<model::CommentNode>>, RouteError> {
	let comments = sqlx::query_as::<_, model::CommentView>(&format!(
		"{SELECT_COMMENT_VIEW} WHERE comment.post_id = $1 ORDER BY comment.created_at, comment.seq"
	))
	.bind(path.post_id)
	.fetch_all(&database)
	.await?;

	Ok(Json(tree::build_tree(comments)))
}

/// Create comment
/// Comments on a post, or replies to another comment on the same post.
#[route(tag = tag::COMMENT)]
pub async fn create_comment(
	State(database): State<Database>,
	session: Session,
	Json(input): Json<model::CreateCommentInput>,
) -> Result<Json<model::CommentView>, RouteError> {
	let mut tx = database.begin().await?;

	sqlx::query_scalar::<_, Uuid>("SELECT id FROM post WHERE id = $1")
		.bind(input.post_id)
		.fetch_optional(&mut *tx)
		.await?
		.ok_or(Error::UnknownPost(input.post_id))?;

	if let Some(parent_id) = input.parent_id {
		sqlx::query_scalar::<_, Uuid>("SELECT id FROM comment WHERE id = $1 AND post_id = $2")
			.bind(parent_id)
			.bind(input.post_id)
			.fetch_optional(&mut *tx)
			.await?
			.ok_or(Error::UnknownParent(parent_id))?;
	}

	let id = sqlx::query_scalar::<_, Uuid>(
		r#"
			INSERT INTO comment (user_id, post_id, parent_id, content)
			VALUES ($1, $2, $3, $4)
			RETURNING id
		"#,
	)
	.bind(session.user.id)
	.bind(input.post_id)
	.bind(input.parent_id)
	.bind(&input.content)
	.fetch_one(&mut *tx)
	.await?;

	let comment = fetch_comment(&mut *tx, id)
		.await?
		.ok_or(Error::UnknownComment(id))?;

	tx.commit().await?;

	Ok(Json(comment))
}

/// Update comment
/// Changes the content of a comment.
#[route(tag = tag::COMMENT)]
pub async fn update_comment(
	State(database): State<Database>,
	session: Session,
	Path(path): Path<model::IdInput>,
	Json(input): Json<model::UpdateCommentInput>,
) -> Result<Json<model::CommentView>, RouteError> {
	check_owner(&database, &session, path.id, false).await?;

	sqlx::query(
		r#"
			UPDATE comment
			SET content = COALESCE($1, content), updated_at = now()
			WHERE id = $2
		"#,
	)
	.bind(input.content)
	.bind(path.id)
	.execute(&database)
	.await?;

	let comment = fetch_comment(&database, path.id)
		.await?
		.ok_or(Error::UnknownComment(path.id))?;

	Ok(Json(comment))
}

/// Delete comment
/// Deletes a comment along with every reply below it.
#[route(tag = tag::COMMENT, response(status = 204, description = "Deleted successfully."))]
pub async fn delete_comment(
	State(database): State<Database>,
	session: Session,
	Path(path): Path<model::IdInput>,
) -> Result<StatusCode, RouteError> {
	check_owner(&database, &session, path.id, true).await?;

	let deleted = sqlx::query(
		r#"
			WITH RECURSIVE thread AS (
				SELECT id FROM comment WHERE id = $1
				UNION
				SELECT comment.id FROM comment
				JOIN thread ON comment.parent_id = thread.id
			)
			DELETE FROM comment WHERE id IN (SELECT id FROM thread)
		"#,
	)
	.bind(path.id)
	.execute(&database)
	.await?
	.rows_affected();

	tracing::info!(comment = %path.id, deleted, "comment deleted");

	Ok(StatusCode::NO_CONTENT)
}
