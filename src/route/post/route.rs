use axum::{extract::State, http::StatusCode};
use macros::route;
use sqlx::PgExecutor;
use uuid::Uuid;

use crate::{
	extract::{Json, Path, Query, Session},
	openapi::tag,
	Database,
};

use super::{model, Error, RouteError};

/// Selects posts as [`model::PostView`], followed by the given clauses.
macro_rules! select_post_view {
	($($clause:literal),*) => {
		concat!(
			r#"
				SELECT
					post.*,
					"user".username,
					ARRAY(
						SELECT post_like.user_id FROM post_like
						WHERE post_like.post_id = post.id
						ORDER BY post_like.created_at, post_like.user_id
					) AS like_ids,
					(SELECT COUNT(*) FROM post_like WHERE post_like.post_id = post.id) AS like_count,
					(SELECT COUNT(*) FROM comment WHERE comment.post_id = post.id) AS comment_count
				FROM post
				JOIN "user" ON "user".id = post.user_id
			"#,
			$($clause, "\n"),*
		)
	};
}

async fn fetch_post(
	executor: impl PgExecutor<'_>,
	post_id: Uuid,
) -> Result<Option<model::PostView>, sqlx::Error> {
	sqlx::query_as::<_, model::PostView>(select_post_view!("WHERE post.id = $1"))
		.bind(post_id)
		.fetch_optional(executor)
		.await
}

/// Makes sure the post exists and that `session` may change it.
///
/// Administrators may delete any post, but only authors can edit theirs.
async fn check_owner(
	executor: impl PgExecutor<'_>,
	session: &Session,
	post_id: Uuid,
	allow_admin: bool,
) -> Result<(), RouteError> {
	let owner = sqlx::query_scalar::<_, Uuid>("SELECT user_id FROM post WHERE id = $1 FOR UPDATE")
		.bind(post_id)
		.fetch_optional(executor)
		.await?
		.ok_or(Error::UnknownPost(post_id))?;

	if owner == session.user.id || (allow_admin && session.user.is_admin()) {
		Ok(())
	} else {
		Err(Error::NotOwner(post_id).into())
	}
}

/// Get all posts
/// Returns a paginated response of all posts, newest first.
#[route(tag = tag::POST)]
pub async fn get_posts(
	State(database): State<Database>,
	Query(paginate): Query<model::Paginate>,
) -> Result<Json<Vec<model::PostView>>, RouteError> {
	let posts = sqlx::query_as::<_, model::PostView>(select_post_view!(
		"ORDER BY post.created_at DESC, post.seq DESC",
		"LIMIT $1 OFFSET $2"
	))
	.bind(paginate.limit())
	.bind(paginate.offset())
	.fetch_all(&database)
	.await?;

	Ok(Json(posts))
}

/// Get user posts
/// Returns a paginated response of the posts of a single user, newest first.
#[route(tag = tag::POST)]
pub async fn get_user_posts(
	State(database): State<Database>,
	Path(path): Path<model::UserIdInput>,
	Query(paginate): Query<model::Paginate>,
) -> Result<Json<Vec<model::PostView>>, RouteError> {
	let posts = sqlx::query_as::<_, model::PostView>(select_post_view!(
		"WHERE post.user_id = $1",
		"ORDER BY post.created_at DESC, post.seq DESC",
		"LIMIT $2 OFFSET $3"
	))
	.bind(path.user_id)
	.bind(paginate.limit())
	.bind(paginate.offset())
	.fetch_all(&database)
	.await?;

	Ok(Json(posts))
}

/// Get single post
/// Returns a single post by its unique id.
#[route(tag = tag::POST)]
pub async fn get_post(
	State(database): State<Database>,
	Path(path): Path<model::IdInput>,
) -> Result<Json<model::PostView>, RouteError> {
	let post = fetch_post(&database, path.id).await?;

	Ok(Json(post.ok_or(Error::UnknownPost(path.id))?))
}

/// Create post
/// Creates a new post, along with the map marker for its coffee shop.
#[route(tag = tag::POST)]
pub async fn create_post(
	State(database): State<Database>,
	session: Session,
	Json(input): Json<model::CreatePostInput>,
) -> Result<Json<model::PostView>, RouteError> {
	let mut tx = database.begin().await?;

	let post = sqlx::query_as::<_, model::Post>(
		r#"
			INSERT INTO post (user_id, title, content, rating, shop_name, location, latitude, longitude, image_url)
			VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
			RETURNING *
		"#,
	)
	.bind(session.user.id)
	.bind(&input.title)
	.bind(&input.content)
	.bind(input.rating)
	.bind(&input.shop_name)
	.bind(&input.location)
	.bind(input.latitude)
	.bind(input.longitude)
	.bind(&input.image_url)
	.fetch_one(&mut *tx)
	.await?;

	sync_location(&mut *tx, &post).await?;

	let post = fetch_post(&mut *tx, post.id)
		.await?
		.ok_or(Error::UnknownPost(post.id))?;

	tx.commit().await?;

	tracing::info!(post = %post.post.id, user = %session.user.id, "post created");

	Ok(Json(post))
}

/// Writes the map marker of a post, creating it if it does not exist yet.
async fn sync_location(executor: impl PgExecutor<'_>, post: &model::Post) -> Result<(), sqlx::Error> {
	sqlx::query(
		r#"
			INSERT INTO location (post_id, shop_name, address, latitude, longitude)
			VALUES ($1, $2, $3, $4, $5)
			ON CONFLICT (post_id) DO UPDATE SET
				shop_name = EXCLUDED.shop_name,
				address = EXCLUDED.address,
				latitude = EXCLUDED.latitude,
				longitude = EXCLUDED.longitude
		"#,
	)
	.bind(post.id)
	.bind(&post.shop_name)
	.bind(&post.location)
	.bind(post.latitude)
	.bind(post.longitude)
	.execute(executor)
	.await?;

	Ok(())
}

/// Update post
/// Updates an existing post by its unique id. Omitted fields are left unchanged.
#[route(tag = tag::POST)]
pub async fn update_post(
	State(database): State<Database>,
	session: Session,
	Path(path): Path<model::IdInput>,
	Json(input): Json<model::UpdatePostInput>,
) -> Result<Json<model::PostView>, RouteError> {
	let mut tx = database.begin().await?;

	check_owner(&mut *tx, &session, path.id, false).await?;

	let post = sqlx::query_as::<_, model::Post>(
		r#"
			UPDATE post
			SET
				title = COALESCE($1, title),
				content = COALESCE($2, content),
				rating = COALESCE($3, rating),
				shop_name = COALESCE($4, shop_name),
				location = COALESCE($5, location),
				latitude = COALESCE($6, latitude),
				longitude = COALESCE($7, longitude),
				image_url = COALESCE($8, image_url),
				updated_at = now()
			WHERE id = $9
			RETURNING *
		"#,
	)
	.bind(input.title)
	.bind(input.content)
	.bind(input.rating)
	.bind(input.shop_name)
	.bind(input.location)
	.bind(input.latitude)
	.bind(input.longitude)
	.bind(input.image_url)
	.bind(path.id)
	.fetch_one(&mut *tx)
	.await?;

	sync_location(&mut *tx, &post).await?;

	let post = fetch_post(&mut *tx, path.id)
		.await?
		.ok_or(Error::UnknownPost(path.id))?;

	tx.commit().await?;

	Ok(Json(post))
}

/// Delete post
/// Deletes an existing post by its unique id, along with its comments, likes and map marker.
#[route(tag = tag::POST, response(status = 204, description = "Deleted successfully."))]
pub async fn delete_post(
	State(database): State<Database>,
	session: Session,
	Path(path): Path<model::IdInput>,
) -> Result<StatusCode, RouteError> {
	let mut tx = database.begin().await?;

	check_owner(&mut *tx, &session, path.id, true).await?;

	sqlx::query("DELETE FROM post WHERE id = $1")
		.bind(path.id)
		.execute(&mut *tx)
		.await?;

	tx.commit().await?;

	tracing::info!(post = %path.id, user = %session.user.id, "post deleted");

	Ok(StatusCode::NO_CONTENT)
}

/// Toggle like
/// Likes the post, or removes the like if the authenticated user already liked it.
#[route(tag = tag::POST)]
pub async fn toggle_like(
	State(database): State<Database>,
	session: Session,
	Path(path): Path<model::IdInput>,
) -> Result<Json<model::LikeState>, RouteError> {
	let mut tx = database.begin().await?;

	// locks the post so concurrent toggles on it run one after another
	sqlx::query_scalar::<_, Uuid>("SELECT id FROM post WHERE id = $1 FOR UPDATE")
		.bind(path.id)
		.fetch_optional(&mut *tx)
		.await?
		.ok_or(Error::UnknownPost(path.id))?;

	let removed = sqlx::query("DELETE FROM post_like WHERE post_id = $1 AND user_id = $2")
		.bind(path.id)
		.bind(session.user.id)
		.execute(&mut *tx)
		.await?
		.rows_affected();

	if removed == 0 {
		sqlx::query(
			"INSERT INTO post_like (post_id, user_id) VALUES ($1, $2) ON CONFLICT DO NOTHING",
		)
		.bind(path.id)
		.bind(session.user.id)
		.execute(&mut *tx)
		.await?;
	}

	let state = sqlx::query_as::<_, model::LikeState>(
		r#"
			SELECT
				$2 = ANY(ids) AS liked,
				cardinality(ids)::BIGINT AS like_count,
				ids AS like_ids
			FROM (
				SELECT ARRAY(
					SELECT user_id FROM post_like
					WHERE post_id = $1
					ORDER BY created_at, user_id
				) AS ids
			) likes
		"#,
	)
	.bind(path.id)
	.bind(session.user.id)
	.fetch_one(&mut *tx)
	.await?;

	tx.commit().await?;

	Ok(Json(state))
}
