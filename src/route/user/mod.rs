use aide::axum::{
	routing::{get_with, put_with},
	ApiRouter,
};
use axum::http::StatusCode;
use uuid::Uuid;

use crate::{error, AppState};

pub mod model;
pub mod route;

#[derive(Debug, thiserror::Error)]
pub enum Error {
	#[error("unknown user {0}")]
	UnknownUser(Uuid),
	#[error("this action is restricted to administrators")]
	NotAdmin,
	#[error("administrators cannot moderate themselves")]
	SelfModeration,
}

pub type RouteError = error::RouteError<Error>;

pub fn routes() -> ApiRouter<AppState> {
	use route::*;

	ApiRouter::new()
		.api_route("/", get_with(get_users, get_users_docs))
		.api_route("/search", get_with(search_users, search_users_docs))
		.api_route(
			"/:id",
			get_with(get_user, get_user_docs).delete_with(delete_user, delete_user_docs),
		)
		.api_route(
			"/:id/moderation",
			put_with(moderate_user, moderate_user_docs),
		)
}

impl error::ErrorShape for Error {
	fn status(&self) -> StatusCode {
		match self {
			Self::UnknownUser(..) => StatusCode::NOT_FOUND,
			Self::NotAdmin => StatusCode::FORBIDDEN,
			Self::SelfModeration => StatusCode::BAD_REQUEST,
		}
	}

	fn into_errors(self) -> Vec<error::Message<'static>> {
		let message = error::Message::new(self.to_string());

		match self {
			Self::UnknownUser(user) => message.detail("user", user.to_string()).into_vec(),
			_ => message.into_vec(),
		}
	}
}

#[cfg(test)]
mod test {
	use crate::test::*;

	#[sqlx::test]
	#[ignore = "needs a Postgres DATABASE_URL"]
	async fn test_list_and_search(pool: Database) {
		let app = app(pool);
		register(&app, "latte_lover").await;
		register(&app, "espresso").await;

		let response = app.get("/users").await;

		assert_eq!(response.status_code(), 200);
		assert_eq!(response.json::<Vec<Value>>().len(), 2);

		let response = app.get("/users/search").add_query_param("q", "LATTE").await;
		let users = response.json::<Vec<Value>>();

		assert_eq!(users.len(), 1);
		assert_eq!(users[0]["username"], "latte_lover");
		assert!(users[0].get("email").is_none());
	}

	#[sqlx::test]
	#[ignore = "needs a Postgres DATABASE_URL"]
	async fn test_get_unknown_user(pool: Database) {
		let app = app(pool);

		let response = app
			.get(&format!("/users/{}", uuid::Uuid::new_v4()))
			.await;

		assert_eq!(response.status_code(), 404);
	}

	#[sqlx::test]
	#[ignore = "needs a Postgres DATABASE_URL"]
	async fn test_moderation_requires_admin(pool: Database) {
		let app = app(pool);
		let john = register(&app, "john").await;
		let jane = register(&app, "jane").await;

		let response = app
			.put(&format!("/users/{}/moderation", jane.id))
			.add_header(AUTHORIZATION, bearer(&john.token))
			.json(&json!({ "status": "banned" }))
			.await;

		assert_eq!(response.status_code(), 403);
	}

	#[sqlx::test]
	#[ignore = "needs a Postgres DATABASE_URL"]
	async fn test_banned_user_is_locked_out(pool: Database) {
		let app = app(pool.clone());
		let admin = register(&app, "admin").await;
		let jane = register(&app, "jane").await;

		make_admin(&pool, admin.id).await;

		let response = app
			.put(&format!("/users/{}/moderation", jane.id))
			.add_header(AUTHORIZATION, bearer(&admin.token))
			.json(&json!({ "status": "banned" }))
			.await;

		assert_eq!(response.status_code(), 200);
		assert_eq!(response.json::<Value>()["status"], "banned");

		let response = app
			.get("/auth/me")
			.add_header(AUTHORIZATION, bearer(&jane.token))
			.await;

		assert_eq!(response.status_code(), 403);
	}

	#[sqlx::test]
	#[ignore = "needs a Postgres DATABASE_URL"]
	async fn test_admin_delete_user(pool: Database) {
		let app = app(pool.clone());
		let admin = register(&app, "admin").await;
		let jane = register(&app, "jane").await;

		make_admin(&pool, admin.id).await;

		let response = app
			.delete(&format!("/users/{}", admin.id))
			.add_header(AUTHORIZATION, bearer(&admin.token))
			.await;

		assert_eq!(response.status_code(), 400);

		let response = app
			.delete(&format!("/users/{}", jane.id))
			.add_header(AUTHORIZATION, bearer(&admin.token))
			.await;

		assert_eq!(response.status_code(), 204);
		assert_eq!(
			app.get(&format!("/users/{}", jane.id)).await.status_code(),
			404
		);
	}

	#[sqlx::test]
	#[ignore = "needs a Postgres DATABASE_URL"]
	async fn test_delete_user_removes_reply_threads(pool: Database) {
		let app = app(pool.clone());
		let admin = register(&app, "admin").await;
		let jane = register(&app, "jane").await;
		let john = register(&app, "john").await;

		make_admin(&pool, admin.id).await;

		let post = app
			.post("/post")
			.add_header(AUTHORIZATION, bearer(&admin.token))
			.json(&json!({
				"title": "Flat white",
				"content": "Velvety.",
				"rating": 5,
				"shop_name": "Milk Bar",
				"location": "1 Crema Street",
			}))
			.await
			.json::<Value>()["id"]
			.as_str()
			.unwrap()
			.to_owned();

		let root = app
			.post("/comment")
			.add_header(AUTHORIZATION, bearer(&jane.token))
			.json(&json!({ "post_id": post, "content": "best in town" }))
			.await
			.json::<Value>()["id"]
			.as_str()
			.unwrap()
			.to_owned();

		let response = app
			.post("/comment")
			.add_header(AUTHORIZATION, bearer(&john.token))
			.json(&json!({ "post_id": post, "parent_id": root, "content": "agreed" }))
			.await;

		assert_eq!(response.status_code(), 200);

		let response = app
			.delete(&format!("/users/{}", jane.id))
			.add_header(AUTHORIZATION, bearer(&admin.token))
			.await;

		assert_eq!(response.status_code(), 204);

		let tree = app
			.get(&format!("/comment/post/{post}"))
			.await
			.json::<Vec<Value>>();

		assert!(tree.is_empty());

		let post_view = app.get(&format!("/post/{post}")).await.json::<Value>();

		assert_eq!(post_view["comment_count"], 0);

		let rows = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM comment")
			.fetch_one(&pool)
			.await
			.unwrap();

		assert_eq!(rows, 0);
	}
}
