use aide::axum::{
	routing::{get_with, post_with},
	ApiRouter,
};
use axum::http::StatusCode;
use uuid::Uuid;

use crate::{error, AppState};

pub mod model;
pub mod route;

#[derive(Debug, thiserror::Error)]
pub enum Error {
	#[error("unknown post {0}")]
	UnknownPost(Uuid),
	#[error("only the author can change this post")]
	NotOwner(Uuid),
}

pub type RouteError = error::RouteError<Error>;

pub fn routes() -> ApiRouter<AppState> {
	use route::*;

	ApiRouter::new()
		.api_route(
			"/",
			get_with(get_posts, get_posts_docs).post_with(create_post, create_post_docs),
		)
		.api_route(
			"/:id",
			get_with(get_post, get_post_docs)
				.put_with(update_post, update_post_docs)
				.delete_with(delete_post, delete_post_docs),
		)
		.api_route("/like/:id", post_with(toggle_like, toggle_like_docs))
		.api_route("/user/:user_id", get_with(get_user_posts, get_user_posts_docs))
}

impl error::ErrorShape for Error {
	fn status(&self) -> StatusCode {
		match self {
			Self::UnknownPost(..) => StatusCode::NOT_FOUND,
			Self::NotOwner(..) => StatusCode::FORBIDDEN,
		}
	}

	fn into_errors(self) -> Vec<error::Message<'static>> {
		let message = error::Message::new(self.to_string());

		match self {
			Self::UnknownPost(post) | Self::NotOwner(post) => {
				message.detail("post", post.to_string()).into_vec()
			}
		}
	}
}

#[cfg(test)]
mod test {
	use crate::test::*;

	fn review() -> Value {
		json!({
			"title": "Great flat white",
			"content": "Silky milk, fruity beans.",
			"rating": 5,
			"shop_name": "Bean There",
			"location": "1 Roast Street",
			"latitude": 51.5,
			"longitude": -0.12,
		})
	}

	#[sqlx::test]
	#[ignore = "needs a Postgres DATABASE_URL"]
	async fn test_post_lifecycle(pool: Database) {
		let app = app(pool.clone());
		let john = register(&app, "john").await;

		let response = app
			.post("/post")
			.add_header(AUTHORIZATION, bearer(&john.token))
			.json(&review())
			.await;

		assert_eq!(response.status_code(), 200);

		let post = response.json::<Value>();
		let id = post["id"].as_str().unwrap().to_owned();

		assert_eq!(post["username"], "john");
		assert_eq!(post["like_count"], 0);
		assert_eq!(post["comment_count"], 0);

		let locations = app.get("/location").await.json::<Vec<Value>>();

		assert_eq!(locations.len(), 1);
		assert_eq!(locations[0]["shop_name"], "Bean There");

		let response = app
			.put(&format!("/post/{id}"))
			.add_header(AUTHORIZATION, bearer(&john.token))
			.json(&json!({ "shop_name": "Bean Here", "rating": 4 }))
			.await;

		assert_eq!(response.status_code(), 200);
		assert_eq!(response.json::<Value>()["rating"], 4);

		let locations = app.get("/location").await.json::<Vec<Value>>();

		assert_eq!(locations[0]["shop_name"], "Bean Here");

		let response = app
			.delete(&format!("/post/{id}"))
			.add_header(AUTHORIZATION, bearer(&john.token))
			.await;

		assert_eq!(response.status_code(), 204);
		assert_eq!(app.get(&format!("/post/{id}")).await.status_code(), 404);
		assert!(app.get("/location").await.json::<Vec<Value>>().is_empty());
	}

	#[sqlx::test]
	#[ignore = "needs a Postgres DATABASE_URL"]
	async fn test_invalid_rating(pool: Database) {
		let app = app(pool);
		let john = register(&app, "john").await;

		let mut post = review();
		post["rating"] = json!(6);

		let response = app
			.post("/post")
			.add_header(AUTHORIZATION, bearer(&john.token))
			.json(&post)
			.await;

		assert_eq!(response.status_code(), 400);
		assert_eq!(response.json::<Value>()["errors"][0]["field"], "rating");
	}

	#[sqlx::test]
	#[ignore = "needs a Postgres DATABASE_URL"]
	async fn test_only_owner_can_edit(pool: Database) {
		let app = app(pool);
		let john = register(&app, "john").await;
		let jane = register(&app, "jane").await;

		let post = app
			.post("/post")
			.add_header(AUTHORIZATION, bearer(&john.token))
			.json(&review())
			.await
			.json::<Value>();

		let response = app
			.put(&format!("/post/{}", post["id"].as_str().unwrap()))
			.add_header(AUTHORIZATION, bearer(&jane.token))
			.json(&json!({ "title": "mine now" }))
			.await;

		assert_eq!(response.status_code(), 403);

		let response = app
			.delete(&format!("/post/{}", post["id"].as_str().unwrap()))
			.add_header(AUTHORIZATION, bearer(&jane.token))
			.await;

		assert_eq!(response.status_code(), 403);
	}

	#[sqlx::test]
	#[ignore = "needs a Postgres DATABASE_URL"]
	async fn test_toggle_like_twice(pool: Database) {
		let app = app(pool);
		let john = register(&app, "john").await;
		let jane = register(&app, "jane").await;

		let post = app
			.post("/post")
			.add_header(AUTHORIZATION, bearer(&john.token))
			.json(&review())
			.await
			.json::<Value>();
		let path = format!("/post/like/{}", post["id"].as_str().unwrap());

		let liked = app
			.post(&path)
			.add_header(AUTHORIZATION, bearer(&jane.token))
			.await
			.json::<Value>();

		assert_eq!(liked["liked"], true);
		assert_eq!(liked["like_count"], 1);
		assert_eq!(liked["like_ids"], json!([jane.id]));

		let unliked = app
			.post(&path)
			.add_header(AUTHORIZATION, bearer(&jane.token))
			.await
			.json::<Value>();

		assert_eq!(unliked["liked"], false);
		assert_eq!(unliked["like_count"], post["like_count"]);
		assert_eq!(unliked["like_ids"], post["like_ids"]);
	}

	#[sqlx::test]
	#[ignore = "needs a Postgres DATABASE_URL"]
	async fn test_user_posts(pool: Database) {
		let app = app(pool);
		let john = register(&app, "john").await;
		let jane = register(&app, "jane").await;

		for token in [&john.token, &john.token, &jane.token] {
			app.post("/post")
				.add_header(AUTHORIZATION, bearer(token))
				.json(&review())
				.await;
		}

		let posts = app
			.get(&format!("/post/user/{}", john.id))
			.await
			.json::<Vec<Value>>();

		assert_eq!(posts.len(), 2);
		assert_eq!(app.get("/post").await.json::<Vec<Value>>().len(), 3);

		let page = app
			.get("/post")
			.add_query_param("page", 2)
			.add_query_param("size", 2)
			.await
			.json::<Vec<Value>>();

		assert_eq!(page.len(), 1);
	}
}
