use aide::axum::{
	routing::{get_with, post_with, put_with},
	ApiRouter,
};
use axum::http::StatusCode;
use uuid::Uuid;

use crate::{error, AppState};

pub mod model;
pub mod route;
pub mod tree;

#[derive(Debug, thiserror::Error)]
pub enum Error {
	#[error("unknown comment {0}")]
	UnknownComment(Uuid),
	#[error("unknown post {0}")]
	UnknownPost(Uuid),
	#[error("the parent comment {0} does not exist on this post")]
	UnknownParent(Uuid),
	#[error("only the author can change this comment")]
	NotOwner(Uuid),
}

pub type RouteError = error::RouteError<Error>;

pub fn routes() -> ApiRouter<AppState> {
	use route::*;

	ApiRouter::new()
		.api_route("/", post_with(create_comment, create_comment_docs))
		.api_route("/post/:post_id", get_with(get_post_comments, get_post_comments_docs))
		.api_route(
			"/:id",
			put_with(update_comment, update_comment_docs)
				.delete_with(delete_comment, delete_comment_docs),
		)
}

impl error::ErrorShape for Error {
	fn status(&self) -> StatusCode {
		match self {
			Self::UnknownComment(..) | Self::UnknownPost(..) | Self::UnknownParent(..) => {
				StatusCode::NOT_FOUND
			}
			Self::NotOwner(..) => StatusCode::FORBIDDEN,
		}
	}

	fn into_errors(self) -> Vec<error::Message<'static>> {
		let message = error::Message::new(self.to_string());

		match self {
			Self::UnknownComment(comment) | Self::NotOwner(comment) => {
				message.detail("comment", comment.to_string()).into_vec()
			}
			Self::UnknownPost(post) => message
				.field("post_id")
				.detail("post", post.to_string())
				.into_vec(),
			Self::UnknownParent(parent) => message
				.field("parent_id")
				.detail("comment", parent.to_string())
				.into_vec(),
		}
	}
}

#[cfg(test)]
mod test {
	use crate::test::*;

	async fn create_post(app: &TestServer, user: &TestUser) -> String {
		app.post("/post")
			.add_header(AUTHORIZATION, bearer(&user.token))
			.json(&json!({
				"title": "Cortado",
				"content": "Small and strong.",
				"rating": 4,
				"shop_name": "Little Cup",
				"location": "2 Bean Lane",
			}))
			.await
			.json::<Value>()["id"]
			.as_str()
			.unwrap()
			.to_owned()
	}

	async fn comment(
		app: &TestServer,
		user: &TestUser,
		post: &str,
		parent: Option<&str>,
	) -> String {
		let response = app
			.post("/comment")
			.add_header(AUTHORIZATION, bearer(&user.token))
			.json(&json!({
				"post_id": post,
				"parent_id": parent,
				"content": "agreed",
			}))
			.await;

		assert_eq!(response.status_code(), 200);

		response.json::<Value>()["id"].as_str().unwrap().to_owned()
	}

	#[sqlx::test]
	#[ignore = "needs a Postgres DATABASE_URL"]
	async fn test_reply_tree(pool: Database) {
		let app = app(pool);
		let john = register(&app, "john").await;
		let post = create_post(&app, &john).await;

		let root = comment(&app, &john, &post, None).await;
		let reply = comment(&app, &john, &post, Some(&root)).await;

		let tree = app
			.get(&format!("/comment/post/{post}"))
			.await
			.json::<Vec<Value>>();

		assert_eq!(tree.len(), 1);
		assert_eq!(tree[0]["id"], root.as_str());
		assert_eq!(tree[0]["username"], "john");
		assert_eq!(tree[0]["replies"][0]["id"], reply.as_str());

		let post = app.get(&format!("/post/{post}")).await.json::<Value>();

		assert_eq!(post["comment_count"], 2);
	}

	#[sqlx::test]
	#[ignore = "needs a Postgres DATABASE_URL"]
	async fn test_parent_on_other_post(pool: Database) {
		let app = app(pool);
		let john = register(&app, "john").await;
		let first = create_post(&app, &john).await;
		let second = create_post(&app, &john).await;

		let parent = comment(&app, &john, &first, None).await;

		let response = app
			.post("/comment")
			.add_header(AUTHORIZATION, bearer(&john.token))
			.json(&json!({
				"post_id": second,
				"parent_id": parent,
				"content": "wrong thread",
			}))
			.await;

		assert_eq!(response.status_code(), 404);
		assert_eq!(response.json::<Value>()["errors"][0]["field"], "parent_id");
	}

	#[sqlx::test]
	#[ignore = "needs a Postgres DATABASE_URL"]
	async fn test_delete_cascades_to_replies(pool: Database) {
		let app = app(pool);
		let john = register(&app, "john").await;
		let post = create_post(&app, &john).await;

		let one = comment(&app, &john, &post, None).await;
		let two = comment(&app, &john, &post, Some(&one)).await;
		let three = comment(&app, &john, &post, Some(&two)).await;
		comment(&app, &john, &post, Some(&three)).await;
		let sibling = comment(&app, &john, &post, Some(&one)).await;

		let response = app
			.delete(&format!("/comment/{two}"))
			.add_header(AUTHORIZATION, bearer(&john.token))
			.await;

		assert_eq!(response.status_code(), 204);

		let tree = app
			.get(&format!("/comment/post/{post}"))
			.await
			.json::<Vec<Value>>();

		assert_eq!(tree.len(), 1);
		assert_eq!(tree[0]["replies"].as_array().unwrap().len(), 1);
		assert_eq!(tree[0]["replies"][0]["id"], sibling.as_str());

		let post = app.get(&format!("/post/{post}")).await.json::<Value>();

		assert_eq!(post["comment_count"], 2);
	}

	#[sqlx::test]
	#[ignore = "needs a Postgres DATABASE_URL"]
	async fn test_only_owner_can_edit(pool: Database) {
		let app = app(pool);
		let john = register(&app, "john").await;
		let jane = register(&app, "jane").await;
		let post = create_post(&app, &john).await;
		let id = comment(&app, &john, &post, None).await;

		let response = app
			.put(&format!("/comment/{id}"))
			.add_header(AUTHORIZATION, bearer(&jane.token))
			.json(&json!({ "content": "edited" }))
			.await;

		assert_eq!(response.status_code(), 403);

		let response = app
			.put(&format!("/comment/{id}"))
			.add_header(AUTHORIZATION, bearer(&john.token))
			.json(&json!({ "content": "edited" }))
			.await;

		assert_eq!(response.status_code(), 200);
		assert_eq!(response.json::<Value>()["content"], "edited");
	}
}
