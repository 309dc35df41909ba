pub use crate::route::model::IdInput;

use macros::model;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

/// A comment on a post, optionally replying to another comment.
#[model]
#[derive(Debug, Clone, Serialize, JsonSchema, Validate, sqlx::FromRow)]
pub struct Comment {
	/// The unique identifier of the comment.
	#[serde(skip_deserializing)]
	pub id: Uuid,
	/// A sequential number, assigned on creation.
	#[serde(skip_deserializing)]
	pub seq: i64,
	/// The user that wrote the comment.
	#[serde(skip_deserializing)]
	pub user_id: Uuid,
	/// The post the comment belongs to.
	#[model(create_only)]
	pub post_id: Uuid,
	/// The comment this one replies to, if any.
	#[model(create_only)]
	pub parent_id: Option<Uuid>,
	#[validate(length(min = 1, max = 2048))]
	pub content: String,
	#[serde(skip_deserializing)]
	pub created_at: chrono::DateTime<chrono::Utc>,
	#[serde(skip_deserializing)]
	pub updated_at: chrono::DateTime<chrono::Utc>,
}

/// A comment along with the username of its author.
#[derive(Debug, Clone, Serialize, JsonSchema, sqlx::FromRow)]
pub struct CommentView {
	#[sqlx(flatten)]
	#[serde(flatten)]
	pub comment: Comment,
	pub username: String,
}

/// A comment and every reply below it.
#[derive(Debug, Serialize, JsonSchema)]
pub struct CommentNode {
	#[serde(flatten)]
	pub comment: CommentView,
	pub replies: Vec<CommentNode>,
}

#[derive(Deserialize, Validate, JsonSchema)]
pub struct PostIdInput {
	pub post_id: Uuid,
}
