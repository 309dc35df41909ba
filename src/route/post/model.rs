pub use crate::route::model::{IdInput, Paginate, UserIdInput};

use macros::model;
use schemars::JsonSchema;
use serde::Serialize;
use uuid::Uuid;
use validator::Validate;

/// A review of a coffee shop, created by a user.
#[model]
#[derive(Debug, Serialize, JsonSchema, Validate, sqlx::FromRow)]
pub struct Post {
	/// The unique identifier of the post.
	#[serde(skip_deserializing)]
	pub id: Uuid,
	/// A sequential number, assigned on creation.
	#[serde(skip_deserializing)]
	pub seq: i64,
	/// The user that created the post.
	#[serde(skip_deserializing)]
	pub user_id: Uuid,
	/// The title of the post.
	#[validate(length(min = 1, max = 128))]
	pub title: String,
	/// The review itself.
	#[validate(length(min = 1, max = 10000))]
	pub content: String,
	/// A rating from 1 to 5.
	#[validate(range(min = 1, max = 5))]
	pub rating: i16,
	/// The name of the coffee shop.
	#[validate(length(min = 1, max = 128))]
	pub shop_name: String,
	/// The address of the coffee shop, free-form.
	#[validate(length(min = 1, max = 256))]
	pub location: String,
	#[validate(range(min = -90.0, max = 90.0))]
	pub latitude: Option<f64>,
	#[validate(range(min = -180.0, max = 180.0))]
	pub longitude: Option<f64>,
	/// A link to an already uploaded image.
	#[validate(length(max = 2048))]
	pub image_url: Option<String>,
	/// The creation time of the post.
	#[serde(skip_deserializing)]
	pub created_at: chrono::DateTime<chrono::Utc>,
	/// The last time the post was edited.
	#[serde(skip_deserializing)]
	pub updated_at: chrono::DateTime<chrono::Utc>,
}

/// A post along with its author and engagement.
#[derive(Debug, Serialize, JsonSchema, sqlx::FromRow)]
pub struct PostView {
	#[sqlx(flatten)]
	#[serde(flatten)]
	pub post: Post,
	/// The username of the author.
	pub username: String,
	pub like_count: i64,
	/// The users that liked the post, oldest like first.
	pub like_ids: Vec<Uuid>,
	pub comment_count: i64,
}

/// The like state of a post after a toggle.
#[derive(Debug, Serialize, JsonSchema, sqlx::FromRow)]
pub struct LikeState {
	/// Whether the authenticated user now likes the post.
	pub liked: bool,
	pub like_count: i64,
	pub like_ids: Vec<Uuid>,
}
