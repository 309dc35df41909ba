use schemars::JsonSchema;
use serde::Serialize;
use uuid::Uuid;

/// A map marker for the coffee shop of a post.
#[derive(Debug, Serialize, JsonSchema, sqlx::FromRow)]
pub struct Location {
	pub id: Uuid,
	/// The post the marker was created for.
	pub post_id: Uuid,
	pub shop_name: String,
	pub address: String,
	pub latitude: Option<f64>,
	pub longitude: Option<f64>,
	pub created_at: chrono::DateTime<chrono::Utc>,
}
