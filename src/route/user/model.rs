pub use crate::route::{
	auth::model::{User, UserRole, UserStatus},
	model::{IdInput, Paginate, SearchInput},
};

use schemars::JsonSchema;
use serde::Deserialize;
use validator::Validate;

/// Moderation changes to apply to a user. Omitted fields are left unchanged.
#[derive(Debug, Deserialize, Validate, JsonSchema)]
pub struct ModerationInput {
	pub role: Option<UserRole>,
	pub status: Option<UserStatus>,
	pub is_active: Option<bool>,
}
