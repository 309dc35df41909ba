use std::collections::BTreeMap;

use macros::model;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::{Validate, ValidationError};

fn validate_username(username: &str) -> Result<(), ValidationError> {
	if username
		.chars()
		.any(|c| !c.is_alphanumeric() && c != '_' && c != '.')
	{
		return Err(ValidationError::new("username must be alphanumeric"));
	}

	Ok(())
}

#[derive(
	Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, JsonSchema, sqlx::Type,
)]
#[sqlx(type_name = "user_role", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum UserRole {
	#[default]
	User,
	Admin,
}

#[derive(
	Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, JsonSchema, sqlx::Type,
)]
#[sqlx(type_name = "user_status", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum UserStatus {
	#[default]
	Active,
	Suspended,
	Banned,
}

/// Free-form answers to the coffee profile questions, keyed by question.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, JsonSchema, Validate)]
pub struct CoffeeProfile {
	#[serde(default)]
	pub basics: BTreeMap<String, String>,
	#[serde(default)]
	pub personality: BTreeMap<String, String>,
	#[serde(default)]
	pub taste: BTreeMap<String, String>,
	#[serde(default)]
	pub vibe: BTreeMap<String, String>,
}

/// A single user.
#[model(update)]
#[derive(Debug, Serialize, JsonSchema, Validate, sqlx::FromRow)]
pub struct User {
	/// The unique identifier of the user.
	#[serde(skip_deserializing)]
	pub id: Uuid,
	/// The user's email address, used for logging in.
	#[serde(skip_serializing)]
	#[validate(email)]
	pub email: String,
	/// The hashed password.
	#[serde(skip)]
	pub password: Vec<u8>,
	/// The username that is displayed to the public.
	#[validate(length(min = 3, max = 16), custom(function = "validate_username"))]
	pub username: String,
	/// Where the user is based, free-form.
	#[validate(length(max = 128))]
	pub place: Option<String>,
	/// The profile picture.
	#[validate(length(max = 2048))]
	pub photo_url: Option<String>,
	/// The profile cover image.
	#[validate(length(max = 2048))]
	pub cover_image_url: Option<String>,
	/// Answers to the coffee profile questions.
	#[serde(skip_deserializing)]
	#[schemars(with = "CoffeeProfile")]
	pub coffee_profile: sqlx::types::Json<CoffeeProfile>,
	#[serde(skip_deserializing)]
	pub role: UserRole,
	#[serde(skip_deserializing)]
	pub status: UserStatus,
	#[serde(skip_deserializing)]
	pub is_active: bool,
	/// The creation time of the user.
	#[serde(skip_deserializing)]
	pub created_at: chrono::DateTime<chrono::Utc>,
}

impl User {
	pub fn is_admin(&self) -> bool {
		self.role == UserRole::Admin
	}
}

/// An access token along with the user it belongs to.
#[derive(Debug, Serialize, JsonSchema)]
pub struct AuthResponse {
	/// The access token, also set as an http-only cookie.
	pub token: String,
	pub user: User,
}

#[derive(Deserialize, Validate, JsonSchema)]
pub struct LoginInput {
	#[validate(email)]
	pub email: String,
	#[validate(length(min = 8, max = 128))]
	pub password: String,
}

#[derive(Deserialize, Validate, JsonSchema)]
pub struct RegisterInput {
	#[validate(email)]
	pub email: String,
	#[validate(length(min = 8, max = 128))]
	pub password: String,
	/// The username that is displayed to the public.
	#[validate(length(min = 3, max = 16), custom(function = "validate_username"))]
	pub username: String,
	#[validate(length(max = 128))]
	pub place: Option<String>,
}
