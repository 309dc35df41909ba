use schemars::JsonSchema;
use serde::Deserialize;
use uuid::Uuid;
use validator::Validate;

/// These can be removed when [`serde`] supports
/// literal defaults: <https://github.com/serde-rs/serde/issues/368>
#[inline]
fn one() -> i64 {
	1
}

#[inline]
fn ten() -> i64 {
	10
}

#[inline]
fn twenty() -> i64 {
	20
}

#[derive(Deserialize, Validate, JsonSchema)]
pub struct Paginate {
	/// The page number to return (1-indexed).
	#[validate(range(min = 1, max = 1000))]
	#[serde(default = "one")]
	pub page: i64,
	/// The number of items to return per page.
	#[validate(range(min = 1, max = 100))]
	#[serde(default = "ten")]
	pub size: i64,
}

impl Paginate {
	pub fn offset(&self) -> i64 {
		(self.page - 1) * self.size
	}

	pub fn limit(&self) -> i64 {
		self.size
	}
}

/// Offset pagination tracked by the client as a running count of items
/// already fetched.
#[derive(Deserialize, Validate, JsonSchema)]
pub struct Skip {
	/// The number of items to skip.
	#[validate(range(min = 0))]
	#[serde(default)]
	pub skip: i64,
	/// The maximum number of items to return.
	#[validate(range(min = 1, max = 100))]
	#[serde(default = "twenty")]
	pub limit: i64,
}

#[derive(Deserialize, Validate, JsonSchema)]
pub struct IdInput {
	pub id: Uuid,
}

#[derive(Deserialize, Validate, JsonSchema)]
pub struct UserIdInput {
	pub user_id: Uuid,
}

#[derive(Deserialize, Validate, JsonSchema)]
pub struct SearchInput {
	/// The text to look for, matched case-insensitively anywhere.
	#[validate(length(min = 1, max = 128))]
	pub q: String,
}

/// Escapes the wildcards of a `LIKE` pattern, for use with `ESCAPE '\'`.
pub fn escape_like(input: &str) -> String {
	let mut escaped = String::with_capacity(input.len());

	for c in input.chars() {
		if matches!(c, '%' | '_' | '\\') {
			escaped.push('\\');
		}

		escaped.push(c);
	}

	escaped
}
