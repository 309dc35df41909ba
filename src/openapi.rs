use aide::{
	openapi::{ApiKeyLocation, SecurityScheme, Tag},
	transform::TransformOpenApi,
};

use crate::{error, extract::Json, session};

pub const SECURITY_SCHEME_BEARER: &str = "Bearer";
pub const SECURITY_SCHEME_COOKIE: &str = "Cookie";

pub mod tag {
	pub const AUTH: &str = "Auth";
	pub const USER: &str = "User";
	pub const POST: &str = "Post";
	pub const COMMENT: &str = "Comment";
	pub const LOCATION: &str = "Location";
	pub const CHAT: &str = "Chat";
}

fn tag(name: &str, description: &str) -> Tag {
	Tag {
		name: name.into(),
		description: Some(description.into()),
		..Default::default()
	}
}

pub fn docs(api: TransformOpenApi) -> TransformOpenApi {
	api.title("Coffeemates API")
		.summary("Coffee shop reviews, comments and chat")
		.description(include_str!("../README.md"))
		.tag(tag(tag::AUTH, "Authentication and the signed-in user's profile"))
		.tag(tag(tag::USER, "User directory and moderation"))
		.tag(tag(tag::POST, "Coffee shop reviews and likes"))
		.tag(tag(tag::COMMENT, "Comments and reply trees"))
		.tag(tag(tag::LOCATION, "Map markers for reviewed shops"))
		.tag(tag(tag::CHAT, "Chat history; live messages use the /chat/ws socket"))
		.security_scheme(
			SECURITY_SCHEME_BEARER,
			SecurityScheme::Http {
				scheme: "bearer".into(),
				bearer_format: Some("JWT".into()),
				description: Some("An access token from /auth/login or /auth/register".into()),
				extensions: Default::default(),
			},
		)
		.security_scheme(
			SECURITY_SCHEME_COOKIE,
			SecurityScheme::ApiKey {
				location: ApiKeyLocation::Cookie,
				name: session::COOKIE_NAME.into(),
				description: Some("The http-only access token cookie".into()),
				extensions: Default::default(),
			},
		)
		.default_response_with::<Json<error::ErrorResponse<'static>>, _>(|res| {
			res.example(error::ErrorResponse {
				success: false,
				errors: error::Message::new("error message")
					.field("optional field")
					.detail("key", "value")
					.into_vec(),
			})
		})
}
