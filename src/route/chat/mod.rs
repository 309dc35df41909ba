use aide::axum::{routing::get_with, ApiRouter};
use axum::routing::get;

use crate::{chat::socket, error, AppState};

pub mod route;

pub type RouteError = error::RouteError<error::Never>;

pub fn routes() -> ApiRouter<AppState> {
	use route::*;

	ApiRouter::new()
		.route("/ws", get(socket::upgrade))
		.api_route(
			"/conversations",
			get_with(get_conversations, get_conversations_docs),
		)
		.api_route("/:user_id/messages", get_with(get_messages, get_messages_docs))
		.api_route("/:user_id/search", get_with(search_messages, search_messages_docs))
}
