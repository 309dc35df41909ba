use axum::extract::State;
use macros::route;

use crate::{
	chat::message::{self, Conversation, Message},
	extract::{Json, Path, Query, Session},
	openapi::tag,
	route::model::{SearchInput, Skip, UserIdInput},
	Database,
};

use super::RouteError;

/// Get conversations
/// Returns the latest message exchanged with every counterpart of the authenticated user, newest first.
#[route(tag = tag::CHAT)]
pub async fn get_conversations(
	State(database): State<Database>,
	session: Session,
) -> Result<Json<Vec<Conversation>>, RouteError> {
	let messages = message::involving(&database, session.user.id).await?;

	Ok(Json(message::latest_per_counterpart(
		session.user.id,
		messages,
	)))
}

/// Get messages
/// Returns the messages exchanged with another user, newest first.
#[route(tag = tag::CHAT)]
pub async fn get_messages(
	State(database): State<Database>,
	session: Session,
	Path(path): Path<UserIdInput>,
	Query(skip): Query<Skip>,
) -> Result<Json<Vec<Message>>, RouteError> {
	let messages = message::history(
		&database,
		session.user.id,
		path.user_id,
		skip.skip,
		skip.limit,
	)
	.await?;

	Ok(Json(messages))
}

/// Search messages
/// Returns the messages exchanged with another user that contain the query, oldest first.
#[route(tag = tag::CHAT)]
pub async fn search_messages(
	State(database): State<Database>,
	session: Session,
	Path(path): Path<UserIdInput>,
	Query(search): Query<SearchInput>,
) -> Result<Json<Vec<Message>>, RouteError> {
	let messages = message::search(&database, session.user.id, path.user_id, &search.q).await?;

	Ok(Json(messages))
}
