use axum::{
	extract::{
		ws::{Message as Frame, WebSocket, WebSocketUpgrade},
		State,
	},
	response::IntoResponse,
};
use futures_util::{SinkExt, StreamExt};
use uuid::Uuid;

use super::{
	event::{ClientEvent, SendMessage},
	hub::ConnectionId,
	message,
};
use crate::{extract::Session, route::auth::model::User, AppState};

pub const MAX_MESSAGE_LENGTH: usize = 4096;

/// Why a `sendMessage` event was dropped. None of these are reported to the client.
#[derive(Debug, PartialEq, Eq, thiserror::Error)]
pub enum Dropped {
	#[error("message is empty")]
	Empty,
	#[error("message is longer than {MAX_MESSAGE_LENGTH} characters")]
	TooLong,
	#[error("sender {0} is not the authenticated user")]
	WrongSender(Uuid),
}

/// Checks a `sendMessage` event from `user`, returning the content to store.
pub fn accept(user: Uuid, send: &SendMessage) -> Result<&str, Dropped> {
	if send.sender_id != user {
		return Err(Dropped::WrongSender(send.sender_id));
	}

	if send.content.trim().is_empty() {
		return Err(Dropped::Empty);
	}

	if send.content.chars().count() > MAX_MESSAGE_LENGTH {
		return Err(Dropped::TooLong);
	}

	Ok(&send.content)
}

/// Upgrades an authenticated request to the chat socket.
pub async fn upgrade(
	State(state): State<AppState>,
	session: Session,
	ws: WebSocketUpgrade,
) -> impl IntoResponse {
	ws.on_upgrade(move |socket| serve(socket, state, session.user))
}

async fn serve(socket: WebSocket, state: AppState, user: User) {
	let (id, mut events) = state.chat.connect().await;
	let (mut sink, mut stream) = socket.split();

	let connections = state.chat.connection_count().await;

	tracing::info!(user = %user.id, connections, "chat socket connected");

	let writer = tokio::spawn(async move {
		while let Some(event) = events.recv().await {
			let text = match serde_json::to_string(&event) {
				Ok(text) => text,
				Err(e) => {
					tracing::error!("failed to serialize chat event: {e}");
					continue;
				}
			};

			if sink.send(Frame::Text(text)).await.is_err() {
				break;
			}
		}

		// the hub dropped this connection, or the client went away
		sink.close().await.ok();
	});

	// events from one connection are handled strictly in arrival order
	while let Some(frame) = stream.next().await {
		match frame {
			Ok(Frame::Text(text)) => match serde_json::from_str::<ClientEvent>(&text) {
				Ok(event) => handle(&state, id, &user, event).await,
				Err(e) => tracing::debug!(user = %user.id, "ignoring malformed chat event: {e}"),
			},
			Ok(Frame::Close(..)) => break,
			Ok(..) => {}
			Err(e) => {
				tracing::debug!(user = %user.id, "chat socket error: {e}");
				break;
			}
		}
	}

	state.chat.disconnect(id).await;
	writer.abort();

	tracing::info!(user = %user.id, "chat socket disconnected");
}

async fn handle(state: &AppState, id: ConnectionId, user: &User, event: ClientEvent) {
	match event {
		ClientEvent::Register(user_id) if user_id == user.id => {
			state.chat.register(id, user_id).await;
		}
		ClientEvent::Register(user_id) => {
			tracing::warn!(user = %user.id, "refusing to register as {user_id}");
		}
		ClientEvent::JoinRoom(room) if room.contains(user.id) => {
			state.chat.join(id, room).await;
		}
		ClientEvent::JoinRoom(room) => {
			tracing::warn!(user = %user.id, "refusing to join room {room}");
		}
		ClientEvent::LeaveRoom(room) => state.chat.leave(id, room).await,
		ClientEvent::SendMessage(send) => {
			let content = match accept(user.id, &send) {
				Ok(content) => content,
				Err(reason) => {
					tracing::debug!(user = %user.id, "dropping chat message: {reason}");
					return;
				}
			};

			let stored = message::insert(
				&state.database,
				user.id,
				send.receiver_id,
				&user.username,
				content,
			)
			.await;

			match stored {
				Ok(stored) => {
					state.chat.deliver(&stored).await;
				}
				Err(e) => tracing::error!(user = %user.id, "failed to store chat message: {e}"),
			}
		}
	}
}
