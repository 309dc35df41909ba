use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::{message::Message, room::Room};

/// Events sent by a client over the socket, as `{"event": ..., "data": ...}`.
#[derive(Debug, Deserialize)]
#[serde(tag = "event", content = "data", rename_all = "camelCase")]
pub enum ClientEvent {
	/// Associates the connection with a user, for messages sent outside the current room.
	Register(Uuid),
	JoinRoom(Room),
	LeaveRoom(Room),
	SendMessage(SendMessage),
}

/// Payload of `sendMessage`. Fields are camelCase on the wire; the snake_case
/// names used by every other body are accepted too.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SendMessage {
	pub content: String,
	#[serde(alias = "sender_id")]
	pub sender_id: Uuid,
	#[serde(alias = "receiver_id")]
	pub receiver_id: Uuid,
	/// Ignored in favour of the authenticated user's name; kept for older clients.
	#[serde(default, alias = "sender_username")]
	pub sender_username: Option<String>,
}

/// Events pushed to a client.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "event", content = "data", rename_all = "camelCase")]
pub enum ServerEvent {
	NewMessage(Message),
}

#[cfg(test)]
mod test {
	use serde_json::json;

	use super::*;

	#[test]
	fn test_parse_client_events() {
		let user = Uuid::new_v4();
		let other = Uuid::new_v4();

		let event: ClientEvent =
			serde_json::from_value(json!({ "event": "register", "data": user })).unwrap();
		assert!(matches!(event, ClientEvent::Register(id) if id == user));

		let room = Room::between(user, other);
		let event: ClientEvent =
			serde_json::from_value(json!({ "event": "joinRoom", "data": room.to_string() }))
				.unwrap();
		assert!(matches!(event, ClientEvent::JoinRoom(r) if r == room));

		let event: ClientEvent = serde_json::from_value(json!({
			"event": "sendMessage",
			"data": {
				"content": "hi",
				"senderId": user,
				"receiverId": other,
				"senderUsername": "alice",
			}
		}))
		.unwrap();

		let ClientEvent::SendMessage(send) = event else {
			panic!("expected sendMessage");
		};

		assert_eq!(send.content, "hi");
		assert_eq!(send.receiver_id, other);
	}

	#[test]
	fn test_send_message_accepts_snake_case() {
		let user = Uuid::new_v4();
		let other = Uuid::new_v4();

		let event: ClientEvent = serde_json::from_value(json!({
			"event": "sendMessage",
			"data": { "content": "hi", "sender_id": user, "receiver_id": other }
		}))
		.unwrap();

		let ClientEvent::SendMessage(send) = event else {
			panic!("expected sendMessage");
		};

		assert_eq!(send.sender_id, user);
		assert!(send.sender_username.is_none());
	}

	#[test]
	fn test_new_message_body_is_snake_case() {
		let message = Message {
			id: Uuid::new_v4(),
			sender_id: Uuid::new_v4(),
			receiver_id: Uuid::new_v4(),
			content: "hi".into(),
			sender_username: "alice".into(),
			created_at: chrono::Utc::now(),
		};

		let value = serde_json::to_value(ServerEvent::NewMessage(message.clone())).unwrap();

		assert_eq!(value["event"], "newMessage");
		assert_eq!(value["data"]["sender_id"], json!(message.sender_id));
		assert_eq!(value["data"]["sender_username"], "alice");
		assert!(value["data"].get("senderId").is_none());
	}

	#[test]
	fn test_reject_unknown_room() {
		let result = serde_json::from_value::<ClientEvent>(json!({
			"event": "joinRoom",
			"data": "general",
		}));

		assert!(result.is_err());
	}
}
