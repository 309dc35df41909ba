use std::collections::HashSet;

use schemars::JsonSchema;
use serde::Serialize;
use uuid::Uuid;

use crate::{route::model::escape_like, Database};

/// A single chat message. Messages are never edited or deleted.
#[derive(Debug, Clone, Serialize, JsonSchema, sqlx::FromRow)]
pub struct Message {
	pub id: Uuid,
	pub sender_id: Uuid,
	pub receiver_id: Uuid,
	pub content: String,
	/// The sender's username at the time the message was sent.
	pub sender_username: String,
	pub created_at: chrono::DateTime<chrono::Utc>,
}

impl Message {
	/// The other participant, from the point of view of `user`.
	pub fn counterpart(&self, user: Uuid) -> Uuid {
		if self.sender_id == user {
			self.receiver_id
		} else {
			self.sender_id
		}
	}
}

/// The most recent message exchanged with one counterpart.
#[derive(Debug, Serialize, JsonSchema)]
pub struct Conversation {
	pub counterpart_id: Uuid,
	pub last_message: Message,
}

pub async fn insert(
	database: &Database,
	sender_id: Uuid,
	receiver_id: Uuid,
	sender_username: &str,
	content: &str,
) -> Result<Message, sqlx::Error> {
	sqlx::query_as::<_, Message>(
		r#"
			INSERT INTO chat_message (sender_id, receiver_id, sender_username, content)
			VALUES ($1, $2, $3, $4)
			RETURNING *
		"#,
	)
	.bind(sender_id)
	.bind(receiver_id)
	.bind(sender_username)
	.bind(content)
	.fetch_one(database)
	.await
}

/// Messages between two participants, newest first.
pub async fn history(
	database: &Database,
	a: Uuid,
	b: Uuid,
	skip: i64,
	limit: i64,
) -> Result<Vec<Message>, sqlx::Error> {
	sqlx::query_as::<_, Message>(
		r#"
			SELECT * FROM chat_message
			WHERE (sender_id = $1 AND receiver_id = $2)
				OR (sender_id = $2 AND receiver_id = $1)
			ORDER BY created_at DESC, id DESC
			LIMIT $3 OFFSET $4
		"#,
	)
	.bind(a)
	.bind(b)
	.bind(limit)
	.bind(skip)
	.fetch_all(database)
	.await
}

/// Messages between two participants containing `query` case-insensitively, oldest first.
pub async fn search(
	database: &Database,
	a: Uuid,
	b: Uuid,
	query: &str,
) -> Result<Vec<Message>, sqlx::Error> {
	sqlx::query_as::<_, Message>(
		r#"
			SELECT * FROM chat_message
			WHERE ((sender_id = $1 AND receiver_id = $2)
				OR (sender_id = $2 AND receiver_id = $1))
				AND content ILIKE $3 ESCAPE '\'
			ORDER BY created_at ASC, id ASC
		"#,
	)
	.bind(a)
	.bind(b)
	.bind(format!("%{}%", escape_like(query)))
	.fetch_all(database)
	.await
}

/// Every message sent or received by `user`, newest first.
pub async fn involving(database: &Database, user: Uuid) -> Result<Vec<Message>, sqlx::Error> {
	sqlx::query_as::<_, Message>(
		r#"
			SELECT * FROM chat_message
			WHERE sender_id = $1 OR receiver_id = $1
			ORDER BY created_at DESC, id DESC
		"#,
	)
	.bind(user)
	.fetch_all(database)
	.await
}

/// Keeps the first message seen per counterpart from a newest-first list.
///
/// This is a linear scan over the user's whole history.
pub fn latest_per_counterpart(user: Uuid, messages: Vec<Message>) -> Vec<Conversation> {
	let mut seen = HashSet::new();

	messages
		.into_iter()
		.filter_map(|message| {
			let counterpart = message.counterpart(user);

			seen.insert(counterpart).then_some(Conversation {
				counterpart_id: counterpart,
				last_message: message,
			})
		})
		.collect()
}
