use std::{
	collections::{HashMap, HashSet},
	sync::atomic::{AtomicU64, Ordering},
};

use tokio::sync::{
	mpsc::{self, error::TrySendError},
	RwLock,
};
use uuid::Uuid;

use super::{event::ServerEvent, message::Message, room::Room};

/// How many events may be queued for a connection before it is dropped as stalled.
pub const CONNECTION_BUFFER: usize = 64;

/// Identifies one socket connection for its lifetime.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ConnectionId(u64);

/// Per-connection bookkeeping.
#[derive(Debug)]
struct Connection {
	sender: mpsc::Sender<ServerEvent>,
	/// The user this connection registered as, if any.
	user: Option<Uuid>,
	/// Every room this connection receives broadcasts for.
	rooms: HashSet<Room>,
	/// The room the client is currently looking at. Joining a room replaces
	/// this without leaving the previous room's broadcasts.
	current_room: Option<Room>,
}

/// Tracks live connections and fans chat messages out to them.
///
/// Messages must be persisted before they are handed to [`Hub::deliver`].
#[derive(Debug, Default)]
pub struct Hub {
	next_id: AtomicU64,
	connections: RwLock<HashMap<ConnectionId, Connection>>,
}

impl Hub {
	pub fn new() -> Self {
		Self::default()
	}

	/// Adds a connection, returning its id and the stream of events to push to it.
	pub async fn connect(&self) -> (ConnectionId, mpsc::Receiver<ServerEvent>) {
		let id = ConnectionId(self.next_id.fetch_add(1, Ordering::Relaxed));
		let (sender, receiver) = mpsc::channel(CONNECTION_BUFFER);

		self.connections.write().await.insert(
			id,
			Connection {
				sender,
				user: None,
				rooms: HashSet::new(),
				current_room: None,
			},
		);

		(id, receiver)
	}

	pub async fn disconnect(&self, id: ConnectionId) {
		self.connections.write().await.remove(&id);
	}

	/// Associates the connection with a user. The last registration wins.
	pub async fn register(&self, id: ConnectionId, user: Uuid) {
		if let Some(connection) = self.connections.write().await.get_mut(&id) {
			connection.user = Some(user);
		}
	}

	/// Subscribes the connection to a room and makes it the current room.
	pub async fn join(&self, id: ConnectionId, room: Room) {
		if let Some(connection) = self.connections.write().await.get_mut(&id) {
			connection.rooms.insert(room);
			connection.current_room = Some(room);
		}
	}

	/// Unsubscribes the connection from a room, clearing the current room if it matches.
	pub async fn leave(&self, id: ConnectionId, room: Room) {
		if let Some(connection) = self.connections.write().await.get_mut(&id) {
			connection.rooms.remove(&room);

			if connection.current_room == Some(room) {
				connection.current_room = None;
			}
		}
	}

	/// Pushes a persisted message to every connection subscribed to the
	/// sender/receiver room, and to every connection of the receiver whose
	/// current room is a different one.
	///
	/// A connection can receive the same message twice; clients deduplicate by id.
	/// Connections whose queue is full are removed, which closes their socket.
	/// Returns the number of pushes.
	pub async fn deliver(&self, message: &Message) -> usize {
		let room = Room::between(message.sender_id, message.receiver_id);
		let event = ServerEvent::NewMessage(message.clone());
		let mut pushed = 0;
		let mut stalled = HashSet::new();

		{
			let connections = self.connections.read().await;

			let in_room = connections
				.iter()
				.filter(|(_, connection)| connection.rooms.contains(&room));

			let elsewhere = connections.iter().filter(|(_, connection)| {
				connection.user == Some(message.receiver_id)
					&& connection.current_room != Some(room)
			});

			for (id, connection) in in_room.chain(elsewhere) {
				match connection.sender.try_send(event.clone()) {
					Ok(()) => pushed += 1,
					Err(TrySendError::Full(..)) => {
						stalled.insert(*id);
					}
					// the socket is shutting down and will disconnect itself
					Err(TrySendError::Closed(..)) => {}
				}
			}
		}

		if !stalled.is_empty() {
			let mut connections = self.connections.write().await;

			for id in stalled {
				connections.remove(&id);
				tracing::warn!(connection = id.0, "dropped stalled chat connection");
			}
		}

		tracing::info!(
			histogram.chat_delivery_fanout = pushed as u64,
			room = %room,
			message = %message.id,
			"delivered chat message"
		);

		pushed
	}

	pub async fn connection_count(&self) -> usize {
		self.connections.read().await.len()
	}
}
