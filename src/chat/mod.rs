//! Two-party real-time chat.
//!
//! Clients connect to `/chat/ws` and exchange JSON events (see [`event`]).
//! Messages are persisted first, then pushed by the [`Hub`] to every
//! connection in the conversation's [`room::Room`], plus the receiver's other
//! connections so they can show unread badges.

pub mod event;
pub mod hub;
pub mod message;
pub mod room;
pub mod socket;

pub use hub::Hub;
