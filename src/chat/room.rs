use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};
use uuid::Uuid;

pub const SEPARATOR: char = '_';

/// A two-party chat room.
///
/// The participants are stored sorted, so both sides of a conversation
/// resolve to the same room no matter who opened it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Room {
	low: Uuid,
	high: Uuid,
}

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
#[error("invalid room name")]
pub struct InvalidRoom;

impl Room {
	pub fn between(a: Uuid, b: Uuid) -> Self {
		Self {
			low: a.min(b),
			high: a.max(b),
		}
	}

	pub fn contains(&self, user: Uuid) -> bool {
		self.low == user || self.high == user
	}
}

// Hyphenated lowercase UUIDs sort the same as strings and as bytes,
// so the name is the two ids sorted lexicographically.
impl fmt::Display for Room {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(f, "{}{SEPARATOR}{}", self.low, self.high)
	}
}

impl FromStr for Room {
	type Err = InvalidRoom;

	fn from_str(s: &str) -> Result<Self, Self::Err> {
		let (a, b) = s.split_once(SEPARATOR).ok_or(InvalidRoom)?;
		let a = Uuid::parse_str(a).map_err(|_| InvalidRoom)?;
		let b = Uuid::parse_str(b).map_err(|_| InvalidRoom)?;

		Ok(Self::between(a, b))
	}
}

impl Serialize for Room {
	fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
		serializer.collect_str(self)
	}
}

impl<'de> Deserialize<'de> for Room {
	fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
		let name = String::deserialize(deserializer)?;

		name.parse().map_err(serde::de::Error::custom)
	}
}
