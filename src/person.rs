//! Records exchanged with the server.

use serde::{de::Error as _, Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};
use std::borrow::Cow;

/// The four fields every person record carries.
pub const FIELDS: [&str; 4] = ["first_name", "last_name", "address", "url"];

/// The view's snapshot of one person, as last confirmed by the server.
///
/// This is the server's JSON object as received, so fields the view doesn't know about
/// and `null`s survive and the record serializes back to the same object.
/// The accessors read the person fields leniently.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct Person(Map<String, Value>);

fn missing_field(record: &Map<String, Value>) -> Option<&'static str> {
	FIELDS.iter().copied().find(|name| !record.contains_key(*name))
}

impl<'de> Deserialize<'de> for Person {
	fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
		let record = Map::deserialize(deserializer)?;
		match missing_field(&record) {
			Some(name) => Err(D::Error::missing_field(name)),
			None => Ok(Self(record)),
		}
	}
}

impl Person {
	#[must_use]
	pub fn new(first_name: impl Into<String>, last_name: impl Into<String>, address: impl Into<String>, url: impl Into<String>) -> Self {
		let mut record = Map::new();
		record.insert("first_name".to_owned(), Value::String(first_name.into()));
		record.insert("last_name".to_owned(), Value::String(last_name.into()));
		record.insert("address".to_owned(), Value::String(address.into()));
		record.insert("url".to_owned(), Value::String(url.into()));
		Self(record)
	}

	/// Sets `"id"`, which becomes the first key.
	#[must_use]
	pub fn with_id(self, id: impl Into<Value>) -> Self {
		let mut record = Map::new();
		record.insert("id".to_owned(), id.into());
		record.extend(self.0.into_iter().filter(|(key, _)| key != "id"));
		Self(record)
	}

	/// Wraps a record received from the server.
	///
	/// # Errors
	///
	/// Iff one of the four person fields is absent. Their values may be anything.
	pub fn from_record(record: Map<String, Value>) -> Result<Self, serde_json::Error> {
		match missing_field(&record) {
			Some(name) => Err(serde_json::Error::missing_field(name)),
			None => Ok(Self(record)),
		}
	}

	/// # Errors
	///
	/// Iff `json` isn't an object with at least the four person fields.
	pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
		serde_json::from_str(json)
	}

	/// # Errors
	///
	/// Only if serialization of a value fails, which it doesn't for parsed values.
	pub fn to_json(&self) -> Result<String, serde_json::Error> {
		serde_json::to_string(self)
	}

	#[must_use]
	pub fn record(&self) -> &Map<String, Value> {
		&self.0
	}

	/// The record's `"id"`, unless it is absent or `null`.
	#[must_use]
	pub fn id(&self) -> Option<&Value> {
		self.0.get("id").filter(|id| !id.is_null())
	}

	/// Reads `name` as text: strings as they are, `null` and absent fields as `""`, other values as JSON.
	#[must_use]
	pub fn field(&self, name: &str) -> Cow<'_, str> {
		match self.0.get(name) {
			Some(Value::String(text)) => Cow::Borrowed(text),
			Some(Value::Null) | None => Cow::Borrowed(""),
			Some(other) => Cow::Owned(other.to_string()),
		}
	}

	pub fn set_field(&mut self, name: impl Into<String>, value: impl Into<Value>) {
		self.0.insert(name.into(), value.into());
	}
}

/// The body of a rejected update.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationErrors {
	/// Human-readable messages, rendered through the error list template.
	pub full_messages: Vec<String>,
	/// Names of the inputs whose rows get marked.
	pub fields: Vec<String>,
}

impl ValidationErrors {
	/// # Errors
	///
	/// Iff `json` isn't a validation error payload.
	pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
		serde_json::from_str(json)
	}
}
