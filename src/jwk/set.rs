//! JSON Web Key Sets.
//!
//! See [RFC 7517 section 5](https://tools.ietf.org/html/rfc7517#section-5).

use serde::{Deserializer, Serializer};

use crate::jwk::JsonWebKey;
use crate::{Error, JsonValue, Result};

/// An ordered set of keys with unique key IDs.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct JsonWebKeySet {
	keys: Vec<JsonWebKey>,
}

impl JsonWebKeySet {
	/// Create a key set.
	///
	/// The set must not be empty and every key must have a unique, non-empty `kid`.
	pub fn new(keys: Vec<JsonWebKey>) -> Result<Self> {
		if keys.is_empty() {
			return Err(Error::invalid_key_set("key set must contain at least one key"));
		}

		for (i, key) in keys.iter().enumerate() {
			let kid = match key.kid() {
				Some(kid) if !kid.is_empty() => kid,
				_ => return Err(Error::invalid_key_set(format!("key at index {} has no `kid`", i))),
			};
			if keys[..i].iter().any(|other| other.kid() == Some(kid)) {
				return Err(Error::invalid_key_set(format!("duplicate `kid` `{}`", kid)));
			}
		}

		Ok(Self { keys })
	}

	/// Parse a key set from a `{"keys": [...]}` JSON value.
	pub fn parse(value: &JsonValue) -> Result<Self> {
		let keys = value.get("keys")
			.and_then(|keys| keys.as_array())
			.ok_or_else(|| Error::invalid_key_set("key set must be an object with a `keys` array"))?;

		let keys = keys.iter()
			.enumerate()
			.map(|(i, key)| JsonWebKey::from_value(key).map_err(|e| Error::invalid_key_set(format!("invalid key at index {}", i)).with_source(e)))
			.collect::<Result<Vec<_>>>()?;

		Self::new(keys)
	}

	/// Parse a key set from JSON text.
	pub fn from_json(json: &str) -> Result<Self> {
		let value: JsonValue = serde_json::from_str(json)
			.map_err(|e| Error::invalid_key_set("malformed JSON web key set").with_source(e))?;
		Self::parse(&value)
	}

	/// Find the key with the given `kid`.
	pub fn get_key(&self, kid: &str) -> Option<&JsonWebKey> {
		self.keys.iter().find(|key| key.kid() == Some(kid))
	}

	pub fn keys(&self) -> &[JsonWebKey] {
		&self.keys
	}

	pub fn iter(&self) -> std::slice::Iter<JsonWebKey> {
		self.keys.iter()
	}

	pub fn len(&self) -> usize {
		self.keys.len()
	}

	/// Get the set of public keys, suitable for publishing.
	///
	/// Symmetric keys are left out. Fails if no asymmetric keys remain.
	pub fn to_public(&self) -> Result<Self> {
		let keys = self.keys.iter()
			.filter_map(|key| key.to_public().ok())
			.collect();
		Self::new(keys)
	}

	/// The RFC 7517 JSON representation of the set.
	pub fn to_value(&self) -> JsonValue {
		let keys = self.keys.iter().map(JsonWebKey::to_value).collect();
		serde_json::json!({ "keys": JsonValue::Array(keys) })
	}
}

impl<'a> IntoIterator for &'a JsonWebKeySet {
	type Item = &'a JsonWebKey;
	type IntoIter = std::slice::Iter<'a, JsonWebKey>;

	fn into_iter(self) -> Self::IntoIter {
		self.keys.iter()
	}
}

impl serde::Serialize for JsonWebKeySet {
	fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
		serde::Serialize::serialize(&self.to_value(), serializer)
	}
}

impl<'de> serde::Deserialize<'de> for JsonWebKeySet {
	fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
		let value: JsonValue = serde::Deserialize::deserialize(deserializer)?;
		Self::parse(&value).map_err(serde::de::Error::custom)
	}
}
