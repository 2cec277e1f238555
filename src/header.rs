//! Types for working with message headers.

use crate::{Error, JsonObject, JsonValue, Result};

/// The JOSE header of a message: a protected header and an optional unprotected header.
///
/// The compact serialization only has a protected header,
/// but key sources and algorithms look up parameters through this type so they don't need to care.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct JoseHeader {
	pub protected   : JsonObject,
	pub unprotected : Option<JsonObject>,
}

impl JoseHeader {
	pub fn new(protected: JsonObject) -> Self {
		Self { protected, unprotected: None }
	}

	pub fn with_unprotected(protected: JsonObject, unprotected: JsonObject) -> Self {
		Self { protected, unprotected: Some(unprotected) }
	}

	/// Get a parameter, preferring the protected header.
	pub fn get(&self, key: &str) -> Option<&JsonValue> {
		get_header_param(Some(&self.protected), self.unprotected.as_ref(), key)
	}

	/// Get a string parameter.
	///
	/// Returns an error if the parameter is present but not a string.
	pub fn get_str(&self, key: &str) -> Result<Option<&str>> {
		match self.get(key) {
			None => Ok(None),
			Some(JsonValue::String(value)) => Ok(Some(value)),
			Some(_) => Err(Error::parse(format!("header parameter `{}` must be a string", key))),
		}
	}

	pub fn alg(&self) -> Result<&str> {
		self.get_str("alg")?.ok_or_else(|| Error::parse("missing required header parameter `alg`"))
	}

	pub fn enc(&self) -> Result<&str> {
		self.get_str("enc")?.ok_or_else(|| Error::parse("missing required header parameter `enc`"))
	}

	pub fn kid(&self) -> Option<&str> {
		self.get("kid").and_then(JsonValue::as_str)
	}

	pub fn cty(&self) -> Option<&str> {
		self.get("cty").and_then(JsonValue::as_str)
	}

	/// Merge both headers into one object, with protected parameters taking precedence.
	pub fn merged(&self) -> JsonObject {
		let mut merged = self.unprotected.clone().unwrap_or_default();
		for (key, value) in &self.protected {
			merged.insert(key.clone(), value.clone());
		}
		merged
	}

	/// Reject messages that declare critical extensions.
	///
	/// No header extensions are understood, so any `crit` entry makes the message unprocessable.
	/// See [RFC 7515 section 4.1.11](https://tools.ietf.org/html/rfc7515#section-4.1.11).
	pub fn check_critical(&self) -> Result<()> {
		match self.protected.get("crit") {
			None => Ok(()),
			Some(JsonValue::Array(names)) if names.is_empty() => Err(Error::parse("header parameter `crit` must not be empty")),
			Some(JsonValue::Array(names)) => {
				let names: Vec<_> = names.iter().map(|name| name.to_string()).collect();
				Err(Error::invalid_parameter(format!("unsupported critical header parameters: {}", names.join(", "))))
			},
			Some(_) => Err(Error::parse("header parameter `crit` must be an array")),
		}
	}
}

/// Get a parameter from either the protected or unprotected header, depending on which are available and which has the parameter.
///
/// If a parameter is found in the protected header, the unprotected header is not consulted anymore.
pub fn get_header_param<'a>(protected: Option<&'a JsonObject>, unprotected: Option<&'a JsonObject>, key: &str) -> Option<&'a JsonValue> {
	// Try the protected header first.
	if let Some(header) = protected {
		if let Some(value) = header.get(key) {
			return Some(value)
		}
	}

	// Try the unprotected header next.
	if let Some(header) = unprotected {
		if let Some(value) = header.get(key) {
			return Some(value)
		}
	}

	// Didn't find it anywhere.
	None
}

/// Get and deserialize a required parameter from either header.
pub fn parse_required_header_param<'a, T: serde::Deserialize<'a> + 'a>(protected: Option<&'a JsonObject>, unprotected: Option<&'a JsonObject>, key: &str) -> Result<T> {
	let value = get_header_param(protected, unprotected, key)
		.ok_or_else(|| Error::parse(format!("missing required header parameter `{}`", key)))?;
	T::deserialize(value).map_err(|e| Error::parse(format!("invalid type for header parameter `{}`", key)).with_source(e))
}
