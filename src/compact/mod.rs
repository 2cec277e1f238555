//! Compact Serialization of signed and encrypted messages.
//!
//! A compact message is a sequence of Base64URL encoded parts separated by period '.' characters.
//! Signed messages ([RFC 7515 section 7.1](https://tools.ietf.org/html/rfc7515#section-7.1)) have three parts,
//! encrypted messages ([RFC 7516 section 7.1](https://tools.ietf.org/html/rfc7516#section-7.1)) have five.
//!
//! Keys for decoding are supplied through a [`KeySource`]:
//! either a single [`JsonWebKey`] or a [`JsonWebKeySet`].

use crate::{base64url, Error, ErrorKind, JoseHeader, JsonObject, JsonWebKey, JsonWebKeySet, Result};

pub mod jwe;
pub mod jws;

pub use self::jwe::{decode_decrypt, encode_encrypt, DecryptedMessage};
pub use self::jws::{decode_verify, encode_sign, Message};

/// Something that can supply the keys to try for a decoded message.
pub trait KeySource {
	/// Get the candidate keys for a message with the given header, in the order they should be tried.
	fn candidates(&self, header: &JoseHeader) -> Result<Vec<&JsonWebKey>>;
}

/// A single key is always tried, regardless of the `kid` of the message.
impl KeySource for JsonWebKey {
	fn candidates(&self, _header: &JoseHeader) -> Result<Vec<&JsonWebKey>> {
		Ok(vec![self])
	}
}

/// A key set selects the key by the `kid` of the message, or tries every key if the message has no `kid`.
impl KeySource for JsonWebKeySet {
	fn candidates(&self, header: &JoseHeader) -> Result<Vec<&JsonWebKey>> {
		match header.kid() {
			Some(kid) => {
				let key = self.get_key(kid).ok_or_else(|| Error::invalid_key(format!("no key with kid `{}`", kid)))?;
				Ok(vec![key])
			},
			None => Ok(self.iter().collect()),
		}
	}
}

impl<T: KeySource + ?Sized> KeySource for &T {
	fn candidates(&self, header: &JoseHeader) -> Result<Vec<&JsonWebKey>> {
		(**self).candidates(header)
	}
}

/// Split a compact message in its Base64URL encoded parts.
///
/// The parts are not decoded or validated,
/// so this can be used to inspect a message before (or without) verifying it.
pub fn split_encoded_parts(data: &str) -> Vec<&str> {
	data.split('.').collect()
}

/// Decode the Base64URL encoded protected header of a message.
pub(crate) fn decode_header(encoded: &str) -> Result<JoseHeader> {
	let header = base64url::decode(encoded)?;
	let header: JsonObject = serde_json::from_slice(&header)?;
	Ok(JoseHeader::new(header))
}

/// Encode a protected header as Base64URL JSON.
pub(crate) fn encode_header(header: &JsonObject) -> Result<String> {
	Ok(base64url::encode(serde_json::to_vec(header)?))
}

/// Run an operation with each key in turn until one succeeds.
///
/// If every key fails, errors that aren't [`ErrorKind::InvalidKey`] are preferred,
/// since they come from a key that was at least suitable for the algorithm.
pub(crate) fn try_keys<T>(keys: &[&JsonWebKey], mut operation: impl FnMut(&JsonWebKey) -> Result<T>) -> Result<T> {
	let mut error: Option<Error> = None;
	for key in keys {
		let new_error = match operation(key) {
			Ok(x) => return Ok(x),
			Err(e) => e,
		};

		error = match error {
			Some(previous) if previous.kind == ErrorKind::InvalidKey && new_error.kind != ErrorKind::InvalidKey => Some(new_error),
			Some(previous) => Some(previous),
			None => Some(new_error),
		};
	}

	Err(error.unwrap_or_else(|| Error::invalid_key("no keys available")))
}
