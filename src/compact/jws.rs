//! JWS Compact Serialization.
//!
//! See [RFC 7515 section 7.1](https://tools.ietf.org/html/rfc7515#section-7.1).

use std::str::FromStr;

use super::{decode_header, encode_header, split_encoded_parts, try_keys, KeySource};
use crate::{base64url, Error, JoseHeader, JsonObject, JsonValue, JsonWebKey, JwsAlgorithm, Result, VerifyOptions};

/// A decoded compact JWS message.
///
/// The signature is left off: it only has meaning for the serialized message it was computed over.
#[derive(Clone, Debug, PartialEq)]
pub struct Message {
	pub header  : JsonObject,
	pub payload : Vec<u8>,
}

impl Message {
	/// Parse the payload as JSON and deserialize it.
	pub fn parse_json<T: serde::de::DeserializeOwned>(&self) -> Result<T> {
		Ok(serde_json::from_slice(&self.payload)?)
	}

	/// Parse the payload as a JSON value.
	pub fn parse_json_value(&self) -> Result<JsonValue> {
		self.parse_json()
	}

	/// Parse the payload as a JSON object.
	pub fn parse_json_object(&self) -> Result<JsonObject> {
		self.parse_json()
	}
}

/// The individual (still encoded) parts of a compact JWS message.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub struct CompactSerializedParts<'a> {
	pub header    : &'a str,
	pub payload   : &'a str,
	pub signature : &'a str,
}

impl<'a> CompactSerializedParts<'a> {
	/// Split a compact JWS message into its three parts.
	pub fn split(data: &'a str) -> Result<Self> {
		match split_encoded_parts(data).as_slice() {
			&[header, payload, signature] => Ok(Self { header, payload, signature }),
			parts => Err(Error::invalid_jws(format!("compact JWS message must have 3 parts, got {}", parts.len()))),
		}
	}

	/// The data the signature is computed over: the encoded header and payload, separated by a period.
	pub fn signing_input(&self) -> String {
		format!("{}.{}", self.header, self.payload)
	}
}

/// Sign a payload and encode it as a compact JWS message.
///
/// The `alg` parameter of the header is set to `algorithm`.
/// No other parameters are added: callers that want a `kid` in the header must add it themselves.
pub fn encode_sign(mut header: JsonObject, payload: &[u8], algorithm: JwsAlgorithm, key: &JsonWebKey) -> Result<String> {
	header.insert("alg".to_string(), JsonValue::from(algorithm.name()));

	let header = encode_header(&header)?;
	let payload = base64url::encode(payload);
	let signing_input = format!("{}.{}", header, payload);
	let signature = algorithm.sign(signing_input.as_bytes(), key)?;

	tracing::debug!(alg = %algorithm, kid = ?key.kid(), "signed compact JWS message");
	Ok(format!("{}.{}", signing_input, signature))
}

/// Decode and verify a compact JWS message.
///
/// The message must name its algorithm in the `alg` header parameter.
/// Unsecured messages and unverified messages are only accepted if `options` explicitly allows them.
pub fn decode_verify(data: &str, keys: impl KeySource, options: &VerifyOptions) -> Result<Message> {
	let parts = CompactSerializedParts::split(data)?;
	if parts.header.is_empty() {
		return Err(Error::invalid_jws("compact JWS message has an empty header"));
	}
	if parts.payload.is_empty() {
		return Err(Error::invalid_jws("compact JWS message has an empty payload"));
	}

	let header = decode_header(parts.header).map_err(|e| Error::invalid_jws("invalid JWS header").with_source(e))?;
	header.check_critical().map_err(|e| Error::invalid_jws("unsupported JWS header").with_source(e))?;
	let algorithm = header.alg().map_err(|e| Error::invalid_jws("invalid JWS header").with_source(e))?;
	let algorithm = JwsAlgorithm::from_str(algorithm)?;

	if let Some(expected) = options.expected_algorithm {
		if expected != algorithm {
			return Err(Error::algorithm_mismatch(expected.name(), algorithm.name()));
		}
	}

	let payload = base64url::decode(parts.payload).map_err(|e| Error::invalid_jws("invalid JWS payload").with_source(e))?;
	let message = Message { header: header.protected.clone(), payload };

	if options.insecure_skip_verification {
		tracing::warn!(alg = %algorithm, "accepting compact JWS message without verifying the signature");
		return Ok(message);
	}

	if algorithm == JwsAlgorithm::None {
		if !options.allow_none {
			return Err(Error::invalid_jws("unsecured JWS messages are not allowed"));
		}
		if !parts.signature.is_empty() {
			return Err(Error::invalid_signature("unsecured JWS message must have an empty signature"));
		}
		tracing::warn!("accepting unsecured compact JWS message");
		return Ok(message);
	}

	if parts.signature.is_empty() {
		return Err(Error::invalid_jws("compact JWS message has an empty signature"));
	}

	let candidates = keys.candidates(&header)?;
	let signing_input = parts.signing_input();
	try_keys(&candidates, |key| algorithm.verify(parts.signature, signing_input.as_bytes(), key))?;

	tracing::debug!(alg = %algorithm, kid = ?header.kid(), "verified compact JWS message");
	Ok(message)
}

/// Decode the header of a compact JWS message without verifying anything.
///
/// Useful to find out which key or algorithm a message claims to use.
pub fn decode_unverified_header(data: &str) -> Result<JoseHeader> {
	let parts = CompactSerializedParts::split(data)?;
	decode_header(parts.header).map_err(|e| Error::invalid_jws("invalid JWS header").with_source(e))
}
