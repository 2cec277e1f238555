//! JSON Web Signature algorithms.
//!
//! The supported algorithms are listed in [`JwsAlgorithm`].
//! Every algorithm signs and verifies a message with a [`JsonWebKey`] of the matching key type,
//! as defined in [RFC 7518 section 3](https://tools.ietf.org/html/rfc7518#section-3).
//!
//! The signature is returned and consumed in Base64URL encoding,
//! ready to be used as the third part of a compact JWS message.

use serde_derive::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::jwk::{JsonWebKey, KeyOperation, KeyType};
use crate::{base64url, Error, Result};

pub mod ecdsa;
pub mod hmac;
pub mod none;
pub mod rsa;

/// A JWS algorithm (the `alg` header parameter of a signed message).
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash, Serialize, Deserialize)]
pub enum JwsAlgorithm {
	#[serde(rename = "none")]
	None,
	#[serde(rename = "HS256")]
	Hs256,
	#[serde(rename = "HS384")]
	Hs384,
	#[serde(rename = "HS512")]
	Hs512,
	#[serde(rename = "RS256")]
	Rs256,
	#[serde(rename = "RS384")]
	Rs384,
	#[serde(rename = "RS512")]
	Rs512,
	#[serde(rename = "PS256")]
	Ps256,
	#[serde(rename = "PS384")]
	Ps384,
	#[serde(rename = "PS512")]
	Ps512,
	#[serde(rename = "ES256")]
	Es256,
	#[serde(rename = "ES384")]
	Es384,
	#[serde(rename = "ES512")]
	Es512,
}

impl JwsAlgorithm {
	/// All supported algorithms.
	pub const ALL: [JwsAlgorithm; 13] = [
		Self::None,
		Self::Hs256, Self::Hs384, Self::Hs512,
		Self::Rs256, Self::Rs384, Self::Rs512,
		Self::Ps256, Self::Ps384, Self::Ps512,
		Self::Es256, Self::Es384, Self::Es512,
	];

	pub fn name(self) -> &'static str {
		match self {
			Self::None  => "none",
			Self::Hs256 => "HS256",
			Self::Hs384 => "HS384",
			Self::Hs512 => "HS512",
			Self::Rs256 => "RS256",
			Self::Rs384 => "RS384",
			Self::Rs512 => "RS512",
			Self::Ps256 => "PS256",
			Self::Ps384 => "PS384",
			Self::Ps512 => "PS512",
			Self::Es256 => "ES256",
			Self::Es384 => "ES384",
			Self::Es512 => "ES512",
		}
	}

	/// The key type this algorithm needs, or `None` for the `none` algorithm.
	pub fn key_type(self) -> Option<KeyType> {
		match self {
			Self::None => None,
			Self::Hs256 | Self::Hs384 | Self::Hs512 => Some(KeyType::Oct),
			Self::Rs256 | Self::Rs384 | Self::Rs512 => Some(KeyType::Rsa),
			Self::Ps256 | Self::Ps384 | Self::Ps512 => Some(KeyType::Rsa),
			Self::Es256 | Self::Es384 | Self::Es512 => Some(KeyType::Ec),
		}
	}

	/// Sign a message and return the Base64URL encoded signature.
	///
	/// The `none` algorithm ignores the key and returns an empty signature.
	pub fn sign(self, message: &[u8], key: &JsonWebKey) -> Result<String> {
		if self == Self::None {
			return Ok(base64url::encode(none::sign()));
		}

		key.check_usage(self.name(), &[KeyOperation::Sign])?;
		let signature = match (self, key) {
			(Self::Hs256, JsonWebKey::Oct(key)) | (Self::Hs384, JsonWebKey::Oct(key)) | (Self::Hs512, JsonWebKey::Oct(key)) => hmac::sign(self, message, key)?,
			(Self::Rs256, JsonWebKey::Rsa(key)) | (Self::Rs384, JsonWebKey::Rsa(key)) | (Self::Rs512, JsonWebKey::Rsa(key)) => rsa::sign(self, message, key)?,
			(Self::Ps256, JsonWebKey::Rsa(key)) | (Self::Ps384, JsonWebKey::Rsa(key)) | (Self::Ps512, JsonWebKey::Rsa(key)) => rsa::sign(self, message, key)?,
			(Self::Es256, JsonWebKey::Ec(key))  | (Self::Es384, JsonWebKey::Ec(key))  | (Self::Es512, JsonWebKey::Ec(key))  => ecdsa::sign(self, message, key)?,
			_ => return Err(self.wrong_key_type(key)),
		};
		Ok(base64url::encode(signature))
	}

	/// Verify a Base64URL encoded signature over a message.
	///
	/// Fails with [`ErrorKind::InvalidSignature`](crate::ErrorKind::InvalidSignature) if the signature does not match.
	pub fn verify(self, signature: &str, message: &[u8], key: &JsonWebKey) -> Result<()> {
		if self == Self::None {
			return none::verify();
		}

		key.check_usage(self.name(), &[KeyOperation::Verify])?;
		let signature = base64url::decode(signature)
			.map_err(|e| Error::invalid_signature("signature is not valid Base64URL").with_source(e))?;
		match (self, key) {
			(Self::Hs256, JsonWebKey::Oct(key)) | (Self::Hs384, JsonWebKey::Oct(key)) | (Self::Hs512, JsonWebKey::Oct(key)) => hmac::verify(self, &signature, message, key),
			(Self::Rs256, JsonWebKey::Rsa(key)) | (Self::Rs384, JsonWebKey::Rsa(key)) | (Self::Rs512, JsonWebKey::Rsa(key)) => rsa::verify(self, &signature, message, key),
			(Self::Ps256, JsonWebKey::Rsa(key)) | (Self::Ps384, JsonWebKey::Rsa(key)) | (Self::Ps512, JsonWebKey::Rsa(key)) => rsa::verify(self, &signature, message, key),
			(Self::Es256, JsonWebKey::Ec(key))  | (Self::Es384, JsonWebKey::Ec(key))  | (Self::Es512, JsonWebKey::Ec(key))  => ecdsa::verify(self, &signature, message, key),
			_ => Err(self.wrong_key_type(key)),
		}
	}

	fn wrong_key_type(self, key: &JsonWebKey) -> Error {
		match self.key_type() {
			Some(expected) => Error::invalid_key(format!("algorithm {} needs a key of type {}, got {}", self, expected, key.key_type())),
			None => Error::invalid_key(format!("algorithm {} does not use a key", self)),
		}
	}
}

impl fmt::Display for JwsAlgorithm {
	fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
		f.write_str(self.name())
	}
}

impl FromStr for JwsAlgorithm {
	type Err = Error;

	fn from_str(name: &str) -> Result<Self> {
		Self::ALL.iter()
			.copied()
			.find(|alg| alg.name() == name)
			.ok_or_else(|| Error::unsupported_algorithm(name))
	}
}
