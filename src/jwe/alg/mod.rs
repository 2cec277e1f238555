//! Key management algorithms.
//!
//! A key management algorithm produces the content encryption key (CEK) for a message
//! and protects it with a [`JsonWebKey`], or recovers it again when decrypting.
//! See [RFC 7518 section 4](https://tools.ietf.org/html/rfc7518#section-4).

use serde_derive::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use zeroize::Zeroizing;

use crate::jwe::ContentEncryptionAlgorithm;
use crate::jwk::{JsonWebKey, KeyOperation, KeyType};
use crate::{base64url, Error, JsonObject, Result};

pub mod aes_gcm_kw;
pub mod aes_kw;
pub mod direct;
pub mod rsa;

/// A key management algorithm (the `alg` header parameter of an encrypted message).
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash, Serialize, Deserialize)]
pub enum KeyManagementAlgorithm {
	#[serde(rename = "dir")]
	Direct,
	#[serde(rename = "A128KW")]
	A128Kw,
	#[serde(rename = "A192KW")]
	A192Kw,
	#[serde(rename = "A256KW")]
	A256Kw,
	#[serde(rename = "A128GCMKW")]
	A128GcmKw,
	#[serde(rename = "A192GCMKW")]
	A192GcmKw,
	#[serde(rename = "A256GCMKW")]
	A256GcmKw,
	#[serde(rename = "RSA1_5")]
	Rsa1_5,
	#[serde(rename = "RSA-OAEP")]
	RsaOaep,
	#[serde(rename = "RSA-OAEP-256")]
	RsaOaep256,
	#[serde(rename = "RSA-OAEP-384")]
	RsaOaep384,
	#[serde(rename = "RSA-OAEP-512")]
	RsaOaep512,
}

/// A freshly produced content encryption key and its protected form.
pub struct WrappedKey {
	/// The content encryption key.
	pub cek    : Zeroizing<Vec<u8>>,

	/// The encrypted key, Base64URL encoded. Empty for direct encryption.
	pub ek     : String,

	/// Header parameters that must be added to the protected header.
	pub header : JsonObject,
}

impl KeyManagementAlgorithm {
	/// All supported algorithms.
	pub const ALL: [KeyManagementAlgorithm; 12] = [
		Self::Direct,
		Self::A128Kw, Self::A192Kw, Self::A256Kw,
		Self::A128GcmKw, Self::A192GcmKw, Self::A256GcmKw,
		Self::Rsa1_5, Self::RsaOaep, Self::RsaOaep256, Self::RsaOaep384, Self::RsaOaep512,
	];

	pub fn name(self) -> &'static str {
		match self {
			Self::Direct     => "dir",
			Self::A128Kw     => "A128KW",
			Self::A192Kw     => "A192KW",
			Self::A256Kw     => "A256KW",
			Self::A128GcmKw  => "A128GCMKW",
			Self::A192GcmKw  => "A192GCMKW",
			Self::A256GcmKw  => "A256GCMKW",
			Self::Rsa1_5     => "RSA1_5",
			Self::RsaOaep    => "RSA-OAEP",
			Self::RsaOaep256 => "RSA-OAEP-256",
			Self::RsaOaep384 => "RSA-OAEP-384",
			Self::RsaOaep512 => "RSA-OAEP-512",
		}
	}

	/// The key type this algorithm needs.
	pub fn key_type(self) -> KeyType {
		match self {
			Self::Rsa1_5 | Self::RsaOaep | Self::RsaOaep256 | Self::RsaOaep384 | Self::RsaOaep512 => KeyType::Rsa,
			_ => KeyType::Oct,
		}
	}

	/// The key operations that permit wrapping with this algorithm.
	fn wrap_operations(self) -> &'static [KeyOperation] {
		match self {
			Self::Direct => &[KeyOperation::Encrypt],
			_ => &[KeyOperation::WrapKey, KeyOperation::Encrypt],
		}
	}

	/// The key operations that permit unwrapping with this algorithm.
	fn unwrap_operations(self) -> &'static [KeyOperation] {
		match self {
			Self::Direct => &[KeyOperation::Decrypt],
			_ => &[KeyOperation::UnwrapKey, KeyOperation::Decrypt],
		}
	}

	/// Produce a content encryption key for `enc` and protect it with `key`.
	///
	/// For direct encryption the secret of the key itself is the content encryption key.
	pub fn wrap(self, enc: ContentEncryptionAlgorithm, key: &JsonWebKey) -> Result<WrappedKey> {
		key.check_usage(self.name(), self.wrap_operations())?;

		match (self, key) {
			(Self::Direct, JsonWebKey::Oct(key)) => direct::wrap(enc, key),
			(Self::A128Kw, JsonWebKey::Oct(key)) | (Self::A192Kw, JsonWebKey::Oct(key)) | (Self::A256Kw, JsonWebKey::Oct(key)) => {
				let cek = enc.generate_cek();
				let ek = aes_kw::wrap(self, &cek, key)?;
				Ok(WrappedKey { cek, ek: base64url::encode(ek), header: JsonObject::new() })
			},
			(Self::A128GcmKw, JsonWebKey::Oct(key)) | (Self::A192GcmKw, JsonWebKey::Oct(key)) | (Self::A256GcmKw, JsonWebKey::Oct(key)) => {
				let cek = enc.generate_cek();
				let (ek, header) = aes_gcm_kw::wrap(self, &cek, key)?;
				Ok(WrappedKey { cek, ek: base64url::encode(ek), header })
			},
			(_, JsonWebKey::Rsa(key)) if self.key_type() == KeyType::Rsa => {
				let cek = enc.generate_cek();
				let ek = rsa::wrap(self, &cek, key)?;
				Ok(WrappedKey { cek, ek: base64url::encode(ek), header: JsonObject::new() })
			},
			_ => Err(Error::invalid_key(format!("algorithm {} needs a key of type {}, got {}", self, self.key_type(), key.key_type()))),
		}
	}

	/// Recover the content encryption key from an encrypted key.
	///
	/// The `header` must contain the parameters added by [`wrap`](Self::wrap).
	/// Every failure is reported as the same opaque [`ErrorKind::InvalidJsonWebEncryption`](crate::ErrorKind::InvalidJsonWebEncryption).
	pub fn unwrap(self, ek: &[u8], key: &JsonWebKey, header: &JsonObject, enc: ContentEncryptionAlgorithm) -> Result<Zeroizing<Vec<u8>>> {
		key.check_usage(self.name(), self.unwrap_operations()).map_err(|_| Error::invalid_jwe())?;

		let cek = match (self, key) {
			(Self::Direct, JsonWebKey::Oct(key)) => direct::unwrap(ek, enc, key),
			(Self::A128Kw, JsonWebKey::Oct(key)) | (Self::A192Kw, JsonWebKey::Oct(key)) | (Self::A256Kw, JsonWebKey::Oct(key)) => aes_kw::unwrap(self, ek, key),
			(Self::A128GcmKw, JsonWebKey::Oct(key)) | (Self::A192GcmKw, JsonWebKey::Oct(key)) | (Self::A256GcmKw, JsonWebKey::Oct(key)) => aes_gcm_kw::unwrap(self, ek, key, header),
			(_, JsonWebKey::Rsa(key)) if self.key_type() == KeyType::Rsa => rsa::unwrap(self, ek, key, enc),
			_ => Err(Error::invalid_jwe()),
		};

		let cek = cek.map_err(|_| Error::invalid_jwe())?;
		enc.check_key(&cek).map_err(|_| Error::invalid_jwe())?;
		Ok(cek)
	}
}

impl fmt::Display for KeyManagementAlgorithm {
	fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
		f.write_str(self.name())
	}
}

impl FromStr for KeyManagementAlgorithm {
	type Err = Error;

	fn from_str(name: &str) -> Result<Self> {
		Self::ALL.iter()
			.copied()
			.find(|alg| alg.name() == name)
			.ok_or_else(|| Error::unsupported_algorithm(name))
	}
}

impl fmt::Debug for WrappedKey {
	fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
		f.debug_struct("WrappedKey")
			.field("ek", &self.ek)
			.field("header", &self.header)
			.finish()
	}
}
