//! Symmetric keys (`"kty": "oct"`).
//!
//! See [RFC 7518 section 6.4](https://tools.ietf.org/html/rfc7518#section-6.4).

use rand::rngs::OsRng;
use rand::RngCore;
use zeroize::Zeroizing;

use crate::jwk::common::{KeyParameters, KeyType};
use crate::{Error, Result};

/// A symmetric key: an octet sequence used for HMAC, AES key wrapping or direct encryption.
#[derive(Clone, Eq, PartialEq)]
pub struct OctetKey {
	pub(crate) params : KeyParameters,
	k                 : Zeroizing<Vec<u8>>,
}

impl OctetKey {
	/// The minimum secret length in bytes.
	pub const MIN_LENGTH: usize = 32;

	/// Create a key from a raw secret.
	///
	/// The secret must be at least [`MIN_LENGTH`](Self::MIN_LENGTH) bytes,
	/// unless the key is pinned with `alg` to an algorithm that mandates a shorter key.
	pub fn new(secret: impl Into<Vec<u8>>, params: KeyParameters) -> Result<Self> {
		let k = Zeroizing::new(secret.into());
		params.validate(KeyType::Oct)?;

		let min_length = minimum_secret_length(params.alg());
		if k.len() < min_length {
			return Err(Error::invalid_key(format!("parameter `k` must be at least {} bytes, got {}", min_length, k.len())));
		}

		Ok(Self { params, k })
	}

	/// Create a key from a raw secret without any optional parameters.
	pub fn from_secret(secret: impl Into<Vec<u8>>) -> Result<Self> {
		Self::new(secret, KeyParameters::default())
	}

	/// Generate a new random key of `length` bytes.
	pub fn generate(length: usize) -> Result<Self> {
		if length < Self::MIN_LENGTH {
			return Err(Error::invalid_parameter(format!("octet keys must be at least {} bytes, requested {}", Self::MIN_LENGTH, length)));
		}
		let mut secret = Zeroizing::new(vec![0u8; length]);
		OsRng.fill_bytes(&mut secret);
		tracing::debug!(length, "generated octet key");
		Self::from_secret(secret.as_slice())
	}

	/// The raw secret.
	pub fn secret_key(&self) -> &[u8] {
		&self.k
	}

	pub fn len(&self) -> usize {
		self.k.len()
	}

	pub fn params(&self) -> &KeyParameters {
		&self.params
	}

	pub(crate) fn with_params(&self, params: KeyParameters) -> Result<Self> {
		Self::new(self.k.as_slice(), params)
	}
}

impl std::fmt::Debug for OctetKey {
	fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
		f.debug_struct("OctetKey")
			.field("params", &self.params)
			.field("len", &self.k.len())
			.finish()
	}
}

/// The smallest acceptable secret for a key pinned to `alg`.
///
/// A `dir` key is the content encryption key itself, the smallest of which is 16 bytes for `A128GCM`.
fn minimum_secret_length(alg: Option<&str>) -> usize {
	match alg {
		Some("A128KW") | Some("A128GCMKW") | Some("dir") => 16,
		Some("A192KW") | Some("A192GCMKW") => 24,
		_ => OctetKey::MIN_LENGTH,
	}
}
