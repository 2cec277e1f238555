//! AES key wrap (`A128KW`, `A192KW` and `A256KW`).
//!
//! Uses the RFC 3394 key wrap algorithm with the default initial value.
//! See [RFC 7518 section 4.4](https://tools.ietf.org/html/rfc7518#section-4.4).

use aes::cipher::generic_array::GenericArray;
use aes_kw::{KekAes128, KekAes192, KekAes256};
use zeroize::Zeroizing;

use crate::jwe::KeyManagementAlgorithm;
use crate::jwk::OctetKey;
use crate::{Error, Result};

/// The length of the key encryption key in bytes.
pub fn key_length(algorithm: KeyManagementAlgorithm) -> usize {
	match algorithm {
		KeyManagementAlgorithm::A128Kw => 16,
		KeyManagementAlgorithm::A192Kw => 24,
		_ => 32,
	}
}

/// Wrap a content encryption key.
pub fn wrap(algorithm: KeyManagementAlgorithm, cek: &[u8], key: &OctetKey) -> Result<Vec<u8>> {
	let kek = check_key(algorithm, key)?;
	let result = match algorithm {
		KeyManagementAlgorithm::A128Kw => KekAes128::new(GenericArray::from_slice(kek)).wrap_vec(cek),
		KeyManagementAlgorithm::A192Kw => KekAes192::new(GenericArray::from_slice(kek)).wrap_vec(cek),
		KeyManagementAlgorithm::A256Kw => KekAes256::new(GenericArray::from_slice(kek)).wrap_vec(cek),
		_ => return Err(Error::unsupported_algorithm(algorithm.name())),
	};
	result.map_err(|_| Error::invalid_parameter(format!("content encryption key can not be wrapped with {}", algorithm)))
}

/// Unwrap a content encryption key, checking the integrity of the wrapped key.
pub fn unwrap(algorithm: KeyManagementAlgorithm, ek: &[u8], key: &OctetKey) -> Result<Zeroizing<Vec<u8>>> {
	let kek = check_key(algorithm, key)?;
	let result = match algorithm {
		KeyManagementAlgorithm::A128Kw => KekAes128::new(GenericArray::from_slice(kek)).unwrap_vec(ek),
		KeyManagementAlgorithm::A192Kw => KekAes192::new(GenericArray::from_slice(kek)).unwrap_vec(ek),
		KeyManagementAlgorithm::A256Kw => KekAes256::new(GenericArray::from_slice(kek)).unwrap_vec(ek),
		_ => return Err(Error::invalid_jwe()),
	};
	result.map(Zeroizing::new).map_err(|_| Error::invalid_jwe())
}

fn check_key(algorithm: KeyManagementAlgorithm, key: &OctetKey) -> Result<&[u8]> {
	let kek = key.secret_key();
	if kek.len() != key_length(algorithm) {
		return Err(Error::invalid_key(format!("{} needs a {} byte key, got {}", algorithm, key_length(algorithm), kek.len())));
	}
	Ok(kek)
}
