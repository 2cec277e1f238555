//! HMAC signatures using [RustCrypto](https://github.com/RustCrypto).
//!
//! See [RFC 7518 section 3.2](https://tools.ietf.org/html/rfc7518#section-3.2).

use hmac::{Hmac, Mac};

use crate::jwk::OctetKey;
use crate::jws::JwsAlgorithm;
use crate::{Error, Result};

type HmacSha256 = Hmac<sha2::Sha256>;
type HmacSha384 = Hmac<sha2::Sha384>;
type HmacSha512 = Hmac<sha2::Sha512>;

/// The minimum key size in bytes: the size of the hash output.
pub fn minimum_key_length(algorithm: JwsAlgorithm) -> usize {
	match algorithm {
		JwsAlgorithm::Hs384 => 48,
		JwsAlgorithm::Hs512 => 64,
		_ => 32,
	}
}

/// Compute the MAC of a message.
pub fn sign(algorithm: JwsAlgorithm, message: &[u8], key: &OctetKey) -> Result<Vec<u8>> {
	check_key(algorithm, key)?;
	match algorithm {
		JwsAlgorithm::Hs256 => Ok(new_mac::<HmacSha256>(key)?.chain_update(message).finalize().into_bytes().to_vec()),
		JwsAlgorithm::Hs384 => Ok(new_mac::<HmacSha384>(key)?.chain_update(message).finalize().into_bytes().to_vec()),
		JwsAlgorithm::Hs512 => Ok(new_mac::<HmacSha512>(key)?.chain_update(message).finalize().into_bytes().to_vec()),
		_ => Err(Error::unsupported_algorithm(algorithm.name())),
	}
}

/// Verify the MAC of a message in constant time.
pub fn verify(algorithm: JwsAlgorithm, signature: &[u8], message: &[u8], key: &OctetKey) -> Result<()> {
	check_key(algorithm, key)?;
	let result = match algorithm {
		JwsAlgorithm::Hs256 => new_mac::<HmacSha256>(key)?.chain_update(message).verify_slice(signature),
		JwsAlgorithm::Hs384 => new_mac::<HmacSha384>(key)?.chain_update(message).verify_slice(signature),
		JwsAlgorithm::Hs512 => new_mac::<HmacSha512>(key)?.chain_update(message).verify_slice(signature),
		_ => return Err(Error::unsupported_algorithm(algorithm.name())),
	};
	result.map_err(|_| Error::invalid_signature("MAC does not match"))
}

fn check_key(algorithm: JwsAlgorithm, key: &OctetKey) -> Result<()> {
	let min_length = minimum_key_length(algorithm);
	if key.len() < min_length {
		return Err(Error::invalid_key(format!("{} needs a key of at least {} bytes, got {}", algorithm, min_length, key.len())));
	}
	Ok(())
}

fn new_mac<M: Mac + hmac::digest::KeyInit>(key: &OctetKey) -> Result<M> {
	<M as Mac>::new_from_slice(key.secret_key())
		.map_err(|_| Error::invalid_key("HMAC key has an invalid length"))
}
