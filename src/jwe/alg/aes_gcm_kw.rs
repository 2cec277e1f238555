//! Key wrapping with AES-GCM (`A128GCMKW`, `A192GCMKW` and `A256GCMKW`).
//!
//! Every wrap uses a fresh 96 bit IV. The IV and the authentication tag
//! are carried in the `iv` and `tag` header parameters.
//! See [RFC 7518 section 4.7](https://tools.ietf.org/html/rfc7518#section-4.7).

use rand::rngs::OsRng;
use rand::RngCore;
use zeroize::Zeroizing;

use crate::header::parse_required_header_param;
use crate::jwe::enc::gcm;
use crate::jwe::KeyManagementAlgorithm;
use crate::jwk::OctetKey;
use crate::{base64url, Error, JsonObject, JsonValue, Result};

/// The length of the key encryption key in bytes.
pub fn key_length(algorithm: KeyManagementAlgorithm) -> usize {
	match algorithm {
		KeyManagementAlgorithm::A128GcmKw => 16,
		KeyManagementAlgorithm::A192GcmKw => 24,
		_ => 32,
	}
}

/// Encrypt a content encryption key.
///
/// Returns the encrypted key and the `iv` and `tag` header parameters.
pub fn wrap(algorithm: KeyManagementAlgorithm, cek: &[u8], key: &OctetKey) -> Result<(Vec<u8>, JsonObject)> {
	let kek = check_key(algorithm, key)?;

	let mut iv = [0u8; gcm::IV_LENGTH];
	OsRng.fill_bytes(&mut iv);
	let sealed = gcm::encrypt(cek, b"", &iv, kek)?;

	let mut header = JsonObject::new();
	header.insert("iv".to_string(), JsonValue::from(base64url::encode(iv)));
	header.insert("tag".to_string(), JsonValue::from(base64url::encode(&sealed.tag)));
	Ok((sealed.ciphertext, header))
}

/// Decrypt a content encryption key using the `iv` and `tag` header parameters.
pub fn unwrap(algorithm: KeyManagementAlgorithm, ek: &[u8], key: &OctetKey, header: &JsonObject) -> Result<Zeroizing<Vec<u8>>> {
	let kek = check_key(algorithm, key)?;
	let iv  = header_bytes(header, "iv")?;
	let tag = header_bytes(header, "tag")?;
	gcm::decrypt(ek, b"", &iv, &tag, kek).map(Zeroizing::new)
}

fn header_bytes(header: &JsonObject, name: &str) -> Result<Vec<u8>> {
	let value: &str = parse_required_header_param(Some(header), None, name).map_err(|_| Error::invalid_jwe())?;
	base64url::decode(value).map_err(|_| Error::invalid_jwe())
}

fn check_key(algorithm: KeyManagementAlgorithm, key: &OctetKey) -> Result<&[u8]> {
	let kek = key.secret_key();
	if kek.len() != key_length(algorithm) {
		return Err(Error::invalid_key(format!("{} needs a {} byte key, got {}", algorithm, key_length(algorithm), kek.len())));
	}
	Ok(kek)
}
