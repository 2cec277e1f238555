//! AES-GCM content encryption.
//!
//! The same primitive backs the AES-GCM key wrapping algorithms.
//! See [RFC 7518 section 5.3](https://tools.ietf.org/html/rfc7518#section-5.3).

use aes_gcm::aead::consts::U12;
use aes_gcm::aead::{AeadInPlace, KeyInit};
use aes_gcm::{Aes128Gcm, Aes256Gcm, AesGcm, Nonce, Tag};

use crate::jwe::Sealed;
use crate::{Error, Result};

type Aes192Gcm = AesGcm<aes::Aes192, U12>;

/// The length of the initialization vector in bytes (96 bits).
pub const IV_LENGTH: usize = 12;

/// The length of the authentication tag in bytes (128 bits).
pub const TAG_LENGTH: usize = 16;

/// Encrypt with AES-GCM, selecting the AES variant by key length.
pub fn encrypt(plaintext: &[u8], aad: &[u8], iv: &[u8], key: &[u8]) -> Result<Sealed> {
	if iv.len() != IV_LENGTH {
		return Err(Error::invalid_parameter(format!("AES-GCM needs a {} byte initialization vector, got {}", IV_LENGTH, iv.len())));
	}

	let mut buffer = plaintext.to_vec();
	let nonce = Nonce::<U12>::from_slice(iv);
	let tag = match key.len() {
		16 => cipher::<Aes128Gcm>(key)?.encrypt_in_place_detached(nonce, aad, &mut buffer),
		24 => cipher::<Aes192Gcm>(key)?.encrypt_in_place_detached(nonce, aad, &mut buffer),
		32 => cipher::<Aes256Gcm>(key)?.encrypt_in_place_detached(nonce, aad, &mut buffer),
		n => return Err(Error::invalid_key(format!("AES-GCM keys must be 16, 24 or 32 bytes, got {}", n))),
	};

	let tag = tag.map_err(|_| Error::invalid_parameter("plaintext is too long for AES-GCM"))?;
	Ok(Sealed { ciphertext: buffer, tag: tag.to_vec() })
}

/// Decrypt with AES-GCM.
///
/// Every failure is reported as the same opaque error.
pub fn decrypt(ciphertext: &[u8], aad: &[u8], iv: &[u8], tag: &[u8], key: &[u8]) -> Result<Vec<u8>> {
	if iv.len() != IV_LENGTH || tag.len() != TAG_LENGTH {
		return Err(Error::invalid_jwe());
	}

	let mut buffer = ciphertext.to_vec();
	let nonce = Nonce::<U12>::from_slice(iv);
	let tag = Tag::from_slice(tag);
	let result = match key.len() {
		16 => cipher::<Aes128Gcm>(key)?.decrypt_in_place_detached(nonce, aad, &mut buffer, tag),
		24 => cipher::<Aes192Gcm>(key)?.decrypt_in_place_detached(nonce, aad, &mut buffer, tag),
		32 => cipher::<Aes256Gcm>(key)?.decrypt_in_place_detached(nonce, aad, &mut buffer, tag),
		_ => return Err(Error::invalid_jwe()),
	};

	result.map_err(|_| Error::invalid_jwe())?;
	Ok(buffer)
}

fn cipher<C: KeyInit>(key: &[u8]) -> Result<C> {
	C::new_from_slice(key).map_err(|_| Error::invalid_key("invalid AES-GCM key length"))
}

#[cfg(test)]
mod test {
	use super::*;
	use crate::jwe::ContentEncryptionAlgorithm;
	use assert2::assert;

	const AAD       : &[u8] = b"eyJhbGciOiJkaXIiLCJlbmMiOiJBMjU2R0NNIn0";
	const PLAINTEXT : &[u8] = b"Live long and prosper.";

	fn key() -> Vec<u8> {
		(0u8..32).collect()
	}

	fn iv() -> Vec<u8> {
		(0u8..12).collect()
	}

	#[test]
	fn test_known_answer() {
		let sealed = ContentEncryptionAlgorithm::A256Gcm.encrypt(PLAINTEXT, AAD, &iv(), &key()).unwrap();
		assert!(sealed.ciphertext == hex::decode("0b6ba07ee589ad75ea61f6e5d5c9081feca5f7518255").unwrap());
		assert!(sealed.tag == hex::decode("c5f6046e292d64eeca906eb6a9922a69").unwrap());
		assert!(ContentEncryptionAlgorithm::A256Gcm.decrypt(&sealed.ciphertext, AAD, &iv(), &sealed.tag, &key()).unwrap() == PLAINTEXT);
	}

	#[test]
	fn test_ciphertext_length_equals_plaintext_length() {
		let sealed = encrypt(PLAINTEXT, b"", &iv(), &key()[..16]).unwrap();
		assert!(sealed.ciphertext.len() == PLAINTEXT.len());
		assert!(sealed.tag.len() == TAG_LENGTH);
	}

	#[test]
	fn test_wrong_key_rejected() {
		let sealed = encrypt(PLAINTEXT, b"", &iv(), &key()[..24]).unwrap();
		let mut other = key();
		other[0] ^= 1;
		assert!(let Err(_) = decrypt(&sealed.ciphertext, b"", &iv(), &sealed.tag, &other[..24]));
		assert!(let Err(_) = decrypt(&sealed.ciphertext, b"", &iv(), &sealed.tag[..12], &key()[..24]));
	}
}
