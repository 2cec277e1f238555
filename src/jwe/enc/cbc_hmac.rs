//! AES-CBC with HMAC-SHA2 content encryption.
//!
//! The content encryption key is split in half:
//! the first half is the MAC key, the second half the AES key.
//! The authentication tag is the truncated HMAC over `AAD || IV || ciphertext || AL`,
//! where `AL` is the bit length of the AAD as a 64 bit big endian number.
//!
//! See [RFC 7518 section 5.2](https://tools.ietf.org/html/rfc7518#section-5.2).

use aes::{Aes128, Aes192, Aes256};
use cbc::cipher::block_padding::Pkcs7;
use cbc::cipher::{BlockDecryptMut, BlockEncryptMut, KeyIvInit};
use hmac::{Hmac, Mac};
use subtle::ConstantTimeEq;

use crate::jwe::{ContentEncryptionAlgorithm, Sealed};
use crate::{Error, Result};

/// The length of the initialization vector in bytes (one AES block).
pub const IV_LENGTH: usize = 16;

pub fn encrypt(algorithm: ContentEncryptionAlgorithm, plaintext: &[u8], aad: &[u8], iv: &[u8], cek: &[u8]) -> Result<Sealed> {
	let (mac_key, enc_key) = cek.split_at(cek.len() / 2);

	let invalid = |_| Error::invalid_key(format!("invalid key or IV length for {}", algorithm));
	let ciphertext = match enc_key.len() {
		16 => cbc::Encryptor::<Aes128>::new_from_slices(enc_key, iv).map_err(invalid)?.encrypt_padded_vec_mut::<Pkcs7>(plaintext),
		24 => cbc::Encryptor::<Aes192>::new_from_slices(enc_key, iv).map_err(invalid)?.encrypt_padded_vec_mut::<Pkcs7>(plaintext),
		32 => cbc::Encryptor::<Aes256>::new_from_slices(enc_key, iv).map_err(invalid)?.encrypt_padded_vec_mut::<Pkcs7>(plaintext),
		n  => return Err(Error::invalid_key(format!("{} needs a {} byte key, got {}", algorithm, algorithm.key_length(), 2 * n))),
	};

	let tag = compute_tag(algorithm, mac_key, aad, iv, &ciphertext)?;
	Ok(Sealed { ciphertext, tag })
}

/// Check the authentication tag and decrypt.
///
/// The tag is compared in constant time and must match before anything is decrypted.
pub fn decrypt(algorithm: ContentEncryptionAlgorithm, ciphertext: &[u8], aad: &[u8], iv: &[u8], tag: &[u8], cek: &[u8]) -> Result<Vec<u8>> {
	let (mac_key, enc_key) = cek.split_at(cek.len() / 2);

	let expected = compute_tag(algorithm, mac_key, aad, iv, ciphertext).map_err(|_| Error::invalid_jwe())?;
	if !bool::from(expected.ct_eq(tag)) {
		return Err(Error::invalid_jwe());
	}

	let result = match enc_key.len() {
		16 => cbc::Decryptor::<Aes128>::new_from_slices(enc_key, iv).map_err(|_| Error::invalid_jwe())?.decrypt_padded_vec_mut::<Pkcs7>(ciphertext),
		24 => cbc::Decryptor::<Aes192>::new_from_slices(enc_key, iv).map_err(|_| Error::invalid_jwe())?.decrypt_padded_vec_mut::<Pkcs7>(ciphertext),
		32 => cbc::Decryptor::<Aes256>::new_from_slices(enc_key, iv).map_err(|_| Error::invalid_jwe())?.decrypt_padded_vec_mut::<Pkcs7>(ciphertext),
		_  => return Err(Error::invalid_jwe()),
	};
	result.map_err(|_| Error::invalid_jwe())
}

/// Compute the truncated HMAC over `AAD || IV || ciphertext || AL`.
fn compute_tag(algorithm: ContentEncryptionAlgorithm, mac_key: &[u8], aad: &[u8], iv: &[u8], ciphertext: &[u8]) -> Result<Vec<u8>> {
	let aad_bits = (aad.len() as u64 * 8).to_be_bytes();
	let mut digest = match algorithm {
		ContentEncryptionAlgorithm::A128CbcHs256 => mac::<Hmac<sha2::Sha256>>(mac_key, &[aad, iv, ciphertext, &aad_bits])?,
		ContentEncryptionAlgorithm::A192CbcHs384 => mac::<Hmac<sha2::Sha384>>(mac_key, &[aad, iv, ciphertext, &aad_bits])?,
		ContentEncryptionAlgorithm::A256CbcHs512 => mac::<Hmac<sha2::Sha512>>(mac_key, &[aad, iv, ciphertext, &aad_bits])?,
		_ => return Err(Error::unsupported_algorithm(algorithm.name())),
	};
	digest.truncate(algorithm.tag_length());
	Ok(digest)
}

fn mac<M: Mac + hmac::digest::KeyInit>(key: &[u8], parts: &[&[u8]]) -> Result<Vec<u8>> {
	let mut mac = <M as Mac>::new_from_slice(key).map_err(|_| Error::invalid_key("invalid HMAC key length"))?;
	for part in parts {
		mac.update(part);
	}
	Ok(mac.finalize().into_bytes().to_vec())
}
