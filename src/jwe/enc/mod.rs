//! Content encryption algorithms.
//!
//! See [RFC 7518 section 5](https://tools.ietf.org/html/rfc7518#section-5).

use rand::rngs::OsRng;
use rand::RngCore;
use serde_derive::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use zeroize::Zeroizing;

use crate::{Error, Result};

pub mod cbc_hmac;
pub mod gcm;

/// A content encryption algorithm (the `enc` header parameter of an encrypted message).
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash, Serialize, Deserialize)]
pub enum ContentEncryptionAlgorithm {
	#[serde(rename = "A128CBC-HS256")]
	A128CbcHs256,
	#[serde(rename = "A192CBC-HS384")]
	A192CbcHs384,
	#[serde(rename = "A256CBC-HS512")]
	A256CbcHs512,
	#[serde(rename = "A128GCM")]
	A128Gcm,
	#[serde(rename = "A192GCM")]
	A192Gcm,
	#[serde(rename = "A256GCM")]
	A256Gcm,
}

/// The output of a content encryption.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Sealed {
	pub ciphertext : Vec<u8>,
	pub tag        : Vec<u8>,
}

impl ContentEncryptionAlgorithm {
	/// All supported algorithms.
	pub const ALL: [ContentEncryptionAlgorithm; 6] = [
		Self::A128CbcHs256, Self::A192CbcHs384, Self::A256CbcHs512,
		Self::A128Gcm, Self::A192Gcm, Self::A256Gcm,
	];

	pub fn name(self) -> &'static str {
		match self {
			Self::A128CbcHs256 => "A128CBC-HS256",
			Self::A192CbcHs384 => "A192CBC-HS384",
			Self::A256CbcHs512 => "A256CBC-HS512",
			Self::A128Gcm      => "A128GCM",
			Self::A192Gcm      => "A192GCM",
			Self::A256Gcm      => "A256GCM",
		}
	}

	/// The length of the content encryption key in bytes.
	///
	/// For the CBC-HMAC algorithms this is the combined length of the MAC key and the encryption key.
	pub fn key_length(self) -> usize {
		match self {
			Self::A128CbcHs256 => 32,
			Self::A192CbcHs384 => 48,
			Self::A256CbcHs512 => 64,
			Self::A128Gcm      => 16,
			Self::A192Gcm      => 24,
			Self::A256Gcm      => 32,
		}
	}

	/// The length of the initialization vector in bytes.
	pub fn iv_length(self) -> usize {
		if self.is_gcm() {
			gcm::IV_LENGTH
		} else {
			cbc_hmac::IV_LENGTH
		}
	}

	/// The length of the authentication tag in bytes.
	pub fn tag_length(self) -> usize {
		match self {
			Self::A128CbcHs256 => 16,
			Self::A192CbcHs384 => 24,
			Self::A256CbcHs512 => 32,
			_ => gcm::TAG_LENGTH,
		}
	}

	fn is_gcm(self) -> bool {
		matches!(self, Self::A128Gcm | Self::A192Gcm | Self::A256Gcm)
	}

	/// Generate a random content encryption key.
	pub fn generate_cek(self) -> Zeroizing<Vec<u8>> {
		let mut cek = Zeroizing::new(vec![0u8; self.key_length()]);
		OsRng.fill_bytes(&mut cek);
		cek
	}

	/// Generate a random initialization vector.
	pub fn generate_iv(self) -> Vec<u8> {
		let mut iv = vec![0u8; self.iv_length()];
		OsRng.fill_bytes(&mut iv);
		iv
	}

	/// Check that a content encryption key has the right length for this algorithm.
	pub fn check_key(self, cek: &[u8]) -> Result<()> {
		if cek.len() != self.key_length() {
			return Err(Error::invalid_key(format!("{} needs a {} byte content encryption key, got {}", self, self.key_length(), cek.len())));
		}
		Ok(())
	}

	/// Encrypt and authenticate a plaintext.
	pub fn encrypt(self, plaintext: &[u8], aad: &[u8], iv: &[u8], cek: &[u8]) -> Result<Sealed> {
		self.check_key(cek)?;
		if iv.len() != self.iv_length() {
			return Err(Error::invalid_parameter(format!("{} needs a {} byte initialization vector, got {}", self, self.iv_length(), iv.len())));
		}

		if self.is_gcm() {
			gcm::encrypt(plaintext, aad, iv, cek)
		} else {
			cbc_hmac::encrypt(self, plaintext, aad, iv, cek)
		}
	}

	/// Authenticate and decrypt a ciphertext.
	///
	/// Every failure is reported as [`ErrorKind::InvalidJsonWebEncryption`](crate::ErrorKind::InvalidJsonWebEncryption).
	pub fn decrypt(self, ciphertext: &[u8], aad: &[u8], iv: &[u8], tag: &[u8], cek: &[u8]) -> Result<Vec<u8>> {
		self.check_key(cek).map_err(|_| Error::invalid_jwe())?;
		if iv.len() != self.iv_length() || tag.len() != self.tag_length() {
			return Err(Error::invalid_jwe());
		}

		if self.is_gcm() {
			gcm::decrypt(ciphertext, aad, iv, tag, cek)
		} else {
			cbc_hmac::decrypt(self, ciphertext, aad, iv, tag, cek)
		}
	}
}

impl fmt::Display for ContentEncryptionAlgorithm {
	fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
		f.write_str(self.name())
	}
}

impl FromStr for ContentEncryptionAlgorithm {
	type Err = Error;

	fn from_str(name: &str) -> Result<Self> {
		Self::ALL.iter()
			.copied()
			.find(|enc| enc.name() == name)
			.ok_or_else(|| Error::unsupported_algorithm(name))
	}
}

#[cfg(test)]
mod test {
	use super::*;
	use crate::ErrorKind;
	use assert2::assert;

	#[test]
	fn test_names_round_trip() {
		for &enc in ContentEncryptionAlgorithm::ALL.iter() {
			assert!(ContentEncryptionAlgorithm::from_str(enc.name()).unwrap() == enc);
			assert!(serde_json::to_value(enc).unwrap() == enc.name());
		}
		assert!(let Err(Error { kind: ErrorKind::UnsupportedAlgorithm, .. }) = ContentEncryptionAlgorithm::from_str("A128CTR"));
	}

	#[test]
	fn test_round_trip_all_lengths() {
		for &enc in ContentEncryptionAlgorithm::ALL.iter() {
			let cek = enc.generate_cek();
			assert!(cek.len() == enc.key_length());
			for plaintext in &[&b""[..], &b"x"[..], &[7u8; 33][..]] {
				let iv = enc.generate_iv();
				let sealed = enc.encrypt(plaintext, b"aad", &iv, &cek).unwrap();
				assert!(sealed.tag.len() == enc.tag_length());
				assert!(enc.decrypt(&sealed.ciphertext, b"aad", &iv, &sealed.tag, &cek).unwrap() == *plaintext, "{}", enc);
			}
		}
	}

	#[test]
	fn test_tampering_detected() {
		for &enc in ContentEncryptionAlgorithm::ALL.iter() {
			let cek = enc.generate_cek();
			let iv = enc.generate_iv();
			let sealed = enc.encrypt(b"attack at dawn", b"aad", &iv, &cek).unwrap();

			let mut other_iv = iv.clone();
			other_iv[0] ^= 1;
			let mut other_tag = sealed.tag.clone();
			other_tag[0] ^= 1;
			let mut other_ciphertext = sealed.ciphertext.clone();
			other_ciphertext[0] ^= 1;

			assert!(let Err(Error { kind: ErrorKind::InvalidJsonWebEncryption, .. }) = enc.decrypt(&sealed.ciphertext, b"aae", &iv, &sealed.tag, &cek));
			assert!(let Err(Error { kind: ErrorKind::InvalidJsonWebEncryption, .. }) = enc.decrypt(&sealed.ciphertext, b"aad", &other_iv, &sealed.tag, &cek));
			assert!(let Err(Error { kind: ErrorKind::InvalidJsonWebEncryption, .. }) = enc.decrypt(&sealed.ciphertext, b"aad", &iv, &other_tag, &cek));
			assert!(let Err(Error { kind: ErrorKind::InvalidJsonWebEncryption, .. }) = enc.decrypt(&other_ciphertext, b"aad", &iv, &sealed.tag, &cek));
		}
	}

	#[test]
	fn test_key_and_iv_lengths_checked() {
		let enc = ContentEncryptionAlgorithm::A128Gcm;
		assert!(let Err(Error { kind: ErrorKind::InvalidKey, .. }) = enc.encrypt(b"foo", b"", &enc.generate_iv(), &[0; 32]));
		assert!(let Err(Error { kind: ErrorKind::InvalidParameter, .. }) = enc.encrypt(b"foo", b"", &[0; 16], &enc.generate_cek()));
		assert!(let Err(Error { kind: ErrorKind::InvalidJsonWebEncryption, .. }) = enc.decrypt(b"foo", b"", &enc.generate_iv(), &[0; 16], &[0; 32]));

		let enc = ContentEncryptionAlgorithm::A256CbcHs512;
		assert!(let Err(Error { kind: ErrorKind::InvalidKey, .. }) = enc.encrypt(b"foo", b"", &enc.generate_iv(), &[0; 32]));
		assert!(let Err(Error { kind: ErrorKind::InvalidParameter, .. }) = enc.encrypt(b"foo", b"", &[0; 12], &enc.generate_cek()));
	}

	#[test]
	fn test_fresh_iv_and_cek() {
		let enc = ContentEncryptionAlgorithm::A256Gcm;
		assert!(enc.generate_iv() != enc.generate_iv());
		assert!(enc.generate_cek() != enc.generate_cek());
		assert!(enc.generate_iv() != vec![0; 12]);
	}
}
