//! Key transport with RSA (`RSA1_5`, `RSA-OAEP` and `RSA-OAEP-256`, `-384`, `-512`).
//!
//! See [RFC 7518 sections 4.2 and 4.3](https://tools.ietf.org/html/rfc7518#section-4.2).

use rand::rngs::OsRng;
use rsa::{Oaep, Pkcs1v15Encrypt};
use zeroize::Zeroizing;

use crate::jwe::{ContentEncryptionAlgorithm, KeyManagementAlgorithm};
use crate::jwk::RsaKey;
use crate::{Error, Result};

/// Encrypt a content encryption key with the public key.
pub fn wrap(algorithm: KeyManagementAlgorithm, cek: &[u8], key: &RsaKey) -> Result<Vec<u8>> {
	let public_key = key.public_key()?;
	let mut rng = OsRng;
	let result = match algorithm {
		KeyManagementAlgorithm::Rsa1_5     => public_key.encrypt(&mut rng, Pkcs1v15Encrypt, cek),
		KeyManagementAlgorithm::RsaOaep    => public_key.encrypt(&mut rng, Oaep::new::<sha1::Sha1>(), cek),
		KeyManagementAlgorithm::RsaOaep256 => public_key.encrypt(&mut rng, Oaep::new::<sha2::Sha256>(), cek),
		KeyManagementAlgorithm::RsaOaep384 => public_key.encrypt(&mut rng, Oaep::new::<sha2::Sha384>(), cek),
		KeyManagementAlgorithm::RsaOaep512 => public_key.encrypt(&mut rng, Oaep::new::<sha2::Sha512>(), cek),
		_ => return Err(Error::unsupported_algorithm(algorithm.name())),
	};
	result.map_err(|e| Error::invalid_key(format!("failed to encrypt content encryption key with {}", algorithm)).with_source(e))
}

/// Decrypt a content encryption key with the private key.
///
/// Decryption is blinded.
///
/// For `RSA1_5` a padding failure or a decrypted key of the wrong length for `enc` is not an error.
/// A random key is returned instead, so the message is rejected by the authentication tag check
/// like any other tampered message (see [RFC 7516 section 11.5](https://tools.ietf.org/html/rfc7516#section-11.5)).
pub fn unwrap(algorithm: KeyManagementAlgorithm, ek: &[u8], key: &RsaKey, enc: ContentEncryptionAlgorithm) -> Result<Zeroizing<Vec<u8>>> {
	let private_key = key.private_key()?;
	let mut rng = OsRng;

	if algorithm == KeyManagementAlgorithm::Rsa1_5 {
		let random_cek = enc.generate_cek();
		let decrypted = private_key.decrypt_blinded(&mut rng, Pkcs1v15Encrypt, ek).map(Zeroizing::new);
		return match decrypted {
			Ok(cek) if cek.len() == enc.key_length() => Ok(cek),
			_ => Ok(random_cek),
		};
	}

	let result = match algorithm {
		KeyManagementAlgorithm::RsaOaep    => private_key.decrypt_blinded(&mut rng, Oaep::new::<sha1::Sha1>(), ek),
		KeyManagementAlgorithm::RsaOaep256 => private_key.decrypt_blinded(&mut rng, Oaep::new::<sha2::Sha256>(), ek),
		KeyManagementAlgorithm::RsaOaep384 => private_key.decrypt_blinded(&mut rng, Oaep::new::<sha2::Sha384>(), ek),
		KeyManagementAlgorithm::RsaOaep512 => private_key.decrypt_blinded(&mut rng, Oaep::new::<sha2::Sha512>(), ek),
		_ => return Err(Error::invalid_jwe()),
	};
	result.map(Zeroizing::new).map_err(|_| Error::invalid_jwe())
}
