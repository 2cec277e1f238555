//! RSASSA-PKCS1-v1_5 and RSASSA-PSS signatures.
//!
//! See [RFC 7518 section 3.3](https://tools.ietf.org/html/rfc7518#section-3.3)
//! and [section 3.5](https://tools.ietf.org/html/rfc7518#section-3.5).

use rand::rngs::OsRng;
use rsa::{Pkcs1v15Sign, Pss};
use sha2::{Digest, Sha256, Sha384, Sha512};

use crate::jwk::RsaKey;
use crate::jws::JwsAlgorithm;
use crate::{Error, Result};

/// The size of the hash output in bytes.
fn hash_length(algorithm: JwsAlgorithm) -> usize {
	match algorithm {
		JwsAlgorithm::Rs384 | JwsAlgorithm::Ps384 => 48,
		JwsAlgorithm::Rs512 | JwsAlgorithm::Ps512 => 64,
		_ => 32,
	}
}

/// Sign a message with the private key.
pub fn sign(algorithm: JwsAlgorithm, message: &[u8], key: &RsaKey) -> Result<Vec<u8>> {
	check_key(algorithm, key)?;
	let private_key = key.private_key()?;
	let result = match algorithm {
		JwsAlgorithm::Rs256 => private_key.sign(Pkcs1v15Sign::new::<Sha256>(), &Sha256::digest(message)),
		JwsAlgorithm::Rs384 => private_key.sign(Pkcs1v15Sign::new::<Sha384>(), &Sha384::digest(message)),
		JwsAlgorithm::Rs512 => private_key.sign(Pkcs1v15Sign::new::<Sha512>(), &Sha512::digest(message)),
		JwsAlgorithm::Ps256 => private_key.sign_with_rng(&mut OsRng, Pss::new::<Sha256>(), &Sha256::digest(message)),
		JwsAlgorithm::Ps384 => private_key.sign_with_rng(&mut OsRng, Pss::new::<Sha384>(), &Sha384::digest(message)),
		JwsAlgorithm::Ps512 => private_key.sign_with_rng(&mut OsRng, Pss::new::<Sha512>(), &Sha512::digest(message)),
		_ => return Err(Error::unsupported_algorithm(algorithm.name())),
	};
	result.map_err(|e| Error::invalid_key(format!("failed to sign with {}", algorithm)).with_source(e))
}

/// Verify a signature with the public key.
pub fn verify(algorithm: JwsAlgorithm, signature: &[u8], message: &[u8], key: &RsaKey) -> Result<()> {
	check_key(algorithm, key)?;
	let public_key = key.public_key()?;
	let result = match algorithm {
		JwsAlgorithm::Rs256 => public_key.verify(Pkcs1v15Sign::new::<Sha256>(), &Sha256::digest(message), signature),
		JwsAlgorithm::Rs384 => public_key.verify(Pkcs1v15Sign::new::<Sha384>(), &Sha384::digest(message), signature),
		JwsAlgorithm::Rs512 => public_key.verify(Pkcs1v15Sign::new::<Sha512>(), &Sha512::digest(message), signature),
		JwsAlgorithm::Ps256 => public_key.verify(Pss::new::<Sha256>(), &Sha256::digest(message), signature),
		JwsAlgorithm::Ps384 => public_key.verify(Pss::new::<Sha384>(), &Sha384::digest(message), signature),
		JwsAlgorithm::Ps512 => public_key.verify(Pss::new::<Sha512>(), &Sha512::digest(message), signature),
		_ => return Err(Error::unsupported_algorithm(algorithm.name())),
	};
	result.map_err(|_| Error::invalid_signature("RSA signature does not match"))
}

/// Check that the modulus leaves room for the padding of the algorithm.
///
/// PSS with a salt as long as the hash needs `2 * hash_length + 2` bytes.
fn check_key(algorithm: JwsAlgorithm, key: &RsaKey) -> Result<()> {
	let min_size = 2 * hash_length(algorithm) + 2;
	if key.size() < min_size {
		return Err(Error::invalid_key(format!("{} needs a modulus of at least {} bytes, got {}", algorithm, min_size, key.size())));
	}
	Ok(())
}
