//! ECDSA signatures over the NIST curves.
//!
//! Signatures are the fixed width concatenation of `r` and `s`,
//! not the ASN.1 DER encoding used by most other protocols.
//! See [RFC 7518 section 3.4](https://tools.ietf.org/html/rfc7518#section-3.4).

use signature::{Signer, Verifier};

use crate::jwk::{EcCurve, EcKey, EcPrivateKey, EcPublicKey};
use crate::jws::JwsAlgorithm;
use crate::{Error, Result};

/// The curve an ECDSA algorithm is defined for.
pub fn curve(algorithm: JwsAlgorithm) -> Option<EcCurve> {
	match algorithm {
		JwsAlgorithm::Es256 => Some(EcCurve::P256),
		JwsAlgorithm::Es384 => Some(EcCurve::P384),
		JwsAlgorithm::Es512 => Some(EcCurve::P521),
		_ => None,
	}
}

/// Sign a message with the private key.
pub fn sign(algorithm: JwsAlgorithm, message: &[u8], key: &EcKey) -> Result<Vec<u8>> {
	check_curve(algorithm, key)?;
	let failed = |e| Error::invalid_key(format!("failed to sign with {}", algorithm)).with_source(e);
	match key.private_key()? {
		EcPrivateKey::P256(secret) => {
			let signing_key = p256::ecdsa::SigningKey::from_slice(&secret.to_bytes()).map_err(failed)?;
			let signature: p256::ecdsa::Signature = signing_key.try_sign(message).map_err(failed)?;
			Ok(signature.to_bytes().to_vec())
		},
		EcPrivateKey::P384(secret) => {
			let signing_key = p384::ecdsa::SigningKey::from_slice(&secret.to_bytes()).map_err(failed)?;
			let signature: p384::ecdsa::Signature = signing_key.try_sign(message).map_err(failed)?;
			Ok(signature.to_bytes().to_vec())
		},
		EcPrivateKey::P521(secret) => {
			let signing_key = p521::ecdsa::SigningKey::from_slice(&secret.to_bytes()).map_err(failed)?;
			let signature: p521::ecdsa::Signature = signing_key.try_sign(message).map_err(failed)?;
			Ok(signature.to_bytes().to_vec())
		},
	}
}

/// Verify an `r || s` signature with the public key.
pub fn verify(algorithm: JwsAlgorithm, signature: &[u8], message: &[u8], key: &EcKey) -> Result<()> {
	check_curve(algorithm, key)?;
	if signature.len() != 2 * key.curve().field_size() {
		return Err(Error::invalid_signature(format!("{} signature must be {} bytes, got {}", algorithm, 2 * key.curve().field_size(), signature.len())));
	}

	let invalid = |_| Error::invalid_signature("ECDSA signature does not match");
	match key.public_key()? {
		EcPublicKey::P256(public) => {
			let verifying_key = p256::ecdsa::VerifyingKey::from(public);
			let signature = p256::ecdsa::Signature::from_slice(signature).map_err(invalid)?;
			verifying_key.verify(message, &signature).map_err(invalid)
		},
		EcPublicKey::P384(public) => {
			let verifying_key = p384::ecdsa::VerifyingKey::from(public);
			let signature = p384::ecdsa::Signature::from_slice(signature).map_err(invalid)?;
			verifying_key.verify(message, &signature).map_err(invalid)
		},
		EcPublicKey::P521(public) => {
			// The P-521 verifying key is a newtype without a conversion from the public key.
			let verifying_key = p521::ecdsa::VerifyingKey::from_affine(*public.as_affine()).map_err(invalid_public_key)?;
			let signature = p521::ecdsa::Signature::from_slice(signature).map_err(invalid)?;
			verifying_key.verify(message, &signature).map_err(invalid)
		},
	}
}

fn check_curve(algorithm: JwsAlgorithm, key: &EcKey) -> Result<()> {
	match curve(algorithm) {
		Some(expected) if expected == key.curve() => Ok(()),
		Some(expected) => Err(Error::invalid_key(format!("{} needs a key on curve {}, got {}", algorithm, expected, key.curve()))),
		None => Err(Error::unsupported_algorithm(algorithm.name())),
	}
}

fn invalid_public_key(error: signature::Error) -> Error {
	Error::invalid_key("EC public key can not be used for verification").with_source(error)
}
