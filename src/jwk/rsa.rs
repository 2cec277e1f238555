//! RSA keys (`"kty": "RSA"`).
//!
//! See [RFC 7518 section 6.3](https://tools.ietf.org/html/rfc7518#section-6.3).

use once_cell::sync::OnceCell;
use rand::rngs::OsRng;
use rsa::pkcs1::{DecodeRsaPrivateKey, DecodeRsaPublicKey, EncodeRsaPrivateKey, EncodeRsaPublicKey};
use rsa::pkcs8::{spki, DecodePrivateKey, DecodePublicKey, EncodePrivateKey, EncodePublicKey, LineEnding, SubjectPublicKeyInfoRef};
use rsa::traits::{PrivateKeyParts, PublicKeyParts};
use rsa::{BigUint, RsaPrivateKey, RsaPublicKey};
use std::convert::TryFrom;
use zeroize::{Zeroize, Zeroizing};

use crate::jwk::common::{KeyParameters, KeyType};
use crate::jwk::format::{export_failed, parse_failed, pem_str, unsupported_combination, KeyEncoding, KeyFormat, KeyKind};
use crate::{Error, Result};

/// The private (CRT) parameters of an RSA key.
#[derive(Clone, Eq, PartialEq)]
pub struct RsaPrivateParams {
	pub d  : BigUint,
	pub p  : BigUint,
	pub q  : BigUint,
	pub dp : BigUint,
	pub dq : BigUint,
	pub qi : BigUint,
}

impl Zeroize for RsaPrivateParams {
	fn zeroize(&mut self) {
		self.d.zeroize();
		self.p.zeroize();
		self.q.zeroize();
		self.dp.zeroize();
		self.dq.zeroize();
		self.qi.zeroize();
	}
}

impl Drop for RsaPrivateParams {
	fn drop(&mut self) {
		self.zeroize();
	}
}

/// An RSA public key, or a key pair if the private parameters are present.
#[derive(Clone)]
pub struct RsaKey {
	pub(crate) params : KeyParameters,
	n                 : BigUint,
	e                 : BigUint,
	private           : Option<RsaPrivateParams>,
	public_key        : OnceCell<RsaPublicKey>,
	private_key       : OnceCell<RsaPrivateKey>,
}

impl RsaKey {
	/// The minimum modulus size in bits.
	pub const MIN_BITS: usize = 2048;

	/// The maximum modulus size in bits.
	pub const MAX_BITS: usize = 16384;

	/// Create a public key from its modulus and public exponent.
	pub fn new_public(n: BigUint, e: BigUint, params: KeyParameters) -> Result<Self> {
		params.validate(KeyType::Rsa)?;
		check_modulus(&n)?;
		let public_key = RsaPublicKey::new_with_max_size(n.clone(), e.clone(), Self::MAX_BITS)
			.map_err(|e| Error::invalid_key("parameters `n` and `e` do not form a valid RSA public key").with_source(e))?;

		Ok(Self {
			params,
			n,
			e,
			private: None,
			public_key: OnceCell::with_value(public_key),
			private_key: OnceCell::new(),
		})
	}

	/// Create a key pair from the public parameters and all private parameters.
	///
	/// The CRT parameters must be consistent with `d`, `p` and `q`.
	pub fn new_private(n: BigUint, e: BigUint, private: RsaPrivateParams, params: KeyParameters) -> Result<Self> {
		params.validate(KeyType::Rsa)?;
		check_modulus(&n)?;

		let mut private_key = RsaPrivateKey::from_components(n.clone(), e.clone(), private.d.clone(), vec![private.p.clone(), private.q.clone()])
			.map_err(|e| Error::invalid_key("private parameters do not form a valid RSA key").with_source(e))?;
		private_key.validate()
			.map_err(|e| Error::invalid_key("private parameters do not form a valid RSA key").with_source(e))?;
		private_key.precompute()
			.map_err(|e| Error::invalid_key("failed to compute CRT parameters").with_source(e))?;

		if private_key.dp() != Some(&private.dp) {
			return Err(Error::invalid_key("parameter `dp` is inconsistent with `d` and `p`"));
		}
		if private_key.dq() != Some(&private.dq) {
			return Err(Error::invalid_key("parameter `dq` is inconsistent with `d` and `q`"));
		}
		if private_key.crt_coefficient().as_ref() != Some(&private.qi) {
			return Err(Error::invalid_key("parameter `qi` is inconsistent with `p` and `q`"));
		}

		Ok(Self {
			params,
			n,
			e,
			private: Some(private),
			public_key: OnceCell::with_value(private_key.to_public_key()),
			private_key: OnceCell::with_value(private_key),
		})
	}

	/// Create a key from a native private key.
	pub fn from_private_key(key: &RsaPrivateKey, params: KeyParameters) -> Result<Self> {
		let mut key = key.clone();
		key.precompute()
			.map_err(|e| Error::invalid_key("failed to compute CRT parameters").with_source(e))?;
		let primes = key.primes();
		if primes.len() != 2 {
			return Err(Error::invalid_key("multi-prime RSA keys are not supported"));
		}

		let private = RsaPrivateParams {
			d: key.d().clone(),
			p: primes[0].clone(),
			q: primes[1].clone(),
			dp: key.dp().cloned().ok_or_else(|| Error::invalid_key("missing CRT parameter `dp`"))?,
			dq: key.dq().cloned().ok_or_else(|| Error::invalid_key("missing CRT parameter `dq`"))?,
			qi: key.crt_coefficient().ok_or_else(|| Error::invalid_key("missing CRT parameter `qi`"))?,
		};
		Self::new_private(key.n().clone(), key.e().clone(), private, params)
	}

	/// Create a key from a native public key.
	pub fn from_public_key(key: &RsaPublicKey, params: KeyParameters) -> Result<Self> {
		Self::new_public(key.n().clone(), key.e().clone(), params)
	}

	/// Generate a new key pair with a modulus of `bits` bits.
	pub fn generate(bits: usize) -> Result<Self> {
		if bits < Self::MIN_BITS {
			return Err(Error::invalid_parameter(format!("RSA modulus must be at least {} bits, requested {}", Self::MIN_BITS, bits)));
		}
		if bits > Self::MAX_BITS {
			return Err(Error::invalid_parameter(format!("RSA modulus can be at most {} bits, requested {}", Self::MAX_BITS, bits)));
		}
		let key = RsaPrivateKey::new(&mut OsRng, bits)
			.map_err(|e| Error::invalid_parameter(format!("failed to generate {} bit RSA key", bits)).with_source(e))?;
		tracing::debug!(bits, "generated RSA key");
		Self::from_private_key(&key, KeyParameters::default())
	}

	/// Import a key from a PEM or DER blob.
	pub fn parse(blob: &[u8], format: KeyFormat, encoding: KeyEncoding, kind: KeyKind) -> Result<Self> {
		let params = KeyParameters::default();
		match (kind, encoding) {
			(KeyKind::Private, KeyEncoding::Pkcs1) => {
				let key = match format {
					KeyFormat::Pem => RsaPrivateKey::from_pkcs1_pem(pem_str(blob)?).map_err(parse_failed(encoding, kind))?,
					KeyFormat::Der => RsaPrivateKey::from_pkcs1_der(blob).map_err(parse_failed(encoding, kind))?,
				};
				Self::from_private_key(&key, params)
			},
			(KeyKind::Private, KeyEncoding::Pkcs8) => {
				let key = match format {
					KeyFormat::Pem => RsaPrivateKey::from_pkcs8_pem(pem_str(blob)?).map_err(parse_failed(encoding, kind))?,
					KeyFormat::Der => RsaPrivateKey::from_pkcs8_der(blob).map_err(parse_failed(encoding, kind))?,
				};
				Self::from_private_key(&key, params)
			},
			(KeyKind::Public, KeyEncoding::Pkcs1) => {
				let key = match format {
					KeyFormat::Pem => PublicComponents::from_pkcs1_pem(pem_str(blob)?).map_err(parse_failed(encoding, kind))?,
					KeyFormat::Der => PublicComponents::from_pkcs1_der(blob).map_err(parse_failed(encoding, kind))?,
				};
				Self::new_public(key.n, key.e, params)
			},
			(KeyKind::Public, KeyEncoding::Spki) => {
				let key = match format {
					KeyFormat::Pem => PublicComponents::from_public_key_pem(pem_str(blob)?).map_err(parse_failed(encoding, kind))?,
					KeyFormat::Der => PublicComponents::from_public_key_der(blob).map_err(parse_failed(encoding, kind))?,
				};
				Self::new_public(key.n, key.e, params)
			},
			(kind, encoding) => Err(unsupported_combination("RSA", encoding, kind)),
		}
	}

	/// Export the key as a PEM or DER blob.
	///
	/// PEM output is returned as UTF-8 bytes.
	pub fn export(&self, format: KeyFormat, encoding: KeyEncoding, kind: KeyKind) -> Result<Zeroizing<Vec<u8>>> {
		match (kind, encoding) {
			(KeyKind::Private, KeyEncoding::Pkcs1) => {
				let key = self.private_key()?;
				match format {
					KeyFormat::Pem => Ok(Zeroizing::new(key.to_pkcs1_pem(LineEnding::LF).map_err(export_failed(encoding, kind))?.as_bytes().to_vec())),
					KeyFormat::Der => Ok(Zeroizing::new(key.to_pkcs1_der().map_err(export_failed(encoding, kind))?.as_bytes().to_vec())),
				}
			},
			(KeyKind::Private, KeyEncoding::Pkcs8) => {
				let key = self.private_key()?;
				match format {
					KeyFormat::Pem => Ok(Zeroizing::new(key.to_pkcs8_pem(LineEnding::LF).map_err(export_failed(encoding, kind))?.as_bytes().to_vec())),
					KeyFormat::Der => Ok(Zeroizing::new(key.to_pkcs8_der().map_err(export_failed(encoding, kind))?.as_bytes().to_vec())),
				}
			},
			(KeyKind::Public, KeyEncoding::Pkcs1) => {
				let key = self.public_key()?;
				match format {
					KeyFormat::Pem => Ok(Zeroizing::new(key.to_pkcs1_pem(LineEnding::LF).map_err(export_failed(encoding, kind))?.into_bytes())),
					KeyFormat::Der => Ok(Zeroizing::new(key.to_pkcs1_der().map_err(export_failed(encoding, kind))?.as_bytes().to_vec())),
				}
			},
			(KeyKind::Public, KeyEncoding::Spki) => {
				let key = self.public_key()?;
				match format {
					KeyFormat::Pem => Ok(Zeroizing::new(key.to_public_key_pem(LineEnding::LF).map_err(export_failed(encoding, kind))?.into_bytes())),
					KeyFormat::Der => Ok(Zeroizing::new(key.to_public_key_der().map_err(export_failed(encoding, kind))?.as_bytes().to_vec())),
				}
			},
			(kind, encoding) => Err(unsupported_combination("RSA", encoding, kind)),
		}
	}

	/// The native public key.
	pub fn public_key(&self) -> Result<&RsaPublicKey> {
		self.public_key.get_or_try_init(|| {
			RsaPublicKey::new_with_max_size(self.n.clone(), self.e.clone(), Self::MAX_BITS)
				.map_err(|e| Error::invalid_key("parameters `n` and `e` do not form a valid RSA public key").with_source(e))
		})
	}

	/// The native private key.
	///
	/// Fails if this is a public key.
	pub fn private_key(&self) -> Result<&RsaPrivateKey> {
		let private = self.private.as_ref()
			.ok_or_else(|| Error::invalid_key("RSA key does not contain private parameters"))?;
		self.private_key.get_or_try_init(|| {
			RsaPrivateKey::from_components(self.n.clone(), self.e.clone(), private.d.clone(), vec![private.p.clone(), private.q.clone()])
				.map_err(|e| Error::invalid_key("private parameters do not form a valid RSA key").with_source(e))
		})
	}

	pub fn n(&self) -> &BigUint {
		&self.n
	}

	pub fn e(&self) -> &BigUint {
		&self.e
	}

	pub fn private_params(&self) -> Option<&RsaPrivateParams> {
		self.private.as_ref()
	}

	pub fn is_private(&self) -> bool {
		self.private.is_some()
	}

	/// The modulus size in bytes.
	pub fn size(&self) -> usize {
		(self.n.bits() + 7) / 8
	}

	pub fn params(&self) -> &KeyParameters {
		&self.params
	}

	/// The public half of this key.
	pub fn to_public(&self) -> Self {
		Self {
			params: self.params.clone(),
			n: self.n.clone(),
			e: self.e.clone(),
			private: None,
			public_key: self.public_key.clone(),
			private_key: OnceCell::new(),
		}
	}

	pub(crate) fn with_params(&self, params: KeyParameters) -> Result<Self> {
		params.validate(KeyType::Rsa)?;
		let mut key = self.clone();
		key.params = params;
		Ok(key)
	}
}

fn check_modulus(n: &BigUint) -> Result<()> {
	if n.bits() < RsaKey::MIN_BITS {
		return Err(Error::invalid_key(format!("parameter `n` must be at least {} bits, got {}", RsaKey::MIN_BITS, n.bits())));
	}
	if n.bits() > RsaKey::MAX_BITS {
		return Err(Error::invalid_key(format!("parameter `n` can be at most {} bits, got {}", RsaKey::MAX_BITS, n.bits())));
	}
	Ok(())
}

/// The modulus and exponent of a PKCS#1 or SPKI public key.
///
/// The public key decoders of the `rsa` crate refuse moduli above 4096 bits,
/// so the ASN.1 structure is read here and the size is checked by [`RsaKey::new_public`].
struct PublicComponents {
	n : BigUint,
	e : BigUint,
}

impl TryFrom<SubjectPublicKeyInfoRef<'_>> for PublicComponents {
	type Error = spki::Error;

	fn try_from(spki: SubjectPublicKeyInfoRef<'_>) -> spki::Result<Self> {
		spki.algorithm.assert_algorithm_oid(rsa::pkcs1::ALGORITHM_OID)?;
		if spki.algorithm.parameters_any()? != rsa::pkcs8::der::asn1::Null.into() {
			return Err(spki::Error::KeyMalformed);
		}

		let key = rsa::pkcs1::RsaPublicKey::try_from(spki.subject_public_key.as_bytes().ok_or(spki::Error::KeyMalformed)?)?;
		Ok(Self {
			n: BigUint::from_bytes_be(key.modulus.as_bytes()),
			e: BigUint::from_bytes_be(key.public_exponent.as_bytes()),
		})
	}
}

impl PartialEq for RsaKey {
	fn eq(&self, other: &Self) -> bool {
		self.params == other.params && self.n == other.n && self.e == other.e && self.private == other.private
	}
}

impl Eq for RsaKey {}

impl std::fmt::Debug for RsaKey {
	fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
		f.debug_struct("RsaKey")
			.field("params", &self.params)
			.field("bits", &self.n.bits())
			.field("private", &self.private.is_some())
			.finish()
	}
}
