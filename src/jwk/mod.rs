//! JSON Web Keys and key sets.
//!
//! A [`JsonWebKey`] is one of three key types:
//!   - [`OctetKey`]: a symmetric secret (`"kty": "oct"`),
//!   - [`RsaKey`]: an RSA public key or key pair (`"kty": "RSA"`),
//!   - [`EcKey`]: an elliptic curve public key or key pair (`"kty": "EC"`).
//!
//! Keys are validated when they are constructed and can not be modified afterwards.
//! See [RFC 7517](https://tools.ietf.org/html/rfc7517).

use ::rsa::BigUint;
use serde::{Deserializer, Serializer};
use serde_derive::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::str::FromStr;
use zeroize::Zeroizing;

use crate::{base64url, Error, JsonValue, Result};

pub mod common;
pub mod ec;
pub mod format;
pub mod oct;
pub mod rsa;
pub mod set;

pub use self::common::{KeyOperation, KeyParameters, KeyType, KeyUse};
pub use self::ec::{EcCurve, EcKey, EcPrivateKey, EcPublicKey};
pub use self::format::{KeyEncoding, KeyFormat, KeyKind};
pub use self::oct::OctetKey;
pub use self::rsa::{RsaKey, RsaPrivateParams};
pub use self::set::JsonWebKeySet;

/// A JSON Web Key.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum JsonWebKey {
	Oct(OctetKey),
	Rsa(RsaKey),
	Ec(EcKey),
}

/// What kind of key to generate.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum KeyGeneration {
	/// A symmetric key of `length` bytes.
	Oct { length: usize },
	/// An RSA key pair with a modulus of `bits` bits.
	Rsa { bits: usize },
	/// An elliptic curve key pair.
	Ec { curve: EcCurve },
}

/// A borrowed native public key.
#[derive(Copy, Clone, Debug)]
pub enum NativePublicKey<'a> {
	Rsa(&'a ::rsa::RsaPublicKey),
	Ec(&'a EcPublicKey),
}

/// A borrowed native private key.
#[derive(Copy, Clone, Debug)]
pub enum NativePrivateKey<'a> {
	Rsa(&'a ::rsa::RsaPrivateKey),
	Ec(&'a EcPrivateKey),
}

impl JsonWebKey {
	/// Parse a key from its JSON representation.
	pub fn from_json(json: &str) -> Result<Self> {
		let raw: RawJsonWebKey = serde_json::from_str(json)
			.map_err(|e| Error::invalid_key("malformed JSON web key").with_source(e))?;
		Self::from_raw(raw)
	}

	/// Construct a key from a parsed JSON value.
	pub fn from_value(value: &JsonValue) -> Result<Self> {
		let raw: RawJsonWebKey = serde::Deserialize::deserialize(value)
			.map_err(|e| Error::invalid_key("malformed JSON web key").with_source(e))?;
		Self::from_raw(raw)
	}

	/// The JSON representation of the key, including private parameters.
	pub fn to_value(&self) -> JsonValue {
		// Serializing plain strings and arrays into a value can not fail.
		serde_json::to_value(self.to_raw()).unwrap_or(JsonValue::Null)
	}

	/// Generate a new key.
	pub fn generate(generation: &KeyGeneration) -> Result<Self> {
		match *generation {
			KeyGeneration::Oct { length } => Ok(Self::Oct(OctetKey::generate(length)?)),
			KeyGeneration::Rsa { bits }   => Ok(Self::Rsa(RsaKey::generate(bits)?)),
			KeyGeneration::Ec { curve }   => Ok(Self::Ec(EcKey::generate(curve)?)),
		}
	}

	/// Import a PEM or DER blob as a key of the given type.
	pub fn parse(blob: &[u8], format: KeyFormat, encoding: KeyEncoding, kind: KeyKind, key_type: KeyType) -> Result<Self> {
		match key_type {
			KeyType::Rsa => Ok(Self::Rsa(RsaKey::parse(blob, format, encoding, kind)?)),
			KeyType::Ec  => Ok(Self::Ec(EcKey::parse(blob, format, encoding, kind)?)),
			KeyType::Oct => Err(Error::invalid_parameter("octet keys have no PEM or DER representation")),
		}
	}

	/// Export the key as a PEM or DER blob.
	pub fn export(&self, format: KeyFormat, encoding: KeyEncoding, kind: KeyKind) -> Result<Zeroizing<Vec<u8>>> {
		match self {
			Self::Rsa(key) => key.export(format, encoding, kind),
			Self::Ec(key)  => key.export(format, encoding, kind),
			Self::Oct(_)   => Err(Error::invalid_parameter("octet keys have no PEM or DER representation")),
		}
	}

	pub fn key_type(&self) -> KeyType {
		match self {
			Self::Oct(_) => KeyType::Oct,
			Self::Rsa(_) => KeyType::Rsa,
			Self::Ec(_)  => KeyType::Ec,
		}
	}

	pub fn params(&self) -> &KeyParameters {
		match self {
			Self::Oct(key) => key.params(),
			Self::Rsa(key) => key.params(),
			Self::Ec(key)  => key.params(),
		}
	}

	pub fn kid(&self) -> Option<&str> {
		self.params().kid()
	}

	pub fn alg(&self) -> Option<&str> {
		self.params().alg()
	}

	pub fn key_use(&self) -> Option<KeyUse> {
		self.params().key_use()
	}

	pub fn key_ops(&self) -> Option<&[KeyOperation]> {
		self.params().key_ops()
	}

	/// Check if the key holds private or secret material.
	pub fn is_private(&self) -> bool {
		match self {
			Self::Oct(_)   => true,
			Self::Rsa(key) => key.is_private(),
			Self::Ec(key)  => key.is_private(),
		}
	}

	/// Get a copy of the key with a different set of common parameters.
	pub fn with_params(&self, params: KeyParameters) -> Result<Self> {
		match self {
			Self::Oct(key) => Ok(Self::Oct(key.with_params(params)?)),
			Self::Rsa(key) => Ok(Self::Rsa(key.with_params(params)?)),
			Self::Ec(key)  => Ok(Self::Ec(key.with_params(params)?)),
		}
	}

	pub fn with_kid(&self, kid: impl Into<String>) -> Result<Self> {
		let mut params = self.params().clone();
		params.kid = Some(kid.into());
		self.with_params(params)
	}

	pub fn with_alg(&self, alg: impl Into<String>) -> Result<Self> {
		let mut params = self.params().clone();
		params.alg = Some(alg.into());
		self.with_params(params)
	}

	pub fn with_use(&self, key_use: KeyUse) -> Result<Self> {
		let mut params = self.params().clone();
		params.key_use = Some(key_use);
		self.with_params(params)
	}

	pub fn with_key_ops(&self, key_ops: Vec<KeyOperation>) -> Result<Self> {
		let mut params = self.params().clone();
		params.key_ops = Some(key_ops);
		self.with_params(params)
	}

	/// The raw secret of a symmetric key.
	pub fn secret_key(&self) -> Result<&[u8]> {
		match self {
			Self::Oct(key) => Ok(key.secret_key()),
			_ => Err(Error::invalid_key(format!("{} keys have no secret key", self.key_type()))),
		}
	}

	/// The native public key of an asymmetric key.
	pub fn public_key(&self) -> Result<NativePublicKey<'_>> {
		match self {
			Self::Rsa(key) => Ok(NativePublicKey::Rsa(key.public_key()?)),
			Self::Ec(key)  => Ok(NativePublicKey::Ec(key.public_key()?)),
			Self::Oct(_)   => Err(Error::invalid_key("oct keys have no public key")),
		}
	}

	/// The native private key of an asymmetric key pair.
	pub fn private_key(&self) -> Result<NativePrivateKey<'_>> {
		match self {
			Self::Rsa(key) => Ok(NativePrivateKey::Rsa(key.private_key()?)),
			Self::Ec(key)  => Ok(NativePrivateKey::Ec(key.private_key()?)),
			Self::Oct(_)   => Err(Error::invalid_key("oct keys have no private key")),
		}
	}

	/// The public half of an asymmetric key.
	///
	/// Symmetric keys have no public half.
	pub fn to_public(&self) -> Result<Self> {
		match self {
			Self::Rsa(key) => Ok(Self::Rsa(key.to_public())),
			Self::Ec(key)  => Ok(Self::Ec(key.to_public())),
			Self::Oct(_)   => Err(Error::invalid_key("oct keys have no public representation")),
		}
	}

	/// The RFC 7638 SHA-256 thumbprint of the key, Base64URL encoded.
	///
	/// The thumbprint only covers the required members, so a key pair and its public half have the same thumbprint.
	pub fn thumbprint(&self) -> String {
		let canonical = match self {
			Self::Oct(key) => format!(r#"{{"k":"{}","kty":"oct"}}"#, base64url::encode(key.secret_key())),
			Self::Rsa(key) => format!(r#"{{"e":"{}","kty":"RSA","n":"{}"}}"#, encode_uint(key.e()), encode_uint(key.n())),
			Self::Ec(key)  => format!(r#"{{"crv":"{}","kty":"EC","x":"{}","y":"{}"}}"#, key.curve(), base64url::encode(key.x()), base64url::encode(key.y())),
		};
		base64url::encode(Sha256::digest(canonical.as_bytes()))
	}

	/// Check that the key may be used with an algorithm for one of the given operations.
	pub(crate) fn check_usage(&self, algorithm: &str, operations: &[KeyOperation]) -> Result<()> {
		self.params().check_usage(algorithm, operations)
	}

	fn from_raw(raw: RawJsonWebKey) -> Result<Self> {
		let key_type = KeyType::from_str(&raw.kty)?;

		let key_use = raw.key_use.as_deref().map(KeyUse::from_str).transpose()?;
		let key_ops = match raw.key_ops {
			None => None,
			Some(ops) => Some(ops.iter().map(|op| KeyOperation::from_str(op)).collect::<Result<Vec<_>>>()?),
		};
		let params = KeyParameters::new(key_type, key_use, key_ops, raw.alg, raw.kid)?;

		match key_type {
			KeyType::Oct => {
				let k = Zeroizing::new(required_param("k", raw.k.as_deref())?);
				Ok(Self::Oct(OctetKey::new(k.as_slice(), params)?))
			},
			KeyType::Rsa => {
				let n = BigUint::from_bytes_be(&required_param("n", raw.n.as_deref())?);
				let e = BigUint::from_bytes_be(&required_param("e", raw.e.as_deref())?);
				let private = [&raw.d, &raw.p, &raw.q, &raw.dp, &raw.dq, &raw.qi];
				if private.iter().all(|x| x.is_none()) {
					return Ok(Self::Rsa(RsaKey::new_public(n, e, params)?));
				}
				if private.iter().any(|x| x.is_none()) {
					return Err(Error::invalid_key("private RSA parameters `d`, `p`, `q`, `dp`, `dq` and `qi` must be given together"));
				}
				let private = RsaPrivateParams {
					d:  BigUint::from_bytes_be(&required_param("d", raw.d.as_deref())?),
					p:  BigUint::from_bytes_be(&required_param("p", raw.p.as_deref())?),
					q:  BigUint::from_bytes_be(&required_param("q", raw.q.as_deref())?),
					dp: BigUint::from_bytes_be(&required_param("dp", raw.dp.as_deref())?),
					dq: BigUint::from_bytes_be(&required_param("dq", raw.dq.as_deref())?),
					qi: BigUint::from_bytes_be(&required_param("qi", raw.qi.as_deref())?),
				};
				Ok(Self::Rsa(RsaKey::new_private(n, e, private, params)?))
			},
			KeyType::Ec => {
				let crv = raw.crv.as_deref().ok_or_else(|| Error::invalid_key("missing required parameter `crv`"))?;
				let crv = EcCurve::from_name(crv).map_err(|e| Error::invalid_key(e.message))?;
				let x = required_param("x", raw.x.as_deref())?;
				let y = required_param("y", raw.y.as_deref())?;
				match raw.d.as_deref() {
					None => Ok(Self::Ec(EcKey::new_public(crv, x, y, params)?)),
					Some(d) => Ok(Self::Ec(EcKey::new_private(crv, x, y, decode_param("d", d)?, params)?)),
				}
			},
		}
	}

	fn to_raw(&self) -> RawJsonWebKey {
		let params = self.params();
		let mut raw = RawJsonWebKey {
			kty: self.key_type().name().to_string(),
			key_use: params.key_use().map(|x| x.name().to_string()),
			key_ops: params.key_ops().map(|ops| ops.iter().map(|op| op.name().to_string()).collect()),
			alg: params.alg.clone(),
			kid: params.kid.clone(),
			..RawJsonWebKey::default()
		};

		match self {
			Self::Oct(key) => {
				raw.k = Some(base64url::encode(key.secret_key()));
			},
			Self::Rsa(key) => {
				raw.n = Some(encode_uint(key.n()));
				raw.e = Some(encode_uint(key.e()));
				if let Some(private) = key.private_params() {
					raw.d  = Some(encode_uint(&private.d));
					raw.p  = Some(encode_uint(&private.p));
					raw.q  = Some(encode_uint(&private.q));
					raw.dp = Some(encode_uint(&private.dp));
					raw.dq = Some(encode_uint(&private.dq));
					raw.qi = Some(encode_uint(&private.qi));
				}
			},
			Self::Ec(key) => {
				raw.crv = Some(key.curve().name().to_string());
				raw.x = Some(base64url::encode(key.x()));
				raw.y = Some(base64url::encode(key.y()));
				raw.d = key.d().map(base64url::encode);
			},
		}

		raw
	}
}

impl serde::Serialize for JsonWebKey {
	fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
		serde::Serialize::serialize(&self.to_raw(), serializer)
	}
}

impl<'de> serde::Deserialize<'de> for JsonWebKey {
	fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
		let raw: RawJsonWebKey = serde::Deserialize::deserialize(deserializer)?;
		Self::from_raw(raw).map_err(serde::de::Error::custom)
	}
}

impl From<OctetKey> for JsonWebKey {
	fn from(key: OctetKey) -> Self {
		Self::Oct(key)
	}
}

impl From<RsaKey> for JsonWebKey {
	fn from(key: RsaKey) -> Self {
		Self::Rsa(key)
	}
}

impl From<EcKey> for JsonWebKey {
	fn from(key: EcKey) -> Self {
		Self::Ec(key)
	}
}

/// The JSON shape of a key, before validation.
#[derive(Default, Serialize, Deserialize)]
struct RawJsonWebKey {
	kty: String,
	#[serde(rename = "use", default, skip_serializing_if = "Option::is_none")]
	key_use: Option<String>,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	key_ops: Option<Vec<String>>,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	alg: Option<String>,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	kid: Option<String>,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	crv: Option<String>,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	k: Option<String>,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	n: Option<String>,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	e: Option<String>,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	x: Option<String>,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	y: Option<String>,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	d: Option<String>,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	p: Option<String>,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	q: Option<String>,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	dp: Option<String>,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	dq: Option<String>,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	qi: Option<String>,
}

fn decode_param(name: &str, value: &str) -> Result<Vec<u8>> {
	base64url::decode_param(name, value).map_err(|e| Error::invalid_key(e.message))
}

fn required_param(name: &str, value: Option<&str>) -> Result<Vec<u8>> {
	let value = value.ok_or_else(|| Error::invalid_key(format!("missing required parameter `{}`", name)))?;
	decode_param(name, value)
}

fn encode_uint(value: &BigUint) -> String {
	base64url::encode(value.to_bytes_be())
}
