//! Elliptic curve keys (`"kty": "EC"`).
//!
//! See [RFC 7518 section 6.2](https://tools.ietf.org/html/rfc7518#section-6.2).

use elliptic_curve::pkcs8::{DecodePrivateKey, DecodePublicKey, EncodePrivateKey, EncodePublicKey, LineEnding};
use elliptic_curve::sec1::ToEncodedPoint;
use once_cell::sync::OnceCell;
use rand::rngs::OsRng;
use serde_derive::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use zeroize::Zeroizing;

use crate::jwk::common::{KeyParameters, KeyType};
use crate::jwk::format::{export_failed, parse_failed, pem_str, unsupported_combination, KeyEncoding, KeyFormat, KeyKind};
use crate::{Error, Result};

/// Run a block with `$module` bound to the curve crate of `$curve`.
///
/// The block must evaluate to the same type for every curve.
macro_rules! with_curve {
	($curve:expr, $module:ident => $body:block) => {
		match $curve {
			EcCurve::P256 => { use p256 as $module; $body },
			EcCurve::P384 => { use p384 as $module; $body },
			EcCurve::P521 => { use p521 as $module; $body },
		}
	};
}

/// Run an expression with `$inner` bound to the curve specific key inside a native key enum.
macro_rules! with_key {
	($key:expr, $enum:ident, $inner:ident => $body:expr) => {
		match $key {
			$enum::P256($inner) => $body,
			$enum::P384($inner) => $body,
			$enum::P521($inner) => $body,
		}
	};
}

/// The supported curves.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash, Serialize, Deserialize)]
pub enum EcCurve {
	#[serde(rename = "P-256")]
	P256,
	#[serde(rename = "P-384")]
	P384,
	#[serde(rename = "P-521")]
	P521,
}

impl EcCurve {
	pub fn name(self) -> &'static str {
		match self {
			Self::P256 => "P-256",
			Self::P384 => "P-384",
			Self::P521 => "P-521",
		}
	}

	/// Parse a curve name, failing with an `InvalidParameter` error for unsupported curves.
	pub fn from_name(name: &str) -> Result<Self> {
		match name {
			"P-256" => Ok(Self::P256),
			"P-384" => Ok(Self::P384),
			"P-521" => Ok(Self::P521),
			_       => Err(Error::invalid_parameter(format!("unsupported curve `{}`", name))),
		}
	}

	/// The size in bytes of a coordinate or private scalar.
	pub fn field_size(self) -> usize {
		match self {
			Self::P256 => 32,
			Self::P384 => 48,
			Self::P521 => 66,
		}
	}
}

impl fmt::Display for EcCurve {
	fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
		f.write_str(self.name())
	}
}

impl FromStr for EcCurve {
	type Err = Error;

	fn from_str(name: &str) -> Result<Self> {
		Self::from_name(name)
	}
}

/// A native public key on one of the supported curves.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum EcPublicKey {
	P256(p256::PublicKey),
	P384(p384::PublicKey),
	P521(p521::PublicKey),
}

/// A native private key on one of the supported curves.
#[derive(Clone)]
pub enum EcPrivateKey {
	P256(p256::SecretKey),
	P384(p384::SecretKey),
	P521(p521::SecretKey),
}

impl fmt::Debug for EcPrivateKey {
	fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
		match self {
			Self::P256(_) => f.write_str("EcPrivateKey::P256(..)"),
			Self::P384(_) => f.write_str("EcPrivateKey::P384(..)"),
			Self::P521(_) => f.write_str("EcPrivateKey::P521(..)"),
		}
	}
}

/// An elliptic curve public key, or a key pair if the private scalar is present.
#[derive(Clone)]
pub struct EcKey {
	pub(crate) params : KeyParameters,
	crv               : EcCurve,
	x                 : Vec<u8>,
	y                 : Vec<u8>,
	d                 : Option<Zeroizing<Vec<u8>>>,
	public_key        : OnceCell<EcPublicKey>,
	private_key       : OnceCell<EcPrivateKey>,
}

impl EcKey {
	/// Create a public key from its coordinates.
	///
	/// The coordinates must have exactly the field size of the curve and describe a point on the curve.
	pub fn new_public(crv: EcCurve, x: Vec<u8>, y: Vec<u8>, params: KeyParameters) -> Result<Self> {
		params.validate(KeyType::Ec)?;
		check_length("x", crv, &x)?;
		check_length("y", crv, &y)?;
		let public_key = public_from_coordinates(crv, &x, &y)?;

		Ok(Self {
			params,
			crv,
			x,
			y,
			d: None,
			public_key: OnceCell::with_value(public_key),
			private_key: OnceCell::new(),
		})
	}

	/// Create a key pair from the public coordinates and the private scalar.
	///
	/// The public point must match the private scalar.
	pub fn new_private(crv: EcCurve, x: Vec<u8>, y: Vec<u8>, d: Vec<u8>, params: KeyParameters) -> Result<Self> {
		let d = Zeroizing::new(d);
		let mut key = Self::new_public(crv, x, y, params)?;
		check_length("d", crv, &d)?;
		let private_key = private_from_scalar(crv, &d)?;

		if Some(&private_key.public_key()) != key.public_key.get() {
			return Err(Error::invalid_key("parameter `d` does not match the public point `x`, `y`"));
		}

		key.d = Some(d);
		key.private_key = OnceCell::with_value(private_key);
		Ok(key)
	}

	/// Create a key from a native public key.
	pub fn from_public_key(key: &EcPublicKey, params: KeyParameters) -> Result<Self> {
		let (crv, x, y) = key.coordinates()?;
		Self::new_public(crv, x, y, params)
	}

	/// Create a key from a native private key.
	pub fn from_private_key(key: &EcPrivateKey, params: KeyParameters) -> Result<Self> {
		let (crv, x, y) = key.public_key().coordinates()?;
		let d = key.to_bytes();
		Self::new_private(crv, x, y, d.to_vec(), params)
	}

	/// Generate a new key pair on the given curve.
	pub fn generate(crv: EcCurve) -> Result<Self> {
		let private_key = match crv {
			EcCurve::P256 => EcPrivateKey::P256(p256::SecretKey::random(&mut OsRng)),
			EcCurve::P384 => EcPrivateKey::P384(p384::SecretKey::random(&mut OsRng)),
			EcCurve::P521 => EcPrivateKey::P521(p521::SecretKey::random(&mut OsRng)),
		};
		tracing::debug!(curve = crv.name(), "generated EC key");
		Self::from_private_key(&private_key, KeyParameters::default())
	}

	/// Import a key from a PEM or DER blob.
	///
	/// The curve is read from the blob, unlike RSA there is no need to know it up front.
	pub fn parse(blob: &[u8], format: KeyFormat, encoding: KeyEncoding, kind: KeyKind) -> Result<Self> {
		let params = KeyParameters::default();
		match (kind, encoding) {
			(KeyKind::Private, KeyEncoding::Sec1) | (KeyKind::Private, KeyEncoding::Pkcs8) => {
				let key = parse_private(blob, format, encoding)?;
				Self::from_private_key(&key, params)
			},
			(KeyKind::Public, KeyEncoding::Spki) => {
				let key = parse_public(blob, format)?;
				Self::from_public_key(&key, params)
			},
			(kind, encoding) => Err(unsupported_combination("EC", encoding, kind)),
		}
	}

	/// Export the key as a PEM or DER blob.
	///
	/// PEM output is returned as UTF-8 bytes.
	pub fn export(&self, format: KeyFormat, encoding: KeyEncoding, kind: KeyKind) -> Result<Zeroizing<Vec<u8>>> {
		let exported = match (kind, encoding) {
			(KeyKind::Private, KeyEncoding::Sec1) => with_key!(self.private_key()?, EcPrivateKey, key => match format {
				KeyFormat::Pem => key.to_sec1_pem(LineEnding::LF).map(|pem| pem.as_bytes().to_vec()).map_err(CurveError::from),
				KeyFormat::Der => key.to_sec1_der().map(|der| der.to_vec()).map_err(CurveError::from),
			}),
			(KeyKind::Private, KeyEncoding::Pkcs8) => with_key!(self.private_key()?, EcPrivateKey, key => match format {
				KeyFormat::Pem => key.to_pkcs8_pem(LineEnding::LF).map(|pem| pem.as_bytes().to_vec()).map_err(CurveError::from),
				KeyFormat::Der => key.to_pkcs8_der().map(|der| der.as_bytes().to_vec()).map_err(CurveError::from),
			}),
			(KeyKind::Public, KeyEncoding::Spki) => with_key!(self.public_key()?, EcPublicKey, key => match format {
				KeyFormat::Pem => key.to_public_key_pem(LineEnding::LF).map(String::into_bytes).map_err(CurveError::from),
				KeyFormat::Der => key.to_public_key_der().map(|der| der.as_bytes().to_vec()).map_err(CurveError::from),
			}),
			(kind, encoding) => return Err(unsupported_combination("EC", encoding, kind)),
		};
		exported.map(Zeroizing::new).map_err(export_failed(encoding, kind))
	}

	/// The native public key.
	pub fn public_key(&self) -> Result<&EcPublicKey> {
		self.public_key.get_or_try_init(|| public_from_coordinates(self.crv, &self.x, &self.y))
	}

	/// The native private key.
	///
	/// Fails if this is a public key.
	pub fn private_key(&self) -> Result<&EcPrivateKey> {
		let d = self.d.as_ref()
			.ok_or_else(|| Error::invalid_key("EC key does not contain the private parameter `d`"))?;
		self.private_key.get_or_try_init(|| private_from_scalar(self.crv, d))
	}

	pub fn curve(&self) -> EcCurve {
		self.crv
	}

	pub fn x(&self) -> &[u8] {
		&self.x
	}

	pub fn y(&self) -> &[u8] {
		&self.y
	}

	pub fn d(&self) -> Option<&[u8]> {
		self.d.as_ref().map(|d| d.as_slice())
	}

	pub fn is_private(&self) -> bool {
		self.d.is_some()
	}

	pub fn params(&self) -> &KeyParameters {
		&self.params
	}

	/// The public half of this key.
	pub fn to_public(&self) -> Self {
		Self {
			params: self.params.clone(),
			crv: self.crv,
			x: self.x.clone(),
			y: self.y.clone(),
			d: None,
			public_key: self.public_key.clone(),
			private_key: OnceCell::new(),
		}
	}

	pub(crate) fn with_params(&self, params: KeyParameters) -> Result<Self> {
		params.validate(KeyType::Ec)?;
		let mut key = self.clone();
		key.params = params;
		Ok(key)
	}
}

impl PartialEq for EcKey {
	fn eq(&self, other: &Self) -> bool {
		self.params == other.params && self.crv == other.crv && self.x == other.x && self.y == other.y && self.d == other.d
	}
}

impl Eq for EcKey {}

impl fmt::Debug for EcKey {
	fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
		f.debug_struct("EcKey")
			.field("params", &self.params)
			.field("crv", &self.crv)
			.field("private", &self.d.is_some())
			.finish()
	}
}

impl EcPublicKey {
	pub fn curve(&self) -> EcCurve {
		match self {
			Self::P256(_) => EcCurve::P256,
			Self::P384(_) => EcCurve::P384,
			Self::P521(_) => EcCurve::P521,
		}
	}

	/// The curve and the fixed width affine coordinates of the point.
	fn coordinates(&self) -> Result<(EcCurve, Vec<u8>, Vec<u8>)> {
		let point = with_key!(self, EcPublicKey, key => split_point(key.to_encoded_point(false).as_bytes()));
		let (x, y) = point.ok_or_else(|| Error::invalid_key("public key is not an affine point"))?;
		Ok((self.curve(), x, y))
	}
}

impl EcPrivateKey {
	pub fn curve(&self) -> EcCurve {
		match self {
			Self::P256(_) => EcCurve::P256,
			Self::P384(_) => EcCurve::P384,
			Self::P521(_) => EcCurve::P521,
		}
	}

	pub fn public_key(&self) -> EcPublicKey {
		match self {
			Self::P256(key) => EcPublicKey::P256(key.public_key()),
			Self::P384(key) => EcPublicKey::P384(key.public_key()),
			Self::P521(key) => EcPublicKey::P521(key.public_key()),
		}
	}

	/// The private scalar as fixed width big endian bytes.
	pub fn to_bytes(&self) -> Zeroizing<Vec<u8>> {
		with_key!(self, EcPrivateKey, key => Zeroizing::new(key.to_bytes().to_vec()))
	}
}

fn check_length(name: &str, crv: EcCurve, value: &[u8]) -> Result<()> {
	if value.len() != crv.field_size() {
		return Err(Error::invalid_key(format!("parameter `{}` must be {} bytes for curve {}, got {}", name, crv.field_size(), crv, value.len())));
	}
	Ok(())
}

/// Split an uncompressed SEC1 point into its coordinates.
fn split_point(point: &[u8]) -> Option<(Vec<u8>, Vec<u8>)> {
	if point.first() != Some(&0x04) {
		return None;
	}
	let (x, y) = point[1..].split_at((point.len() - 1) / 2);
	Some((x.to_vec(), y.to_vec()))
}

fn public_from_coordinates(crv: EcCurve, x: &[u8], y: &[u8]) -> Result<EcPublicKey> {
	let mut point = Vec::with_capacity(1 + x.len() + y.len());
	point.push(0x04);
	point.extend_from_slice(x);
	point.extend_from_slice(y);

	let invalid = |e| Error::invalid_key(format!("parameters `x` and `y` are not a point on curve {}", crv)).with_source(e);
	match crv {
		EcCurve::P256 => p256::PublicKey::from_sec1_bytes(&point).map(EcPublicKey::P256).map_err(invalid),
		EcCurve::P384 => p384::PublicKey::from_sec1_bytes(&point).map(EcPublicKey::P384).map_err(invalid),
		EcCurve::P521 => p521::PublicKey::from_sec1_bytes(&point).map(EcPublicKey::P521).map_err(invalid),
	}
}

fn private_from_scalar(crv: EcCurve, d: &[u8]) -> Result<EcPrivateKey> {
	let invalid = |e| Error::invalid_key(format!("parameter `d` is not a valid scalar for curve {}", crv)).with_source(e);
	match crv {
		EcCurve::P256 => p256::SecretKey::from_slice(d).map(EcPrivateKey::P256).map_err(invalid),
		EcCurve::P384 => p384::SecretKey::from_slice(d).map(EcPrivateKey::P384).map_err(invalid),
		EcCurve::P521 => p521::SecretKey::from_slice(d).map(EcPrivateKey::P521).map_err(invalid),
	}
}

/// Try every curve until one accepts the private key.
///
/// SEC1 blobs need not name their curve, so curves are tried from small to large:
/// a scalar never fits a curve smaller than its own.
fn parse_private(blob: &[u8], format: KeyFormat, encoding: KeyEncoding) -> Result<EcPrivateKey> {
	let mut last_error = CurveError::Curve(elliptic_curve::Error);
	for &crv in &[EcCurve::P256, EcCurve::P384, EcCurve::P521] {
		let result = with_curve!(crv, curve => {
			let parsed = match (format, encoding) {
				(KeyFormat::Pem, KeyEncoding::Sec1) => curve::SecretKey::from_sec1_pem(pem_str(blob)?).map_err(CurveError::from),
				(KeyFormat::Der, KeyEncoding::Sec1) => curve::SecretKey::from_sec1_der(blob).map_err(CurveError::from),
				(KeyFormat::Pem, _) => curve::SecretKey::from_pkcs8_pem(pem_str(blob)?).map_err(CurveError::from),
				(KeyFormat::Der, _) => curve::SecretKey::from_pkcs8_der(blob).map_err(CurveError::from),
			};
			parsed.map(|key| key.to_bytes().to_vec())
		});
		match result {
			Ok(d) => return private_from_scalar(crv, &d),
			Err(e) => last_error = e,
		}
	}
	Err(parse_failed(encoding, KeyKind::Private)(last_error))
}

/// Try every curve until one accepts the public key.
fn parse_public(blob: &[u8], format: KeyFormat) -> Result<EcPublicKey> {
	let mut last_error = CurveError::Curve(elliptic_curve::Error);
	for &crv in &[EcCurve::P256, EcCurve::P384, EcCurve::P521] {
		let result = with_curve!(crv, curve => {
			let parsed = match format {
				KeyFormat::Pem => curve::PublicKey::from_public_key_pem(pem_str(blob)?),
				KeyFormat::Der => curve::PublicKey::from_public_key_der(blob),
			};
			parsed.map(|key| key.to_encoded_point(false).as_bytes().to_vec()).map_err(CurveError::from)
		});
		match result {
			Ok(point) => {
				let (x, y) = split_point(&point).ok_or_else(|| Error::parse("SPKI public key is not an uncompressed point"))?;
				return public_from_coordinates(crv, &x, &y);
			},
			Err(e) => last_error = e,
		}
	}
	Err(parse_failed(KeyEncoding::Spki, KeyKind::Public)(last_error))
}

/// A decoder or encoder error from one of the curve crates.
#[derive(Debug, thiserror::Error)]
enum CurveError {
	#[error(transparent)]
	Curve(#[from] elliptic_curve::Error),
	#[error(transparent)]
	Der(#[from] elliptic_curve::pkcs8::der::Error),
	#[error(transparent)]
	Pkcs8(#[from] elliptic_curve::pkcs8::Error),
	#[error(transparent)]
	Spki(#[from] elliptic_curve::pkcs8::spki::Error),
}
