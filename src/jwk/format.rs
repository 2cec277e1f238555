//! Native key container formats for importing and exporting keys.

use std::str::FromStr;

use crate::{Error, Result};

/// The outer format of an imported or exported key.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub enum KeyFormat {
	Pem,
	Der,
}

/// The key container structure.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub enum KeyEncoding {
	/// RSA keys as described in RFC 8017 (`RSA PUBLIC KEY` and `RSA PRIVATE KEY`).
	Pkcs1,
	/// Private keys as described in RFC 5208 (`PRIVATE KEY`).
	Pkcs8,
	/// EC private keys as described in RFC 5915 (`EC PRIVATE KEY`).
	Sec1,
	/// SubjectPublicKeyInfo as described in RFC 5280 (`PUBLIC KEY`).
	Spki,
}

/// Whether the public or the private half of a key is imported or exported.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub enum KeyKind {
	Public,
	Private,
}

impl FromStr for KeyFormat {
	type Err = Error;

	fn from_str(name: &str) -> Result<Self> {
		match name {
			"pem" => Ok(Self::Pem),
			"der" => Ok(Self::Der),
			_     => Err(Error::invalid_parameter(format!("unsupported key format `{}`", name))),
		}
	}
}

impl FromStr for KeyEncoding {
	type Err = Error;

	fn from_str(name: &str) -> Result<Self> {
		match name {
			"pkcs1" => Ok(Self::Pkcs1),
			"pkcs8" => Ok(Self::Pkcs8),
			"sec1"  => Ok(Self::Sec1),
			"spki"  => Ok(Self::Spki),
			_       => Err(Error::invalid_parameter(format!("unsupported key encoding `{}`", name))),
		}
	}
}

impl FromStr for KeyKind {
	type Err = Error;

	fn from_str(name: &str) -> Result<Self> {
		match name {
			"public"  => Ok(Self::Public),
			"private" => Ok(Self::Private),
			_         => Err(Error::invalid_parameter(format!("unsupported key kind `{}`", name))),
		}
	}
}

impl KeyEncoding {
	pub fn name(self) -> &'static str {
		match self {
			Self::Pkcs1 => "pkcs1",
			Self::Pkcs8 => "pkcs8",
			Self::Sec1  => "sec1",
			Self::Spki  => "spki",
		}
	}
}

impl KeyKind {
	pub fn name(self) -> &'static str {
		match self {
			Self::Public  => "public",
			Self::Private => "private",
		}
	}
}

/// Interpret a PEM blob as text.
pub(crate) fn pem_str(blob: &[u8]) -> Result<&str> {
	std::str::from_utf8(blob).map_err(|e| Error::parse("PEM data is not valid UTF-8").with_source(e))
}

pub(crate) fn unsupported_combination(key_type: &str, encoding: KeyEncoding, kind: KeyKind) -> Error {
	Error::invalid_parameter(format!("{} encoding is not supported for {} {} keys", encoding.name(), kind.name(), key_type))
}

pub(crate) fn parse_failed<E>(encoding: KeyEncoding, kind: KeyKind) -> impl FnOnce(E) -> Error
where
	E: std::error::Error + Send + Sync + 'static,
{
	move |e| Error::parse(format!("failed to parse {} {} key", encoding.name(), kind.name())).with_source(e)
}

pub(crate) fn export_failed<E>(encoding: KeyEncoding, kind: KeyKind) -> impl FnOnce(E) -> Error
where
	E: std::error::Error + Send + Sync + 'static,
{
	move |e| Error::invalid_parameter(format!("failed to export {} {} key", encoding.name(), kind.name())).with_source(e)
}

#[cfg(test)]
mod test {
	use super::*;
	use crate::ErrorKind;
	use assert2::assert;

	#[test]
	fn test_from_str() {
		assert!(KeyFormat::from_str("pem").unwrap() == KeyFormat::Pem);
		assert!(KeyEncoding::from_str("sec1").unwrap() == KeyEncoding::Sec1);
		assert!(KeyKind::from_str("private").unwrap() == KeyKind::Private);
		assert!(let Err(Error { kind: ErrorKind::InvalidParameter, .. }) = KeyEncoding::from_str("pkcs12"));
		assert!(let Err(Error { kind: ErrorKind::InvalidParameter, .. }) = KeyFormat::from_str("jwk"));
	}
}
