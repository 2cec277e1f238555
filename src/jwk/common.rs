//! Parameters shared by every key type.
//!
//! See [RFC 7517 section 4](https://tools.ietf.org/html/rfc7517#section-4).

use serde_derive::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::jwe::KeyManagementAlgorithm;
use crate::jws::JwsAlgorithm;
use crate::{Error, Result};

/// The `kty` (key type) parameter.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash, Serialize, Deserialize)]
pub enum KeyType {
	#[serde(rename = "oct")]
	Oct,
	#[serde(rename = "RSA")]
	Rsa,
	#[serde(rename = "EC")]
	Ec,
}

impl KeyType {
	pub fn name(self) -> &'static str {
		match self {
			Self::Oct => "oct",
			Self::Rsa => "RSA",
			Self::Ec  => "EC",
		}
	}
}

impl fmt::Display for KeyType {
	fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
		f.write_str(self.name())
	}
}

impl FromStr for KeyType {
	type Err = Error;

	fn from_str(name: &str) -> Result<Self> {
		match name {
			"oct" => Ok(Self::Oct),
			"RSA" => Ok(Self::Rsa),
			"EC"  => Ok(Self::Ec),
			_     => Err(Error::invalid_key(format!("unsupported key type `{}`", name))),
		}
	}
}

/// The `use` (public key use) parameter.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash, Serialize, Deserialize)]
pub enum KeyUse {
	#[serde(rename = "sig")]
	Signature,
	#[serde(rename = "enc")]
	Encryption,
}

impl KeyUse {
	pub fn name(self) -> &'static str {
		match self {
			Self::Signature  => "sig",
			Self::Encryption => "enc",
		}
	}

	/// Check if an operation is consistent with this use.
	pub fn permits(self, operation: KeyOperation) -> bool {
		use KeyOperation::*;
		match self {
			Self::Signature  => matches!(operation, Sign | Verify),
			Self::Encryption => matches!(operation, Encrypt | Decrypt | WrapKey | UnwrapKey | DeriveKey | DeriveBits),
		}
	}
}

impl FromStr for KeyUse {
	type Err = Error;

	fn from_str(name: &str) -> Result<Self> {
		match name {
			"sig" => Ok(Self::Signature),
			"enc" => Ok(Self::Encryption),
			_     => Err(Error::invalid_key(format!("invalid value `{}` for parameter `use`", name))),
		}
	}
}

/// A value of the `key_ops` (key operations) parameter.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum KeyOperation {
	Sign,
	Verify,
	Encrypt,
	Decrypt,
	WrapKey,
	UnwrapKey,
	DeriveKey,
	DeriveBits,
}

impl KeyOperation {
	pub fn name(self) -> &'static str {
		match self {
			Self::Sign       => "sign",
			Self::Verify     => "verify",
			Self::Encrypt    => "encrypt",
			Self::Decrypt    => "decrypt",
			Self::WrapKey    => "wrapKey",
			Self::UnwrapKey  => "unwrapKey",
			Self::DeriveKey  => "deriveKey",
			Self::DeriveBits => "deriveBits",
		}
	}
}

impl FromStr for KeyOperation {
	type Err = Error;

	fn from_str(name: &str) -> Result<Self> {
		match name {
			"sign"       => Ok(Self::Sign),
			"verify"     => Ok(Self::Verify),
			"encrypt"    => Ok(Self::Encrypt),
			"decrypt"    => Ok(Self::Decrypt),
			"wrapKey"    => Ok(Self::WrapKey),
			"unwrapKey"  => Ok(Self::UnwrapKey),
			"deriveKey"  => Ok(Self::DeriveKey),
			"deriveBits" => Ok(Self::DeriveBits),
			_            => Err(Error::invalid_key(format!("invalid value `{}` for parameter `key_ops`", name))),
		}
	}
}

/// The parameters every JSON Web Key can carry regardless of its type.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct KeyParameters {
	pub(crate) key_use : Option<KeyUse>,
	pub(crate) key_ops : Option<Vec<KeyOperation>>,
	pub(crate) alg     : Option<String>,
	pub(crate) kid     : Option<String>,
}

impl KeyParameters {
	/// Create validated key parameters for a key of the given type.
	pub fn new(key_type: KeyType, key_use: Option<KeyUse>, key_ops: Option<Vec<KeyOperation>>, alg: Option<String>, kid: Option<String>) -> Result<Self> {
		let params = Self { key_use, key_ops, alg, kid };
		params.validate(key_type)?;
		Ok(params)
	}

	pub fn key_use(&self) -> Option<KeyUse> {
		self.key_use
	}

	pub fn key_ops(&self) -> Option<&[KeyOperation]> {
		self.key_ops.as_deref()
	}

	pub fn alg(&self) -> Option<&str> {
		self.alg.as_deref()
	}

	pub fn kid(&self) -> Option<&str> {
		self.kid.as_deref()
	}

	pub(crate) fn validate(&self, key_type: KeyType) -> Result<()> {
		if let Some(key_ops) = &self.key_ops {
			for (i, operation) in key_ops.iter().enumerate() {
				if key_ops[..i].contains(operation) {
					return Err(Error::invalid_key(format!("parameter `key_ops` contains `{}` more than once", operation.name())));
				}
				if let Some(key_use) = self.key_use {
					if !key_use.permits(*operation) {
						return Err(Error::invalid_key(format!("parameter `key_ops` contains `{}` which is inconsistent with `use` `{}`", operation.name(), key_use.name())));
					}
				}
			}
		}

		if let Some(alg) = &self.alg {
			match algorithm_key_type(alg) {
				None => return Err(Error::invalid_key(format!("parameter `alg` has unsupported value `{}`", alg))),
				Some(expected) if expected != key_type => {
					return Err(Error::invalid_key(format!("parameter `alg` value `{}` can not be used with key type `{}`", alg, key_type)));
				},
				Some(_) => (),
			}
		}

		Ok(())
	}

	/// Check that the key may be used for an algorithm and one of the given operations.
	///
	/// The operations are alternatives: `key_ops` only needs to contain one of them.
	pub(crate) fn check_usage(&self, algorithm: &str, operations: &[KeyOperation]) -> Result<()> {
		if let Some(alg) = &self.alg {
			if alg != algorithm {
				return Err(Error::invalid_key(format!("key is restricted to algorithm `{}`, can not use it for `{}`", alg, algorithm)));
			}
		}

		if let Some(key_use) = self.key_use {
			if !operations.iter().any(|op| key_use.permits(*op)) {
				return Err(Error::invalid_key(format!("key with use `{}` can not be used for `{}`", key_use.name(), algorithm)));
			}
		}

		if let Some(key_ops) = &self.key_ops {
			if !operations.iter().any(|op| key_ops.contains(op)) {
				return Err(Error::invalid_key(format!("parameter `key_ops` does not allow `{}`", operations[0].name())));
			}
		}

		Ok(())
	}
}

/// Determine the key type an algorithm name needs, if the name is a supported `alg` value.
pub(crate) fn algorithm_key_type(alg: &str) -> Option<KeyType> {
	if let Ok(algorithm) = JwsAlgorithm::from_str(alg) {
		return algorithm.key_type();
	}
	if let Ok(algorithm) = KeyManagementAlgorithm::from_str(alg) {
		return Some(algorithm.key_type());
	}
	None
}

#[cfg(test)]
mod test {
	use super::*;
	use crate::ErrorKind;
	use assert2::assert;

	#[test]
	fn test_duplicate_key_ops() {
		let result = KeyParameters::new(KeyType::Oct, None, Some(vec![KeyOperation::Sign, KeyOperation::Sign]), None, None);
		assert!(let Err(Error { kind: ErrorKind::InvalidKey, .. }) = result);
	}

	#[test]
	fn test_key_ops_must_match_use() {
		let sig = Some(KeyUse::Signature);
		let enc = Some(KeyUse::Encryption);
		assert!(let Ok(_) = KeyParameters::new(KeyType::Rsa, sig, Some(vec![KeyOperation::Sign, KeyOperation::Verify]), None, None));
		assert!(let Err(_) = KeyParameters::new(KeyType::Rsa, sig, Some(vec![KeyOperation::Encrypt]), None, None));
		assert!(let Ok(_) = KeyParameters::new(KeyType::Rsa, enc, Some(vec![KeyOperation::WrapKey, KeyOperation::UnwrapKey]), None, None));
		assert!(let Err(_) = KeyParameters::new(KeyType::Rsa, enc, Some(vec![KeyOperation::Verify]), None, None));
	}

	#[test]
	fn test_alg_must_match_key_type() {
		assert!(let Ok(_) = KeyParameters::new(KeyType::Oct, None, None, Some("HS256".into()), None));
		assert!(let Ok(_) = KeyParameters::new(KeyType::Oct, None, None, Some("A128KW".into()), None));
		assert!(let Ok(_) = KeyParameters::new(KeyType::Rsa, None, None, Some("RSA-OAEP-256".into()), None));
		assert!(let Err(_) = KeyParameters::new(KeyType::Ec, None, None, Some("RS256".into()), None));
		assert!(let Err(_) = KeyParameters::new(KeyType::Oct, None, None, Some("none".into()), None));
		assert!(let Err(_) = KeyParameters::new(KeyType::Oct, None, None, Some("XS256".into()), None));
	}

	#[test]
	fn test_check_usage() {
		let params = KeyParameters::new(KeyType::Oct, Some(KeyUse::Signature), None, Some("HS256".into()), None).unwrap();
		assert!(let Ok(()) = params.check_usage("HS256", &[KeyOperation::Sign]));
		assert!(let Err(_) = params.check_usage("HS512", &[KeyOperation::Sign]));

		let params = KeyParameters::new(KeyType::Oct, None, Some(vec![KeyOperation::Verify]), None, None).unwrap();
		assert!(let Ok(()) = params.check_usage("HS256", &[KeyOperation::Verify]));
		assert!(let Err(_) = params.check_usage("HS256", &[KeyOperation::Sign]));
	}
}
