//! This library provides JSON Web Keys, JSON Web Signatures and JSON Web Encryption.
//!
//! Keys are represented by [`JsonWebKey`] and grouped in a [`JsonWebKeySet`].
//! They can be constructed from their JSON representation, generated, or imported from PEM and DER blobs.
//!
//! Signing and verifying is done with the algorithms of [`JwsAlgorithm`],
//! encryption with a [`KeyManagementAlgorithm`] together with a [`ContentEncryptionAlgorithm`].
//!
//! Encoding and decoding is available for the Compact Serialization scheme in the [`compact`] module.
//! Decoding is configured through [`VerifyOptions`] and [`DecryptOptions`].

pub mod base64url;
pub mod compact;
pub mod error;
pub mod header;
pub mod jwe;
pub mod jwk;
pub mod jws;
pub mod options;

#[cfg(test)]
mod test_keys;

pub use serde_json::Value as JsonValue;
pub use serde_json::Map as JsonMap;
pub use crate::error::{Error, ErrorKind, Result};
pub use crate::header::JoseHeader;
pub use crate::jwe::{ContentEncryptionAlgorithm, KeyManagementAlgorithm, Sealed, WrappedKey};
pub use crate::jwk::{EcCurve, EcKey, JsonWebKey, JsonWebKeySet, KeyEncoding, KeyFormat, KeyKind, KeyOperation, KeyUse, OctetKey, RsaKey};
pub use crate::jws::JwsAlgorithm;
pub use crate::options::{DecryptOptions, VerifyOptions};

/// A JSON object.
pub type JsonObject = JsonMap<String, JsonValue>;

/// Create a [`JsonObject`] from a JSON object literal.
///
/// Panics if the literal is not an object.
#[macro_export]
macro_rules! json_object {
	($($tokens:tt)*) => {
		match ::serde_json::json!({ $($tokens)* }) {
			::serde_json::Value::Object(object) => object,
			_ => unreachable!(),
		}
	};
}
