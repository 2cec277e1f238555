//! Direct encryption with a shared symmetric key (`dir`).
//!
//! See [RFC 7518 section 4.5](https://tools.ietf.org/html/rfc7518#section-4.5).

use zeroize::Zeroizing;

use crate::jwe::{ContentEncryptionAlgorithm, WrappedKey};
use crate::jwk::OctetKey;
use crate::{Error, JsonObject, Result};

/// Use the secret of the key as content encryption key.
pub fn wrap(enc: ContentEncryptionAlgorithm, key: &OctetKey) -> Result<WrappedKey> {
	enc.check_key(key.secret_key())?;
	Ok(WrappedKey {
		cek: Zeroizing::new(key.secret_key().to_vec()),
		ek: String::new(),
		header: JsonObject::new(),
	})
}

/// Recover the content encryption key, which is the secret of the key.
///
/// The encrypted key must be empty.
pub fn unwrap(ek: &[u8], enc: ContentEncryptionAlgorithm, key: &OctetKey) -> Result<Zeroizing<Vec<u8>>> {
	if !ek.is_empty() {
		return Err(Error::invalid_jwe());
	}
	enc.check_key(key.secret_key())?;
	Ok(Zeroizing::new(key.secret_key().to_vec()))
}
