//! The `none` algorithm.
//!
//! The `none` algorithm is defined in [RFC 7518 section 3.6](https://tools.ietf.org/html/rfc7518#section-3.6).
//! It does not provide any integrity protection.
//!
//! It doesn't often make sense to use this "algorithm".
//! The compact decoder only accepts it when [`VerifyOptions::allow_none`](crate::VerifyOptions::allow_none) is set,
//! and then requires the signature to be empty.

use crate::Result;

/// Produce the (empty) signature.
pub fn sign() -> Vec<u8> {
	Vec::new()
}

/// Accept any message.
pub fn verify() -> Result<()> {
	Ok(())
}
