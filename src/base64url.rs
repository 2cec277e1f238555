//! Unpadded Base64URL encoding as used by every JOSE structure.
//!
//! See [RFC 7515 section 2](https://tools.ietf.org/html/rfc7515#section-2).

use base64::alphabet::URL_SAFE;
use base64::engine::{DecodePaddingMode, GeneralPurpose, GeneralPurposeConfig};
use base64::Engine;

use crate::{Error, Result};

/// URL-safe engine that never writes padding but tolerates it when decoding.
const ENGINE: GeneralPurpose = GeneralPurpose::new(
	&URL_SAFE,
	GeneralPurposeConfig::new()
		.with_encode_padding(false)
		.with_decode_padding_mode(DecodePaddingMode::Indifferent),
);

/// Encode bytes as unpadded Base64URL.
pub fn encode(data: impl AsRef<[u8]>) -> String {
	ENGINE.encode(data)
}

/// Decode (possibly unpadded) Base64URL data.
pub fn decode(data: impl AsRef<[u8]>) -> Result<Vec<u8>> {
	Ok(ENGINE.decode(data)?)
}

/// Decode a named Base64URL parameter, naming the parameter in the error.
pub(crate) fn decode_param(name: &str, data: &str) -> Result<Vec<u8>> {
	ENGINE.decode(data).map_err(|e| Error::decoding(format!("parameter `{}` is not valid base64url", name)).with_source(e))
}

#[cfg(test)]
mod test {
	use super::*;
	use crate::ErrorKind;
	use assert2::assert;

	#[test]
	fn test_encode() {
		assert!(encode(b"") == "");
		assert!(encode(b"f") == "Zg");
		assert!(encode(b"fo") == "Zm8");
		assert!(encode(b"foo") == "Zm9v");
		assert!(encode([0xfb, 0xff, 0xfe]) == "-__-");
	}

	#[test]
	fn test_decode_unpadded_and_padded() {
		assert!(decode("Zg").unwrap() == b"f");
		assert!(decode("Zg==").unwrap() == b"f");
		assert!(decode("Zm8").unwrap() == b"fo");
		assert!(decode("-__-").unwrap() == [0xfb, 0xff, 0xfe]);
	}

	#[test]
	fn test_round_trip() {
		for len in 0..67 {
			let data: Vec<u8> = (0..len).map(|i| (i * 37 + 11) as u8).collect();
			assert!(decode(encode(&data)).unwrap() == data);
		}
	}

	#[test]
	fn test_decode_rejects_standard_alphabet() {
		assert!(let Err(Error { kind: ErrorKind::Decoding, .. }) = decode("+//+"));
		assert!(let Err(Error { kind: ErrorKind::Decoding, .. }) = decode("Zm9v!"));
	}
}
