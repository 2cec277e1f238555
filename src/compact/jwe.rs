//! JWE Compact Serialization.
//!
//! See [RFC 7516 section 7.1](https://tools.ietf.org/html/rfc7516#section-7.1).
//!
//! Decoding never tells the caller why a message was rejected:
//! a malformed message, an unsupported algorithm, a wrong key and a forged tag all give the same error.

use std::str::FromStr;
use zeroize::Zeroizing;

use super::{decode_header, encode_header, split_encoded_parts, try_keys, KeySource};
use crate::{
	base64url,
	ContentEncryptionAlgorithm,
	DecryptOptions,
	Error,
	JsonObject,
	JsonValue,
	JsonWebKey,
	KeyManagementAlgorithm,
	Result,
};

/// A decrypted compact JWE message.
#[derive(Clone, Debug, PartialEq)]
pub struct DecryptedMessage {
	pub header    : JsonObject,
	pub plaintext : Vec<u8>,
}

impl DecryptedMessage {
	/// Parse the plaintext as JSON and deserialize it.
	pub fn parse_json<T: serde::de::DeserializeOwned>(&self) -> Result<T> {
		Ok(serde_json::from_slice(&self.plaintext)?)
	}
}

/// The individual (still encoded) parts of a compact JWE message.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub struct CompactSerializedParts<'a> {
	pub header        : &'a str,
	pub encrypted_key : &'a str,
	pub iv            : &'a str,
	pub ciphertext    : &'a str,
	pub tag           : &'a str,
}

impl<'a> CompactSerializedParts<'a> {
	/// Split a compact JWE message into its five parts.
	pub fn split(data: &'a str) -> Result<Self> {
		match split_encoded_parts(data).as_slice() {
			&[header, encrypted_key, iv, ciphertext, tag] => Ok(Self { header, encrypted_key, iv, ciphertext, tag }),
			_ => Err(Error::invalid_jwe()),
		}
	}
}

/// Encrypt a plaintext and encode it as a compact JWE message.
///
/// The `alg` and `enc` parameters of the header are set,
/// together with any parameters the key management algorithm needs (such as `iv` and `tag` for AES-GCM key wrapping).
pub fn encode_encrypt(
	mut header: JsonObject,
	plaintext: &[u8],
	algorithm: KeyManagementAlgorithm,
	encryption: ContentEncryptionAlgorithm,
	key: &JsonWebKey,
) -> Result<String> {
	let wrapped = algorithm.wrap(encryption, key)?;

	header.insert("alg".to_string(), JsonValue::from(algorithm.name()));
	header.insert("enc".to_string(), JsonValue::from(encryption.name()));
	header.extend(wrapped.header);

	// The ASCII of the encoded header is the additional authenticated data.
	let header = encode_header(&header)?;
	let iv = encryption.generate_iv();
	let sealed = encryption.encrypt(plaintext, header.as_bytes(), &iv, &wrapped.cek)?;

	tracing::debug!(alg = %algorithm, enc = %encryption, kid = ?key.kid(), "encrypted compact JWE message");
	Ok(format!(
		"{}.{}.{}.{}.{}",
		header,
		wrapped.ek,
		base64url::encode(iv),
		base64url::encode(sealed.ciphertext),
		base64url::encode(sealed.tag),
	))
}

/// Decode and decrypt a compact JWE message.
///
/// Every failure is reported as the same [`ErrorKind::InvalidJsonWebEncryption`](crate::ErrorKind::InvalidJsonWebEncryption).
pub fn decode_decrypt(data: &str, keys: impl KeySource, options: &DecryptOptions) -> Result<DecryptedMessage> {
	decode_decrypt_inner(data, keys, options).map_err(|_| Error::invalid_jwe())
}

fn decode_decrypt_inner(data: &str, keys: impl KeySource, options: &DecryptOptions) -> Result<DecryptedMessage> {
	let parts = CompactSerializedParts::split(data)?;

	let header = decode_header(parts.header)?;
	header.check_critical()?;
	if header.get("zip").is_some() {
		return Err(Error::unsupported_algorithm("compressed payloads are not supported"));
	}

	let algorithm = KeyManagementAlgorithm::from_str(header.alg()?)?;
	let encryption = ContentEncryptionAlgorithm::from_str(header.enc()?)?;
	if !options.allows(algorithm, encryption) {
		return Err(Error::unsupported_algorithm(format!("{} with {} is not allowed", algorithm, encryption)));
	}

	let encrypted_key = base64url::decode(parts.encrypted_key)?;
	let iv = base64url::decode(parts.iv)?;
	let ciphertext = base64url::decode(parts.ciphertext)?;
	let tag = base64url::decode(parts.tag)?;

	let candidates = keys.candidates(&header)?;
	let plaintext = try_keys(&candidates, |key| {
		let cek: Zeroizing<Vec<u8>> = algorithm.unwrap(&encrypted_key, key, &header.protected, encryption)?;
		encryption.decrypt(&ciphertext, parts.header.as_bytes(), &iv, &tag, &cek)
	})?;

	tracing::debug!(alg = %algorithm, enc = %encryption, kid = ?header.kid(), "decrypted compact JWE message");
	Ok(DecryptedMessage { header: header.protected, plaintext })
}

#[cfg(test)]
mod test {
	use super::*;
	use crate::test_keys::{RSA_2048_JWK, RSA_2048_OTHER_JWK};
	use crate::{json_object, ErrorKind, JsonWebKeySet};
	use assert2::assert;

	// Test case from RFC 7516 appendix A.3
	// https://tools.ietf.org/html/rfc7516#appendix-A.3
	const RFC7516_A3_KEY     : &str = r#"{"kty":"oct","alg":"A128KW","k":"GawgguFyGrWKav7AX4VKUg"}"#;
	const RFC7516_A3_ENCODED : &str = "eyJhbGciOiJBMTI4S1ciLCJlbmMiOiJBMTI4Q0JDLUhTMjU2In0.6KB707dM9YTIgHtLvtgWQ8mKwboJW3of9locizkDTHzBC2IlrT1oOQ.AxY8DCtDaGlsbGljb3RoZQ.KDlTtXchhZTGufMYmOYGS4HffxPSUrfmqCHXaI9wOGY.U0m_YmjN04DJvceFICbCVQ";

	fn oct(length: usize, alg: &str) -> JsonWebKey {
		let secret = base64url::encode(vec![0x17; length]);
		JsonWebKey::from_json(&format!(r#"{{"kty":"oct","alg":"{}","k":"{}"}}"#, alg, secret)).unwrap()
	}

	fn key_for(alg: KeyManagementAlgorithm, enc: ContentEncryptionAlgorithm) -> JsonWebKey {
		match alg {
			KeyManagementAlgorithm::Direct => oct(enc.key_length(), "dir"),
			KeyManagementAlgorithm::A128Kw | KeyManagementAlgorithm::A128GcmKw => oct(16, alg.name()),
			KeyManagementAlgorithm::A192Kw | KeyManagementAlgorithm::A192GcmKw => oct(24, alg.name()),
			KeyManagementAlgorithm::A256Kw | KeyManagementAlgorithm::A256GcmKw => oct(32, alg.name()),
			_ => JsonWebKey::from_json(RSA_2048_JWK).unwrap(),
		}
	}

	fn replace_part(token: &str, index: usize, value: &str) -> String {
		let mut parts = split_encoded_parts(token);
		parts[index] = value;
		parts.join(".")
	}

	#[test]
	fn test_decrypt_rfc7516_a3() {
		let key = JsonWebKey::from_json(RFC7516_A3_KEY).unwrap();
		let message = decode_decrypt(RFC7516_A3_ENCODED, &key, &DecryptOptions::new()).unwrap();
		assert!(message.header == json_object!{"alg": "A128KW", "enc": "A128CBC-HS256"});
		assert!(message.plaintext == b"Live long and prosper.");
	}

	#[test]
	fn test_round_trip_all_algorithms() {
		for &alg in KeyManagementAlgorithm::ALL.iter() {
			for &enc in ContentEncryptionAlgorithm::ALL.iter() {
				let key = key_for(alg, enc);
				let token = encode_encrypt(json_object!{"cty": "JWT"}, b"attack at dawn", alg, enc, &key).unwrap();
				assert!(split_encoded_parts(&token).len() == 5);

				let message = decode_decrypt(&token, &key, &DecryptOptions::new()).unwrap();
				assert!(message.plaintext == b"attack at dawn", "{} {}", alg, enc);
				assert!(message.header["alg"] == alg.name());
				assert!(message.header["enc"] == enc.name());
				assert!(message.header["cty"] == "JWT");
			}
		}
	}

	#[test]
	fn test_header_additions() {
		let key = key_for(KeyManagementAlgorithm::A256GcmKw, ContentEncryptionAlgorithm::A128Gcm);
		let token = encode_encrypt(JsonObject::new(), b"foo", KeyManagementAlgorithm::A256GcmKw, ContentEncryptionAlgorithm::A128Gcm, &key).unwrap();
		let message = decode_decrypt(&token, &key, &DecryptOptions::new()).unwrap();
		assert!(let Some(JsonValue::String(_)) = message.header.get("iv"));
		assert!(let Some(JsonValue::String(_)) = message.header.get("tag"));

		let key = key_for(KeyManagementAlgorithm::Direct, ContentEncryptionAlgorithm::A128Gcm);
		let token = encode_encrypt(JsonObject::new(), b"foo", KeyManagementAlgorithm::Direct, ContentEncryptionAlgorithm::A128Gcm, &key).unwrap();
		assert!(split_encoded_parts(&token)[1] == "");
	}

	#[test]
	fn test_fresh_iv_per_message() {
		let key = key_for(KeyManagementAlgorithm::Direct, ContentEncryptionAlgorithm::A256Gcm);
		let a = encode_encrypt(JsonObject::new(), b"foo", KeyManagementAlgorithm::Direct, ContentEncryptionAlgorithm::A256Gcm, &key).unwrap();
		let b = encode_encrypt(JsonObject::new(), b"foo", KeyManagementAlgorithm::Direct, ContentEncryptionAlgorithm::A256Gcm, &key).unwrap();
		assert!(split_encoded_parts(&a)[2] != split_encoded_parts(&b)[2]);
		assert!(split_encoded_parts(&a)[3] != split_encoded_parts(&b)[3]);
	}

	#[test]
	fn test_every_failure_is_opaque() {
		let key = JsonWebKey::from_json(RFC7516_A3_KEY).unwrap();
		let other_key = oct(16, "A128KW");
		let options = DecryptOptions::new();

		let zip_header = base64url::encode(br#"{"alg":"A128KW","enc":"A128CBC-HS256","zip":"DEF"}"#);
		let crit_header = base64url::encode(br#"{"alg":"A128KW","enc":"A128CBC-HS256","crit":["exp"],"exp":1}"#);
		let unknown_header = base64url::encode(br#"{"alg":"ECDH-ES","enc":"A128CBC-HS256"}"#);
		let no_enc_header = base64url::encode(br#"{"alg":"A128KW"}"#);

		let failures = vec![
			decode_decrypt("", &key, &options),
			decode_decrypt("a.b.c", &key, &options),
			decode_decrypt(&format!("{}.x", RFC7516_A3_ENCODED), &key, &options),
			decode_decrypt(RFC7516_A3_ENCODED, &other_key, &options),
			decode_decrypt(&replace_part(RFC7516_A3_ENCODED, 0, &zip_header), &key, &options),
			decode_decrypt(&replace_part(RFC7516_A3_ENCODED, 0, &crit_header), &key, &options),
			decode_decrypt(&replace_part(RFC7516_A3_ENCODED, 0, &unknown_header), &key, &options),
			decode_decrypt(&replace_part(RFC7516_A3_ENCODED, 0, &no_enc_header), &key, &options),
			decode_decrypt(&replace_part(RFC7516_A3_ENCODED, 2, "AxY8DCtDaGlsbGljb3RoZA"), &key, &options),
			decode_decrypt(&replace_part(RFC7516_A3_ENCODED, 3, "KDlTtXchhZTGufMYmOYGS4HffxPSUrfmqCHXaI9wOGc"), &key, &options),
			decode_decrypt(&replace_part(RFC7516_A3_ENCODED, 4, "U0m_YmjN04DJvceFICbCVA"), &key, &options),
			decode_decrypt(&replace_part(RFC7516_A3_ENCODED, 4, "!!!"), &key, &options),
		];

		for result in &failures {
			assert!(let Err(Error { kind: ErrorKind::InvalidJsonWebEncryption, .. }) = result);
			if let Err(error) = result {
				assert!(error.message == "decryption failed");
			}
		}
	}

	#[test]
	fn test_allowed_algorithms() {
		let key = JsonWebKey::from_json(RFC7516_A3_KEY).unwrap();

		let options = DecryptOptions::new().with_allowed_key_management(vec![KeyManagementAlgorithm::RsaOaep256]);
		assert!(let Err(Error { kind: ErrorKind::InvalidJsonWebEncryption, .. }) = decode_decrypt(RFC7516_A3_ENCODED, &key, &options));

		let options = DecryptOptions::new().with_allowed_content_encryption(vec![ContentEncryptionAlgorithm::A256Gcm]);
		assert!(let Err(Error { kind: ErrorKind::InvalidJsonWebEncryption, .. }) = decode_decrypt(RFC7516_A3_ENCODED, &key, &options));

		let options = DecryptOptions::new()
			.with_allowed_key_management(vec![KeyManagementAlgorithm::A128Kw])
			.with_allowed_content_encryption(vec![ContentEncryptionAlgorithm::A128CbcHs256]);
		assert!(let Ok(_) = decode_decrypt(RFC7516_A3_ENCODED, &key, &options));
	}

	#[test]
	fn test_key_set() {
		let rsa = JsonWebKey::from_json(RSA_2048_JWK).unwrap().with_kid("rsa").unwrap();
		let other = JsonWebKey::from_json(RSA_2048_OTHER_JWK).unwrap().with_kid("other").unwrap();
		let keys = JsonWebKeySet::new(vec![other.clone(), rsa.clone()]).unwrap();

		let alg = KeyManagementAlgorithm::RsaOaep;
		let enc = ContentEncryptionAlgorithm::A256Gcm;

		// Without `kid`, every key is tried in turn.
		let token = encode_encrypt(JsonObject::new(), b"foo", alg, enc, &rsa).unwrap();
		assert!(decode_decrypt(&token, &keys, &DecryptOptions::new()).unwrap().plaintext == b"foo");

		let token = encode_encrypt(json_object!{"kid": "rsa"}, b"foo", alg, enc, &rsa).unwrap();
		assert!(decode_decrypt(&token, &keys, &DecryptOptions::new()).unwrap().plaintext == b"foo");

		let token = encode_encrypt(json_object!{"kid": "other"}, b"foo", alg, enc, &rsa).unwrap();
		assert!(let Err(Error { kind: ErrorKind::InvalidJsonWebEncryption, .. }) = decode_decrypt(&token, &keys, &DecryptOptions::new()));
	}

	#[test]
	fn test_parse_json() {
		let key = key_for(KeyManagementAlgorithm::A256Kw, ContentEncryptionAlgorithm::A256CbcHs512);
		let token = encode_encrypt(JsonObject::new(), br#"{"sub":"alice"}"#, KeyManagementAlgorithm::A256Kw, ContentEncryptionAlgorithm::A256CbcHs512, &key).unwrap();
		let message = decode_decrypt(&token, &key, &DecryptOptions::new()).unwrap();
		let claims: JsonObject = message.parse_json().unwrap();
		assert!(claims["sub"] == "alice");
	}

	#[test]
	fn test_encrypt_with_wrong_key_type() {
		let key = JsonWebKey::from_json(RSA_2048_JWK).unwrap();
		let result = encode_encrypt(JsonObject::new(), b"foo", KeyManagementAlgorithm::A128Kw, ContentEncryptionAlgorithm::A128Gcm, &key);
		assert!(let Err(Error { kind: ErrorKind::InvalidKey, .. }) = result);
	}

	#[test]
	fn test_rsa1_5_bad_encrypted_key_fails_like_a_bad_tag() {
		let key = JsonWebKey::from_json(RSA_2048_JWK).unwrap();
		let other = JsonWebKey::from_json(RSA_2048_OTHER_JWK).unwrap();
		let alg = KeyManagementAlgorithm::Rsa1_5;
		let enc = ContentEncryptionAlgorithm::A128CbcHs256;
		let token = encode_encrypt(JsonObject::new(), b"attack at dawn", alg, enc, &key).unwrap();

		let mut ek = base64url::decode(split_encoded_parts(&token)[1]).unwrap();
		ek[10] ^= 0x01;
		let corrupted = replace_part(&token, 1, &base64url::encode(&ek));

		let short_cek = match &key {
			JsonWebKey::Rsa(rsa) => crate::jwe::alg::rsa::wrap(alg, &[3; 16], rsa).unwrap(),
			_ => unreachable!(),
		};
		let wrong_length = replace_part(&token, 1, &base64url::encode(&short_cek));

		let failures = [
			decode_decrypt(&corrupted, &key, &DecryptOptions::new()),
			decode_decrypt(&wrong_length, &key, &DecryptOptions::new()),
			decode_decrypt(&token, &other, &DecryptOptions::new()),
			decode_decrypt(&replace_part(&token, 4, "AAAAAAAAAAAAAAAAAAAAAA"), &key, &DecryptOptions::new()),
		];
		for result in failures.iter() {
			assert!(let Err(Error { kind: ErrorKind::InvalidJsonWebEncryption, .. }) = result);
			if let Err(error) = result {
				assert!(error.message == "decryption failed");
			}
		}

		assert!(let Ok(_) = decode_decrypt(&token, &key, &DecryptOptions::new()));
	}
}
