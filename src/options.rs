//! Options for decoding compact messages.
//!
//! The defaults are strict: the `none` algorithm is rejected,
//! signatures are always verified and every supported encryption algorithm is accepted.
//! Both option types can be deserialized, so they can be embedded in application settings.

use serde_derive::Deserialize;

use crate::jwe::{ContentEncryptionAlgorithm, KeyManagementAlgorithm};
use crate::jws::JwsAlgorithm;

/// Options for [`compact::jws::decode_verify`](crate::compact::jws::decode_verify).
#[derive(Clone, Debug, Default, Eq, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct VerifyOptions {
	/// The algorithm the message must be signed with.
	pub expected_algorithm : Option<JwsAlgorithm>,

	/// Accept unsecured messages with the `none` algorithm.
	pub allow_none : bool,

	/// Do not verify the signature at all.
	///
	/// Only useful to inspect a message that can not be verified, for example a token from an unknown issuer.
	/// The payload of such a message can not be trusted.
	pub insecure_skip_verification : bool,
}

impl VerifyOptions {
	pub fn new() -> Self {
		Self::default()
	}

	pub fn with_expected_algorithm(mut self, algorithm: JwsAlgorithm) -> Self {
		self.expected_algorithm = Some(algorithm);
		self
	}

	pub fn with_allow_none(mut self, allow_none: bool) -> Self {
		self.allow_none = allow_none;
		self
	}

	pub fn with_insecure_skip_verification(mut self, skip: bool) -> Self {
		self.insecure_skip_verification = skip;
		self
	}
}

/// Options for [`compact::jwe::decode_decrypt`](crate::compact::jwe::decode_decrypt).
///
/// An empty list allows every supported algorithm.
#[derive(Clone, Debug, Default, Eq, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct DecryptOptions {
	pub allowed_key_management     : Vec<KeyManagementAlgorithm>,
	pub allowed_content_encryption : Vec<ContentEncryptionAlgorithm>,
}

impl DecryptOptions {
	pub fn new() -> Self {
		Self::default()
	}

	pub fn with_allowed_key_management(mut self, algorithms: impl IntoIterator<Item = KeyManagementAlgorithm>) -> Self {
		self.allowed_key_management = algorithms.into_iter().collect();
		self
	}

	pub fn with_allowed_content_encryption(mut self, algorithms: impl IntoIterator<Item = ContentEncryptionAlgorithm>) -> Self {
		self.allowed_content_encryption = algorithms.into_iter().collect();
		self
	}

	pub(crate) fn allows(&self, alg: KeyManagementAlgorithm, enc: ContentEncryptionAlgorithm) -> bool {
		(self.allowed_key_management.is_empty() || self.allowed_key_management.contains(&alg))
			&& (self.allowed_content_encryption.is_empty() || self.allowed_content_encryption.contains(&enc))
	}
}
