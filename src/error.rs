//! Error types for this crate.

use thiserror::Error as ThisError;

pub type Result<T> = std::result::Result<T, Error>;

type BoxedSource = Box<dyn std::error::Error + Send + Sync + 'static>;

/// An error that occurred while handling keys, signatures or encrypted messages.
///
/// The [`kind`](Error::kind) identifies the category of the error,
/// the message gives a human readable description of what went wrong.
#[derive(Debug, ThisError)]
#[error("{kind}: {message}")]
pub struct Error {
	pub kind    : ErrorKind,
	pub message : String,
	#[source]
	pub source  : Option<BoxedSource>,
}

/// The different kinds of errors.
#[derive(Copy, Clone, Debug, Eq, PartialEq, ThisError)]
pub enum ErrorKind {
	/// A key parameter is missing, malformed or out of bounds, or the key does not fit the requested operation.
	#[error("invalid key")]
	InvalidKey,

	/// A caller supplied parameter is not valid (key size, curve, export format, ...).
	#[error("invalid parameter")]
	InvalidParameter,

	/// The requested algorithm is not supported.
	#[error("unsupported algorithm")]
	UnsupportedAlgorithm,

	/// A key set could not be constructed.
	#[error("invalid key set")]
	InvalidKeySet,

	/// A signature did not verify.
	#[error("invalid signature")]
	InvalidSignature,

	/// A JWS message is malformed or rejected.
	#[error("invalid JSON web signature")]
	InvalidJsonWebSignature,

	/// A JWE message could not be decrypted.
	///
	/// This error never tells which step of the decryption failed.
	#[error("invalid JSON web encryption")]
	InvalidJsonWebEncryption,

	/// The algorithm of a message does not match the expected algorithm.
	#[error("algorithm mismatch")]
	AlgorithmMismatch,

	/// Base64URL data could not be decoded.
	#[error("decoding error")]
	Decoding,

	/// JSON, PEM or DER data could not be parsed.
	#[error("parse error")]
	Parse,
}

impl Error {
	pub fn new(kind: ErrorKind, message: impl Into<String>) -> Self {
		Self { kind, message: message.into(), source: None }
	}

	/// Attach an underlying cause to the error.
	pub fn with_source(mut self, source: impl Into<BoxedSource>) -> Self {
		self.source = Some(source.into());
		self
	}

	pub fn kind(&self) -> ErrorKind {
		self.kind
	}

	pub fn message(&self) -> &str {
		&self.message
	}

	pub fn invalid_key(message: impl Into<String>) -> Self {
		Self::new(ErrorKind::InvalidKey, message)
	}

	pub fn invalid_parameter(message: impl Into<String>) -> Self {
		Self::new(ErrorKind::InvalidParameter, message)
	}

	pub fn unsupported_algorithm(algorithm: impl AsRef<str>) -> Self {
		Self::new(ErrorKind::UnsupportedAlgorithm, algorithm.as_ref())
	}

	pub fn invalid_key_set(message: impl Into<String>) -> Self {
		Self::new(ErrorKind::InvalidKeySet, message)
	}

	pub fn invalid_signature(message: impl Into<String>) -> Self {
		Self::new(ErrorKind::InvalidSignature, message)
	}

	pub fn invalid_jws(message: impl Into<String>) -> Self {
		Self::new(ErrorKind::InvalidJsonWebSignature, message)
	}

	/// The one error reported by every failing JWE decryption path.
	pub fn invalid_jwe() -> Self {
		Self::new(ErrorKind::InvalidJsonWebEncryption, "decryption failed")
	}

	pub fn algorithm_mismatch(expected: impl AsRef<str>, actual: impl AsRef<str>) -> Self {
		Self::new(ErrorKind::AlgorithmMismatch, format!("expected {}, got {}", expected.as_ref(), actual.as_ref()))
	}

	pub fn decoding(message: impl Into<String>) -> Self {
		Self::new(ErrorKind::Decoding, message)
	}

	pub fn parse(message: impl Into<String>) -> Self {
		Self::new(ErrorKind::Parse, message)
	}
}

impl From<base64::DecodeError> for Error {
	fn from(other: base64::DecodeError) -> Self {
		Self::decoding("invalid base64url data").with_source(other)
	}
}

impl From<serde_json::Error> for Error {
	fn from(other: serde_json::Error) -> Self {
		Self::parse("invalid JSON").with_source(other)
	}
}
