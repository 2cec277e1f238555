//! JSON Web Encryption algorithms.
//!
//! Encrypting a JWE message takes two algorithms:
//!   - a [`KeyManagementAlgorithm`] (the `alg` header parameter) to produce and protect the content encryption key (CEK),
//!   - a [`ContentEncryptionAlgorithm`] (the `enc` header parameter) to encrypt the payload with the CEK.
//!
//! See [RFC 7516](https://tools.ietf.org/html/rfc7516) and [RFC 7518 sections 4 and 5](https://tools.ietf.org/html/rfc7518#section-4).

pub mod alg;
pub mod enc;

pub use self::alg::{KeyManagementAlgorithm, WrappedKey};
pub use self::enc::{ContentEncryptionAlgorithm, Sealed};
