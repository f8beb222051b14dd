//! ID token handling.
//!
//! - [`CompactToken`] - Structural decoding of `header.payload.signature`
//! - [`Claims`] - Claim lookups over a decoded payload
//! - [`SignatureVerifier`] / [`Certificate`] - Signature checks against the issuer certificate
//! - [`AccessTokenHash`] - `at_hash` computation

pub mod claims;
pub mod compact;
pub mod hash;
pub mod signature;

pub use claims::{Claims, IdTokenClaims};
pub use compact::{CompactToken, TokenHeader};
pub use hash::AccessTokenHash;
pub use signature::{Certificate, SignatureVerifier};
