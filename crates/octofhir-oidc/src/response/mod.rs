//! Authentication response parsing.
//!
//! - [`AuthResponse`] - Parameters decoded from the redirect fragment or query string

pub mod fragment;

pub use fragment::AuthResponse;
