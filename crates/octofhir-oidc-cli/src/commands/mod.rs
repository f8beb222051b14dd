pub mod authorize;
pub mod discover;
pub mod validate;
