//! High-level flows composing links, ciphers, and token stores.

pub mod authentication;
pub mod password_reset;

pub use authentication::*;
pub use password_reset::*;
