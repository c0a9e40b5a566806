//! User identifiers, key material, password hashes, and authentication token models.

pub mod id;
pub mod key;
pub mod password;
pub mod token;

pub use id::*;
pub use key::*;
pub use password::*;
pub use token::{AuthToken, TokenHash, TokenScope, hash_token, record::*, secret::*};
