//! Authentication and authorization core.
//!
//! - [`credentials::verify`] checks a login identifier and password.
//! - [`jwt::JwtKeys`] issues and validates login tokens.
//! - [`policy`] decides whether a user may modify or delete another.
//!
//! None of these hold state. Stored data comes from a [`Store`] passed
//! in by the caller.
//!
//! [`Store`]: crate::database::Store
use serde::{Deserialize, Serialize};

use crate::types::id::UserId;

pub mod credentials;
pub mod jwt;
pub mod password;
pub mod policy;

mod error;
pub use error::{AuthError, IntoAuthError, Result, SAVE_FAILED_MESSAGE};

/// Who the caller is, as proven by a password or a token.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize, Serialize)]
pub struct UserIdentity {
    pub uid: UserId,
}
