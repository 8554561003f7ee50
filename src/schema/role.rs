use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use crate::types::id::RoleId;

/// A named capability attached to users, unique by `value`.
#[derive(Debug, Clone, PartialEq, Eq, FromRow, Deserialize, Serialize)]
pub struct Role {
    pub id: RoleId,
    pub value: String,
}

impl Role {
    pub const ADMIN: &'static str = "admin";
}
