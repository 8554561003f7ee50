//! Who may change or remove a user.
//!
//! Both rules are pure. Callers fetch the actor and target first and must
//! report a missing target as not found without consulting these.
use crate::schema::User;

/// A user may delete themselves; an admin may delete anyone.
#[must_use]
pub fn can_delete(actor: &User, target: &User) -> bool {
    actor.name == target.name || actor.is_admin()
}

/// Same rule as [`can_delete`].
#[must_use]
pub fn can_update(actor: &User, target: &User) -> bool {
    can_delete(actor, target)
}

/// Only admins may change role assignments.
#[must_use]
pub fn can_change_roles(actor: &User) -> bool {
    actor.is_admin()
}
