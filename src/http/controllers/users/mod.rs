mod delete;
mod login;
mod read;
mod register;
mod update;

pub use delete::{delete, purge_test_users};
pub use login::login;
pub use read::{get, list, profile};
pub use register::register;
pub use update::update;
