pub mod actor;
pub mod controllers;
pub mod error;
pub mod server;
pub mod util;

pub use actor::Actor;
pub use error::Error;
