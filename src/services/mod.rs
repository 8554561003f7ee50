//! Business operations behind every route. Handlers only translate
//! between HTTP and these functions.
pub mod users;
