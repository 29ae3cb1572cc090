//! Business operations, independent of HTTP. Handlers resolve the caller and
//! the repositories and hand them to these functions.

pub mod auth;
pub mod tasks;
