//! Mintgate CLI - operator front end
//!
//! Every invocation loads the controller from a data directory, performs
//! one entry point and writes state back only if the call succeeded.

pub mod commands;
pub mod context;

pub use context::AppContext;
