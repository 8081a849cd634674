//! Mintgate Core - Domain types
//!
//! Fundamental types shared by every Mintgate crate:
//! - `Address`: identity of a caller, recipient or collaborator
//! - `Amount`: non-negative decimal quantity of the controlled asset

pub mod address;
pub mod amount;

pub use address::Address;
pub use amount::{Amount, AmountError};
