//! Value Objects
//!
//! Immutable domain value types.

mod role;

pub use role::{ContactRole, Party, Role};
