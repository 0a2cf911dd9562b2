//! Data Transfer Objects
//!
//! Request and response body structures for the REST API. IDs are rendered
//! as strings in JSON so JavaScript clients never hit BigInt precision loss
//! on snowflake values.

pub mod request;
pub mod response;

pub use request::*;
pub use response::*;
