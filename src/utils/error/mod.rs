//! Error handling
//!
//! One error enum for the whole crate. Quota exhaustion is deliberately absent:
//! it is an ordinary outcome and travels as a value, not as an error.

mod helpers;
mod response;
mod types;


pub use types::{Result, ServiceError};
