//! Data Transfer Objects for API requests and responses.
//!
//! JSON field names are camelCase to match the public contract.

pub mod bulk;
pub mod health;
pub mod pagination;
pub mod shorten;
