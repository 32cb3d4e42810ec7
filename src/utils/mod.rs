//! Utility functions for key generation and input validation.
//!
//! - [`code_generator`] - Random short key generation
//! - [`input_validator`] - Long URL and custom alias validation

pub mod code_generator;
pub mod input_validator;
