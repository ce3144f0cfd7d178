//! Authentication primitives.
//!
//! Tokens are issued by the account service; this crate only validates
//! them.

pub mod jwt;
