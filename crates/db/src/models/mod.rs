//! Database row structs.
//!
//! Rows mirror the table layout one-to-one and are converted into the
//! domain types from `lotmap_core` before leaving this crate.

pub mod lot;
pub mod map_settings;
