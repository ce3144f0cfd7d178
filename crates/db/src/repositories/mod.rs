//! Repository layer.
//!
//! Each repository is a zero-sized struct providing async CRUD methods
//! that accept `&PgPool` as the first argument.

pub mod lot_repo;
pub mod map_settings_repo;

pub use lot_repo::LotRepo;
pub use map_settings_repo::MapSettingsRepo;
