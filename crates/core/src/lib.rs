pub mod drawing;
pub mod editor;
pub mod error;
pub mod filter;
pub mod geometry;
pub mod lot;
pub mod lot_map;
pub mod map_settings;
pub mod render;
pub mod slug;
pub mod store;
pub mod types;
pub mod view;
