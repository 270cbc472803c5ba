//! Serde representation of store snapshots and view results, plus file
//! loading. Field names are camelCase so seed files stay compatible with the
//! JSON the web client exchanges.

pub mod dto;
pub mod loader;
pub mod mapper;

pub use loader::{load_snapshot, parse_snapshot, render_snapshot, save_snapshot, SnapshotFormat};
