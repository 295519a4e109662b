//! Market-data provider implementations.

mod cached;
pub mod snapshot;

pub use cached::CachedProvider;
pub use snapshot::{MarketSnapshot, SnapshotProvider};
