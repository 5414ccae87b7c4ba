//! Adapters for the collaborators the collection loops sample from.

pub mod database;
pub mod system;
pub mod traits;
pub mod websocket;

pub use database::PgPoolStatsProvider;
pub use system::SysinfoResourceSampler;
pub use traits::{
    ConnectionRegistry, ConnectionStats, DatabaseStatsProvider, PoolStats, ResourceSample, ResourceSampler,
};
pub use websocket::BroadcastConnectionRegistry;
