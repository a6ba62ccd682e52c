//! Durable storage for inventory snapshots.

mod snapshot;

pub use snapshot::SnapshotStore;
