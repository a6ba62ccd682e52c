//! Core monitoring pipeline.
//!
//! - `diff`: pure change detection between two listings
//! - `expiry`: pure expiry horizon scan
//! - `cycle`: the fetch → compare → persist → notify controller

pub mod cycle;
pub mod diff;
pub mod expiry;

pub use cycle::{CycleOptions, CycleReport, Monitor};
pub use diff::diff_listings;
pub use expiry::{ExpiringItem, expiring_within};
