// src/models/mod.rs

//! Domain models for the monitoring and order-processing tools.
//!
//! This module contains all data structures used throughout the application,
//! organized by their primary purpose.

mod changes;
mod config;
mod inventory;
mod order;

// Re-export all public types
pub use changes::{ChangeKind, ChangeSet, NewProduct, QuantityChange, RemovedProduct};
pub use config::{
    Config, HttpConfig, LoginForm, MonitorConfig, OrdersConfig, ScrapeSelectors, SheetsConfig,
    SmtpConfig, WarehouseConfig,
};
pub use inventory::{InventoryItem, index_by_product, to_sheet_rows};
pub use order::{OrderItem, OrderRecord};
