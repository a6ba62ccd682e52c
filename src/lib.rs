// src/lib.rs

//! stockwatch Library
//!
//! Monitors a consignment warehouse's inventory page for shipments and
//! digitizes scanned fax order forms into spreadsheet rows.

pub mod error;
pub mod extract;
pub mod models;
pub mod pipeline;
pub mod services;
pub mod storage;
