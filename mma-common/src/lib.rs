//! # Music Money Analytics Common Library
//!
//! Shared analytics core for the MMA tools:
//! - CSV ingestion and table classification
//! - Content filtering and artist attribution
//! - Working-table selection
//! - Financial metrics (revenue, wealth gap, ghost income, growth, deals)
//! - Assumption and configuration loading

pub mod assumptions;
pub mod config;
pub mod error;
pub mod filter;
pub mod merger;
pub mod metrics;
pub mod models;
pub mod pipeline;
pub mod resolver;
pub mod schema;
pub mod table;
pub mod time;

pub use assumptions::Assumptions;
pub use error::{Error, Result};
