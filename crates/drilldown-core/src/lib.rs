//! Drilldown Core - Domain models, categorical encoding, ports and configuration
//!
//! This crate holds the types shared by the desurvey engine and the adapters
//! that render its output.

pub mod config;
pub mod error;
pub mod models;
pub mod ports;
pub mod processing;

pub use error::{DrilldownError, Result};
