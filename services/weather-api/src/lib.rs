//! Weather API Service Library
//!
//! HTTP surface of the airport weather store: `/query` for consumers,
//! `/collect` for ingestion and catalog maintenance, and the usual probes.

pub mod config;
pub mod handlers;
pub mod router;
pub mod state;
