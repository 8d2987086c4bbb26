//! HTTP request handlers for the weather API.

pub mod collect;
pub mod common;
pub mod health;
pub mod query;
