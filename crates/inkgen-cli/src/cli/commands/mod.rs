//! CLI command handlers.

pub mod apply;
pub mod config;
pub mod models;
