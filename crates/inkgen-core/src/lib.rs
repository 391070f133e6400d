//! Core inkgen library (configuration, SVG document, text pipeline).

pub mod config;
pub mod document;
pub mod effect;
pub mod geometry;
pub mod layout;
pub mod locator;
pub mod prompts;
pub mod render;
pub mod sanitize;
