//! System utilities
//!
//! Host introspection used to pick runtime defaults.

pub mod resources;
