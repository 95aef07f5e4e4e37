//! Command implementations, one module per category.

pub mod config;
