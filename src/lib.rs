//! dirview - a terminal directory browser
//!
//! This crate provides:
//! - Recursive directory size aggregation that tolerates unreadable nodes
//! - A filterable tree data source over a filesystem root
//! - An interactive TUI and a one-shot listing mode on top of it

pub mod cli;
pub mod commands;
pub mod config;
pub mod error;
pub mod model;
pub mod tui;

// Re-export commonly used types
pub use config::Config;
pub use error::{BrowserError, Result};
pub use model::{format_size, FsDataSource, TreeDataSource};
