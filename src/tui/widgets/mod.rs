//! Reusable TUI widgets.

pub mod tree;
