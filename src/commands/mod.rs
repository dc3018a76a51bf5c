//! Non-interactive command implementations

pub mod list;
