//! Unity Sweeper - Find Unity projects and archive or delete them in bulk
//!
//! This crate provides functionality for:
//! - Scanning a directory tree for Unity projects in small, resumable steps
//! - Assigning each project a disposition (leave, archive, delete)
//! - Running the chosen archive/delete jobs concurrently with a cap
//! - An interactive TUI driving all of the above

pub mod batch;
pub mod cli;
pub mod commands;
pub mod config;
pub mod error;
pub mod project;
pub mod scanner;
pub mod tui;

// Re-export commonly used types
pub use config::Config;
pub use error::{Result, SweeperError};
