//! Collapsar application library.
//!
//! Contains configuration, logging, image I/O, and the per-sample execution
//! logic for the collapsar command-line generator.

pub mod config;
pub mod error;
pub mod execute;
pub mod image_io;
pub mod logging;

// Include main.rs as a module
pub mod main;

pub use config::AppConfig;
pub use error::AppError;

// Re-export the main function so it can be called from the root crate
pub use crate::main::main;
