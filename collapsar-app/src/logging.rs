//! Logging setup for the application.

use env_logger::{Builder, Env};

/// Initializes the logger, honoring `RUST_LOG` with an `info` default.
pub fn init_logger() {
    let env = Env::default().filter_or("RUST_LOG", "info");
    Builder::from_env(env).init();
}
