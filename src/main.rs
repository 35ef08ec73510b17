//! Kodegen Bundler Desktop - Release packaging for media-bundled desktop apps.
//!
//! This binary stages resources, optimizes media, assembles the application
//! bundle, audits it for leaked developer state and produces a .dmg or NSIS
//! installer.

use kodegen_bundler_desktop::cli;
use std::process;

#[tokio::main]
async fn main() {
    // Initialize logging
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    // Run CLI and get exit code
    let exit_code = match cli::run().await {
        Ok(code) => code,
        Err(e) => {
            eprintln!("Error: {}", e);
            1
        }
    };

    process::exit(exit_code);
}
