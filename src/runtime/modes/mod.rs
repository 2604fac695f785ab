//! Mode routing
//!
//! `serve` starts the HTTP server, `generate-config` prints a sample file.

pub mod server;

use anyhow::{Context, Result};

use crate::config::AppConfig;

pub use server::run_server;

/// Writes the sample configuration to `output_path`, or stdout when `None`.
pub fn generate_config(output_path: Option<&str>) -> Result<()> {
    let sample = AppConfig::generate_sample_config();
    match output_path {
        Some(path) => {
            std::fs::write(path, sample).with_context(|| format!("Failed to write {}", path))?;
            eprintln!("[INFO] Sample configuration written to: {}", path);
        }
        None => println!("{}", sample),
    }
    Ok(())
}
