//! Seed catalog loading from config.toml
//!
//! Operators can override the built-in plan catalog by shipping a
//! `config.toml` next to the binary. The plans defined there are used to
//! seed the database on first run; once the catalog table is non-empty the
//! file is ignored.

use crate::errors::{Error, Result};
use serde::Deserialize;
use std::path::Path;

/// Configuration structure representing the entire config.toml file
#[derive(Debug, Deserialize)]
pub struct Config {
    /// List of plan configurations to seed
    pub products: Vec<ProductConfig>,
}

/// Configuration for a single investment plan
#[derive(Debug, Deserialize, Clone)]
pub struct ProductConfig {
    /// Name of the plan
    pub name: String,
    /// Purchase price
    pub price: f64,
    /// Profit credited per day
    pub daily_income: f64,
    /// Plan length in days
    pub duration: i32,
    /// Total payout over the full duration
    pub total_return: f64,
    /// Expected `total_return - price`
    pub profit: f64,
}

/// Loads the plan catalog from a TOML file.
///
/// # Errors
/// Returns an error if the file cannot be read, the TOML syntax is invalid,
/// or required fields are missing.
pub fn load_config<P: AsRef<Path>>(path: P) -> Result<Config> {
    let contents = std::fs::read_to_string(path.as_ref()).map_err(|e| Error::Config {
        message: format!("Failed to read config file: {e}"),
    })?;

    toml::from_str(&contents).map_err(|e| Error::Config {
        message: format!("Failed to parse config.toml: {e}"),
    })
}

/// Loads the plan catalog from the default location (./config.toml).
pub fn load_default_config() -> Result<Config> {
    load_config("config.toml")
}
