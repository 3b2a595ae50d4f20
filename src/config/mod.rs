//! Harvest configuration
//!
//! One TOML file describes the WebDriver endpoint, the optional consent
//! overlay, the listing to page through, how records are marked up, and the
//! optional download target. Keys are kebab-case; most have defaults.
//!
//! # Example
//!
//! ```no_run
//! use bourse_harvest::config::load_config;
//! use std::path::Path;
//!
//! let config = load_config(Path::new("harvest.toml")).unwrap();
//! println!("Listing starts at: {}", config.listing.url);
//! ```

mod parser;
mod types;
mod validation;

pub use types::{
    Config, ConsentConfig, DownloadConfig, DriverConfig, ExtractorConfig, ListingConfig,
};

pub use parser::{compute_config_hash, load_config, load_config_with_hash};
