//! Configuration module
//!
//! Loads, validates, and hashes the TOML configuration that drives an
//! audit run.

mod parser;
mod types;
mod validation;

pub use parser::{compute_config_hash, load_config, load_config_with_hash};
pub use types::{
    ClassifierConfig, Config, CrawlerConfig, OutputConfig, PageBudget, SiteConfig, UserAgentConfig,
};
pub use validation::validate;
