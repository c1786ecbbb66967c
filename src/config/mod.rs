//! Dashboard Configuration Module
//!
//! Provides dashboard configuration loaded from TOML files.
//!
//! ## Loading Order
//!
//! 1. `--config <path>` on the command line
//! 2. `SMART_FACTORY_CONFIG` environment variable (path to TOML file)
//! 3. `smart_factory.toml` in the current working directory
//! 4. Built-in defaults (see `defaults`)
//!
//! ## Example
//!
//! ```toml
//! [data]
//! csv_path = "smart_manufacturing_data.csv"
//!
//! [report]
//! output_dir = "./reports"
//! language = "Korean"
//!
//! [llm]
//! model = "gpt-4o"
//!
//! [gauge]
//! critical_threshold = 100.0
//! max_value = 500.0
//! ```

mod dashboard_config;
pub mod defaults;
pub mod validation;

pub use dashboard_config::*;
