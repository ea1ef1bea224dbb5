//! Service Configuration Module
//!
//! Server address, data file locations and request defaults, loaded from
//! TOML.
//!
//! ## Loading Order
//!
//! 1. `--config <path>` on the command line
//! 2. `AGRIFUSION_CONFIG` environment variable (path to TOML file)
//! 3. `agrifusion.toml` in the current working directory
//! 4. Built-in defaults
//!
//! The loaded [`ServiceConfig`] is passed explicitly to whatever needs it;
//! there is no global instance.

mod service_config;
pub mod defaults;
pub mod validation;

pub use service_config::*;
