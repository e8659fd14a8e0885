//! Configuration loading
//!
//! Loads [`hrlink_domain::Config`] from environment variables or files.

pub mod loader;

pub use loader::{
    load, load_from_env, load_from_file, load_with_source, probe_config_paths, ConfigSource,
};
