//! Configuration file loading for xplain
//!
//! This module handles file I/O and merging of configuration from multiple sources.
//! The priority order (highest to lowest):
//!
//! 1. `XPLAIN_` environment variables
//! 2. `--config <path>` specified file
//! 3. Project root: `./xplain.toml` or `./.xplain.toml`
//! 4. XDG config: `$XDG_CONFIG_HOME/xplain/config.toml`
//! 5. Default values

mod file_config;
mod loader;

pub use file_config::{
    ConfigValidationError, FileConfig, FileDispatchConfig, FileOutputConfig, FileOutputFormat,
    FileSessionConfig,
};
pub use loader::ConfigLoader;
