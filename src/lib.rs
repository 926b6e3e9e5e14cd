//! Excavator CLI library
//!
//! Exposes the command layer, configuration loader and report writer for
//! integration testing.

pub mod cli;
pub mod config;
pub mod report;

pub use config::{load_config, ConfigError, ExcavatorConfig, LoadedConfig};
pub use report::{write_report, ExcavationReport, LocalSheets, REPORT_FILE_NAME};
