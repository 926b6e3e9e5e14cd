use std::path::Path;

use crate::config::{ExcavatorConfig, LoadedConfig};

use super::output::OutputFormat;

pub struct CliContext {
    loaded: LoadedConfig,
    output: OutputFormat,
}

impl CliContext {
    pub fn new(loaded: LoadedConfig, output: OutputFormat) -> Self {
        Self { loaded, output }
    }

    pub fn config(&self) -> &ExcavatorConfig {
        &self.loaded.config
    }

    pub fn config_path(&self) -> &Path {
        &self.loaded.path
    }

    pub fn config_from_file(&self) -> bool {
        self.loaded.from_file
    }

    pub fn overrides(&self) -> &[String] {
        &self.loaded.overrides
    }

    pub fn output(&self) -> OutputFormat {
        self.output
    }
}
