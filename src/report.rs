use std::fs;
use std::path::{Component, Path, PathBuf};

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use dom_inspector::SheetSource;
use excavator_core_types::RunId;
use excavator_engine::ExcavationResult;
use serde::Serialize;
use tracing::{debug, info};

pub const REPORT_FILE_NAME: &str = "excavation-report.json";

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ExcavationReport {
    pub run_id: RunId,
    pub generated_at: DateTime<Utc>,
    pub result: ExcavationResult,
}

impl ExcavationReport {
    pub fn new(result: ExcavationResult) -> Self {
        Self {
            run_id: RunId::new(),
            generated_at: Utc::now(),
            result,
        }
    }
}

/// Writes `excavation-report.json` under `dir`, creating the directory.
pub fn write_report(dir: &Path, report: &ExcavationReport) -> Result<PathBuf> {
    fs::create_dir_all(dir)
        .with_context(|| format!("Failed to create output directory {}", dir.display()))?;
    let path = dir.join(REPORT_FILE_NAME);
    let body = serde_json::to_vec_pretty(report).context("Failed to serialize report")?;
    fs::write(&path, body).with_context(|| format!("Failed to write {}", path.display()))?;
    info!(run_id = %report.run_id, path = %path.display(), "excavation report written");
    Ok(path)
}

/// Resolves relative `<link>` hrefs against the directory of the HTML file.
/// Remote, absolute and parent-escaping hrefs stay restricted.
#[derive(Clone, Debug)]
pub struct LocalSheets {
    base: PathBuf,
}

impl LocalSheets {
    pub fn new(base: impl Into<PathBuf>) -> Self {
        Self { base: base.into() }
    }

    pub fn for_document(html_path: &Path) -> Self {
        let base = html_path
            .parent()
            .map(Path::to_path_buf)
            .unwrap_or_default();
        Self::new(base)
    }

    fn resolve(&self, href: &str) -> Option<PathBuf> {
        if href.contains("://") || href.starts_with("//") || href.starts_with("data:") {
            return None;
        }
        let relative = Path::new(href.split(&['?', '#'][..]).next().unwrap_or(href));
        let contained = relative
            .components()
            .all(|component| matches!(component, Component::Normal(_) | Component::CurDir));
        contained.then(|| self.base.join(relative))
    }
}

impl SheetSource for LocalSheets {
    fn fetch(&self, href: &str) -> Option<String> {
        let path = self.resolve(href)?;
        match fs::read_to_string(&path) {
            Ok(text) => Some(text),
            Err(err) => {
                debug!(href, path = %path.display(), %err, "stylesheet unavailable");
                None
            }
        }
    }
}
