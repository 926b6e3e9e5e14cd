//! Layered CLI configuration.
//!
//! Defaults, then one YAML or JSON file, then `EXCAVATOR__SECTION__KEY=value`
//! environment overlays. Overlay keys are matched against the serialized
//! field names ignoring case, `_` and `-`, so `EXCAVATOR__EXCAVATE__MAX_DEPTH`
//! reaches `excavate.maxDepth`.

use std::env;
use std::path::{Path, PathBuf};

use content_id::{Codec, HashAlgorithm};
use dom_inspector::InspectOptions;
use excavator_engine::ExcavateOptions;
use live_reactor::LiveOptions;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use thiserror::Error;
use tracing::{debug, info, warn};

pub const ENV_PREFIX: &str = "EXCAVATOR__";
pub const LOCAL_CONFIG: &str = "config/excavator.yaml";
pub const DEFAULT_OUTPUT_DIR: &str = "excavations";
pub const DEFAULT_GATEWAY: &str = "ipfs.io";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse config file {path}: {message}")]
    Parse { path: PathBuf, message: String },
    #[error("invalid override {key}: {message}")]
    Override { key: String, message: String },
    #[error("invalid configuration: {0}")]
    Invalid(String),
}

pub type ConfigResult<T> = Result<T, ConfigError>;

/// Defaults for the `cid` command.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct HashSettings {
    pub algorithm: HashAlgorithm,
    pub codec: Codec,
    pub gateway: String,
}

impl Default for HashSettings {
    fn default() -> Self {
        Self {
            algorithm: HashAlgorithm::default(),
            codec: Codec::default(),
            gateway: DEFAULT_GATEWAY.to_string(),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ExcavatorConfig {
    pub excavate: ExcavateOptions,
    pub dom: InspectOptions,
    pub live: LiveOptions,
    pub hash: HashSettings,
    pub output_dir: PathBuf,
}

impl Default for ExcavatorConfig {
    fn default() -> Self {
        Self {
            excavate: ExcavateOptions::default(),
            dom: InspectOptions::default(),
            live: LiveOptions::default(),
            hash: HashSettings::default(),
            output_dir: PathBuf::from(DEFAULT_OUTPUT_DIR),
        }
    }
}

/// Effective configuration plus the file it was looked up at.
#[derive(Clone, Debug)]
pub struct LoadedConfig {
    pub config: ExcavatorConfig,
    pub path: PathBuf,
    pub from_file: bool,
    pub overrides: Vec<String>,
}

/// `--config`, else `config/excavator.yaml`, else `<config_dir>/excavator/config.yaml`.
pub fn resolve_path(explicit: Option<&Path>) -> PathBuf {
    if let Some(path) = explicit {
        return path.to_path_buf();
    }
    let local = PathBuf::from(LOCAL_CONFIG);
    if local.exists() {
        return local;
    }
    match dirs::config_dir() {
        Some(mut path) => {
            path.push("excavator");
            path.push("config.yaml");
            path
        }
        None => local,
    }
}

pub async fn load_config(explicit: Option<&Path>) -> ConfigResult<LoadedConfig> {
    let path = resolve_path(explicit);
    let (document, from_file) = if path.exists() {
        let content = tokio::fs::read_to_string(&path)
            .await
            .map_err(|source| ConfigError::Io {
                path: path.clone(),
                source,
            })?;
        info!("Loaded configuration from: {}", path.display());
        (parse_document(&path, &content)?, true)
    } else {
        if explicit.is_some() {
            return Err(ConfigError::Io {
                path: path.clone(),
                source: std::io::Error::new(std::io::ErrorKind::NotFound, "file not found"),
            });
        }
        warn!("Config file not found, using defaults: {}", path.display());
        (Value::Object(Map::new()), false)
    };

    let overlays = overlays_from_env(env::vars());
    let overrides = overlays.iter().map(|o| o.key.clone()).collect();
    let config = build_config(document, overlays)?;
    Ok(LoadedConfig {
        config,
        path,
        from_file,
        overrides,
    })
}

/// JSON for `.json` files, YAML for everything else.
pub fn parse_document(path: &Path, content: &str) -> ConfigResult<Value> {
    let parse_error = |message: String| ConfigError::Parse {
        path: path.to_path_buf(),
        message,
    };
    if content.trim().is_empty() {
        return Ok(Value::Object(Map::new()));
    }
    let is_json = path
        .extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| ext.eq_ignore_ascii_case("json"));
    if is_json {
        return serde_json::from_str(content).map_err(|err| parse_error(err.to_string()));
    }
    let yaml: serde_yaml::Value =
        serde_yaml::from_str(content).map_err(|err| parse_error(err.to_string()))?;
    serde_json::to_value(yaml).map_err(|err| parse_error(err.to_string()))
}

#[derive(Clone, Debug, PartialEq)]
pub struct EnvOverlay {
    pub key: String,
    pub path: Vec<String>,
    pub value: Value,
}

pub fn overlays_from_env(vars: impl IntoIterator<Item = (String, String)>) -> Vec<EnvOverlay> {
    let mut overlays: Vec<EnvOverlay> = vars
        .into_iter()
        .filter_map(|(key, raw)| {
            let stripped = key.strip_prefix(ENV_PREFIX)?;
            let path: Vec<String> = stripped
                .split("__")
                .filter(|segment| !segment.is_empty())
                .map(|segment| segment.to_ascii_lowercase())
                .collect();
            if path.is_empty() {
                return None;
            }
            let value = parse_env_value(&raw);
            Some(EnvOverlay { key, path, value })
        })
        .collect();
    overlays.sort_by(|a, b| a.key.cmp(&b.key));
    overlays
}

/// JSON first, then bool, integer, float, else the raw string.
pub fn parse_env_value(raw: &str) -> Value {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Value::Null;
    }
    if let Ok(parsed) = serde_json::from_str::<Value>(trimmed) {
        return parsed;
    }
    if let Ok(flag) = trimmed.parse::<bool>() {
        return Value::Bool(flag);
    }
    if let Ok(int) = trimmed.parse::<i64>() {
        return Value::from(int);
    }
    if let Some(float) = trimmed
        .parse::<f64>()
        .ok()
        .and_then(serde_json::Number::from_f64)
    {
        return Value::Number(float);
    }
    Value::String(raw.to_string())
}

/// Merges `document` over the defaults, applies overlays and deserializes.
pub fn build_config(document: Value, overlays: Vec<EnvOverlay>) -> ConfigResult<ExcavatorConfig> {
    let mut merged = serde_json::to_value(ExcavatorConfig::default())
        .map_err(|err| ConfigError::Invalid(err.to_string()))?;
    merge(&mut merged, document);

    for overlay in overlays {
        debug!(key = %overlay.key, "applying environment override");
        apply_overlay(&mut merged, &overlay.path, overlay.value).map_err(|message| {
            ConfigError::Override {
                key: overlay.key.clone(),
                message,
            }
        })?;
    }

    serde_json::from_value(merged).map_err(|err| ConfigError::Invalid(err.to_string()))
}

fn merge(base: &mut Value, incoming: Value) {
    match (base, incoming) {
        (Value::Object(base), Value::Object(incoming)) => {
            for (key, value) in incoming {
                let slot = matching_key(base, &key).unwrap_or(key);
                match base.get_mut(&slot) {
                    Some(existing) => merge(existing, value),
                    None => {
                        base.insert(slot, value);
                    }
                }
            }
        }
        (base, incoming) => *base = incoming,
    }
}

fn apply_overlay(root: &mut Value, path: &[String], value: Value) -> Result<(), String> {
    let Some((last, parents)) = path.split_last() else {
        return Err("empty key path".into());
    };
    let mut cursor = root;
    for segment in parents {
        let Value::Object(map) = cursor else {
            return Err(format!("`{segment}` is not inside a section"));
        };
        let key = matching_key(map, segment).unwrap_or_else(|| camel_case(segment));
        cursor = map
            .entry(key)
            .or_insert_with(|| Value::Object(Map::new()));
    }
    let Value::Object(map) = cursor else {
        return Err(format!("`{last}` is not inside a section"));
    };
    let key = matching_key(map, last).unwrap_or_else(|| camel_case(last));
    map.insert(key, value);
    Ok(())
}

fn matching_key(map: &Map<String, Value>, wanted: &str) -> Option<String> {
    let wanted = normalize(wanted);
    map.keys().find(|key| normalize(key) == wanted).cloned()
}

fn normalize(key: &str) -> String {
    key.chars()
        .filter(|c| *c != '_' && *c != '-')
        .map(|c| c.to_ascii_lowercase())
        .collect()
}

fn camel_case(segment: &str) -> String {
    let mut out = String::with_capacity(segment.len());
    let mut upper = false;
    for c in segment.chars() {
        if c == '_' {
            upper = true;
        } else if upper {
            out.push(c.to_ascii_uppercase());
            upper = false;
        } else {
            out.push(c);
        }
    }
    out
}
