//! Configuration management for `copybench`.
//!
//! Configuration sources and precedence (highest wins):
//! 1. CLI overrides
//! 2. Environment variables (`COPYBENCH_*`)
//! 3. Project config (`<root>/.copybench.yaml`, or `--config <path>`)
//! 4. Defaults

use crate::error::{CopybenchError, Result, find_similar};
use crate::runner::BENCH_PLACEHOLDER;
use std::collections::HashMap;
use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::debug;

/// Project config filename looked up under the root.
pub const CONFIG_FILENAME: &str = ".copybench.yaml";
/// Environment variable prefix.
pub const ENV_PREFIX: &str = "COPYBENCH_";

const DEFAULT_REPORT: &str = "html/index.html";
const DEFAULT_RESULTS: &str = "bench-results.json";
const DEFAULT_PROGRAM: &str = "cargo";
const DEFAULT_TIMEOUT_SECS: u64 = 600;

/// Keys this tool understands.
pub const KNOWN_KEYS: &[&str] = &["root", "report", "results", "program", "args", "timeout"];

/// Default benchmark invocation arguments.
#[must_use]
pub fn default_args() -> Vec<String> {
    [
        "test",
        "--release",
        "--test",
        "copy_bench",
        BENCH_PLACEHOLDER,
        "--",
        "--nocapture",
    ]
    .into_iter()
    .map(str::to_string)
    .collect()
}

/// A configuration layer of normalized key/value pairs.
///
/// A key holds either a scalar or a list, never both; setting one form
/// replaces the other.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ConfigLayer {
    pub values: HashMap<String, String>,
    pub lists: HashMap<String, Vec<String>>,
}

impl ConfigLayer {
    /// Merge another layer on top of this one (higher precedence wins).
    pub fn merge_from(&mut self, other: &Self) {
        for (key, value) in &other.values {
            self.lists.remove(key);
            self.values.insert(key.clone(), value.clone());
        }
        for (key, items) in &other.lists {
            self.values.remove(key);
            self.lists.insert(key.clone(), items.clone());
        }
    }

    /// Merge multiple layers in precedence order (lowest to highest).
    #[must_use]
    pub fn merge_layers(layers: &[Self]) -> Self {
        let mut merged = Self::default();
        for layer in layers {
            merged.merge_from(layer);
        }
        merged
    }

    #[must_use]
    pub fn get(&self, key: &str) -> Option<&str> {
        self.values.get(key).map(String::as_str)
    }

    pub fn set(&mut self, key: &str, value: impl Into<String>) {
        let key = normalize_key(key);
        self.lists.remove(&key);
        self.values.insert(key, value.into());
    }

    pub fn set_list(&mut self, key: &str, items: Vec<String>) {
        let key = normalize_key(key);
        self.values.remove(&key);
        self.lists.insert(key, items);
    }

    /// A list value. Scalars (the environment form) are split on commas.
    #[must_use]
    pub fn get_list(&self, key: &str) -> Option<Vec<String>> {
        self.lists
            .get(key)
            .cloned()
            .or_else(|| self.values.get(key).map(|raw| parse_args(raw)))
    }

    /// Build a layer from a YAML file path. Missing files return empty config.
    ///
    /// # Errors
    ///
    /// Returns an error if the file exists but cannot be read or parsed, or
    /// names a key this tool does not know.
    pub fn from_yaml(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }

        let contents = fs::read_to_string(path)?;
        let value: serde_yaml::Value = serde_yaml::from_str(&contents)?;
        let layer = layer_from_yaml_value(&value);
        layer.check_keys()?;
        debug!(
            path = %path.display(),
            keys = layer.values.len() + layer.lists.len(),
            "Loaded config file"
        );
        Ok(layer)
    }

    /// Build a layer from `COPYBENCH_*` environment variables.
    #[must_use]
    pub fn from_env() -> Self {
        Self::from_vars(env::vars())
    }

    /// Build a layer from an explicit variable list. Unknown names are ignored.
    #[must_use]
    pub fn from_vars(vars: impl IntoIterator<Item = (String, String)>) -> Self {
        let mut layer = Self::default();
        for (key, value) in vars {
            let Some(stripped) = key.strip_prefix(ENV_PREFIX) else {
                continue;
            };
            let normalized = normalize_key(stripped);
            if KNOWN_KEYS.contains(&normalized.as_str()) {
                layer.values.insert(normalized, value);
            }
        }
        layer
    }

    fn check_keys(&self) -> Result<()> {
        let mut keys: Vec<&String> = self.values.keys().chain(self.lists.keys()).collect();
        keys.sort();
        for key in keys {
            if !KNOWN_KEYS.contains(&key.as_str()) {
                return Err(CopybenchError::UnknownConfigKey {
                    key: key.clone(),
                    similar: find_similar(key, KNOWN_KEYS, 2),
                });
            }
        }
        Ok(())
    }
}

/// CLI overrides for config loading.
#[derive(Debug, Clone, Default)]
pub struct CliOverrides {
    pub root: Option<PathBuf>,
    pub report: Option<PathBuf>,
    pub results: Option<PathBuf>,
    pub program: Option<String>,
    pub timeout: Option<u64>,
    pub config: Option<PathBuf>,
}

impl CliOverrides {
    #[must_use]
    pub fn as_layer(&self) -> ConfigLayer {
        let mut layer = ConfigLayer::default();

        if let Some(path) = &self.root {
            layer.set("root", path.to_string_lossy());
        }
        if let Some(path) = &self.report {
            layer.set("report", path.to_string_lossy());
        }
        if let Some(path) = &self.results {
            layer.set("results", path.to_string_lossy());
        }
        if let Some(program) = &self.program {
            layer.set("program", program.clone());
        }
        if let Some(timeout) = self.timeout {
            layer.set("timeout", timeout.to_string());
        }

        layer
    }
}

/// Fully resolved settings for one invocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    pub root: PathBuf,
    pub report: PathBuf,
    pub results: PathBuf,
    pub program: String,
    pub args: Vec<String>,
    pub timeout: Duration,
}

impl Settings {
    /// Resolve settings from defaults, the project file, the environment and
    /// CLI overrides.
    ///
    /// # Errors
    ///
    /// Returns an error if the config file is malformed, an explicit
    /// `--config` path does not exist, or a value does not parse.
    pub fn load(cli: &CliOverrides) -> Result<Self> {
        Self::load_with_env(cli, &ConfigLayer::from_env())
    }

    /// Same as [`Settings::load`] with an explicit environment layer.
    ///
    /// # Errors
    ///
    /// See [`Settings::load`].
    pub fn load_with_env(cli: &CliOverrides, env_layer: &ConfigLayer) -> Result<Self> {
        let cli_layer = cli.as_layer();

        // The root decides where the project file lives, so it is resolved
        // from the layers that do not depend on it.
        let root_hint = ConfigLayer::merge_layers(&[env_layer.clone(), cli_layer.clone()]);
        let root = root_hint.get("root").map_or_else(|| PathBuf::from("."), PathBuf::from);

        let file_layer = match &cli.config {
            Some(path) => {
                if !path.exists() {
                    return Err(CopybenchError::config(format!(
                        "config file not found: {}",
                        path.display()
                    )));
                }
                ConfigLayer::from_yaml(path)?
            }
            None => ConfigLayer::from_yaml(&root.join(CONFIG_FILENAME))?,
        };

        let merged = ConfigLayer::merge_layers(&[
            default_config_layer(),
            file_layer,
            env_layer.clone(),
            cli_layer,
        ]);
        Self::from_layer(&merged)
    }

    /// Build settings from a merged layer.
    ///
    /// # Errors
    ///
    /// Returns an error if `timeout` or `args` is invalid.
    pub fn from_layer(layer: &ConfigLayer) -> Result<Self> {
        let root = PathBuf::from(layer.get("root").unwrap_or("."));
        let report = resolve_path(&root, layer.get("report").unwrap_or(DEFAULT_REPORT));
        let results = resolve_path(&root, layer.get("results").unwrap_or(DEFAULT_RESULTS));
        let program = layer
            .get("program")
            .map(str::trim)
            .filter(|p| !p.is_empty())
            .unwrap_or(DEFAULT_PROGRAM)
            .to_string();

        let args = layer.get_list("args").unwrap_or_else(default_args);
        if args.is_empty() {
            return Err(CopybenchError::config("args must not be empty"));
        }

        let timeout = match layer.get("timeout") {
            Some(raw) => parse_timeout(raw)?,
            None => Duration::from_secs(DEFAULT_TIMEOUT_SECS),
        };

        Ok(Self {
            root,
            report,
            results,
            program,
            args,
            timeout,
        })
    }
}

/// Defaults as a layer so they merge like any other source.
#[must_use]
pub fn default_config_layer() -> ConfigLayer {
    let mut layer = ConfigLayer::default();
    layer.set("report", DEFAULT_REPORT);
    layer.set("results", DEFAULT_RESULTS);
    layer.set("program", DEFAULT_PROGRAM);
    layer.set_list("args", default_args());
    layer.set("timeout", DEFAULT_TIMEOUT_SECS.to_string());
    layer
}

fn resolve_path(root: &Path, value: &str) -> PathBuf {
    let path = PathBuf::from(value.trim());
    if path.is_absolute() {
        path
    } else {
        root.join(path)
    }
}

fn parse_args(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|arg| !arg.is_empty())
        .map(str::to_string)
        .collect()
}

fn parse_timeout(raw: &str) -> Result<Duration> {
    match raw.trim().parse::<u64>() {
        Ok(secs) if secs > 0 => Ok(Duration::from_secs(secs)),
        _ => Err(CopybenchError::config(format!(
            "timeout must be a positive number of seconds, got '{raw}'"
        ))),
    }
}

fn normalize_key(key: &str) -> String {
    key.trim().to_lowercase().replace('-', "_")
}

fn layer_from_yaml_value(value: &serde_yaml::Value) -> ConfigLayer {
    let mut layer = ConfigLayer::default();
    flatten_yaml(value, "", &mut layer);
    layer
}

fn flatten_yaml(value: &serde_yaml::Value, prefix: &str, out: &mut ConfigLayer) {
    match value {
        serde_yaml::Value::Mapping(map) => {
            for (key, value) in map {
                let Some(key_str) = key.as_str() else {
                    continue;
                };
                let next_prefix = if prefix.is_empty() {
                    key_str.to_string()
                } else {
                    format!("{prefix}.{key_str}")
                };
                flatten_yaml(value, &next_prefix, out);
            }
        }
        serde_yaml::Value::Sequence(values) => {
            let items = values.iter().filter_map(yaml_scalar_to_string).collect();
            out.set_list(prefix, items);
        }
        _ => {
            if let Some(value) = yaml_scalar_to_string(value) {
                out.set(prefix, value);
            }
        }
    }
}

fn yaml_scalar_to_string(value: &serde_yaml::Value) -> Option<String> {
    match value {
        serde_yaml::Value::Bool(v) => Some(v.to_string()),
        serde_yaml::Value::Number(n) => Some(n.to_string()),
        serde_yaml::Value::String(s) => Some(s.clone()),
        serde_yaml::Value::Null
        | serde_yaml::Value::Sequence(_)
        | serde_yaml::Value::Mapping(_) => None,
        serde_yaml::Value::Tagged(tagged) => yaml_scalar_to_string(&tagged.value),
    }
}
