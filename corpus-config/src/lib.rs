//! Loader for pipeline configuration with YAML + environment overlays.
//!
//! Precedence, lowest to highest: built-in defaults, YAML files/snippets in the order they
//! were attached, then `CORPUS_`-prefixed environment variables (`__` separates nested keys,
//! e.g. `CORPUS_SOURCE__BASE_URL`). String values may reference `${VAR}` placeholders which
//! are expanded after merging.
//!
//! ```yaml
//! data_dir: data
//! request_timeout_secs: 30
//! max_retries: 3
//! user_agent: MedicalDataCollector/1.0
//! link_delay_ms: 1000
//! content_delay_ms: 2000
//! source:
//!   name: altibbi.com
//!   base_url: https://altibbi.com
//! files:
//!   links: nlp-links.txt
//!   corpus: corpus.csv
//!   cleaned: corpus_clean.csv
//! log:
//!   format: text
//!   stderr: true
//! ```
use config::{Config, ConfigError, Environment, File};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::path::{Path, PathBuf};
use std::time::Duration;

const MAXIMUM_ENV_EXPANSION_DEPTH: usize = 8;
const ENV_PREFIX: &str = "CORPUS";

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CorpusConfig {
    /// Root of the data directory (`raw/` and `processed/` live under it).
    pub data_dir: PathBuf,
    /// Per-request timeout handed to the HTTP client.
    pub request_timeout_secs: u64,
    /// Retry budget for transient fetch failures (network, 429, 5xx).
    pub max_retries: usize,
    pub user_agent: String,
    /// Fixed pause between listing pages.
    pub link_delay_ms: u64,
    /// Fixed pause between detail pages.
    pub content_delay_ms: u64,
    pub source: SourceConfig,
    pub files: FileNames,
    pub log: LogSettings,
}

impl Default for CorpusConfig {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from("data"),
            request_timeout_secs: 30,
            max_retries: 3,
            user_agent: "MedicalDataCollector/1.0".into(),
            link_delay_ms: 1000,
            content_delay_ms: 2000,
            source: SourceConfig::default(),
            files: FileNames::default(),
            log: LogSettings::default(),
        }
    }
}

impl CorpusConfig {
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    pub fn link_delay(&self) -> Duration {
        Duration::from_millis(self.link_delay_ms)
    }

    pub fn content_delay(&self) -> Duration {
        Duration::from_millis(self.content_delay_ms)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.request_timeout_secs == 0 {
            return Err(ConfigError::Message(
                "request_timeout_secs must be greater than zero".into(),
            ));
        }
        if self.source.base_url.trim().is_empty() {
            return Err(ConfigError::Message("source.base_url must not be empty".into()));
        }
        for (key, name) in [
            ("files.links", &self.files.links),
            ("files.corpus", &self.files.corpus),
            ("files.cleaned", &self.files.cleaned),
        ] {
            if name.trim().is_empty() {
                return Err(ConfigError::Message(format!("{key} must not be empty")));
            }
        }
        Ok(())
    }
}

/// The site the pipeline is bound to.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SourceConfig {
    /// Label written into the `source` column of the link ledger.
    pub name: String,
    pub base_url: String,
}

impl Default for SourceConfig {
    fn default() -> Self {
        Self {
            name: "altibbi.com".into(),
            base_url: "https://altibbi.com".into(),
        }
    }
}

/// Default storage identifiers, resolved against the data directory.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct FileNames {
    pub links: String,
    pub corpus: String,
    pub cleaned: String,
}

impl Default for FileNames {
    fn default() -> Self {
        Self {
            links: "nlp-links.txt".into(),
            corpus: "corpus.csv".into(),
            cleaned: "corpus_clean.csv".into(),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogEncoding {
    #[default]
    Text,
    Json,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LogSettings {
    pub format: LogEncoding,
    /// Mirror log events to stderr as well as the log file.
    pub stderr: bool,
}

impl Default for LogSettings {
    fn default() -> Self {
        Self {
            format: LogEncoding::Text,
            stderr: true,
        }
    }
}

fn expand_env_in_value(v: &mut Value) {
    match v {
        Value::String(s) => {
            if s.contains('$') {
                let mut cur = std::mem::take(s);
                for _ in 0..MAXIMUM_ENV_EXPANSION_DEPTH {
                    let expanded = match shellexpand::env(&cur) {
                        Ok(cow) => cow.into_owned(),
                        Err(_) => cur.clone(),
                    };
                    if expanded == cur {
                        break;
                    }
                    cur = expanded;
                }
                *s = cur;
            }
        }
        Value::Array(arr) => arr.iter_mut().for_each(expand_env_in_value),
        Value::Object(obj) => obj.values_mut().for_each(expand_env_in_value),
        _ => {}
    }
}

/// Builder hides the `config` crate wiring (YAML + env overrides).
pub struct CorpusConfigLoader {
    builder: config::ConfigBuilder<config::builder::DefaultState>,
}

impl Default for CorpusConfigLoader {
    fn default() -> Self {
        Self::new()
    }
}

impl CorpusConfigLoader {
    /// Start from built-in defaults; `CORPUS_` env overrides are applied at [`load`](Self::load).
    ///
    /// ```
    /// use corpus_config::CorpusConfigLoader;
    ///
    /// let cfg = CorpusConfigLoader::new()
    ///     .with_yaml_str("max_retries: 5")
    ///     .load()
    ///     .expect("valid config");
    ///
    /// assert_eq!(cfg.max_retries, 5);
    /// assert_eq!(cfg.request_timeout_secs, 30);
    /// assert_eq!(cfg.files.corpus, "corpus.csv");
    /// ```
    pub fn new() -> Self {
        Self {
            builder: Config::builder(),
        }
    }

    /// Attach a YAML/TOML/JSON file that must exist; the format is inferred by suffix.
    pub fn with_file<P: AsRef<Path>>(mut self, path: P) -> Self {
        self.builder = self
            .builder
            .add_source(File::from(path.as_ref()).required(true));
        self
    }

    /// Attach a file that is silently skipped when absent, so a run can rely on
    /// defaults and environment variables alone.
    pub fn with_optional_file<P: AsRef<Path>>(mut self, path: P) -> Self {
        self.builder = self
            .builder
            .add_source(File::from(path.as_ref()).required(false));
        self
    }

    /// Allow tests/CLI to merge inline YAML snippets.
    ///
    /// ```
    /// use corpus_config::CorpusConfigLoader;
    ///
    /// let cfg = CorpusConfigLoader::new()
    ///     .with_yaml_str(
    ///         r#"
    /// source:
    ///   base_url: "http://127.0.0.1:8080"
    /// files:
    ///   links: "links.txt"
    /// "#,
    ///     )
    ///     .load()
    ///     .unwrap();
    ///
    /// assert_eq!(cfg.source.base_url, "http://127.0.0.1:8080");
    /// assert_eq!(cfg.source.name, "altibbi.com");
    /// assert_eq!(cfg.files.links, "links.txt");
    /// ```
    pub fn with_yaml_str(mut self, yaml: &str) -> Self {
        self.builder = self
            .builder
            .add_source(File::from_str(yaml, config::FileFormat::Yaml));
        self
    }

    /// Consume the builder and deserialize the merged sources into strongly typed config.
    ///
    /// Environment variables are layered last so they win over files, then `${VAR}`
    /// placeholders are expanded and the result is validated.
    pub fn load(self) -> Result<CorpusConfig, ConfigError> {
        let cfg = self
            .builder
            .add_source(
                Environment::with_prefix(ENV_PREFIX)
                    .prefix_separator("_")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        let mut v: Value = cfg.try_deserialize()?;
        expand_env_in_value(&mut v);

        let typed: CorpusConfig =
            serde_json::from_value(v).map_err(|e| ConfigError::Message(e.to_string()))?;
        typed.validate()?;

        Ok(typed)
    }
}
