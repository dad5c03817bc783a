use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Default embedding model (the corpus is English; MiniLM is small and
/// good enough for a few thousand records)
const DEFAULT_MODEL: &str = "all-MiniLM-L6-v2";
/// Default similarity floor for retrieval
const DEFAULT_THRESHOLD: f32 = 0.25;
/// Default number of recommendations per chat turn
const DEFAULT_LIMIT: usize = 3;
/// Default HTTP bind address
const DEFAULT_BIND: &str = "0.0.0.0:5000";

/// Configuration for the embedding model and vector retrieval.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct SemanticConfig {
    /// Model name for embeddings (e.g., "all-MiniLM-L6-v2")
    #[serde(default = "default_model")]
    pub model: String,

    /// Minimum similarity score for a hit [0.0, 1.0]
    #[serde(default = "default_threshold")]
    pub default_threshold: f32,
}

impl Default for SemanticConfig {
    fn default() -> Self {
        Self {
            model: DEFAULT_MODEL.to_string(),
            default_threshold: DEFAULT_THRESHOLD,
        }
    }
}

/// Configuration for result counts.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct SearchConfig {
    /// Recommendations returned per chat turn
    #[serde(default = "default_limit")]
    pub default_limit: usize,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            default_limit: DEFAULT_LIMIT,
        }
    }
}

/// Configuration for the HTTP chat server.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Bind address for the daemon
    #[serde(default = "default_bind")]
    pub bind: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind: DEFAULT_BIND.to_string(),
        }
    }
}

fn default_model() -> String {
    DEFAULT_MODEL.to_string()
}

fn default_threshold() -> f32 {
    DEFAULT_THRESHOLD
}

fn default_limit() -> usize {
    DEFAULT_LIMIT
}

fn default_bind() -> String {
    DEFAULT_BIND.to_string()
}

#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub semantic: SemanticConfig,
    #[serde(default)]
    pub search: SearchConfig,
    #[serde(default)]
    pub server: ServerConfig,

    #[serde(skip_serializing, skip_deserializing)]
    base_path: PathBuf,
}

impl Config {
    fn validate(&self) {
        if !(0.0..=1.0).contains(&self.semantic.default_threshold) {
            panic!(
                "semantic.default_threshold must be between 0.0 and 1.0, got {}",
                self.semantic.default_threshold
            );
        }

        if self.semantic.model.trim().is_empty() {
            panic!("semantic.model must not be empty");
        }

        if self.search.default_limit == 0 {
            panic!("search.default_limit must be greater than 0");
        }

        if self.server.bind.trim().is_empty() {
            panic!("server.bind must not be empty");
        }
    }

    /// Load config.yaml from the data directory, creating a default file
    /// on first run.
    pub fn load_with(base_path: &Path) -> Self {
        let path = base_path.join("config.yaml");

        if !path.exists() {
            if let Some(parent) = path.parent() {
                std::fs::create_dir_all(parent).expect("couldnt create data directory");
            }
            std::fs::write(&path, serde_yml::to_string(&Self::default()).unwrap())
                .expect("couldnt write default config");
        }

        let config_str = std::fs::read_to_string(&path).expect("couldnt read config file");
        let mut config: Self = serde_yml::from_str(&config_str).expect("config is malformed");

        config.base_path = base_path.to_path_buf();

        config.validate();

        // resave in case the config version needs an upgrade
        if config_str != serde_yml::to_string(&config).unwrap() {
            config.save();
        }

        config
    }

    pub fn save(&self) {
        let path = self.base_path.join("config.yaml");
        std::fs::write(&path, serde_yml::to_string(&self).unwrap())
            .expect("couldnt write config file");
    }
}
