//! Training and serving configuration.
//!
//! Every setting has a default, so a JSON config file only needs the keys it
//! overrides:
//!
//! ```json
//! {
//!   "seed": 7,
//!   "grid_search": { "c_grid": [0.5, 1.0, 2.0] },
//!   "persist_policy": "require-gate"
//! }
//! ```

use std::fmt;
use std::fs::File;
use std::io::BufReader;
use std::path::Path;
use std::str::FromStr;

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use crate::error::{Result, SentiscopeError};
use crate::evaluation::QualityGate;
use crate::feature::VectorizerConfig;
use crate::model::GridSearchConfig;
use crate::service::BatchLimits;

/// What to do with a trained model that misses the quality gate.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum PersistPolicy {
    /// Persist every trained model; the gate only affects logging.
    #[default]
    Always,
    /// Persist only models that pass the gate.
    RequireGate,
}

impl PersistPolicy {
    pub fn should_persist(self, gate_passed: bool) -> bool {
        match self {
            PersistPolicy::Always => true,
            PersistPolicy::RequireGate => gate_passed,
        }
    }
}

impl fmt::Display for PersistPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            PersistPolicy::Always => "always",
            PersistPolicy::RequireGate => "require-gate",
        })
    }
}

impl FromStr for PersistPolicy {
    type Err = SentiscopeError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "always" => Ok(PersistPolicy::Always),
            "require-gate" => Ok(PersistPolicy::RequireGate),
            other => Err(SentiscopeError::invalid_config(format!(
                "unknown persist policy '{other}', expected 'always' or 'require-gate'"
            ))),
        }
    }
}

/// Settings for one training run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TrainingConfig {
    pub vectorizer: VectorizerConfig,
    pub grid_search: GridSearchConfig,
    /// Fraction of the corpus held out for evaluation.
    pub test_size: f64,
    /// Seed for the train/test split.
    pub seed: u64,
    pub gate: QualityGate,
    pub persist_policy: PersistPolicy,
}

impl Default for TrainingConfig {
    fn default() -> Self {
        TrainingConfig {
            vectorizer: VectorizerConfig::default(),
            grid_search: GridSearchConfig::default(),
            test_size: 0.2,
            seed: 42,
            gate: QualityGate::default(),
            persist_policy: PersistPolicy::default(),
        }
    }
}

impl TrainingConfig {
    pub fn from_json_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        load_json(path.as_ref())
    }

    pub fn validate(&self) -> Result<()> {
        self.vectorizer.validate()?;
        self.grid_search.validate()?;
        self.gate.validate()?;
        if !(self.test_size > 0.0 && self.test_size < 1.0) {
            return Err(SentiscopeError::invalid_config(format!(
                "test_size must be in (0, 1), got {}",
                self.test_size
            )));
        }
        Ok(())
    }
}

/// Settings for the HTTP service.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    /// Scoring threads; `None` uses one per CPU.
    pub worker_threads: Option<usize>,
    pub limits: BatchLimits,
}

impl Default for ServerConfig {
    fn default() -> Self {
        ServerConfig {
            host: "0.0.0.0".to_string(),
            port: 8000,
            worker_threads: None,
            limits: BatchLimits::default(),
        }
    }
}

impl ServerConfig {
    pub fn from_json_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        load_json(path.as_ref())
    }

    pub fn validate(&self) -> Result<()> {
        if self.host.trim().is_empty() {
            return Err(SentiscopeError::invalid_config("host must not be empty"));
        }
        if self.worker_threads == Some(0) {
            return Err(SentiscopeError::invalid_config(
                "worker_threads must be positive",
            ));
        }
        self.limits.validate()
    }

    /// `host:port` for binding.
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

fn load_json<T: DeserializeOwned>(path: &Path) -> Result<T> {
    let file = File::open(path).map_err(|e| {
        SentiscopeError::invalid_config(format!("cannot read {}: {e}", path.display()))
    })?;
    serde_json::from_reader(BufReader::new(file)).map_err(|e| {
        SentiscopeError::invalid_config(format!("invalid config {}: {e}", path.display()))
    })
}
