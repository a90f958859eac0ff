//! TOML configuration loading and validation.

use std::path::{Path, PathBuf};

use allocbook::{ModeDefaults, ProxyMultipliers, ValidationGate};
use log::info;
use serde::Deserialize;

use crate::error::{Error, Result};

/// Top-level configuration. Every section is optional.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    pub modes: ModesConfig,
    pub validation: ValidationConfig,
    pub weights: WeightsConfig,
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ModesConfig {
    #[serde(default = "default_standard_cash")]
    pub standard_cash: f64,
    #[serde(default = "default_majority_cash")]
    pub majority_cash: f64,
}

impl Default for ModesConfig {
    fn default() -> Self {
        Self {
            standard_cash: default_standard_cash(),
            majority_cash: default_majority_cash(),
        }
    }
}

fn default_standard_cash() -> f64 {
    0.0
}
fn default_majority_cash() -> f64 {
    60.0
}

#[derive(Debug, Clone, Deserialize)]
pub struct ValidationConfig {
    #[serde(default = "default_tolerance")]
    pub tolerance: f64,
}

impl Default for ValidationConfig {
    fn default() -> Self {
        Self {
            tolerance: default_tolerance(),
        }
    }
}

fn default_tolerance() -> f64 {
    allocbook::DEFAULT_TOLERANCE
}

#[derive(Debug, Clone, Deserialize)]
pub struct WeightsConfig {
    #[serde(default)]
    pub quotes_file: Option<PathBuf>,
    #[serde(default = "default_large_cap")]
    pub large_cap_multiplier: f64,
    #[serde(default = "default_btc")]
    pub btc_dominance: f64,
    #[serde(default = "default_eth")]
    pub eth_dominance: f64,
    #[serde(default = "default_alt")]
    pub alt_crypto_discount: f64,
    /// Replaces the built-in large-cap list when set.
    #[serde(default)]
    pub large_caps: Option<Vec<String>>,
}

impl Default for WeightsConfig {
    fn default() -> Self {
        Self {
            quotes_file: None,
            large_cap_multiplier: default_large_cap(),
            btc_dominance: default_btc(),
            eth_dominance: default_eth(),
            alt_crypto_discount: default_alt(),
            large_caps: None,
        }
    }
}

fn default_large_cap() -> f64 {
    3.0
}
fn default_btc() -> f64 {
    4.0
}
fn default_eth() -> f64 {
    2.0
}
fn default_alt() -> f64 {
    0.5
}

#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    #[serde(default = "default_log_dir")]
    pub dir: String,
    #[serde(default = "default_audit_file")]
    pub audit_file: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            dir: default_log_dir(),
            audit_file: default_audit_file(),
        }
    }
}

fn default_log_dir() -> String {
    "./logs".into()
}
fn default_audit_file() -> String {
    "audit.jsonl".into()
}

impl Config {
    /// Load config from a TOML file.
    pub fn load(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path).map_err(|e| Error::ConfigRead {
            path: path.to_path_buf(),
            source: e,
        })?;
        Self::from_toml(&contents)
    }

    /// Load config from `path`, or use the defaults if the file does not exist.
    pub fn load_or_default(path: &Path) -> Result<Self> {
        if !path.exists() {
            info!("No config at {}; using defaults", path.display());
            return Ok(Self::default());
        }
        Self::load(path)
    }

    /// Parse from a TOML string (useful for testing).
    pub fn from_toml(contents: &str) -> Result<Self> {
        let config: Config = toml::from_str(contents)?;
        config.validate()?;
        Ok(config)
    }

    /// Validate config invariants.
    fn validate(&self) -> Result<()> {
        for (name, value) in [
            ("standard_cash", self.modes.standard_cash),
            ("majority_cash", self.modes.majority_cash),
        ] {
            if !value.is_finite() || !(0.0..=100.0).contains(&value) {
                return Err(Error::Config(format!(
                    "{name} must be in [0, 100], got {value}"
                )));
            }
        }
        let tol = self.validation.tolerance;
        if !tol.is_finite() || tol <= 0.0 || tol > 5.0 {
            return Err(Error::Config(format!(
                "tolerance must be in (0, 5], got {tol}"
            )));
        }
        for (name, value) in [
            ("large_cap_multiplier", self.weights.large_cap_multiplier),
            ("btc_dominance", self.weights.btc_dominance),
            ("eth_dominance", self.weights.eth_dominance),
            ("alt_crypto_discount", self.weights.alt_crypto_discount),
        ] {
            if !value.is_finite() || value <= 0.0 {
                return Err(Error::Config(format!(
                    "{name} must be finite and > 0, got {value}"
                )));
            }
        }
        Ok(())
    }

    pub fn mode_defaults(&self) -> ModeDefaults {
        ModeDefaults {
            standard_cash: self.modes.standard_cash,
            majority_cash: self.modes.majority_cash,
        }
    }

    pub fn gate(&self) -> ValidationGate {
        ValidationGate::new(self.validation.tolerance)
    }

    pub fn multipliers(&self) -> ProxyMultipliers {
        let base = ProxyMultipliers::default();
        ProxyMultipliers {
            large_cap: self.weights.large_cap_multiplier,
            btc_dominance: self.weights.btc_dominance,
            eth_dominance: self.weights.eth_dominance,
            alt_crypto_discount: self.weights.alt_crypto_discount,
            large_caps: self.weights.large_caps.clone().unwrap_or(base.large_caps),
        }
    }

    /// Full path to the audit log file.
    pub fn audit_path(&self) -> PathBuf {
        Path::new(&self.logging.dir).join(&self.logging.audit_file)
    }
}
