use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use tally_core::{TokenizerConfig, DEFAULT_ALPHA, DEFAULT_STOP_WORDS, DEFAULT_TOKEN_PATTERN};
use tally_finance::SessionSettings;
use tally_ingest::ReadOptions;

use crate::state::{default_config_path, ensure_tally_home};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub features: FeaturesSection,
    pub classifier: ClassifierSection,
    pub ingest: IngestSection,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FeaturesSection {
    pub token_pattern: String,
    pub ngram_min: usize,
    pub ngram_max: usize,
    pub lowercase: bool,
    /// Tokens dropped before n-grams are built (exact match, after case folding)
    pub stop_words: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClassifierSection {
    pub alpha: f64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct IngestSection {
    /// Skip dated lines that fail validation instead of aborting the load
    pub skip_malformed: bool,
}

impl Default for FeaturesSection {
    fn default() -> Self {
        Self {
            token_pattern: DEFAULT_TOKEN_PATTERN.to_string(),
            ngram_min: 1,
            ngram_max: 3,
            lowercase: true,
            stop_words: DEFAULT_STOP_WORDS.iter().map(|s| s.to_string()).collect(),
        }
    }
}

impl Default for ClassifierSection {
    fn default() -> Self {
        Self { alpha: DEFAULT_ALPHA }
    }
}

impl Config {
    pub fn session_settings(&self) -> SessionSettings {
        SessionSettings {
            tokenizer: TokenizerConfig {
                token_pattern: self.features.token_pattern.clone(),
                ngram_range: (self.features.ngram_min, self.features.ngram_max),
                lowercase: self.features.lowercase,
                stop_words: self.features.stop_words.clone(),
            },
            alpha: self.classifier.alpha,
        }
    }

    pub fn read_options(&self) -> ReadOptions {
        ReadOptions {
            skip_malformed: self.ingest.skip_malformed,
        }
    }
}

/// `--config` if given, else `~/.tally/config.toml`
pub fn config_path(explicit: Option<&Path>) -> Result<PathBuf> {
    match explicit {
        Some(p) => Ok(p.to_path_buf()),
        None => default_config_path(),
    }
}

/// Load the config file; a missing file yields the defaults.
pub fn load_config(path: &Path) -> Result<Config> {
    if !path.exists() {
        return Ok(Config::default());
    }
    let s = fs::read_to_string(path).with_context(|| format!("read {}", path.display()))?;
    toml::from_str(&s).with_context(|| format!("parse {}", path.display()))
}

pub fn save_config(path: &Path, cfg: &Config) -> Result<()> {
    let s = toml::to_string_pretty(cfg).context("serialize config")?;
    fs::write(path, s).with_context(|| format!("write {}", path.display()))?;
    Ok(())
}

pub fn init_config(explicit: Option<&Path>) -> Result<()> {
    let p = match explicit {
        Some(p) => p.to_path_buf(),
        None => ensure_tally_home()?.join("config.toml"),
    };
    if p.exists() {
        bail!("config already exists: {}", p.display());
    }
    save_config(&p, &Config::default())?;
    println!("Wrote {}", p.display());
    Ok(())
}
