//! Site configuration module.
//!
//! Handles loading, validating, and merging the optional `blog.toml` file, and
//! resolves the two build targets (local preview and deployment).
//!
//! ## Config File Location
//!
//! `blog.toml` is read from the working directory (or the path given with
//! `--config`). A missing file means stock defaults.
//!
//! ## Configuration Options
//!
//! ```toml
//! # All options are optional - defaults shown below
//!
//! source_dir = "content"          # Markdown source tree
//! cache_file = ".build_cache.json" # Change cache location
//! site_title = "My Blog"          # Header link text on every page
//!
//! [deploy]
//! output_dir = "docs"
//! base_url = "https://farbdrucker.github.io"
//!
//! [test]
//! output_dir = "test_site"
//! # base_url = "..."            # Defaults to the absolute output_dir path
//! ```
//!
//! Unknown keys are rejected to catch typos early.

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Default config file name, looked up in the working directory.
pub const CONFIG_FILENAME: &str = "blog.toml";

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),
    #[error("Config validation error: {0}")]
    Validation(String),
}

/// Blog configuration loaded from `blog.toml`.
///
/// All fields have defaults. User config files need only specify the values
/// they want to override. Unknown keys are rejected.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct BlogConfig {
    /// Root of the markdown source tree (`{source_dir}/{year}/{slug}.md`).
    pub source_dir: PathBuf,
    /// Location of the change cache, relative to the working directory.
    pub cache_file: PathBuf,
    /// Site name shown in the header of every page.
    pub site_title: String,
    /// Production output.
    pub deploy: DeployConfig,
    /// Local preview output.
    pub test: TestConfig,
}

impl Default for BlogConfig {
    fn default() -> Self {
        Self {
            source_dir: PathBuf::from("content"),
            cache_file: PathBuf::from(".build_cache.json"),
            site_title: "My Blog".to_string(),
            deploy: DeployConfig::default(),
            test: TestConfig::default(),
        }
    }
}

impl BlogConfig {
    /// Validate config values.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.deploy.base_url.trim().is_empty() {
            return Err(ConfigError::Validation(
                "deploy.base_url must not be empty".into(),
            ));
        }
        if self.deploy.output_dir.as_os_str().is_empty()
            || self.test.output_dir.as_os_str().is_empty()
        {
            return Err(ConfigError::Validation(
                "output_dir must not be empty".into(),
            ));
        }
        if self.deploy.output_dir == self.test.output_dir {
            return Err(ConfigError::Validation(
                "test.output_dir and deploy.output_dir must differ".into(),
            ));
        }
        if self.source_dir.as_os_str().is_empty() {
            return Err(ConfigError::Validation(
                "source_dir must not be empty".into(),
            ));
        }
        Ok(())
    }

    /// Resolve the output directory and base URL for one build.
    ///
    /// `cwd` anchors the default preview base URL, which is the absolute path
    /// of the test output directory so the preview opens straight from disk.
    pub fn target(&self, mode: Mode, cwd: &Path) -> BuildTarget {
        match mode {
            Mode::Deploy => BuildTarget::new(
                mode,
                self.deploy.output_dir.clone(),
                &self.deploy.base_url,
            ),
            Mode::Test => {
                let base_url = match &self.test.base_url {
                    Some(url) => url.clone(),
                    None => cwd.join(&self.test.output_dir).display().to_string(),
                };
                BuildTarget::new(mode, self.test.output_dir.clone(), &base_url)
            }
        }
    }
}

/// Production output settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct DeployConfig {
    pub output_dir: PathBuf,
    pub base_url: String,
}

impl Default for DeployConfig {
    fn default() -> Self {
        Self {
            output_dir: PathBuf::from("docs"),
            base_url: "https://farbdrucker.github.io".to_string(),
        }
    }
}

/// Local preview output settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct TestConfig {
    pub output_dir: PathBuf,
    /// When absent, the absolute path of `output_dir` is used.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub base_url: Option<String>,
}

impl Default for TestConfig {
    fn default() -> Self {
        Self {
            output_dir: PathBuf::from("test_site"),
            base_url: None,
        }
    }
}

/// Which of the two output configurations a build writes to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    Test,
    Deploy,
}

/// Output root and base URL for one build invocation. Immutable once built.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuildTarget {
    pub mode: Mode,
    pub output_dir: PathBuf,
    /// Base URL without a trailing slash.
    pub base_url: String,
}

impl BuildTarget {
    pub fn new(mode: Mode, output_dir: PathBuf, base_url: &str) -> Self {
        Self {
            mode,
            output_dir,
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }
}

// =============================================================================
// Config loading, merging, and validation
// =============================================================================

/// Returns the stock default config as a `toml::Value::Table`.
///
/// This is the base layer for merging user overrides on top.
pub fn stock_defaults_value() -> toml::Value {
    toml::Value::try_from(BlogConfig::default()).expect("default config must serialize")
}

/// Recursively merge `overlay` on top of `base`.
///
/// - Tables are merged key-by-key (overlay keys override base keys).
/// - Non-table values in overlay replace base values entirely.
/// - Keys in base that are not in overlay are preserved.
pub fn merge_toml(base: toml::Value, overlay: toml::Value) -> toml::Value {
    match (base, overlay) {
        (toml::Value::Table(mut base_table), toml::Value::Table(overlay_table)) => {
            for (key, overlay_val) in overlay_table {
                let merged = match base_table.remove(&key) {
                    Some(base_val) => merge_toml(base_val, overlay_val),
                    None => overlay_val,
                };
                base_table.insert(key, merged);
            }
            toml::Value::Table(base_table)
        }
        (_, overlay) => overlay,
    }
}

/// Load a config file as a raw TOML value.
///
/// Returns `Ok(None)` if the file does not exist and `Err` if it exists but
/// contains invalid TOML.
pub fn load_raw_config(path: &Path) -> Result<Option<toml::Value>, ConfigError> {
    if !path.exists() {
        return Ok(None);
    }
    let content = fs::read_to_string(path)?;
    let value: toml::Value = toml::from_str(&content)?;
    Ok(Some(value))
}

/// Merge an optional overlay onto a base value, then deserialize and validate.
pub fn resolve_config(
    base: toml::Value,
    overlay: Option<toml::Value>,
) -> Result<BlogConfig, ConfigError> {
    let merged = match overlay {
        Some(ov) => merge_toml(base, ov),
        None => base,
    };
    let config: BlogConfig = merged.try_into()?;
    config.validate()?;
    Ok(config)
}

/// Load config from the given file path.
///
/// Merges user values on top of stock defaults, rejects unknown keys,
/// and validates the result.
pub fn load_config(path: &Path) -> Result<BlogConfig, ConfigError> {
    let base = stock_defaults_value();
    let overlay = load_raw_config(path)?;
    resolve_config(base, overlay)
}

/// Returns a fully-commented stock `blog.toml` with all keys and explanations.
///
/// Used by the `gen-config` CLI command.
pub fn stock_config_toml() -> &'static str {
    r##"# Simple Blog Configuration
# ==========================
# All settings are optional. Remove or comment out any you don't need.
# Values shown below are the defaults.
# Unknown keys will cause an error.

# Markdown sources, laid out as {source_dir}/{year}/{slug}.md
source_dir = "content"

# Change cache: source path -> modification time of the last render.
# Delete it to force a full rebuild.
cache_file = ".build_cache.json"

# Header link text on every page.
site_title = "My Blog"

# ---------------------------------------------------------------------------
# Deployment target (`build`)
# ---------------------------------------------------------------------------
[deploy]
output_dir = "docs"
base_url = "https://farbdrucker.github.io"

# ---------------------------------------------------------------------------
# Local preview target (`build --test`)
# ---------------------------------------------------------------------------
[test]
output_dir = "test_site"
# Defaults to the absolute path of output_dir so pages open from disk.
# base_url = "http://localhost:8000"
"##
}
