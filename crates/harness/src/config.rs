//! Harness configuration
//!
//! Loaded from a TOML file when one exists, then overridden by the
//! environment. Every section has working defaults so an empty file (or no
//! file) is a valid configuration.

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::bridge::WaitOptions;
use crate::error::{HarnessError, HarnessResult};
use crate::reporter::{ReporterOptions, DEFAULT_REPORTER_GLOBAL};
use crate::smoke::{default_routes, Route};

/// Non-empty: run a visible browser instead of one on a virtual display.
pub const ENV_SHOW_BROWSER: &str = "SHOW_SELENIUM";
/// Remote WebDriver endpoint; when set no local driver is spawned.
pub const ENV_REMOTE_WEBDRIVER: &str = "REMOTE_SELENIUM";
/// Base URL of the application under test.
pub const ENV_BASE_URL: &str = "SPECBRIDGE_BASE_URL";

/// Default config file name, looked up in the working directory.
pub const DEFAULT_CONFIG_FILE: &str = "specbridge.toml";

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct HarnessConfig {
    #[serde(default)]
    pub app: AppConfig,
    #[serde(default)]
    pub browser: BrowserConfig,
    #[serde(default)]
    pub suite: SuiteConfig,
}

/// The application under test
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub base_url: String,

    /// Page that boots the in-browser suite
    pub suite_path: String,

    /// Routes that must answer 200
    pub smoke_routes: Vec<Route>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            base_url: "http://127.0.0.1:8000".to_string(),
            suite_path: "/cui/test/".to_string(),
            smoke_routes: default_routes(),
        }
    }
}

impl AppConfig {
    pub fn suite_url(&self) -> String {
        format!("{}{}", self.base_url.trim_end_matches('/'), self.suite_path)
    }
}

/// Browser and display settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct BrowserConfig {
    /// Show a real browser window instead of using a virtual display
    pub show: bool,

    /// Remote WebDriver endpoint (None = spawn a local driver)
    pub remote_url: Option<String>,

    /// Local WebDriver server binary
    pub driver_binary: PathBuf,

    /// Virtual display server binary
    pub display_binary: PathBuf,

    pub display_width: u32,
    pub display_height: u32,

    /// How long to wait for the driver or display to come up
    pub startup_timeout_secs: u64,
}

impl Default for BrowserConfig {
    fn default() -> Self {
        Self {
            show: false,
            remote_url: None,
            driver_binary: PathBuf::from("geckodriver"),
            display_binary: PathBuf::from("Xvfb"),
            display_width: 1024,
            display_height: 768,
            startup_timeout_secs: 30,
        }
    }
}

impl BrowserConfig {
    pub fn startup_timeout(&self) -> Duration {
        Duration::from_secs(self.startup_timeout_secs)
    }
}

/// Page-side suite settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SuiteConfig {
    /// Global on `window` that records suite events
    pub reporter_global: String,
    pub timeout_secs: u64,
    pub poll_interval_ms: u64,
}

impl Default for SuiteConfig {
    fn default() -> Self {
        Self {
            reporter_global: DEFAULT_REPORTER_GLOBAL.to_string(),
            timeout_secs: 60,
            poll_interval_ms: 500,
        }
    }
}

impl SuiteConfig {
    pub fn wait_options(&self) -> WaitOptions {
        WaitOptions {
            timeout: Duration::from_secs(self.timeout_secs),
            poll_interval: Duration::from_millis(self.poll_interval_ms),
        }
    }

    pub fn reporter_options(&self) -> ReporterOptions {
        ReporterOptions {
            global: self.reporter_global.clone(),
            wait: self.wait_options(),
        }
    }
}

impl HarnessConfig {
    /// Load from `path` if it exists (defaults otherwise), then apply the
    /// process environment.
    pub fn load(path: &Path) -> HarnessResult<Self> {
        let mut config = Self::from_file(path)?;
        config.apply_env();
        Ok(config)
    }

    pub fn from_file(path: &Path) -> HarnessResult<Self> {
        if path.exists() {
            let content = std::fs::read_to_string(path)?;
            Self::from_toml(&content)
        } else {
            Ok(Self::default())
        }
    }

    pub fn from_toml(content: &str) -> HarnessResult<Self> {
        toml::from_str(content).map_err(|e| HarnessError::Config(e.to_string()))
    }

    pub fn apply_env(&mut self) {
        self.apply_env_from(|key| std::env::var(key).ok());
    }

    /// Apply overrides using `lookup` in place of the process environment.
    pub fn apply_env_from<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if lookup(ENV_SHOW_BROWSER).is_some_and(|v| !v.is_empty()) {
            self.browser.show = true;
        }
        if let Some(url) = lookup(ENV_REMOTE_WEBDRIVER).filter(|v| !v.is_empty()) {
            self.browser.remote_url = Some(url);
        }
        if let Some(url) = lookup(ENV_BASE_URL).filter(|v| !v.is_empty()) {
            self.app.base_url = url;
        }
    }
}
