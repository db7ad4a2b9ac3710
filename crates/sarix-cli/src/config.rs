// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use anyhow::{Context, Result, anyhow, bail};
use sarix_app::{AdRequest, DEFAULT_HOMESERVER, DEFAULT_TIMELINE_LIMIT, resolve_homeserver};
use sarix_tui::UiOptions;
use serde::Deserialize;
use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing_subscriber::EnvFilter;

const CONFIG_VERSION: i64 = 1;
const DEFAULT_MATRIX_TIMEOUT: &str = "10s";
const DEFAULT_DEVICE_NAME: &str = "sarix";
const DEFAULT_KEY_OVERLAY: &str = "500ms";
const DEFAULT_AD_DISPLAY: &str = "8s";
const DEFAULT_AD_APP: &str = "sarix";
const DEFAULT_AD_WIDTH: u16 = 224;
const DEFAULT_AD_HEIGHT: u16 = 60;
const DEFAULT_LOG_LEVEL: &str = "info";

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub version: i64,
    #[serde(default)]
    pub matrix: Matrix,
    #[serde(default)]
    pub storage: Storage,
    #[serde(default)]
    pub ui: Ui,
    #[serde(default)]
    pub ads: Ads,
    #[serde(default)]
    pub log: Log,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            version: CONFIG_VERSION,
            matrix: Matrix::default(),
            storage: Storage::default(),
            ui: Ui::default(),
            ads: Ads::default(),
            log: Log::default(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct Matrix {
    pub homeserver: Option<String>,
    pub timeout: Option<String>,
    pub device_name: Option<String>,
}

impl Default for Matrix {
    fn default() -> Self {
        Self {
            homeserver: Some(DEFAULT_HOMESERVER.to_owned()),
            timeout: Some(DEFAULT_MATRIX_TIMEOUT.to_owned()),
            device_name: Some(DEFAULT_DEVICE_NAME.to_owned()),
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Storage {
    pub db_path: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Ui {
    pub timeline_limit: Option<i64>,
    pub key_overlay: Option<String>,
}

impl Default for Ui {
    fn default() -> Self {
        Self {
            timeline_limit: Some(DEFAULT_TIMELINE_LIMIT as i64),
            key_overlay: Some(DEFAULT_KEY_OVERLAY.to_owned()),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct Ads {
    pub enabled: Option<bool>,
    pub publisher: Option<String>,
    pub app: Option<String>,
    pub test: Option<bool>,
    pub width: Option<u16>,
    pub height: Option<u16>,
    pub banner: Option<String>,
    pub display_for: Option<String>,
}

impl Default for Ads {
    fn default() -> Self {
        Self {
            enabled: Some(true),
            publisher: Some(String::new()),
            app: Some(DEFAULT_AD_APP.to_owned()),
            test: Some(false),
            width: Some(DEFAULT_AD_WIDTH),
            height: Some(DEFAULT_AD_HEIGHT),
            banner: None,
            display_for: Some(DEFAULT_AD_DISPLAY.to_owned()),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct Log {
    pub level: Option<String>,
}

impl Default for Log {
    fn default() -> Self {
        Self {
            level: Some(DEFAULT_LOG_LEVEL.to_owned()),
        }
    }
}

impl Config {
    pub fn default_path() -> Result<PathBuf> {
        if let Some(path) = env::var_os("SARIX_CONFIG_PATH") {
            return Ok(PathBuf::from(path));
        }

        let config_root = dirs::config_dir().ok_or_else(|| {
            anyhow!("cannot resolve config directory; set SARIX_CONFIG_PATH to the config file")
        })?;

        let app_dir = config_root.join(sarix_store::APP_NAME);
        fs::create_dir_all(&app_dir)
            .with_context(|| format!("create config directory {}", app_dir.display()))?;
        Ok(app_dir.join("config.toml"))
    }

    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }

        let raw = fs::read_to_string(path)
            .with_context(|| format!("read config file {}", path.display()))?;
        let value: toml::Value = toml::from_str(&raw)
            .with_context(|| format!("parse TOML config {}", path.display()))?;

        let version = value
            .get("version")
            .and_then(toml::Value::as_integer)
            .ok_or_else(|| {
                anyhow!(
                    "config file {} is not versioned. Add `version = 1` and put values under [matrix], [storage], [ui], [ads] and [log]",
                    path.display()
                )
            })?;

        if version != CONFIG_VERSION {
            bail!(
                "unsupported config version {} in {}; expected version = 1. Run `sarix --print-example-config` for the current schema",
                version,
                path.display()
            );
        }

        let config: Config = value
            .try_into()
            .with_context(|| format!("decode config {}", path.display()))?;
        config.validate(path)?;
        Ok(config)
    }

    fn validate(&self, path: &Path) -> Result<()> {
        if let Some(homeserver) = &self.matrix.homeserver {
            let resolved = resolve_homeserver(homeserver, DEFAULT_HOMESERVER);
            if !resolved.starts_with("http://") && !resolved.starts_with("https://") {
                bail!(
                    "matrix.homeserver in {} must start with http:// or https://, got {:?}",
                    path.display(),
                    homeserver
                );
            }
        }

        if let Some(db_path) = &self.storage.db_path {
            sarix_store::validate_db_path(db_path)?;
        }

        if let Some(limit) = self.ui.timeline_limit
            && limit <= 0
        {
            bail!(
                "ui.timeline_limit in {} must be positive, got {}",
                path.display(),
                limit
            );
        }

        for (key, value) in [
            ("matrix.timeout", &self.matrix.timeout),
            ("ui.key_overlay", &self.ui.key_overlay),
            ("ads.display_for", &self.ads.display_for),
        ] {
            if let Some(raw) = value {
                let parsed = parse_duration(raw)?;
                if parsed <= Duration::ZERO {
                    bail!("{key} in {} must be positive, got {raw}", path.display());
                }
            }
        }

        if self.ads.width == Some(0) || self.ads.height == Some(0) {
            bail!(
                "ads.width and ads.height in {} must be positive",
                path.display()
            );
        }

        if let Some(level) = &self.log.level {
            EnvFilter::try_new(level).with_context(|| {
                format!(
                    "log.level in {} is not a valid filter; use a level like \"info\" or \"sarix_matrix=debug\"",
                    path.display()
                )
            })?;
        }

        Ok(())
    }

    pub fn db_path(&self) -> Result<PathBuf> {
        match &self.storage.db_path {
            Some(path) => Ok(PathBuf::from(path)),
            None => sarix_store::default_db_path(),
        }
    }

    pub fn homeserver(&self) -> String {
        resolve_homeserver(
            self.matrix.homeserver.as_deref().unwrap_or(""),
            DEFAULT_HOMESERVER,
        )
    }

    pub fn matrix_timeout(&self) -> Result<Duration> {
        parse_duration(
            self.matrix
                .timeout
                .as_deref()
                .unwrap_or(DEFAULT_MATRIX_TIMEOUT),
        )
    }

    pub fn device_name(&self) -> &str {
        self.matrix
            .device_name
            .as_deref()
            .unwrap_or(DEFAULT_DEVICE_NAME)
    }

    pub fn timeline_limit(&self) -> usize {
        self.ui
            .timeline_limit
            .and_then(|limit| usize::try_from(limit).ok())
            .filter(|limit| *limit > 0)
            .unwrap_or(DEFAULT_TIMELINE_LIMIT)
    }

    pub fn ui_options(&self) -> Result<UiOptions> {
        Ok(UiOptions {
            key_overlay: parse_duration(
                self.ui.key_overlay.as_deref().unwrap_or(DEFAULT_KEY_OVERLAY),
            )?,
            banner_display: parse_duration(
                self.ads.display_for.as_deref().unwrap_or(DEFAULT_AD_DISPLAY),
            )?,
        })
    }

    pub fn ads_enabled(&self) -> bool {
        self.ads.enabled.unwrap_or(true)
    }

    pub fn ad_request(&self) -> AdRequest {
        AdRequest {
            publisher: self.ads.publisher.clone().unwrap_or_default(),
            app: self
                .ads
                .app
                .clone()
                .unwrap_or_else(|| DEFAULT_AD_APP.to_owned()),
            test: self.ads.test.unwrap_or(false),
            width: self.ads.width.unwrap_or(DEFAULT_AD_WIDTH),
            height: self.ads.height.unwrap_or(DEFAULT_AD_HEIGHT),
        }
    }

    pub fn banner_text(&self) -> Option<&str> {
        self.ads
            .banner
            .as_deref()
            .map(str::trim)
            .filter(|text| !text.is_empty())
    }

    pub fn log_level(&self) -> &str {
        self.log.level.as_deref().unwrap_or(DEFAULT_LOG_LEVEL)
    }

    pub fn example_config(path: &Path) -> String {
        format!(
            "# sarix config\n# Place this file at: {}\n\nversion = 1\n\n[matrix]\nhomeserver = \"{}\"\ntimeout = \"{}\"\ndevice_name = \"{}\"\n\n[storage]\n# Optional. Default is platform data dir (for example ~/.local/share/sarix/sarix.db)\n# db_path = \"/absolute/path/to/sarix.db\"\n\n[ui]\ntimeline_limit = {}\nkey_overlay = \"{}\"\n\n[ads]\nenabled = true\npublisher = \"\"\napp = \"{}\"\n# Marks requests as test traffic and prefixes the house banner with [test]\ntest = false\nwidth = {}\nheight = {}\n# Text for the built-in house banner; without it the banner slot reads \"ads not available\"\n# banner = \"Your message here\"\ndisplay_for = \"{}\"\n\n[log]\n# Overridden by SARIX_LOG. Logs go to the data dir (for example ~/.local/share/sarix/sarix.log)\nlevel = \"{}\"\n",
            path.display(),
            DEFAULT_HOMESERVER,
            DEFAULT_MATRIX_TIMEOUT,
            DEFAULT_DEVICE_NAME,
            DEFAULT_TIMELINE_LIMIT,
            DEFAULT_KEY_OVERLAY,
            DEFAULT_AD_APP,
            DEFAULT_AD_WIDTH,
            DEFAULT_AD_HEIGHT,
            DEFAULT_AD_DISPLAY,
            DEFAULT_LOG_LEVEL,
        )
    }
}

fn parse_duration(raw: &str) -> Result<Duration> {
    if let Some(value) = raw.strip_suffix("ms") {
        let millis: u64 = value
            .parse()
            .with_context(|| format!("invalid duration {raw:?}"))?;
        return Ok(Duration::from_millis(millis));
    }
    if let Some(value) = raw.strip_suffix('s') {
        let secs: u64 = value
            .parse()
            .with_context(|| format!("invalid duration {raw:?}"))?;
        return Ok(Duration::from_secs(secs));
    }
    if let Some(value) = raw.strip_suffix('m') {
        let mins: u64 = value
            .parse()
            .with_context(|| format!("invalid duration {raw:?}"))?;
        let secs = mins
            .checked_mul(60)
            .ok_or_else(|| anyhow!("duration {raw:?} is too large"))?;
        return Ok(Duration::from_secs(secs));
    }

    bail!("invalid duration {raw:?}; use one of: <N>ms, <N>s, <N>m (for example 500ms or 5s)")
}

#[cfg(test)]
mod tests {
    use super::{Config, parse_duration};
    use anyhow::Result;
    use std::path::PathBuf;
    use std::sync::{Mutex, OnceLock};
    use std::time::Duration;

    fn write_config(content: &str) -> Result<(tempfile::TempDir, PathBuf)> {
        let temp = tempfile::tempdir()?;
        let path = temp.path().join("config.toml");
        std::fs::write(&path, content)?;
        Ok((temp, path))
    }

    fn env_lock() -> std::sync::MutexGuard<'static, ()> {
        static ENV_LOCK: OnceLock<Mutex<()>> = OnceLock::new();
        match ENV_LOCK.get_or_init(|| Mutex::new(())).lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        }
    }

    #[test]
    fn missing_config_uses_defaults() -> Result<()> {
        let temp = tempfile::tempdir()?;
        let config = Config::load(&temp.path().join("missing.toml"))?;
        assert_eq!(config.version, 1);
        assert_eq!(config.homeserver(), "https://matrix.org");
        assert_eq!(config.matrix_timeout()?, Duration::from_secs(10));
        assert_eq!(config.device_name(), "sarix");
        assert_eq!(config.timeline_limit(), 30);
        let ui = config.ui_options()?;
        assert_eq!(ui.key_overlay, Duration::from_millis(500));
        assert_eq!(ui.banner_display, Duration::from_secs(8));
        assert!(config.ads_enabled());
        let request = config.ad_request();
        assert!(!request.test);
        assert_eq!((request.width, request.height), (224, 60));
        assert_eq!(config.banner_text(), None);
        assert_eq!(config.log_level(), "info");
        Ok(())
    }

    #[test]
    fn unversioned_config_is_rejected_with_actionable_message() -> Result<()> {
        let (_temp, path) = write_config("[matrix]\nhomeserver = \"https://hs.example.org\"\n")?;
        let error = Config::load(&path).expect_err("unversioned config should fail");
        let message = error.to_string();
        assert!(message.contains("version = 1"));
        assert!(message.contains("[matrix]"));
        Ok(())
    }

    #[test]
    fn v1_config_parses() -> Result<()> {
        let (_temp, path) = write_config(
            "version = 1\n[matrix]\nhomeserver = \"https://hs.example.org/\"\ntimeout = \"2s\"\ndevice_name = \"feature phone\"\n[ui]\ntimeline_limit = 12\nkey_overlay = \"250ms\"\n[ads]\nenabled = true\npublisher = \"pub-1\"\ntest = false\nwidth = 240\nheight = 40\nbanner = \"  Visit the co-op  \"\ndisplay_for = \"1m\"\n[log]\nlevel = \"sarix_matrix=debug\"\n",
        )?;

        let config = Config::load(&path)?;
        assert_eq!(config.homeserver(), "https://hs.example.org");
        assert_eq!(config.matrix_timeout()?, Duration::from_secs(2));
        assert_eq!(config.device_name(), "feature phone");
        assert_eq!(config.timeline_limit(), 12);
        assert_eq!(config.ui_options()?.key_overlay, Duration::from_millis(250));
        assert_eq!(config.ui_options()?.banner_display, Duration::from_secs(60));
        assert_eq!(config.banner_text(), Some("Visit the co-op"));
        let request = config.ad_request();
        assert_eq!(request.publisher, "pub-1");
        assert_eq!(request.app, "sarix");
        assert!(!request.test);
        assert_eq!((request.width, request.height), (240, 40));
        assert_eq!(config.log_level(), "sarix_matrix=debug");
        Ok(())
    }

    #[test]
    fn malformed_config_returns_parse_error() -> Result<()> {
        let (_temp, path) = write_config("{{not toml")?;
        let error = Config::load(&path).expect_err("malformed config should fail");
        assert!(error.to_string().contains("parse TOML config"));
        Ok(())
    }

    #[test]
    fn unsupported_config_version_is_rejected() -> Result<()> {
        let (_temp, path) = write_config("version = 2\n")?;
        let error = Config::load(&path).expect_err("v2 config should fail");
        assert!(error.to_string().contains("unsupported config version 2"));
        Ok(())
    }

    #[test]
    fn default_path_honors_env_override() -> Result<()> {
        let _guard = env_lock();
        let temp = tempfile::tempdir()?;
        let override_path = temp.path().join("custom-config.toml");
        // SAFETY: test-only process-local env mutation.
        unsafe {
            std::env::set_var("SARIX_CONFIG_PATH", &override_path);
        }
        let resolved = Config::default_path()?;
        // SAFETY: test cleanup for process-local env mutation.
        unsafe {
            std::env::remove_var("SARIX_CONFIG_PATH");
        }
        assert_eq!(resolved, override_path);
        Ok(())
    }

    #[test]
    fn db_path_prefers_storage_config_over_env_override() -> Result<()> {
        let _guard = env_lock();
        let (_temp, path) =
            write_config("version = 1\n[storage]\ndb_path = \"/explicit/from-config.db\"\n")?;
        // SAFETY: test-only process-local env mutation.
        unsafe {
            std::env::set_var("SARIX_DB_PATH", "/from/env.db");
        }
        let config = Config::load(&path)?;
        // SAFETY: test cleanup for process-local env mutation.
        unsafe {
            std::env::remove_var("SARIX_DB_PATH");
        }
        assert_eq!(config.db_path()?, PathBuf::from("/explicit/from-config.db"));
        Ok(())
    }

    #[test]
    fn db_path_uses_env_override_when_storage_db_path_missing() -> Result<()> {
        let _guard = env_lock();
        let (_temp, path) = write_config("version = 1\n")?;
        // SAFETY: test-only process-local env mutation.
        unsafe {
            std::env::set_var("SARIX_DB_PATH", "/from/env-only.db");
        }
        let config = Config::load(&path)?;
        let resolved = config.db_path()?;
        // SAFETY: test cleanup for process-local env mutation.
        unsafe {
            std::env::remove_var("SARIX_DB_PATH");
        }
        assert_eq!(resolved, PathBuf::from("/from/env-only.db"));
        Ok(())
    }

    #[test]
    fn db_path_rejects_uri_style_storage_value() -> Result<()> {
        let (_temp, path) =
            write_config("version = 1\n[storage]\ndb_path = \"https://evil.example/sarix.db\"\n")?;
        let error = Config::load(&path).expect_err("URI db_path should fail validation");
        assert!(error.to_string().contains("looks like a URI"));
        Ok(())
    }

    #[test]
    fn homeserver_must_be_http() -> Result<()> {
        let (_temp, path) = write_config("version = 1\n[matrix]\nhomeserver = \"matrix.org\"\n")?;
        let error = Config::load(&path).expect_err("bare host should fail");
        assert!(error.to_string().contains("http:// or https://"));
        Ok(())
    }

    #[test]
    fn blank_homeserver_falls_back_to_default() -> Result<()> {
        let (_temp, path) = write_config("version = 1\n[matrix]\nhomeserver = \"  \"\n")?;
        let config = Config::load(&path)?;
        assert_eq!(config.homeserver(), "https://matrix.org");
        Ok(())
    }

    #[test]
    fn durations_parse_ms_seconds_and_minutes() -> Result<()> {
        assert_eq!(parse_duration("500ms")?, Duration::from_millis(500));
        assert_eq!(parse_duration("5s")?, Duration::from_secs(5));
        assert_eq!(parse_duration("2m")?, Duration::from_secs(120));
        Ok(())
    }

    #[test]
    fn invalid_duration_is_rejected() {
        let error = parse_duration("oops").expect_err("invalid duration should fail");
        assert!(error.to_string().contains("invalid duration"));
    }

    #[test]
    fn oversized_minutes_are_rejected_instead_of_overflowing() -> Result<()> {
        let error = parse_duration("307445734561825862m").expect_err("overflow should fail");
        assert!(error.to_string().contains("too large"));

        let (_temp, path) = write_config("version = 1\n[matrix]\ntimeout = \"307445734561825862m\"\n")?;
        let error = Config::load(&path).expect_err("oversized timeout should fail");
        assert!(format!("{error:#}").contains("too large"));
        Ok(())
    }

    #[test]
    fn non_positive_durations_are_rejected_in_config() -> Result<()> {
        for section in [
            "[matrix]\ntimeout = \"0s\"",
            "[ui]\nkey_overlay = \"0ms\"",
            "[ads]\ndisplay_for = \"0m\"",
        ] {
            let (_temp, path) = write_config(&format!("version = 1\n{section}\n"))?;
            let error = Config::load(&path).expect_err("zero duration should fail");
            assert!(error.to_string().contains("must be positive"), "{section}");
        }
        Ok(())
    }

    #[test]
    fn timeline_limit_and_banner_size_are_validated() -> Result<()> {
        let (_temp, path) = write_config("version = 1\n[ui]\ntimeline_limit = 0\n")?;
        let error = Config::load(&path).expect_err("zero limit should fail");
        assert!(error.to_string().contains("ui.timeline_limit"));

        let (_temp, path) = write_config("version = 1\n[ads]\nwidth = 0\n")?;
        let error = Config::load(&path).expect_err("zero width should fail");
        assert!(error.to_string().contains("ads.width"));
        Ok(())
    }

    #[test]
    fn invalid_log_level_is_rejected() -> Result<()> {
        let (_temp, path) = write_config("version = 1\n[log]\nlevel = \"sarix=loud\"\n")?;
        let error = Config::load(&path).expect_err("bad filter should fail");
        assert!(error.to_string().contains("log.level"));
        Ok(())
    }

    #[test]
    fn example_config_round_trips_through_loader() -> Result<()> {
        let temp = tempfile::tempdir()?;
        let path = temp.path().join("config.toml");
        let example = Config::example_config(&path);
        for section in ["version = 1", "[matrix]", "[storage]", "[ui]", "[ads]", "[log]"] {
            assert!(example.contains(section), "missing {section}");
        }

        std::fs::write(&path, &example)?;
        let config = Config::load(&path)?;
        assert_eq!(config.homeserver(), "https://matrix.org");
        Ok(())
    }
}
