use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::Deserialize;

use crate::error::{AppError, AppResult};

#[derive(Debug, Clone, Deserialize, PartialEq, Default)]
#[serde(default)]
pub struct Config {
    pub tour: TourConfig,
    pub ui: UiConfig,
    pub log: LogConfig,
}

#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(default)]
pub struct TourConfig {
    pub resolve_timeout_ms: u64,
    pub scroll_settle_ms: u64,
    pub highlight_inset: f64,
    pub highlight_padding: f64,
}

impl Default for TourConfig {
    fn default() -> Self {
        Self {
            resolve_timeout_ms: 15_000,
            scroll_settle_ms: 1_000,
            highlight_inset: 5.0,
            highlight_padding: 10.0,
        }
    }
}

impl TourConfig {
    pub fn resolve_timeout(&self) -> Duration {
        Duration::from_millis(self.resolve_timeout_ms)
    }

    pub fn scroll_settle(&self) -> Duration {
        Duration::from_millis(self.scroll_settle_ms)
    }
}

#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct UiConfig {
    pub popover_max_width: u16,
    pub input_poll_timeout_ms: u64,
    pub show_hints: bool,
    /// `default` or `vim`.
    pub keymap: String,
}

impl Default for UiConfig {
    fn default() -> Self {
        Self {
            popover_max_width: 44,
            input_poll_timeout_ms: 16,
            show_hints: true,
            keymap: "default".to_string(),
        }
    }
}

#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct LogConfig {
    pub file: Option<PathBuf>,
    pub filter: String,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            file: None,
            filter: "info".to_string(),
        }
    }
}

impl Config {
    pub fn load() -> AppResult<Self> {
        let Some(path) = default_config_path() else {
            return Ok(Self::default());
        };
        Self::load_from_path(path)
    }

    pub fn load_from_path(path: impl AsRef<Path>) -> AppResult<Self> {
        let path = path.as_ref();
        if !path.exists() {
            return Ok(Self::default());
        }
        if !path.is_file() {
            return Err(AppError::invalid_argument(format!(
                "config path is not a regular file: {}",
                path.display()
            )));
        }

        let raw = fs::read_to_string(path).map_err(|source| {
            AppError::io_with_context(source, format!("failed to read config: {}", path.display()))
        })?;
        let parsed = toml::from_str::<Self>(&raw).map_err(|source| {
            AppError::invalid_argument(format!(
                "failed to parse config {}: {source}",
                path.display()
            ))
        })?;
        Ok(parsed.sanitized())
    }

    fn sanitized(mut self) -> Self {
        let defaults = TourConfig::default();
        self.tour.resolve_timeout_ms = self.tour.resolve_timeout_ms.max(1);
        self.tour.scroll_settle_ms = self.tour.scroll_settle_ms.max(1);
        if !self.tour.highlight_inset.is_finite() || self.tour.highlight_inset < 0.0 {
            self.tour.highlight_inset = defaults.highlight_inset;
        }
        if !self.tour.highlight_padding.is_finite() || self.tour.highlight_padding < 0.0 {
            self.tour.highlight_padding = defaults.highlight_padding;
        }
        self.ui.popover_max_width = self.ui.popover_max_width.max(12);
        self.ui.input_poll_timeout_ms = self.ui.input_poll_timeout_ms.max(1);
        if self.log.filter.trim().is_empty() {
            self.log.filter = LogConfig::default().filter;
        }
        self
    }
}

pub fn default_config_path() -> Option<PathBuf> {
    if let Some(explicit) = std::env::var_os("GTOUR_CONFIG_PATH")
        && !explicit.is_empty()
    {
        return Some(PathBuf::from(explicit));
    }

    if let Some(xdg) = std::env::var_os("XDG_CONFIG_HOME")
        && !xdg.is_empty()
    {
        return Some(PathBuf::from(xdg).join("gtour").join("config.toml"));
    }
    if let Some(home) = std::env::var_os("HOME")
        && !home.is_empty()
    {
        return Some(
            PathBuf::from(home)
                .join(".config")
                .join("gtour")
                .join("config.toml"),
        );
    }
    if let Some(appdata) = std::env::var_os("APPDATA")
        && !appdata.is_empty()
    {
        return Some(PathBuf::from(appdata).join("gtour").join("config.toml"));
    }
    None
}

#[cfg(test)]
mod tests {
    use std::fs;
    use std::path::PathBuf;
    use std::process;
    use std::time::{Duration, SystemTime, UNIX_EPOCH};

    use super::Config;

    fn unique_temp_path(suffix: &str) -> PathBuf {
        let nanos = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .expect("clock should be after unix epoch")
            .as_nanos();
        let mut path = std::env::temp_dir();
        path.push(format!("gtour_config_{suffix}_{}_{}", process::id(), nanos));
        path
    }

    #[test]
    fn load_from_path_returns_defaults_for_missing_file() {
        let missing = unique_temp_path("missing.toml");
        let config = Config::load_from_path(&missing).expect("missing config should fallback");
        assert_eq!(config, Config::default());
        assert_eq!(config.tour.resolve_timeout(), Duration::from_secs(15));
        assert_eq!(config.tour.scroll_settle(), Duration::from_secs(1));
    }

    #[test]
    fn load_from_path_applies_partial_overrides_and_sanitizes() {
        let path = unique_temp_path("custom.toml");
        fs::write(
            &path,
            r#"
            [tour]
            resolve_timeout_ms = 0
            scroll_settle_ms = 250
            highlight_inset = -3.0

            [ui]
            popover_max_width = 2

            [log]
            filter = "  "
            file = "/tmp/gtour.log"
            "#,
        )
        .expect("config file should be written");

        let config = Config::load_from_path(&path).expect("config should parse");
        assert_eq!(config.tour.resolve_timeout_ms, 1);
        assert_eq!(config.tour.scroll_settle_ms, 250);
        assert_eq!(config.tour.highlight_inset, 5.0);
        assert_eq!(config.tour.highlight_padding, 10.0);
        assert_eq!(config.ui.popover_max_width, 12);
        assert_eq!(config.ui.input_poll_timeout_ms, 16);
        assert_eq!(config.log.filter, "info");
        assert_eq!(config.log.file, Some(PathBuf::from("/tmp/gtour.log")));

        fs::remove_file(&path).expect("config file should be removed");
    }

    #[test]
    fn load_from_path_rejects_malformed_toml() {
        let path = unique_temp_path("broken.toml");
        fs::write(&path, "[tour\nresolve_timeout_ms = ").expect("config file should be written");

        assert!(Config::load_from_path(&path).is_err());

        fs::remove_file(&path).expect("config file should be removed");
    }
}
