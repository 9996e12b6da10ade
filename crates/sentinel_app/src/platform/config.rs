use std::fs;
use std::io::ErrorKind;
use std::path::Path;
use std::time::Duration;

use anyhow::Context;
use log::LevelFilter;
use sentinel_bridge::OutboundSettings;
use serde::{Deserialize, Serialize};

pub(crate) const DEFAULT_CONFIG_FILE: &str = "sentinel.ron";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub(crate) enum LogDestination {
    /// Write to ./sentinel_overlay.log in the current directory.
    #[default]
    File,
    Terminal,
    Both,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub(crate) struct OverlayConfig {
    pub resource_name: String,
    /// Overrides `https://{resource_name}/` when set.
    pub base_url: Option<String>,
    pub request_timeout_ms: u64,
    pub connect_timeout_ms: u64,
    pub report_close_delay_ms: u64,
    pub log_destination: LogDestination,
    pub log_level: String,
}

impl Default for OverlayConfig {
    fn default() -> Self {
        Self {
            resource_name: "project-sentinel".to_string(),
            base_url: None,
            request_timeout_ms: 10_000,
            connect_timeout_ms: 3_000,
            report_close_delay_ms: 2_000,
            log_destination: LogDestination::default(),
            log_level: "info".to_string(),
        }
    }
}

impl OverlayConfig {
    pub fn outbound_settings(&self) -> OutboundSettings {
        let mut settings = OutboundSettings::for_resource(&self.resource_name);
        if let Some(base_url) = self.base_url.as_deref().filter(|url| !url.trim().is_empty()) {
            settings.base_url = base_url.to_string();
        }
        settings.request_timeout = Duration::from_millis(self.request_timeout_ms);
        settings.connect_timeout = Duration::from_millis(self.connect_timeout_ms);
        settings
    }

    pub fn report_close_delay(&self) -> Duration {
        Duration::from_millis(self.report_close_delay_ms)
    }

    pub fn level_filter(&self) -> LevelFilter {
        self.log_level.trim().parse().unwrap_or(LevelFilter::Info)
    }
}

/// Reads the config at `path`. `Ok(None)` when the file does not exist.
///
/// Runs before the logger is up, so problems are returned, not logged.
pub(crate) fn load(path: &Path) -> anyhow::Result<Option<OverlayConfig>> {
    let content = match fs::read_to_string(path) {
        Ok(text) => text,
        Err(err) if err.kind() == ErrorKind::NotFound => return Ok(None),
        Err(err) => {
            return Err(err).with_context(|| format!("failed to read config from {path:?}"))
        }
    };
    let config = ron::from_str(&content)
        .with_context(|| format!("failed to parse config from {path:?}"))?;
    Ok(Some(config))
}
