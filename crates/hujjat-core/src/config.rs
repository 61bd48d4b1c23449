// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Application configuration.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// Environment variable holding the CloudConvert API key.
pub const ENV_CLOUD_CONVERT_API_KEY: &str = "CLOUD_CONVERT_API_KEY";
/// Environment variable pointing at a LibreOffice `soffice` binary.
pub const ENV_OFFICE_BINARY: &str = "HUJJAT_OFFICE_BINARY";
/// Environment variable overriding the scratch root directory.
pub const ENV_TEMP_DIR: &str = "HUJJAT_TEMP_DIR";

/// Settings for the remote job-based Word → PDF converter.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CloudConvertConfig {
    /// API key; `None` disables the remote converter entirely.
    pub api_key: Option<String>,
    /// Base URL of the v2 API.
    pub base_url: String,
    /// Timeout for each individual HTTP request.
    pub request_timeout_secs: u64,
    /// Upper bound on the whole submit → wait → download round trip.
    pub job_timeout_secs: u64,
}

impl Default for CloudConvertConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            base_url: "https://api.cloudconvert.com/v2".into(),
            request_timeout_secs: 60,
            job_timeout_secs: 300,
        }
    }
}

impl CloudConvertConfig {
    /// Whether a non-empty API key is present.
    pub fn is_configured(&self) -> bool {
        self.api_key.as_deref().is_some_and(|k| !k.trim().is_empty())
    }
}

/// Persistent application settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub cloud_convert: CloudConvertConfig,
    /// LibreOffice `soffice` binary used for local conversions, if installed.
    pub office_binary: Option<PathBuf>,
    /// Root directory for scratch and pending artifacts (system temp if unset).
    pub temp_dir: Option<PathBuf>,
    /// Page size for the built-in Word → PDF renderer.
    pub paper_size: crate::PaperSize,
    /// Sessions idle for longer than this are swept and their files released.
    pub session_idle_timeout_secs: u64,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            cloud_convert: CloudConvertConfig::default(),
            office_binary: None,
            temp_dir: None,
            paper_size: crate::PaperSize::A4,
            session_idle_timeout_secs: 3600,
        }
    }
}

impl AppConfig {
    /// Apply overrides from an arbitrary lookup (the environment in production).
    pub fn apply_overrides(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        if let Some(key) = lookup(ENV_CLOUD_CONVERT_API_KEY).filter(|k| !k.trim().is_empty()) {
            self.cloud_convert.api_key = Some(key);
        }
        if let Some(bin) = lookup(ENV_OFFICE_BINARY).filter(|b| !b.is_empty()) {
            self.office_binary = Some(PathBuf::from(bin));
        }
        if let Some(dir) = lookup(ENV_TEMP_DIR).filter(|d| !d.is_empty()) {
            self.temp_dir = Some(PathBuf::from(dir));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partial_json_falls_back_to_defaults() {
        let config: AppConfig =
            serde_json::from_str(r#"{ "cloud_convert": { "api_key": "abc" } }"#).unwrap();
        assert!(config.cloud_convert.is_configured());
        assert_eq!(config.cloud_convert.job_timeout_secs, 300);
        assert_eq!(config.session_idle_timeout_secs, 3600);
    }

    #[test]
    fn env_overrides_take_precedence() {
        let mut config = AppConfig::default();
        config.apply_overrides(|key| match key {
            ENV_CLOUD_CONVERT_API_KEY => Some("secret".into()),
            ENV_OFFICE_BINARY => Some("/usr/bin/soffice".into()),
            _ => None,
        });
        assert_eq!(config.cloud_convert.api_key.as_deref(), Some("secret"));
        assert_eq!(config.office_binary, Some(PathBuf::from("/usr/bin/soffice")));
        assert!(config.temp_dir.is_none());
    }

    #[test]
    fn blank_api_key_is_not_configured() {
        let mut config = AppConfig::default();
        config.cloud_convert.api_key = Some("  ".into());
        assert!(!config.cloud_convert.is_configured());
    }
}
