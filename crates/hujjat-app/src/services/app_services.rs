// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Central service layer. Loads configuration, picks the converters, and owns
// the session machine every front end feeds events into.

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use hujjat_cloud::CloudConvertClient;
use hujjat_core::AppConfig;
use hujjat_core::error::Result;
use hujjat_document::{ConverterSet, Pipeline, WordToPdfConverter};
use hujjat_session::{SessionMachine, SessionStore};
use tracing::{debug, info, warn};

use super::data_dir;

const CONFIG_FILE: &str = "config.json";

/// How often idle sessions are looked for.
const SWEEP_INTERVAL: Duration = Duration::from_secs(60);

/// Shared application services. Cheap to clone.
#[derive(Clone)]
pub struct AppServices {
    machine: Arc<SessionMachine>,
    config: AppConfig,
    data_dir: PathBuf,
}

impl AppServices {
    /// Initialise all services from the data directory. Call once at startup.
    pub fn init() -> Result<Self> {
        let dir = data_dir::data_dir();
        info!(path = %dir.display(), "initialising app services");
        Self::from_data_dir(dir, |key| std::env::var(key).ok())
    }

    /// Build services rooted at `dir`, with `env` as the override source.
    pub fn from_data_dir(dir: PathBuf, env: impl Fn(&str) -> Option<String>) -> Result<Self> {
        // Defaults are written out on first run so there is a file to edit.
        // Environment overrides are applied afterwards and never persisted.
        let mut config = load_config(&dir).unwrap_or_default();
        if !dir.join(CONFIG_FILE).exists()
            && let Err(e) = persist_config(&dir, &config)
        {
            warn!(error = %e, "could not write default config");
        }
        config.apply_overrides(env);

        let converters = ConverterSet::from_config(&config, remote_converter(&config));
        let scratch_root = config.temp_dir.clone();
        let upload_root = scratch_root.as_ref().map(|root| root.join("uploads"));
        let pipeline = Pipeline::new(converters, scratch_root);
        let machine = SessionMachine::new(pipeline, SessionStore::new(), upload_root);

        info!("app services initialised");
        Ok(Self {
            machine: Arc::new(machine),
            config,
            data_dir: dir,
        })
    }

    pub fn machine(&self) -> &SessionMachine {
        &self.machine
    }

    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    pub fn data_dir(&self) -> &Path {
        &self.data_dir
    }

    /// Periodically drop sessions idle longer than the configured timeout.
    pub fn spawn_session_sweeper(&self) -> tokio::task::JoinHandle<()> {
        let store = self.machine.store().clone();
        let max_age = Duration::from_secs(self.config.session_idle_timeout_secs);
        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(SWEEP_INTERVAL);
            loop {
                ticker.tick().await;
                let swept = store.sweep_idle(max_age);
                debug!(swept, active = store.len(), "session sweep");
            }
        })
    }
}

/// The CloudConvert client, when an API key is configured.
fn remote_converter(config: &AppConfig) -> Option<Arc<dyn WordToPdfConverter>> {
    if !config.cloud_convert.is_configured() {
        return None;
    }
    match CloudConvertClient::new(config.cloud_convert.clone()) {
        Ok(client) => Some(Arc::new(client)),
        Err(e) => {
            warn!(error = %e, "CloudConvert unavailable, using local conversion");
            None
        }
    }
}

fn load_config(data_dir: &Path) -> Option<AppConfig> {
    let path = data_dir.join(CONFIG_FILE);
    let data = std::fs::read_to_string(&path).ok()?;
    match serde_json::from_str(&data) {
        Ok(config) => Some(config),
        Err(e) => {
            warn!(path = %path.display(), error = %e, "ignoring unreadable config");
            None
        }
    }
}

fn persist_config(data_dir: &Path, config: &AppConfig) -> Result<()> {
    std::fs::create_dir_all(data_dir)?;
    let path = data_dir.join(CONFIG_FILE);
    let json = serde_json::to_string_pretty(config)?;
    std::fs::write(&path, json)?;
    Ok(())
}
