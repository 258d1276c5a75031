use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracker_core::{PollSchedule, TrackerSettings, DEFAULT_LOG_SOURCE};
use tracker_engine::ApiSettings;
use tracker_logging::tracker_info;

pub const CONFIG_FILENAME: &str = "upload-tracker.ron";

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read config {path:?}: {source}")]
    Read { path: PathBuf, source: io::Error },
    #[error("failed to parse config {path:?}: {message}")]
    Parse { path: PathBuf, message: String },
    #[error("invalid config: {0}")]
    Invalid(String),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct AppConfig {
    pub api: ApiConfig,
    pub schedule: ScheduleConfig,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ApiConfig {
    /// Base for `/progress`, `/check-processed` and `/upload`.
    pub base_url: Option<String>,
    pub status_url: Option<String>,
    pub result_url: Option<String>,
    pub upload_url: Option<String>,
    pub connect_timeout_secs: u64,
    pub request_timeout_secs: u64,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: None,
            status_url: None,
            result_url: None,
            upload_url: None,
            connect_timeout_secs: 10,
            request_timeout_secs: 30,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScheduleConfig {
    pub status_delay_secs: u64,
    pub status_interval_secs: u64,
    pub result_delay_secs: u64,
    pub result_interval_secs: u64,
    pub deadline_secs: u64,
    pub log_source: String,
}

impl Default for ScheduleConfig {
    fn default() -> Self {
        Self {
            status_delay_secs: 30,
            status_interval_secs: 15,
            result_delay_secs: 20,
            result_interval_secs: 10,
            deadline_secs: 600,
            log_source: DEFAULT_LOG_SOURCE.to_string(),
        }
    }
}

/// Load the config file. An explicit path must exist; the default
/// `./upload-tracker.ron` falls back to defaults when missing.
pub fn load_config(path: Option<&Path>) -> Result<AppConfig, ConfigError> {
    let (path, required) = match path {
        Some(path) => (path.to_path_buf(), true),
        None => (PathBuf::from(CONFIG_FILENAME), false),
    };
    let content = match fs::read_to_string(&path) {
        Ok(text) => text,
        Err(err) if err.kind() == io::ErrorKind::NotFound && !required => {
            return Ok(AppConfig::default());
        }
        Err(source) => return Err(ConfigError::Read { path, source }),
    };

    let config = ron::from_str(&content).map_err(|err| ConfigError::Parse {
        path: path.clone(),
        message: err.to_string(),
    })?;
    tracker_info!("Loaded config from {:?}", path);
    Ok(config)
}

impl AppConfig {
    /// Endpoint settings; `base_url_override` wins over the file's base URL,
    /// explicit per-endpoint URLs win over both.
    pub fn api_settings(
        &self,
        base_url_override: Option<&str>,
    ) -> Result<ApiSettings, ConfigError> {
        let api = &self.api;
        if api.connect_timeout_secs == 0 || api.request_timeout_secs == 0 {
            return Err(ConfigError::Invalid(
                "request timeouts must be at least one second".into(),
            ));
        }
        let mut settings = match base_url_override.or(api.base_url.as_deref()) {
            Some(base) => ApiSettings::with_base_url(base),
            None => ApiSettings::default(),
        };
        if let Some(url) = &api.status_url {
            settings.status_url = url.clone();
        }
        if let Some(url) = &api.result_url {
            settings.result_url = url.clone();
        }
        if let Some(url) = &api.upload_url {
            settings.upload_url = url.clone();
        }
        settings.connect_timeout = Duration::from_secs(api.connect_timeout_secs);
        settings.request_timeout = Duration::from_secs(api.request_timeout_secs);
        Ok(settings)
    }

    pub fn tracker_settings(&self) -> Result<TrackerSettings, ConfigError> {
        let schedule = &self.schedule;
        if schedule.status_interval_secs == 0 || schedule.result_interval_secs == 0 {
            return Err(ConfigError::Invalid(
                "poll intervals must be at least one second".into(),
            ));
        }
        if schedule.deadline_secs == 0 {
            return Err(ConfigError::Invalid("deadline must be positive".into()));
        }
        Ok(TrackerSettings {
            status: PollSchedule::from_secs(
                schedule.status_delay_secs,
                schedule.status_interval_secs,
            ),
            result: PollSchedule::from_secs(
                schedule.result_delay_secs,
                schedule.result_interval_secs,
            ),
            deadline: Duration::from_secs(schedule.deadline_secs),
            log_source: schedule.log_source.clone(),
        })
    }
}
