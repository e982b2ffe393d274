use std::env;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::domain::{Priority, StatusScheme};
use crate::error::{AppError, AppResult};
use crate::services::IdStrategy;
use crate::store::RatingPolicy;

const CONFIG_FILE_NAME: &str = "ticketdesk.json";
const CONFIG_PATH_VAR: &str = "TICKETDESK_CONFIG";

const SCHEME_VAR: &str = "TICKETDESK_SCHEME";
const RATING_POLICY_VAR: &str = "TICKETDESK_RATING_POLICY";
const IDS_VAR: &str = "TICKETDESK_IDS";
const PRIORITY_VAR: &str = "TICKETDESK_PRIORITY";

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AppConfig {
    pub status_scheme: StatusScheme,
    pub rating_policy: RatingPolicy,
    pub id_strategy: IdStrategy,
    pub track_priority: bool,
}

/// Values given on the command line; they win over everything else.
#[derive(Debug, Clone, Default)]
pub struct ConfigOverrides {
    pub scheme: Option<String>,
    pub rating_policy: Option<String>,
    pub ids: Option<String>,
    pub priority: Option<String>,
}

/// The on-disk shape of the config file.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoredConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scheme: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rating_policy: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ids: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub priority: Option<String>,
}

impl StoredConfig {
    /// A missing file is an empty config.
    pub fn load(path: &Path) -> AppResult<Self> {
        match fs::read_to_string(path) {
            Ok(contents) => serde_json::from_str(&contents).map_err(|err| {
                AppError::Configuration(format!("invalid config file {}: {err}", path.display()))
            }),
            Err(err) if err.kind() == io::ErrorKind::NotFound => Ok(Self::default()),
            Err(err) => Err(AppError::Io(err)),
        }
    }

    pub fn save(&self, path: &Path) -> AppResult<()> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)?;
        }
        let data = serde_json::to_string_pretty(self)
            .map_err(|err| AppError::Configuration(format!("failed to write config: {err}")))?;
        fs::write(path, data)?;
        Ok(())
    }
}

impl AppConfig {
    pub fn load(explicit_path: Option<&Path>, overrides: &ConfigOverrides) -> AppResult<Self> {
        Self::load_with(explicit_path, |key| env::var(key).ok(), overrides)
    }

    /// Like [`AppConfig::load`], reading variables through `env`.
    pub fn load_with<E>(
        explicit_path: Option<&Path>,
        env: E,
        overrides: &ConfigOverrides,
    ) -> AppResult<Self>
    where
        E: Fn(&str) -> Option<String>,
    {
        let path = locate_config(explicit_path, &env);
        let stored = StoredConfig::load(&path)?;
        Self::resolve(&stored, env, overrides)
    }

    /// Layers file values, then environment, then command-line overrides on
    /// top of the defaults.
    pub fn resolve<E>(stored: &StoredConfig, env: E, overrides: &ConfigOverrides) -> AppResult<Self>
    where
        E: Fn(&str) -> Option<String>,
    {
        let present = |value: Option<String>| value.filter(|v| !v.trim().is_empty());
        let pick = |cli: &Option<String>, var: &str, file: &Option<String>| {
            present(cli.clone())
                .or_else(|| present(env(var)))
                .or_else(|| present(file.clone()))
        };

        let mut config = Self::default();

        if let Some(value) = pick(&overrides.scheme, SCHEME_VAR, &stored.scheme) {
            config.status_scheme = StatusScheme::from_str(&value).ok_or_else(|| {
                AppError::Configuration(format!(
                    "unknown status scheme '{value}' (expected assistance or resolution)"
                ))
            })?;
        }
        if let Some(value) = pick(&overrides.rating_policy, RATING_POLICY_VAR, &stored.rating_policy)
        {
            config.rating_policy = RatingPolicy::from_str(&value).ok_or_else(|| {
                AppError::Configuration(format!(
                    "unknown rating policy '{value}' (expected terminal-only or lenient)"
                ))
            })?;
        }
        if let Some(value) = pick(&overrides.ids, IDS_VAR, &stored.ids) {
            config.id_strategy = IdStrategy::from_str(&value).ok_or_else(|| {
                AppError::Configuration(format!(
                    "unknown id strategy '{value}' (expected sequential, clock or uuid)"
                ))
            })?;
        }
        if let Some(value) = pick(&overrides.priority, PRIORITY_VAR, &stored.priority) {
            config.track_priority = parse_switch(&value).ok_or_else(|| {
                AppError::Configuration(format!("priority must be on or off, got '{value}'"))
            })?;
        }

        Ok(config)
    }

    pub fn default_priority(&self) -> Option<Priority> {
        self.track_priority.then_some(Priority::Medium)
    }
}

pub fn config_file_path(explicit_path: Option<&Path>) -> PathBuf {
    locate_config(explicit_path, |key| env::var(key).ok())
}

fn locate_config<E>(explicit_path: Option<&Path>, env: E) -> PathBuf
where
    E: Fn(&str) -> Option<String>,
{
    explicit_path
        .map(Path::to_path_buf)
        .or_else(|| {
            env(CONFIG_PATH_VAR)
                .filter(|value| !value.is_empty())
                .map(PathBuf::from)
        })
        .unwrap_or_else(|| PathBuf::from(CONFIG_FILE_NAME))
}

fn parse_switch(value: &str) -> Option<bool> {
    match value.trim().to_lowercase().as_str() {
        "on" | "true" | "yes" | "1" => Some(true),
        "off" | "false" | "no" | "0" => Some(false),
        _ => None,
    }
}
