use crate::error::{AppError, Result};
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};

pub const DEFAULT_ENDPOINT: &str = "http://127.0.0.1:8000/questions";

pub const DEFAULT_SUBJECTS: [&str; 10] = [
    "Portugues",
    "Matematica",
    "Fisica",
    "Quimica",
    "Biologia",
    "Ingles",
    "Historia",
    "Geografia",
    "Filosofia",
    "Sociologia",
];

fn home_dir() -> PathBuf {
    std::env::var_os("HOME")
        .map(PathBuf::from)
        .or_else(|| std::env::var_os("USERPROFILE").map(PathBuf::from))
        .unwrap_or_else(|| PathBuf::from("."))
}

pub fn app_dir() -> PathBuf {
    home_dir().join(".exam-tagger")
}

pub fn default_config_path() -> PathBuf {
    app_dir().join("config.toml")
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    pub endpoint: String,
    pub subjects: Vec<String>,
    pub request_timeout_secs: u64,
    /// Pictures narrower or shorter than this are treated as decoration.
    pub min_picture_side: u32,
    pub export_dir: PathBuf,
    pub log_dir: Option<PathBuf>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            endpoint: DEFAULT_ENDPOINT.to_string(),
            subjects: DEFAULT_SUBJECTS.iter().map(|s| s.to_string()).collect(),
            request_timeout_secs: 30,
            min_picture_side: 16,
            export_dir: app_dir().join("exports"),
            log_dir: None,
        }
    }
}

impl Config {
    /// Loads `explicit` when given (the file must exist), otherwise the default
    /// config file if present, otherwise built-in defaults.
    pub fn load(explicit: Option<&Path>) -> Result<Self> {
        let config = match explicit {
            Some(path) => Self::from_file(path)?,
            None => {
                let path = default_config_path();
                if path.exists() {
                    Self::from_file(&path)?
                } else {
                    Self::default()
                }
            }
        };
        config.validate()?;
        Ok(config)
    }

    fn from_file(path: &Path) -> Result<Self> {
        let raw = fs::read_to_string(path).map_err(|err| {
            AppError::Config(format!("failed to read {}: {err}", path.display()))
        })?;
        Self::from_toml(&raw)
    }

    pub fn from_toml(raw: &str) -> Result<Self> {
        Ok(toml::from_str(raw)?)
    }

    pub fn with_overrides(mut self, endpoint: Option<String>, log_dir: Option<PathBuf>) -> Result<Self> {
        if let Some(endpoint) = endpoint {
            self.endpoint = endpoint;
        }
        if log_dir.is_some() {
            self.log_dir = log_dir;
        }
        self.validate()?;
        Ok(self)
    }

    pub fn validate(&self) -> Result<()> {
        if self.endpoint.trim().is_empty() {
            return Err(AppError::Config("endpoint must not be empty".to_string()));
        }
        if !self.endpoint.starts_with("http://") && !self.endpoint.starts_with("https://") {
            return Err(AppError::Config(format!(
                "endpoint must be an http(s) url: {}",
                self.endpoint
            )));
        }
        if self.request_timeout_secs == 0 {
            return Err(AppError::Config(
                "request_timeout_secs must be greater than zero".to_string(),
            ));
        }
        if self.subjects.is_empty() {
            return Err(AppError::Config("subjects must not be empty".to_string()));
        }
        Ok(())
    }
}
