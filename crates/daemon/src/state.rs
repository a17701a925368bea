use std::{fs, path::PathBuf};

use serde::{Deserialize, Serialize};

pub const APP_NAME: &str = "sealbox";
pub const CONFIG_FILE_NAME: &str = "config.toml";
pub const JOBS_DIR_NAME: &str = "jobs";
pub const TOOL_BINARY_NAME: &str = "encrypt_decrypt";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AppConfig {
    /// Port for the app server (upload UI + API)
    #[serde(default = "default_app_port")]
    pub app_port: u16,
    /// Where job workspaces live (defaults to <state dir>/jobs)
    #[serde(default)]
    pub jobs_dir: Option<PathBuf>,
    /// The external encrypt/decrypt binary
    pub tool_path: PathBuf,
    /// Working directory the tool runs in, so it finds its own `.env`
    pub project_root: PathBuf,
    /// Upper bound on tool invocations running at once
    #[serde(default = "default_max_concurrent_jobs")]
    pub max_concurrent_jobs: usize,
    /// Request body limit for uploads, in megabytes
    #[serde(default = "default_max_upload_size_mb")]
    pub max_upload_size_mb: usize,
    /// Default log level for the daemon; `RUST_LOG` still overrides it
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

fn default_app_port() -> u16 {
    5057
}

fn default_max_concurrent_jobs() -> usize {
    4
}

fn default_max_upload_size_mb() -> usize {
    500
}

fn default_log_level() -> String {
    "info".to_string()
}

impl AppConfig {
    /// Default config for a project checkout at `project_root`
    pub fn for_project(project_root: PathBuf) -> Self {
        Self {
            app_port: default_app_port(),
            jobs_dir: None,
            tool_path: project_root.join(TOOL_BINARY_NAME),
            project_root,
            max_concurrent_jobs: default_max_concurrent_jobs(),
            max_upload_size_mb: default_max_upload_size_mb(),
            log_level: default_log_level(),
        }
    }

    /// The configured log level, parsed
    pub fn log_level(&self) -> Result<tracing::Level, StateError> {
        self.log_level
            .trim()
            .parse()
            .map_err(|_| StateError::InvalidLogLevel(self.log_level.clone()))
    }
}

#[derive(Debug, Clone)]
pub struct AppState {
    /// Path to the state directory (~/.sealbox)
    pub state_dir: PathBuf,
    /// Path to the directory holding job workspaces
    pub jobs_dir: PathBuf,
    /// Path to the config file
    pub config_path: PathBuf,
    /// Loaded configuration
    pub config: AppConfig,
}

impl AppState {
    /// Get the state directory path (custom or default ~/.sealbox)
    pub fn state_dir(custom_path: Option<PathBuf>) -> Result<PathBuf, StateError> {
        if let Some(path) = custom_path {
            return Ok(path);
        }

        let home = dirs::home_dir().ok_or(StateError::NoHomeDirectory)?;
        Ok(home.join(format!(".{}", APP_NAME)))
    }

    /// Initialize a new state directory
    pub fn init(custom_path: Option<PathBuf>, config: AppConfig) -> Result<Self, StateError> {
        let state_dir = Self::state_dir(custom_path)?;

        if state_dir.exists() {
            return Err(StateError::AlreadyInitialized);
        }

        fs::create_dir_all(&state_dir)?;

        let jobs_dir = Self::resolve_jobs_dir(&state_dir, &config);
        fs::create_dir_all(&jobs_dir)?;

        let config_path = state_dir.join(CONFIG_FILE_NAME);
        let config_toml = toml::to_string_pretty(&config)?;
        fs::write(&config_path, config_toml)?;

        Ok(Self {
            state_dir,
            jobs_dir,
            config_path,
            config,
        })
    }

    /// Load existing state from the state directory
    pub fn load(custom_path: Option<PathBuf>) -> Result<Self, StateError> {
        let state_dir = Self::state_dir(custom_path)?;

        if !state_dir.exists() {
            return Err(StateError::NotInitialized);
        }

        let config_path = state_dir.join(CONFIG_FILE_NAME);
        if !config_path.exists() {
            return Err(StateError::MissingFile(CONFIG_FILE_NAME.to_string()));
        }

        let config_toml = fs::read_to_string(&config_path)?;
        let config: AppConfig = toml::from_str(&config_toml)?;
        let jobs_dir = Self::resolve_jobs_dir(&state_dir, &config);

        Ok(Self {
            state_dir,
            jobs_dir,
            config_path,
            config,
        })
    }

    fn resolve_jobs_dir(state_dir: &std::path::Path, config: &AppConfig) -> PathBuf {
        config
            .jobs_dir
            .clone()
            .unwrap_or_else(|| state_dir.join(JOBS_DIR_NAME))
    }
}

#[derive(Debug, thiserror::Error)]
pub enum StateError {
    #[error("sealbox directory not initialized. Run 'sealbox init' first")]
    NotInitialized,

    #[error("sealbox directory already initialized")]
    AlreadyInitialized,

    #[error("no home directory found")]
    NoHomeDirectory,

    #[error("invalid log_level {0:?}, expected one of trace, debug, info, warn, error")]
    InvalidLogLevel(String),

    #[error("missing required file: {0}")]
    MissingFile(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("TOML serialization error: {0}")]
    TomlSer(#[from] toml::ser::Error),

    #[error("TOML deserialization error: {0}")]
    TomlDe(#[from] toml::de::Error),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_init_then_load() {
        let temp = tempfile::TempDir::new().unwrap();
        let state_dir = temp.path().join("state");
        let config = AppConfig::for_project(temp.path().join("project"));

        let state = AppState::init(Some(state_dir.clone()), config.clone()).unwrap();
        assert_eq!(state.jobs_dir, state_dir.join(JOBS_DIR_NAME));
        assert!(state.jobs_dir.is_dir());

        let loaded = AppState::load(Some(state_dir)).unwrap();
        assert_eq!(loaded.config, config);
        assert_eq!(loaded.jobs_dir, state.jobs_dir);
        assert_eq!(
            loaded.config.tool_path,
            temp.path().join("project").join("encrypt_decrypt")
        );
    }

    #[test]
    fn test_init_refuses_to_overwrite() {
        let temp = tempfile::TempDir::new().unwrap();
        let config = AppConfig::for_project(temp.path().to_path_buf());
        AppState::init(Some(temp.path().join("state")), config.clone()).unwrap();

        let err = AppState::init(Some(temp.path().join("state")), config).unwrap_err();
        assert!(matches!(err, StateError::AlreadyInitialized));
    }

    #[test]
    fn test_load_errors() {
        let temp = tempfile::TempDir::new().unwrap();
        let err = AppState::load(Some(temp.path().join("missing"))).unwrap_err();
        assert!(matches!(err, StateError::NotInitialized));

        let err = AppState::load(Some(temp.path().to_path_buf())).unwrap_err();
        assert!(matches!(err, StateError::MissingFile(_)));
    }

    #[test]
    fn test_defaults_fill_missing_keys() {
        let temp = tempfile::TempDir::new().unwrap();
        fs::write(
            temp.path().join(CONFIG_FILE_NAME),
            "tool_path = \"/opt/tool\"\nproject_root = \"/opt\"\njobs_dir = \"/var/jobs\"\n",
        )
        .unwrap();

        let state = AppState::load(Some(temp.path().to_path_buf())).unwrap();
        assert_eq!(state.config.app_port, 5057);
        assert_eq!(state.config.max_concurrent_jobs, 4);
        assert_eq!(state.config.max_upload_size_mb, 500);
        assert_eq!(state.config.log_level().unwrap(), tracing::Level::INFO);
        assert_eq!(state.jobs_dir, PathBuf::from("/var/jobs"));
    }

    #[test]
    fn test_log_level_from_config() {
        let temp = tempfile::TempDir::new().unwrap();
        let mut config = AppConfig::for_project(temp.path().to_path_buf());

        config.log_level = "debug".to_string();
        assert_eq!(config.log_level().unwrap(), tracing::Level::DEBUG);

        config.log_level = "chatty".to_string();
        assert!(matches!(
            config.log_level().unwrap_err(),
            StateError::InvalidLogLevel(level) if level == "chatty"
        ));
    }
}
