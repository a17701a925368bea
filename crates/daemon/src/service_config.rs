use std::path::PathBuf;

#[derive(Debug, Clone)]
pub struct Config {
    // http server configuration
    /// Port for the app server (upload UI + API)
    pub app_port: u16,
    /// Request body limit, in bytes
    pub max_upload_size: usize,

    // job configuration
    /// Directory holding one workspace per job
    pub jobs_dir: PathBuf,
    /// The external encrypt/decrypt binary
    pub tool_path: PathBuf,
    /// Working directory for tool invocations
    pub project_root: PathBuf,
    /// How many tool invocations may run at once
    pub max_concurrent_jobs: usize,

    // logging
    pub log_level: tracing::Level,
    /// Directory for log files (optional, logs to stdout only if not set)
    pub log_dir: Option<PathBuf>,
}
