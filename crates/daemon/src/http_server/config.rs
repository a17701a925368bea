use std::net::SocketAddr;

/// Maximum upload size in bytes (500 MB)
pub const MAX_UPLOAD_SIZE_BYTES: usize = 500 * 1024 * 1024;

#[derive(Debug, Clone)]
pub struct Config {
    // Listen address
    pub listen_addr: SocketAddr,
    // log level for http tracing
    pub log_level: tracing::Level,
    // request body limit, covers the whole multipart upload
    pub max_upload_size: usize,
}

impl Config {
    pub fn new(listen_addr: SocketAddr, max_upload_size: usize) -> Self {
        tracing::info!(
            "Creating HTTP server Config: listen_addr={}, max_upload_size={}",
            listen_addr,
            max_upload_size
        );
        Self {
            listen_addr,
            log_level: tracing::Level::INFO,
            max_upload_size,
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            listen_addr: SocketAddr::from(([127, 0, 0, 1], 5057)),
            log_level: tracing::Level::INFO,
            max_upload_size: MAX_UPLOAD_SIZE_BYTES,
        }
    }
}
