#![cfg(unix)]

use std::time::Duration;

use sealbox_daemon::{serve, ServeError, ServiceConfig};
use tempfile::TempDir;

fn config_on_port(temp: &TempDir, app_port: u16) -> ServiceConfig {
    ServiceConfig {
        app_port,
        max_upload_size: 1024 * 1024,
        jobs_dir: temp.path().join("jobs"),
        tool_path: temp.path().join("encrypt_decrypt"),
        project_root: temp.path().to_path_buf(),
        max_concurrent_jobs: 1,
        log_level: tracing::Level::WARN,
        log_dir: None,
    }
}

#[tokio::test]
async fn test_serve_stops_with_an_error_when_the_port_is_taken() {
    let temp = TempDir::new().unwrap();
    let taken = std::net::TcpListener::bind("0.0.0.0:0").unwrap();
    let port = taken.local_addr().unwrap().port();

    let result = tokio::time::timeout(Duration::from_secs(10), serve(&config_on_port(&temp, port)))
        .await
        .expect("serve should return on its own when it cannot bind");

    assert!(matches!(result, Err(ServeError::Server(_))), "got {:?}", result);
    // state was set up before the bind failed
    assert!(temp.path().join("jobs").is_dir());
}
