//! Shared helpers for driving the app router in-process
#![allow(dead_code)]

use std::fs;
use std::path::{Path, PathBuf};

use axum::body::Body;
use axum::http::{header, Request, Response};
use axum::Router;
use tempfile::TempDir;
use tower::ServiceExt;

use common::prelude::{FsJobRegistry, JobService, ToolInvoker};
use sealbox_daemon::http_server::{self, Config};
use sealbox_daemon::ServiceState;

const BOUNDARY: &str = "sealbox-test-boundary";

/// A stub encrypt_decrypt that reports what it was asked and drops a sidecar per file
pub const STUB_TOOL: &str = r#"echo "processing $1 in $2"
find "$2" -type f | while read -r f; do echo tag > "$f.lock"; done"#;

pub struct TestApp {
    pub router: Router,
    pub temp: TempDir,
}

impl TestApp {
    /// App backed by a working stub tool
    #[cfg(unix)]
    pub fn new() -> Self {
        Self::build(true)
    }

    /// App whose tool binary was never built
    pub fn without_tool() -> Self {
        Self::build(false)
    }

    fn build(with_tool: bool) -> Self {
        let temp = TempDir::new().unwrap();
        let project = temp.path().join("project");
        let jobs = temp.path().join("jobs");
        fs::create_dir_all(&project).unwrap();
        fs::create_dir_all(&jobs).unwrap();

        let tool_path = project.join("encrypt_decrypt");
        if with_tool {
            write_stub(&tool_path);
        }

        let tool = ToolInvoker::new(tool_path, project, 2);
        let service = JobService::new(FsJobRegistry::new(jobs.clone()), tool);
        let state = ServiceState::new(service, jobs);

        Self {
            router: http_server::router(Config::default(), state),
            temp,
        }
    }

    pub fn jobs_dir(&self) -> PathBuf {
        self.temp.path().join("jobs")
    }

    pub fn job_count(&self) -> usize {
        fs::read_dir(self.jobs_dir()).unwrap().count()
    }

    pub async fn send(&self, request: Request<Body>) -> Response<Body> {
        self.router.clone().oneshot(request).await.unwrap()
    }

    pub async fn get(&self, uri: &str) -> Response<Body> {
        self.send(Request::get(uri).body(Body::empty()).unwrap())
            .await
    }

    pub async fn post_form(&self, uri: &str, form: MultipartForm) -> Response<Body> {
        let (content_type, body) = form.finish();
        self.send(
            Request::post(uri)
                .header(header::CONTENT_TYPE, content_type)
                .body(Body::from(body))
                .unwrap(),
        )
        .await
    }
}

#[cfg(unix)]
fn write_stub(path: &Path) {
    use std::os::unix::fs::PermissionsExt;

    fs::write(path, format!("#!/bin/sh\n{}\n", STUB_TOOL)).unwrap();
    fs::set_permissions(path, fs::Permissions::from_mode(0o755)).unwrap();
}

#[cfg(not(unix))]
fn write_stub(path: &Path) {
    fs::write(path, b"").unwrap();
}

/// Hand-rolled multipart/form-data body
#[derive(Default)]
pub struct MultipartForm {
    body: Vec<u8>,
}

impl MultipartForm {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn text(mut self, name: &str, value: &str) -> Self {
        self.body.extend_from_slice(
            format!(
                "--{}\r\nContent-Disposition: form-data; name=\"{}\"\r\n\r\n{}\r\n",
                BOUNDARY, name, value
            )
            .as_bytes(),
        );
        self
    }

    pub fn file(mut self, name: &str, file_name: &str, data: &[u8]) -> Self {
        self.body.extend_from_slice(
            format!(
                "--{}\r\nContent-Disposition: form-data; name=\"{}\"; filename=\"{}\"\r\nContent-Type: application/octet-stream\r\n\r\n",
                BOUNDARY, name, file_name
            )
            .as_bytes(),
        );
        self.body.extend_from_slice(data);
        self.body.extend_from_slice(b"\r\n");
        self
    }

    pub fn finish(mut self) -> (String, Vec<u8>) {
        self.body
            .extend_from_slice(format!("--{}--\r\n", BOUNDARY).as_bytes());
        (
            format!("multipart/form-data; boundary={}", BOUNDARY),
            self.body,
        )
    }
}

/// The two-file upload used across tests: 12 + 30 bytes, one nested
pub fn sample_form(action: &str) -> MultipartForm {
    MultipartForm::new()
        .text("action", action)
        .text("password", "hunter2")
        .file("files", "notes.txt", b"hello world!")
        .text("relpaths", "notes.txt")
        .file("files", "readme.md", b"a readme of exactly 30 bytes..")
        .text("relpaths", "docs/readme.md")
}

pub async fn body_bytes(response: Response<Body>) -> Vec<u8> {
    axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap()
        .to_vec()
}

pub async fn body_text(response: Response<Body>) -> String {
    String::from_utf8(body_bytes(response).await).unwrap()
}

pub fn location(response: &Response<Body>) -> String {
    response.headers()[header::LOCATION]
        .to_str()
        .unwrap()
        .to_string()
}
