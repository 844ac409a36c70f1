//! Common test utilities: fixture archives and a mock source host.

#![allow(dead_code)]

mod fixtures;

pub use fixtures::*;

use std::io::{Cursor, Write};
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// Build an in-memory zip with the given `(path, contents)` entries.
pub fn zip_bytes(entries: &[(&str, &str)]) -> Vec<u8> {
    let mut zip = zip::ZipWriter::new(Cursor::new(Vec::new()));
    let options = zip::write::SimpleFileOptions::default();
    for (name, content) in entries {
        zip.start_file(*name, options).unwrap();
        zip.write_all(content.as_bytes()).unwrap();
    }
    zip.finish().unwrap().into_inner()
}

/// Serve `body` at `/archive/{version}.zip` on a fresh mock host.
pub async fn serve_archive(version: &str, body: Vec<u8>) -> MockServer {
    let server = MockServer::start().await;
    mount_archive(&server, version, body).await;
    server
}

/// Add another archive to an existing mock host.
pub async fn mount_archive(server: &MockServer, version: &str, body: Vec<u8>) {
    Mock::given(method("GET"))
        .and(path(format!("/archive/{}.zip", version)))
        .respond_with(ResponseTemplate::new(200).set_body_bytes(body))
        .mount(server)
        .await;
}

/// Sorted file names directly inside `dir` (empty if `dir` is missing).
pub fn file_names(dir: &std::path::Path) -> Vec<String> {
    let Ok(entries) = std::fs::read_dir(dir) else {
        return Vec::new();
    };
    let mut names: Vec<String> = entries
        .filter_map(|e| e.ok())
        .map(|e| e.file_name().to_string_lossy().to_string())
        .collect();
    names.sort();
    names
}
