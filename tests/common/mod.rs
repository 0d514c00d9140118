// File: common/mod.rs
// SPDX-License-Identifier: MIT OR Apache-2.0
//
// Copyright (c) 2025-2026
// - Volker Schwaberow <volker@schwaberow.de>

#![allow(dead_code)]

use feedhound::config::Config;
use feedhound::ledger::HistoryRecord;
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

pub struct FeedEntry {
    pub title: String,
    pub link: Option<String>,
    pub enclosure: Option<String>,
}

impl FeedEntry {
    pub fn new(title: &str, link: &str, enclosure: &str) -> Self {
        Self {
            title: title.to_string(),
            link: Some(link.to_string()),
            enclosure: Some(enclosure.to_string()),
        }
    }
}

pub fn rss_document(entries: &[FeedEntry]) -> String {
    let mut items = String::new();
    for entry in entries {
        items.push_str("    <item>\n");
        items.push_str(&format!("      <title>{}</title>\n", entry.title));
        if let Some(link) = &entry.link {
            items.push_str(&format!("      <link>{}</link>\n", link));
        }
        if let Some(enclosure) = &entry.enclosure {
            items.push_str(&format!(
                "      <enclosure url=\"{}\" length=\"0\" type=\"application/x-bittorrent\"/>\n",
                enclosure
            ));
        }
        items.push_str("    </item>\n");
    }

    format!(
        r#"<?xml version="1.0" encoding="UTF-8"?>
<rss version="2.0">
  <channel>
    <title>Test releases</title>
    <link>http://example.com/</link>
    <description>fixtures</description>
{}  </channel>
</rss>
"#,
        items
    )
}

pub async fn serve_feed(server: &MockServer, route: &str, entries: &[FeedEntry]) {
    Mock::given(method("GET"))
        .and(path(route))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_string(rss_document(entries))
                .append_header("content-type", "application/rss+xml"),
        )
        .mount(server)
        .await;
}

pub async fn serve_torrent(server: &MockServer, route: &str, body: &[u8], expected_hits: u64) {
    Mock::given(method("GET"))
        .and(path(route))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_bytes(body.to_vec())
                .append_header("content-type", "application/x-bittorrent"),
        )
        .expect(expected_hits)
        .mount(server)
        .await;
}

/// A scratch installation: download directory, history, log and config file
/// inside one temporary directory.
pub struct TestEnv {
    pub dir: TempDir,
}

impl TestEnv {
    pub fn new() -> Self {
        let dir = TempDir::new().unwrap();
        fs::create_dir(dir.path().join("downloads")).unwrap();
        Self { dir }
    }

    pub fn downloads(&self) -> PathBuf {
        self.dir.path().join("downloads")
    }

    pub fn history_file(&self) -> PathBuf {
        self.dir.path().join("history")
    }

    pub fn log_file(&self) -> PathBuf {
        self.dir.path().join("feedhound.log")
    }

    pub fn pid_file(&self) -> PathBuf {
        self.dir.path().join("feedhound.pid")
    }

    pub fn config_path(&self) -> PathBuf {
        self.dir.path().join("config.yaml")
    }

    pub fn config(&self, feeds: Vec<String>) -> Config {
        Config::new(feeds, self.downloads(), self.history_file(), self.log_file())
    }

    /// Writes a config file, with `extra` appended verbatim.
    pub fn write_config(&self, feeds: &[String], extra: &str) -> PathBuf {
        let mut yaml = String::from("feeds:\n");
        for feed in feeds {
            yaml.push_str(&format!("  - \"{}\"\n", feed));
        }
        yaml.push_str(&format!(
            "download_path: {}\nhistory_file: {}\nlog_file: {}\n{}",
            self.downloads().display(),
            self.history_file().display(),
            self.log_file().display(),
            extra
        ));
        fs::write(self.config_path(), yaml).unwrap();
        self.config_path()
    }

    pub fn history(&self) -> String {
        fs::read_to_string(self.history_file()).unwrap_or_default()
    }

    pub fn downloaded_files(&self) -> Vec<String> {
        let mut names: Vec<String> = fs::read_dir(self.downloads())
            .unwrap()
            .map(|entry| entry.unwrap().file_name().to_string_lossy().into_owned())
            .collect();
        names.sort();
        names
    }

    pub fn read_download(&self, name: &str) -> Vec<u8> {
        fs::read(self.downloads().join(name)).unwrap()
    }
}

pub fn record_of(link: &str) -> String {
    HistoryRecord::digest(link).to_string()
}

pub fn wait_for(path: &Path, present: bool) -> bool {
    for _ in 0..100 {
        if path.exists() == present {
            return true;
        }
        std::thread::sleep(std::time::Duration::from_millis(50));
    }
    false
}
