// File: feed.rs
// SPDX-License-Identifier: MIT OR Apache-2.0
//
// Copyright (c) 2025-2026
// - Volker Schwaberow <volker@schwaberow.de>

use log::debug;
use rss::Channel;
use std::fmt;
use std::path::PathBuf;

use crate::errors::FeedError;
use crate::fetcher::Fetcher;

/// One entry of a feed, reduced to what the pipeline needs.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FeedItem {
    pub title: Option<String>,
    pub link: Option<String>,
    pub enclosure_url: Option<String>,
}

/// Where a configured feed comes from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FeedSource {
    Url(String),
    File(PathBuf),
    Inline(String),
}

impl FeedSource {
    /// Classifies a configured feed entry: `http(s)://` locators are fetched,
    /// anything that looks like XML is parsed in place, the rest is read
    /// from disk.
    pub fn parse(entry: &str) -> Self {
        let trimmed = entry.trim();
        let lower = trimmed.to_ascii_lowercase();
        if lower.starts_with("http://") || lower.starts_with("https://") {
            Self::Url(trimmed.to_string())
        } else if trimmed.starts_with('<') {
            Self::Inline(entry.to_string())
        } else {
            Self::File(PathBuf::from(trimmed))
        }
    }

    pub async fn load(&self, fetcher: &Fetcher) -> Result<Vec<FeedItem>, FeedError> {
        let document = match self {
            Self::Url(url) => fetcher
                .fetch_text(url)
                .await
                .map_err(|e| FeedError::Http(url.clone(), e))?,
            Self::File(path) => tokio::fs::read_to_string(path)
                .await
                .map_err(|e| FeedError::Io(path.clone(), e))?,
            Self::Inline(document) => document.clone(),
        };

        let items = parse_items(&document).map_err(|e| FeedError::Parse(self.to_string(), e))?;
        debug!("Parsed {} items from feed {}.", items.len(), self);
        Ok(items)
    }
}

impl fmt::Display for FeedSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Url(url) => f.write_str(url),
            Self::File(path) => write!(f, "{}", path.display()),
            Self::Inline(_) => f.write_str("<inline feed>"),
        }
    }
}

pub fn parse_items(document: &str) -> Result<Vec<FeedItem>, rss::Error> {
    let channel = Channel::read_from(document.as_bytes())?;

    Ok(channel
        .items()
        .iter()
        .map(|item| FeedItem {
            title: item.title().map(str::to_string),
            link: item.link().map(str::to_string),
            enclosure_url: item.enclosure().map(|e| e.url().to_string()),
        })
        .collect())
}
