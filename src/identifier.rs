// File: identifier.rs
// SPDX-License-Identifier: MIT OR Apache-2.0
//
// Copyright (c) 2025-2026
// - Volker Schwaberow <volker@schwaberow.de>

use log::debug;
use reqwest::Url;

use crate::feed::FeedItem;
use crate::ledger::HistoryRecord;

pub const EXTENSION: &str = "torrent";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DownloadTarget {
    pub record: HistoryRecord,
    /// The enclosure or link URL as it appeared in the feed.
    pub source: String,
    pub url: String,
    pub filename: String,
}

/// Derives the download target for a feed item.
///
/// Items without a usable link are skipped. The enclosure is preferred as the
/// fetch source, but the record is always keyed on the link exactly as the
/// feed gave it, so a re-published enclosure under the same link is not
/// fetched twice.
pub fn identify(item: &FeedItem) -> Option<DownloadTarget> {
    let Some(link) = item.link.as_deref().filter(|l| !l.trim().is_empty()) else {
        debug!(
            "Item {:?} has no link, skipping.",
            item.title.as_deref().unwrap_or("")
        );
        return None;
    };
    let source = non_blank(item.enclosure_url.as_deref()).unwrap_or(link.trim());

    let record = HistoryRecord::digest(link);
    let filename = format!(
        "{}.{}",
        sanitize_title(item.title.as_deref()).unwrap_or_else(|| record.to_string()),
        EXTENSION
    );

    Some(DownloadTarget {
        url: sanitize_url(source),
        source: source.to_string(),
        record,
        filename,
    })
}

/// Percent-encodes characters fetch clients reject.
///
/// The WHATWG parser handles spaces, control characters and non-ASCII. Square
/// brackets are legal there outside the host but still trip up servers, so
/// they are escaped in path, query and fragment. Strings that do not parse are
/// returned with only the brackets escaped.
pub fn sanitize_url(raw: &str) -> String {
    let raw = raw.trim();
    match Url::parse(raw) {
        Ok(mut url) => {
            let path = escape_brackets(url.path());
            url.set_path(&path);
            if let Some(query) = url.query().map(escape_brackets) {
                url.set_query(Some(&query));
            }
            if let Some(fragment) = url.fragment().map(escape_brackets) {
                url.set_fragment(Some(&fragment));
            }
            url.to_string()
        }
        Err(_) => escape_brackets(raw),
    }
}

fn escape_brackets(value: &str) -> String {
    value.replace('[', "%5B").replace(']', "%5D")
}

/// Makes a feed title usable as a single path component.
pub fn sanitize_title(title: Option<&str>) -> Option<String> {
    let cleaned: String = title?
        .trim()
        .chars()
        .map(|c| match c {
            '/' | '\\' | '\0' => '_',
            other => other,
        })
        .collect();

    match cleaned.as_str() {
        "" | "." | ".." => None,
        _ => Some(cleaned),
    }
}

fn non_blank(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}
