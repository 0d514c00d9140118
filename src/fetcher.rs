// File: fetcher.rs
// SPDX-License-Identifier: MIT OR Apache-2.0
//
// Copyright (c) 2025-2026
// - Volker Schwaberow <volker@schwaberow.de>

use futures::Stream;
use log::{debug, error};
use reqwest::Response;
use std::fmt;
use std::time::Duration;

#[derive(Debug, Clone)]
pub struct Fetcher {
    client: reqwest::Client,
}

/// A successful response whose body has not been read yet.
#[derive(Debug)]
pub struct Download {
    response: Response,
}

impl Download {
    pub fn url(&self) -> &str {
        self.response.url().as_str()
    }

    pub fn status(&self) -> u16 {
        self.response.status().as_u16()
    }

    pub fn content_length(&self) -> Option<u64> {
        self.response.content_length()
    }

    pub fn into_stream(self) -> impl Stream<Item = reqwest::Result<impl AsRef<[u8]>>> {
        self.response.bytes_stream()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchFailure {
    pub url: String,
    pub status: Option<u16>,
    pub reason: String,
}

impl fmt::Display for FetchFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.status {
            Some(status) => write!(f, "{} (HTTP {}): {}", self.url, status, self.reason),
            None => write!(f, "{}: {}", self.url, self.reason),
        }
    }
}

#[derive(Debug)]
pub enum FetchOutcome {
    Fetched(Download),
    Failed(FetchFailure),
}

impl Fetcher {
    pub fn new(timeout: Option<Duration>, user_agent: &str) -> reqwest::Result<Self> {
        let mut builder = reqwest::Client::builder().user_agent(user_agent);
        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }
        Ok(Self {
            client: builder.build()?,
        })
    }

    /// Issues a GET for `url`. Transport errors and error statuses are
    /// reported as [`FetchOutcome::Failed`], never propagated.
    pub async fn fetch(&self, url: &str) -> FetchOutcome {
        debug!("Downloading {}.", url);

        let result = match self.client.get(url).send().await {
            Ok(response) => response.error_for_status(),
            Err(e) => Err(e),
        };

        match result {
            Ok(response) => FetchOutcome::Fetched(Download { response }),
            Err(e) => {
                let failure = FetchFailure {
                    url: url.to_string(),
                    status: e.status().map(|s| s.as_u16()),
                    reason: e.to_string(),
                };
                error!("Error downloading {}, skipping: {}", url, failure.reason);
                FetchOutcome::Failed(failure)
            }
        }
    }

    /// Fetches a whole document as text. Used for feed documents, whose
    /// failures are handled by the caller.
    pub async fn fetch_text(&self, url: &str) -> reqwest::Result<String> {
        debug!("Fetching feed {}.", url);
        self.client
            .get(url)
            .send()
            .await?
            .error_for_status()?
            .text()
            .await
    }
}
