// src/services/fetcher.rs

//! Listing page fetcher.

use reqwest::{Client, StatusCode};
use url::Url;

use crate::error::{AppError, Result};

/// Downloads the raw listing page.
pub struct PageFetcher {
    client: Client,
}

impl PageFetcher {
    pub fn new(client: Client) -> Self {
        Self { client }
    }

    /// GET `url` once and return the body.
    ///
    /// Anything but `200 OK` is an [`AppError::HttpStatus`].
    pub async fn fetch(&self, url: &Url) -> Result<Vec<u8>> {
        let response = self.client.get(url.clone()).send().await?;

        let status = response.status();
        if status != StatusCode::OK {
            log::error!("Listing fetch failed: {} returned {}", url, status);
            return Err(AppError::http_status(url, status.as_u16()));
        }

        let body = response.bytes().await?;
        log::debug!("Fetched {} bytes from {}", body.len(), url);
        Ok(body.to_vec())
    }
}
