//! Acquisition of the raw evaluation table from a local file or an HTTP(S) URL.

mod basic;
mod client;

pub use basic::BasicClient;
pub use client::HttpClient;

use anyhow::{Context, Result};
use tracing::{debug, info};

pub async fn fetch_bytes<C: HttpClient>(client: &C, url: &str) -> Result<Vec<u8>> {
    let req = reqwest::Request::new(reqwest::Method::GET, url.parse()?);

    let resp = client.execute(req).await?.error_for_status()?;
    Ok(resp.bytes().await?.to_vec())
}

/// Loads the raw table from `source`, fetching it when it looks like a URL.
#[tracing::instrument(skip(client))]
pub async fn load_source<C: HttpClient>(client: &C, source: &str) -> Result<Vec<u8>> {
    let bytes = if source.starts_with("http://") || source.starts_with("https://") {
        fetch_bytes(client, source)
            .await
            .with_context(|| format!("fetching {source}"))?
    } else {
        std::fs::read(source).with_context(|| format!("reading {source}"))?
    };

    debug!(bytes = bytes.len(), "Source loaded");
    info!(source, "Raw evaluation table acquired");
    Ok(bytes)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[tokio::test]
    async fn test_load_source_reads_local_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(b"Instructor,Course\n").unwrap();

        let client = BasicClient::new().unwrap();
        let path = file.path().to_str().unwrap().to_string();
        let bytes = load_source(&client, &path).await.unwrap();

        assert_eq!(bytes, b"Instructor,Course\n");
    }

    #[tokio::test]
    async fn test_load_source_missing_file_is_an_error() {
        let client = BasicClient::new().unwrap();
        assert!(load_source(&client, "/definitely/not/here.csv").await.is_err());
    }
}
