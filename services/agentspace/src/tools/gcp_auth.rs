//! GCP Access Tokens
//!
//! Application Default Credentials without a full auth SDK:
//! - an explicit token (flag or `GOOGLE_OAUTH_ACCESS_TOKEN`)
//! - GCE/GKE metadata server (Workload Identity)
//! - `gcloud auth application-default print-access-token` (local development)

use anyhow::{bail, Context, Result};
use reqwest::Client;
use std::future::Future;
use std::time::Duration;
use tokio::sync::OnceCell;
use tracing::debug;

const METADATA_TOKEN_URL: &str =
    "http://metadata.google.internal/computeMetadata/v1/instance/service-accounts/default/token";

/// Where bearer tokens come from
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TokenSource {
    /// Use this token as-is
    Static(String),
    /// Metadata server, then gcloud CLI
    ApplicationDefault,
}

/// Bearer tokens for Google APIs.
///
/// An Application Default token is fetched once and reused for the life of
/// the provider. Tokens last about an hour, longer than any single command.
#[derive(Debug, Clone)]
pub struct TokenProvider {
    source: TokenSource,
    cached: OnceCell<String>,
}

impl TokenProvider {
    pub fn fixed(token: impl Into<String>) -> Self {
        Self {
            source: TokenSource::Static(token.into()),
            cached: OnceCell::new(),
        }
    }

    pub fn application_default() -> Self {
        Self {
            source: TokenSource::ApplicationDefault,
            cached: OnceCell::new(),
        }
    }

    /// Prefer an explicit token when one was supplied
    pub fn from_option(token: Option<String>) -> Self {
        match token {
            Some(t) if !t.trim().is_empty() => Self::fixed(t.trim()),
            _ => Self::application_default(),
        }
    }

    pub fn source(&self) -> &TokenSource {
        &self.source
    }

    pub async fn access_token(&self) -> Result<String> {
        match &self.source {
            TokenSource::Static(token) => Ok(token.clone()),
            TokenSource::ApplicationDefault => self.cached_or(application_default_token).await,
        }
    }

    async fn cached_or<F, Fut>(&self, fetch: F) -> Result<String>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<String>>,
    {
        self.cached.get_or_try_init(fetch).await.cloned()
    }
}

async fn application_default_token() -> Result<String> {
    let client = Client::builder()
        .timeout(Duration::from_secs(5))
        .build()
        .context("Failed to create HTTP client")?;

    if let Ok(resp) = client
        .get(METADATA_TOKEN_URL)
        .header("Metadata-Flavor", "Google")
        .send()
        .await
    {
        if resp.status().is_success() {
            let data: serde_json::Value = resp.json().await?;
            if let Some(token) = data["access_token"].as_str() {
                debug!("Using access token from metadata server");
                return Ok(token.to_string());
            }
        }
    }

    let output = tokio::process::Command::new("gcloud")
        .args(["auth", "application-default", "print-access-token"])
        .output()
        .await
        .context("gcloud CLI not available")?;

    if !output.status.success() {
        bail!(
            "gcloud auth failed - run 'gcloud auth application-default login': {}",
            String::from_utf8_lossy(&output.stderr).trim()
        );
    }

    debug!("Using access token from gcloud CLI");
    Ok(String::from_utf8(output.stdout)?.trim().to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[test]
    fn test_from_option_prefers_explicit_token() {
        assert_eq!(
            TokenProvider::from_option(Some(" ya29.token ".to_string())).source(),
            &TokenSource::Static("ya29.token".to_string())
        );
        assert_eq!(
            TokenProvider::from_option(Some("  ".to_string())).source(),
            &TokenSource::ApplicationDefault
        );
        assert_eq!(
            TokenProvider::from_option(None).source(),
            &TokenSource::ApplicationDefault
        );
    }

    #[tokio::test]
    async fn test_static_token() {
        let provider = TokenProvider::fixed("abc");
        assert_eq!(provider.access_token().await.unwrap(), "abc");
    }

    #[tokio::test]
    async fn test_fetched_token_is_reused() {
        let provider = TokenProvider::application_default();
        let fetches = AtomicUsize::new(0);
        let counter = &fetches;

        for _ in 0..3 {
            let token = provider
                .cached_or(|| async move {
                    counter.fetch_add(1, Ordering::SeqCst);
                    Ok("ya29.fetched".to_string())
                })
                .await
                .unwrap();
            assert_eq!(token, "ya29.fetched");
        }
        assert_eq!(fetches.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_failed_fetch_is_retried() {
        let provider = TokenProvider::application_default();

        let err = provider
            .cached_or(|| async { Err(anyhow::anyhow!("gcloud CLI not available")) })
            .await;
        assert!(err.is_err());

        let token = provider
            .cached_or(|| async { Ok("ya29.second".to_string()) })
            .await
            .unwrap();
        assert_eq!(token, "ya29.second");
    }
}
