// src/job_analysis/notifier.rs
//! Outbound webhook notification for finished analyses.
//!
//! Delivery is best effort: no retries, and a failed POST never touches the
//! analysis that triggered it.

use super::types::{AnalysisError, JobPosting, MatchAnalysis};
use crate::core::config_manager::WebhookSettings;
use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use reqwest::header::{AUTHORIZATION, CONTENT_TYPE};
use reqwest::Client;
use serde::Serialize;
use std::time::Duration;
use tokio::task::JoinHandle;
use tracing::{error, info};

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WebhookPayload {
    pub job_data: JobPosting,
    pub analysis: MatchAnalysis,
    pub timestamp: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub source: Option<String>,
}

impl WebhookPayload {
    pub fn new(job_data: JobPosting, analysis: MatchAnalysis) -> Self {
        Self {
            job_data,
            analysis,
            timestamp: Utc::now(),
            source: None,
        }
    }

    pub fn with_source(mut self, source: &str) -> Self {
        self.source = Some(source.to_string());
        self
    }
}

#[derive(Debug, Serialize)]
struct TestPayload {
    test: bool,
    timestamp: DateTime<Utc>,
    message: &'static str,
}

/// Normalize a stored token into an `Authorization` header value.
pub fn authorization_header(auth: &str) -> Option<String> {
    let auth = auth.trim();
    if auth.is_empty() {
        None
    } else if auth.to_lowercase().starts_with("bearer ") {
        Some(auth.to_string())
    } else {
        Some(format!("Bearer {}", auth))
    }
}

#[derive(Clone)]
pub struct WebhookNotifier {
    client: Client,
    url: String,
    authorization: Option<String>,
}

impl WebhookNotifier {
    pub fn new(url: &str, auth: Option<&str>, timeout_seconds: u64) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_seconds))
            .build()
            .context("Failed to create HTTP client")?;

        Ok(Self {
            client,
            url: url.to_string(),
            authorization: auth.and_then(authorization_header),
        })
    }

    /// `None` when no webhook URL is configured.
    pub fn from_settings(settings: &WebhookSettings) -> Result<Option<Self>> {
        match settings.url.as_deref().map(str::trim) {
            Some(url) if !url.is_empty() => Ok(Some(Self::new(
                url,
                settings.auth.as_deref(),
                settings.timeout_seconds,
            )?)),
            _ => Ok(None),
        }
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    async fn post<T: Serialize + ?Sized>(&self, body: &T) -> Result<(), AnalysisError> {
        let mut request = self
            .client
            .post(&self.url)
            .header(CONTENT_TYPE, "application/json")
            .json(body);
        if let Some(authorization) = &self.authorization {
            request = request.header(AUTHORIZATION, authorization);
        }

        let response = request
            .send()
            .await
            .map_err(|e| AnalysisError::NotificationFailure(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(AnalysisError::NotificationFailure(format!(
                "HTTP {}: {}",
                status.as_u16(),
                status.canonical_reason().unwrap_or("Unknown")
            )));
        }

        info!("Webhook delivered to {} ({})", self.url, status);
        Ok(())
    }

    pub async fn notify(&self, payload: &WebhookPayload) -> Result<(), AnalysisError> {
        self.post(payload).await
    }

    pub async fn send_test(&self) -> Result<(), AnalysisError> {
        let payload = TestPayload {
            test: true,
            timestamp: Utc::now(),
            message: "This is a test webhook from jobfit",
        };
        self.post(&payload).await
    }

    /// Fire and forget. Failures are logged, never returned; the handle is
    /// only useful to callers that must not exit before delivery finishes.
    pub fn dispatch(&self, payload: WebhookPayload) -> JoinHandle<()> {
        let notifier = self.clone();
        tokio::spawn(async move {
            if let Err(e) = notifier.notify(&payload).await {
                error!("Auto-webhook failed: {}", e);
            }
        })
    }
}
