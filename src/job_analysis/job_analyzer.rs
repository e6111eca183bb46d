// src/job_analysis/job_analyzer.rs
//! End-to-end flow shared by the CLI and the HTTP API: obtain a posting,
//! score it, record it, and hand it to the webhook when auto-send is on.

use super::job_scraper::{is_job_listing_url, read_job_posting, JobScraper};
use super::notifier::{WebhookNotifier, WebhookPayload};
use super::scorer::analyze_job_fit;
use super::types::{CandidateProfile, JobPosting};
use crate::core::{ConfigManager, FsOps};
use crate::history::{AnalysisRecord, HistoryStore};
use anyhow::{Context, Result};
use std::path::PathBuf;
use std::sync::Arc;
use tokio::task::JoinHandle;
use tracing::{info, warn};

/// Where a posting comes from.
#[derive(Debug, Clone)]
pub enum JobSource {
    /// Download and read a listing page.
    Url(String),
    /// Read a saved listing page; `url` picks the site reader.
    HtmlFile { path: PathBuf, url: String },
    /// A `JobPosting` already serialized as JSON.
    JsonFile(PathBuf),
}

#[derive(Debug)]
pub struct AnalysisOutcome {
    pub record: AnalysisRecord,
    /// Set when an auto-send webhook was dispatched.
    pub webhook: Option<JoinHandle<()>>,
}

pub struct JobAnalyzer {
    config: ConfigManager,
    history: Arc<HistoryStore>,
    scraper: JobScraper,
}

impl JobAnalyzer {
    pub fn new(config: ConfigManager) -> Result<Self> {
        let history = Arc::new(HistoryStore::new(config.paths.history_path.clone()));
        Self::with_history(config, history)
    }

    pub fn with_history(config: ConfigManager, history: Arc<HistoryStore>) -> Result<Self> {
        Ok(Self {
            config,
            history,
            scraper: JobScraper::new()?,
        })
    }

    pub fn config(&self) -> &ConfigManager {
        &self.config
    }

    pub fn history(&self) -> &HistoryStore {
        &self.history
    }

    pub async fn load_job(&self, source: &JobSource) -> Result<JobPosting> {
        match source {
            JobSource::Url(url) => {
                if !is_job_listing_url(url) {
                    warn!("{} does not look like a single job listing page", url);
                }
                self.scraper.fetch(url).await
            }
            JobSource::HtmlFile { path, url } => {
                let html = FsOps::read_file_safe(path).await?;
                Ok(read_job_posting(url, &html)?)
            }
            JobSource::JsonFile(path) => {
                let content = FsOps::read_file_safe(path).await?;
                serde_json::from_str(&content)
                    .with_context(|| format!("Invalid job posting JSON: {}", path.display()))
            }
        }
    }

    /// Score `job` against `profile`, or the stored profile when `None`.
    ///
    /// A failed history write or webhook setup is logged and does not
    /// discard the analysis.
    pub async fn analyze(
        &self,
        job: JobPosting,
        profile: Option<CandidateProfile>,
    ) -> Result<AnalysisOutcome> {
        let settings = self.config.load_settings().await?;
        let profile = profile.unwrap_or_else(|| settings.candidate_profile());

        let analysis = analyze_job_fit(&job, &profile)?;
        info!(
            "Analyzed {} at {}: {:.1}",
            job.title, job.company, analysis.match_score
        );

        let record = AnalysisRecord::new(job, analysis);
        if let Err(e) = self.history.append(record.clone()).await {
            warn!("Failed to record analysis in history: {:#}", e);
        }

        let webhook = if settings.webhook.auto_send {
            match WebhookNotifier::from_settings(&settings.webhook) {
                Ok(notifier) => notifier.map(|notifier| {
                    notifier.dispatch(WebhookPayload::new(
                        record.job_data.clone(),
                        record.analysis.clone(),
                    ))
                }),
                Err(e) => {
                    warn!("Auto-webhook skipped: {:#}", e);
                    None
                }
            }
        } else {
            None
        };

        Ok(AnalysisOutcome { record, webhook })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{Settings, WebhookSettings};
    use crate::job_analysis::notifier::tests::capture_one_request;
    use crate::job_analysis::AnalysisError;
    use tempfile::TempDir;

    fn job(title: &str) -> JobPosting {
        JobPosting {
            title: title.to_string(),
            company: "Acme".to_string(),
            location: "Remote".to_string(),
            description: "python and docker, 3 years experience".to_string(),
            salary: None,
            requirements: vec![],
            source_url: String::new(),
            scraped_at: None,
        }
    }

    async fn analyzer_with_resume(dir: &TempDir, resume: &str) -> JobAnalyzer {
        let config = ConfigManager::with_base_dir(dir.path().to_path_buf());
        let settings = Settings {
            resume_text: resume.to_string(),
            ..Settings::default()
        };
        config.save_settings(&settings).await.unwrap();
        JobAnalyzer::new(config).unwrap()
    }

    #[tokio::test]
    async fn test_analyze_records_history() {
        let dir = TempDir::new().unwrap();
        let analyzer = analyzer_with_resume(&dir, "python docker developer, 5 years experience").await;

        let outcome = analyzer.analyze(job("Backend Engineer"), None).await.unwrap();
        assert!(outcome.webhook.is_none());
        assert!(outcome.record.analysis.match_score > 0.0);

        let history = analyzer.history().snapshot().await.unwrap();
        assert_eq!(history.len(), 1);
        assert_eq!(history.records()[0].id, outcome.record.id);
    }

    #[tokio::test]
    async fn test_explicit_profile_overrides_stored_one() {
        let dir = TempDir::new().unwrap();
        let analyzer = analyzer_with_resume(&dir, "").await;

        let err = analyzer.analyze(job("Backend Engineer"), None).await.unwrap_err();
        assert_eq!(err.downcast_ref::<AnalysisError>(), Some(&AnalysisError::MissingInput));

        let profile = CandidateProfile::new("python developer", "");
        assert!(analyzer.analyze(job("Backend Engineer"), Some(profile)).await.is_ok());
    }

    #[tokio::test]
    async fn test_auto_send_posts_analysis_to_webhook() {
        let dir = TempDir::new().unwrap();
        let (url, server) = capture_one_request("200 OK").await;

        let config = ConfigManager::with_base_dir(dir.path().to_path_buf());
        let settings = Settings {
            resume_text: "python docker developer".to_string(),
            webhook: WebhookSettings {
                url: Some(url),
                auth: Some("hook-token".to_string()),
                auto_send: true,
                timeout_seconds: 5,
            },
            ..Settings::default()
        };
        config.save_settings(&settings).await.unwrap();
        let analyzer = JobAnalyzer::new(config).unwrap();

        let outcome = analyzer.analyze(job("Backend Engineer"), None).await.unwrap();
        outcome.webhook.expect("auto-send dispatches").await.unwrap();

        let request = server.await.unwrap();
        let lower = request.to_lowercase();
        assert!(request.starts_with("POST /hook"));
        assert!(lower.contains("authorization: bearer hook-token"));
        let body = &request[request.find("\r\n\r\n").unwrap() + 4..];
        let payload: serde_json::Value = serde_json::from_str(body).unwrap();
        assert_eq!(payload["jobData"]["title"], "Backend Engineer");
        assert_eq!(
            payload["analysis"]["matchScore"],
            outcome.record.analysis.match_score
        );
        assert!(payload["timestamp"].is_string());
        assert!(payload.get("source").is_none());
    }

    #[tokio::test]
    async fn test_auto_send_failure_keeps_analysis() {
        let dir = TempDir::new().unwrap();
        let config = ConfigManager::with_base_dir(dir.path().to_path_buf());
        let settings = Settings {
            resume_text: "python developer".to_string(),
            webhook: WebhookSettings {
                url: Some("http://127.0.0.1:9/hook".to_string()),
                auth: None,
                auto_send: true,
                timeout_seconds: 5,
            },
            ..Settings::default()
        };
        config.save_settings(&settings).await.unwrap();
        let analyzer = JobAnalyzer::new(config).unwrap();

        let outcome = analyzer.analyze(job("Backend Engineer"), None).await.unwrap();
        outcome.webhook.expect("auto-send dispatches").await.unwrap();
        assert_eq!(analyzer.history().snapshot().await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_json_posting_without_title_is_missing_page_data() {
        let dir = TempDir::new().unwrap();
        let analyzer = analyzer_with_resume(&dir, "python").await;

        let json_path = dir.path().join("untitled.json");
        tokio::fs::write(&json_path, r#"{"company":"Acme","description":"python"}"#)
            .await
            .unwrap();
        let posting = analyzer.load_job(&JobSource::JsonFile(json_path)).await.unwrap();
        assert!(posting.title.is_empty());

        let err = analyzer.analyze(posting, None).await.unwrap_err();
        assert!(matches!(
            err.downcast_ref::<AnalysisError>(),
            Some(AnalysisError::MissingPageData(_))
        ));
    }

    #[tokio::test]
    async fn test_load_job_from_files() {
        let dir = TempDir::new().unwrap();
        let analyzer = analyzer_with_resume(&dir, "rust").await;

        let json_path = dir.path().join("job.json");
        tokio::fs::write(&json_path, r#"{"title":"Rust Engineer","company":"Ferris Labs"}"#)
            .await
            .unwrap();
        let posting = analyzer.load_job(&JobSource::JsonFile(json_path)).await.unwrap();
        assert_eq!(posting.company, "Ferris Labs");
        assert!(posting.requirements.is_empty());

        let html_path = dir.path().join("job.html");
        tokio::fs::write(&html_path, r#"<h1 data-test="job-title">Data Engineer</h1>"#)
            .await
            .unwrap();
        let posting = analyzer
            .load_job(&JobSource::HtmlFile {
                path: html_path,
                url: "https://www.glassdoor.com/job-listing/1".to_string(),
            })
            .await
            .unwrap();
        assert_eq!(posting.title, "Data Engineer");
    }
}
