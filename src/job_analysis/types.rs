// src/job_analysis/types.rs
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// A job posting as read from a listing page.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JobPosting {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub company: String,
    #[serde(default)]
    pub location: String,
    #[serde(default)]
    pub description: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub salary: Option<String>,
    #[serde(default)]
    pub requirements: Vec<String>,
    #[serde(rename = "url", default)]
    pub source_url: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scraped_at: Option<DateTime<Utc>>,
}

impl JobPosting {
    /// Salary text when the posting actually discloses one.
    pub fn disclosed_salary(&self) -> Option<&str> {
        self.salary.as_deref().filter(|s| !s.trim().is_empty())
    }

    pub fn has_title(&self) -> bool {
        !self.title.trim().is_empty()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CandidateProfile {
    pub resume_text: String,
    #[serde(default)]
    pub preferences_text: String,
}

impl CandidateProfile {
    pub fn new(resume_text: impl Into<String>, preferences_text: impl Into<String>) -> Self {
        Self {
            resume_text: resume_text.into(),
            preferences_text: preferences_text.into(),
        }
    }
}

/// Score and explanation produced for one (posting, profile) pair.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MatchAnalysis {
    pub match_score: f64,
    pub pros: Vec<String>,
    pub cons: Vec<String>,
    pub recommendations: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AnalysisError {
    #[error("Please add your resume information first")]
    MissingInput,

    #[error("Could not scrape job data from this page: {0}")]
    MissingPageData(String),

    #[error("Webhook notification failed: {0}")]
    NotificationFailure(String),
}

impl AnalysisError {
    pub fn code(&self) -> &'static str {
        match self {
            Self::MissingInput => "MISSING_INPUT",
            Self::MissingPageData(_) => "MISSING_PAGE_DATA",
            Self::NotificationFailure(_) => "NOTIFICATION_FAILURE",
        }
    }

    pub fn suggestions(&self) -> Vec<String> {
        match self {
            Self::MissingInput => vec![
                "Save your resume text with `jobfit profile set --resume <file>`".to_string(),
                "Or pass resume_text in the request body".to_string(),
            ],
            Self::MissingPageData(_) => vec![
                "Make sure you're on a supported job site (LinkedIn, Indeed, Glassdoor)".to_string(),
                "The page may require login or the posting may have been removed".to_string(),
            ],
            Self::NotificationFailure(_) => vec![
                "Check the webhook URL and authentication token".to_string(),
                "The analysis itself was still computed and saved".to_string(),
            ],
        }
    }
}
