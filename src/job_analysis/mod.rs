// src/job_analysis/mod.rs
//! Rule-based job fit analysis: read a posting, score it against a
//! candidate profile, explain the score, optionally notify a webhook.

pub mod extractor;
pub mod job_analyzer;
pub mod job_scraper;
pub mod notifier;
pub mod recommender;
pub mod scorer;
pub mod types;

pub use job_analyzer::{AnalysisOutcome, JobAnalyzer, JobSource};
pub use job_scraper::{is_job_listing_url, read_job_posting, JobScraper, SiteReader};
pub use notifier::{WebhookNotifier, WebhookPayload};
pub use scorer::analyze_job_fit;
pub use types::{AnalysisError, CandidateProfile, JobPosting, MatchAnalysis};
