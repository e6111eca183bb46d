// src/lib.rs
//! Job fit analysis: score job postings against a candidate's resume and
//! preferences, keep a history of results, export and forward them.

/// Level-tagged logging shorthand, `app_log!(info, "...", args)`.
#[macro_export]
macro_rules! app_log {
    ($level:ident, $($arg:tt)+) => {
        ::tracing::$level!($($arg)+)
    };
}

pub mod cli;
pub mod core;
pub mod export;
pub mod history;
pub mod job_analysis;
pub mod utils;
pub mod web;

pub use job_analysis::{analyze_job_fit, AnalysisError, CandidateProfile, JobPosting, MatchAnalysis};
pub use web::start_web_server;
