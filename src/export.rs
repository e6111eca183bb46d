// src/export.rs
//! Presenters for finished analyses: JSON, CSV and a plain-text report,
//! plus whole-history exports.

use crate::history::{AnalysisHistory, AnalysisRecord};
use crate::job_analysis::{JobPosting, MatchAnalysis};
use crate::utils::preview;
use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use csv::{QuoteStyle, Terminator, WriterBuilder};
use serde::Serialize;
use std::fmt::Write as _;
use std::str::FromStr;

pub const EXPORT_VERSION: &str = env!("CARGO_PKG_VERSION");

const CSV_DESCRIPTION_PREVIEW: usize = 200;
const SUMMARY_DESCRIPTION_LIMIT: usize = 500;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExportFormat {
    Json,
    Csv,
    Text,
}

impl ExportFormat {
    pub fn extension(self) -> &'static str {
        match self {
            Self::Json => "json",
            Self::Csv => "csv",
            Self::Text => "txt",
        }
    }
}

impl FromStr for ExportFormat {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "json" => Ok(Self::Json),
            "csv" => Ok(Self::Csv),
            "text" | "txt" => Ok(Self::Text),
            other => anyhow::bail!("Unsupported export format: {}. Use json, csv or text", other),
        }
    }
}

/// Scores print like the browser did: `97` rather than `97.0`.
pub fn format_score(score: f64) -> String {
    if score.fract() == 0.0 {
        format!("{}", score as i64)
    } else {
        format!("{}", score)
    }
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct AnalysisExport<'a> {
    job_data: &'a JobPosting,
    analysis: &'a MatchAnalysis,
    exported_at: DateTime<Utc>,
    version: &'static str,
}

pub fn render(
    format: ExportFormat,
    job: &JobPosting,
    analysis: &MatchAnalysis,
    analyzed_at: DateTime<Utc>,
) -> Result<String> {
    match format {
        ExportFormat::Json => analysis_json(job, analysis),
        ExportFormat::Csv => analysis_csv(job, analysis, analyzed_at),
        ExportFormat::Text => Ok(analysis_report(job, analysis, analyzed_at)),
    }
}

pub fn analysis_json(job: &JobPosting, analysis: &MatchAnalysis) -> Result<String> {
    let export = AnalysisExport {
        job_data: job,
        analysis,
        exported_at: Utc::now(),
        version: EXPORT_VERSION,
    };
    serde_json::to_string_pretty(&export).context("Failed to serialize analysis export")
}

pub fn analysis_csv(
    job: &JobPosting,
    analysis: &MatchAnalysis,
    analyzed_at: DateTime<Utc>,
) -> Result<String> {
    let rows: [(&str, String); 12] = [
        ("Field", "Value".to_string()),
        ("Job Title", job.title.clone()),
        ("Company", job.company.clone()),
        ("Location", job.location.clone()),
        ("URL", job.source_url.clone()),
        ("Salary", job.salary.clone().unwrap_or_default()),
        ("Match Score", format!("{}%", format_score(analysis.match_score))),
        ("Pros", analysis.pros.join("; ")),
        ("Cons", analysis.cons.join("; ")),
        ("Recommendations", analysis.recommendations.join("; ")),
        ("Analyzed At", analyzed_at.to_rfc3339()),
        (
            "Description Preview",
            preview(&job.description, CSV_DESCRIPTION_PREVIEW),
        ),
    ];

    let mut writer = WriterBuilder::new()
        .quote_style(QuoteStyle::Always)
        .terminator(Terminator::Any(b'\n'))
        .from_writer(Vec::new());

    for (field, value) in &rows {
        writer
            .write_record([*field, value.as_str()])
            .context("Failed to write CSV row")?;
    }

    let bytes = writer
        .into_inner()
        .map_err(|e| anyhow::anyhow!("Failed to flush CSV: {}", e))?;
    String::from_utf8(bytes).context("CSV output is not valid UTF-8")
}

/// Plain-text report suitable for the clipboard or a terminal.
pub fn analysis_report(
    job: &JobPosting,
    analysis: &MatchAnalysis,
    analyzed_at: DateTime<Utc>,
) -> String {
    let mut report = String::new();
    let _ = writeln!(report, "Job Analysis Report");
    let _ = writeln!(report, "==================");
    let _ = writeln!(report, "Position: {}", job.title);
    let _ = writeln!(report, "Company: {}", job.company);
    let _ = writeln!(report, "Location: {}", job.location);
    let _ = writeln!(report, "Match Score: {}%", format_score(analysis.match_score));
    let _ = writeln!(report, "URL: {}", job.source_url);

    for (heading, items) in [
        ("Pros", &analysis.pros),
        ("Cons", &analysis.cons),
        ("Recommendations", &analysis.recommendations),
    ] {
        let _ = writeln!(report, "\n{}:", heading);
        for item in items {
            let _ = writeln!(report, "• {}", item);
        }
    }

    let _ = write!(
        report,
        "\nAnalyzed: {}",
        analyzed_at.format("%Y-%m-%d %H:%M:%S UTC")
    );
    report
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct HistoryExport<T: Serialize> {
    exported_at: DateTime<Utc>,
    total_analyses: usize,
    analyses: Vec<T>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct HistorySummaryItem<'a> {
    job_title: &'a str,
    company: &'a str,
    location: &'a str,
    url: &'a str,
    match_score: f64,
    pros: &'a [String],
    cons: &'a [String],
    recommendations: &'a [String],
    analyzed_at: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    salary: Option<&'a str>,
    description: String,
}

impl<'a> From<&'a AnalysisRecord> for HistorySummaryItem<'a> {
    fn from(record: &'a AnalysisRecord) -> Self {
        Self {
            job_title: &record.job_data.title,
            company: &record.job_data.company,
            location: &record.job_data.location,
            url: &record.job_data.source_url,
            match_score: record.analysis.match_score,
            pros: &record.analysis.pros,
            cons: &record.analysis.cons,
            recommendations: &record.analysis.recommendations,
            analyzed_at: record.analyzed_at,
            salary: record.job_data.salary.as_deref(),
            description: preview(&record.job_data.description, SUMMARY_DESCRIPTION_LIMIT),
        }
    }
}

/// Whole history, records exactly as stored.
pub fn history_json(history: &AnalysisHistory) -> Result<String> {
    let export = HistoryExport {
        exported_at: Utc::now(),
        total_analyses: history.len(),
        analyses: history.records().iter().collect(),
    };
    serde_json::to_string_pretty(&export).context("Failed to serialize history export")
}

/// Flattened history with long descriptions cut down.
pub fn history_summary_json(history: &AnalysisHistory) -> Result<String> {
    let export = HistoryExport {
        exported_at: Utc::now(),
        total_analyses: history.len(),
        analyses: history
            .records()
            .iter()
            .map(HistorySummaryItem::from)
            .collect(),
    };
    serde_json::to_string_pretty(&export).context("Failed to serialize history export")
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn sample() -> (JobPosting, MatchAnalysis) {
        (
            JobPosting {
                title: "Senior \"Rust\" Engineer".to_string(),
                company: "Ferris Labs".to_string(),
                location: "Remote".to_string(),
                description: "x".repeat(600),
                salary: Some("$150k".to_string()),
                requirements: vec![],
                source_url: "https://www.linkedin.com/jobs/view/1".to_string(),
                scraped_at: None,
            },
            MatchAnalysis {
                match_score: 97.0,
                pros: vec!["✅ Key skill matches: rust".to_string(), "🏠 Remote work available".to_string()],
                cons: vec![],
                recommendations: vec!["🎯 Excellent match! Strongly recommend applying.".to_string()],
            },
        )
    }

    fn at() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 6, 10, 12, 30, 0).unwrap()
    }

    #[test]
    fn test_format_score() {
        assert_eq!(format_score(97.0), "97");
        assert_eq!(format_score(31.7), "31.7");
        assert_eq!(format_score(0.0), "0");
    }

    #[test]
    fn test_json_export_shape() {
        let (job, analysis) = sample();
        let value: serde_json::Value =
            serde_json::from_str(&analysis_json(&job, &analysis).unwrap()).unwrap();
        assert_eq!(value["jobData"]["company"], "Ferris Labs");
        assert_eq!(value["analysis"]["matchScore"], 97.0);
        assert_eq!(value["version"], EXPORT_VERSION);
        assert!(value["exportedAt"].is_string());
    }

    #[test]
    fn test_csv_export_quotes_every_field() {
        let (job, analysis) = sample();
        let csv = analysis_csv(&job, &analysis, at()).unwrap();
        let lines: Vec<&str> = csv.lines().collect();

        assert_eq!(lines.len(), 12);
        assert_eq!(lines[0], "\"Field\",\"Value\"");
        assert_eq!(lines[1], "\"Job Title\",\"Senior \"\"Rust\"\" Engineer\"");
        assert_eq!(lines[6], "\"Match Score\",\"97%\"");
        assert_eq!(
            lines[7],
            "\"Pros\",\"✅ Key skill matches: rust; 🏠 Remote work available\""
        );
        assert_eq!(lines[8], "\"Cons\",\"\"");
        let expected_preview = format!("\"Description Preview\",\"{}...\"", "x".repeat(200));
        assert_eq!(lines[11], expected_preview);
    }

    #[test]
    fn test_text_report() {
        let (job, analysis) = sample();
        let report = analysis_report(&job, &analysis, at());

        assert!(report.starts_with("Job Analysis Report\n==================\n"));
        assert!(report.contains("Match Score: 97%\n"));
        assert!(report.contains("Pros:\n• ✅ Key skill matches: rust\n• 🏠 Remote work available\n"));
        assert!(report.contains("Cons:\n\nRecommendations:"));
        assert!(report.ends_with("Analyzed: 2024-06-10 12:30:00 UTC"));
    }

    #[test]
    fn test_history_exports() {
        let (job, analysis) = sample();
        let mut history = AnalysisHistory::default();
        history.record(AnalysisRecord::new(job, analysis));

        let full: serde_json::Value = serde_json::from_str(&history_json(&history).unwrap()).unwrap();
        assert_eq!(full["totalAnalyses"], 1);
        assert_eq!(full["analyses"][0]["jobData"]["description"].as_str().unwrap().len(), 600);

        let summary: serde_json::Value =
            serde_json::from_str(&history_summary_json(&history).unwrap()).unwrap();
        let item = &summary["analyses"][0];
        assert_eq!(item["jobTitle"], "Senior \"Rust\" Engineer");
        assert_eq!(item["salary"], "$150k");
        assert_eq!(item["description"].as_str().unwrap(), format!("{}...", "x".repeat(500)));
    }

    #[test]
    fn test_export_format_from_str() {
        assert_eq!("CSV".parse::<ExportFormat>().unwrap(), ExportFormat::Csv);
        assert_eq!("txt".parse::<ExportFormat>().unwrap().extension(), "txt");
        assert!("pdf".parse::<ExportFormat>().is_err());
    }
}
