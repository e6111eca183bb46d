// src/history.rs
//! Persistent log of past analyses, newest first.

use crate::core::FsOps;
use crate::job_analysis::{JobPosting, MatchAnalysis};
use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use tokio::sync::Mutex;
use tracing::info;
use uuid::Uuid;

pub const MAX_RECORDS: usize = 100;
pub const HIGH_MATCH_SCORE: f64 = 70.0;
pub const MEDIUM_MATCH_SCORE: f64 = 40.0;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalysisRecord {
    pub id: Uuid,
    pub job_data: JobPosting,
    pub analysis: MatchAnalysis,
    pub analyzed_at: DateTime<Utc>,
}

impl AnalysisRecord {
    pub fn new(job_data: JobPosting, analysis: MatchAnalysis) -> Self {
        Self {
            id: Uuid::new_v4(),
            job_data,
            analysis,
            analyzed_at: Utc::now(),
        }
    }

    fn mentions(&self, needle: &str) -> bool {
        [
            &self.job_data.title,
            &self.job_data.company,
            &self.job_data.location,
        ]
        .iter()
        .any(|field| field.to_lowercase().contains(needle))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ScoreBand {
    #[default]
    All,
    High,
    Medium,
    Low,
}

impl ScoreBand {
    pub fn contains(self, score: f64) -> bool {
        match self {
            Self::All => true,
            Self::High => score >= HIGH_MATCH_SCORE,
            Self::Medium => (MEDIUM_MATCH_SCORE..HIGH_MATCH_SCORE).contains(&score),
            Self::Low => score < MEDIUM_MATCH_SCORE,
        }
    }
}

impl FromStr for ScoreBand {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "" | "all" => Ok(Self::All),
            "high" => Ok(Self::High),
            "medium" => Ok(Self::Medium),
            "low" => Ok(Self::Low),
            other => anyhow::bail!("Unknown score band: {}. Use all, high, medium or low", other),
        }
    }
}

impl fmt::Display for ScoreBand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::All => "all",
            Self::High => "high",
            Self::Medium => "medium",
            Self::Low => "low",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HistoryStats {
    pub total_analyses: usize,
    pub average_score: u32,
    pub high_matches: usize,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AnalysisHistory {
    records: Vec<AnalysisRecord>,
}

impl AnalysisHistory {
    /// A missing file is an empty history.
    pub async fn load(path: &Path) -> Result<Self> {
        if !FsOps::file_exists(path).await {
            return Ok(Self::default());
        }
        let content = FsOps::read_file_safe(path).await?;
        serde_json::from_str(&content)
            .with_context(|| format!("Failed to parse history: {}", path.display()))
    }

    pub async fn save(&self, path: &Path) -> Result<()> {
        let content = serde_json::to_string_pretty(self).context("Failed to serialize history")?;
        FsOps::write_file_safe(path, &content).await
    }

    pub fn record(&mut self, record: AnalysisRecord) {
        self.records.insert(0, record);
        self.records.truncate(MAX_RECORDS);
    }

    pub fn records(&self) -> &[AnalysisRecord] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn clear(&mut self) {
        self.records.clear();
    }

    pub fn stats(&self) -> HistoryStats {
        let total = self.records.len();
        let average_score = if total == 0 {
            0
        } else {
            let sum: f64 = self.records.iter().map(|r| r.analysis.match_score).sum();
            (sum / total as f64).round() as u32
        };
        let high_matches = self
            .records
            .iter()
            .filter(|r| r.analysis.match_score >= HIGH_MATCH_SCORE)
            .count();

        HistoryStats {
            total_analyses: total,
            average_score,
            high_matches,
        }
    }

    /// Records in `band` whose title, company or location contain `search`
    /// (case-insensitive). An empty search matches everything.
    pub fn filter(&self, band: ScoreBand, search: &str) -> Vec<&AnalysisRecord> {
        let needle = search.trim().to_lowercase();
        self.records
            .iter()
            .filter(|r| band.contains(r.analysis.match_score))
            .filter(|r| needle.is_empty() || r.mentions(&needle))
            .collect()
    }
}

/// File-backed history with serialized read-modify-write access.
pub struct HistoryStore {
    path: PathBuf,
    lock: Mutex<()>,
}

impl HistoryStore {
    pub fn new(path: PathBuf) -> Self {
        Self {
            path,
            lock: Mutex::new(()),
        }
    }

    pub async fn snapshot(&self) -> Result<AnalysisHistory> {
        let _guard = self.lock.lock().await;
        AnalysisHistory::load(&self.path).await
    }

    pub async fn append(&self, record: AnalysisRecord) -> Result<()> {
        let _guard = self.lock.lock().await;
        let mut history = AnalysisHistory::load(&self.path).await?;
        info!(
            "Recording analysis {} ({}: {:.1})",
            record.id, record.job_data.title, record.analysis.match_score
        );
        history.record(record);
        history.save(&self.path).await
    }

    pub async fn clear(&self) -> Result<usize> {
        let _guard = self.lock.lock().await;
        let mut history = AnalysisHistory::load(&self.path).await?;
        let removed = history.len();
        history.clear();
        history.save(&self.path).await?;
        info!("Cleared {} history records", removed);
        Ok(removed)
    }
}
