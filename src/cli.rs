// src/cli.rs
use crate::core::{ConfigManager, FsOps, Settings};
use crate::export::{self, ExportFormat};
use crate::history::{AnalysisHistory, AnalysisRecord, ScoreBand};
use crate::job_analysis::{JobAnalyzer, JobSource, WebhookNotifier, WebhookPayload};
use crate::utils::export_file_name;
use anyhow::{Context, Result};
use chrono::Utc;
use clap::{Args, Parser, Subcommand};
use std::path::{Path, PathBuf};
use uuid::Uuid;

#[derive(Parser)]
#[command(name = "jobfit", version)]
#[command(about = "Score job postings against your resume and preferences")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand)]
pub enum Command {
    /// Analyze a job posting against the stored profile
    Analyze {
        #[command(flatten)]
        source: SourceArgs,
        /// Output format: text, json or csv
        #[arg(long, default_value = "text")]
        format: ExportFormat,
        /// Write the result to a file instead of stdout
        #[arg(long)]
        output: Option<PathBuf>,
    },
    /// Read a job posting without scoring it
    Scrape {
        #[command(flatten)]
        source: SourceArgs,
    },
    /// Show or update the stored resume, preferences and webhook
    #[command(subcommand)]
    Profile(ProfileCommand),
    /// Inspect past analyses
    #[command(subcommand)]
    History(HistoryCommand),
    /// Export one recorded analysis (the newest by default)
    Export {
        #[arg(long)]
        id: Option<Uuid>,
        /// Output format: json, csv or text
        #[arg(long, default_value = "json")]
        format: ExportFormat,
        /// Directory for the exported file
        #[arg(long, default_value = ".")]
        dir: PathBuf,
    },
    /// Webhook delivery
    #[command(subcommand)]
    Webhook(WebhookCommand),
    /// Run the local HTTP API
    Serve {
        #[arg(long, default_value = "127.0.0.1")]
        address: String,
        #[arg(long, default_value_t = 8000)]
        port: u16,
    },
}

#[derive(Args, Clone)]
pub struct SourceArgs {
    /// Listing URL; fetched unless --html is given
    #[arg(long)]
    pub url: Option<String>,
    /// Saved listing page, read with the site reader for --url
    #[arg(long, requires = "url")]
    pub html: Option<PathBuf>,
    /// Job posting as JSON
    #[arg(long, conflicts_with_all = ["url", "html"])]
    pub json: Option<PathBuf>,
}

impl SourceArgs {
    pub fn job_source(&self) -> Result<JobSource> {
        match (&self.url, &self.html, &self.json) {
            (_, _, Some(path)) => Ok(JobSource::JsonFile(path.clone())),
            (Some(url), Some(path), None) => Ok(JobSource::HtmlFile {
                path: path.clone(),
                url: url.clone(),
            }),
            (Some(url), None, None) => Ok(JobSource::Url(url.clone())),
            _ => anyhow::bail!("Provide --url, --url with --html, or --json"),
        }
    }
}

#[derive(Subcommand)]
pub enum ProfileCommand {
    /// Print the stored settings
    Show,
    /// Update stored settings; omitted options keep their value
    Set {
        /// File containing resume text
        #[arg(long)]
        resume: Option<PathBuf>,
        /// File containing preferences, one per line
        #[arg(long)]
        preferences: Option<PathBuf>,
        #[arg(long)]
        webhook_url: Option<String>,
        #[arg(long)]
        webhook_auth: Option<String>,
        #[arg(long)]
        auto_send: Option<bool>,
        #[arg(long)]
        webhook_timeout: Option<u64>,
    },
}

#[derive(Subcommand)]
pub enum HistoryCommand {
    /// List analyses, newest first
    List {
        /// all, high, medium or low
        #[arg(long, default_value = "all")]
        band: ScoreBand,
        /// Case-insensitive match on title, company or location
        #[arg(long)]
        search: Option<String>,
    },
    /// Totals, average score and high matches
    Stats,
    /// Remove every recorded analysis
    Clear,
    /// Write the whole history as JSON
    Export {
        /// Flattened records with shortened descriptions
        #[arg(long)]
        summary: bool,
        #[arg(long)]
        output: Option<PathBuf>,
    },
}

#[derive(Subcommand)]
pub enum WebhookCommand {
    /// Send a test payload to the configured webhook
    Test,
    /// Send a recorded analysis (the newest by default)
    Send {
        #[arg(long)]
        id: Option<Uuid>,
    },
}

pub async fn handle_command(cli: Cli) -> Result<()> {
    let config = ConfigManager::load()?;
    config.ensure_directories().await?;
    let analyzer = JobAnalyzer::new(config)?;

    match cli.command {
        Command::Analyze {
            source,
            format,
            output,
        } => {
            let job = analyzer.load_job(&source.job_source()?).await?;
            let outcome = analyzer.analyze(job, None).await?;
            let record = &outcome.record;
            let rendered = export::render(format, &record.job_data, &record.analysis, record.analyzed_at)?;
            emit(&rendered, output.as_deref()).await?;

            if let Some(handle) = outcome.webhook {
                // the process would otherwise exit before delivery
                let _ = handle.await;
            }
        }

        Command::Scrape { source } => {
            let job = analyzer.load_job(&source.job_source()?).await?;
            println!("{}", serde_json::to_string_pretty(&job)?);
        }

        Command::Profile(command) => handle_profile(&analyzer, command).await?,

        Command::History(command) => handle_history(&analyzer, command).await?,

        Command::Export { id, format, dir } => {
            let history = analyzer.history().snapshot().await?;
            let record = find_record(&history, id)?;
            let content = export::render(format, &record.job_data, &record.analysis, record.analyzed_at)?;
            let path = dir.join(export_file_name(
                &record.job_data.company,
                Utc::now().timestamp_millis(),
                format.extension(),
            ));
            FsOps::write_file_safe(&path, &content).await?;
            println!("✅ Exported to {}", path.display());
        }

        Command::Webhook(command) => handle_webhook(&analyzer, command).await?,

        Command::Serve { address, port } => {
            crate::start_web_server(analyzer, address, port).await?;
        }
    }

    Ok(())
}

async fn handle_profile(analyzer: &JobAnalyzer, command: ProfileCommand) -> Result<()> {
    let config = analyzer.config();
    match command {
        ProfileCommand::Show => {
            let settings = config.load_settings().await?;
            println!("Settings: {}", config.paths.settings_path.display());
            println!("{}", toml::to_string_pretty(&settings)?);
        }
        ProfileCommand::Set {
            resume,
            preferences,
            webhook_url,
            webhook_auth,
            auto_send,
            webhook_timeout,
        } => {
            let mut settings = config.load_settings().await?;
            apply_profile_updates(
                &mut settings,
                read_optional(resume.as_deref()).await?,
                read_optional(preferences.as_deref()).await?,
                webhook_url,
                webhook_auth,
                auto_send,
                webhook_timeout,
            );
            config.save_settings(&settings).await?;
            app_log!(info, "Settings saved to {}", config.paths.settings_path.display());
            println!("✅ Settings saved");
        }
    }
    Ok(())
}

fn apply_profile_updates(
    settings: &mut Settings,
    resume: Option<String>,
    preferences: Option<String>,
    webhook_url: Option<String>,
    webhook_auth: Option<String>,
    auto_send: Option<bool>,
    webhook_timeout: Option<u64>,
) {
    if let Some(resume) = resume {
        settings.resume_text = resume;
    }
    if let Some(preferences) = preferences {
        settings.preferences_text = preferences;
    }
    // an empty value clears the field
    if let Some(url) = webhook_url {
        settings.webhook.url = Some(url).filter(|u| !u.trim().is_empty());
    }
    if let Some(auth) = webhook_auth {
        settings.webhook.auth = Some(auth).filter(|a| !a.trim().is_empty());
    }
    if let Some(auto_send) = auto_send {
        settings.webhook.auto_send = auto_send;
    }
    if let Some(timeout) = webhook_timeout {
        settings.webhook.timeout_seconds = timeout;
    }
}

async fn handle_history(analyzer: &JobAnalyzer, command: HistoryCommand) -> Result<()> {
    match command {
        HistoryCommand::List { band, search } => {
            let history = analyzer.history().snapshot().await?;
            let records = history.filter(band, search.as_deref().unwrap_or(""));
            if records.is_empty() {
                println!("No analyses found.");
                return Ok(());
            }
            println!(
                "{:<38} {:>6}  {:<30} {:<20} {:<16}",
                "ID", "Score", "Title", "Company", "Analyzed"
            );
            println!("{}", "-".repeat(114));
            for record in records {
                println!("{}", history_row(record));
            }
        }
        HistoryCommand::Stats => {
            let stats = analyzer.history().snapshot().await?.stats();
            println!("Total analyses: {}", stats.total_analyses);
            println!("Average score:  {}%", stats.average_score);
            println!("High matches:   {}", stats.high_matches);
        }
        HistoryCommand::Clear => {
            let removed = analyzer.history().clear().await?;
            println!("✅ Removed {} analyses", removed);
        }
        HistoryCommand::Export { summary, output } => {
            let history = analyzer.history().snapshot().await?;
            if history.is_empty() {
                println!("No data to export");
                return Ok(());
            }
            let content = if summary {
                export::history_summary_json(&history)?
            } else {
                export::history_json(&history)?
            };
            emit(&content, output.as_deref()).await?;
        }
    }
    Ok(())
}

async fn handle_webhook(analyzer: &JobAnalyzer, command: WebhookCommand) -> Result<()> {
    let settings = analyzer.config().load_settings().await?;
    let notifier = WebhookNotifier::from_settings(&settings.webhook)?
        .context("No webhook URL configured. Set one with `jobfit profile set --webhook-url`")?;

    match command {
        WebhookCommand::Test => {
            notifier.send_test().await?;
            println!("✅ Test webhook sent to {}", notifier.url());
        }
        WebhookCommand::Send { id } => {
            let history = analyzer.history().snapshot().await?;
            let record = find_record(&history, id)?;
            let payload = WebhookPayload::new(record.job_data.clone(), record.analysis.clone())
                .with_source("manual_export");
            notifier.notify(&payload).await?;
            println!("✅ Sent {} to {}", record.job_data.title, notifier.url());
        }
    }
    Ok(())
}

fn find_record(history: &AnalysisHistory, id: Option<Uuid>) -> Result<&AnalysisRecord> {
    match id {
        Some(id) => history
            .records()
            .iter()
            .find(|record| record.id == id)
            .with_context(|| format!("No analysis with id {}", id)),
        None => history
            .records()
            .first()
            .context("No analyses recorded yet. Run `jobfit analyze` first"),
    }
}

fn history_row(record: &AnalysisRecord) -> String {
    format!(
        "{:<38} {:>5}%  {:<30} {:<20} {:<16}",
        record.id,
        export::format_score(record.analysis.match_score),
        clip(&record.job_data.title, 30),
        clip(&record.job_data.company, 20),
        record.analyzed_at.format("%Y-%m-%d %H:%M")
    )
}

fn clip(text: &str, width: usize) -> String {
    if text.chars().count() <= width {
        text.to_string()
    } else {
        let head: String = text.chars().take(width - 1).collect();
        format!("{}…", head)
    }
}

async fn read_optional(path: Option<&Path>) -> Result<Option<String>> {
    match path {
        Some(path) => Ok(Some(FsOps::read_file_safe(path).await?)),
        None => Ok(None),
    }
}

async fn emit(content: &str, output: Option<&Path>) -> Result<()> {
    match output {
        Some(path) => {
            FsOps::write_file_safe(path, content).await?;
            println!("✅ Written to {}", path.display());
        }
        None => println!("{}", content),
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::job_analysis::{JobPosting, MatchAnalysis};
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_analyze_with_html() {
        let cli = Cli::try_parse_from([
            "jobfit",
            "analyze",
            "--url",
            "https://www.indeed.com/viewjob?jk=1",
            "--html",
            "page.html",
            "--format",
            "csv",
        ])
        .unwrap();

        match cli.command {
            Command::Analyze { source, format, .. } => {
                assert_eq!(format, ExportFormat::Csv);
                assert!(matches!(
                    source.job_source().unwrap(),
                    JobSource::HtmlFile { ref url, .. } if url.contains("indeed.com")
                ));
            }
            _ => panic!("expected analyze"),
        }
    }

    #[test]
    fn test_html_requires_url() {
        assert!(Cli::try_parse_from(["jobfit", "scrape", "--html", "page.html"]).is_err());
        assert!(Cli::try_parse_from(["jobfit", "scrape", "--json", "a.json", "--url", "x"]).is_err());
    }

    #[test]
    fn test_missing_source_is_an_error() {
        let source = SourceArgs {
            url: None,
            html: None,
            json: None,
        };
        assert!(source.job_source().is_err());
    }

    #[test]
    fn test_parse_history_list_band() {
        let cli = Cli::try_parse_from(["jobfit", "history", "list", "--band", "medium"]).unwrap();
        assert!(matches!(
            cli.command,
            Command::History(HistoryCommand::List { band: ScoreBand::Medium, .. })
        ));
        assert!(Cli::try_parse_from(["jobfit", "history", "list", "--band", "great"]).is_err());
    }

    #[test]
    fn test_apply_profile_updates() {
        let mut settings = Settings::default();
        settings.webhook.url = Some("https://old.example.com".to_string());

        apply_profile_updates(
            &mut settings,
            Some("rust developer".to_string()),
            None,
            Some("".to_string()),
            Some("token".to_string()),
            Some(true),
            None,
        );

        assert_eq!(settings.resume_text, "rust developer");
        assert_eq!(settings.preferences_text, Settings::default().preferences_text);
        assert_eq!(settings.webhook.url, None);
        assert_eq!(settings.webhook.auth.as_deref(), Some("token"));
        assert!(settings.webhook.auto_send);
        assert_eq!(settings.webhook.timeout_seconds, 10);
    }

    #[test]
    fn test_find_record() {
        let mut history = AnalysisHistory::default();
        assert!(find_record(&history, None).is_err());

        let job = JobPosting {
            title: "Rust Engineer".to_string(),
            company: String::new(),
            location: String::new(),
            description: String::new(),
            salary: None,
            requirements: vec![],
            source_url: String::new(),
            scraped_at: None,
        };
        let analysis = MatchAnalysis {
            match_score: 50.0,
            pros: vec![],
            cons: vec![],
            recommendations: vec![],
        };
        let first = AnalysisRecord::new(job.clone(), analysis.clone());
        let first_id = first.id;
        history.record(first);
        history.record(AnalysisRecord::new(job, analysis));

        assert_ne!(find_record(&history, None).unwrap().id, first_id);
        assert_eq!(find_record(&history, Some(first_id)).unwrap().id, first_id);
        assert!(find_record(&history, Some(Uuid::new_v4())).is_err());
    }

    #[test]
    fn test_clip() {
        assert_eq!(clip("short", 10), "short");
        assert_eq!(clip("Senior Rust Engineer", 10), "Senior Ru…");
    }
}
