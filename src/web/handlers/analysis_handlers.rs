// src/web/handlers/analysis_handlers.rs
use crate::export::format_score;
use crate::history::AnalysisRecord;
use crate::job_analysis::{read_job_posting, AnalysisError, CandidateProfile, JobPosting, JobSource};
use crate::web::types::*;

use rocket::serde::json::Json;
use rocket::State;
use tracing::{error, info};

pub async fn analyze_job_fit_handler(
    request: Json<StandardRequest<AnalyzeJobRequest>>,
    state: &State<ServerState>,
) -> ApiResult<DataResponse<AnalysisRecord>> {
    let conversation_id = request.conversation_id();
    let StandardRequest { data, .. } = request.into_inner();

    let job = resolve_job(&data, state)
        .await
        .map_err(|e| api_error(&e, conversation_id.clone()))?;

    let profile = data
        .resume_text
        .map(|resume| CandidateProfile::new(resume, data.preferences_text.unwrap_or_default()));

    match state.analyzer.analyze(job, profile).await {
        Ok(outcome) => {
            let score = outcome.record.analysis.match_score;
            info!("Analysis {} served ({})", outcome.record.id, score);
            Ok(Json(DataResponse::success(
                format!("Match score: {}%", format_score(score)),
                outcome.record,
                conversation_id,
            )))
        }
        Err(e) => {
            error!("Job analysis failed: {:#}", e);
            Err(api_error(&e, conversation_id))
        }
    }
}

async fn resolve_job(
    request: &AnalyzeJobRequest,
    state: &State<ServerState>,
) -> anyhow::Result<JobPosting> {
    if let Some(job) = &request.job_data {
        return Ok(job.clone());
    }
    match (&request.url, &request.html) {
        (Some(url), Some(html)) => Ok(read_job_posting(url, html)?),
        (Some(url), None) => {
            state
                .analyzer
                .load_job(&JobSource::Url(url.clone()))
                .await
        }
        _ => Err(AnalysisError::MissingPageData(
            "request has no job_data, url or html".to_string(),
        )
        .into()),
    }
}

pub async fn scrape_handler(
    request: Json<StandardRequest<ScrapeRequest>>,
    state: &State<ServerState>,
) -> ApiResult<DataResponse<JobPosting>> {
    let conversation_id = request.conversation_id();
    let url = request.data.url.clone();

    let result = match &request.data.html {
        Some(html) => read_job_posting(&url, html).map_err(anyhow::Error::from),
        None => state.analyzer.load_job(&JobSource::Url(url.clone())).await,
    };

    match result {
        Ok(job) => Ok(Json(DataResponse::success(
            format!("Read job: {} at {}", job.title, job.company),
            job,
            conversation_id,
        ))),
        Err(e) => {
            error!("Scrape failed for {}: {:#}", url, e);
            Err(api_error(&e, conversation_id))
        }
    }
}
