// src/web/types.rs
use crate::history::{AnalysisRecord, HistoryStats};
use crate::job_analysis::{AnalysisError, JobAnalyzer, JobPosting};
use rocket::http::Status;
use rocket::response::status::Custom;
use rocket::serde::json::Json;
use rocket::serde::{Deserialize, Serialize};

pub struct ServerState {
    pub analyzer: JobAnalyzer,
}

pub type ApiError = Custom<Json<StandardErrorResponse>>;
pub type ApiResult<T> = Result<Json<T>, ApiError>;

#[derive(Serialize)]
#[serde(crate = "rocket::serde")]
pub struct TextResponse {
    #[serde(rename = "type")]
    pub response_type: ResponseType,
    pub success: bool,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub conversation_id: Option<String>,
}

#[derive(Serialize)]
#[serde(crate = "rocket::serde")]
pub struct DataResponse<T> {
    #[serde(rename = "type")]
    pub response_type: ResponseType,
    pub success: bool,
    pub message: String,
    pub data: T,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub conversation_id: Option<String>,
}

#[derive(Serialize)]
#[serde(crate = "rocket::serde")]
pub struct ActionResponse {
    #[serde(rename = "type")]
    pub response_type: ResponseType,
    pub success: bool,
    pub message: String,
    pub action: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub conversation_id: Option<String>,
}

#[derive(Serialize)]
#[serde(crate = "rocket::serde")]
pub struct StandardErrorResponse {
    #[serde(rename = "type")]
    pub response_type: ResponseType,
    pub success: bool,
    pub error: String,
    pub error_code: String,
    pub suggestions: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub conversation_id: Option<String>,
}

#[derive(Serialize)]
#[serde(crate = "rocket::serde", rename_all = "lowercase")]
pub enum ResponseType {
    Text,
    Data,
    Action,
    Error,
}

// Request types with conversation_id support
#[derive(Deserialize)]
#[serde(crate = "rocket::serde")]
pub struct StandardRequest<T> {
    #[serde(flatten)]
    pub data: T,
    pub conversation_id: Option<String>,
}

pub trait WithConversationId {
    fn conversation_id(&self) -> Option<String>;
}

impl<T> WithConversationId for StandardRequest<T> {
    fn conversation_id(&self) -> Option<String> {
        self.conversation_id.clone()
    }
}

/// Either a ready posting, a page to read (`html` + `url`), or a URL to fetch.
#[derive(Deserialize)]
#[serde(crate = "rocket::serde")]
pub struct AnalyzeJobRequest {
    pub job_data: Option<JobPosting>,
    pub url: Option<String>,
    pub html: Option<String>,
    /// Overrides the stored profile when present.
    pub resume_text: Option<String>,
    pub preferences_text: Option<String>,
}

#[derive(Deserialize)]
#[serde(crate = "rocket::serde")]
pub struct ScrapeRequest {
    pub url: String,
    pub html: Option<String>,
}

#[derive(Serialize)]
#[serde(crate = "rocket::serde")]
pub struct HistoryData {
    pub stats: HistoryStats,
    pub analyses: Vec<AnalysisRecord>,
}

impl TextResponse {
    pub fn success(message: String, conversation_id: Option<String>) -> Self {
        Self {
            response_type: ResponseType::Text,
            success: true,
            message,
            conversation_id,
        }
    }
}

impl<T> DataResponse<T> {
    pub fn success(message: String, data: T, conversation_id: Option<String>) -> Self {
        Self {
            response_type: ResponseType::Data,
            success: true,
            message,
            data,
            conversation_id,
        }
    }
}

impl ActionResponse {
    pub fn success(message: String, action: String, conversation_id: Option<String>) -> Self {
        Self {
            response_type: ResponseType::Action,
            success: true,
            message,
            action,
            conversation_id,
        }
    }
}

impl StandardErrorResponse {
    pub fn new(
        error: String,
        error_code: String,
        suggestions: Vec<String>,
        conversation_id: Option<String>,
    ) -> Self {
        Self {
            response_type: ResponseType::Error,
            success: false,
            error,
            error_code,
            suggestions,
            conversation_id,
        }
    }

    pub fn with_status(self, status: Status) -> ApiError {
        Custom(status, Json(self))
    }
}

pub fn analysis_error_status(err: &AnalysisError) -> Status {
    match err {
        AnalysisError::MissingInput => Status::BadRequest,
        AnalysisError::MissingPageData(_) => Status::UnprocessableEntity,
        AnalysisError::NotificationFailure(_) => Status::BadGateway,
    }
}

/// Map any failure to the standard error body; domain errors keep their code.
pub fn api_error(err: &anyhow::Error, conversation_id: Option<String>) -> ApiError {
    match err.downcast_ref::<AnalysisError>() {
        Some(analysis_error) => StandardErrorResponse::new(
            analysis_error.to_string(),
            analysis_error.code().to_string(),
            analysis_error.suggestions(),
            conversation_id,
        )
        .with_status(analysis_error_status(analysis_error)),
        None => StandardErrorResponse::new(
            format!("{:#}", err),
            "INTERNAL_ERROR".to_string(),
            vec![
                "Try again in a few moments".to_string(),
                "Check the server logs for details".to_string(),
            ],
            conversation_id,
        )
        .with_status(Status::InternalServerError),
    }
}
