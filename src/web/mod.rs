// src/web/mod.rs

pub mod handlers;
pub mod types;

pub use handlers::*;
pub use types::*;

use crate::job_analysis::JobAnalyzer;
use anyhow::Result;
use rocket::fairing::{Fairing, Info, Kind};
use rocket::http::{Header, Status};
use rocket::serde::json::Json;
use rocket::{catchers, get, options, post, routes, Build, Request, Response, Rocket, State};
use tracing::info;

// CORS Fairing
pub struct Cors;

#[rocket::async_trait]
impl Fairing for Cors {
    fn info(&self) -> Info {
        Info {
            name: "Add CORS headers to responses",
            kind: Kind::Response,
        }
    }

    async fn on_response<'r>(&self, _request: &'r Request<'_>, response: &mut Response<'r>) {
        response.set_header(Header::new("Access-Control-Allow-Origin", "*"));
        response.set_header(Header::new(
            "Access-Control-Allow-Methods",
            "POST, GET, OPTIONS",
        ));
        response.set_header(Header::new("Access-Control-Allow-Headers", "*"));
    }
}

#[post("/analyze-job-fit", data = "<request>")]
pub async fn analyze_job_fit(
    request: Json<StandardRequest<AnalyzeJobRequest>>,
    state: &State<ServerState>,
) -> ApiResult<DataResponse<crate::history::AnalysisRecord>> {
    handlers::analyze_job_fit_handler(request, state).await
}

#[post("/scrape", data = "<request>")]
pub async fn scrape(
    request: Json<StandardRequest<ScrapeRequest>>,
    state: &State<ServerState>,
) -> ApiResult<DataResponse<crate::job_analysis::JobPosting>> {
    handlers::scrape_handler(request, state).await
}

#[get("/history?<band>&<search>")]
pub async fn get_history(
    band: Option<String>,
    search: Option<String>,
    state: &State<ServerState>,
) -> ApiResult<DataResponse<HistoryData>> {
    handlers::get_history_handler(band, search, state).await
}

#[post("/history/clear")]
pub async fn clear_history(state: &State<ServerState>) -> ApiResult<ActionResponse> {
    handlers::clear_history_handler(state).await
}

#[post("/webhook/test")]
pub async fn test_webhook(state: &State<ServerState>) -> ApiResult<TextResponse> {
    handlers::test_webhook_handler(state).await
}

#[get("/health")]
pub async fn health() -> Json<TextResponse> {
    handlers::health_handler().await
}

#[options("/<_..>")]
pub async fn options() -> Status {
    Status::Ok
}

// Error catchers
#[rocket::catch(400)]
pub fn bad_request() -> Json<StandardErrorResponse> {
    Json(StandardErrorResponse::new(
        "Invalid request format".to_string(),
        "BAD_REQUEST".to_string(),
        vec![
            "Check your request JSON format".to_string(),
            "Verify all required fields are present".to_string(),
        ],
        None,
    ))
}

#[rocket::catch(404)]
pub fn not_found() -> Json<StandardErrorResponse> {
    Json(StandardErrorResponse::new(
        "Endpoint not found".to_string(),
        "NOT_FOUND".to_string(),
        vec!["Available endpoints live under /api".to_string()],
        None,
    ))
}

#[rocket::catch(422)]
pub fn unprocessable() -> Json<StandardErrorResponse> {
    Json(StandardErrorResponse::new(
        "Request body does not match the expected shape".to_string(),
        "INVALID_BODY".to_string(),
        vec!["A job_data object needs at least a title".to_string()],
        None,
    ))
}

#[rocket::catch(500)]
pub fn internal_error() -> Json<StandardErrorResponse> {
    Json(StandardErrorResponse::new(
        "Internal server error".to_string(),
        "INTERNAL_ERROR".to_string(),
        vec![
            "Try again in a few moments".to_string(),
            "Check the server logs for details".to_string(),
        ],
        None,
    ))
}

pub fn build_rocket(analyzer: JobAnalyzer) -> Rocket<Build> {
    rocket::build()
        .attach(Cors)
        .manage(ServerState { analyzer })
        .register(
            "/api",
            catchers![bad_request, not_found, unprocessable, internal_error],
        )
        .mount(
            "/api",
            routes![
                analyze_job_fit,
                scrape,
                get_history,
                clear_history,
                test_webhook,
                health,
                options,
            ],
        )
}

pub async fn start_web_server(analyzer: JobAnalyzer, address: String, port: u16) -> Result<()> {
    info!("Starting jobfit API server on http://{}:{}", address, port);
    info!(
        "History: {}",
        analyzer.config().paths.history_path.display()
    );

    let figment = rocket::Config::figment()
        .merge(("address", address))
        .merge(("port", port));

    build_rocket(analyzer)
        .configure(figment)
        .launch()
        .await
        .map_err(|e| anyhow::anyhow!("Server failed: {}", e))?;

    Ok(())
}
