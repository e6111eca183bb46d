// src/web/handlers/history_handlers.rs
use crate::history::ScoreBand;
use crate::web::types::*;

use rocket::http::Status;
use rocket::serde::json::Json;
use rocket::State;
use tracing::{error, info};

pub async fn get_history_handler(
    band: Option<String>,
    search: Option<String>,
    state: &State<ServerState>,
) -> ApiResult<DataResponse<HistoryData>> {
    let band: ScoreBand = match band.as_deref().unwrap_or("all").parse() {
        Ok(band) => band,
        Err(e) => {
            return Err(StandardErrorResponse::new(
                e.to_string(),
                "INVALID_FILTER".to_string(),
                vec!["Use band=all, high, medium or low".to_string()],
                None,
            )
            .with_status(Status::BadRequest))
        }
    };

    let history = state
        .analyzer
        .history()
        .snapshot()
        .await
        .map_err(|e| {
            error!("Failed to load history: {:#}", e);
            api_error(&e, None)
        })?;

    let analyses: Vec<_> = history
        .filter(band, search.as_deref().unwrap_or(""))
        .into_iter()
        .cloned()
        .collect();

    Ok(Json(DataResponse::success(
        format!("{} of {} analyses", analyses.len(), history.len()),
        HistoryData {
            stats: history.stats(),
            analyses,
        },
        None,
    )))
}

pub async fn clear_history_handler(state: &State<ServerState>) -> ApiResult<ActionResponse> {
    match state.analyzer.history().clear().await {
        Ok(removed) => {
            info!("History cleared through API");
            Ok(Json(ActionResponse::success(
                format!("Removed {} analyses", removed),
                "history_cleared".to_string(),
                None,
            )))
        }
        Err(e) => {
            error!("Failed to clear history: {:#}", e);
            Err(api_error(&e, None))
        }
    }
}
