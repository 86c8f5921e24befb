//! Axum route handlers for the Batch API.

use axum::{
    extract::{Multipart, Path, State},
    http::{header, StatusCode},
    response::IntoResponse,
    Json,
};
use tracing::{error, info};
use uuid::Uuid;

use crate::errors::AppError;
use crate::extraction::pipeline::{BatchPipeline, Upload};
use crate::extraction::store::Download;
use crate::models::batch::BatchReport;
use crate::state::AppState;

/// Name offered to the browser for the CSV download.
pub const DOWNLOAD_FILE_NAME: &str = "ResumeLens.csv";

/// POST /api/v1/batches
///
/// Accepts one or more files (ZIP, PDF, DOCX) as multipart form data and
/// starts processing them in the background. Without files nothing is started
/// and the report says the service is awaiting input.
pub async fn handle_create_batch(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> Result<(StatusCode, Json<BatchReport>), AppError> {
    let mut uploads = Vec::new();

    while let Some(field) = multipart.next_field().await? {
        // Browsers send an empty file part when nothing was selected.
        let Some(file_name) = field.file_name().map(base_name).filter(|n| !n.is_empty()) else {
            continue;
        };
        let bytes = field.bytes().await?;
        uploads.push(Upload { file_name, bytes });
    }

    if uploads.is_empty() {
        return Ok((StatusCode::OK, Json(BatchReport::awaiting_input())));
    }

    let (batch_id, report) = state.batches.start(uploads.len()).await;
    info!("Batch {batch_id} started with {} upload(s)", uploads.len());

    tokio::spawn(run_batch(state, batch_id, uploads));

    Ok((StatusCode::ACCEPTED, Json(report)))
}

async fn run_batch(state: AppState, batch_id: Uuid, uploads: Vec<Upload>) {
    let pipeline = BatchPipeline::new(state.extractor.as_ref(), state.fields, &state.settings);
    match pipeline.run(uploads).await {
        Ok(outcome) => state.batches.finish(batch_id, outcome).await,
        Err(e) => {
            error!("Batch {batch_id} failed to build its table: {e}");
            state
                .batches
                .fail(batch_id, format!("Failed to build the results table: {e}"))
                .await;
        }
    }
}

/// GET /api/v1/batches/:id
pub async fn handle_get_batch(
    State(state): State<AppState>,
    Path(batch_id): Path<Uuid>,
) -> Result<Json<BatchReport>, AppError> {
    state
        .batches
        .report(batch_id)
        .await
        .map(Json)
        .ok_or_else(|| AppError::NotFound(format!("Batch {batch_id} not found")))
}

/// GET /api/v1/batches/:id/download
///
/// Returns the batch table as a CSV attachment.
pub async fn handle_download(
    State(state): State<AppState>,
    Path(batch_id): Path<Uuid>,
) -> Result<impl IntoResponse, AppError> {
    let download = state
        .batches
        .download(batch_id)
        .await
        .ok_or_else(|| AppError::NotFound(format!("Batch {batch_id} not found")))?;

    match download {
        Download::Ready(csv) => Ok((
            [
                (header::CONTENT_TYPE, "text/csv; charset=utf-8".to_string()),
                (
                    header::CONTENT_DISPOSITION,
                    format!("attachment; filename=\"{DOWNLOAD_FILE_NAME}\""),
                ),
            ],
            csv.as_ref().clone(),
        )),
        Download::Processing => Err(AppError::Conflict(format!(
            "Batch {batch_id} is still processing"
        ))),
        Download::Empty => Err(AppError::NotFound(format!(
            "Batch {batch_id} produced no records"
        ))),
    }
}

/// Strips any client-side directory prefix from an uploaded file name.
fn base_name(raw: &str) -> String {
    raw.rsplit(['/', '\\']).next().unwrap_or(raw).trim().to_string()
}
