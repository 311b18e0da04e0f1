//! File gateway handlers: upload, list, download, delete.

use crate::error::{ApiError, ApiResult};
use crate::state::AppState;
use axum::Json;
use axum::body::Body;
use axum::extract::{Multipart, Path, State};
use axum::http::StatusCode;
use axum::http::header::{CONTENT_LENGTH, CONTENT_TYPE};
use axum::response::{IntoResponse, Response};
use coffer_core::{FileId, FileRecord};
use futures::{StreamExt, TryStreamExt};
use serde::Serialize;

/// Multipart field name carrying the file payload.
const FILE_FIELD: &str = "file";

/// Content type assumed when the client does not provide one.
const DEFAULT_CONTENT_TYPE: &str = "application/octet-stream";

/// File summary returned by upload and listing, kept shape-compatible with
/// existing clients.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FileSummary {
    file_id: String,
    file_name: String,
    file_url: String,
}

impl FileSummary {
    fn from_record(state: &AppState, record: &FileRecord) -> Self {
        Self {
            file_id: record.id.to_string(),
            file_name: record.filename.clone(),
            file_url: state.file_url(record.id),
        }
    }
}

/// POST /upload - Store one multipart file.
///
/// Only the `file` field is consumed; the field body is streamed into the
/// engine chunk by chunk, never buffered whole.
#[tracing::instrument(skip(state, multipart), fields(filename))]
pub async fn upload_file(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> ApiResult<(StatusCode, Json<FileSummary>)> {
    while let Some(field) = multipart.next_field().await? {
        if field.name() != Some(FILE_FIELD) {
            continue;
        }

        let filename = field
            .file_name()
            .filter(|name| !name.is_empty())
            .unwrap_or("unnamed")
            .to_string();
        let content_type = field
            .content_type()
            .unwrap_or(DEFAULT_CONTENT_TYPE)
            .to_string();

        tracing::Span::current().record("filename", filename.as_str());

        let source = futures::stream::try_unfold(field, |mut field| async move {
            match field.chunk().await {
                Ok(Some(bytes)) => Ok(Some((bytes, field))),
                Ok(None) => Ok(None),
                Err(e) => Err(std::io::Error::other(e)),
            }
        });

        let record = state.engine.upload(&filename, &content_type, source).await?;

        return Ok((
            StatusCode::CREATED,
            Json(FileSummary::from_record(&state, &record)),
        ));
    }

    Err(ApiError::BadRequest("no file uploaded".to_string()))
}

/// GET /files - List all complete files.
pub async fn list_files(State(state): State<AppState>) -> ApiResult<Json<Vec<FileSummary>>> {
    let records: Vec<FileRecord> = state.engine.list_files().try_collect().await?;

    Ok(Json(
        records
            .iter()
            .map(|record| FileSummary::from_record(&state, record))
            .collect(),
    ))
}

/// GET /files/{file_id} - Stream a file's contents.
pub async fn download_file(
    State(state): State<AppState>,
    Path(file_id): Path<String>,
) -> ApiResult<Response> {
    let id = FileId::parse(&file_id)?;

    let (record, stream) = state.engine.download(id).await?;

    // Chunks are fetched as the client consumes the body. A failure past
    // this point cannot be turned into an error status; it aborts the
    // transfer instead.
    let body_stream = stream.map(move |result| {
        result.map_err(|e| {
            tracing::error!(file_id = %id, error = %e, "download failed mid-transfer");
            std::io::Error::other(e.to_string())
        })
    });

    Ok((
        StatusCode::OK,
        [
            (CONTENT_TYPE, record.content_type.as_str()),
            (CONTENT_LENGTH, &record.length.to_string()),
        ],
        Body::from_stream(body_stream),
    )
        .into_response())
}

/// DELETE /files/{file_id} - Delete a file and its chunks.
pub async fn delete_file(
    State(state): State<AppState>,
    Path(file_id): Path<String>,
) -> ApiResult<Json<serde_json::Value>> {
    let id = FileId::parse(&file_id)?;

    state.engine.delete(id).await?;

    Ok(Json(serde_json::json!({
        "message": "File deleted successfully"
    })))
}
