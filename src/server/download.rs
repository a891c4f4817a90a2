//! CrawlJob download handlers (§6): serves the bit-exact `.crawljob` file
//! and a JSON metadata view.

use std::sync::Arc;

use axum::extract::{Path, State};
use axum::http::{StatusCode, header};
use axum::response::{IntoResponse, Response};
use serde_json::json;

use crate::app::AppContext;
use crate::models::MEDIA_TYPE;

pub async fn download(State(ctx): State<Arc<AppContext>>, Path(job_id): Path<uuid::Uuid>) -> Response {
    match ctx.crawljob_repo.get_or_not_found(job_id).await {
        Ok(job) => {
            let body = job.to_wire();
            let filename = job.safe_filename();
            (
                StatusCode::OK,
                [
                    (header::CONTENT_TYPE, MEDIA_TYPE.to_string()),
                    (header::CONTENT_DISPOSITION, format!("attachment; filename=\"{filename}\"")),
                    (header::HeaderName::from_static("x-crawljob-id"), job.job_id.to_string()),
                    (header::HeaderName::from_static("x-crawljob-package"), job.package_name.clone()),
                    (header::HeaderName::from_static("x-crawljob-links"), job.validated_urls.len().to_string()),
                ],
                body,
            )
                .into_response()
        }
        Err(err) => {
            let status = StatusCode::from_u16(err.dev_status_code()).unwrap_or(StatusCode::NOT_FOUND);
            (status, axum::Json(json!({ "error": err.to_string() }))).into_response()
        }
    }
}

pub async fn info(State(ctx): State<Arc<AppContext>>, Path(job_id): Path<uuid::Uuid>) -> Response {
    match ctx.crawljob_repo.get_or_not_found(job_id).await {
        Ok(job) => axum::Json(job).into_response(),
        Err(err) => {
            let status = StatusCode::from_u16(err.dev_status_code()).unwrap_or(StatusCode::NOT_FOUND);
            (status, axum::Json(json!({ "error": err.to_string() }))).into_response()
        }
    }
}
