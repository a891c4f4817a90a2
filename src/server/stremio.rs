//! Stremio addon handlers (§6): manifest, catalog passthrough, ranked
//! stream list, and the lazy `/play/{stream_id}` redirect.

use std::sync::Arc;

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Redirect, Response};
use serde_json::json;
use tokio_util::sync::CancellationToken;

use crate::app::AppContext;
use crate::presenter::stremio;
use crate::usecase::stream::{self, MediaRequest};

pub async fn manifest() -> Response {
    axum::Json(stremio::manifest()).into_response()
}

pub async fn catalog(Path((_kind, _id)): Path<(String, String)>) -> Response {
    axum::Json(stremio::catalog()).into_response()
}

/// `id` is `tt1234567` for a movie or `tt1234567:1:3` (season:episode) for a
/// series episode (§6).
pub async fn stream_list(State(ctx): State<Arc<AppContext>>, Path((kind, id)): Path<(String, String)>) -> Response {
    let Some(request) = parse_media_id(&kind, &id) else {
        return (StatusCode::BAD_REQUEST, axum::Json(json!({ "error": "malformed stream id" }))).into_response();
    };

    match stream::streams(&ctx, &request, CancellationToken::new()).await {
        Ok(outcome) => axum::Json(stremio::stream_list(&outcome.ranked, "/api/v1/stremio/play")).into_response(),
        Err(err) => {
            tracing::warn!(error = %err, "stream lookup failed");
            let status = StatusCode::from_u16(err.dev_status_code()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
            (status, axum::Json(json!({ "error": err.to_string() }))).into_response()
        }
    }
}

pub async fn play(State(ctx): State<Arc<AppContext>>, Path(stream_id): Path<String>) -> Response {
    match stream::resolve_play(&ctx, &stream_id).await {
        Ok(direct_url) => Redirect::temporary(&direct_url).into_response(),
        Err(err) => {
            let status = StatusCode::from_u16(err.dev_status_code()).unwrap_or(StatusCode::NOT_FOUND);
            (status, axum::Json(json!({ "error": err.to_string() }))).into_response()
        }
    }
}

fn parse_media_id(kind: &str, id: &str) -> Option<MediaRequest> {
    let category = match kind {
        "movie" => 2000,
        "series" => 5000,
        _ => return None,
    };

    let mut parts = id.splitn(3, ':');
    let imdb_id = parts.next()?.to_string();
    let season = parts.next().and_then(|s| s.parse().ok());
    let episode = parts.next().and_then(|s| s.parse().ok());

    Some(MediaRequest { imdb_id, category, season, episode })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_movie_id_without_season_episode() {
        let request = parse_media_id("movie", "tt0371746").unwrap();
        assert_eq!(request.imdb_id, "tt0371746");
        assert_eq!(request.category, 2000);
        assert_eq!(request.season, None);
    }

    #[test]
    fn parses_series_id_with_season_and_episode() {
        let request = parse_media_id("series", "tt0944947:1:3").unwrap();
        assert_eq!(request.season, Some(1));
        assert_eq!(request.episode, Some(3));
        assert_eq!(request.category, 5000);
    }

    #[test]
    fn rejects_unknown_kind() {
        assert!(parse_media_id("album", "tt0371746").is_none());
    }
}
