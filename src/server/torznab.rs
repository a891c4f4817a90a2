//! Torznab HTTP handlers (§6): indexer listing, caps, search, health.
//! Grounded on the teacher's `server/api_indexers.rs` handler shape, adapted
//! to the production error-collapse policy (§7) the teacher never needed.

use std::sync::Arc;

use axum::extract::{Path, Query, State};
use axum::http::{StatusCode, header};
use axum::response::{IntoResponse, Response};
use serde::Deserialize;
use serde_json::json;

use crate::app::AppContext;
use crate::models::Query as CoreQuery;
use crate::presenter::torznab;
use crate::usecase::search;

pub async fn list_indexers(State(ctx): State<Arc<AppContext>>) -> Response {
    let indexers: Vec<_> = ctx
        .plugin_registry
        .list_names()
        .iter()
        .map(|name| json!({ "name": name }))
        .collect();
    axum::Json(json!({ "indexers": indexers })).into_response()
}

#[derive(Debug, Deserialize)]
pub struct TorznabParams {
    t: Option<String>,
    q: Option<String>,
    cat: Option<i32>,
    season: Option<u32>,
    ep: Option<u32>,
    offset: Option<u32>,
    limit: Option<u32>,
    extended: Option<String>,
}

pub async fn torznab_endpoint(
    State(ctx): State<Arc<AppContext>>,
    Path(plugin): Path<String>,
    Query(params): Query<TorznabParams>,
) -> Response {
    match params.t.as_deref() {
        Some("caps") => xml_response(torznab::caps_document()),
        Some("search") | None => search_endpoint(&ctx, &plugin, params).await,
        Some(other) => (StatusCode::BAD_REQUEST, format!("unsupported t={other}")).into_response(),
    }
}

async fn search_endpoint(ctx: &AppContext, plugin: &str, params: TorznabParams) -> Response {
    let query = CoreQuery {
        plugin_name: plugin.to_string(),
        q: params.q,
        category: params.cat,
        season: params.season,
        episode: params.ep,
        extended: params.extended.as_deref() == Some("1"),
        offset: params.offset,
        limit: params.limit,
    };

    match search::search(ctx, &query).await {
        Ok(outcome) => {
            let body = torznab::results_document(plugin, &outcome.items);
            // §4.7 step 3 / scenario 4: signal a served-from-cache response.
            let cache_status = if outcome.cache_hit { "HIT" } else { "MISS" };
            ([(header::CONTENT_TYPE, "application/xml; charset=utf-8"), (header::HeaderName::from_static("x-cache"), cache_status)], body)
                .into_response()
        }
        Err(err) => {
            tracing::warn!(plugin, error = %err, "torznab search failed");
            if ctx.config.environment.is_production() {
                // §7: never surface failure to the indexer manager, or it
                // will disable the source.
                xml_response(torznab::empty_results_document(plugin))
            } else {
                let status = StatusCode::from_u16(err.dev_status_code()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
                (status, xml_headers(), torznab::empty_results_document(plugin)).into_response()
            }
        }
    }
}

pub async fn health(State(ctx): State<Arc<AppContext>>, Path(plugin): Path<String>) -> Response {
    let Ok(instance) = ctx.plugin_registry.get(&plugin).await else {
        return (StatusCode::NOT_FOUND, axum::Json(json!({ "error": "plugin not found" }))).into_response();
    };

    let mut domain_status = Vec::new();
    let mut overall = false;
    for domain in &instance.descriptor().domains {
        let url = format!("https://{domain}");
        let reachable = ctx
            .http_client
            .head(&url)
            .send()
            .await
            .is_ok_and(|response| response.status().as_u16() < 500);
        overall |= reachable;
        domain_status.push(json!({ "domain": domain, "reachable": reachable }));
    }

    axum::Json(json!({ "plugin": plugin, "domains": domain_status, "overall": overall })).into_response()
}

fn xml_headers() -> [(header::HeaderName, &'static str); 1] {
    [(header::CONTENT_TYPE, "application/xml; charset=utf-8")]
}

fn xml_response(body: String) -> Response {
    (xml_headers(), body).into_response()
}
