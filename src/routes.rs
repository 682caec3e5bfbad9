use std::sync::Arc;
use std::time::Duration;

use axum::extract::{Query, State};
use axum::http::Method;
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::{Json, Router};
use reqwest::Client;
use tower_http::cors::{Any, CorsLayer};

use crate::api;
use crate::config::{BridgeConfig, Upstream};
use crate::data_structs::{self, HistoryQuery, SymbolInfo, SymbolQuery, UdfConfig};
use crate::error::{self, UdfError};
use crate::resolution;

/// Immutable after startup; shared by every request.
pub struct AppState {
    pub config: BridgeConfig,
    pub client: Client,
}

impl AppState {
    pub fn new(config: BridgeConfig) -> reqwest::Result<Arc<Self>> {
        let client = api::build_client(config.upstream_timeout)?;
        Ok(Arc::new(Self { config, client }))
    }
}

/// Assemble the UDF router under the configured prefix.
pub fn udf_router(state: Arc<AppState>) -> Router {
    let udf = Router::new()
        .route("/config", get(config_handler))
        .route("/symbols", get(symbols_handler))
        .route("/history", get(history_handler));

    let prefix = state.config.route_prefix.clone();
    let app = if prefix.is_empty() {
        Router::new().merge(udf)
    } else {
        Router::new().nest(&prefix, udf)
    };

    app.layer(cors_layer()).with_state(state)
}

fn cors_layer() -> CorsLayer {
    CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::GET])
        .allow_headers(Any)
        .max_age(Duration::from_secs(12 * 60 * 60))
}

async fn config_handler(State(state): State<Arc<AppState>>) -> Json<UdfConfig> {
    Json(data_structs::udf_config(state.config.upstream))
}

async fn symbols_handler(
    State(state): State<Arc<AppState>>,
    Query(pairs): Query<Vec<(String, String)>>,
) -> Json<SymbolInfo> {
    let q = SymbolQuery::from_pairs(&pairs);
    Json(data_structs::symbol_info(state.config.upstream, &q.symbol))
}

async fn history_handler(
    State(state): State<Arc<AppState>>,
    Query(pairs): Query<Vec<(String, String)>>,
) -> Response {
    let q = HistoryQuery::from_pairs(&pairs);
    match history(&state, &q).await {
        Ok(resp) => resp,
        Err(e) => {
            tracing::warn!("history {} {}: {e}", q.symbol, q.resolution);
            e.into_response()
        }
    }
}

fn parse_timestamp(name: &'static str, raw: Option<&str>) -> Result<i64, UdfError> {
    let raw = raw.map(str::trim).filter(|s| !s.is_empty());
    let Some(raw) = raw else {
        return Err(UdfError::MissingParam(name));
    };
    raw.parse::<i64>().map_err(|source| UdfError::InvalidParam {
        name,
        value: raw.to_string(),
        source,
    })
}

async fn history(state: &AppState, q: &HistoryQuery) -> Result<Response, UdfError> {
    let from = parse_timestamp("from", q.from.as_deref())?;
    let to = parse_timestamp("to", q.to.as_deref())?;

    let upstream = state.config.upstream;
    let (size, period) = resolution::time_diff(upstream, &q.resolution, from, to);
    if period.is_empty() {
        return Err(UdfError::UnsupportedResolution(q.resolution.clone()));
    }

    let url = api::kline_url(upstream, &state.config.upstream_url, period, size, &q.symbol)?;

    match upstream {
        Upstream::Zg => {
            let bars = api::get_zg_candles(&state.client, url).await?;
            tracing::debug!("{} {}: {} bars", q.symbol, period, bars.len());
            if bars.is_empty() {
                return Ok(error::no_data());
            }
            Ok(Json(bars).into_response())
        }
        Upstream::Huobi => {
            let history = api::get_huobi_candles(&state.client, url).await?;
            tracing::debug!("{} {}: {} bars", q.symbol, period, history.data.len());
            if history.data.is_empty() {
                return Ok(error::no_data());
            }
            Ok(Json(history).into_response())
        }
    }
}
