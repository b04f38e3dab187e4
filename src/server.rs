//! HTTP surface of the dashboard: the map view and the two user event channels.

use crate::dashboard::Dashboard;
use crate::presentation::session::{FilterChanged, SelectionChanged, SessionState};
use crate::presentation::view::{MapView, SelectionView};
use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use log::{error, info};
use polars::prelude::PolarsError;
use serde::Deserialize;
use std::future::IntoFuture;
use std::sync::Arc;
use tokio::signal;
use tokio::sync::Mutex;

pub const DEFAULT_BIND: &str = "127.0.0.1:8050";
pub const ENV_BIND: &str = "AIRMAP_BIND";

#[derive(Clone)]
pub struct ApiState {
    dashboard: Arc<Dashboard>,
    session: Arc<Mutex<SessionState>>,
}

impl ApiState {
    pub fn new(dashboard: Dashboard) -> Self {
        Self {
            dashboard: Arc::new(dashboard),
            session: Arc::new(Mutex::new(SessionState::new())),
        }
    }
}

pub fn router(state: ApiState) -> Router {
    Router::new()
        .route("/health", get(|| async { "ok" }))
        .route("/api/pollutants", get(pollutants))
        .route("/api/map", get(map))
        .route("/api/filter", post(filter))
        .route("/api/selection", post(selection))
        .with_state(state)
}

/// Serves `dashboard` on `bind` until the listener fails or Ctrl-C is received.
pub async fn run(dashboard: Dashboard, bind: &str) -> std::io::Result<()> {
    let app = router(ApiState::new(dashboard));
    let listener = tokio::net::TcpListener::bind(bind).await?;
    info!("Listening on http://{}", listener.local_addr()?);
    let serve = axum::serve(listener, app).into_future();
    tokio::select! {
        r = serve => { r?; },
        _ = signal::ctrl_c() => { info!("Shutdown signal received"); }
    }
    Ok(())
}

struct ApiError(PolarsError);

impl From<PolarsError> for ApiError {
    fn from(e: PolarsError) -> Self {
        Self(e)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        error!("Request failed: {}", self.0);
        (StatusCode::INTERNAL_SERVER_ERROR, self.0.to_string()).into_response()
    }
}

async fn pollutants(State(st): State<ApiState>) -> Json<Vec<String>> {
    Json(st.dashboard.pollutants().to_vec())
}

#[derive(Debug, Deserialize)]
pub struct MapQuery {
    /// Restrict the means to one pollutant; all pollutants when omitted.
    pub pollutant: Option<String>,
}

async fn map(
    State(st): State<ApiState>,
    Query(q): Query<MapQuery>,
) -> Result<Json<MapView>, ApiError> {
    let view = st.dashboard.presenter().map_view(q.pollutant.as_deref())?;
    Ok(Json(view))
}

async fn filter(
    State(st): State<ApiState>,
    Json(event): Json<FilterChanged>,
) -> Json<SessionState> {
    let mut session = st.session.lock().await;
    *session = st
        .dashboard
        .presenter()
        .on_filter_changed(session.clone(), event);
    Json(session.clone())
}

async fn selection(
    State(st): State<ApiState>,
    Json(event): Json<SelectionChanged>,
) -> Result<Json<SelectionView>, ApiError> {
    let mut session = st.session.lock().await;
    let (next, view) = st
        .dashboard
        .presenter()
        .on_selection_changed(session.clone(), event)?;
    *session = next;
    Ok(Json(view))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{frame, sample_records, sample_stations, serve};
    use reqwest::Client;
    use serde_json::{json, Value};
    use std::error::Error;

    async fn start() -> String {
        let dashboard = Dashboard::from_parts(sample_stations(), frame(&sample_records())).unwrap();
        let addr = serve(router(ApiState::new(dashboard))).await;
        format!("http://{addr}")
    }

    #[tokio::test]
    async fn test_health_and_pollutants() -> Result<(), Box<dyn Error>> {
        let base = start().await;
        let client = Client::new();
        let health = client.get(format!("{base}/health")).send().await?.text().await?;
        assert_eq!(health, "ok");

        let pollutants: Vec<String> = client
            .get(format!("{base}/api/pollutants"))
            .send()
            .await?
            .json()
            .await?;
        assert_eq!(pollutants, vec!["PM10", "NO2", "O3"]);
        Ok(())
    }

    #[tokio::test]
    async fn test_map_endpoint() -> Result<(), Box<dyn Error>> {
        let base = start().await;
        let view: Value = Client::new()
            .get(format!("{base}/api/map?pollutant=PM10"))
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;
        assert_eq!(view["title"], "Pollution");
        assert_eq!(view["pollutant"], "PM10");
        assert_eq!(view["points"].as_array().map(Vec::len), Some(2));
        Ok(())
    }

    #[tokio::test]
    async fn test_filter_persists_between_selection_requests() -> Result<(), Box<dyn Error>> {
        let base = start().await;
        let client = Client::new();

        let state: Value = client
            .post(format!("{base}/api/filter"))
            .json(&json!({ "pollutants": ["PM10", "SO2"] }))
            .send()
            .await?
            .json()
            .await?;
        assert_eq!(state["pollutant_filter"], json!(["PM10"]));

        let view: Value = client
            .post(format!("{base}/api/selection"))
            .json(&json!({ "selected": ["Lyon Périphérique"] }))
            .send()
            .await?
            .json()
            .await?;
        assert_eq!(view["kind"], "charts");
        let groups = view["groups"].as_array().cloned().unwrap_or_default();
        assert_eq!(groups.len(), 1);
        assert_eq!(groups[0]["pollutant"], "PM10");
        Ok(())
    }

    #[tokio::test]
    async fn test_empty_and_unknown_selections() -> Result<(), Box<dyn Error>> {
        let base = start().await;
        let client = Client::new();

        let prompt: Value = client
            .post(format!("{base}/api/selection"))
            .json(&json!({ "selected": [] }))
            .send()
            .await?
            .json()
            .await?;
        assert_eq!(prompt["kind"], "prompt");

        let no_data: Value = client
            .post(format!("{base}/api/selection"))
            .json(&json!({ "selected": ["Station fantôme"] }))
            .send()
            .await?
            .json()
            .await?;
        assert_eq!(no_data["kind"], "no_data");
        assert_eq!(no_data["message"], "No data for Station fantôme");
        Ok(())
    }
}
