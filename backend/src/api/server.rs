//! HTTP Server for the covidviz dashboard API.
//!
//! Every data endpoint runs one fetch (memoized) + transform (fresh) cycle.
//! A failed cycle answers with an error body, never with partial tables.
//!
//! # API Endpoints
//!
//! | Method | Path             | Description                                  |
//! |--------|------------------|----------------------------------------------|
//! | GET    | `/health`        | Health check                                 |
//! | GET    | `/api/regions`   | Distinct regions for the region filter       |
//! | GET    | `/api/national`  | National long-form series                    |
//! | GET    | `/api/regional`  | Regional series, `?regions=a,b`              |
//! | GET    | `/api/dashboard` | Charts for `?mode=&scale=&regions=&table=&analysis=` |
//! | GET    | `/api/logs`      | SSE stream of pipeline logs                  |

use std::{convert::Infallible, net::SocketAddr, sync::Arc, time::Duration};

use axum::{
    extract::{Query, State},
    http::{header, Method, StatusCode},
    response::{sse::Event, Json, Sse},
    routing::get,
    Router,
};
use futures::stream::Stream;
use serde_json::{json, Value};
use tokio_stream::wrappers::BroadcastStream;
use tokio_stream::StreamExt as _;
use tower_http::cors::CorsLayer;

use super::logs::{log_error, log_info, Stage, LOG_BROADCASTER};
use super::types::{error_response, DashboardQuery, DashboardResponse, RegionQuery};
use crate::config::Settings;
use crate::error::{PipelineError, ServerResult};
use crate::loader::{CsvSource, DataLoader, HttpSource};
use crate::models::{NationalSeriesRow, RegionalSeriesRow};
use crate::transform::pipeline::{load_dashboard, DashboardData};
use crate::view::filter_regions;

type ApiError = (StatusCode, Json<Value>);

/// Shared server state: one loader (and thus one cache) for the process.
pub struct AppState<S = HttpSource> {
    pub loader: DataLoader<S>,
    pub data_url: String,
}

/// Build the router. Generic over the source so tests can run offline.
pub fn router<S: CsvSource + 'static>(state: Arc<AppState<S>>) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(tower_http::cors::Any)
        .allow_methods([Method::GET, Method::OPTIONS])
        .allow_headers([header::CONTENT_TYPE, header::ACCEPT])
        .expose_headers([header::CONTENT_TYPE]);

    Router::new()
        .route("/", get(health))
        .route("/health", get(health))
        .route("/api/regions", get(regions::<S>))
        .route("/api/national", get(national::<S>))
        .route("/api/regional", get(regional::<S>))
        .route("/api/dashboard", get(dashboard::<S>))
        .route("/api/logs", get(sse_logs))
        .layer(cors)
        .with_state(state)
}

/// Start the HTTP server
pub async fn start_server(settings: Settings) -> ServerResult<()> {
    let state = Arc::new(AppState {
        loader: DataLoader::new(),
        data_url: settings.data_url.clone(),
    });

    let addr = SocketAddr::from(([0, 0, 0, 0], settings.port));
    println!("🚀 covidviz server running on http://localhost:{}", settings.port);
    println!("   Data source: {}", settings.data_url);
    println!("   GET /api/dashboard - Charts for the selected mode and regions");
    println!("   GET /api/regional  - Regional series");
    println!("   GET /api/national  - National series");
    println!("   GET /api/regions   - Region list");
    println!("   GET /api/logs      - SSE log stream");
    println!("   GET /health        - Health check");
    println!();

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, router(state)).await?;

    Ok(())
}

/// Health check endpoint
async fn health() -> Json<Value> {
    Json(json!({
        "status": "ok",
        "service": "covidviz",
        "version": env!("CARGO_PKG_VERSION"),
    }))
}

async fn regions<S: CsvSource>(
    State(state): State<Arc<AppState<S>>>,
) -> Result<Json<Vec<String>>, ApiError> {
    let data = load(&state).await?;
    Ok(Json(data.regions))
}

async fn national<S: CsvSource>(
    State(state): State<Arc<AppState<S>>>,
) -> Result<Json<Vec<NationalSeriesRow>>, ApiError> {
    let data = load(&state).await?;
    Ok(Json(data.national))
}

async fn regional<S: CsvSource>(
    State(state): State<Arc<AppState<S>>>,
    Query(query): Query<RegionQuery>,
) -> Result<Json<Vec<RegionalSeriesRow>>, ApiError> {
    let data = load(&state).await?;
    let selection = query.selection();
    Ok(Json(filter_regions(&data.regional, selection.as_deref())))
}

async fn dashboard<S: CsvSource>(
    State(state): State<Arc<AppState<S>>>,
    Query(query): Query<DashboardQuery>,
) -> Result<Json<DashboardResponse>, ApiError> {
    let data = load(&state).await?;
    log_info(
        Stage::Serve,
        format!("Dashboard render: mode {:?}, scale {:?}", query.mode, query.scale),
    );
    Ok(Json(DashboardResponse::build(&data, &query)))
}

/// SSE endpoint for real-time log streaming
async fn sse_logs() -> Sse<impl Stream<Item = Result<Event, Infallible>>> {
    let rx = LOG_BROADCASTER.subscribe();

    let stream = BroadcastStream::new(rx).filter_map(|result| match result {
        Ok(entry) => {
            let json = serde_json::to_string(&entry).ok()?;
            Some(Ok(Event::default().data(json)))
        }
        Err(_) => None,
    });

    Sse::new(stream).keep_alive(
        axum::response::sse::KeepAlive::new()
            .interval(Duration::from_secs(15))
            .text("keep-alive"),
    )
}

async fn load<S: CsvSource>(state: &AppState<S>) -> Result<DashboardData, ApiError> {
    load_dashboard(&state.loader, &state.data_url)
        .await
        .map_err(|e| {
            log_error(Stage::Serve, e.to_string());
            (status_for(&e), Json(error_response(&e.to_string())))
        })
}

fn status_for(err: &PipelineError) -> StatusCode {
    match err {
        PipelineError::Network(_) | PipelineError::Parse(_) => StatusCode::BAD_GATEWAY,
        PipelineError::Computation(_) => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{CsvError, FetchError, TransformError};

    #[test]
    fn test_upstream_failures_are_bad_gateway() {
        let network = PipelineError::Network(FetchError::Status {
            url: "http://data.test".into(),
            status: 500,
        });
        assert_eq!(status_for(&network), StatusCode::BAD_GATEWAY);

        let parse = PipelineError::Parse(CsvError::MissingColumn("deces".into()));
        assert_eq!(status_for(&parse), StatusCode::BAD_GATEWAY);
    }

    const BODY: &str = "\
date,granularite,maille_nom,cas_confirmes,deces,reanimation,source_type
2020-03-10,pays,France,1784,33,86,sante-publique-france
2020-03-10,region,Grand Est,400,6,,agences-regionales-sante
2020-03-11,region,Grand Est,500,9,,agences-regionales-sante
2020-03-10,region,Bretagne,60,1,,agences-regionales-sante
";

    struct FixedSource(Option<&'static str>);

    impl CsvSource for FixedSource {
        fn get(
            &self,
            url: &str,
        ) -> impl std::future::Future<Output = crate::error::FetchResult<Vec<u8>>> + Send {
            let result = match self.0 {
                Some(body) => Ok(body.as_bytes().to_vec()),
                None => Err(FetchError::Request {
                    url: url.to_string(),
                    message: "connection refused".into(),
                }),
            };
            async move { result }
        }
    }

    async fn spawn(source: FixedSource) -> String {
        let state = Arc::new(AppState {
            loader: DataLoader::with_source(source),
            data_url: "http://data.test/chiffres-cles.csv".to_string(),
        });
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, router(state)).await.unwrap();
        });
        format!("http://{}", addr)
    }

    #[tokio::test]
    async fn test_regional_endpoint_filters_regions() {
        let base = spawn(FixedSource(Some(BODY))).await;

        let rows: Vec<Value> = reqwest::get(format!("{}/api/regional?regions=Bretagne", base))
            .await
            .unwrap()
            .json()
            .await
            .unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0]["maille_nom"], "Bretagne");
        assert!(rows[0]["delta_deces"].is_null());
    }

    #[tokio::test]
    async fn test_dashboard_endpoint() {
        let base = spawn(FixedSource(Some(BODY))).await;

        let body: Value = reqwest::get(format!("{}/api/dashboard?mode=heatmap&analysis=true", base))
            .await
            .unwrap()
            .json()
            .await
            .unwrap();
        assert_eq!(body["mode"], "heatmap");
        assert_eq!(body["charts"].as_array().unwrap().len(), 3);
        assert_eq!(body["annotations"].as_array().unwrap().len(), 1);
        assert_eq!(body["regions"], json!(["Bretagne", "Grand Est"]));
    }

    #[tokio::test]
    async fn test_fetch_failure_returns_error_body() {
        let base = spawn(FixedSource(None)).await;

        let response = reqwest::get(format!("{}/api/national", base)).await.unwrap();
        assert_eq!(response.status().as_u16(), 502);
        let body: Value = response.json().await.unwrap();
        assert_eq!(body["status"], "error");
        assert!(body["error"].as_str().unwrap().contains("connection refused"));
    }

    #[test]
    fn test_computation_failure_is_internal() {
        let err = PipelineError::Computation(TransformError::RowCount {
            table: "national",
            expected: 3,
            actual: 0,
        });
        assert_eq!(status_for(&err), StatusCode::INTERNAL_SERVER_ERROR);
    }
}
