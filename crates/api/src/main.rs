use std::sync::Arc;

use axum::{
    extract::{rejection::JsonRejection, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde_json::{json, Value};
use tower_http::trace::TraceLayer;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use fertilizer_core::domain::contract::RecommendationRequest;
use fertilizer_core::domain::recommendation::Recommendation;
use fertilizer_core::recommend::{recommend, RecommendError};
use fertilizer_core::reference::CropTable;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let settings = fertilizer_core::config::Settings::from_env()?;
    let _sentry_guard = init_sentry(&settings);

    tracing_subscriber::registry()
        .with(EnvFilter::from_default_env())
        .with(tracing_subscriber::fmt::layer())
        .with(sentry_tracing::layer())
        .init();

    // Without the reference table no request can be answered.
    let crops = match CropTable::from_path(&settings.crop_table_path) {
        Ok(table) => table,
        Err(e) => {
            sentry_anyhow::capture_anyhow(&e);
            tracing::error!(error = %format!("{e:#}"), "crop table load failed; refusing to start");
            return Err(e);
        }
    };

    let state = AppState {
        crops: Arc::new(crops),
    };

    let app = router(state);

    let addr = std::net::SocketAddr::from(([0, 0, 0, 0], settings.port));

    tracing::info!(%addr, "api listening");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    Ok(())
}

fn router(state: AppState) -> Router {
    Router::new()
        .route("/healthz", get(healthz))
        .route("/recommend", post(post_recommend))
        .with_state(state)
        .layer(TraceLayer::new_for_http())
}

async fn healthz() -> &'static str {
    "ok"
}

#[derive(Debug, Clone)]
struct AppState {
    crops: Arc<CropTable>,
}

/// Every rejected request becomes a 400 with an `{"error": ...}` body.
#[derive(Debug)]
struct ApiError(RecommendError);

impl From<RecommendError> for ApiError {
    fn from(err: RecommendError) -> Self {
        Self(err)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (
            StatusCode::BAD_REQUEST,
            Json(json!({ "error": self.0.to_string() })),
        )
            .into_response()
    }
}

async fn post_recommend(
    State(state): State<AppState>,
    body: Result<Json<Value>, JsonRejection>,
) -> Result<Json<Recommendation>, ApiError> {
    let Json(body) = body.map_err(|rejection| {
        tracing::debug!(error = %rejection, "rejected request body");
        RecommendError::BadInput(rejection.body_text())
    })?;

    let request = RecommendationRequest::from_json(&body).map_err(|e| {
        tracing::debug!(error = %e, "invalid recommendation request");
        e
    })?;

    match recommend(&state.crops, &request) {
        Ok(rec) => {
            tracing::info!(
                crop = %rec.crop(),
                season = %request.season,
                fertilizer = rec.fertilizer().map(|f| f.name()).unwrap_or("none"),
                land_size_ha = ?request.land_size_ha,
                "recommendation computed"
            );
            Ok(Json(rec))
        }
        Err(e) => {
            tracing::warn!(crop = %request.crop, season = %request.season, error = %e, "recommendation rejected");
            Err(e.into())
        }
    }
}

async fn shutdown_signal() {
    let _ = tokio::signal::ctrl_c().await;
}

fn init_sentry(settings: &fertilizer_core::config::Settings) -> Option<sentry::ClientInitGuard> {
    let dsn = settings.sentry_dsn.as_deref()?;
    Some(sentry::init((
        dsn,
        sentry::ClientOptions {
            release: sentry::release_name!(),
            ..Default::default()
        },
    )))
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::http::{header, Request};
    use tower::ServiceExt; // for oneshot

    fn test_app() -> Router {
        let csv = "Crop,N_mean,P_mean,K_mean\nRice,80,40,40\n";
        let crops = CropTable::from_reader(csv.as_bytes()).unwrap();
        router(AppState {
            crops: Arc::new(crops),
        })
    }

    async fn post_json(body: &str) -> (StatusCode, Value) {
        let response = test_app()
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri("/recommend")
                    .header(header::CONTENT_TYPE, "application/json")
                    .body(Body::from(body.to_string()))
                    .unwrap(),
            )
            .await
            .unwrap();
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    #[tokio::test]
    async fn healthz_is_ok() {
        let response = test_app()
            .oneshot(Request::builder().uri("/healthz").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn recommends_urea_with_costs() {
        let (status, body) = post_json(
            r#"{"crop": "Rice", "season": "Kharif", "N": 20, "P": 40, "K": 40, "land_size": 2}"#,
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["Recommended Fertilizer"], "Urea");
        assert_eq!(body["Amount (kg/ha)"].as_f64(), Some(130.43));
        assert_eq!(body["Total Amount (kg)"].as_f64(), Some(260.87));
        assert_eq!(body["Bags Required"], 6);
        assert_eq!(body["Total Cost"].as_f64(), Some(1608.0));
    }

    #[tokio::test]
    async fn per_hectare_request_has_no_cost_fields() {
        let (status, body) =
            post_json(r#"{"crop": "rice", "season": "Zaid", "N": "20", "P": 40, "K": 40}"#).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["Crop"], "rice");
        assert_eq!(body["Ideal Temp (°C)"].as_f64(), Some(35.0));
        assert!(body.get("Total Cost").is_none());
    }

    #[tokio::test]
    async fn sufficient_soil_returns_message() {
        let (status, body) =
            post_json(r#"{"crop": "Rice", "season": "Kharif", "N": 90, "P": 40, "K": 45}"#).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(
            body,
            json!({"Crop": "Rice", "Message": "No fertilizer needed, soil nutrients are sufficient."})
        );
    }

    #[tokio::test]
    async fn unknown_crop_is_bad_request() {
        let (status, body) =
            post_json(r#"{"crop": "Foo", "season": "Kharif", "N": 1, "P": 1, "K": 1}"#).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body, json!({"error": "Crop 'Foo' not found in dataset."}));
    }

    #[tokio::test]
    async fn invalid_season_is_bad_request() {
        let (status, body) =
            post_json(r#"{"crop": "Rice", "season": "Monsoon", "N": 20, "P": 40, "K": 40}"#).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(
            body,
            json!({"error": "Invalid season 'Monsoon'. Choose from Kharif, Rabi, Zaid."})
        );
    }

    #[tokio::test]
    async fn missing_field_is_bad_request() {
        let (status, body) = post_json(r#"{"crop": "Rice", "season": "Kharif", "N": 20}"#).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body, json!({"error": "missing field 'P'"}));
    }

    #[tokio::test]
    async fn oversized_land_size_is_bad_request() {
        let (status, body) = post_json(
            r#"{"crop": "Rice", "season": "Kharif", "N": 20, "P": 40, "K": 40, "land_size": 1e308}"#,
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(body["error"].as_str().unwrap().contains("land_size"));
    }

    #[tokio::test]
    async fn malformed_json_is_bad_request() {
        let (status, body) = post_json("{not json").await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(body["error"].is_string());
    }
}
