use axum::{
    body::Bytes,
    extract::{Query, State},
    http::{header, HeaderName, StatusCode},
    response::{IntoResponse, Json},
};
use serde_json::{json, Value};
use shared::{AdvisoryResponse, ModelReport, ReliefSettings};

use crate::ai;
use crate::build;
use crate::AppState;

const DIAGNOSTICS_HEADER: HeaderName = HeaderName::from_static("x-relief-diagnostics");
const BUILD_ID_HEADER: HeaderName = HeaderName::from_static("x-relief-build-id");

/// Health check
pub async fn health() -> Json<Value> {
    Json(json!({ "status": "ok" }))
}

/// Image body + settings query -> binary STL
pub async fn build_stl(
    State(state): State<AppState>,
    Query(settings): Query<ReliefSettings>,
    body: Bytes,
) -> Result<impl IntoResponse, StatusCode> {
    let build_id = uuid::Uuid::new_v4().to_string();
    tracing::info!("build {build_id}: {} byte upload", body.len());

    let config = state.config.clone();
    let stl = tokio::task::spawn_blocking(move || build::build_stl(&body, &settings, &config))
        .await
        .map_err(|_| StatusCode::INTERNAL_SERVER_ERROR)?
        .map_err(|e| {
            tracing::error!("Build error: {}", e);
            StatusCode::BAD_REQUEST
        })?;

    Ok((
        [
            (header::CONTENT_TYPE, "model/stl".to_string()),
            (
                header::CONTENT_DISPOSITION,
                "attachment; filename=\"relief.stl\"".to_string(),
            ),
            (DIAGNOSTICS_HEADER, stl.diagnostics.to_string()),
            (BUILD_ID_HEADER, build_id),
        ],
        stl.bytes,
    ))
}

/// Image body + settings query -> JSON metrics
pub async fn inspect(
    State(state): State<AppState>,
    Query(settings): Query<ReliefSettings>,
    body: Bytes,
) -> Result<Json<ModelReport>, StatusCode> {
    let config = state.config.clone();
    let report = tokio::task::spawn_blocking(move || build::inspect(&body, &settings, &config))
        .await
        .map_err(|_| StatusCode::INTERNAL_SERVER_ERROR)?
        .map_err(|e| {
            tracing::error!("Inspect error: {}", e);
            StatusCode::BAD_REQUEST
        })?;

    Ok(Json(report))
}

/// Image body -> suggested settings; always answers, with defaults on failure
pub async fn suggest(State(state): State<AppState>, body: Bytes) -> Json<AdvisoryResponse> {
    Json(ai::suggest_or_fallback(&state, &body).await)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::build::tests::square_png;
    use relief_engine::PipelineConfig;
    use shared::{OutputMode, SuggestionSource};

    fn state() -> AppState {
        AppState::new(None, PipelineConfig::default())
    }

    fn settings() -> Query<ReliefSettings> {
        Query(ReliefSettings {
            resolution: 32,
            ..Default::default()
        })
    }

    #[tokio::test]
    async fn test_build_returns_stl_with_headers() {
        let response = build_stl(State(state()), settings(), Bytes::from(square_png()))
            .await
            .map(IntoResponse::into_response)
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(response.headers()[header::CONTENT_TYPE], "model/stl");
        assert_eq!(response.headers()[DIAGNOSTICS_HEADER], "0");
        assert!(response.headers().contains_key(BUILD_ID_HEADER));

        let body = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
        assert!(body.len() > 84);
        assert_eq!((body.len() - 84) % 50, 0);
    }

    #[tokio::test]
    async fn test_build_rejects_undecodable_upload() {
        let err = build_stl(State(state()), settings(), Bytes::from_static(b"nope"))
            .await
            .err()
            .unwrap();
        assert_eq!(err, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_inspect_reports_vector_mode() {
        let Json(report) = inspect(State(state()), settings(), Bytes::from(square_png()))
            .await
            .unwrap();
        assert_eq!(report.mode, OutputMode::Vector);
        assert_eq!(report.polygons, 1);
    }

    #[tokio::test]
    async fn test_suggest_without_key_is_fallback() {
        let Json(response) = suggest(State(state()), Bytes::from(square_png())).await;
        assert_eq!(response.source, SuggestionSource::Fallback);
    }
}
