//! Axum request handlers for all service endpoints.
//!
//! Record transformations run PBKDF2 once per field, so they are moved onto
//! Tokio's blocking pool rather than run on the async workers.

use std::sync::Arc;

use axum::{
    extract::State,
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use common::protocol::{
    DecryptResponse, EncryptResponse, ErrorResponse, FieldsRequest, HealthResponse,
};
use common::ServiceError;
use fieldcrypt::{decrypt_record, encrypt_record, FieldSet};
use tracing::{error, info, warn};

use super::state::AppState;

/// Handler error: a [`ServiceError`] rendered as a JSON [`ErrorResponse`].
#[derive(Debug)]
pub struct ApiError(ServiceError);

impl From<ServiceError> for ApiError {
    fn from(e: ServiceError) -> Self {
        Self(e)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = StatusCode::from_u16(self.0.http_status())
            .unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
        let body = ErrorResponse::new(self.0.code(), self.0.public_message());
        (status, Json(body)).into_response()
    }
}

/// `POST /encrypt`: encrypt the profile's fields in the request payload.
///
/// The profile is named by the `X-Field-Profile` request header (or the
/// configured header name). Sensitive fields are replaced with base64
/// envelopes; any encryption failure fails the whole request.
pub async fn encrypt(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(req): Json<FieldsRequest>,
) -> Result<Json<EncryptResponse>, ApiError> {
    let (profile, fields) = resolve_profile(&state, &headers)?;
    let mut payload = require_object(req.payload)?;

    let codec = state.codec.clone();
    let sealed = tokio::task::spawn_blocking(move || {
        encrypt_record(&codec, &mut payload, &fields).map(|()| payload)
    })
    .await
    .map_err(|e| {
        error!(error = %e, "encrypt task did not complete");
        ServiceError::Internal(e.to_string())
    })?;

    match sealed {
        Ok(payload) => Ok(Json(EncryptResponse { payload })),
        Err(e) => {
            warn!(profile = %profile, error = %e, "encryption failed");
            Err(ServiceError::EncryptionFailure(e.to_string()).into())
        }
    }
}

/// `POST /decrypt`: decrypt the profile's fields in the request payload.
///
/// Legacy plaintext values pass through. Fields that fail to authenticate are
/// removed from the payload and listed in `omitted`; they never fail the request.
pub async fn decrypt(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(req): Json<FieldsRequest>,
) -> Result<Json<DecryptResponse>, ApiError> {
    let (profile, fields) = resolve_profile(&state, &headers)?;
    let mut payload = require_object(req.payload)?;

    let codec = state.codec.clone();
    let (payload, report) = tokio::task::spawn_blocking(move || {
        let report = decrypt_record(&codec, &mut payload, &fields);
        (payload, report)
    })
    .await
    .map_err(|e| {
        error!(error = %e, "decrypt task did not complete");
        ServiceError::Internal(e.to_string())
    })?;

    if !report.omitted.is_empty() {
        warn!(
            profile = %profile,
            omitted = report.omitted.len(),
            "fields failed to decrypt and were omitted"
        );
    }
    if report.legacy > 0 {
        info!(profile = %profile, legacy = report.legacy, "plaintext legacy fields passed through");
    }

    Ok(Json(DecryptResponse {
        payload,
        omitted: report.omitted,
    }))
}

/// `GET /health`: liveness and readiness check.
///
/// Returns `200 OK` when at least one field profile is loaded.
/// Returns `503 Service Unavailable` otherwise.
pub async fn health(State(state): State<AppState>) -> Response {
    let profiles_loaded = state.profile_cache.len();
    let ephemeral_key = state.codec.secret().is_ephemeral();

    let (status_code, status_str) = if profiles_loaded > 0 {
        (StatusCode::OK, "ok")
    } else {
        (StatusCode::SERVICE_UNAVAILABLE, "degraded")
    };

    let body = HealthResponse {
        status: status_str.into(),
        ephemeral_key,
        profiles_loaded,
    };
    (status_code, Json(body)).into_response()
}

/// Catch-all 404 handler.
pub async fn not_found() -> impl IntoResponse {
    let err = ErrorResponse::new("not_found", "the requested resource does not exist");
    (StatusCode::NOT_FOUND, Json(err))
}

// ---------------------------------------------------------------------------
// Request helpers
// ---------------------------------------------------------------------------

/// Read the profile header and look the profile up in the cache.
fn resolve_profile(
    state: &AppState,
    headers: &HeaderMap,
) -> Result<(String, Arc<FieldSet>), ServiceError> {
    let header = state.profile_header_name.as_str();
    let name = headers
        .get(header)
        .ok_or_else(|| ServiceError::BadRequest(format!("missing {header} header")))?
        .to_str()
        .map_err(|_| {
            ServiceError::BadRequest(format!("{header} header contains non-ASCII characters"))
        })?
        .to_owned();

    if state.profile_cache.is_empty() {
        return Err(ServiceError::Unavailable("no field profiles loaded".into()));
    }

    let fields = state
        .profile_cache
        .get(&name)
        .map_err(|e| ServiceError::BadRequest(e.to_string()))?;
    Ok((name, fields))
}

fn require_object(payload: serde_json::Value) -> Result<serde_json::Value, ServiceError> {
    if payload.is_object() {
        Ok(payload)
    } else {
        Err(ServiceError::BadRequest("payload must be a JSON object".into()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::routing::{get, post};
    use axum::{body::Body, http::Request, Router};
    use fieldcrypt::{record::builtin_profiles, FieldCodec, MasterSecret};
    use serde_json::{json, Value};
    use tower::ServiceExt;

    use crate::profiles::ProfileCache;

    fn loaded_state() -> AppState {
        let cache = ProfileCache::new();
        cache.replace_all(builtin_profiles());
        AppState::new(
            FieldCodec::new(MasterSecret::parse("handler tests")),
            cache,
            "X-Field-Profile".into(),
        )
    }

    fn test_router(state: AppState) -> Router {
        Router::new()
            .route("/encrypt", post(encrypt))
            .route("/decrypt", post(decrypt))
            .route("/health", get(health))
            .with_state(state)
    }

    fn post_json(uri: &str, profile: Option<&str>, body: Value) -> Request<Body> {
        let mut builder = Request::builder()
            .method("POST")
            .uri(uri)
            .header("content-type", "application/json");
        if let Some(p) = profile {
            builder = builder.header("X-Field-Profile", p);
        }
        builder.body(Body::from(body.to_string())).unwrap()
    }

    async fn body_json(resp: Response) -> Value {
        let bytes = axum::body::to_bytes(resp.into_body(), usize::MAX)
            .await
            .unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn health_returns_503_when_not_ready() {
        let app = test_router(AppState::default());
        let req = Request::builder()
            .uri("/health")
            .body(Body::empty())
            .unwrap();
        let resp = app.oneshot(req).await.unwrap();
        assert_eq!(resp.status(), StatusCode::SERVICE_UNAVAILABLE);
        let body = body_json(resp).await;
        assert_eq!(body["ephemeral_key"], true);
    }

    #[tokio::test]
    async fn health_returns_200_with_profiles() {
        let app = test_router(loaded_state());
        let req = Request::builder()
            .uri("/health")
            .body(Body::empty())
            .unwrap();
        let resp = app.oneshot(req).await.unwrap();
        assert_eq!(resp.status(), StatusCode::OK);
        let body = body_json(resp).await;
        assert_eq!(body["profiles_loaded"], 3);
        assert_eq!(body["ephemeral_key"], false);
    }

    #[tokio::test]
    async fn missing_profile_header_is_400() {
        let app = test_router(loaded_state());
        let resp = app
            .oneshot(post_json("/encrypt", None, json!({"payload": {}})))
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
        let body = body_json(resp).await;
        assert_eq!(body["code"], "bad_request");
    }

    #[tokio::test]
    async fn unknown_profile_is_400() {
        let app = test_router(loaded_state());
        let resp = app
            .oneshot(post_json("/decrypt", Some("vendor"), json!({"payload": {}})))
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn no_profiles_loaded_is_503() {
        let app = test_router(AppState::default());
        let resp = app
            .oneshot(post_json("/encrypt", Some("bank_details"), json!({"payload": {}})))
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::SERVICE_UNAVAILABLE);
    }

    #[tokio::test]
    async fn non_object_payload_is_400() {
        let app = test_router(loaded_state());
        let resp = app
            .oneshot(post_json("/encrypt", Some("bank_details"), json!({"payload": ["x"]})))
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn encrypt_then_decrypt_round_trip() {
        let state = loaded_state();
        let record = json!({
            "employee_id": 12,
            "bank_name": "Kotak Mahindra Bank",
            "bank_account_number": "1234567890",
            "ifsc_code": "KKBK0000958"
        });

        let resp = test_router(state.clone())
            .oneshot(post_json("/encrypt", Some("bank_details"), json!({"payload": record.clone()})))
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::OK);
        let sealed = body_json(resp).await["payload"].clone();
        assert_ne!(sealed["bank_account_number"], "1234567890");
        assert_eq!(sealed["employee_id"], 12);

        let resp = test_router(state)
            .oneshot(post_json("/decrypt", Some("bank_details"), json!({"payload": sealed})))
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::OK);
        let body = body_json(resp).await;
        assert_eq!(body["payload"], record);
        assert_eq!(body["omitted"], json!([]));
    }

    #[tokio::test]
    async fn decrypt_omits_field_sealed_under_another_key() {
        let state = loaded_state();
        let foreign = FieldCodec::new(MasterSecret::parse("old rotated key"));
        let good = state.codec.encrypt_str("HDFC Bank").unwrap();
        let bad = foreign.encrypt_str("HDFC0001234").unwrap();

        let resp = test_router(state)
            .oneshot(post_json(
                "/decrypt",
                Some("bank_details"),
                json!({"payload": {"bank_name": good, "ifsc_code": bad, "bank_account_number": "legacy-123"}}),
            ))
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::OK);
        let body = body_json(resp).await;
        assert_eq!(
            body["payload"],
            json!({"bank_name": "HDFC Bank", "bank_account_number": "legacy-123"})
        );
        assert_eq!(body["omitted"], json!(["ifsc_code"]));
    }

    #[test]
    fn api_error_maps_status() {
        let resp = ApiError::from(ServiceError::EncryptionFailure("aead".into())).into_response();
        assert_eq!(resp.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }
}
