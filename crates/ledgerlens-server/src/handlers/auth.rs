//! Identity and health handlers

use std::sync::Arc;

use axum::{extract::State, http::HeaderMap, Json};
use serde::Serialize;

use crate::{get_user_email, AppState};
use ledgerlens_core::ai::NarrativeBackend;

/// Response for the /api/me endpoint
#[derive(Serialize)]
pub struct MeResponse {
    /// The requester's email or identifier
    pub user: String,
    /// How the requester was identified
    pub auth_method: String,
}

/// GET /api/me - Who the server thinks is calling
pub async fn get_me(State(state): State<Arc<AppState>>, headers: HeaderMap) -> Json<MeResponse> {
    let user = get_user_email(&headers);

    let auth_method = if !state.config.require_auth {
        "none"
    } else if headers.contains_key(crate::USER_HEADER) {
        "api_key_with_user"
    } else {
        "api_key"
    };

    Json(MeResponse {
        user,
        auth_method: auth_method.to_string(),
    })
}

/// Narrative backend status reported by /health
#[derive(Serialize)]
pub struct NarrativeHealth {
    pub configured: bool,
    pub backend: Option<String>,
    pub model: Option<String>,
    pub available: bool,
}

/// Response for the /health endpoint
#[derive(Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub narrative: NarrativeHealth,
}

/// GET /health - Liveness plus narrative backend reachability (no auth)
pub async fn health(State(state): State<Arc<AppState>>) -> Json<HealthResponse> {
    let narrative = match state.ai() {
        Some(client) => NarrativeHealth {
            configured: true,
            backend: Some(client.backend_name().to_string()),
            model: Some(client.model().to_string()),
            available: client.health_check().await,
        },
        None => NarrativeHealth {
            configured: false,
            backend: None,
            model: None,
            available: false,
        },
    };

    Json(HealthResponse {
        status: "ok".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        narrative,
    })
}
