//! QR payload handlers.

use axum::{
    Json,
    extract::{Query, State},
    http::StatusCode,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use crate::qr::{QrPayload, target_url};

use super::super::state::AppState;
use super::error_response;

/// Query parameters for payload encoding.
#[derive(Debug, Deserialize)]
pub struct EncodeQuery {
    pub template_id: u64,
    pub sequence_no: u32,
    /// Defaults to the current time
    pub epoch_ms: Option<i64>,
}

/// An encoded payload and the URL its QR code points at.
#[derive(Debug, Serialize)]
pub struct EncodedPayload {
    pub payload: String,
    pub url: String,
}

/// GET /api/qr/encode - Encode a label identity.
pub async fn encode(
    State(state): State<Arc<AppState>>,
    Query(query): Query<EncodeQuery>,
) -> Json<EncodedPayload> {
    let epoch_ms = query
        .epoch_ms
        .unwrap_or_else(|| chrono::Utc::now().timestamp_millis());
    let payload = QrPayload::new(query.template_id, query.sequence_no, epoch_ms).encode();
    let url = target_url(&state.render.qr_host, &payload);

    Json(EncodedPayload { payload, url })
}

#[derive(Debug, Deserialize)]
pub struct DecodeQuery {
    pub payload: String,
}

/// GET /api/qr/decode - Decode a payload back into its fields.
pub async fn decode(
    Query(query): Query<DecodeQuery>,
) -> Result<Json<QrPayload>, (StatusCode, String)> {
    QrPayload::decode(&query.payload)
        .map(Json)
        .map_err(error_response)
}
