//! Sheet capacity and composite handlers.

use axum::{
    Json,
    extract::{Query, State},
    http::StatusCode,
};
use serde::Deserialize;
use std::path::PathBuf;
use std::sync::Arc;

use crate::{
    config::{DEFAULT_PADDING, DEFAULT_SHEET_HEIGHT, DEFAULT_SHEET_WIDTH, SheetSpec},
    render::probe_dimensions,
    sheet::{CompositeReport, PackingLayout, calculate_capacity, create_composite_sheet},
};

use super::super::state::AppState;
use super::{error_response, task_error};

fn default_width() -> u32 {
    DEFAULT_SHEET_WIDTH
}

fn default_height() -> u32 {
    DEFAULT_SHEET_HEIGHT
}

fn default_padding() -> i64 {
    DEFAULT_PADDING
}

/// Query parameters for the capacity endpoint.
///
/// Label dimensions are given directly or probed from `image`.
#[derive(Debug, Deserialize)]
pub struct CapacityQuery {
    pub label_width: Option<u32>,
    pub label_height: Option<u32>,
    /// Uploaded image relative to the asset directory
    pub image: Option<PathBuf>,
    #[serde(default = "default_width")]
    pub width: u32,
    #[serde(default = "default_height")]
    pub height: u32,
    #[serde(default = "default_padding")]
    pub padding: i64,
}

/// GET /api/sheets/capacity - Compute the packing layout for a label size.
pub async fn capacity(
    State(state): State<Arc<AppState>>,
    Query(query): Query<CapacityQuery>,
) -> Result<Json<PackingLayout>, (StatusCode, String)> {
    let (label_width, label_height) = match (query.label_width, query.label_height, &query.image)
    {
        (Some(w), Some(h), _) => (w, h),
        (_, _, Some(image)) => {
            let path = state.resolve_asset(image).map_err(error_response)?;
            let dims = probe_dimensions(&path).map_err(error_response)?;
            (dims.width, dims.height)
        }
        _ => {
            return Err((
                StatusCode::BAD_REQUEST,
                "label_width and label_height (or image) are required".to_string(),
            ));
        }
    };

    Ok(Json(calculate_capacity(
        label_width,
        label_height,
        query.width,
        query.height,
        query.padding,
    )))
}

/// Request body for composite generation.
#[derive(Debug, Deserialize)]
pub struct CompositeRequest {
    /// Unit label PNG relative to the asset directory
    pub unit_label: PathBuf,
    /// Output path relative to the asset directory
    pub output: PathBuf,
    #[serde(default = "default_width")]
    pub width: u32,
    #[serde(default = "default_height")]
    pub height: u32,
    #[serde(default = "default_padding")]
    pub padding: i64,
}

/// POST /api/sheets/composite - Tile a unit label onto a sheet PNG.
///
/// On success the report's `output_path` is the request's relative path,
/// never the resolved location on the server.
pub async fn composite(
    State(state): State<Arc<AppState>>,
    Json(req): Json<CompositeRequest>,
) -> Result<(StatusCode, Json<CompositeReport>), (StatusCode, String)> {
    let unit_label = state.resolve_asset(&req.unit_label).map_err(error_response)?;
    let output = state.resolve_asset(&req.output).map_err(error_response)?;
    let spec = SheetSpec::new(req.width, req.height, req.padding);

    let mut report =
        tokio::task::spawn_blocking(move || create_composite_sheet(&unit_label, &output, spec))
            .await
            .map_err(task_error)?;

    if report.success {
        report.output_path = Some(req.output);
    }

    let status = if report.success {
        StatusCode::OK
    } else {
        StatusCode::UNPROCESSABLE_ENTITY
    };
    Ok((status, Json(report)))
}
