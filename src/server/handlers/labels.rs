//! Label preview handlers.

use axum::{
    Json,
    extract::State,
    http::{StatusCode, header},
    response::IntoResponse,
};
use serde::Deserialize;
use std::sync::Arc;

use crate::{
    render::LabelCompositor,
    template::{DynamicFieldContext, LabelTemplate},
};

use super::super::state::AppState;
use super::{error_response, task_error};

/// Header carrying the number of elements drawn in degraded form.
pub const DEGRADED_HEADER: &str = "x-degraded-elements";

fn default_sequence() -> u32 {
    1
}

/// Request body for label previews.
#[derive(Debug, Deserialize)]
pub struct PreviewRequest {
    /// Template with `base_image` relative to the asset directory
    pub template: LabelTemplate,
    /// Field values layered over the template's own
    #[serde(default)]
    pub context: DynamicFieldContext,
    #[serde(default = "default_sequence")]
    pub sequence_no: u32,
}

/// POST /api/labels/preview - Render a unit label as PNG.
pub async fn preview(
    State(state): State<Arc<AppState>>,
    Json(req): Json<PreviewRequest>,
) -> Result<impl IntoResponse, (StatusCode, String)> {
    let mut template = req.template;
    template.base_image = state
        .resolve_asset(&template.base_image)
        .map_err(error_response)?;

    let render_state = state.clone();
    let label = tokio::task::spawn_blocking(move || {
        LabelCompositor::new(&render_state.render).render_template(
            &template,
            req.sequence_no,
            &req.context,
        )
    })
    .await
    .map_err(task_error)?
    .map_err(error_response)?;

    let png = label.to_png().map_err(error_response)?;

    Ok((
        [
            (header::CONTENT_TYPE, "image/png".to_string()),
            (header::CACHE_CONTROL, "no-cache".to_string()),
            (
                header::HeaderName::from_static(DEGRADED_HEADER),
                label.degraded.len().to_string(),
            ),
        ],
        png,
    ))
}
