//! Stable image links.
//!
//! Emails and external embeds cannot recompute CDN URLs when display
//! conventions change, so they link `/api/images/{asset_ref}` instead and get
//! redirected to the current rendition. The redirect is temporary on purpose:
//! the target moves whenever presets or the CDN base change.

use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    response::{IntoResponse, Redirect},
};
use backlot_core::{AspectRatio, DisplayOptions, ImageDescriptor};
use serde::Deserialize;
use utoipa::IntoParams;

use crate::error::{ErrorResponse, HttpAppError};
use crate::state::AppState;

/// Display options in query form.
#[derive(Debug, Default, Deserialize, IntoParams)]
pub struct ImageQuery {
    /// Target width in pixels.
    pub w: Option<u32>,
    /// Target height in pixels; ignored when both `w` and `ratio` are given.
    pub h: Option<u32>,
    /// One of `16:9`, `4:5`, `1:1` or `original`.
    pub ratio: Option<AspectRatio>,
    /// JPEG/WebP quality, passed through to the CDN.
    pub q: Option<u8>,
    /// Let the CDN negotiate the output format.
    #[serde(default)]
    pub auto: bool,
}

#[utoipa::path(
    get,
    path = "/api/images/{asset_ref}",
    tag = "images",
    params(
        ("asset_ref" = String, Path, description = "CMS asset reference"),
        ImageQuery
    ),
    responses(
        (status = 307, description = "Redirect to the CDN rendition"),
        (status = 400, description = "Reference missing or malformed", body = ErrorResponse),
        (status = 404, description = "Reference cannot name a stored asset", body = ErrorResponse)
    )
)]
#[tracing::instrument(skip(state))]
pub async fn redirect_to_cdn(
    State(state): State<Arc<AppState>>,
    Path(asset_ref): Path<String>,
    Query(query): Query<ImageQuery>,
) -> Result<impl IntoResponse, HttpAppError> {
    let descriptor = ImageDescriptor::from_ref(asset_ref);
    let options = DisplayOptions {
        width: query.w,
        height: query.h,
        aspect_ratio: query.ratio,
        quality: query.q,
        auto_format: query.auto,
    };

    let url = state.image_cdn.build_url(&descriptor, &options)?;
    Ok(Redirect::temporary(&url))
}
