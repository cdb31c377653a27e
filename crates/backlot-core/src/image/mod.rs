//! CMS image descriptors and CDN transform URLs.
//!
//! The content store keeps original uploads; the CDN in front of it derives
//! renditions described entirely by query parameters. This module turns an
//! image descriptor plus display options into the URL for one rendition.
//! Building a URL is pure string work and never touches the network.

mod url;

pub use url::{ImageCdn, ImageUrlError, PLACEHOLDER_IMAGE_PATH};

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Reference to a stored image as it appears in CMS documents.
///
/// Descriptors are read-only snapshots fetched per render. `asset_ref` is the
/// content-addressed id the asset store resolves; it may carry the original
/// dimensions and format (e.g. `image-3f9a..-1200x800-jpg`), but plain ids
/// are equally valid.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct ImageDescriptor {
    #[serde(rename = "assetRef", default, skip_serializing_if = "Option::is_none")]
    pub asset_ref: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hotspot: Option<Hotspot>,
    /// Editor-drawn crop rectangle, carried through untouched. The CDN reads
    /// it from asset metadata, so it never becomes a query parameter here.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub crop: Option<serde_json::Value>,
}

impl ImageDescriptor {
    /// Descriptor with only an asset reference, no focal point or crop.
    pub fn from_ref(asset_ref: impl Into<String>) -> Self {
        Self {
            asset_ref: Some(asset_ref.into()),
            hotspot: None,
            crop: None,
        }
    }
}

/// Editor-chosen focal point, each coordinate normalized to `[0, 1]`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct Hotspot {
    pub x: f64,
    pub y: f64,
}

/// The aspect ratios the site lays out with.
///
/// `Original` is a sentinel: keep the source ratio and never crop.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub enum AspectRatio {
    #[serde(rename = "16:9")]
    Landscape,
    #[serde(rename = "4:5")]
    Portrait,
    #[serde(rename = "1:1")]
    Square,
    #[serde(rename = "original")]
    Original,
}

impl AspectRatio {
    /// Width over height as an integer fraction, `None` for [`AspectRatio::Original`].
    pub fn as_fraction(self) -> Option<(u32, u32)> {
        match self {
            AspectRatio::Landscape => Some((16, 9)),
            AspectRatio::Portrait => Some((4, 5)),
            AspectRatio::Square => Some((1, 1)),
            AspectRatio::Original => None,
        }
    }
}

impl std::fmt::Display for AspectRatio {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let label = match self {
            AspectRatio::Landscape => "16:9",
            AspectRatio::Portrait => "4:5",
            AspectRatio::Square => "1:1",
            AspectRatio::Original => "original",
        };
        write!(f, "{}", label)
    }
}

/// Options for one URL-building call.
///
/// Absent fields are omitted from the URL and the CDN serves its defaults.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct DisplayOptions {
    pub width: Option<u32>,
    pub height: Option<u32>,
    pub aspect_ratio: Option<AspectRatio>,
    /// Passed through verbatim; the CDN clamps out-of-range values itself.
    pub quality: Option<u8>,
    /// Ask the CDN to negotiate the output format per request.
    pub auto_format: bool,
}

impl DisplayOptions {
    pub fn width(mut self, width: u32) -> Self {
        self.width = Some(width);
        self
    }

    pub fn height(mut self, height: u32) -> Self {
        self.height = Some(height);
        self
    }

    pub fn aspect_ratio(mut self, aspect_ratio: AspectRatio) -> Self {
        self.aspect_ratio = Some(aspect_ratio);
        self
    }

    pub fn quality(mut self, quality: u8) -> Self {
        self.quality = Some(quality);
        self
    }

    pub fn auto_format(mut self) -> Self {
        self.auto_format = true;
        self
    }
}
