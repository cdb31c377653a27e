//! CDN URL construction.

use percent_encoding::{utf8_percent_encode, AsciiSet, CONTROLS};

use super::{AspectRatio, DisplayOptions, ImageDescriptor};

/// Served by the site itself, so always resolvable even when the CMS is not.
pub const PLACEHOLDER_IMAGE_PATH: &str = "/images/placeholder.svg";

/// Quality used by the named presets.
const PRESET_QUALITY: u8 = 85;
/// Default widths for the landscape, portrait and square presets.
const LANDSCAPE_WIDTH: u32 = 1200;
const PORTRAIT_WIDTH: u32 = 600;
const SQUARE_WIDTH: u32 = 400;

/// Characters percent-encoded inside the asset path segment.
const PATH_SEGMENT: &AsciiSet = &CONTROLS
    .add(b' ')
    .add(b'"')
    .add(b'<')
    .add(b'>')
    .add(b'`')
    .add(b'#')
    .add(b'?')
    .add(b'{')
    .add(b'}')
    .add(b'%')
    .add(b'/');

/// File formats a content-addressed reference may end with.
const KNOWN_FORMATS: &[&str] = &[
    "jpg", "jpeg", "png", "webp", "gif", "svg", "avif", "tif", "tiff", "bmp", "heic",
];

/// Failure to derive a CDN URL from a descriptor.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ImageUrlError {
    /// The descriptor carries no asset reference at all.
    #[error("image descriptor has no asset reference")]
    MissingAsset,
    /// A reference is present but cannot name a stored file.
    #[error("unresolvable asset reference: {0}")]
    UnresolvableAsset(String),
}

/// Builds rendition URLs against one CDN base (host plus project prefix).
///
/// Cheap to clone and safe to share; it carries no connection state.
#[derive(Debug, Clone)]
pub struct ImageCdn {
    base_url: String,
}

impl ImageCdn {
    pub fn new(base_url: impl Into<String>) -> Self {
        let mut base_url = base_url.into();
        while base_url.ends_with('/') {
            base_url.pop();
        }
        Self { base_url }
    }

    /// Build the CDN URL for `descriptor` rendered under `options`.
    ///
    /// Width takes precedence: with a non-`original` aspect ratio the other
    /// dimension is derived from whichever one was given (an explicit height
    /// next to an explicit width is recomputed, not honored), rounding half
    /// away from zero. A non-`original` ratio also requests a crop, anchored
    /// at the descriptor's hotspot when it has one.
    pub fn build_url(
        &self,
        descriptor: &ImageDescriptor,
        options: &DisplayOptions,
    ) -> Result<String, ImageUrlError> {
        let asset_ref = descriptor
            .asset_ref
            .as_deref()
            .ok_or(ImageUrlError::MissingAsset)?;
        let path = asset_path(asset_ref)?;

        let (width, height, cropped) = resolve_dimensions(options);

        let mut params: Vec<String> = Vec::new();
        if let Some(w) = width {
            params.push(format!("w={}", w));
        }
        if let Some(h) = height {
            params.push(format!("h={}", h));
        }
        if let Some(q) = options.quality {
            params.push(format!("q={}", q));
        }
        if cropped {
            params.push("fit=crop".to_string());
            if let Some(hotspot) = descriptor.hotspot {
                params.push("crop=focalpoint".to_string());
                params.push(format!("fp-x={}", fmt_coord(hotspot.x)));
                params.push(format!("fp-y={}", fmt_coord(hotspot.y)));
            }
        }
        if options.auto_format {
            params.push("auto=format".to_string());
        }

        let mut url = format!("{}/{}", self.base_url, path);
        if !params.is_empty() {
            url.push('?');
            url.push_str(&params.join("&"));
        }
        Ok(url)
    }

    /// Total variant of [`ImageCdn::build_url`] with default options: any
    /// failure, including an absent descriptor, yields the placeholder path
    /// instead of an error. Meant for template code that must always render.
    pub fn safe_source_url(&self, descriptor: Option<&ImageDescriptor>) -> String {
        descriptor
            .map(|d| self.build_url(d, &DisplayOptions::default()))
            .and_then(Result::ok)
            .unwrap_or_else(|| PLACEHOLDER_IMAGE_PATH.to_string())
    }

    /// 16:9 rendition for hero and card imagery. Default width 1200.
    pub fn landscape_url(
        &self,
        descriptor: &ImageDescriptor,
        width: Option<u32>,
    ) -> Result<String, ImageUrlError> {
        self.preset_url(
            descriptor,
            AspectRatio::Landscape,
            width.unwrap_or(LANDSCAPE_WIDTH),
        )
    }

    /// 4:5 rendition for team and portrait imagery. Default width 600.
    pub fn portrait_url(
        &self,
        descriptor: &ImageDescriptor,
        width: Option<u32>,
    ) -> Result<String, ImageUrlError> {
        self.preset_url(
            descriptor,
            AspectRatio::Portrait,
            width.unwrap_or(PORTRAIT_WIDTH),
        )
    }

    /// 1:1 rendition for logos and avatars. Default width 400.
    pub fn square_url(
        &self,
        descriptor: &ImageDescriptor,
        width: Option<u32>,
    ) -> Result<String, ImageUrlError> {
        self.preset_url(descriptor, AspectRatio::Square, width.unwrap_or(SQUARE_WIDTH))
    }

    fn preset_url(
        &self,
        descriptor: &ImageDescriptor,
        ratio: AspectRatio,
        width: u32,
    ) -> Result<String, ImageUrlError> {
        let options = DisplayOptions::default()
            .width(width)
            .aspect_ratio(ratio)
            .quality(PRESET_QUALITY)
            .auto_format();
        self.build_url(descriptor, &options)
    }
}

/// Apply the dimension rules: effective width and height, plus whether a crop
/// is requested. A non-`original` ratio always crops, even without dimensions.
fn resolve_dimensions(options: &DisplayOptions) -> (Option<u32>, Option<u32>, bool) {
    match options.aspect_ratio.and_then(AspectRatio::as_fraction) {
        Some((num, den)) => {
            let (width, height) = if let Some(w) = options.width {
                (Some(w), Some(derive_dimension(w, den, num)))
            } else if let Some(h) = options.height {
                (Some(derive_dimension(h, num, den)), Some(h))
            } else {
                (None, None)
            };
            (width, height, true)
        }
        None => (options.width, options.height, false),
    }
}

/// Scale `value` by `mul/div`, rounding half away from zero. The ratios are
/// small integers, so `value * mul` stays exact in f64 and 562.5-style
/// midpoints survive until the rounding step.
fn derive_dimension(value: u32, mul: u32, div: u32) -> u32 {
    (value as f64 * mul as f64 / div as f64).round() as u32
}

/// Hotspot coordinates print in shortest form: 0.5 stays "0.5", 1.0 becomes "1".
fn fmt_coord(value: f64) -> String {
    format!("{}", value)
}

/// Turn an asset reference into the CDN path segment.
///
/// `image-<id>-<W>x<H>-<ext>` becomes `<id>-<W>x<H>.<ext>`; references
/// without the content-addressed adornments pass through as-is. The result is
/// percent-encoded as a single path segment.
fn asset_path(asset_ref: &str) -> Result<String, ImageUrlError> {
    let trimmed = asset_ref.trim();
    if trimmed.is_empty() {
        return Err(ImageUrlError::MissingAsset);
    }

    let bare = trimmed.strip_prefix("image-").unwrap_or(trimmed);
    if bare.is_empty() {
        return Err(ImageUrlError::UnresolvableAsset(asset_ref.to_string()));
    }

    let file = match bare.rsplit_once('-') {
        Some((stem, ext)) if !stem.is_empty() && KNOWN_FORMATS.contains(&ext) => {
            format!("{}.{}", stem, ext)
        }
        _ => bare.to_string(),
    };

    Ok(utf8_percent_encode(&file, PATH_SEGMENT).to_string())
}
