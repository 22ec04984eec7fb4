//! Rasterizer: serialized graphic to PNG
//!
//! A serialization goes through the same path a browser image would: it is
//! wrapped as a `data:` reference, decoded, drawn onto a fresh surface
//! stretched to the target size and encoded as PNG.

pub mod data_url;

use std::sync::Arc;

use log::debug;
use resvg::usvg;
use tiny_skia::{Color, Pixmap, Transform};

use crate::{Background, Error, ExportRequest, NormalizedAsset, Result, StyleMode};
pub use data_url::{png_data_url, svg_data_url};

/// An encoded PNG and its pixel size
#[derive(Debug, Clone)]
pub struct RasterResult {
    pub width: u32,
    pub height: u32,
    pub png_data: Vec<u8>,
}

impl RasterResult {
    /// `data:image/png;base64,...` reference for delivery
    pub fn to_data_url(&self) -> String {
        png_data_url(&self.png_data)
    }
}

/// Pixel size of an export: each dimension `round(d * scale)`, at least 1.
pub fn target_size(width: f64, height: f64, scale: u32) -> (u32, u32) {
    let dim = |d: f64| {
        let scaled = (d * scale as f64).round();
        if scaled.is_finite() && scaled >= 1.0 {
            scaled.min(u32::MAX as f64) as u32
        } else {
            1
        }
    };
    (dim(width), dim(height))
}

/// Draws serialized graphics into PNGs
///
/// The font database is loaded once and shared by every export.
#[derive(Clone)]
pub struct Rasterizer {
    fontdb: Arc<usvg::fontdb::Database>,
}

impl Rasterizer {
    /// Create a rasterizer; with `load_system_fonts` unset, `<text>` content
    /// draws nothing.
    pub fn new(load_system_fonts: bool) -> Self {
        let mut db = usvg::fontdb::Database::new();
        if load_system_fonts {
            db.load_system_fonts();
            debug!("loaded {} font faces", db.len());
        }
        Self {
            fontdb: Arc::new(db),
        }
    }

    /// Rasterize the form of `asset` selected by `mode` at the asset's size.
    pub fn rasterize_asset(
        &self,
        asset: &NormalizedAsset,
        mode: StyleMode,
        request: &ExportRequest,
    ) -> Result<RasterResult> {
        self.rasterize(asset.form(mode), asset.width, asset.height, request)
    }

    /// Rasterize serialized markup to a `round(width*scale)` x
    /// `round(height*scale)` PNG.
    pub fn rasterize(
        &self,
        text: &str,
        width: f64,
        height: f64,
        request: &ExportRequest,
    ) -> Result<RasterResult> {
        let reference = svg_data_url(text);
        let tree = self.decode(&reference)?;

        let (out_w, out_h) = target_size(width, height, request.scale());
        let mut pixmap = Pixmap::new(out_w, out_h).ok_or_else(|| {
            Error::SurfaceUnavailable(format!("cannot allocate {}x{} surface", out_w, out_h))
        })?;
        if request.background() == Background::White {
            pixmap.fill(Color::WHITE);
        }

        let src = tree.size();
        let transform = Transform::from_scale(
            out_w as f32 / src.width(),
            out_h as f32 / src.height(),
        );
        resvg::render(&tree, transform, &mut pixmap.as_mut());

        let png_data = pixmap
            .encode_png()
            .map_err(|e| Error::EncodeFailed(e.to_string()))?;
        debug!(
            "rasterized {}x{} at {}x over {} -> {} bytes",
            width,
            height,
            request.scale(),
            request.background(),
            png_data.len()
        );
        Ok(RasterResult {
            width: out_w,
            height: out_h,
            png_data,
        })
    }

    fn decode(&self, reference: &str) -> Result<usvg::Tree> {
        let source = data_url::decode_data_url(reference)
            .map_err(|e| Error::DecodeFailed(e.to_string()))?;
        let mut opt = usvg::Options::default();
        opt.fontdb = self.fontdb.clone();
        usvg::Tree::from_data(&source.bytes, &opt)
            .map_err(|e| Error::DecodeFailed(format!("image load failed: {}", e)))
    }
}

impl Default for Rasterizer {
    fn default() -> Self {
        Self::new(true)
    }
}
