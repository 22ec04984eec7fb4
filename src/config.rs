//! User-facing export settings
//!
//! Settings come from defaults, optionally a JSON file, and finally
//! command-line overrides. Values are clamped by [`ExportSettings::normalized`]
//! rather than rejected, the same way the export dialog treats its inputs.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::enumerate::ScanOptions;
use crate::{Background, ExportRequest, PageConfig, Result, StyleMode};

/// Default number of graphics kept by a scan
pub const DEFAULT_LIMIT: usize = 60;
/// Hard ceiling on the number of graphics kept by a scan
pub const MAX_LIMIT: usize = 200;

/// Settings for scanning a page and exporting its graphics
///
/// # Examples
///
/// ```
/// let s: svgrab::ExportSettings = serde_json::from_str(r#"{"scale": 12, "limit": 0}"#).unwrap();
/// let s = s.normalized();
/// assert_eq!(s.scale, 8);
/// assert_eq!(s.limit, 1);
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ExportSettings {
    /// Raster scale factor, 1 to 8
    pub scale: u32,
    /// Surface fill before drawing
    pub background: Background,
    /// Which serialization to rasterize
    pub style_mode: StyleMode,
    /// Only keep graphics currently inside the viewport
    pub visible_only: bool,
    /// Maximum number of graphics kept by a scan, 1 to 200
    pub limit: usize,
    /// Load system fonts so `<text>` renders
    pub load_system_fonts: bool,
    /// Page loading options
    pub page: PageConfig,
}

impl Default for ExportSettings {
    fn default() -> Self {
        Self {
            scale: ExportRequest::DEFAULT_SCALE,
            background: Background::Transparent,
            style_mode: StyleMode::Styled,
            visible_only: false,
            limit: DEFAULT_LIMIT,
            load_system_fonts: true,
            page: PageConfig::default(),
        }
    }
}

impl ExportSettings {
    /// Read settings from a JSON file; missing fields take their defaults.
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self> {
        let text = std::fs::read_to_string(path.as_ref())?;
        let settings: ExportSettings = serde_json::from_str(&text)?;
        Ok(settings.normalized())
    }

    /// Clamp every bounded field into its allowed range.
    pub fn normalized(mut self) -> Self {
        self.scale = self
            .scale
            .clamp(ExportRequest::MIN_SCALE, ExportRequest::MAX_SCALE);
        self.limit = clamp_limit(self.limit);
        self
    }

    /// The per-export request derived from these settings
    pub fn export_request(&self) -> ExportRequest {
        ExportRequest::new(self.scale as i64, self.background)
    }

    /// The scan options derived from these settings
    pub fn scan_options(&self) -> ScanOptions {
        ScanOptions {
            visible_only: self.visible_only,
            limit: clamp_limit(self.limit),
        }
    }
}

/// Clamp a scan cap into `[1, 200]`
pub fn clamp_limit(limit: usize) -> usize {
    limit.clamp(1, MAX_LIMIT)
}
