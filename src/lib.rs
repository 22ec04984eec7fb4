//! svgrab
//!
//! Locate inline SVG graphics in a web page and export them as PNG images.
//!
//! The pipeline has three stages:
//!
//! - **Enumeration** ([`enumerate`]): find every `<svg>` in a [`Page`],
//!   optionally keep only the ones inside the viewport, cap the result count.
//! - **Snapshot** ([`snapshot`]): turn a graphic into a [`NormalizedAsset`]
//!   holding a raw serialization and a styled one with computed styles
//!   inlined, so the export looks like what the page shows.
//! - **Rasterize** ([`raster`]): draw a serialization at a scale factor over a
//!   transparent or white background and encode it as PNG.
//!
//! Results are handed to a [`delivery::DeliveryMechanism`], normally through
//! the [`Downloader`] worker.
//!
//! # Example
//!
//! ```no_run
//! use svgrab::{ExportRequest, Background, Page, PageConfig, StyleMode};
//! use svgrab::enumerate::ScanOptions;
//! use svgrab::raster::Rasterizer;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let page = Page::load("page.html", &PageConfig::default())?;
//! let assets = page.scan(&ScanOptions { visible_only: true, ..Default::default() });
//!
//! let rasterizer = Rasterizer::new(false);
//! let request = ExportRequest::new(2, Background::White);
//! for asset in &assets {
//!     let png = rasterizer.rasterize_asset(&asset.asset, StyleMode::Styled, &request)?;
//!     println!("{}: {}x{}", asset.id, png.width, png.height);
//! }
//! # Ok(())
//! # }
//! ```

use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

pub mod error;
pub use error::{Error, Result};

pub mod config;
pub mod delivery;
pub mod downloader;
pub mod element;
pub mod enumerate;
pub mod export;
pub mod filename;
pub mod page;
pub mod raster;
pub mod session;
pub mod snapshot;

pub use config::ExportSettings;
pub use downloader::Downloader;
pub use element::{ComputedStyle, GraphicElement, Rect};
pub use page::{Page, PageElement};
pub use session::{ExportDialog, PageSession};

/// Configuration used when loading a page
///
/// The defaults mirror a desktop browser window: a 1280x720 viewport and a
/// 30 second load timeout.
///
/// # Examples
///
/// ```
/// let cfg = svgrab::PageConfig::default();
/// assert_eq!(cfg.viewport.width, 1280);
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PageConfig {
    /// User agent string to send with requests
    pub user_agent: String,
    /// Viewport dimensions used for layout and the visibility filter
    pub viewport: Viewport,
    /// Timeout for page loads in milliseconds
    pub timeout_ms: u64,
    /// Custom HTTP headers
    pub headers: HashMap<String, String>,
}

impl Default for PageConfig {
    fn default() -> Self {
        Self {
            user_agent: format!("svgrab/{}", env!("CARGO_PKG_VERSION")),
            viewport: Viewport::default(),
            timeout_ms: 30000,
            headers: HashMap::new(),
        }
    }
}

/// Viewport dimensions
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Viewport {
    pub width: u32,
    pub height: u32,
}

impl Default for Viewport {
    fn default() -> Self {
        Self {
            width: 1280,
            height: 720,
        }
    }
}

/// What the raster surface is filled with before the graphic is drawn
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Background {
    #[default]
    Transparent,
    White,
}

impl FromStr for Background {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "transparent" => Ok(Background::Transparent),
            "white" => Ok(Background::White),
            other => Err(Error::ConfigError(format!("unknown background '{}'", other))),
        }
    }
}

impl fmt::Display for Background {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Background::Transparent => f.write_str("transparent"),
            Background::White => f.write_str("white"),
        }
    }
}

/// Which serialization of a graphic gets exported
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StyleMode {
    /// Computed styles inlined onto every element
    #[default]
    #[serde(alias = "computed")]
    Styled,
    /// Structure only, as authored
    Raw,
}

impl FromStr for StyleMode {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "styled" | "computed" => Ok(StyleMode::Styled),
            "raw" => Ok(StyleMode::Raw),
            other => Err(Error::ConfigError(format!("unknown style mode '{}'", other))),
        }
    }
}

impl fmt::Display for StyleMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StyleMode::Styled => f.write_str("styled"),
            StyleMode::Raw => f.write_str("raw"),
        }
    }
}

/// Scale and background for one export, clamped on construction
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExportRequest {
    scale: u32,
    background: Background,
}

impl ExportRequest {
    pub const MIN_SCALE: u32 = 1;
    pub const MAX_SCALE: u32 = 8;
    pub const DEFAULT_SCALE: u32 = 2;

    /// Build a request, clamping `scale` into `[1, 8]`.
    pub fn new(scale: i64, background: Background) -> Self {
        let scale = scale.clamp(Self::MIN_SCALE as i64, Self::MAX_SCALE as i64) as u32;
        Self { scale, background }
    }

    /// Build a request from free-form user input.
    ///
    /// Unparseable or zero scale falls back to the default of 2; fractional
    /// values are rounded; unknown backgrounds mean transparent.
    pub fn from_user_input(scale: &str, background: &str) -> Self {
        let parsed = scale.trim().parse::<f64>().ok().filter(|v| v.is_finite() && *v != 0.0);
        let scale = match parsed {
            Some(v) => v.round() as i64,
            None => Self::DEFAULT_SCALE as i64,
        };
        let background = background.parse().unwrap_or_default();
        Self::new(scale, background)
    }

    pub fn scale(&self) -> u32 {
        self.scale
    }

    pub fn background(&self) -> Background {
        self.background
    }
}

impl Default for ExportRequest {
    fn default() -> Self {
        Self::new(Self::DEFAULT_SCALE as i64, Background::default())
    }
}

/// A graphic normalized into two self-contained serializations
///
/// Both forms describe the same geometry; `styled_form` additionally carries
/// the computed visual style of every element inline.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NormalizedAsset {
    pub title: String,
    pub width: f64,
    pub height: f64,
    pub raw_form: String,
    pub styled_form: String,
}

impl NormalizedAsset {
    /// The serialization matching `mode`
    pub fn form(&self, mode: StyleMode) -> &str {
        match mode {
            StyleMode::Styled => &self.styled_form,
            StyleMode::Raw => &self.raw_form,
        }
    }
}

/// A normalized asset found while scanning a page
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScannedAsset {
    /// Stable id of the form `svg-<index>`
    pub id: String,
    /// Position among all graphics of the page, before filtering
    pub index: usize,
    /// CSS selector that finds the graphic again
    pub selector: String,
    /// Styled form without explicit width/height, for thumbnails
    pub preview_form: String,
    #[serde(flatten)]
    pub asset: NormalizedAsset,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = PageConfig::default();
        assert_eq!(config.viewport.width, 1280);
        assert_eq!(config.viewport.height, 720);
        assert!(config.user_agent.starts_with("svgrab/"));
    }

    #[test]
    fn export_request_clamps_scale() {
        assert_eq!(ExportRequest::new(0, Background::White).scale(), 1);
        assert_eq!(ExportRequest::new(-4, Background::White).scale(), 1);
        assert_eq!(ExportRequest::new(12, Background::White).scale(), 8);
        assert_eq!(ExportRequest::new(3, Background::White).scale(), 3);
    }

    #[test]
    fn export_request_from_user_input() {
        let r = ExportRequest::from_user_input("abc", "white");
        assert_eq!(r.scale(), 2);
        assert_eq!(r.background(), Background::White);

        assert_eq!(ExportRequest::from_user_input("0", "").scale(), 2);
        assert_eq!(ExportRequest::from_user_input("100", "").scale(), 8);
        assert_eq!(ExportRequest::from_user_input("3.4", "").scale(), 3);
        assert_eq!(
            ExportRequest::from_user_input("4", "purple").background(),
            Background::Transparent
        );
    }

    #[test]
    fn style_mode_accepts_computed_alias() {
        assert_eq!("computed".parse::<StyleMode>().unwrap(), StyleMode::Styled);
        assert_eq!("RAW".parse::<StyleMode>().unwrap(), StyleMode::Raw);
        assert!("fancy".parse::<StyleMode>().is_err());
    }
}
