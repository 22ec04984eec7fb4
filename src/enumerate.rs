//! Asset enumeration: which graphics of a page get snapshotted
//!
//! Graphics are visited in document order. With `visible_only` set, a
//! graphic is kept only when its rendered box intersects the viewport and its
//! style does not hide it. Clipping and occlusion by other content are not
//! considered.

use log::debug;
use serde::{Deserialize, Serialize};

use crate::config::{clamp_limit, DEFAULT_LIMIT};
use crate::element::GraphicElement;
use crate::snapshot::normalize;
use crate::{ScannedAsset, Viewport};

/// How a scan filters and caps graphics
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScanOptions {
    pub visible_only: bool,
    /// Maximum number of assets returned; clamped into `[1, 200]`
    pub limit: usize,
}

impl Default for ScanOptions {
    fn default() -> Self {
        Self {
            visible_only: false,
            limit: DEFAULT_LIMIT,
        }
    }
}

/// Whether a graphic is on screen and not hidden by style.
pub fn is_visible<E: GraphicElement>(element: &E, viewport: Viewport) -> bool {
    let rect = element.bounding_client_rect();
    if !rect.has_area() {
        return false;
    }
    if rect.bottom() <= 0.0
        || rect.right() <= 0.0
        || rect.top() >= viewport.height as f64
        || rect.left() >= viewport.width as f64
    {
        return false;
    }

    let style = element.computed_style();
    if style.get("display") == Some("none") || style.get("visibility") == Some("hidden") {
        return false;
    }
    !matches!(
        style.get("opacity").and_then(|o| o.trim().parse::<f64>().ok()),
        Some(o) if o == 0.0
    )
}

/// Snapshot graphics in order, applying the visibility filter and the cap.
///
/// `index` on each result is the graphic's position in `elements`, so it
/// stays stable whether or not earlier graphics were filtered out.
pub fn collect_assets<E: GraphicElement>(
    elements: &[E],
    viewport: Viewport,
    options: &ScanOptions,
) -> Vec<ScannedAsset> {
    let limit = clamp_limit(options.limit);
    let mut assets = Vec::new();

    for (index, element) in elements.iter().enumerate() {
        if assets.len() >= limit {
            debug!(
                "scan cap of {} reached, dropping {} remaining graphics",
                limit,
                elements.len() - index
            );
            break;
        }
        if options.visible_only && !is_visible(element, viewport) {
            continue;
        }
        assets.push(scan_one(element, index));
    }
    assets
}

fn scan_one<E: GraphicElement>(element: &E, index: usize) -> ScannedAsset {
    let normalized = normalize(element);
    let selector = selector_for(element);

    let mut preview = normalized.styled.clone();
    preview.remove_attribute("width");
    preview.remove_attribute("height");

    ScannedAsset {
        id: format!("svg-{}", index),
        index,
        selector,
        preview_form: preview.to_xml(),
        asset: normalized.into_asset(),
    }
}

/// `#id`, else `.class1.class2`, else `svg`
pub fn selector_for<E: GraphicElement>(element: &E) -> String {
    if let Some(id) = element.attribute("id").filter(|id| !id.is_empty()) {
        return format!("#{}", css_escape(&id));
    }
    let classes: Vec<String> = element
        .attribute("class")
        .map(|c| c.split_whitespace().map(css_escape).collect())
        .unwrap_or_default();
    if classes.is_empty() {
        "svg".to_string()
    } else {
        format!(".{}", classes.join("."))
    }
}

/// Escape a CSS identifier the way `CSS.escape` does.
pub fn css_escape(ident: &str) -> String {
    let mut out = String::with_capacity(ident.len());
    let chars: Vec<char> = ident.chars().collect();
    for (i, &c) in chars.iter().enumerate() {
        match c {
            '\0' => out.push('\u{FFFD}'),
            '\u{1}'..='\u{1f}' | '\u{7f}' => out.push_str(&format!("\\{:x} ", c as u32)),
            '0'..='9' if i == 0 || (i == 1 && chars[0] == '-') => {
                out.push_str(&format!("\\{:x} ", c as u32))
            }
            '-' if i == 0 && chars.len() == 1 => out.push_str("\\-"),
            c if c.is_ascii_alphanumeric() || c == '-' || c == '_' || !c.is_ascii() => out.push(c),
            c => {
                out.push('\\');
                out.push(c);
            }
        }
    }
    out
}
