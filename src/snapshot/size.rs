//! Size inference for graphics that may not be rendered

use log::debug;

use crate::element::{is_positive, GraphicElement};

/// Size used when nothing about the graphic gives a usable size
pub const FALLBACK_SIZE: f64 = 256.0;

/// Width and height of a graphic in CSS pixels, always finite and >= 1
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Size {
    pub width: f64,
    pub height: f64,
}

/// Infer the export size of a graphic.
///
/// First positive candidate wins: rendered box, viewBox, content bounding
/// box, then 256x256. Each dimension is finally floored to 1.
pub fn infer_size<E: GraphicElement>(element: &E) -> Size {
    let (width, height) = candidate_size(element);
    Size {
        width: width.max(1.0),
        height: height.max(1.0),
    }
}

fn candidate_size<E: GraphicElement>(element: &E) -> (f64, f64) {
    let rect = element.bounding_client_rect();
    if rect.has_area() {
        return (rect.width, rect.height);
    }

    if let Some(size) = element
        .attribute("viewBox")
        .and_then(|vb| view_box_size(&vb))
    {
        return size;
    }

    match element.content_bbox() {
        Ok(bbox) if bbox.has_area() => return (bbox.width, bbox.height),
        Ok(_) => {}
        Err(e) => debug!("content bbox unavailable, using fallback size: {}", e),
    }

    (FALLBACK_SIZE, FALLBACK_SIZE)
}

/// Width and height from a `viewBox` attribute.
///
/// The attribute must split on whitespace/commas into exactly four finite
/// numbers, and the third and fourth must be positive.
pub fn view_box_size(view_box: &str) -> Option<(f64, f64)> {
    let parts: Vec<f64> = view_box
        .split(|c: char| c.is_whitespace() || c == ',')
        .filter(|p| !p.is_empty())
        .filter_map(|p| p.parse::<f64>().ok())
        .filter(|n| n.is_finite())
        .collect();
    if parts.len() != 4 {
        return None;
    }
    let (w, h) = (parts[2], parts[3]);
    if is_positive(w) && is_positive(h) {
        Some((w, h))
    } else {
        None
    }
}

/// Shortest decimal form of a dimension (`24`, `100.5`)
pub fn format_dimension(v: f64) -> String {
    format!("{}", v)
}
