//! Very small layout for the graphics of a page
//!
//! Only `<svg>` boxes are laid out:
//! - outermost graphics stack vertically at x=8, separated by an 8px margin
//! - `position: absolute|fixed` graphics sit at their `left/top` offsets
//! - nested graphics sit inside their parent at their `x/y` attributes
//! - anything under `display: none` gets an empty box

use scraper::{ElementRef, Html, Selector};

use crate::element::{ComputedStyle, Rect};
use crate::page::cascade::{StyleCache, StyleSheet};
use crate::snapshot::bbox::parse_user_length;
use crate::Viewport;

/// Replaced-element default size of a graphic without explicit dimensions
pub const DEFAULT_WIDTH: f64 = 300.0;
pub const DEFAULT_HEIGHT: f64 = 150.0;

const MARGIN: f64 = 8.0;

/// Rendered boxes of every graphic, in document order of the graphics
#[derive(Debug, Clone, Default)]
pub struct Layout {
    boxes: Vec<Rect>,
}

impl Layout {
    /// Box of the `index`-th graphic of the document
    pub fn rect(&self, index: usize) -> Rect {
        self.boxes.get(index).copied().unwrap_or_default()
    }

    pub fn len(&self) -> usize {
        self.boxes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.boxes.is_empty()
    }
}

/// Compute the boxes of every `<svg>` in document order.
pub fn layout_document(
    document: &Html,
    sheet: &StyleSheet,
    styles: &StyleCache,
    viewport: Viewport,
) -> Layout {
    let mut layout = Layout::default();
    let Ok(svg_sel) = Selector::parse("svg") else {
        return layout;
    };
    let graphics: Vec<ElementRef<'_>> = document.select(&svg_sel).collect();
    let mut y = MARGIN;

    for svg in &graphics {
        let svg = *svg;
        if !is_rendered(&svg, sheet, styles) {
            layout.boxes.push(Rect::default());
            continue;
        }
        let style = sheet.compute_cached(&svg, styles);

        let parent = nearest_svg_ancestor(&svg)
            .and_then(|p| graphics.iter().position(|g| *g == p));
        let rect = match parent {
            Some(parent) => {
                let outer = layout.rect(parent);
                if !outer.has_area() {
                    Rect::default()
                } else {
                    let (w, h) = resolve_size(&svg, &style, outer.width, outer.height);
                    let attr = |name: &str| {
                        svg.value()
                            .attr(name)
                            .and_then(parse_user_length)
                            .unwrap_or(0.0)
                    };
                    Rect::new(outer.x + attr("x"), outer.y + attr("y"), w, h)
                }
            }
            None => {
                let (w, h) = resolve_size(
                    &svg,
                    &style,
                    viewport.width as f64,
                    viewport.height as f64,
                );
                if matches!(style.get("position"), Some("absolute") | Some("fixed")) {
                    let offset = |name: &str| style.get(name).and_then(css_px).unwrap_or(0.0);
                    Rect::new(offset("left"), offset("top"), w, h)
                } else {
                    let rect = Rect::new(MARGIN, y, w, h);
                    y += h + MARGIN;
                    rect
                }
            }
        };
        layout.boxes.push(rect);
    }

    layout
}

/// False when the element or any ancestor has `display: none`.
pub fn is_rendered(element: &ElementRef<'_>, sheet: &StyleSheet, styles: &StyleCache) -> bool {
    let mut current = Some(*element);
    while let Some(el) = current {
        if sheet
            .compute_cached(&el, styles)
            .get("display")
            .is_some_and(|d| d.trim().eq_ignore_ascii_case("none"))
        {
            return false;
        }
        current = el.parent().and_then(ElementRef::wrap);
    }
    true
}

fn nearest_svg_ancestor<'a>(element: &ElementRef<'a>) -> Option<ElementRef<'a>> {
    element
        .ancestors()
        .filter_map(ElementRef::wrap)
        .find(|a| a.value().name() == "svg")
}

/// CSS size, then attribute size, then the replaced-element default.
/// Percentages resolve against the containing size.
fn resolve_size(
    element: &ElementRef<'_>,
    style: &ComputedStyle,
    container_w: f64,
    container_h: f64,
) -> (f64, f64) {
    let pick = |property: &str, container: f64, default: f64| {
        style
            .get(property)
            .and_then(|v| length_or_percent(v, container))
            .or_else(|| {
                element
                    .value()
                    .attr(property)
                    .and_then(|v| length_or_percent(v, container))
            })
            .filter(|v| *v >= 0.0)
            .unwrap_or(default)
    };
    (
        pick("width", container_w, DEFAULT_WIDTH),
        pick("height", container_h, DEFAULT_HEIGHT),
    )
}

fn length_or_percent(value: &str, container: f64) -> Option<f64> {
    let value = value.trim();
    if let Some(pct) = value.strip_suffix('%') {
        let pct = pct.trim().parse::<f64>().ok()?;
        return Some(container * pct / 100.0).filter(|v| v.is_finite());
    }
    css_px(value)
}

fn css_px(value: &str) -> Option<f64> {
    if value.eq_ignore_ascii_case("auto") {
        return None;
    }
    parse_user_length(value)
}
