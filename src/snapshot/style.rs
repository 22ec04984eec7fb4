//! Computed-style capture and inlining

use crate::element::{ComputedStyle, GraphicElement};
use crate::snapshot::tree::SvgNode;

/// Visual properties copied from the live computed style into the styled form
pub const STYLE_PROPERTIES: [&str; 26] = [
    "fill",
    "fill-opacity",
    "stroke",
    "stroke-width",
    "stroke-linecap",
    "stroke-linejoin",
    "stroke-miterlimit",
    "stroke-dasharray",
    "stroke-dashoffset",
    "stroke-opacity",
    "opacity",
    "color",
    "font-family",
    "font-size",
    "font-weight",
    "font-style",
    "letter-spacing",
    "word-spacing",
    "text-anchor",
    "dominant-baseline",
    "baseline-shift",
    "clip-path",
    "clip-rule",
    "mask",
    "filter",
    "mix-blend-mode",
];

/// Allowlisted computed values of one element, in allowlist order
#[derive(Debug, Clone, PartialEq, Default)]
pub struct StyleSnapshot {
    entries: Vec<(&'static str, String)>,
}

impl StyleSnapshot {
    /// Capture the allowlist from a computed style; unresolved properties
    /// are left out.
    pub fn capture(style: &ComputedStyle) -> Self {
        let entries = STYLE_PROPERTIES
            .iter()
            .filter_map(|&prop| style.get(prop).map(|v| (prop, v.to_string())))
            .collect();
        Self { entries }
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// `prop:value` pairs joined by `;`
    pub fn to_css_text(&self) -> String {
        self.entries
            .iter()
            .map(|(p, v)| format!("{}:{}", p, v))
            .collect::<Vec<_>>()
            .join(";")
    }
}

/// Append each source element's computed style to the matching clone element.
///
/// Source and clone are walked in lock-step over elements in document order;
/// the walk stops when either side runs out. An existing inline style is kept
/// in front of the inlined text.
pub fn inline_computed_styles<E: GraphicElement>(source: &E, target: &mut SvgNode) {
    let sources = source.element_subtree();
    let mut sources = sources.iter();
    target.for_each_element_mut(&mut |node| {
        let Some(src) = sources.next() else {
            return;
        };
        let snapshot = StyleSnapshot::capture(&src.computed_style());
        if snapshot.is_empty() {
            return;
        }
        let text = snapshot.to_css_text();
        let merged = match node.attribute("style") {
            Some(existing) if !existing.is_empty() => format!("{};{}", existing, text),
            _ => text,
        };
        node.set_attribute("style", merged);
    });
}
