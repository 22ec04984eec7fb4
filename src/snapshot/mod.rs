//! Snapshot builder: graphic element to self-contained serializations
//!
//! Every snapshot carries two complete documents. The raw form is the
//! element's own markup made standalone; the styled form additionally has
//! the computed visual style of each element inlined, so it renders the same
//! outside the page's cascade.

pub mod bbox;
pub mod size;
pub mod style;
pub mod tree;

use crate::element::GraphicElement;
use crate::NormalizedAsset;
use size::{format_dimension, infer_size, Size};
use tree::SvgNode;

/// Longest title candidate taken from an attribute, in characters
pub const MAX_TITLE_CHARS: usize = 200;

/// Both forms of a graphic as trees, before serialization
#[derive(Debug, Clone)]
pub struct Normalized {
    pub title: String,
    pub size: Size,
    pub raw: SvgNode,
    pub styled: SvgNode,
}

impl Normalized {
    pub fn into_asset(self) -> NormalizedAsset {
        NormalizedAsset {
            title: self.title,
            width: self.size.width,
            height: self.size.height,
            raw_form: self.raw.to_xml(),
            styled_form: self.styled.to_xml(),
        }
    }
}

/// Build the snapshot of one graphic.
pub fn build_snapshot<E: GraphicElement>(element: &E) -> NormalizedAsset {
    normalize(element).into_asset()
}

/// Infer the size, clone twice, inline styles into one clone.
pub fn normalize<E: GraphicElement>(element: &E) -> Normalized {
    let size = infer_size(element);
    let raw = standalone_clone(element, size);
    let mut styled = standalone_clone(element, size);
    style::inline_computed_styles(element, &mut styled);
    Normalized {
        title: resolve_title(element),
        size,
        raw,
        styled,
    }
}

fn standalone_clone<E: GraphicElement>(element: &E, size: Size) -> SvgNode {
    let mut clone = element.clone_subtree();
    clone.declare_namespaces();
    if is_unset_dimension(clone.attribute("width")) {
        clone.set_attribute("width", format_dimension(size.width));
    }
    if is_unset_dimension(clone.attribute("height")) {
        clone.set_attribute("height", format_dimension(size.height));
    }
    clone
}

fn is_unset_dimension(value: Option<&str>) -> bool {
    matches!(value, None | Some("") | Some("0"))
}

/// First non-empty of `aria-label`, `title`, `id`; each capped at 200
/// characters.
pub fn resolve_title<E: GraphicElement>(element: &E) -> String {
    ["aria-label", "title", "id"]
        .iter()
        .filter_map(|name| element.attribute(name))
        .map(|v| truncate_chars(&v, MAX_TITLE_CHARS))
        .find(|v| !v.is_empty())
        .unwrap_or_default()
}

pub(crate) fn truncate_chars(s: &str, max: usize) -> String {
    s.chars().take(max).collect()
}
