//! The read-only view of a graphic element the pipeline works against
//!
//! A live page ([`crate::PageElement`]) implements [`GraphicElement`], and so
//! can any other host or a synthetic element in tests.

use std::collections::BTreeMap;

use crate::snapshot::tree::SvgNode;
use crate::Result;

/// An axis-aligned box in CSS pixels
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Rect {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl Rect {
    pub fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    pub fn left(&self) -> f64 {
        self.x
    }

    pub fn top(&self) -> f64 {
        self.y
    }

    pub fn right(&self) -> f64 {
        self.x + self.width
    }

    pub fn bottom(&self) -> f64 {
        self.y + self.height
    }

    /// Both dimensions finite and strictly positive
    pub fn has_area(&self) -> bool {
        is_positive(self.width) && is_positive(self.height)
    }

    /// Smallest rect covering both
    pub fn union(&self, other: &Rect) -> Rect {
        let left = self.left().min(other.left());
        let top = self.top().min(other.top());
        let right = self.right().max(other.right());
        let bottom = self.bottom().max(other.bottom());
        Rect::new(left, top, right - left, bottom - top)
    }
}

pub(crate) fn is_positive(v: f64) -> bool {
    v.is_finite() && v > 0.0
}

/// Resolved style values of one element, keyed by property name
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ComputedStyle {
    values: BTreeMap<String, String>,
}

impl ComputedStyle {
    pub fn new() -> Self {
        Self::default()
    }

    /// Resolved value of `property`; `None` when nothing resolved.
    pub fn get(&self, property: &str) -> Option<&str> {
        self.values
            .get(property)
            .map(|s| s.as_str())
            .filter(|s| !s.is_empty())
    }

    pub fn set(&mut self, property: impl Into<String>, value: impl Into<String>) {
        self.values.insert(property.into(), value.into());
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for ComputedStyle {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut style = ComputedStyle::new();
        for (k, v) in iter {
            style.set(k, v);
        }
        style
    }
}

/// Read access to an inline vector-graphic element of a document
///
/// Implementations only expose what the snapshot and enumeration stages
/// read: geometry, attributes, computed style and structure.
pub trait GraphicElement {
    /// The rendered box in viewport coordinates; zero-sized when not rendered
    fn bounding_client_rect(&self) -> Rect;

    /// Value of an attribute, if present
    fn attribute(&self, name: &str) -> Option<String>;

    /// Live computed style of this element
    fn computed_style(&self) -> ComputedStyle;

    /// A structurally identical, detached copy of this element's subtree
    fn clone_subtree(&self) -> SvgNode;

    /// This element followed by all descendant elements, in document order
    ///
    /// The order must match the element order of [`clone_subtree`](Self::clone_subtree).
    fn element_subtree(&self) -> Vec<Self>
    where
        Self: Sized;

    /// Geometric bounding box of the element's own content in user units
    fn content_bbox(&self) -> Result<Rect> {
        crate::snapshot::bbox::content_bbox(&self.clone_subtree())
    }
}
