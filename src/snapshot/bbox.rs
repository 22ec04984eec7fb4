//! Geometric bounding box of a graphic's content
//!
//! The box is the union of the basic shapes, paths, images, `use`
//! references and nested viewports below the root, in the root's user
//! coordinates. Curves contribute their control points, so the box may be
//! slightly larger than the painted curve. A `<switch>` contributes the
//! first child it would render.

use std::str::FromStr;

use svgtypes::{Length, LengthUnit, PointsParser, SimplePathSegment, SimplifyingPathParser};
use tiny_skia::{Point, Transform};

use crate::element::Rect;
use crate::snapshot::tree::SvgNode;
use crate::{Error, Result};

/// Elements whose subtrees never contribute geometry directly
const NON_RENDERED: [&str; 15] = [
    "defs",
    "clipPath",
    "mask",
    "symbol",
    "pattern",
    "linearGradient",
    "radialGradient",
    "marker",
    "filter",
    "style",
    "script",
    "title",
    "desc",
    "metadata",
    "foreignObject",
];

/// Languages a `<switch>` child's `systemLanguage` is tested against
const LANGUAGES: [&str; 1] = ["en"];

/// Bounding box of `root`'s content.
///
/// Fails when nothing below the root has computable geometry.
pub fn content_bbox(root: &SvgNode) -> Result<Rect> {
    let mut acc: Option<Rect> = None;
    for child in root.child_elements() {
        collect(child, Transform::identity(), &mut acc);
    }
    acc.ok_or_else(|| Error::BoundingBox(format!("<{}> has no measurable content", root.name)))
}

fn collect(node: &SvgNode, parent: Transform, acc: &mut Option<Rect>) {
    if NON_RENDERED.contains(&node.name.as_str()) {
        return;
    }
    let ctm = match node.attribute("transform").and_then(parse_transform) {
        Some(t) => parent.pre_concat(t),
        None => parent,
    };

    if let Some(local) = shape_bounds(node) {
        if let Some(mapped) = map_rect(ctm, &local) {
            *acc = Some(match *acc {
                Some(r) => r.union(&mapped),
                None => mapped,
            });
        }
    }

    match node.name.as_str() {
        // Nested viewports are measured by their own box only.
        "svg" => {}
        "switch" => {
            if let Some(child) = switch_choice(node) {
                collect(child, ctm, acc);
            }
        }
        _ => {
            for child in node.child_elements() {
                collect(child, ctm, acc);
            }
        }
    }
}

/// The child a `<switch>` renders: the first whose conditions hold.
fn switch_choice(node: &SvgNode) -> Option<&SvgNode> {
    node.child_elements().find(|child| {
        let extensions_ok = child
            .attribute("requiredExtensions")
            .map_or(true, |v| v.trim().is_empty());
        let language_ok = child.attribute("systemLanguage").map_or(true, |langs| {
            langs.split(',').map(str::trim).any(|lang| {
                LANGUAGES
                    .iter()
                    .any(|ours| lang == *ours || lang.starts_with(&format!("{}-", ours)))
            })
        });
        extensions_ok && language_ok
    })
}

fn shape_bounds(node: &SvgNode) -> Option<Rect> {
    let num = |name: &str| node.attribute(name).and_then(parse_user_length);
    match node.name.as_str() {
        "rect" | "image" | "use" | "svg" => {
            let w = num("width")?;
            let h = num("height")?;
            if w < 0.0 || h < 0.0 {
                return None;
            }
            Some(Rect::new(num("x").unwrap_or(0.0), num("y").unwrap_or(0.0), w, h))
        }
        "circle" => {
            let r = num("r")?;
            if r < 0.0 {
                return None;
            }
            let cx = num("cx").unwrap_or(0.0);
            let cy = num("cy").unwrap_or(0.0);
            Some(Rect::new(cx - r, cy - r, r * 2.0, r * 2.0))
        }
        "ellipse" => {
            let rx = num("rx")?;
            let ry = num("ry")?;
            if rx < 0.0 || ry < 0.0 {
                return None;
            }
            let cx = num("cx").unwrap_or(0.0);
            let cy = num("cy").unwrap_or(0.0);
            Some(Rect::new(cx - rx, cy - ry, rx * 2.0, ry * 2.0))
        }
        "line" => {
            let pts = [
                (num("x1").unwrap_or(0.0), num("y1").unwrap_or(0.0)),
                (num("x2").unwrap_or(0.0), num("y2").unwrap_or(0.0)),
            ];
            bounds_of(pts.iter().copied())
        }
        "polyline" | "polygon" => {
            let points = node.attribute("points")?;
            bounds_of(PointsParser::from(points))
        }
        "path" => {
            let d = node.attribute("d")?;
            bounds_of(path_points(d))
        }
        _ => None,
    }
}

fn path_points(d: &str) -> Vec<(f64, f64)> {
    let mut out = Vec::new();
    for segment in SimplifyingPathParser::from(d) {
        // A path renders up to its first error.
        let Ok(segment) = segment else {
            break;
        };
        match segment {
            SimplePathSegment::MoveTo { x, y } | SimplePathSegment::LineTo { x, y } => {
                out.push((x, y))
            }
            SimplePathSegment::CurveTo {
                x1,
                y1,
                x2,
                y2,
                x,
                y,
            } => out.extend([(x1, y1), (x2, y2), (x, y)]),
            SimplePathSegment::Quadratic { x1, y1, x, y } => out.extend([(x1, y1), (x, y)]),
            SimplePathSegment::ClosePath => {}
        }
    }
    out
}

fn bounds_of(points: impl IntoIterator<Item = (f64, f64)>) -> Option<Rect> {
    let mut iter = points.into_iter().filter(|(x, y)| x.is_finite() && y.is_finite());
    let (x0, y0) = iter.next()?;
    let (mut min_x, mut min_y, mut max_x, mut max_y) = (x0, y0, x0, y0);
    for (x, y) in iter {
        min_x = min_x.min(x);
        min_y = min_y.min(y);
        max_x = max_x.max(x);
        max_y = max_y.max(y);
    }
    Some(Rect::new(min_x, min_y, max_x - min_x, max_y - min_y))
}

/// Parse an absolute length into user units; relative units yield `None`.
pub fn parse_user_length(value: &str) -> Option<f64> {
    let length = Length::from_str(value.trim()).ok()?;
    let n = length.number;
    let px = match length.unit {
        LengthUnit::None | LengthUnit::Px => n,
        LengthUnit::In => n * 96.0,
        LengthUnit::Cm => n * (96.0 / 2.54),
        LengthUnit::Mm => n * (96.0 / 25.4),
        LengthUnit::Pt => n * (96.0 / 72.0),
        LengthUnit::Pc => n * (96.0 / 6.0),
        _ => return None,
    };
    px.is_finite().then_some(px)
}

/// Bounds of `rect`'s corners after `ts`.
fn map_rect(ts: Transform, rect: &Rect) -> Option<Rect> {
    let mut corners = [
        Point::from_xy(rect.left() as f32, rect.top() as f32),
        Point::from_xy(rect.right() as f32, rect.top() as f32),
        Point::from_xy(rect.left() as f32, rect.bottom() as f32),
        Point::from_xy(rect.right() as f32, rect.bottom() as f32),
    ];
    ts.map_points(&mut corners);
    bounds_of(corners.iter().map(|p| (p.x as f64, p.y as f64)))
}

fn parse_transform(text: &str) -> Option<Transform> {
    let ts = svgtypes::Transform::from_str(text).ok()?;
    let ts = Transform::from_row(
        ts.a as f32,
        ts.b as f32,
        ts.c as f32,
        ts.d as f32,
        ts.e as f32,
        ts.f as f32,
    );
    ts.is_finite().then_some(ts)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn svg() -> SvgNode {
        SvgNode::new("svg")
    }

    #[test]
    fn unions_basic_shapes() {
        let root = svg()
            .with_child(
                SvgNode::new("rect")
                    .with_attribute("x", "10")
                    .with_attribute("y", "10")
                    .with_attribute("width", "20")
                    .with_attribute("height", "5"),
            )
            .with_child(
                SvgNode::new("circle")
                    .with_attribute("cx", "50")
                    .with_attribute("cy", "50")
                    .with_attribute("r", "10"),
            );
        let bbox = content_bbox(&root).unwrap();
        assert_eq!(bbox, Rect::new(10.0, 10.0, 50.0, 50.0));
    }

    #[test]
    fn applies_group_transforms() {
        let root = svg().with_child(
            SvgNode::new("g").with_attribute("transform", "translate(100 0) scale(2)").with_child(
                SvgNode::new("rect")
                    .with_attribute("width", "10")
                    .with_attribute("height", "10"),
            ),
        );
        let bbox = content_bbox(&root).unwrap();
        assert_eq!(bbox, Rect::new(100.0, 0.0, 20.0, 20.0));
    }

    #[test]
    fn measures_paths_and_polygons() {
        let root = svg()
            .with_child(SvgNode::new("path").with_attribute("d", "M2 3 h10 v4 z"))
            .with_child(SvgNode::new("polygon").with_attribute("points", "0,20 5,25 -5,22"));
        let bbox = content_bbox(&root).unwrap();
        assert_eq!(bbox, Rect::new(-5.0, 3.0, 17.0, 22.0));
    }

    #[test]
    fn skips_definitions() {
        let root = svg().with_child(
            SvgNode::new("defs").with_child(
                SvgNode::new("rect")
                    .with_attribute("width", "10")
                    .with_attribute("height", "10"),
            ),
        );
        assert!(matches!(content_bbox(&root), Err(Error::BoundingBox(_))));
    }

    #[test]
    fn empty_graphic_has_no_bbox() {
        assert!(content_bbox(&svg()).is_err());
    }

    #[test]
    fn lengths_convert_to_user_units() {
        assert_eq!(parse_user_length("12"), Some(12.0));
        assert_eq!(parse_user_length("1in"), Some(96.0));
        assert_eq!(parse_user_length("50%"), None);
        assert_eq!(parse_user_length("2em"), None);
        assert_eq!(parse_user_length("wide"), None);
    }

    #[test]
    fn rotation_takes_the_rotated_corners() {
        let root = svg().with_child(
            SvgNode::new("rect")
                .with_attribute("width", "10")
                .with_attribute("height", "20")
                .with_attribute("transform", "rotate(90)"),
        );
        let bbox = content_bbox(&root).unwrap();
        assert_eq!(bbox.width.round(), 20.0);
        assert_eq!(bbox.height.round(), 10.0);
        assert_eq!(bbox.x.round(), -20.0);
    }

    #[test]
    fn switch_measures_its_rendered_child() {
        let rect = |w: &str| {
            SvgNode::new("rect")
                .with_attribute("width", w)
                .with_attribute("height", "4")
        };
        let root = svg().with_child(
            SvgNode::new("switch")
                .with_child(
                    SvgNode::new("foreignObject")
                        .with_attribute("requiredExtensions", "http://www.w3.org/1999/xhtml")
                        .with_child(rect("100")),
                )
                .with_child(rect("50").with_attribute("systemLanguage", "fr, de"))
                .with_child(rect("8").with_attribute("systemLanguage", "en-US"))
                .with_child(rect("30")),
        );
        let bbox = content_bbox(&root).unwrap();
        assert_eq!(bbox, Rect::new(0.0, 0.0, 8.0, 4.0));
    }

    #[test]
    fn skew_widens_the_box() {
        let root = svg().with_child(
            SvgNode::new("g").with_attribute("transform", "skewX(45)").with_child(
                SvgNode::new("rect")
                    .with_attribute("width", "10")
                    .with_attribute("height", "10"),
            ),
        );
        let bbox = content_bbox(&root).unwrap();
        assert_eq!((bbox.x.round(), bbox.y.round()), (0.0, 0.0));
        assert_eq!((bbox.width.round(), bbox.height.round()), (20.0, 10.0));
    }
}
