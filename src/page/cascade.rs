//! A small style cascade over a parsed document
//!
//! Supports `<style>` sheets and linked sheets with any selector `scraper`
//! understands, inline `style` attributes, SVG presentation attributes,
//! `!important`, inheritance, `inherit` and `currentColor`. Sheets are
//! tokenized with `cssparser`; rules are matched and ranked with the
//! `selectors` engine `scraper` is built on. At-rules are skipped.
//!
//! Font sizes, font weights and spacings are resolved to absolute values, so
//! a descendant inherits the parent's result rather than its relative text.

use std::cell::RefCell;
use std::collections::HashMap;
use std::str::FromStr;

use cssparser::{
    parse_important, AtRuleParser, BasicParseError, DeclarationParser, ParseError, Parser,
    ParserInput, ParserState, QualifiedRuleParser, RuleBodyItemParser, RuleBodyParser,
    StyleSheetParser, Token,
};
use ego_tree::NodeId;
use log::debug;
use scraper::selector::{Parser as SelectorParser, Simple};
use scraper::{ElementRef, Html, Selector};
use selectors::matching::{
    matches_selector, IgnoreNthChildForInvalidation, MatchingContext, MatchingMode,
    NeedsSelectorFlags, QuirksMode,
};
use selectors::parser::{ParseRelative, Selector as ComplexSelector, SelectorParseErrorKind};
use selectors::{NthIndexCache, SelectorList};
use svgtypes::{Length, LengthUnit};

use crate::element::ComputedStyle;
use crate::snapshot::style::STYLE_PROPERTIES;

/// Properties resolved beyond the style allowlist, used by layout and the
/// visibility filter
pub const LAYOUT_PROPERTIES: [&str; 7] = [
    "display",
    "visibility",
    "position",
    "left",
    "top",
    "width",
    "height",
];

const INHERITED: [&str; 21] = [
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
    "color",
    "font-family",
    "font-size",
    "font-weight",
    "font-style",
    "letter-spacing",
    "word-spacing",
    "text-anchor",
    "dominant-baseline",
    "clip-rule",
    "visibility",
];

/// Font size of `medium`, also the root font size for `rem`
const MEDIUM_FONT_PX: f64 = 16.0;

fn initial_value(property: &str) -> Option<&'static str> {
    Some(match property {
        "fill" => "rgb(0, 0, 0)",
        "fill-opacity" => "1",
        "stroke" => "none",
        "stroke-width" => "1px",
        "stroke-linecap" => "butt",
        "stroke-linejoin" => "miter",
        "stroke-miterlimit" => "4",
        "stroke-dasharray" => "none",
        "stroke-dashoffset" => "0px",
        "stroke-opacity" => "1",
        "opacity" => "1",
        "color" => "rgb(0, 0, 0)",
        "font-size" => "16px",
        "font-weight" => "400",
        "font-style" => "normal",
        "letter-spacing" => "normal",
        "word-spacing" => "0px",
        "text-anchor" => "start",
        "dominant-baseline" => "auto",
        "baseline-shift" => "0px",
        "clip-path" => "none",
        "clip-rule" => "nonzero",
        "mask" => "none",
        "filter" => "none",
        "mix-blend-mode" => "normal",
        "display" => "inline",
        "visibility" => "visible",
        "position" => "static",
        "left" | "top" | "width" | "height" => "auto",
        // font-family depends on the user agent; leave it unresolved
        _ => return None,
    })
}

fn is_inherited(property: &str) -> bool {
    INHERITED.contains(&property)
}

/// Attributes that act as author-level style declarations on SVG elements
fn is_presentation_attribute(property: &str) -> bool {
    !matches!(property, "position" | "left" | "top" | "width" | "height")
}

/// One `property: value` pair
#[derive(Debug, Clone, PartialEq)]
pub struct Declaration {
    pub property: String,
    pub value: String,
    pub important: bool,
}

/// One complex selector of a rule with the rule's declarations
#[derive(Debug)]
struct StyleRule {
    selector: ComplexSelector<Simple>,
    specificity: u32,
    declarations: Vec<Declaration>,
}

impl StyleRule {
    fn matches(&self, element: &ElementRef<'_>, nth_index_cache: &mut NthIndexCache) -> bool {
        let mut context = MatchingContext::new(
            MatchingMode::Normal,
            None,
            nth_index_cache,
            QuirksMode::NoQuirks,
            NeedsSelectorFlags::No,
            IgnoreNthChildForInvalidation::No,
        );
        matches_selector(&self.selector, 0, None, element, &mut context)
    }
}

/// Every style rule of a document, in source order
#[derive(Debug, Default)]
pub struct StyleSheet {
    rules: Vec<StyleRule>,
}

/// Computed styles of a document, filled in as elements are resolved
#[derive(Debug, Default)]
pub struct StyleCache {
    styles: RefCell<HashMap<NodeId, ComputedStyle>>,
}

impl StyleCache {
    pub fn len(&self) -> usize {
        self.styles.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.styles.borrow().is_empty()
    }
}

impl StyleSheet {
    /// Collect the rules of every `<style>` element in the document.
    pub fn from_document(document: &Html) -> Self {
        Self::from_document_with(document, |_| None)
    }

    /// Collect `<style>` elements and linked stylesheets in document order.
    ///
    /// `fetch_linked` receives the `href` of each `<link rel="stylesheet">`
    /// and returns its text, or `None` to skip it.
    pub fn from_document_with<F>(document: &Html, mut fetch_linked: F) -> Self
    where
        F: FnMut(&str) -> Option<String>,
    {
        let mut sheet = StyleSheet::default();
        let Ok(sel) = Selector::parse("style, link[rel~=\"stylesheet\"]") else {
            return sheet;
        };
        for node in document.select(&sel) {
            let text = if node.value().name() == "style" {
                Some(node.text().collect::<String>())
            } else {
                node.value().attr("href").and_then(&mut fetch_linked)
            };
            if let Some(text) = text.filter(|t| !t.trim().is_empty()) {
                sheet.add_css(&text);
            }
        }
        sheet
    }

    /// Number of complex selectors across all rules
    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    /// Append the rules of a stylesheet text.
    ///
    /// A rule list `a, b { .. }` is kept as one entry per selector, each
    /// with its own specificity.
    pub fn add_css(&mut self, css: &str) {
        let mut input = ParserInput::new(css);
        let mut parser = Parser::new(&mut input);
        let mut rule_parser = RuleParser;
        for result in StyleSheetParser::new(&mut parser, &mut rule_parser) {
            match result {
                Ok(rules) => self.rules.extend(rules),
                Err((_, source)) => debug!("skipping rule '{}'", source.trim()),
            }
        }
    }

    /// Winning declared value of `property` for `element`, if any.
    ///
    /// Order: important inline, important rules, inline, rules, presentation
    /// attribute. Among rules the higher specificity wins, then the later one.
    pub fn specified_value(&self, element: &ElementRef<'_>, property: &str) -> Option<String> {
        self.declared(element).value(element, property)
    }

    /// Inline declarations and matching rules of `element`
    fn declared(&self, element: &ElementRef<'_>) -> Declared<'_> {
        let inline = element
            .value()
            .attr("style")
            .map(parse_declarations)
            .unwrap_or_default();
        let mut nth_index_cache = NthIndexCache::default();
        let rules = self
            .rules
            .iter()
            .enumerate()
            .filter(|(_, rule)| rule.matches(element, &mut nth_index_cache))
            .map(|(order, rule)| (rule.specificity, order, rule.declarations.as_slice()))
            .collect();
        Declared { inline, rules }
    }

    /// Resolve every allowlisted and layout property for `element`.
    pub fn compute(&self, element: &ElementRef<'_>) -> ComputedStyle {
        self.compute_cached(element, &StyleCache::default())
    }

    /// Like [`StyleSheet::compute`], reusing and filling `cache` for the
    /// element and its ancestors.
    pub fn compute_cached(&self, element: &ElementRef<'_>, cache: &StyleCache) -> ComputedStyle {
        let cached = cache.styles.borrow().get(&element.id()).cloned();
        if let Some(style) = cached {
            return style;
        }
        let parent = element
            .parent()
            .and_then(ElementRef::wrap)
            .map(|p| self.compute_cached(&p, cache));
        let style = self.compute_with_parent(element, parent.as_ref());
        cache.styles.borrow_mut().insert(element.id(), style.clone());
        style
    }

    fn compute_with_parent(
        &self,
        element: &ElementRef<'_>,
        parent: Option<&ComputedStyle>,
    ) -> ComputedStyle {
        let declared = self.declared(element);
        let mut style = ComputedStyle::new();
        let inherit = |property: &str| -> Option<String> {
            match parent.and_then(|p| p.get(property)) {
                Some(v) => Some(v.to_string()),
                None => initial_value(property).map(str::to_string),
            }
        };
        let parent_font_px = parent
            .and_then(|p| p.get("font-size"))
            .and_then(|v| font_size_px(v, MEDIUM_FONT_PX))
            .unwrap_or(MEDIUM_FONT_PX);
        let parent_weight = parent
            .and_then(|p| p.get("font-weight"))
            .and_then(|v| font_weight(v, 400))
            .unwrap_or(400);

        // currentColor resolves against color, and em spacings against the
        // element's own font size, so both go first.
        let properties = ["color", "font-size"].into_iter().chain(
            STYLE_PROPERTIES
                .iter()
                .copied()
                .filter(|p| !matches!(*p, "color" | "font-size"))
                .chain(LAYOUT_PROPERTIES.iter().copied()),
        );
        for property in properties {
            let specified = declared.value(element, property);
            let value = match specified.as_deref().map(str::trim) {
                Some(v) if v.eq_ignore_ascii_case("inherit") => inherit(property),
                Some(v) if v.eq_ignore_ascii_case("initial") => {
                    initial_value(property).map(str::to_string)
                }
                Some(v) if v.eq_ignore_ascii_case("currentcolor") => {
                    if property == "color" {
                        inherit("color")
                    } else {
                        style.get("color").map(str::to_string)
                    }
                }
                Some(v) => Some(v.to_string()),
                None if is_inherited(property) => inherit(property),
                None => initial_value(property).map(str::to_string),
            };
            let value = match (property, value) {
                ("font-size", Some(v)) => {
                    Some(px(font_size_px(&v, parent_font_px).unwrap_or(parent_font_px)))
                }
                ("font-weight", Some(v)) => {
                    Some(font_weight(&v, parent_weight).unwrap_or(parent_weight).to_string())
                }
                ("letter-spacing" | "word-spacing", Some(v)) => {
                    let font_px = style
                        .get("font-size")
                        .and_then(|f| font_size_px(f, parent_font_px))
                        .unwrap_or(parent_font_px);
                    Some(spacing(&v, font_px))
                }
                (_, value) => value,
            };
            if let Some(value) = value {
                style.set(property, value);
            }
        }
        style
    }
}

/// Declarations that apply to one element
struct Declared<'s> {
    inline: Vec<Declaration>,
    /// (specificity, source order, declarations) of each matching rule
    rules: Vec<(u32, usize, &'s [Declaration])>,
}

impl Declared<'_> {
    fn value(&self, element: &ElementRef<'_>, property: &str) -> Option<String> {
        let inline = |important: bool| {
            self.inline
                .iter()
                .rev()
                .find(|d| d.property == property && d.important == important)
                .map(|d| d.value.clone())
        };
        let from_rules = |important: bool| {
            self.rules
                .iter()
                .filter_map(|(specificity, order, declarations)| {
                    declarations
                        .iter()
                        .rev()
                        .find(|d| d.property == property && d.important == important)
                        .map(|d| ((*specificity, *order), d.value.as_str()))
                })
                .max_by_key(|(rank, _)| *rank)
                .map(|(_, v)| v.to_string())
        };

        inline(true)
            .or_else(|| from_rules(true))
            .or_else(|| inline(false))
            .or_else(|| from_rules(false))
            .or_else(|| {
                if !is_presentation_attribute(property) {
                    return None;
                }
                let v = element.value().attr(property)?.trim();
                (!v.is_empty()).then(|| v.to_string())
            })
    }
}

/// Parse a declaration block (`a: b; c: d !important`).
pub fn parse_declarations(block: &str) -> Vec<Declaration> {
    let mut input = ParserInput::new(block);
    let mut parser = Parser::new(&mut input);
    parse_declaration_list(&mut parser)
}

fn parse_declaration_list(input: &mut Parser<'_, '_>) -> Vec<Declaration> {
    let mut collector = DeclarationCollector;
    let body: RuleBodyParser<'_, '_, '_, _, Declaration, ()> =
        RuleBodyParser::new(input, &mut collector);
    body.filter_map(|item| item.ok()).collect()
}

/// Builds one [`StyleRule`] per selector of each qualified rule
struct RuleParser;

impl<'i> QualifiedRuleParser<'i> for RuleParser {
    type Prelude = SelectorList<Simple>;
    type QualifiedRule = Vec<StyleRule>;
    type Error = SelectorParseErrorKind<'i>;

    fn parse_prelude<'t>(
        &mut self,
        input: &mut Parser<'i, 't>,
    ) -> Result<Self::Prelude, ParseError<'i, Self::Error>> {
        SelectorList::parse(&SelectorParser, input, ParseRelative::No)
    }

    fn parse_block<'t>(
        &mut self,
        prelude: Self::Prelude,
        _start: &ParserState,
        input: &mut Parser<'i, 't>,
    ) -> Result<Self::QualifiedRule, ParseError<'i, Self::Error>> {
        let declarations = parse_declaration_list(input);
        if declarations.is_empty() {
            return Ok(Vec::new());
        }
        Ok(prelude
            .0
            .into_iter()
            .map(|selector| StyleRule {
                specificity: selector.specificity(),
                selector,
                declarations: declarations.clone(),
            })
            .collect())
    }
}

impl<'i> AtRuleParser<'i> for RuleParser {
    type Prelude = ();
    type AtRule = Vec<StyleRule>;
    type Error = SelectorParseErrorKind<'i>;
}

/// Collects `property: value` declarations of a block, keeping each value
/// as written
struct DeclarationCollector;

impl<'i> DeclarationParser<'i> for DeclarationCollector {
    type Declaration = Declaration;
    type Error = ();

    fn parse_value<'t>(
        &mut self,
        name: cssparser::CowRcStr<'i>,
        input: &mut Parser<'i, 't>,
    ) -> Result<Declaration, ParseError<'i, ()>> {
        let start = input.position();
        let mut important = false;
        let end = loop {
            let here = input.position();
            if input.try_parse(important_at_end).is_ok() {
                important = true;
                break here;
            }
            let opens_block = input.next().map(|token| {
                matches!(
                    token,
                    Token::Function(_)
                        | Token::ParenthesisBlock
                        | Token::SquareBracketBlock
                        | Token::CurlyBracketBlock
                )
            });
            match opens_block {
                Ok(true) => {
                    let _ = input.parse_nested_block(|block| {
                        while block.next().is_ok() {}
                        Ok::<(), ParseError<'i, ()>>(())
                    });
                }
                Ok(false) => {}
                Err(_) => break input.position(),
            }
        };
        let value = input.slice(start..end).trim();
        if value.is_empty() {
            return Err(input.new_custom_error(()));
        }
        Ok(Declaration {
            property: name.to_ascii_lowercase(),
            value: value.to_string(),
            important,
        })
    }
}

fn important_at_end<'i>(input: &mut Parser<'i, '_>) -> Result<(), BasicParseError<'i>> {
    parse_important(input)?;
    input.expect_exhausted()
}

impl<'i> AtRuleParser<'i> for DeclarationCollector {
    type Prelude = ();
    type AtRule = Declaration;
    type Error = ();
}

impl<'i> QualifiedRuleParser<'i> for DeclarationCollector {
    type Prelude = ();
    type QualifiedRule = Declaration;
    type Error = ();
}

impl<'i> RuleBodyItemParser<'i, Declaration, ()> for DeclarationCollector {
    fn parse_declarations(&self) -> bool {
        true
    }

    fn parse_qualified(&self) -> bool {
        false
    }
}

/// `v` as a CSS pixel value, rounded to 1/1000 px
fn px(v: f64) -> String {
    format!("{}px", (v * 1000.0).round() / 1000.0)
}

/// Length in px; `em`/`ex` against `font_px`, `%` against `percent_of`.
fn length_px(value: &str, font_px: f64, percent_of: f64) -> Option<f64> {
    let value = value.trim();
    let px = if let Some(n) = value.strip_suffix("rem") {
        n.trim().parse::<f64>().ok()? * MEDIUM_FONT_PX
    } else {
        let length = Length::from_str(value).ok()?;
        let n = length.number;
        match length.unit {
            LengthUnit::None | LengthUnit::Px => n,
            LengthUnit::Em => n * font_px,
            LengthUnit::Ex => n * font_px / 2.0,
            LengthUnit::In => n * 96.0,
            LengthUnit::Cm => n * (96.0 / 2.54),
            LengthUnit::Mm => n * (96.0 / 25.4),
            LengthUnit::Pt => n * (96.0 / 72.0),
            LengthUnit::Pc => n * (96.0 / 6.0),
            LengthUnit::Percent => n / 100.0 * percent_of,
        }
    };
    px.is_finite().then_some(px)
}

/// Absolute font size of a font-size value; `None` when it is invalid.
fn font_size_px(value: &str, parent_px: f64) -> Option<f64> {
    let keyword = match value.trim().to_ascii_lowercase().as_str() {
        "xx-small" => Some(9.0),
        "x-small" => Some(10.0),
        "small" => Some(13.0),
        "medium" => Some(MEDIUM_FONT_PX),
        "large" => Some(18.0),
        "x-large" => Some(24.0),
        "xx-large" => Some(32.0),
        "xxx-large" => Some(48.0),
        "larger" => Some(parent_px * 1.2),
        "smaller" => Some(parent_px / 1.2),
        _ => None,
    };
    keyword
        .or_else(|| length_px(value, parent_px, parent_px))
        .filter(|v| *v >= 0.0)
}

/// Numeric font weight; `bolder`/`lighter` step from `parent`.
fn font_weight(value: &str, parent: u32) -> Option<u32> {
    match value.trim().to_ascii_lowercase().as_str() {
        "normal" => Some(400),
        "bold" => Some(700),
        "bolder" => Some(match parent {
            0..=349 => 400,
            350..=549 => 700,
            550..=899 => 900,
            w => w,
        }),
        "lighter" => Some(match parent {
            0..=99 => parent,
            100..=549 => 100,
            550..=749 => 400,
            _ => 700,
        }),
        other => other
            .parse::<f64>()
            .ok()
            .filter(|w| (1.0..=1000.0).contains(w))
            .map(|w| w.round() as u32),
    }
}

/// letter-spacing and word-spacing: `normal` as is, lengths in px.
fn spacing(value: &str, font_px: f64) -> String {
    if value.trim().eq_ignore_ascii_case("normal") {
        return "normal".to_string();
    }
    match length_px(value, font_px, font_px) {
        Some(v) => px(v),
        None => value.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn first<'a>(doc: &'a Html, css: &str) -> ElementRef<'a> {
        let sel = Selector::parse(css).unwrap();
        doc.select(&sel).next().expect("element present")
    }

    #[test]
    fn declarations_handle_important_and_parens() {
        let decls = parse_declarations(
            "fill: red; stroke:url(data:image/png;base64,AAA) ; opacity: .5 !IMPORTANT;;bogus",
        );
        assert_eq!(decls.len(), 3);
        assert_eq!(decls[1].value, "url(data:image/png;base64,AAA)");
        assert!(decls[2].important);
        assert_eq!(decls[2].value, ".5");
    }

    #[test]
    fn specificity_comes_from_the_selector_engine() {
        let html = r#"<html><head><style>
            svg rect { fill: blue }
            :where(#a) rect { fill: red }
            rect:not(#zz) { stroke: green }
            .k.k2 { stroke: purple }
            :is(#a, svg) rect { opacity: 0.5 }
            svg > rect.k { opacity: 0.25 }
        </style></head><body><svg id="a"><rect class="k k2"/></svg></body></html>"#;
        let doc = Html::parse_document(html);
        let sheet = StyleSheet::from_document(&doc);
        let rect = first(&doc, "rect");

        assert_eq!(sheet.specified_value(&rect, "fill").as_deref(), Some("blue"));
        assert_eq!(sheet.specified_value(&rect, "stroke").as_deref(), Some("green"));
        assert_eq!(sheet.specified_value(&rect, "opacity").as_deref(), Some("0.5"));
    }

    #[test]
    fn selector_lists_rank_each_selector() {
        let html = r#"<html><head><style>
            #p, path { fill: red }
            .x { fill: blue }
        </style></head><body><svg><path id="p" class="x"/><path class="x"/></svg></body></html>"#;
        let doc = Html::parse_document(html);
        let sheet = StyleSheet::from_document(&doc);
        assert_eq!(sheet.len(), 3);

        let with_id = first(&doc, "#p");
        let without_id = first(&doc, "path:not(#p)");
        assert_eq!(sheet.specified_value(&with_id, "fill").as_deref(), Some("red"));
        assert_eq!(sheet.specified_value(&without_id, "fill").as_deref(), Some("blue"));
    }

    #[test]
    fn important_declaration_beats_a_later_normal_one_in_the_same_rule() {
        let doc = Html::parse_document(
            r#"<html><head><style>rect { fill: red !important; fill: blue }</style></head>
            <body><svg><rect style="stroke: black !important; stroke: white"/></svg></body></html>"#,
        );
        let sheet = StyleSheet::from_document(&doc);
        let rect = first(&doc, "rect");
        assert_eq!(sheet.specified_value(&rect, "fill").as_deref(), Some("red"));
        assert_eq!(sheet.specified_value(&rect, "stroke").as_deref(), Some("black"));
    }

    #[test]
    fn unsupported_rules_are_skipped() {
        let mut sheet = StyleSheet::default();
        sheet.add_css("a::before { fill: red } @font-face { font-family: x } rect { fill: blue } p:hover { }");
        sheet.add_css("<!-- rect { stroke: red } -->");
        assert_eq!(sheet.len(), 2);
    }

    #[test]
    fn cascade_orders_sources() {
        let html = r#"<html><head><style>
            /* sheet */
            .x { fill: blue }
            path { fill: green; stroke: black }
            #p { stroke: purple !important }
            @media print { path { fill: orange } }
        </style></head><body>
        <svg><path id="p" class="x" fill="yellow" style="stroke: red; opacity: 0.5" d="M0 0"/></svg>
        </body></html>"#;
        let doc = Html::parse_document(html);
        let sheet = StyleSheet::from_document(&doc);
        let p = first(&doc, "path");

        assert_eq!(sheet.specified_value(&p, "fill").as_deref(), Some("blue"));
        assert_eq!(sheet.specified_value(&p, "stroke").as_deref(), Some("purple"));
        assert_eq!(sheet.specified_value(&p, "opacity").as_deref(), Some("0.5"));
        assert_eq!(sheet.specified_value(&p, "mask"), None);
    }

    #[test]
    fn presentation_attribute_is_lowest() {
        let doc = Html::parse_document(r#"<svg><rect fill="yellow" width="5"/></svg>"#);
        let sheet = StyleSheet::from_document(&doc);
        let r = first(&doc, "rect");
        assert_eq!(sheet.specified_value(&r, "fill").as_deref(), Some("yellow"));
        assert_eq!(sheet.specified_value(&r, "width"), None);
    }

    #[test]
    fn computes_inheritance_and_current_color() {
        let html = r#"<html><head><style>svg { color: rgb(1, 2, 3) } g { stroke: currentColor }</style></head>
        <body><svg fill="red"><g><circle r="1" opacity="inherit"/></g></svg></body></html>"#;
        let doc = Html::parse_document(html);
        let sheet = StyleSheet::from_document(&doc);
        let style = sheet.compute(&first(&doc, "circle"));

        assert_eq!(style.get("fill"), Some("red"));
        assert_eq!(style.get("stroke"), Some("rgb(1, 2, 3)"));
        assert_eq!(style.get("opacity"), Some("1"));
        assert_eq!(style.get("stroke-width"), Some("1px"));
        assert_eq!(style.get("font-family"), None);
        assert_eq!(style.get("display"), Some("inline"));
    }

    #[test]
    fn non_inherited_properties_reset() {
        let doc = Html::parse_document(r#"<svg style="opacity:0.2; filter: blur(2px)"><rect/></svg>"#);
        let sheet = StyleSheet::from_document(&doc);
        let style = sheet.compute(&first(&doc, "rect"));
        assert_eq!(style.get("opacity"), Some("1"));
        assert_eq!(style.get("filter"), Some("none"));
    }

    #[test]
    fn relative_font_sizes_resolve_before_inheriting() {
        let html = r#"<html><head><style>g { font-size: 150% } .big { font-size: larger }</style></head>
        <body><svg style="font-size:2em"><g><text letter-spacing="0.5em">a</text><text class="big" font-size="3">b</text></g></svg></body></html>"#;
        let doc = Html::parse_document(html);
        let sheet = StyleSheet::from_document(&doc);
        let cache = StyleCache::default();

        let svg = sheet.compute_cached(&first(&doc, "svg"), &cache);
        assert_eq!(svg.get("font-size"), Some("32px"));
        let g = sheet.compute_cached(&first(&doc, "g"), &cache);
        assert_eq!(g.get("font-size"), Some("48px"));

        let text = sheet.compute_cached(&first(&doc, "text"), &cache);
        assert_eq!(text.get("font-size"), Some("48px"));
        assert_eq!(text.get("letter-spacing"), Some("24px"));
        assert_eq!(text.get("word-spacing"), Some("0px"));

        // The class rule outranks the presentation attribute.
        let big = sheet.compute_cached(&first(&doc, ".big"), &cache);
        assert_eq!(big.get("font-size"), Some("57.6px"));
        assert!(cache.len() >= 4);
    }

    #[test]
    fn font_weights_are_numeric() {
        let html = r#"<svg font-weight="bold"><g font-weight="bolder"><text font-weight="lighter">a</text></g><text>b</text></svg>"#;
        let doc = Html::parse_document(html);
        let sheet = StyleSheet::from_document(&doc);

        assert_eq!(sheet.compute(&first(&doc, "g")).get("font-weight"), Some("900"));
        assert_eq!(sheet.compute(&first(&doc, "g text")).get("font-weight"), Some("700"));
        assert_eq!(sheet.compute(&first(&doc, "svg > text")).get("font-weight"), Some("700"));
        assert_eq!(font_weight("550", 400), Some(550));
        assert_eq!(font_weight("heavy", 400), None);
    }

    #[test]
    fn font_size_keywords_and_units() {
        assert_eq!(font_size_px("small", 20.0), Some(13.0));
        assert_eq!(font_size_px("0.25in", 20.0), Some(24.0));
        assert_eq!(font_size_px("2rem", 20.0), Some(32.0));
        assert_eq!(font_size_px("0.5em", 20.0), Some(10.0));
        assert_eq!(font_size_px("-2px", 20.0), None);
        assert_eq!(font_size_px("calc(1em + 2px)", 20.0), None);
        assert_eq!(spacing("normal", 16.0), "normal");
        assert_eq!(spacing("0.1em", 20.0), "2px");
    }
}
