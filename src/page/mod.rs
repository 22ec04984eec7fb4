//! The host document: a parsed page with its cascade and layout
//!
//! A [`Page`] stands in for a live browser tab. It is parsed once, its
//! stylesheets are collected and every `<svg>` is laid out, after which
//! graphics are handed out as [`PageElement`]s implementing
//! [`GraphicElement`].

pub mod cascade;
pub mod layout;

use std::collections::HashMap;
use std::path::Path;

use ego_tree::NodeId;
use log::{debug, info, warn};
use scraper::{ElementRef, Html, Selector};
use url::Url;

use crate::element::{ComputedStyle, GraphicElement, Rect};
use crate::enumerate::{collect_assets, ScanOptions};
use crate::snapshot::tree::{SvgChild, SvgNode, XLINK_NS};
use crate::{Error, PageConfig, Result, ScannedAsset, Viewport};
use cascade::{StyleCache, StyleSheet};
use layout::{layout_document, Layout};

/// A parsed page with resolved styles and laid-out graphics
#[derive(Debug)]
pub struct Page {
    html: Html,
    sheet: StyleSheet,
    styles: StyleCache,
    layout: Layout,
    /// Every `<svg>` in document order
    graphic_ids: Vec<NodeId>,
    graphic_index: HashMap<NodeId, usize>,
    viewport: Viewport,
    url: Option<Url>,
}

impl Page {
    /// Parse a page from markup. Linked stylesheets are not loaded.
    pub fn parse(html: &str, viewport: Viewport) -> Self {
        let document = Html::parse_document(html);
        let sheet = StyleSheet::from_document(&document);
        Self::assemble(document, sheet, viewport, None)
    }

    /// Load a page from a local path, a `file://` URL or (with the `fetch`
    /// feature) an `http(s)` URL.
    ///
    /// Linked stylesheets are resolved against the page location and loaded
    /// the same way; one that fails to load is skipped with a warning.
    pub fn load(source: &str, config: &PageConfig) -> Result<Self> {
        let url = source_url(source)?;
        let loader = Loader::new(config)?;
        let body = loader.fetch(&url)?;
        info!("loaded {} ({} bytes)", url, body.len());

        let document = Html::parse_document(&body);
        let sheet = StyleSheet::from_document_with(&document, |href| {
            let css_url = match url.join(href) {
                Ok(u) => u,
                Err(e) => {
                    warn!("skipping stylesheet '{}': {}", href, e);
                    return None;
                }
            };
            match loader.fetch(&css_url) {
                Ok(text) => Some(text),
                Err(e) => {
                    warn!("skipping stylesheet {}: {}", css_url, e);
                    None
                }
            }
        });
        Ok(Self::assemble(document, sheet, config.viewport, Some(url)))
    }

    fn assemble(html: Html, sheet: StyleSheet, viewport: Viewport, url: Option<Url>) -> Self {
        let styles = StyleCache::default();
        let layout = layout_document(&html, &sheet, &styles, viewport);
        let graphic_ids: Vec<NodeId> = match Selector::parse("svg") {
            Ok(sel) => html.select(&sel).map(|el| el.id()).collect(),
            Err(_) => Vec::new(),
        };
        let graphic_index = graphic_ids
            .iter()
            .enumerate()
            .map(|(i, id)| (*id, i))
            .collect();
        debug!(
            "page laid out: {} graphics, {} style rules, {} styles resolved",
            layout.len(),
            sheet.len(),
            styles.len()
        );
        Self {
            html,
            sheet,
            styles,
            layout,
            graphic_ids,
            graphic_index,
            viewport,
            url,
        }
    }

    pub fn viewport(&self) -> Viewport {
        self.viewport
    }

    /// Where the page was loaded from, if it was loaded
    pub fn url(&self) -> Option<&Url> {
        self.url.as_ref()
    }

    /// Every `<svg>` of the page in document order, nested ones included
    pub fn graphics(&self) -> Vec<PageElement<'_>> {
        self.graphic_ids
            .iter()
            .enumerate()
            .filter_map(|(i, id)| {
                let el = self.html.tree.get(*id).and_then(ElementRef::wrap)?;
                Some(PageElement {
                    page: self,
                    el,
                    graphic_index: Some(i),
                })
            })
            .collect()
    }

    /// Elements matching a CSS selector, in document order
    pub fn select(&self, selector: &str) -> Result<Vec<PageElement<'_>>> {
        let sel = Selector::parse(selector)
            .map_err(|e| Error::ParseError(format!("bad selector '{}': {:?}", selector, e)))?;
        Ok(self
            .html
            .select(&sel)
            .map(|el| self.wrap(el))
            .collect())
    }

    pub fn element_by_id(&self, id: &str) -> Option<PageElement<'_>> {
        self.html
            .root_element()
            .descendants()
            .filter_map(ElementRef::wrap)
            .find(|el| el.value().id() == Some(id))
            .map(|el| self.wrap(el))
    }

    /// Enumerate and snapshot the graphics of the page.
    pub fn scan(&self, options: &ScanOptions) -> Vec<ScannedAsset> {
        collect_assets(&self.graphics(), self.viewport, options)
    }

    fn wrap<'a>(&'a self, el: ElementRef<'a>) -> PageElement<'a> {
        let graphic_index = self.graphic_index.get(&el.id()).copied();
        PageElement {
            page: self,
            el,
            graphic_index,
        }
    }
}

/// An element of a [`Page`]
#[derive(Clone, Copy)]
pub struct PageElement<'a> {
    page: &'a Page,
    el: ElementRef<'a>,
    graphic_index: Option<usize>,
}

impl<'a> PageElement<'a> {
    /// Tag name as parsed (`svg`, `clipPath`, `div`)
    pub fn name(&self) -> &str {
        self.el.value().name()
    }

    pub fn is_graphic(&self) -> bool {
        self.name() == "svg"
    }

    /// The graphic to export for this element: itself when it is an `<svg>`,
    /// else its nearest `<svg>` ancestor.
    pub fn nearest_graphic(&self) -> Option<PageElement<'a>> {
        if self.is_graphic() {
            return Some(*self);
        }
        self.el
            .ancestors()
            .filter_map(ElementRef::wrap)
            .find(|a| a.value().name() == "svg")
            .map(|el| self.page.wrap(el))
    }
}

impl std::fmt::Debug for PageElement<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PageElement")
            .field("name", &self.name())
            .field("id", &self.el.value().id())
            .field("graphic_index", &self.graphic_index)
            .finish()
    }
}

impl GraphicElement for PageElement<'_> {
    fn bounding_client_rect(&self) -> Rect {
        match self.graphic_index {
            Some(i) => self.page.layout.rect(i),
            None => Rect::default(),
        }
    }

    fn attribute(&self, name: &str) -> Option<String> {
        self.el.value().attr(name).map(str::to_string)
    }

    fn computed_style(&self) -> ComputedStyle {
        self.page.sheet.compute_cached(&self.el, &self.page.styles)
    }

    fn clone_subtree(&self) -> SvgNode {
        clone_element(self.el)
    }

    fn element_subtree(&self) -> Vec<Self> {
        self.el
            .descendants()
            .filter_map(ElementRef::wrap)
            .map(|el| self.page.wrap(el))
            .collect()
    }
}

fn clone_element(el: ElementRef<'_>) -> SvgNode {
    let mut node = SvgNode::new(el.value().name());
    for (name, value) in el.value().attrs() {
        // Namespace declarations are re-emitted by the serializer.
        if name == "xmlns" || (name == "xlink" && value == XLINK_NS) {
            continue;
        }
        node.attributes.push((name.to_string(), value.to_string()));
    }
    for child in el.children() {
        if let Some(child_el) = ElementRef::wrap(child) {
            node.children.push(SvgChild::Element(clone_element(child_el)));
        } else if let Some(text) = child.value().as_text() {
            node.children.push(SvgChild::Text(text.to_string()));
        }
    }
    node
}

/// Interpret a load source as a URL; anything that is not an absolute
/// `file`/`http`/`https` URL is a filesystem path.
fn source_url(source: &str) -> Result<Url> {
    if let Ok(url) = Url::parse(source) {
        if matches!(url.scheme(), "file" | "http" | "https") {
            return Ok(url);
        }
    }
    let path = Path::new(source);
    let absolute = std::fs::canonicalize(path)
        .map_err(|e| Error::LoadError(format!("{}: {}", path.display(), e)))?;
    Url::from_file_path(&absolute)
        .map_err(|_| Error::LoadError(format!("not a loadable path: {}", absolute.display())))
}

/// Reads page and stylesheet text from files or over HTTP
struct Loader {
    #[cfg(feature = "fetch")]
    client: reqwest::blocking::Client,
    #[cfg(feature = "fetch")]
    config: PageConfig,
}

impl Loader {
    #[cfg(feature = "fetch")]
    fn new(config: &PageConfig) -> Result<Self> {
        let client = reqwest::blocking::Client::builder()
            .timeout(std::time::Duration::from_millis(config.timeout_ms))
            .build()
            .map_err(|e| Error::LoadError(format!("Failed to build HTTP client: {}", e)))?;
        Ok(Self {
            client,
            config: config.clone(),
        })
    }

    #[cfg(not(feature = "fetch"))]
    fn new(_config: &PageConfig) -> Result<Self> {
        Ok(Self {})
    }

    fn fetch(&self, url: &Url) -> Result<String> {
        match url.scheme() {
            "file" => {
                let path = url
                    .to_file_path()
                    .map_err(|_| Error::LoadError(format!("bad file URL: {}", url)))?;
                std::fs::read_to_string(&path)
                    .map_err(|e| Error::LoadError(format!("{}: {}", path.display(), e)))
            }
            "http" | "https" => self.fetch_remote(url),
            other => Err(Error::LoadError(format!("unsupported scheme '{}'", other))),
        }
    }

    #[cfg(feature = "fetch")]
    fn fetch_remote(&self, url: &Url) -> Result<String> {
        let mut request = self
            .client
            .get(url.as_str())
            .header("User-Agent", self.config.user_agent.clone());
        for (name, value) in &self.config.headers {
            request = request.header(name.as_str(), value.as_str());
        }
        let resp = request
            .send()
            .map_err(|e| Error::LoadError(format!("Failed to fetch {}: {}", url, e)))?;
        let status = resp.status();
        if !status.is_success() {
            return Err(Error::LoadError(format!("{} returned {}", url, status)));
        }
        resp.text()
            .map_err(|e| Error::LoadError(format!("Failed to read response body: {}", e)))
    }

    #[cfg(not(feature = "fetch"))]
    fn fetch_remote(&self, url: &Url) -> Result<String> {
        Err(Error::LoadError(format!(
            "{}: built without the `fetch` feature",
            url
        )))
    }
}
