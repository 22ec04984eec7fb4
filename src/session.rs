//! Per-page interaction state: the context-menu snapshot and export dialog
//!
//! A [`PageSession`] lives as long as its [`Page`]. A context-menu event on
//! any element records the snapshot of the nearest graphic; the export dialog
//! is then opened on that snapshot and submits a single PNG to the
//! [`Downloader`], asking the user where to save it.

use log::{debug, info, warn};

use crate::delivery::{DownloadId, DownloadOutcome, DownloadRequest};
use crate::filename::filename_for_title;
use crate::page::{Page, PageElement};
use crate::raster::Rasterizer;
use crate::snapshot::build_snapshot;
use crate::{Background, Downloader, ExportRequest, NormalizedAsset, StyleMode};

/// Interaction state of one page
pub struct PageSession<'p> {
    page: &'p Page,
    last_snapshot: Option<NormalizedAsset>,
}

impl<'p> PageSession<'p> {
    pub fn new(page: &'p Page) -> Self {
        Self {
            page,
            last_snapshot: None,
        }
    }

    pub fn page(&self) -> &'p Page {
        self.page
    }

    /// Record the snapshot of the graphic under `target`.
    ///
    /// When `target` is neither a graphic nor inside one, the previous
    /// snapshot is kept and `None` is returned.
    pub fn on_context_menu(&mut self, target: &PageElement<'_>) -> Option<&NormalizedAsset> {
        let graphic = target.nearest_graphic()?;
        let snapshot = build_snapshot(&graphic);
        debug!(
            "context snapshot '{}' {}x{}",
            snapshot.title, snapshot.width, snapshot.height
        );
        self.last_snapshot = Some(snapshot);
        self.last_snapshot.as_ref()
    }

    /// The snapshot recorded by the last context-menu event, if any
    pub fn last_snapshot(&self) -> Option<NormalizedAsset> {
        self.last_snapshot.clone()
    }

    /// Open the export dialog on the last snapshot; `None` without one.
    pub fn open_export_dialog(&self) -> Option<ExportDialog> {
        self.last_snapshot.clone().map(ExportDialog::new)
    }
}

/// What the dialog shows after an export attempt
#[derive(Debug, Clone, PartialEq)]
pub enum DialogStatus {
    /// The download was handed over; the dialog closes
    Started { id: DownloadId, filename: String },
    /// Rasterization or delivery failed; the dialog stays open
    Failed(String),
}

/// Form state of the single-graphic export dialog
///
/// Inputs are kept as the user typed them and normalized on submit.
#[derive(Debug, Clone)]
pub struct ExportDialog {
    snapshot: NormalizedAsset,
    /// Scale factor as typed; unparseable input means 2
    pub scale_input: String,
    /// `transparent` or `white`
    pub background: String,
    /// `computed` (styled) or `raw`
    pub style_mode: String,
    open: bool,
}

impl ExportDialog {
    pub fn new(snapshot: NormalizedAsset) -> Self {
        Self {
            snapshot,
            scale_input: ExportRequest::DEFAULT_SCALE.to_string(),
            background: Background::default().to_string(),
            style_mode: "computed".to_string(),
            open: true,
        }
    }

    pub fn snapshot(&self) -> &NormalizedAsset {
        &self.snapshot
    }

    pub fn is_open(&self) -> bool {
        self.open
    }

    pub fn close(&mut self) {
        self.open = false;
    }

    /// The clamped request the current inputs stand for
    pub fn request(&self) -> ExportRequest {
        ExportRequest::from_user_input(&self.scale_input, &self.background)
    }

    pub fn mode(&self) -> StyleMode {
        self.style_mode.parse().unwrap_or_default()
    }

    /// `<title slug>.png`, or `svg.png`
    pub fn filename(&self) -> String {
        filename_for_title(&self.snapshot.title)
    }

    /// Rasterize the chosen form and hand it to the downloader.
    pub async fn submit(&mut self, rasterizer: &Rasterizer, downloader: &Downloader) -> DialogStatus {
        let request = self.request();
        let png = match rasterizer.rasterize_asset(&self.snapshot, self.mode(), &request) {
            Ok(png) => png,
            Err(e) => {
                warn!("export failed: {}", e);
                return DialogStatus::Failed(e.to_string());
            }
        };

        let filename = self.filename();
        let outcome = downloader
            .download(DownloadRequest::new(png.to_data_url(), filename.clone(), true))
            .await;
        match outcome {
            DownloadOutcome::Ok { id } => {
                info!("exported {} ({}x{})", filename, png.width, png.height);
                self.close();
                DialogStatus::Started { id, filename }
            }
            DownloadOutcome::Failed { error } => DialogStatus::Failed(error),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::delivery::MemoryDelivery;
    use crate::Viewport;

    const PAGE: &str = r#"<body>
        <p id="text">no graphic here</p>
        <svg aria-label="Brand: Logo" width="10" height="5"><g><circle id="dot" r="2" fill="red"/></g></svg>
        <svg viewBox="0 0 24 24"></svg>
    </body>"#;

    #[test]
    fn context_menu_records_nearest_graphic() {
        let page = Page::parse(PAGE, Viewport::default());
        let mut session = PageSession::new(&page);
        assert!(session.last_snapshot().is_none());
        assert!(session.open_export_dialog().is_none());

        let dot = page.element_by_id("dot").unwrap();
        let snap = session.on_context_menu(&dot).unwrap();
        assert_eq!(snap.title, "Brand: Logo");
        assert_eq!((snap.width, snap.height), (10.0, 5.0));

        let text = page.element_by_id("text").unwrap();
        assert!(session.on_context_menu(&text).is_none());
        assert_eq!(session.last_snapshot().unwrap().title, "Brand: Logo");
    }

    #[test]
    fn dialog_defaults_and_inputs() {
        let page = Page::parse(PAGE, Viewport::default());
        let mut session = PageSession::new(&page);
        let second = page.graphics().remove(1);
        session.on_context_menu(&second);

        let mut dialog = session.open_export_dialog().unwrap();
        assert_eq!(dialog.request(), ExportRequest::new(2, Background::Transparent));
        assert_eq!(dialog.mode(), StyleMode::Styled);
        assert_eq!(dialog.filename(), "svg.png");

        dialog.scale_input = "11".to_string();
        dialog.background = "white".to_string();
        dialog.style_mode = "raw".to_string();
        assert_eq!(dialog.request(), ExportRequest::new(8, Background::White));
        assert_eq!(dialog.mode(), StyleMode::Raw);
    }

    #[tokio::test]
    async fn submit_downloads_with_prompt() {
        let page = Page::parse(PAGE, Viewport::default());
        let mut session = PageSession::new(&page);
        let dot = page.element_by_id("dot").unwrap();
        session.on_context_menu(&dot);

        let mem = MemoryDelivery::new();
        let downloader = Downloader::spawn(mem.clone());
        let rasterizer = Rasterizer::new(false);

        let mut dialog = session.open_export_dialog().unwrap();
        dialog.scale_input = "3".to_string();
        let status = dialog.submit(&rasterizer, &downloader).await;
        assert_eq!(
            status,
            DialogStatus::Started {
                id: DownloadId(1),
                filename: "Brand--Logo.png".to_string()
            }
        );
        assert!(!dialog.is_open());

        let files = mem.downloads();
        assert!(files[0].prompted);
        let png = tiny_skia::Pixmap::decode_png(&files[0].png).unwrap();
        assert_eq!((png.width(), png.height()), (30, 15));
    }
}
