//! Export flows for scanned assets: one at a time or the whole list
//!
//! List exports are named `svg-NNN[-slug].png`. A single export asks the
//! user for a path; a batch saves silently, strictly one asset after the
//! other with a short pause in between.

use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use log::{info, warn};

use crate::delivery::{DownloadId, DownloadRequest};
use crate::filename::filename_for_asset;
use crate::raster::Rasterizer;
use crate::{Downloader, ExportRequest, Result, ScannedAsset, StyleMode};

/// Pause between two batch items
pub const BATCH_PAUSE: Duration = Duration::from_millis(30);

/// A file produced by an export
#[derive(Debug, Clone, PartialEq)]
pub struct ExportedFile {
    pub id: DownloadId,
    pub filename: String,
    pub width: u32,
    pub height: u32,
}

/// What a batch export got through
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BatchReport {
    pub exported: Vec<ExportedFile>,
    /// The abort flag stopped the batch before every asset was exported
    pub aborted: bool,
}

/// Rasterize and deliver one asset under its list filename.
pub async fn export_asset(
    asset: &ScannedAsset,
    request: &ExportRequest,
    mode: StyleMode,
    rasterizer: &Rasterizer,
    downloader: &Downloader,
    prompt_user_for_path: bool,
) -> Result<ExportedFile> {
    let png = rasterizer.rasterize_asset(&asset.asset, mode, request)?;
    let filename = filename_for_asset(asset);
    let id = downloader
        .download(DownloadRequest::new(
            png.to_data_url(),
            filename.clone(),
            prompt_user_for_path,
        ))
        .await
        .into_result()?;
    Ok(ExportedFile {
        id,
        filename,
        width: png.width,
        height: png.height,
    })
}

/// Export every asset in order without prompting.
///
/// `abort` is checked before each asset starts; an asset already underway
/// always finishes. The first failure stops the batch and is returned.
pub async fn export_all(
    assets: &[ScannedAsset],
    request: &ExportRequest,
    mode: StyleMode,
    rasterizer: &Rasterizer,
    downloader: &Downloader,
    abort: &AtomicBool,
) -> Result<BatchReport> {
    let mut report = BatchReport::default();
    let total = assets.len();

    for (i, asset) in assets.iter().enumerate() {
        if abort.load(Ordering::SeqCst) {
            warn!("batch export aborted after {}/{}", i, total);
            report.aborted = true;
            return Ok(report);
        }
        info!("exporting {}/{}: {}", i + 1, total, asset.id);
        let file = export_asset(asset, request, mode, rasterizer, downloader, false).await?;
        report.exported.push(file);
        tokio::time::sleep(BATCH_PAUSE).await;
    }

    info!("batch export finished: {} PNG files", report.exported.len());
    Ok(report)
}
