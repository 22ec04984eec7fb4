//! Delivery: handing an exported PNG to whatever saves it
//!
//! A [`DeliveryMechanism`] receives a validated [`DownloadRequest`] and
//! returns an opaque id. Two mechanisms ship with the crate: one writing into
//! a directory and one keeping downloads in memory.

pub mod directory;
pub mod memory;

pub use directory::DirectoryDelivery;
pub use memory::{DeliveredFile, MemoryDelivery};

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::raster::data_url::decode_png_data_url;
use crate::{Error, Result};

/// One file to deliver
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DownloadRequest {
    /// `data:image/png;base64,...` reference to the image
    pub reference: String,
    pub filename: String,
    /// Ask the user where to save instead of saving silently
    pub prompt_user_for_path: bool,
}

impl DownloadRequest {
    pub fn new(reference: impl Into<String>, filename: impl Into<String>, prompt: bool) -> Self {
        Self {
            reference: reference.into(),
            filename: filename.into(),
            prompt_user_for_path: prompt,
        }
    }

    /// Check the request and return the decoded PNG bytes.
    ///
    /// The reference must be a PNG `data:` URL whose payload carries the PNG
    /// signature, and the filename must not be blank.
    pub fn validate(&self) -> Result<Vec<u8>> {
        if self.filename.trim().is_empty() {
            return Err(Error::InvalidReference("empty filename".to_string()));
        }
        decode_png_data_url(&self.reference)
    }
}

/// Opaque id a mechanism assigns to a completed download
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct DownloadId(pub u64);

impl fmt::Display for DownloadId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Result of one delivery, reported back to the requester
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "lowercase")]
pub enum DownloadOutcome {
    Ok { id: DownloadId },
    Failed { error: String },
}

impl DownloadOutcome {
    pub fn is_ok(&self) -> bool {
        matches!(self, DownloadOutcome::Ok { .. })
    }

    pub fn into_result(self) -> Result<DownloadId> {
        match self {
            DownloadOutcome::Ok { id } => Ok(id),
            DownloadOutcome::Failed { error } => Err(Error::DeliveryError(error)),
        }
    }
}

impl From<Result<DownloadId>> for DownloadOutcome {
    fn from(res: Result<DownloadId>) -> Self {
        match res {
            Ok(id) => DownloadOutcome::Ok { id },
            Err(e) => DownloadOutcome::Failed {
                error: e.to_string(),
            },
        }
    }
}

/// Something that can save a delivered PNG
///
/// `png` is the already validated payload of `request.reference`.
pub trait DeliveryMechanism: Send {
    fn deliver(&self, request: &DownloadRequest, png: &[u8]) -> Result<DownloadId>;
}

impl<D: DeliveryMechanism + ?Sized> DeliveryMechanism for Box<D> {
    fn deliver(&self, request: &DownloadRequest, png: &[u8]) -> Result<DownloadId> {
        (**self).deliver(request, png)
    }
}

/// Validate and deliver; any failure becomes [`DownloadOutcome::Failed`].
pub fn download(mechanism: &dyn DeliveryMechanism, request: &DownloadRequest) -> DownloadOutcome {
    let res = request
        .validate()
        .and_then(|png| mechanism.deliver(request, &png));
    DownloadOutcome::from(res)
}
