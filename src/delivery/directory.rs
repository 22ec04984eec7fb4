//! Delivery into a directory on disk

use std::fs::OpenOptions;
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};

use log::{info, warn};

use crate::delivery::{DeliveryMechanism, DownloadId, DownloadRequest};
use crate::{Error, Result};

/// Upper bound on `name (n).png` probing before giving up
const MAX_DUPLICATES: u32 = 10_000;

/// Writes each download into one output directory
///
/// Existing files are never overwritten; a clashing name becomes
/// `name (1).png`, `name (2).png` and so on.
#[derive(Debug)]
pub struct DirectoryDelivery {
    dir: PathBuf,
    next_id: AtomicU64,
}

impl DirectoryDelivery {
    /// Deliver into `dir`, creating it when missing.
    pub fn new(dir: impl Into<PathBuf>) -> Result<Self> {
        let dir = dir.into();
        std::fs::create_dir_all(&dir)?;
        Ok(Self {
            dir,
            next_id: AtomicU64::new(1),
        })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn write_unique(&self, filename: &str, png: &[u8]) -> Result<PathBuf> {
        let (stem, ext) = match filename.rsplit_once('.') {
            Some((stem, ext)) if !stem.is_empty() => (stem, Some(ext)),
            _ => (filename, None),
        };
        for n in 0..=MAX_DUPLICATES {
            let name = match (n, ext) {
                (0, _) => filename.to_string(),
                (n, Some(ext)) => format!("{} ({}).{}", stem, n, ext),
                (n, None) => format!("{} ({})", stem, n),
            };
            let path = self.dir.join(&name);
            match OpenOptions::new().write(true).create_new(true).open(&path) {
                Ok(mut file) => {
                    file.write_all(png)?;
                    return Ok(path);
                }
                Err(e) if e.kind() == ErrorKind::AlreadyExists => continue,
                Err(e) => return Err(e.into()),
            }
        }
        Err(Error::DeliveryError(format!(
            "too many files named like '{}'",
            filename
        )))
    }
}

impl DeliveryMechanism for DirectoryDelivery {
    fn deliver(&self, request: &DownloadRequest, png: &[u8]) -> Result<DownloadId> {
        let name = request.filename.trim();
        if name.contains(['/', '\\']) || name == "." || name == ".." {
            return Err(Error::DeliveryError(format!(
                "filename '{}' must not contain a path",
                request.filename
            )));
        }
        if request.prompt_user_for_path {
            warn!(
                "no interactive save prompt available, saving '{}' into {}",
                name,
                self.dir.display()
            );
        }
        let path = self.write_unique(name, png)?;
        let id = DownloadId(self.next_id.fetch_add(1, Ordering::SeqCst));
        info!("download {} saved to {}", id, path.display());
        Ok(id)
    }
}
