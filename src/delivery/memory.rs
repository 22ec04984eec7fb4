//! In-memory delivery, for embedders and tests

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};

use crate::delivery::{DeliveryMechanism, DownloadId, DownloadRequest};
use crate::{Error, Result};

/// A download kept in memory
#[derive(Debug, Clone, PartialEq)]
pub struct DeliveredFile {
    pub id: DownloadId,
    pub filename: String,
    pub prompted: bool,
    pub png: Vec<u8>,
}

/// Records every delivered file; clones share the same record.
#[derive(Debug, Clone, Default)]
pub struct MemoryDelivery {
    files: Arc<Mutex<Vec<DeliveredFile>>>,
    next_id: Arc<AtomicU64>,
}

impl MemoryDelivery {
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of the files delivered so far, in delivery order
    pub fn downloads(&self) -> Vec<DeliveredFile> {
        match self.files.lock() {
            Ok(files) => files.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        }
    }
}

impl DeliveryMechanism for MemoryDelivery {
    fn deliver(&self, request: &DownloadRequest, png: &[u8]) -> Result<DownloadId> {
        let id = DownloadId(self.next_id.fetch_add(1, Ordering::SeqCst) + 1);
        let mut files = self
            .files
            .lock()
            .map_err(|_| Error::DeliveryError("download record poisoned".to_string()))?;
        files.push(DeliveredFile {
            id,
            filename: request.filename.clone(),
            prompted: request.prompt_user_for_path,
            png: png.to_vec(),
        });
        Ok(id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ids_increase_and_clones_share_state() {
        let mem = MemoryDelivery::new();
        let other = mem.clone();
        let req = DownloadRequest::new("unused", "x.png", true);
        assert_eq!(mem.deliver(&req, b"1").unwrap(), DownloadId(1));
        assert_eq!(other.deliver(&req, b"2").unwrap(), DownloadId(2));

        let files = mem.downloads();
        assert_eq!(files.len(), 2);
        assert_eq!(files[1].png, b"2");
        assert!(files[0].prompted);
    }
}
