use crate::delivery::{self, DeliveryMechanism, DownloadOutcome, DownloadRequest};
use crate::{Error, Result};
use log::debug;
use std::sync::mpsc::{self, Sender};
use std::thread;
use tokio::sync::oneshot;

enum Command {
    Download(DownloadRequest, oneshot::Sender<DownloadOutcome>),
    Close(oneshot::Sender<()>),
}

/// An async-friendly delivery context backed by a dedicated worker thread.
///
/// The worker owns the [`DeliveryMechanism`] and serves one request at a
/// time, so a mechanism never sees concurrent downloads. Every request is
/// validated on the worker before the mechanism is called.
#[derive(Clone)]
pub struct Downloader {
    cmd_tx: Sender<Command>,
}

impl Downloader {
    /// Spawn the worker thread that owns `mechanism`.
    pub fn spawn<D>(mechanism: D) -> Self
    where
        D: DeliveryMechanism + 'static,
    {
        let (cmd_tx, cmd_rx) = mpsc::channel::<Command>();

        thread::spawn(move || {
            while let Ok(cmd) = cmd_rx.recv() {
                match cmd {
                    Command::Download(request, resp) => {
                        let outcome = delivery::download(&mechanism, &request);
                        debug!("download of '{}': {:?}", request.filename, outcome);
                        let _ = resp.send(outcome);
                    }
                    Command::Close(resp) => {
                        let _ = resp.send(());
                        break;
                    }
                }
            }
        });

        Self { cmd_tx }
    }

    /// Deliver one file; failures come back as [`DownloadOutcome::Failed`].
    pub async fn download(&self, request: DownloadRequest) -> DownloadOutcome {
        let (tx, rx) = oneshot::channel();
        if self.cmd_tx.send(Command::Download(request, tx)).is_err() {
            return DownloadOutcome::Failed {
                error: "downloader is closed".to_string(),
            };
        }
        rx.await.unwrap_or_else(|e| DownloadOutcome::Failed {
            error: format!("Download canceled: {}", e),
        })
    }

    /// Shut the worker down. Requests sent afterwards fail.
    pub async fn close(self) -> Result<()> {
        let (tx, rx) = oneshot::channel();
        self.cmd_tx
            .send(Command::Close(tx))
            .map_err(|_| Error::Other("downloader already closed".to_string()))?;
        rx.await
            .map_err(|e| Error::Other(format!("Close canceled: {}", e)))
    }
}
