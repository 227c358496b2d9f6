//! Channel-based layer loading.
//!
//! Fetching is async but egui's update() is synchronous. The pipeline runs in
//! the background (spawn_local on WASM, a worker thread on native) and hands
//! its result back through a channel that the UI polls each frame.

use super::error::LayerError;
use super::fetch::ResourceFetcher;
use super::loader::{fetch_layers, LoadedLayer};
use super::manifest::load_manifest;
use eframe::egui;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::{channel, Receiver, Sender};
use std::sync::Arc;

/// Where the layer set lives.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LayerSource {
    /// Directory or URL prefix holding the manifest and the layer files
    pub base_path: String,
    /// Manifest file name relative to `base_path`
    pub manifest_file: String,
}

/// Outcome of one load request.
#[derive(Debug)]
pub struct LayerLoadResult {
    pub request_id: u64,
    pub outcome: Result<Vec<LoadedLayer>, LayerError>,
}

/// An outstanding request and the flag its task checks before delivering.
struct PendingLoad {
    request_id: u64,
    alive: Arc<AtomicBool>,
}

/// Channel-based loader for the manifest and its layers.
pub struct LayerLoadChannel {
    sender: Sender<LayerLoadResult>,
    receiver: Receiver<LayerLoadResult>,
    next_request_id: u64,
    pending: Option<PendingLoad>,
}

impl Default for LayerLoadChannel {
    fn default() -> Self {
        Self::new()
    }
}

impl LayerLoadChannel {
    pub fn new() -> Self {
        let (sender, receiver) = channel();
        Self {
            sender,
            receiver,
            next_request_id: 0,
            pending: None,
        }
    }

    /// Returns true while a load is outstanding.
    pub fn is_loading(&self) -> bool {
        self.pending.is_some()
    }

    /// Starts loading the layer set, cancelling any load already in flight.
    ///
    /// Returns the id of the new request.
    pub fn request(&mut self, ctx: egui::Context, source: LayerSource) -> u64 {
        let (request_id, alive) = self.begin();
        let sender = self.sender.clone();

        #[cfg(target_arch = "wasm32")]
        {
            wasm_bindgen_futures::spawn_local(async move {
                let fetcher = super::fetch::PlatformFetcher::default();
                run_pipeline(&fetcher, &source, request_id, &alive, &sender).await;
                ctx.request_repaint();
            });
        }

        #[cfg(not(target_arch = "wasm32"))]
        {
            std::thread::spawn(move || {
                let fetcher = super::fetch::PlatformFetcher::default();
                pollster::block_on(run_pipeline(
                    &fetcher,
                    &source,
                    request_id,
                    &alive,
                    &sender,
                ));
                ctx.request_repaint();
            });
        }

        request_id
    }

    /// Marks the outstanding load (if any) as dead. Its result will never be
    /// delivered.
    pub fn cancel(&mut self) {
        if let Some(pending) = self.pending.take() {
            log::debug!("Cancelling layer load #{}", pending.request_id);
            pending.alive.store(false, Ordering::SeqCst);
        }
    }

    /// Non-blocking check for the result of the current request.
    ///
    /// Results from superseded requests are discarded.
    pub fn try_recv(&mut self) -> Option<Result<Vec<LoadedLayer>, LayerError>> {
        while let Ok(result) = self.receiver.try_recv() {
            let is_current = self
                .pending
                .as_ref()
                .is_some_and(|p| p.request_id == result.request_id);

            if is_current {
                self.pending = None;
                return Some(result.outcome);
            }

            log::debug!("Dropping stale layer load #{}", result.request_id);
        }
        None
    }

    fn begin(&mut self) -> (u64, Arc<AtomicBool>) {
        self.cancel();
        self.next_request_id += 1;
        let alive = Arc::new(AtomicBool::new(true));
        self.pending = Some(PendingLoad {
            request_id: self.next_request_id,
            alive: alive.clone(),
        });
        (self.next_request_id, alive)
    }

    #[cfg(test)]
    fn sender(&self) -> Sender<LayerLoadResult> {
        self.sender.clone()
    }
}

impl Drop for LayerLoadChannel {
    fn drop(&mut self) {
        self.cancel();
    }
}

/// Runs the manifest stage then the layer stage, delivering the outcome
/// unless the request was cancelled in the meantime.
pub async fn run_pipeline<F: ResourceFetcher>(
    fetcher: &F,
    source: &LayerSource,
    request_id: u64,
    alive: &AtomicBool,
    sender: &Sender<LayerLoadResult>,
) {
    let outcome = match load_manifest(fetcher, &source.base_path, &source.manifest_file).await {
        Ok(manifest) => {
            if !alive.load(Ordering::SeqCst) {
                log::debug!("Layer load #{} cancelled after index", request_id);
                return;
            }
            fetch_layers(fetcher, &source.base_path, &manifest).await
        }
        Err(e) => Err(e),
    };

    if !alive.load(Ordering::SeqCst) {
        log::debug!("Layer load #{} cancelled, discarding result", request_id);
        return;
    }

    // The receiver is gone when the view was torn down
    let _ = sender.send(LayerLoadResult {
        request_id,
        outcome,
    });
}
