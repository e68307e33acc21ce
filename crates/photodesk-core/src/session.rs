//! The editing session: one loaded image, its parameters and its history.
//!
//! [`EditSession`] is the explicit context every operation runs against.
//! Loads are sequenced so that only the most recently started one can land,
//! and preview requests are coalesced so that at most one frame is rendered
//! for a burst of slider changes.

use crate::config::EditorConfig;
use crate::decode::DecodedImage;
use crate::error::EditorError;
use crate::export::{encode_asset, export_and_download, DownloadSink, ExportReport, FileNaming};
use crate::history::{HistoryStore, KeyValueBackend};
use crate::intake::{self, FrameGrabber, ImageAsset, ImageSource, IncomingFile, IntakeError, LoadSequencer, LoadTicket};
use crate::params::TransformParameters;
use crate::remote::{RemoteClient, RemoteUpload};
use crate::transform::{render, render_filters_only};

/// Result of completing a load.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadOutcome {
    /// The image replaced the session's asset.
    Applied,
    /// A newer load was started meanwhile; this result was dropped.
    Superseded,
}

/// Holds only the newest parameter snapshot awaiting a preview render.
#[derive(Debug, Default)]
pub struct PreviewQueue {
    pending: Option<TransformParameters>,
    dropped: u64,
}

impl PreviewQueue {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue `params`, replacing any snapshot not yet rendered.
    pub fn request(&mut self, params: TransformParameters) {
        if self.pending.replace(params).is_some() {
            self.dropped += 1;
        }
    }

    pub fn take(&mut self) -> Option<TransformParameters> {
        self.pending.take()
    }

    pub fn is_pending(&self) -> bool {
        self.pending.is_some()
    }

    /// Snapshots superseded before they were rendered.
    pub fn dropped(&self) -> u64 {
        self.dropped
    }

    pub fn clear(&mut self) {
        self.pending = None;
    }
}

pub struct EditSession<B> {
    config: EditorConfig,
    asset: Option<ImageAsset>,
    params: TransformParameters,
    loads: LoadSequencer,
    preview: PreviewQueue,
    history: HistoryStore<B>,
}

impl<B: KeyValueBackend> EditSession<B> {
    /// New empty session storing history in `backend` under the configured key.
    pub fn new(config: EditorConfig, backend: B) -> Self {
        let history = HistoryStore::with_key(backend, config.history_key.clone());
        let mut session = Self {
            config,
            asset: None,
            params: TransformParameters::new(),
            loads: LoadSequencer::new(),
            preview: PreviewQueue::new(),
            history,
        };
        session.params = session.default_params();
        session
    }

    pub fn config(&self) -> &EditorConfig {
        &self.config
    }

    pub fn asset(&self) -> Option<&ImageAsset> {
        self.asset.as_ref()
    }

    pub fn has_image(&self) -> bool {
        self.asset.is_some()
    }

    pub fn params(&self) -> &TransformParameters {
        &self.params
    }

    pub fn history(&self) -> &HistoryStore<B> {
        &self.history
    }

    pub fn preview_queue(&self) -> &PreviewQueue {
        &self.preview
    }

    /// Validate, decode and install `file`.
    ///
    /// On error the previous image and parameters are left as they were. A
    /// file rejected by validation never takes a load ticket, so it cannot
    /// supersede a load already in flight.
    pub fn load_from_file(
        &mut self,
        file: &IncomingFile,
        source: ImageSource,
    ) -> Result<LoadOutcome, EditorError> {
        intake::validate_incoming(&file.mime_type, file.bytes.len()).map_err(|e| {
            log::warn!("rejected {}: {e}", file.name);
            EditorError::from(e)
        })?;
        let ticket = self.begin_load();
        let result = intake::load_from_file(file, source);
        self.finish_load(ticket, result)
    }

    /// Grab one camera frame and install it like a loaded file.
    pub fn capture_from_camera<G: FrameGrabber + ?Sized>(
        &mut self,
        grabber: &mut G,
    ) -> Result<LoadOutcome, EditorError> {
        let ticket = self.begin_load();
        let result = intake::capture_from_camera(grabber);
        self.finish_load(ticket, result)
    }

    /// Start an asynchronous load. Pass the ticket back to [`finish_load`]
    /// once decoding is done.
    ///
    /// [`finish_load`]: Self::finish_load
    pub fn begin_load(&self) -> LoadTicket {
        self.loads.begin()
    }

    /// Complete a load started with [`begin_load`](Self::begin_load).
    ///
    /// Results for a ticket that is no longer current are discarded, errors
    /// included, and the session is not touched.
    pub fn finish_load(
        &mut self,
        ticket: LoadTicket,
        result: Result<ImageAsset, IntakeError>,
    ) -> Result<LoadOutcome, EditorError> {
        if !self.loads.is_current(ticket) {
            log::debug!("discarding stale load {ticket:?}");
            return Ok(LoadOutcome::Superseded);
        }

        let asset = result.map_err(|e| {
            log::warn!("load failed: {e}");
            EditorError::from(e)
        })?;

        log::info!(
            "loaded {} ({}x{}) from {:?}",
            asset.filename(),
            asset.width(),
            asset.height(),
            asset.source()
        );
        self.asset = Some(asset);
        self.params = self.default_params();
        self.preview.clear();
        self.preview.request(self.params.clone());
        Ok(LoadOutcome::Applied)
    }

    /// Drop the current image.
    pub fn close(&mut self) {
        self.asset = None;
        self.params = self.default_params();
        self.preview.clear();
    }

    /// Change the parameters. The asset is marked dirty and a preview is
    /// queued. Returns whatever `f` returns.
    pub fn update_params<R>(&mut self, f: impl FnOnce(&mut TransformParameters) -> R) -> R {
        let out = f(&mut self.params);
        if let Some(asset) = &mut self.asset {
            asset.mark_dirty();
            self.preview.request(self.params.clone());
        }
        out
    }

    /// Restore default parameters and mark the asset clean.
    pub fn reset_params(&mut self) {
        self.params = self.default_params();
        if let Some(asset) = &mut self.asset {
            asset.mark_clean();
            self.preview.request(self.params.clone());
        }
    }

    /// Render the current image under the current parameters.
    pub fn render_preview(&self) -> Result<DecodedImage, EditorError> {
        let asset = self.asset.as_ref().ok_or(EditorError::NoImage)?;
        Ok(render(asset.image(), &self.params)?)
    }

    /// Colour-only preview, for hosts that apply geometry themselves.
    pub fn render_filter_preview(&self) -> Result<DecodedImage, EditorError> {
        let asset = self.asset.as_ref().ok_or(EditorError::NoImage)?;
        Ok(render_filters_only(asset.image(), &self.params)?)
    }

    /// Render the newest queued snapshot, if any. Older snapshots were
    /// already discarded when it was queued.
    pub fn render_pending_preview(&mut self) -> Result<Option<DecodedImage>, EditorError> {
        let Some(params) = self.preview.take() else {
            return Ok(None);
        };
        let asset = self.asset.as_ref().ok_or(EditorError::NoImage)?;
        Ok(Some(render(asset.image(), &params)?))
    }

    /// Export with a snapshot of the current parameters.
    ///
    /// The asset is marked clean when the download went through.
    pub fn export<S: DownloadSink + ?Sized>(
        &mut self,
        naming: &FileNaming,
        sink: &mut S,
    ) -> Result<ExportReport, EditorError> {
        let asset = self.asset.as_ref().ok_or(EditorError::NoImage)?;
        let snapshot = self.params.clone();
        let report = export_and_download(asset, &snapshot, naming, sink, &self.history)?;

        if report.download.is_ok() {
            if let Some(asset) = &mut self.asset {
                asset.mark_clean();
            }
        }
        Ok(report)
    }

    /// Resolve the configured ML service and encode the current render for
    /// it. The file keeps its name with the output format's extension.
    pub fn prepare_remote_upload(&self) -> Result<RemoteUpload, EditorError> {
        let client = RemoteClient::from_config(&self.config)?;
        let asset = self.asset.as_ref().ok_or(EditorError::NoImage)?;
        let image = encode_asset(asset, &self.params)?;
        let filename = FileNaming::prefix("").apply(asset.filename(), self.params.format().extension());
        Ok(RemoteUpload {
            client,
            filename,
            image,
        })
    }

    fn default_params(&self) -> TransformParameters {
        let mut params = TransformParameters::new();
        params.set_quality(self.config.default_quality);
        params
    }
}
