use photo_grid::{FlowObserver, PdfDocumentWriter, ScratchSpace};
use std::path::PathBuf;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

// Re-export types from the core crate
pub use photo_grid::{GenerationResult, GenerationSummary, GridConfig, GridError, SkippedImage};

/// Cooperative cancellation flag shared between a job and its callers.
///
/// The job polls it between cells; an image already being resampled is
/// finished before the cancellation takes effect.
#[derive(Debug, Clone, Default)]
pub struct CancelToken(Arc<AtomicBool>);

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

/// Updates sent from a running job to its caller
#[derive(Debug, Clone)]
pub enum JobEvent {
    Progress {
        processed: usize,
        total: usize,
    },
    Skipped(SkippedImage),
    Completed(GenerationSummary),
    Failed {
        message: String,
    },
    Cancelled,
}

/// Forwards flow notifications into the job's event channel
struct ChannelObserver {
    cancel: CancelToken,
    update_tx: mpsc::UnboundedSender<JobEvent>,
}

impl FlowObserver for ChannelObserver {
    fn is_cancelled(&self) -> bool {
        self.cancel.is_cancelled()
    }

    fn on_progress(&self, processed: usize, total: usize) {
        let _ = self.update_tx.send(JobEvent::Progress { processed, total });
    }

    fn on_skipped(&self, skipped: &SkippedImage) {
        let _ = self.update_tx.send(JobEvent::Skipped(skipped.clone()));
    }
}

/// One grid generation running on the blocking pool.
///
/// Events arrive on an unbounded channel; the channel closes once the job has
/// sent its final `Completed`, `Failed` or `Cancelled` event.
pub struct GenerationJob {
    cancel: CancelToken,
    update_rx: mpsc::UnboundedReceiver<JobEvent>,
    task: JoinHandle<GenerationResult>,
}

impl GenerationJob {
    /// Start a job writing to `destination`.
    ///
    /// Must be called from within a Tokio runtime.
    pub fn start(images: Vec<PathBuf>, config: GridConfig, destination: impl Into<PathBuf>) -> Self {
        Self::spawn(images, config, destination, CancelToken::new())
    }

    /// Start a job that observes an existing cancellation token
    pub fn spawn(
        images: Vec<PathBuf>,
        config: GridConfig,
        destination: impl Into<PathBuf>,
        cancel: CancelToken,
    ) -> Self {
        Self::launch(images, config, destination.into(), cancel, None)
    }

    /// Like [`GenerationJob::spawn`], with the per-job scratch directory
    /// created under `scratch_parent` instead of the system temp directory
    pub fn spawn_in(
        images: Vec<PathBuf>,
        config: GridConfig,
        destination: impl Into<PathBuf>,
        cancel: CancelToken,
        scratch_parent: impl Into<PathBuf>,
    ) -> Self {
        Self::launch(
            images,
            config,
            destination.into(),
            cancel,
            Some(scratch_parent.into()),
        )
    }

    fn launch(
        images: Vec<PathBuf>,
        config: GridConfig,
        destination: PathBuf,
        cancel: CancelToken,
        scratch_parent: Option<PathBuf>,
    ) -> Self {
        let (update_tx, update_rx) = mpsc::unbounded_channel();
        let observer = ChannelObserver {
            cancel: cancel.clone(),
            update_tx,
        };

        let task = tokio::task::spawn_blocking(move || {
            run_job(&images, &config, destination, scratch_parent, observer)
        });

        Self {
            cancel,
            update_rx,
            task,
        }
    }

    /// Request cancellation; honoured at the next cell boundary
    pub fn cancel(&self) {
        self.cancel.cancel();
    }

    pub fn cancel_token(&self) -> CancelToken {
        self.cancel.clone()
    }

    /// Next event, or `None` once the job has finished and all events were read
    pub async fn next_event(&mut self) -> Option<JobEvent> {
        self.update_rx.recv().await
    }

    /// Wait for the job to finish
    pub async fn wait(self) -> GenerationResult {
        self.task.await?
    }
}

fn run_job(
    images: &[PathBuf],
    config: &GridConfig,
    destination: PathBuf,
    scratch_parent: Option<PathBuf>,
    observer: ChannelObserver,
) -> GenerationResult {
    let result = render_with_scratch(images, config, destination, scratch_parent, &observer);

    let event = match &result {
        Ok(summary) => {
            log::info!(
                "Generated {} page(s), {} image(s) skipped",
                summary.page_count,
                summary.skipped.len()
            );
            JobEvent::Completed(summary.clone())
        }
        Err(GridError::Cancelled) => JobEvent::Cancelled,
        Err(e) => {
            log::error!("Generation failed: {}", e);
            JobEvent::Failed {
                message: e.to_string(),
            }
        }
    };
    let _ = observer.update_tx.send(event);

    result
}

fn render_with_scratch(
    images: &[PathBuf],
    config: &GridConfig,
    destination: PathBuf,
    scratch_parent: Option<PathBuf>,
    observer: &ChannelObserver,
) -> GenerationResult {
    let scratch = match scratch_parent {
        Some(parent) => ScratchSpace::new_in(parent)?,
        None => ScratchSpace::new()?,
    };
    let mut writer = PdfDocumentWriter::new(destination, config.title.clone());

    let result = photo_grid::render(images, config, &mut writer, &scratch, observer);

    // Scratch goes away on every exit path; a failed removal is not worth
    // failing an otherwise finished document over
    let scratch_dir = scratch.path().to_path_buf();
    if let Err(e) = scratch.close() {
        log::warn!(
            "Failed to remove scratch space {}: {}",
            scratch_dir.display(),
            e
        );
    }

    result
}
