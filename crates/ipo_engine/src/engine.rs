use std::sync::{mpsc, Arc};
use std::thread;

use ipo_core::Company;
use ipo_logging::{ipo_debug, ipo_error, ipo_warn};

use crate::decode::decode_html;
use crate::extract::{Extractor, IpoPageExtractor};
use crate::fetch::{ChannelProgressSink, FetchSettings, Fetcher, ProgressSink, ReqwestFetcher};
use crate::{EngineEvent, FailureKind, FetchError, JobId, JobOutcome, JobProgress, Stage};

enum EngineCommand {
    Enqueue { job_id: JobId, company: Company },
}

/// Fetches detail pages on a background runtime and extracts a record from each.
///
/// Jobs run concurrently; every job ends with exactly one `JobCompleted` event.
pub struct EngineHandle {
    cmd_tx: mpsc::Sender<EngineCommand>,
    event_rx: mpsc::Receiver<EngineEvent>,
}

impl EngineHandle {
    pub fn new(settings: FetchSettings) -> Result<Self, FetchError> {
        Ok(Self::with_parts(
            Arc::new(ReqwestFetcher::new(settings)?),
            Arc::new(IpoPageExtractor::new()),
        ))
    }

    pub fn with_parts(fetcher: Arc<dyn Fetcher>, extractor: Arc<dyn Extractor>) -> Self {
        let (cmd_tx, cmd_rx) = mpsc::channel();
        let (event_tx, event_rx) = mpsc::channel();

        thread::spawn(move || {
            let runtime = match tokio::runtime::Runtime::new() {
                Ok(runtime) => runtime,
                Err(err) => {
                    ipo_error!("Engine runtime failed to start: {err}");
                    return;
                }
            };
            while let Ok(command) = cmd_rx.recv() {
                let fetcher = fetcher.clone();
                let extractor = extractor.clone();
                let event_tx = event_tx.clone();
                runtime.spawn(async move {
                    handle_command(fetcher.as_ref(), extractor.as_ref(), command, event_tx).await;
                });
            }
            // Let in-flight jobs finish before the runtime is dropped.
            runtime.shutdown_timeout(std::time::Duration::from_secs(30));
        });

        Self { cmd_tx, event_rx }
    }

    /// Queues the detail page of `company`.
    pub fn enqueue(&self, job_id: JobId, company: Company) {
        let _ = self.cmd_tx.send(EngineCommand::Enqueue { job_id, company });
    }

    /// Blocks until the next event. `None` once the engine thread is gone.
    pub fn recv(&self) -> Option<EngineEvent> {
        self.event_rx.recv().ok()
    }
}

async fn handle_command(
    fetcher: &dyn Fetcher,
    extractor: &dyn Extractor,
    command: EngineCommand,
    event_tx: mpsc::Sender<EngineEvent>,
) {
    match command {
        EngineCommand::Enqueue { job_id, company } => {
            let sink = ChannelProgressSink::new(event_tx.clone());
            sink.emit(progress(job_id, Stage::Queued, None));
            let url = company.url.clone();
            let result = run_job(fetcher, extractor, job_id, company, &sink).await;
            if let Err(kind) = &result {
                ipo_warn!("Job {job_id} for {url} failed: {kind}");
            }
            let _ = event_tx.send(EngineEvent::JobCompleted { job_id, result });
        }
    }
}

async fn run_job(
    fetcher: &dyn Fetcher,
    extractor: &dyn Extractor,
    job_id: JobId,
    company: Company,
    sink: &dyn ProgressSink,
) -> Result<JobOutcome, FailureKind> {
    let output = fetcher
        .fetch(job_id, &company.url, sink)
        .await
        .map_err(|err| err.kind)?;
    let bytes = output.metadata.byte_len;

    sink.emit(progress(job_id, Stage::Decoding, Some(bytes)));
    let html = decode_html(&output.bytes, output.metadata.content_type.as_deref()).map_err(|err| {
        ipo_debug!("Job {job_id}: {err}");
        FailureKind::Decode
    })?;

    sink.emit(progress(job_id, Stage::Extracting, Some(bytes)));
    let record = extractor.extract(&html).map_err(|err| {
        ipo_debug!("Job {job_id}: {err}");
        FailureKind::Extraction
    })?;

    sink.emit(progress(job_id, Stage::Done, Some(bytes)));
    Ok(JobOutcome {
        company,
        final_url: output.metadata.final_url,
        bytes,
        record,
    })
}

fn progress(job_id: JobId, stage: Stage, bytes: Option<u64>) -> EngineEvent {
    EngineEvent::Progress(JobProgress {
        job_id,
        stage,
        bytes,
    })
}
