//! Lifecycle event dispatch.
//!
//! The worker is reached only through a [`Dispatcher`]. Each event sent to it
//! runs as its own task and answers through a one-shot channel, so many fetch
//! events can be in flight at once while install and activate serialize on
//! the worker's state lock.

use std::sync::Arc;

use pwa_cache_core::{AssetRequest, Error};
use tokio::sync::{mpsc, oneshot};
use tokio::task::JoinHandle;

use crate::error::HostError;
use crate::worker::{ActivateReport, FetchOutcome, InstallReport, ServiceWorker};

const EVENT_QUEUE_DEPTH: usize = 64;

/// Deferred result of one event.
type Reply<T> = oneshot::Sender<Result<T, Error>>;

enum WorkerEvent {
    Install { reply: Reply<InstallReport> },
    Activate { reply: Reply<ActivateReport> },
    Fetch { request: AssetRequest, reply: Reply<FetchOutcome> },
    Terminate { reply: oneshot::Sender<()> },
}

impl WorkerEvent {
    fn name(&self) -> &'static str {
        match self {
            WorkerEvent::Install { .. } => "install",
            WorkerEvent::Activate { .. } => "activate",
            WorkerEvent::Fetch { .. } => "fetch",
            WorkerEvent::Terminate { .. } => "terminate",
        }
    }
}

/// Sending half of the event loop. Cheap to clone.
#[derive(Clone)]
pub struct Dispatcher {
    tx: mpsc::Sender<WorkerEvent>,
}

impl Dispatcher {
    /// Start the event loop for `worker`.
    ///
    /// The loop runs until every `Dispatcher` clone is dropped.
    pub fn spawn(worker: Arc<ServiceWorker>) -> (Self, JoinHandle<()>) {
        let (tx, mut rx) = mpsc::channel::<WorkerEvent>(EVENT_QUEUE_DEPTH);

        let handle = tokio::spawn(async move {
            while let Some(event) = rx.recv().await {
                tracing::trace!(event = event.name(), "dispatching");
                let worker = Arc::clone(&worker);
                tokio::spawn(run_event(worker, event));
            }
            tracing::debug!("event loop stopped");
        });

        (Self { tx }, handle)
    }

    /// Deliver the installation trigger.
    pub async fn install(&self) -> Result<InstallReport, HostError> {
        let (reply, rx) = oneshot::channel();
        self.send(WorkerEvent::Install { reply }).await?;
        let result = rx.await.map_err(|_| HostError::ResultDropped("install"))?;
        result.map_err(HostError::Worker)
    }

    pub async fn activate(&self) -> Result<ActivateReport, HostError> {
        let (reply, rx) = oneshot::channel();
        self.send(WorkerEvent::Activate { reply }).await?;
        let result = rx.await.map_err(|_| HostError::ResultDropped("activate"))?;
        result.map_err(HostError::Worker)
    }

    /// Deliver one intercepted request.
    pub async fn fetch(&self, request: AssetRequest) -> Result<FetchOutcome, HostError> {
        let (reply, rx) = oneshot::channel();
        self.send(WorkerEvent::Fetch { request, reply }).await?;
        let result = rx.await.map_err(|_| HostError::ResultDropped("fetch"))?;
        result.map_err(HostError::Worker)
    }

    pub async fn terminate(&self) -> Result<(), HostError> {
        let (reply, rx) = oneshot::channel();
        self.send(WorkerEvent::Terminate { reply }).await?;
        rx.await.map_err(|_| HostError::ResultDropped("terminate"))
    }

    async fn send(&self, event: WorkerEvent) -> Result<(), HostError> {
        self.tx.send(event).await.map_err(|_| HostError::LoopClosed)
    }
}

async fn run_event(worker: Arc<ServiceWorker>, event: WorkerEvent) {
    let delivered = match event {
        WorkerEvent::Install { reply } => reply.send(worker.install().await).is_ok(),
        WorkerEvent::Activate { reply } => reply.send(worker.activate().await).is_ok(),
        WorkerEvent::Fetch { request, reply } => reply.send(worker.handle_fetch(&request).await).is_ok(),
        WorkerEvent::Terminate { reply } => {
            worker.terminate().await;
            reply.send(()).is_ok()
        }
    };

    if !delivered {
        tracing::debug!("event result discarded; requester went away");
    }
}

/// Registration-time lifecycle: install, then activate on success.
///
/// Failures are logged and left for a later install event to retry.
pub async fn register(dispatcher: &Dispatcher) {
    match dispatcher.install().await {
        Ok(report) => {
            tracing::info!(cache = %report.cache_name, stored = report.stored, "registration install succeeded");
            if let Err(e) = dispatcher.activate().await {
                tracing::error!(error = %e, "registration activate failed");
            }
        }
        Err(e) => tracing::error!(error = %e, "registration install failed"),
    }
}
