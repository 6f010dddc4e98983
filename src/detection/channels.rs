// Status channel between the scan worker and the controller
use super::types::EngineStatus;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

pub type StatusSender = mpsc::UnboundedSender<EngineStatus>;
pub type StatusReceiver = mpsc::UnboundedReceiver<EngineStatus>;

/// Unbounded so the worker never blocks on a slow UI
pub fn create_status_channel() -> (StatusSender, StatusReceiver) {
    mpsc::unbounded_channel()
}

/// Producer side used by the engine and its worker thread
#[derive(Debug, Clone)]
pub struct StatusReporter {
    tx: StatusSender,
}

impl StatusReporter {
    pub fn new(tx: StatusSender) -> Self {
        Self { tx }
    }

    pub fn emit(&self, status: EngineStatus) {
        log::debug!("📣 status: {}", status);
        // A closed channel only means nobody listens any more
        let _ = self.tx.send(status);
    }
}

/// Drain statuses on a tokio task until every sender is dropped. Resolves to
/// the number of statuses handled.
pub fn spawn_status_drain<F>(mut rx: StatusReceiver, mut handler: F) -> JoinHandle<usize>
where
    F: FnMut(EngineStatus) + Send + 'static,
{
    tokio::spawn(async move {
        let mut handled = 0usize;
        while let Some(status) = rx.recv().await {
            handler(status);
            handled += 1;
        }
        handled
    })
}
