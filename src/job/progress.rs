use serde::{Deserialize, Serialize};
use tokio::sync::mpsc;

/// First progress value, emitted when rendering starts.
pub const PROGRESS_START: u8 = 1;

/// `{id, progress}` notification for one job.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProgressEvent {
    pub id: String,
    pub progress: u8,
}

/// Optional progress channel registered when the job is built.
#[derive(Clone, Debug, Default)]
pub struct ProgressSink {
    tx: Option<mpsc::UnboundedSender<ProgressEvent>>,
}

impl ProgressSink {
    pub fn new(tx: mpsc::UnboundedSender<ProgressEvent>) -> Self {
        Self { tx: Some(tx) }
    }

    /// Send an event; a closed or missing receiver is not an error.
    pub fn emit(&self, id: &str, progress: u8) {
        let Some(tx) = &self.tx else {
            return;
        };
        if tx
            .send(ProgressEvent {
                id: id.to_string(),
                progress,
            })
            .is_err()
        {
            tracing::debug!(id, progress, "progress receiver dropped");
        }
    }
}
