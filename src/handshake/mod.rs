//! Correlation-id based, timeout-bounded request/response with an external renderer.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use tokio::sync::{mpsc, oneshot};

use crate::foundation::error::{FramemarkError, FramemarkResult};

pub mod bus;
pub mod local;
pub mod protocol;

/// How long a job waits for each renderer answer.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct HandshakeConfig {
    #[serde(with = "millis")]
    pub timeout: Duration,
}

impl Default for HandshakeConfig {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(20),
        }
    }
}

mod millis {
    use std::time::Duration;

    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(d: &Duration, s: S) -> Result<S::Ok, S::Error> {
        s.serialize_u64(d.as_millis() as u64)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<Duration, D::Error> {
        Ok(Duration::from_millis(u64::deserialize(d)?))
    }
}

type Pending<T> = Arc<Mutex<HashMap<String, oneshot::Sender<T>>>>;

/// Pending single-shot waits keyed by correlation id.
///
/// Cloning shares the same table, so one clone can `request` while another `resolve`s.
pub struct Correlator<T> {
    pending: Pending<T>,
}

impl<T> Clone for Correlator<T> {
    fn clone(&self) -> Self {
        Self {
            pending: Arc::clone(&self.pending),
        }
    }
}

impl<T> Default for Correlator<T> {
    fn default() -> Self {
        Self {
            pending: Arc::new(Mutex::new(HashMap::new())),
        }
    }
}

/// Removes the registration however the wait ends.
struct Registration<T> {
    pending: Pending<T>,
    id: String,
}

impl<T> Drop for Registration<T> {
    fn drop(&mut self) {
        self.pending.lock().remove(&self.id);
    }
}

impl<T: Send + 'static> Correlator<T> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `id`, publish `payload` on `channel`, then wait for the matching response.
    ///
    /// Settles exactly once: with the response, with a timeout error named after `what`, or
    /// with a channel error. The registration is gone afterwards on every path, including
    /// when the returned future is dropped.
    pub async fn request<P>(
        &self,
        channel: &mpsc::UnboundedSender<P>,
        payload: P,
        id: &str,
        timeout: Duration,
        what: &str,
    ) -> FramemarkResult<T> {
        let (tx, rx) = oneshot::channel();
        {
            let mut pending = self.pending.lock();
            if pending.contains_key(id) {
                return Err(FramemarkError::validation(format!(
                    "{what} already pending for '{id}'"
                )));
            }
            pending.insert(id.to_string(), tx);
        }
        let _registration = Registration {
            pending: Arc::clone(&self.pending),
            id: id.to_string(),
        };

        channel
            .send(payload)
            .map_err(|_| anyhow::anyhow!("renderer channel closed before {what} request"))?;

        match tokio::time::timeout(timeout, rx).await {
            Ok(Ok(value)) => Ok(value),
            Ok(Err(_)) => {
                Err(anyhow::anyhow!("renderer dropped the {what} request for '{id}'").into())
            }
            Err(_) => {
                tracing::error!(id, timeout_ms = timeout.as_millis() as u64, "{what} timed out");
                Err(FramemarkError::timeout(format!("{what} timed out")))
            }
        }
    }

    /// Deliver `value` to the waiter registered under `id`.
    ///
    /// Returns `false` when nobody is waiting (late, duplicate or unknown responses).
    pub fn resolve(&self, id: &str, value: T) -> bool {
        let Some(tx) = self.pending.lock().remove(id) else {
            tracing::debug!(id, "dropping response with no pending request");
            return false;
        };
        tx.send(value).is_ok()
    }

    /// Number of registrations still waiting.
    pub fn pending_count(&self) -> usize {
        self.pending.lock().len()
    }
}

#[cfg(test)]
#[path = "../../tests/unit/handshake/correlator.rs"]
mod tests;
