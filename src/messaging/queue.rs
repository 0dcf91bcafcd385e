use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{mpsc, Mutex};
use tokio::task::JoinHandle;

use crate::messaging::message::Message;
use crate::messaging::registry::JobRegistry;

#[derive(thiserror::Error, Debug)]
pub enum QueueError {
    #[error("message has no job name")]
    MissingJobName,
    #[error("queue is full")]
    Full,
    #[error("queue is closed")]
    Closed,
}

/// Producer handle for the in-process job queue. Cloned into every HTTP
/// handler that needs to enqueue a side effect; the matching receiver is
/// owned by the worker pool.
#[derive(Clone)]
pub struct Queue {
    sender: mpsc::Sender<Message>,
}

impl Queue {
    pub fn new(capacity: usize) -> (Queue, mpsc::Receiver<Message>) {
        let (sender, receiver) = mpsc::channel(capacity);

        (Queue { sender }, receiver)
    }

    /// Accept a message for asynchronous delivery. Returns promptly; the
    /// caller is never blocked on handler execution.
    pub fn send(&self, message: Message) -> Result<(), QueueError> {
        if message.job().is_none() {
            return Err(QueueError::MissingJobName);
        }

        self.sender.try_send(message).map_err(|err| match err {
            mpsc::error::TrySendError::Full(_) => QueueError::Full,
            mpsc::error::TrySendError::Closed(_) => QueueError::Closed,
        })
    }
}

/// Drains the queue into the registry. Each worker gives every dispatch its
/// own deadline, decoupled from whatever request produced the message.
pub struct WorkerPool {
    registry: Arc<JobRegistry>,
    receiver: Arc<Mutex<mpsc::Receiver<Message>>>,
    workers: usize,
    dispatch_timeout: Duration,
}

impl WorkerPool {
    pub fn new(
        registry: Arc<JobRegistry>,
        receiver: mpsc::Receiver<Message>,
        workers: usize,
        dispatch_timeout: Duration,
    ) -> Self {
        Self {
            registry,
            receiver: Arc::new(Mutex::new(receiver)),
            workers,
            dispatch_timeout,
        }
    }

    /// Spawn the worker tasks. They run until every producer handle has been
    /// dropped and the channel is drained.
    pub fn spawn(self) -> Vec<JoinHandle<()>> {
        (0..self.workers.max(1))
            .map(|worker_id| {
                let registry = self.registry.clone();
                let receiver = self.receiver.clone();
                let dispatch_timeout = self.dispatch_timeout;

                tokio::spawn(async move {
                    loop {
                        let message = { receiver.lock().await.recv().await };

                        match message {
                            Some(message) => {
                                run_job(&registry, message, dispatch_timeout, worker_id).await
                            }
                            None => break,
                        }
                    }

                    tracing::debug!(worker_id, "queue closed, worker stopping");
                })
            })
            .collect()
    }
}

/// A failed or timed-out message is terminal: logged, never retried.
async fn run_job(
    registry: &JobRegistry,
    message: Message,
    dispatch_timeout: Duration,
    worker_id: usize,
) {
    let job = message.job().unwrap_or("<missing>").to_string();

    match tokio::time::timeout(dispatch_timeout, registry.dispatch(message)).await {
        Ok(Ok(())) => {
            tracing::info!(worker_id, job = %job, "job succeeded");
        }
        Ok(Err(err)) => {
            tracing::error!(worker_id, job = %job, error = %err, "job failed");
        }
        Err(_) => {
            tracing::error!(
                worker_id,
                job = %job,
                timeout_secs = dispatch_timeout.as_secs(),
                "job timed out"
            );
        }
    }
}
