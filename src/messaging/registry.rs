use futures::future::BoxFuture;
use futures::FutureExt;
use std::collections::HashMap;
use std::future::Future;

use crate::messaging::message::Message;

type JobHandler = Box<dyn Fn(Message) -> BoxFuture<'static, Result<(), JobError>> + Send + Sync>;

#[derive(thiserror::Error, Debug)]
pub enum JobError {
    #[error("message has no job name")]
    MissingJobName,
    #[error("no handler registered for job {0}")]
    UnknownJob(String),
    #[error("message has no {0} field")]
    MissingField(&'static str),
    #[error("invalid {field} field: {reason}")]
    InvalidField { field: &'static str, reason: String },
    #[error("job failed: {0}")]
    Failed(#[source] Box<dyn std::error::Error + Send + Sync>),
}

impl JobError {
    /// Wrap a collaborator failure as the job's terminal error.
    pub fn failed(err: impl std::error::Error + Send + Sync + 'static) -> Self {
        JobError::Failed(Box::new(err))
    }
}

/// Maps job names to their handlers. Built once at startup, shared with the
/// worker pool behind an `Arc`; producers only ever see the queue.
#[derive(Default)]
pub struct JobRegistry {
    handlers: HashMap<String, JobHandler>,
}

impl JobRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Bind a handler to a job name.
    ///
    /// # Panics
    ///
    /// Panics when the name is already bound. Registering the same job twice
    /// is a startup configuration bug, not a runtime condition.
    pub fn register<F, Fut>(&mut self, name: impl Into<String>, handler: F)
    where
        F: Fn(Message) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<(), JobError>> + Send + 'static,
    {
        let name = name.into();

        if self.handlers.contains_key(&name) {
            panic!("a handler is already registered for job {}", name);
        }

        self.handlers
            .insert(name, Box::new(move |message| handler(message).boxed()));
    }

    /// Route a message to the handler named by its `"job"` field. A missing
    /// or unbound name fails without invoking any handler.
    pub async fn dispatch(&self, message: Message) -> Result<(), JobError> {
        let job = message.job().ok_or(JobError::MissingJobName)?;
        let handler = self
            .handlers
            .get(job)
            .ok_or_else(|| JobError::UnknownJob(job.to_string()))?;

        handler(message).await
    }
}
