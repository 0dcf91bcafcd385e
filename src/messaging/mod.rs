pub mod message;
pub mod queue;
pub mod registry;

pub use message::Message;
pub use queue::{Queue, QueueError, WorkerPool};
pub use registry::{JobError, JobRegistry};
