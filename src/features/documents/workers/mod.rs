pub mod indexing_worker;

pub use indexing_worker::{IndexingQueue, IndexingWorker};
