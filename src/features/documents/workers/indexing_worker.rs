use std::sync::Arc;
use tokio::sync::mpsc;
use uuid::Uuid;

use crate::core::error::Result;
use crate::features::documents::repositories::DocumentRepository;
use crate::features::documents::services::IndexingService;

/// Producer side of the indexing channel, cloned into the document service
#[derive(Clone)]
pub struct IndexingQueue {
    sender: mpsc::UnboundedSender<Uuid>,
}

impl IndexingQueue {
    pub fn channel() -> (Self, mpsc::UnboundedReceiver<Uuid>) {
        let (sender, receiver) = mpsc::unbounded_channel();
        (Self { sender }, receiver)
    }

    /// Schedule a document for indexing.
    ///
    /// If the worker is gone the document stays `pending` and is picked up
    /// again on the next startup.
    pub fn enqueue(&self, document_id: Uuid) {
        if self.sender.send(document_id).is_err() {
            tracing::warn!(%document_id, "Indexing worker is not running; document left pending");
        }
    }
}

/// Background worker that indexes documents one at a time, in FIFO order
pub struct IndexingWorker {
    receiver: mpsc::UnboundedReceiver<Uuid>,
    service: Arc<IndexingService>,
}

impl IndexingWorker {
    pub fn new(receiver: mpsc::UnboundedReceiver<Uuid>, service: Arc<IndexingService>) -> Self {
        Self { receiver, service }
    }

    /// Re-enqueue documents that were still pending when the process stopped
    pub async fn requeue_pending(
        documents: &dyn DocumentRepository,
        queue: &IndexingQueue,
    ) -> Result<usize> {
        let pending = documents.list_pending_ids().await?;
        for id in &pending {
            queue.enqueue(*id);
        }
        if !pending.is_empty() {
            tracing::info!("Re-enqueued {} pending documents for indexing", pending.len());
        }
        Ok(pending.len())
    }

    /// Run the worker until every queue handle is dropped
    pub async fn run(mut self) {
        tracing::info!("Starting document indexing worker");

        while let Some(document_id) = self.receiver.recv().await {
            self.service.process(document_id).await;
        }

        tracing::info!("Document indexing worker stopped");
    }

    /// Process every job queued so far, returning how many ran
    #[cfg(test)]
    pub async fn drain(&mut self) -> usize {
        let mut processed = 0;
        while let Ok(document_id) = self.receiver.try_recv() {
            self.service.process(document_id).await;
            processed += 1;
        }
        processed
    }
}
