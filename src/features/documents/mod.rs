pub mod dtos;
pub mod handlers;
pub mod models;
pub mod repositories;
pub mod routes;
pub mod services;
pub mod workers;

pub use repositories::{DocumentRepository, PgDocumentRepository};
pub use routes::routes;
pub use services::{DocumentService, IndexingService};
pub use workers::{IndexingQueue, IndexingWorker};
