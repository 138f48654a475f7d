pub mod document_repository;
#[cfg(test)]
mod memory_document_repository;

pub use document_repository::{DocumentRepository, PgDocumentRepository};
#[cfg(test)]
pub use memory_document_repository::InMemoryDocumentRepository;
