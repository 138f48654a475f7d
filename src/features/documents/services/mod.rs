pub mod chunking;
pub mod document_service;
pub mod extraction_service;
pub mod indexing_service;

pub use chunking::TextChunker;
pub use document_service::DocumentService;
pub use indexing_service::IndexingService;
