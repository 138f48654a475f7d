//! Modules layer - Infrastructure components for external integrations
//!
//! Contains clients and adapters for object storage, LLM providers,
//! embedding providers and the chunk vector store.

pub mod embeddings;
pub mod llm;
pub mod storage;
pub mod vector_store;
