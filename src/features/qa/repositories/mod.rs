#[cfg(test)]
mod memory_query_log_repository;
pub mod query_log_repository;

#[cfg(test)]
pub use memory_query_log_repository::InMemoryQueryLogRepository;
pub use query_log_repository::{PgQueryLogRepository, QueryLogRepository};
