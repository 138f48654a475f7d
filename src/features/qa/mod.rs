pub mod dtos;
pub mod handlers;
pub mod models;
pub mod repositories;
pub mod routes;
pub mod services;

pub use repositories::PgQueryLogRepository;
pub use routes::routes;
pub use services::{AnswerGenerator, QaService};
