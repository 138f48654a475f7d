pub mod answer_generator;
pub mod qa_service;

pub use answer_generator::AnswerGenerator;
pub use qa_service::QaService;
