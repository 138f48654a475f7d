pub mod qa_dto;

pub use qa_dto::{AnswerResponseDto, AskQuestionDto, IndexStatusDto, QueryLogResponseDto};
