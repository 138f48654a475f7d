pub mod qa_handler;

pub use qa_handler::{
    __path_ask_question, __path_get_history, __path_get_index_status, ask_question, get_history,
    get_index_status,
};
