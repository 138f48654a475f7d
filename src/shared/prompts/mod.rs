//! Prompt templates for the QA engine.

mod engine;

pub use engine::render_template;
