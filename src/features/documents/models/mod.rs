pub mod document;

pub use document::{Document, DocumentStatus, FileType, NewDocument};
