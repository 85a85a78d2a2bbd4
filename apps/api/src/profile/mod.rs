//! Profile extraction — lexical signals, LLM skill extraction and the
//! canonical vocabulary they normalize against.

pub mod catalog;
pub mod normalizer;
pub mod signals;
pub mod vocabulary;
