//! Recommendation engine — retrieval, boosting, semantic re-ranking and
//! the pipeline tying them together.

pub mod boost;
pub mod cache;
pub mod pipeline;
pub mod reasoning;
pub mod rerank;
pub mod retriever;
