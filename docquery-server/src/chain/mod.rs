pub mod prompt;
pub mod retrieval_chain;
