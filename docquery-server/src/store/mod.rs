pub mod document;
pub mod vector_store;
