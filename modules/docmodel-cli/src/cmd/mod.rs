pub mod document;
pub mod projector;
