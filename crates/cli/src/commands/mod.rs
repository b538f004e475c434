//! Command handlers for the MedRAG CLI.

pub mod inspect;
pub mod lexical;
pub mod retrieve;
pub mod serve;
pub mod vector;

pub use inspect::InspectCommand;
pub use lexical::LexicalCommand;
pub use retrieve::RetrieveCommand;
pub use serve::ServeCommand;
pub use vector::VectorCommand;
