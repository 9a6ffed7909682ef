//! Error types for the editor

use thiserror::Error;

#[derive(Error, Debug)]
pub enum EditorError {
    #[error("Parse error: {0}")]
    Parse(#[from] expectations_parser::ParseError),

    #[error("Session store error: {0}")]
    Store(#[from] expectations_common::CommonError),

    #[error("Mutation error: {0}")]
    Mutation(#[from] crate::mutations::MutationError),

    #[error("No document has been loaded")]
    NotLoaded,
}
