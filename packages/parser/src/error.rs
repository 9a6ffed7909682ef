use thiserror::Error;

pub type ParseResult<T> = Result<T, ParseError>;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum ParseError {
    #[error("Invalid JSON at {line}:{column}: {message}")]
    InvalidJson {
        line: usize,
        column: usize,
        message: String,
    },

    #[error("Expected a JSON object at the top level, found {found}")]
    NotAnObject { found: String },
}

impl ParseError {
    pub fn not_an_object(found: impl Into<String>) -> Self {
        Self::NotAnObject {
            found: found.into(),
        }
    }
}

impl From<serde_json::Error> for ParseError {
    fn from(e: serde_json::Error) -> Self {
        Self::InvalidJson {
            line: e.line(),
            column: e.column(),
            message: e.to_string(),
        }
    }
}
