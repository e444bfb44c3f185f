use thiserror::Error;

/// A query the grammar cannot derive. Parsing is all-or-nothing, so this is
/// the only outcome besides a complete token sequence.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("Syntax error at offset {position} (line {line}, column {column}): {message}")]
pub struct SyntaxError {
    /// Character offset into the query where parsing failed, so it never
    /// exceeds the query's char count.
    pub position: usize,
    /// The same point as a byte offset, for slicing the query.
    pub byte_offset: usize,
    pub line: usize,
    pub column: usize,
    /// Descriptions of the constructs the grammar would have accepted.
    pub expected: Vec<String>,
    pub message: String,
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SearchError {
    #[error(transparent)]
    Syntax(#[from] SyntaxError),
    #[error("Internal invariant violated: {0}")]
    Invariant(String),
    #[error("Config error: {0}")]
    Config(String),
    #[error("Output error: {0}")]
    Output(String),
}

pub type Result<T> = std::result::Result<T, SearchError>;

// Helper conversions
impl From<config::ConfigError> for SearchError {
    fn from(e: config::ConfigError) -> Self { Self::Config(e.to_string()) }
}

impl From<serde_json::Error> for SearchError {
    fn from(e: serde_json::Error) -> Self { Self::Output(e.to_string()) }
}

impl From<std::io::Error> for SearchError {
    fn from(e: std::io::Error) -> Self { Self::Output(e.to_string()) }
}

impl SearchError {
    pub fn as_syntax(&self) -> Option<&SyntaxError> {
        match self {
            Self::Syntax(e) => Some(e),
            _ => None,
        }
    }
}
