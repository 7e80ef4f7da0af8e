//! Error types for trace parsing.

use thiserror::Error;

/// Result type for trace parsing operations.
pub type Result<T> = std::result::Result<T, ParseError>;

/// Parse context carrying filename for error reporting.
#[derive(Clone, Debug)]
pub struct ParseContext {
    pub filename: Option<String>,
}

impl ParseContext {
    /// Create a new parse context.
    pub fn new(filename: Option<&str>) -> Self {
        Self {
            filename: filename.map(String::from),
        }
    }

    /// Format a location suffix for error messages.
    ///
    /// `line` and `col` are zero-based; the message is one-based.
    pub fn loc_suffix(&self, line: usize, col: usize) -> String {
        match &self.filename {
            Some(name) => format!(" at {}:{} of <{}>", line + 1, col + 1, name),
            None => format!(" at {}:{}", line + 1, col + 1),
        }
    }
}

/// Error type for trace parsing.
///
/// The trailing `String` of each variant is the location suffix, empty until
/// [`ParseError::with_location`] fills it in.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ParseError {
    /// A fixed delimiter was not found where the grammar requires it.
    #[error("Expected \"{0}\"{1}")]
    ExpectedLiteral(&'static str, String),

    /// The tag field does not start with a decimal digit.
    #[error("Expected decimal digit{0}")]
    ExpectedDigit(String),

    /// A quoted string has no closing quote.
    #[error("Unterminated string{0}")]
    UnterminatedString(String),

    /// A closing `>>` or `]` is missing.
    #[error("Unmatched \"{0}\"{1}")]
    Unmatched(&'static str, String),

    /// A record value is not a decimal integer.
    #[error("Invalid integer \"{0}\"{1}")]
    InvalidInteger(String, String),

    /// A record entry is not of the form `key |-> value`.
    #[error("Invalid record field \"{0}\"{1}")]
    InvalidField(String, String),

    /// The same key appears twice in one record.
    #[error("Duplicate record key \"{0}\"{1}")]
    DuplicateKey(String, String),

    /// A fixed-size tuple has the wrong number of elements.
    #[error("Expected {0} elements, found {1}{2}")]
    Arity(usize, usize, String),

    /// Content follows the closing marker of the line.
    #[error("Unexpected extra content{0}")]
    ExtraContent(String),
}

impl ParseError {
    /// Create an error with location information.
    pub fn with_location(self, ctx: &ParseContext, line: usize, col: usize) -> Self {
        let suffix = ctx.loc_suffix(line, col);
        match self {
            ParseError::ExpectedLiteral(lit, _) => ParseError::ExpectedLiteral(lit, suffix),
            ParseError::ExpectedDigit(_) => ParseError::ExpectedDigit(suffix),
            ParseError::UnterminatedString(_) => ParseError::UnterminatedString(suffix),
            ParseError::Unmatched(lit, _) => ParseError::Unmatched(lit, suffix),
            ParseError::InvalidInteger(text, _) => ParseError::InvalidInteger(text, suffix),
            ParseError::InvalidField(text, _) => ParseError::InvalidField(text, suffix),
            ParseError::DuplicateKey(key, _) => ParseError::DuplicateKey(key, suffix),
            ParseError::Arity(expected, found, _) => ParseError::Arity(expected, found, suffix),
            ParseError::ExtraContent(_) => ParseError::ExtraContent(suffix),
        }
    }
}
