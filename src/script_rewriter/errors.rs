//! Error types for script parsing and re-emission

use thiserror::Error;

/// Result type alias for script rewriting
pub type ScriptResult<T> = Result<T, ScriptError>;

/// Reasons a script block is left untouched.
///
/// Offsets are byte positions in the script source.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ScriptError {
    #[error("Unterminated string literal starting at byte {0}")]
    UnterminatedString(usize),

    #[error("Unterminated comment starting at byte {0}")]
    UnterminatedComment(usize),

    #[error("Unterminated regular expression starting at byte {0}")]
    UnterminatedRegex(usize),

    #[error("Unterminated template literal starting at byte {0}")]
    UnterminatedTemplate(usize),

    #[error("Unexpected '{found}' at byte {offset}")]
    UnexpectedCloser { found: char, offset: usize },

    #[error("Unclosed '{open}' opened at byte {offset}")]
    UnclosedGroup { open: char, offset: usize },

    #[error("Expression nesting exceeds {0} levels")]
    TooDeep(usize),

    #[error("Overlapping edits at byte {0}")]
    OverlappingEdit(usize),
}
