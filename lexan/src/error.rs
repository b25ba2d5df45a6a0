use crate::span::TextSpan;
use thiserror::Error;

/// Errors raised while building a [`crate::lexer::Lexer`]'s rule tables.
///
/// These mirror the validation `lexan`'s rule set has always performed,
/// generalized to be mode-aware: every rule is grouped by `(mode, pattern)`
/// rather than by pattern alone.
#[derive(Debug, Error)]
pub enum RuleError {
    #[error("duplicate pattern {pattern:?} in mode {mode}")]
    DuplicatePattern { mode: u32, pattern: String },
    #[error("empty pattern in mode {mode}")]
    EmptyPattern { mode: u32 },
    #[error("invalid regex: {0}")]
    Regex(#[from] regex::Error),
}

/// A fatal lexical error: the stream was not exhausted, but no rule in the
/// current mode matched at the current position.
#[derive(Debug, Error)]
#[error("no lexer rule matched at {position} (mode {mode})")]
pub struct LexError {
    pub position: TextSpan,
    pub mode: u32,
}
