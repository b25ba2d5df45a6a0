//! Line-oriented, mode- and channel-aware regex lexer.
//!
//! This crate provides the token and source-span model ([`TextSpan`],
//! [`Token`]) and a [`Lexer`] that matches tokens against per-mode rule
//! sets, tagging each with a channel so that auxiliary grammars (comments,
//! whitespace, ...) can be spliced into a parse without polluting the main
//! grammar.

pub mod error;
pub mod lexer;
pub mod span;
pub mod token;

pub use error::{LexError, RuleError};
pub use lexer::{Lexer, LineStream};
pub use span::TextSpan;
pub use token::{Token, CHANNEL_ALL, CHANNEL_DEFAULT, NORMAL_MODE};
