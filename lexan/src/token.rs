use crate::span::TextSpan;
use std::fmt;

/// Matches any channel filter; used only for the synthetic EOF token, which
/// must be visible to whichever parser (main or hidden) is currently asking
/// for a lookahead.
pub const CHANNEL_ALL: i32 = -1;

/// The channel ordinary grammar tokens are produced on.
pub const CHANNEL_DEFAULT: i32 = 0;

/// The lexer mode a parser starts, and otherwise defaults, in.
pub const NORMAL_MODE: u32 = 0;

/// A lexed token: its type tag, matched text, channel, and source span.
///
/// `channel` and `span` are metadata, not part of a token's identity for
/// equality/ordering purposes where `T` itself already distinguishes tokens
/// of the same tag produced at different points -- two tokens are compared
/// by tag and text only.
#[derive(Debug, Clone)]
pub struct Token<T> {
    ty: T,
    text: String,
    channel: i32,
    span: TextSpan,
}

impl<T> Token<T> {
    pub fn new(ty: T, text: impl Into<String>, channel: i32, span: TextSpan) -> Self {
        Self {
            ty,
            text: text.into(),
            channel,
            span,
        }
    }

    pub fn eof(ty: T, at: TextSpan) -> Self {
        Self {
            ty,
            text: String::new(),
            channel: CHANNEL_ALL,
            span: at,
        }
    }

    pub fn tag(&self) -> &T {
        &self.ty
    }

    pub fn lexeme(&self) -> &str {
        &self.text
    }

    pub fn channel(&self) -> i32 {
        self.channel
    }

    pub fn span(&self) -> TextSpan {
        self.span
    }

    /// Whether this token is visible on `channel`: either it matches exactly,
    /// or the token is tagged `CHANNEL_ALL` (the EOF sentinel, which every
    /// parser -- main or hidden -- must be able to see).
    pub fn visible_on(&self, channel: i32) -> bool {
        self.channel == channel || self.channel == CHANNEL_ALL
    }
}

impl<T: PartialEq> PartialEq for Token<T> {
    fn eq(&self, other: &Self) -> bool {
        self.ty == other.ty && self.text == other.text
    }
}

impl<T: Eq> Eq for Token<T> {}

impl<T: fmt::Display> fmt::Display for Token<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}({:?}) @ {}", self.ty, self.text, self.span)
    }
}
