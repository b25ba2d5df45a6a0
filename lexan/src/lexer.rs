use crate::error::{LexError, RuleError};
use crate::span::TextSpan;
use crate::token::{Token, CHANNEL_DEFAULT, NORMAL_MODE};
use regex::Regex;
use std::collections::BTreeMap;

/// A line-oriented source position cursor.
///
/// Mirrors the reference lexer's stream object: it exposes the current
/// line's text and a column cursor, and can only move forward a line at a
/// time, never backward within a line except via the single-token
/// [`LineStream::rewind`].
pub struct LineStream {
    lines: std::vec::IntoIter<String>,
    current: String,
    line: u32,
    column: u32,
    last_produced_end: (u32, u32),
}

impl LineStream {
    /// Builds a stream over `text`, split into lines. Each line retains its
    /// trailing newline (if any) so that line-anchored rules (e.g. an EOL
    /// token) can match it.
    pub fn new(text: &str) -> Self {
        let mut lines: Vec<String> = Vec::new();
        let mut rest = text;
        while let Some(idx) = rest.find('\n') {
            lines.push(rest[..=idx].to_string());
            rest = &rest[idx + 1..];
        }
        if !rest.is_empty() {
            lines.push(rest.to_string());
        }
        let mut lines = lines.into_iter();
        let current = lines.next().unwrap_or_default();
        Self {
            lines,
            current,
            line: 1,
            column: 0,
            last_produced_end: (1, 0),
        }
    }

    fn advance_line(&mut self) -> bool {
        match self.lines.next() {
            Some(line) => {
                self.current = line;
                self.line += 1;
                self.column = 0;
                true
            }
            None => false,
        }
    }

    /// Ensures at least one character remains on the current line, rolling
    /// over to the next line if necessary. Returns `false` once the stream
    /// is fully exhausted.
    fn assure_line(&mut self) -> bool {
        if self.column < self.current.len() {
            return true;
        }
        loop {
            if !self.advance_line() {
                return false;
            }
            if self.column < self.current.len() {
                return true;
            }
        }
    }

    fn here(&self) -> TextSpan {
        TextSpan::point(self.line, self.column as u32)
    }

    fn try_match(&self, re: &Regex) -> Option<regex::Match<'_>> {
        let tail = &self.current[self.column..];
        let m = re.find(tail)?;
        if m.start() == 0 {
            Some(m)
        } else {
            None
        }
    }

    /// Rewinds by exactly one token.
    ///
    /// Only legal immediately after the [`Lexer`] call that produced `token`
    /// -- i.e. the stream must not have moved since. This is how the parser
    /// runtime peeks a hidden-channel token and hands it back to an
    /// auxiliary parser.
    pub fn rewind<T>(&mut self, token: &Token<T>) {
        let end = token.span().end();
        assert_eq!(
            end,
            (self.line, self.column as u32),
            "rewind called on a token that was not the most recently produced"
        );
        self.column = token.span().start_col() as usize;
    }
}

struct CompiledRule<T> {
    regex: Regex,
    ty: T,
    channel: i32,
}

/// A regex lexer configured with per-mode rule sets.
///
/// Rules are grouped by `mode`; within a mode they are tried in declaration
/// order and the first match at the current column wins.
pub struct Lexer<T> {
    mode_rules: BTreeMap<u32, Vec<CompiledRule<T>>>,
}

impl<T: Clone> Lexer<T> {
    /// `rules` is `(mode, pattern, token_type, channel)`. Mode defaults to
    /// [`NORMAL_MODE`] and channel to [`CHANNEL_DEFAULT`] via the
    /// convenience constructors below; this one takes the fully specified
    /// tuple form used internally and by multi-mode grammars.
    pub fn new(rules: &[(u32, &str, T, i32)]) -> Result<Self, RuleError> {
        let mut mode_rules: BTreeMap<u32, Vec<CompiledRule<T>>> = BTreeMap::new();
        let mut seen_patterns: BTreeMap<(u32, String), ()> = BTreeMap::new();
        for (mode, pattern, ty, channel) in rules {
            if pattern.is_empty() {
                return Err(RuleError::EmptyPattern { mode: *mode });
            }
            let key = (*mode, pattern.to_string());
            if seen_patterns.insert(key.clone(), ()).is_some() {
                return Err(RuleError::DuplicatePattern {
                    mode: *mode,
                    pattern: pattern.to_string(),
                });
            }
            let regex = Regex::new(pattern)?;
            mode_rules.entry(*mode).or_default().push(CompiledRule {
                regex,
                ty: ty.clone(),
                channel: *channel,
            });
        }
        Ok(Self { mode_rules })
    }

    /// Convenience constructor for single-mode, default-channel grammars.
    pub fn single_mode(rules: &[(&str, T)]) -> Result<Self, RuleError> {
        let tagged: Vec<(u32, &str, T, i32)> = rules
            .iter()
            .map(|(pattern, ty)| (NORMAL_MODE, *pattern, ty.clone(), CHANNEL_DEFAULT))
            .collect();
        Self::new(&tagged)
    }

    /// Matches one token at the stream's current position in `mode`.
    ///
    /// Returns the synthetic EOF token (tagged `eof_ty`, on the all-channel)
    /// once the stream is exhausted. A fatal [`LexError`] is raised if the
    /// stream is not exhausted but no rule in `mode` matches.
    pub fn next_token(&self, stream: &mut LineStream, mode: u32, eof_ty: T) -> Result<Token<T>, LexError> {
        if !stream.assure_line() {
            return Ok(Token::eof(eof_ty, stream.here()));
        }
        let empty = Vec::new();
        let candidates = self.mode_rules.get(&mode).unwrap_or(&empty);
        for rule in candidates {
            if let Some(m) = stream.try_match(&rule.regex) {
                let start_col = stream.column as u32;
                let text = m.as_str().to_string();
                stream.column += m.end();
                let span = TextSpan::new(stream.line, start_col, stream.line, stream.column as u32);
                stream.last_produced_end = span.end();
                return Ok(Token::new(rule.ty.clone(), text, rule.channel, span));
            }
        }
        Err(LexError {
            position: stream.here(),
            mode,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    enum Tok {
        Num,
        Plus,
        Eof,
    }

    #[test]
    fn first_match_in_mode_wins_and_advances() {
        let lexer = Lexer::single_mode(&[(r"[0-9]+", Tok::Num), (r"\+", Tok::Plus)]).unwrap();
        let mut stream = LineStream::new("12+3");
        let t1 = lexer.next_token(&mut stream, NORMAL_MODE, Tok::Eof).unwrap();
        assert_eq!(*t1.tag(), Tok::Num);
        assert_eq!(t1.lexeme(), "12");
        let t2 = lexer.next_token(&mut stream, NORMAL_MODE, Tok::Eof).unwrap();
        assert_eq!(*t2.tag(), Tok::Plus);
        let t3 = lexer.next_token(&mut stream, NORMAL_MODE, Tok::Eof).unwrap();
        assert_eq!(*t3.tag(), Tok::Num);
        assert_eq!(t3.lexeme(), "3");
    }

    #[test]
    fn exhausted_stream_yields_eof() {
        let lexer = Lexer::single_mode(&[(r"[0-9]+", Tok::Num)]).unwrap();
        let mut stream = LineStream::new("");
        let t = lexer.next_token(&mut stream, NORMAL_MODE, Tok::Eof).unwrap();
        assert_eq!(*t.tag(), Tok::Eof);
    }

    #[test]
    fn unmatched_input_is_fatal() {
        let lexer = Lexer::single_mode(&[(r"[0-9]+", Tok::Num)]).unwrap();
        let mut stream = LineStream::new("abc");
        assert!(lexer.next_token(&mut stream, NORMAL_MODE, Tok::Eof).is_err());
    }

    #[test]
    fn rewind_restores_column() {
        let lexer = Lexer::single_mode(&[(r"[0-9]+", Tok::Num), (r"\+", Tok::Plus)]).unwrap();
        let mut stream = LineStream::new("1+2");
        let t1 = lexer.next_token(&mut stream, NORMAL_MODE, Tok::Eof).unwrap();
        let t2 = lexer.next_token(&mut stream, NORMAL_MODE, Tok::Eof).unwrap();
        stream.rewind(&t2);
        let t2_again = lexer.next_token(&mut stream, NORMAL_MODE, Tok::Eof).unwrap();
        assert_eq!(t2.lexeme(), t2_again.lexeme());
        assert_eq!(t1.lexeme(), "1");
    }

    #[test]
    fn duplicate_pattern_in_same_mode_rejected() {
        let err = Lexer::single_mode(&[(r"[0-9]+", Tok::Num), (r"[0-9]+", Tok::Plus)]);
        assert!(err.is_err());
    }
}
