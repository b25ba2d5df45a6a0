use crate::rule::Rule;
use crate::symbol::Symbol;
use std::fmt::{self, Debug, Display};
use thiserror::Error;

/// A grammar defect discovered while building the action/goto tables.
/// Fatal at table-build time; none of these are recoverable by the caller
/// other than by fixing the grammar.
#[derive(Debug, Error)]
pub enum GeneratorError<T: Debug + Display, N: Debug + Display> {
    #[error("grammar has no starting rule for start symbol {0}")]
    NoStartRule(N),
    #[error("grammar has {1} starting rules for start symbol {0}, expected exactly one")]
    MultipleStartRules(N, usize),
    #[error("starting rule {0} must have exactly one right-hand-side symbol")]
    StartRuleShape(Rule<Symbol<T, N>>),
    #[error("state {state} mixes lexer modes {modes:?} among its partially applied items")]
    ModeConflict { state: u32, modes: Vec<u32> },
    #[error("reduce/reduce conflict at state {state} between {existing} and {incoming}")]
    ReduceReduce {
        state: u32,
        existing: Rule<Symbol<T, N>>,
        incoming: Rule<Symbol<T, N>>,
    },
    #[error(
        "shift/reduce conflict at state {state} on {symbol}: neither {shift_rule} nor \
         {reduce_rule} carries the precedence needed to resolve it"
    )]
    ShiftReduce {
        state: u32,
        symbol: Symbol<T, N>,
        shift_rule: Rule<Symbol<T, N>>,
        reduce_rule: Rule<Symbol<T, N>>,
    },
    #[error("state {0} has {1} partially applied items eligible to shift; expected exactly one")]
    AmbiguousShiftTarget(u32, usize),
}

/// A fatal parse-time error: the lookahead token was not accepted from the
/// current state. Lists every token acceptable from that state.
#[derive(Debug)]
pub struct ParseError<T> {
    pub found: lexan::Token<T>,
    pub expected: Vec<T>,
}

impl<T> ParseError<T> {
    pub fn new(found: lexan::Token<T>, expected: Vec<T>) -> Self {
        Self { found, expected }
    }
}

impl<T: Display> fmt::Display for ParseError<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unexpected token {}; expected one of: ", self.found)?;
        for (i, t) in self.expected.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{t}")?;
        }
        Ok(())
    }
}

impl<T: Debug + Display> std::error::Error for ParseError<T> {}

/// The union of errors that can surface from a single parse invocation:
/// the lexer failing to match (fatal), or the parser rejecting the
/// lookahead (fatal). Both abort the current parse.
#[derive(Debug, Error)]
pub enum Error<T: Debug + Display> {
    #[error(transparent)]
    Lex(#[from] lexan::LexError),
    #[error(transparent)]
    Parse(#[from] ParseError<T>),
}
