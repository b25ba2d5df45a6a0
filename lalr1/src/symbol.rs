use std::fmt;

/// A grammar symbol: either a terminal (identified by the lexer's token
/// type `T`) or a nonterminal (identified by `N`, typically a small `enum`
/// or interned name).
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Symbol<T, N> {
    Terminal(T),
    NonTerminal(N),
}

impl<T, N> Symbol<T, N> {
    pub fn is_terminal(&self) -> bool {
        matches!(self, Symbol::Terminal(_))
    }

    pub fn as_terminal(&self) -> Option<&T> {
        match self {
            Symbol::Terminal(t) => Some(t),
            Symbol::NonTerminal(_) => None,
        }
    }

    pub fn as_non_terminal(&self) -> Option<&N> {
        match self {
            Symbol::Terminal(_) => None,
            Symbol::NonTerminal(n) => Some(n),
        }
    }
}

impl<T: fmt::Display, N: fmt::Display> fmt::Display for Symbol<T, N> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Symbol::Terminal(t) => write!(f, "{t}"),
            Symbol::NonTerminal(n) => write!(f, "{n}"),
        }
    }
}

/// The state a symbol is reached *after*, in the extended grammar. The
/// distinguished `End` value marks the left-hand side of a rule whose
/// reduction leaves the parse entirely -- i.e. the start symbol of the
/// extended grammar.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum ExtState {
    End,
    State(u32),
}

impl fmt::Display for ExtState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ExtState::End => write!(f, "END"),
            ExtState::State(s) => write!(f, "{s}"),
        }
    }
}

/// A symbol annotated with the states it is reached in: `(before, symbol,
/// after)`. Used to compute FIRST/FOLLOW on a per-parser-state basis (the
/// Pager/DeRemer "extended grammar" method).
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ExtSymbol<T, N> {
    pub before: u32,
    pub symbol: Symbol<T, N>,
    pub after: ExtState,
}

impl<T, N> ExtSymbol<T, N> {
    pub fn is_terminal(&self) -> bool {
        self.symbol.is_terminal()
    }
}

impl<T: fmt::Display, N: fmt::Display> fmt::Display for ExtSymbol<T, N> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {}, {})", self.before, self.symbol, self.after)
    }
}
