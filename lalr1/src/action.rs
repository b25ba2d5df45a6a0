use std::fmt;

/// An entry of the action/goto table: `Shift`/`Reduce`/`Accept` for
/// terminal lookaheads, `Goto` for nonterminals after a reduction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action<N> {
    Shift(u32),
    Reduce(N, usize),
    Accept,
    Goto(u32),
}

impl<N: fmt::Display> fmt::Display for Action<N> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Action::Shift(s) => write!(f, "shift {s}"),
            Action::Reduce(lhs, n) => write!(f, "reduce {lhs} ({n})"),
            Action::Accept => write!(f, "accept"),
            Action::Goto(s) => write!(f, "goto {s}"),
        }
    }
}
