use crate::rule::Rule;
use crate::symbol::Symbol;
use std::collections::BTreeSet;

/// An LR(0) item set (parser state): a set of rules-with-dot, closed under
/// "if a dot precedes nonterminal N, every rule producing N at pointer 0 is
/// in the set".
pub type Items<T, N> = BTreeSet<Rule<Symbol<T, N>>>;

/// Closes `seed` over `productions` (the grammar's plain, pointer-less
/// rules).
pub fn close<T, N>(mut seed: Items<T, N>, productions: &[Rule<Symbol<T, N>>]) -> Items<T, N>
where
    T: Clone + Ord,
    N: Clone + Ord,
{
    loop {
        let before = seed.len();
        let nexts: BTreeSet<N> = seed
            .iter()
            .filter_map(|item| item.next_symbol())
            .filter_map(|sym| sym.as_non_terminal())
            .cloned()
            .collect();
        for production in productions {
            if let Symbol::NonTerminal(lhs) = &production.lhs {
                if nexts.contains(lhs) {
                    seed.insert(production.at_pointer(0));
                }
            }
        }
        if seed.len() == before {
            return seed;
        }
    }
}

/// The symbols that can be shifted/goto'd out of `items`.
pub fn next_symbols<T, N>(items: &Items<T, N>) -> BTreeSet<Symbol<T, N>>
where
    T: Clone + Ord,
    N: Clone + Ord,
{
    items.iter().filter_map(|item| item.next_symbol()).cloned().collect()
}

/// The kernel reached by advancing `items` over `symbol` -- the items that
/// can shift on `symbol`, each advanced by one position. This is the
/// dedup key used by state enumeration, *before* closure.
pub fn advance<T, N>(items: &Items<T, N>, symbol: &Symbol<T, N>) -> Items<T, N>
where
    T: Clone + Ord,
    N: Clone + Ord,
{
    items
        .iter()
        .filter(|item| item.next_symbol() == Some(symbol))
        .map(|item| item.advanced())
        .collect()
}
