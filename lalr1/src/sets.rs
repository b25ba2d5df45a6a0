use crate::rule::Rule;
use crate::symbol::ExtSymbol;
use std::collections::{BTreeMap, BTreeSet};
use std::fmt::Debug;

/// A member of a FIRST set: either a concrete terminal, or the empty-string
/// marker (a rule with an empty right-hand side contributes `Empty` to its
/// left-hand side's FIRST set).
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
pub enum FirstItem<T> {
    Terminal(T),
    Empty,
}

/// The grammar whose symbols are `(state_before, symbol, state_after)`
/// triples, built from the base grammar's translation table. FIRST/FOLLOW
/// are computed over this grammar, on a per-parser-state basis.
pub struct ExtendedGrammar<T, N> {
    pub rules: Vec<Rule<ExtSymbol<T, N>>>,
    pub start_symbol: ExtSymbol<T, N>,
    pub end_symbols: Vec<T>,
}

/// Bounds the FIRST/FOLLOW fixed-point loops so a malformed grammar cannot
/// hang the process; real grammars converge in far fewer cycles than this
/// (the count is bounded by the longest nonterminal dependency chain, per
/// the Pager/DeRemer extended-grammar method).
const MAX_FIXED_POINT_ITERATIONS: usize = 100_000;

impl<T, N> ExtendedGrammar<T, N>
where
    T: Clone + Ord + Debug,
    N: Clone + Ord + Debug,
{
    fn symbols(&self) -> BTreeSet<ExtSymbol<T, N>> {
        let mut out = BTreeSet::new();
        for rule in &self.rules {
            out.insert(rule.lhs.clone());
            out.extend(rule.rhs.iter().cloned());
        }
        out
    }

    /// Builds FIRST sets by fixed-point iteration (the Pager/DeRemer extended-grammar method).
    pub fn build_firstsets(&self) -> BTreeMap<ExtSymbol<T, N>, BTreeSet<FirstItem<T>>> {
        let mut firsts: BTreeMap<ExtSymbol<T, N>, BTreeSet<FirstItem<T>>> = BTreeMap::new();
        for sym in self.symbols() {
            let set = if sym.is_terminal() {
                let t = sym.symbol.as_terminal().expect("terminal symbol").clone();
                [FirstItem::Terminal(t)].into_iter().collect()
            } else {
                BTreeSet::new()
            };
            firsts.insert(sym, set);
        }

        let mut nonzero_rules = Vec::new();
        for rule in &self.rules {
            if rule.rhs.is_empty() {
                firsts.get_mut(&rule.lhs).unwrap().insert(FirstItem::Empty);
            } else if rule.rhs[0].is_terminal() {
                let first_of_head = firsts[&rule.rhs[0]].clone();
                firsts.get_mut(&rule.lhs).unwrap().extend(first_of_head);
            } else {
                nonzero_rules.push(rule);
            }
        }

        let mut iterations = 0;
        loop {
            iterations += 1;
            assert!(
                iterations <= MAX_FIXED_POINT_ITERATIONS,
                "FIRST set computation did not converge; grammar is malformed"
            );
            let mut updated = false;
            for rule in &nonzero_rules {
                let before = firsts[&rule.lhs].len();
                let mut all_empty = true;
                for symbol in &rule.rhs {
                    let symbol_first = firsts[symbol].clone();
                    let symbol_has_empty = symbol_first.contains(&FirstItem::Empty);
                    let without_empty = symbol_first
                        .iter()
                        .filter(|item| **item != FirstItem::Empty)
                        .cloned();
                    firsts.get_mut(&rule.lhs).unwrap().extend(without_empty);
                    if !symbol_has_empty {
                        all_empty = false;
                        break;
                    }
                }
                if all_empty {
                    firsts.get_mut(&rule.lhs).unwrap().insert(FirstItem::Empty);
                }
                if firsts[&rule.lhs].len() > before {
                    updated = true;
                }
            }
            if !updated {
                break;
            }
        }
        log::debug!("built FIRST sets in {iterations} cycles");
        firsts
    }

    /// Builds FOLLOW sets by fixed-point iteration (the Pager/DeRemer extended-grammar method).
    pub fn build_followsets(
        &self,
        firsts: &BTreeMap<ExtSymbol<T, N>, BTreeSet<FirstItem<T>>>,
    ) -> BTreeMap<ExtSymbol<T, N>, BTreeSet<T>> {
        let mut follows: BTreeMap<ExtSymbol<T, N>, BTreeSet<T>> = BTreeMap::new();
        for sym in self.symbols() {
            let set = if sym == self.start_symbol {
                self.end_symbols.iter().cloned().collect()
            } else {
                BTreeSet::new()
            };
            follows.insert(sym, set);
        }

        for rule in &self.rules {
            for k in 0..rule.rhs.len().saturating_sub(1) {
                if !rule.rhs[k].is_terminal() {
                    let next_first: BTreeSet<T> = firsts[&rule.rhs[k + 1]]
                        .iter()
                        .filter_map(|item| match item {
                            FirstItem::Terminal(t) => Some(t.clone()),
                            FirstItem::Empty => None,
                        })
                        .collect();
                    follows.get_mut(&rule.rhs[k]).unwrap().extend(next_first);
                }
            }
        }

        let mut iterations = 0;
        loop {
            iterations += 1;
            assert!(
                iterations <= MAX_FIXED_POINT_ITERATIONS,
                "FOLLOW set computation did not converge; grammar is malformed"
            );
            let mut updated = false;
            for rule in &self.rules {
                let Some(last) = rule.rhs.last() else {
                    continue;
                };
                if !last.is_terminal() {
                    let before = follows[last].len();
                    let lhs_follow = follows[&rule.lhs].clone();
                    follows.get_mut(last).unwrap().extend(lhs_follow);
                    if follows[last].len() > before {
                        updated = true;
                    }
                }
            }
            if !updated {
                break;
            }
        }
        log::debug!("built FOLLOW sets in {iterations} cycles");
        follows
    }
}
