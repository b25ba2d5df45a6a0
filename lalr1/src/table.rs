use crate::error::GeneratorError;
use crate::grammar::Grammar;
use crate::itemset::{self, Items};
use crate::rule::Rule;
use crate::sets::ExtendedGrammar;
use crate::symbol::{ExtState, ExtSymbol, Symbol};
use std::collections::BTreeMap;
use std::fmt::{Debug, Display};

/// The LR(0) item-set automaton: one closed item set per state, plus the
/// `(state, symbol) -> state` transitions discovered while enumerating
/// them.
pub struct TranslationTable<T, N> {
    pub itemsets: Vec<Items<T, N>>,
    pub transitions: BTreeMap<(u32, Symbol<T, N>), u32>,
}

impl<T, N> TranslationTable<T, N>
where
    T: Clone + Ord + Debug + Display,
    N: Clone + Ord + Debug + Display,
{
    /// Builds the automaton, starting from the closure of `{start_rule @
    /// 0}` and worklist-enumerating states by advancing over every next
    /// symbol, deduplicating by kernel.
    pub fn build(grammar: &Grammar<T, N>) -> Result<Self, GeneratorError<T, N>> {
        let start_idx = grammar.find_starting_rule_index()?;
        let start_item = grammar.rules[start_idx].at_pointer(0);
        let start_kernel: Items<T, N> = [start_item].into_iter().collect();

        let mut itemsets: Vec<Items<T, N>> = vec![itemset::close(start_kernel.clone(), &grammar.rules)];
        let mut kernel_index: BTreeMap<Items<T, N>, u32> = BTreeMap::new();
        kernel_index.insert(start_kernel, 0);

        let mut transitions = BTreeMap::new();
        let mut current = 0usize;
        while current < itemsets.len() {
            let symbols = itemset::next_symbols(&itemsets[current]);
            for symbol in symbols {
                let kernel = itemset::advance(&itemsets[current], &symbol);
                let state = if let Some(&existing) = kernel_index.get(&kernel) {
                    existing
                } else {
                    let new_state = itemsets.len() as u32;
                    itemsets.push(itemset::close(kernel.clone(), &grammar.rules));
                    kernel_index.insert(kernel, new_state);
                    new_state
                };
                transitions.insert((current as u32, symbol), state);
            }
            current += 1;
        }

        log::debug!("built {} item sets", itemsets.len());
        Ok(Self { itemsets, transitions })
    }

    /// Builds the extended grammar: every rule's symbols annotated with the
    /// state reached before and after them.
    pub fn build_extended_grammar(&self, end_symbols: &[T]) -> ExtendedGrammar<T, N> {
        let mut rules = Vec::new();
        let mut start_symbol = None;

        for (current, itemset) in self.itemsets.iter().enumerate() {
            let current = current as u32;
            for item in itemset {
                if item.pointer != Some(0) {
                    continue;
                }
                let mut state = current;
                let mut rhs = Vec::with_capacity(item.rhs.len());
                for symbol in &item.rhs {
                    let prev = state;
                    state = self.transitions[&(state, symbol.clone())];
                    rhs.push(ExtSymbol {
                        before: prev,
                        symbol: symbol.clone(),
                        after: ExtState::State(state),
                    });
                }
                let lhs_after = match item.lhs.as_non_terminal() {
                    Some(n) => self
                        .transitions
                        .get(&(current, item.lhs.clone()))
                        .copied()
                        .map(ExtState::State)
                        .unwrap_or(ExtState::End),
                    None => unreachable!("rule lhs is always a nonterminal"),
                };
                let lhs = ExtSymbol {
                    before: current,
                    symbol: item.lhs.clone(),
                    after: lhs_after,
                };
                if lhs_after == ExtState::End {
                    start_symbol = Some(lhs.clone());
                }
                rules.push(Rule {
                    lhs,
                    rhs,
                    precedence: item.precedence,
                    right_associative: item.right_associative,
                    mode: item.mode,
                    pointer: None,
                });
            }
        }

        log::debug!("built extended grammar with {} rules", rules.len());
        ExtendedGrammar {
            start_symbol: start_symbol.expect("grammar has no accepting rule"),
            end_symbols: end_symbols.to_vec(),
            rules,
        }
    }

    /// Tags each state with the lexer mode of the items partially applied
    /// within it (pointer > 0); states with no partial items use the
    /// default (normal) mode. A state mixing more than one mode among its
    /// partials is a grammar-authoring error.
    pub fn build_modes(&self) -> Result<Vec<u32>, GeneratorError<T, N>> {
        let mut modes = Vec::with_capacity(self.itemsets.len());
        for (state, itemset) in self.itemsets.iter().enumerate() {
            let mut seen: Vec<u32> = itemset
                .iter()
                .filter(|item| item.pointer.unwrap_or(0) > 0)
                .map(|item| item.mode)
                .collect();
            seen.sort_unstable();
            seen.dedup();
            match seen.len() {
                0 => modes.push(lexan::NORMAL_MODE),
                1 => modes.push(seen[0]),
                _ => {
                    return Err(GeneratorError::ModeConflict {
                        state: state as u32,
                        modes: seen,
                    })
                }
            }
        }
        Ok(modes)
    }
}
