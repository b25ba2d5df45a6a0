use crate::action::Action;
use crate::error::GeneratorError;
use crate::grammar::Grammar;
use crate::parser::Parser;
use crate::rule::Rule;
use crate::symbol::{ExtState, Symbol};
use crate::table::TranslationTable;
use std::collections::BTreeMap;
use std::fmt::{Debug, Display};

/// Builds a [`Parser`] from `grammar`, resolving shift/reduce conflicts by
/// precedence/associativity and reduce/reduce conflicts by raising a
/// [`GeneratorError`]. `hidden` supplies one auxiliary grammar per
/// hidden channel (e.g. a comment grammar on a dedicated channel); each is
/// built recursively, on its own channel.
pub fn build_parser<T, N>(
    grammar: &Grammar<T, N>,
    hidden: BTreeMap<i32, Grammar<T, N>>,
    channel: i32,
) -> Result<Parser<T, N>, GeneratorError<T, N>>
where
    T: Clone + Ord + Debug + Display,
    N: Clone + Ord + Debug + Display,
{
    log::debug!("grammar has {} rules", grammar.rules.len());
    let table = TranslationTable::build(grammar)?;
    let extended = table.build_extended_grammar(&grammar.end_symbols);
    let modes = table.build_modes()?;
    let firsts = extended.build_firstsets();
    let followsets = extended.build_followsets(&firsts);

    let mut agtable: BTreeMap<(u32, Symbol<T, N>), Action<N>> = BTreeMap::new();
    for ((from, symbol), to) in &table.transitions {
        let action = if symbol.is_terminal() {
            Action::Shift(*to)
        } else {
            Action::Goto(*to)
        };
        agtable.insert((*from, symbol.clone()), action);
    }

    let num_states = table.itemsets.len();
    let mut finalset_rules: Vec<Option<Rule<Symbol<T, N>>>> = vec![None; num_states];
    let mut finalset_followsets: Vec<std::collections::BTreeSet<T>> =
        vec![Default::default(); num_states];

    for rule in &extended.rules {
        let final_state = match rule.rhs.last() {
            Some(last) => match last.after {
                ExtState::State(s) => s,
                ExtState::End => unreachable!("only a rule's lhs may terminate at END"),
            },
            None => rule.lhs.before,
        };
        let parent = rule.parent();
        match &finalset_rules[final_state as usize] {
            Some(existing) if existing != &parent => {
                return Err(GeneratorError::ReduceReduce {
                    state: final_state,
                    existing: existing.clone(),
                    incoming: parent,
                })
            }
            _ => finalset_rules[final_state as usize] = Some(parent),
        }
        if let Some(followset) = followsets.get(&rule.lhs) {
            finalset_followsets[final_state as usize].extend(followset.iter().cloned());
        }
    }

    for (state, followset) in finalset_followsets.into_iter().enumerate() {
        let state = state as u32;
        let Some(parent) = finalset_rules[state as usize].clone() else {
            continue;
        };
        for symbol in followset {
            let key = (state, Symbol::Terminal(symbol.clone()));
            if let Some(existing) = agtable.get(&key) {
                if let Action::Shift(shift_target) = existing {
                    let partials: Vec<_> = table.itemsets[*shift_target as usize]
                        .iter()
                        .filter(|item| item.pointer.unwrap_or(0) > 0)
                        .collect();
                    if partials.len() != 1 {
                        return Err(GeneratorError::AmbiguousShiftTarget(
                            *shift_target,
                            partials.len(),
                        ));
                    }
                    let shift_rule = partials[0];
                    let (shift_prec, reduce_prec) = match (shift_rule.precedence, parent.precedence) {
                        (Some(sp), Some(rp)) => (sp, rp),
                        _ => {
                            return Err(GeneratorError::ShiftReduce {
                                state,
                                symbol: Symbol::Terminal(symbol),
                                shift_rule: shift_rule.as_production(),
                                reduce_rule: parent,
                            })
                        }
                    };
                    let keep_shift =
                        shift_prec > reduce_prec || (shift_prec == reduce_prec && shift_rule.right_associative);
                    if keep_shift {
                        continue;
                    }
                }
            }

            let is_accept =
                parent.lhs.as_non_terminal() == Some(&grammar.start_symbol) && grammar.end_symbols.contains(&symbol);
            let action = if is_accept {
                Action::Accept
            } else {
                Action::Reduce(
                    parent
                        .lhs
                        .as_non_terminal()
                        .expect("reduction lhs is a nonterminal")
                        .clone(),
                    parent.rhs.len(),
                )
            };
            agtable.insert(key, action);
        }
    }

    let hidden_parsers = hidden
        .into_iter()
        .map(|(chan, aux_grammar)| {
            let parser = build_parser(&aux_grammar, BTreeMap::new(), chan)?;
            Ok((chan, Box::new(parser)))
        })
        .collect::<Result<BTreeMap<_, _>, GeneratorError<T, N>>>()?;

    log::debug!(
        "built action/goto table ({} entries) over {} states",
        agtable.len(),
        num_states
    );
    Ok(Parser::new(agtable, modes, hidden_parsers, channel))
}
