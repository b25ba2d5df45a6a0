use crate::action::Action;
use crate::error::Error;
use crate::symbol::Symbol;
use lexan::{LineStream, TextSpan, Token};
use std::collections::BTreeMap;
use std::fmt::{Debug, Display};

/// One reduction's completed children: either a shifted token, or a node
/// produced by an earlier reduction. Handed to the caller's `make_node`
/// callback in right-hand-side order.
#[derive(Debug)]
pub enum Child<T, Node> {
    Token(Token<T>),
    Node(Node),
}

/// A caller-supplied function matching `(stream, mode) -> Token`: the
/// lexer call the parser drives with whatever mode the current state
/// demands from the current parser state.
pub type NextToken<'a, T> = dyn FnMut(&mut LineStream, u32) -> Result<Token<T>, lexan::LexError> + 'a;

/// A caller-supplied reduction callback: given a reduced rule's
/// nonterminal, its covering span, its children in order, and the lexer
/// mode of the resulting state, produces the caller's node type.
pub type MakeNode<'a, T, N, Node> = dyn FnMut(N, TextSpan, Vec<Child<T, Node>>, u32) -> Node + 'a;

/// A runtime LALR(1) parser: an action/goto table plus, for each state, the
/// lexer mode that state's lookahead must be read in, and one auxiliary
/// parser per hidden channel.
pub struct Parser<T, N> {
    agtable: BTreeMap<(u32, Symbol<T, N>), Action<N>>,
    modes: Vec<u32>,
    hidden: BTreeMap<i32, Box<Parser<T, N>>>,
    channel: i32,
}

impl<T, N> Parser<T, N>
where
    T: Clone + Ord + Debug + Display,
    N: Clone + Ord + Debug + Display,
{
    pub fn new(
        agtable: BTreeMap<(u32, Symbol<T, N>), Action<N>>,
        modes: Vec<u32>,
        hidden: BTreeMap<i32, Box<Parser<T, N>>>,
        channel: i32,
    ) -> Self {
        Self {
            agtable,
            modes,
            hidden,
            channel,
        }
    }

    /// Reads the next lookahead visible on this parser's channel, running
    /// an auxiliary parser to completion (and discarding its result) over
    /// any hidden-channel tokens encountered first.
    ///
    /// A token on a channel this parser neither reads itself nor has a
    /// registered auxiliary grammar for is not this parser's to consume --
    /// it belongs to whichever enclosing parser invoked us. Rewind it and
    /// hand it back as the current lookahead instead of delegating, so an
    /// auxiliary parse only ever advances the stream over tokens on its
    /// own channel: the enclosing parser re-reads the same token once this
    /// call returns.
    fn next_token_skip_hidden(
        &self,
        stream: &mut LineStream,
        next_token: &mut NextToken<'_, T>,
        state: u32,
    ) -> Result<Token<T>, Error<T>> {
        loop {
            let candidate = next_token(stream, self.modes[state as usize])?;
            if candidate.visible_on(self.channel) {
                return Ok(candidate);
            }
            match self.hidden.get(&candidate.channel()) {
                Some(hidden_parser) => {
                    stream.rewind(&candidate);
                    hidden_parser.parse(stream, next_token, &mut |_, _, _, _| ())?;
                }
                None => {
                    stream.rewind(&candidate);
                    return Ok(candidate);
                }
            }
        }
    }

    /// Drives the parse to completion, returning the root node the caller's
    /// `make_node` callback builds on accepting. `next_token` supplies each
    /// lookahead; `make_node` turns each reduction into a `Node`.
    pub fn parse<Node>(
        &self,
        stream: &mut LineStream,
        next_token: &mut NextToken<'_, T>,
        make_node: &mut MakeNode<'_, T, N, Node>,
    ) -> Result<Node, Error<T>> {
        let mut state_stack: Vec<u32> = vec![0];
        let mut output: Vec<(Child<T, Node>, TextSpan)> = Vec::new();
        let mut lookahead = self.next_token_skip_hidden(stream, next_token, 0)?;

        loop {
            let state = *state_stack.last().expect("state stack is never empty");
            let key = (state, Symbol::Terminal(lookahead.tag().clone()));
            let action = match self.agtable.get(&key) {
                Some(action) => action,
                None => {
                    let expected = self
                        .agtable
                        .keys()
                        .filter(|(s, sym)| *s == state && sym.is_terminal())
                        .filter_map(|(_, sym)| sym.as_terminal().cloned())
                        .collect();
                    return Err(crate::error::ParseError::new(lookahead, expected).into());
                }
            };

            match action.clone() {
                Action::Shift(next_state) => {
                    output.push((Child::Token(lookahead.clone()), lookahead.span()));
                    state_stack.push(next_state);
                    lookahead = self.next_token_skip_hidden(stream, next_token, next_state)?;
                }
                Action::Accept => {
                    let (child, _) = output.pop().expect("accepting parse has exactly one root");
                    return Ok(match child {
                        Child::Node(node) => node,
                        Child::Token(_) => panic!("accepting parse's root must be a reduction"),
                    });
                }
                Action::Reduce(lhs, arity) => {
                    let span = if arity == 0 {
                        let start = output
                            .last()
                            .map(|(_, span)| span.end())
                            .unwrap_or_else(|| lookahead.span().start());
                        let end = lookahead.span().start();
                        TextSpan::new(start.0, start.1, end.0, end.1)
                    } else {
                        TextSpan::cover(output[output.len() - arity..].iter().map(|(_, span)| *span))
                    };
                    let children: Vec<Child<T, Node>> = output
                        .split_off(output.len() - arity)
                        .into_iter()
                        .map(|(child, _)| child)
                        .collect();
                    state_stack.truncate(state_stack.len() - arity);

                    let prior_state = *state_stack.last().expect("state stack is never empty");
                    let goto_key = (prior_state, Symbol::NonTerminal(lhs.clone()));
                    let goto_state = match self.agtable.get(&goto_key) {
                        Some(Action::Goto(s)) => *s,
                        _ => panic!("missing goto entry for {lhs} from state {prior_state}"),
                    };
                    state_stack.push(goto_state);

                    let mode = self.modes[goto_state as usize];
                    let node = make_node(lhs, span, children, mode);
                    output.push((Child::Node(node), span));
                }
                Action::Goto(_) => unreachable!("goto actions are never keyed by a terminal"),
            }
        }
    }
}
