use crate::ast::{AstNode, Kind};
use crate::error::PatternError;
use lexan::TextSpan;
use std::collections::BTreeMap;

/// A declarative match pattern over a node or a run of sibling nodes.
#[derive(Debug, Clone)]
pub enum Pattern {
    /// Matches exactly one node of any kind, capturing it whole under
    /// `var`; `with_children` is matched against that node's own
    /// children.
    AnyNode {
        var: String,
        with_children: Vec<Pattern>,
    },
    /// Greedily matches a run of zero or more consecutive siblings whose
    /// kind is not in `exclude`, capturing the run under `var`.
    ZeroOrMoreNodes { var: String, exclude: Vec<Kind> },
    /// Matches exactly one node of the given `kind`, capturing its
    /// position under `var_pos` and matching `children` against its
    /// children.
    Node {
        kind: Kind,
        var_pos: String,
        children: Vec<Pattern>,
    },
}

/// What a pattern variable captured.
#[derive(Debug, Clone)]
pub enum Binding {
    Node(AstNode),
    Position(TextSpan),
    Sequence(Vec<AstNode>),
}

/// The variable bindings produced by a successful match.
#[derive(Debug, Clone, Default)]
pub struct Bindings(BTreeMap<String, Binding>);

impl Bindings {
    pub fn node(&self, var: &str) -> Result<&AstNode, PatternError> {
        match self.0.get(var) {
            Some(Binding::Node(n)) => Ok(n),
            Some(_) => Err(PatternError::WrongCaptureKind(var.to_string())),
            None => Err(PatternError::UnboundVariable(var.to_string())),
        }
    }

    pub fn position(&self, var: &str) -> Result<TextSpan, PatternError> {
        match self.0.get(var) {
            Some(Binding::Position(p)) => Ok(*p),
            Some(_) => Err(PatternError::WrongCaptureKind(var.to_string())),
            None => Err(PatternError::UnboundVariable(var.to_string())),
        }
    }

    pub fn sequence(&self, var: &str) -> Result<&[AstNode], PatternError> {
        match self.0.get(var) {
            Some(Binding::Sequence(s)) => Ok(s),
            Some(_) => Err(PatternError::WrongCaptureKind(var.to_string())),
            None => Err(PatternError::UnboundVariable(var.to_string())),
        }
    }
}

/// Matches `patterns` against the sibling sequence `nodes`, backtracking
/// over how much a `ZeroOrMoreNodes` run consumes so that patterns
/// following it can still match.
fn match_seq(patterns: &[Pattern], nodes: &[AstNode]) -> Option<BTreeMap<String, Binding>> {
    let Some((head, rest_patterns)) = patterns.split_first() else {
        return if nodes.is_empty() {
            Some(BTreeMap::new())
        } else {
            None
        };
    };

    match head {
        Pattern::ZeroOrMoreNodes { var, exclude } => {
            let mut max_len = 0;
            while max_len < nodes.len() && !exclude.contains(&nodes[max_len].kind) {
                max_len += 1;
            }
            for len in (0..=max_len).rev() {
                if let Some(mut bindings) = match_seq(rest_patterns, &nodes[len..]) {
                    bindings.insert(var.clone(), Binding::Sequence(nodes[..len].to_vec()));
                    return Some(bindings);
                }
            }
            None
        }
        Pattern::Node {
            kind,
            var_pos,
            children,
        } => {
            let (first, tail) = nodes.split_first()?;
            if first.kind != *kind {
                return None;
            }
            let mut inner = match_seq(children, &first.children)?;
            let mut bindings = match_seq(rest_patterns, tail)?;
            inner.insert(var_pos.clone(), Binding::Position(first.position));
            inner.append(&mut bindings);
            Some(inner)
        }
        Pattern::AnyNode { var, with_children } => {
            let (first, tail) = nodes.split_first()?;
            let mut inner = match_seq(with_children, &first.children)?;
            let mut bindings = match_seq(rest_patterns, tail)?;
            inner.insert(var.clone(), Binding::Node(first.clone()));
            inner.append(&mut bindings);
            Some(inner)
        }
    }
}

/// Traversal order for [`PatternTransform::rewrite`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Order {
    /// Children are rewritten before their parent is tried against the
    /// pattern.
    Ascending,
    /// The parent is tried against the pattern first; if it rewrites,
    /// the *replacement's* children are then traversed -- required when
    /// a rewrite introduces a new structural scope that should itself be
    /// subject to further rewrites.
    Descending,
}

/// A single declarative tree rewrite: a whole-node pattern (matched
/// against the node's own children, the node itself captured as a
/// variable of the match) plus a transform over the resulting bindings.
///
/// `transform_attrs = false` restricts matching to `children` lists;
/// this is the only mode implemented here, matching every user in this
/// crate.
pub trait PatternTransform {
    fn pattern(&self) -> Pattern;
    fn transform(&mut self, bindings: &Bindings) -> Result<AstNode, PatternError>;

    fn try_apply(&mut self, node: &AstNode) -> Result<Option<AstNode>, PatternError> {
        let pattern = self.pattern();
        match match_seq(std::slice::from_ref(&pattern), std::slice::from_ref(node)) {
            Some(map) => Ok(Some(self.transform(&Bindings(map))?)),
            None => Ok(None),
        }
    }

    fn rewrite(&mut self, node: AstNode, order: Order) -> Result<AstNode, PatternError> {
        match order {
            Order::Ascending => {
                let AstNode {
                    kind,
                    position,
                    attrs,
                    children,
                } = node;
                let mut new_children = Vec::with_capacity(children.len());
                for child in children {
                    new_children.push(self.rewrite(child, order)?);
                }
                let rebuilt = AstNode::new(kind, position, attrs, new_children);
                Ok(self.try_apply(&rebuilt)?.unwrap_or(rebuilt))
            }
            Order::Descending => {
                if let Some(replacement) = self.try_apply(&node)? {
                    let AstNode {
                        kind,
                        position,
                        attrs,
                        children,
                    } = replacement;
                    let mut new_children = Vec::with_capacity(children.len());
                    for child in children {
                        new_children.push(self.rewrite(child, order)?);
                    }
                    Ok(AstNode::new(kind, position, attrs, new_children))
                } else {
                    let AstNode {
                        kind,
                        position,
                        attrs,
                        children,
                    } = node;
                    let mut new_children = Vec::with_capacity(children.len());
                    for child in children {
                        new_children.push(self.rewrite(child, order)?);
                    }
                    Ok(AstNode::new(kind, position, attrs, new_children))
                }
            }
        }
    }
}
