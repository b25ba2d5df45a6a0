use crate::ast::{AstNode, AttrValue, Kind};
use crate::pattern::{Bindings, Order, Pattern, PatternTransform};
use crate::error::PatternError;
use crate::visitor::{ScopedPass, TranslationPass};

/// Splits a `let` out of its enclosing statement list into an explicit,
/// nested `let_scoped` covering everything after it, so a later binding
/// pass can see exactly which statements a name is in scope for.
///
/// Descending, because the `let_scoped` this produces may itself contain
/// further `let`s (from the statements it swallowed) that must be
/// rewritten on the next pass over its *own* children -- an ascending
/// traversal would already have visited those children once before the
/// rewrite nested them.
#[derive(Debug, Default)]
pub struct ExplicitScopes;

impl ExplicitScopes {
    pub fn run(&mut self, unit: AstNode) -> Result<AstNode, PatternError> {
        self.rewrite(unit, Order::Descending)
    }
}

impl PatternTransform for ExplicitScopes {
    fn pattern(&self) -> Pattern {
        Pattern::AnyNode {
            var: "root".to_string(),
            with_children: vec![
                Pattern::ZeroOrMoreNodes {
                    var: "before".to_string(),
                    exclude: vec![Kind::Let],
                },
                Pattern::Node {
                    kind: Kind::Let,
                    var_pos: "let_p".to_string(),
                    children: vec![Pattern::ZeroOrMoreNodes {
                        var: "inner".to_string(),
                        exclude: vec![],
                    }],
                },
                Pattern::ZeroOrMoreNodes {
                    var: "after".to_string(),
                    exclude: vec![],
                },
            ],
        }
    }

    fn transform(&mut self, b: &Bindings) -> Result<AstNode, PatternError> {
        let root = b.node("root")?;
        let before = b.sequence("before")?;
        let inner = b.sequence("inner")?;
        let after = b.sequence("after")?;
        let let_position = b.position("let_p")?;

        let mut scoped_children = inner.to_vec();
        scoped_children.extend(after.iter().cloned());

        let mut children = before.to_vec();
        children.push(AstNode::new(
            Kind::LetScoped,
            let_position,
            Default::default(),
            scoped_children,
        ));
        Ok(root.clone_with_children(children))
    }
}

/// Binds every `constant`'s name to a placeholder in its enclosing
/// scope, so a later pass can detect shadowing of module-level names
/// before real types are known.
#[derive(Debug, Default)]
pub struct ShadowNames {
    scopes: Vec<AstNode>,
}

impl ShadowNames {
    pub fn run(&mut self, unit: AstNode) -> AstNode {
        self.transform_scoped(unit)
            .pop()
            .expect("a unit's scoped transform always yields itself")
    }
}

impl TranslationPass for ShadowNames {
    fn exit_constant(&mut self, node: AstNode) -> Vec<AstNode> {
        let name = node
            .attr("name")
            .and_then(AttrValue::as_str)
            .expect("constant node is missing its name attribute")
            .to_string();
        self.bind_name(name, AttrValue::Bool(true));
        vec![node]
    }
}

impl ScopedPass for ShadowNames {
    fn scopes(&mut self) -> &mut Vec<AstNode> {
        &mut self.scopes
    }
}

/// Binds `constant.name -> constant.type` in the enclosing scope;
/// storage assignment later overrides these with concrete layouts.
#[derive(Debug, Default)]
pub struct BindNamesToTypes {
    scopes: Vec<AstNode>,
}

impl BindNamesToTypes {
    pub fn run(&mut self, unit: AstNode) -> AstNode {
        self.transform_scoped(unit)
            .pop()
            .expect("a unit's scoped transform always yields itself")
    }
}

impl TranslationPass for BindNamesToTypes {
    fn exit_constant(&mut self, node: AstNode) -> Vec<AstNode> {
        let name = node
            .attr("name")
            .and_then(AttrValue::as_str)
            .expect("constant node is missing its name attribute")
            .to_string();
        let ty = node
            .attr("type")
            .cloned()
            .expect("constant node is missing its type attribute");
        self.bind_name(name, ty);
        vec![node]
    }
}

impl ScopedPass for BindNamesToTypes {
    fn scopes(&mut self) -> &mut Vec<AstNode> {
        &mut self.scopes
    }
}

/// Folds every `constant` binding into `known_constants` and removes the
/// node from the tree; folds `call` of a known compile-time target into
/// its result.
#[derive(Debug, Default)]
pub struct EvaluateConstants {
    scopes: Vec<AstNode>,
    evaluating: bool,
}

impl EvaluateConstants {
    pub fn run(&mut self, unit: AstNode) -> AstNode {
        self.transform_scoped(unit)
            .pop()
            .expect("a unit's scoped transform always yields itself")
    }

    pub fn is_evaluating(&self) -> bool {
        self.evaluating
    }
}

impl TranslationPass for EvaluateConstants {
    fn enter_constant(&mut self, node: AstNode) -> AstNode {
        self.evaluating = true;
        node
    }

    fn exit_constant(&mut self, node: AstNode) -> Vec<AstNode> {
        self.evaluating = false;
        let name = node
            .attr("name")
            .and_then(AttrValue::as_str)
            .expect("constant node is missing its name attribute")
            .to_string();
        let value = node
            .children
            .first()
            .cloned()
            .expect("constant node has no bound value");
        self.bind_constant(name, AttrValue::Node(Box::new(value)));
        Vec::new()
    }

    fn exit_call(&mut self, node: AstNode) -> Vec<AstNode> {
        let target = match node.attr("target") {
            Some(AttrValue::Target(f)) => *f,
            _ => panic!("call node is missing a compile-time target"),
        };
        vec![target(&node.children)]
    }
}

impl ScopedPass for EvaluateConstants {
    fn scopes(&mut self) -> &mut Vec<AstNode> {
        &mut self.scopes
    }
}

/// Replaces `identifier` references with their bound constant value
/// where one is known; absence from the map (not a present-but-falsy
/// value such as the integer `0`) is what "no binding" means.
#[derive(Debug, Default)]
pub struct ResolveConstants {
    scopes: Vec<AstNode>,
}

impl ResolveConstants {
    pub fn run(&mut self, unit: AstNode) -> AstNode {
        self.transform_scoped(unit)
            .pop()
            .expect("a unit's scoped transform always yields itself")
    }
}

impl TranslationPass for ResolveConstants {
    fn exit_identifier(&mut self, node: AstNode) -> Vec<AstNode> {
        let name = node
            .attr("name")
            .and_then(AttrValue::as_str)
            .expect("identifier node is missing its name attribute")
            .to_string();
        match self.look_up_constant(&name) {
            Some(AttrValue::Node(value)) => vec![*value],
            Some(_) => vec![node],
            None => vec![node],
        }
    }
}

impl ScopedPass for ResolveConstants {
    fn scopes(&mut self) -> &mut Vec<AstNode> {
        &mut self.scopes
    }

    fn exit_scope(&mut self, mut node: AstNode) -> AstNode {
        node.remove_attr("known_constants");
        node
    }
}
