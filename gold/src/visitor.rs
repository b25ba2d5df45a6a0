use crate::ast::{AstNode, Kind};

/// Pre-order/post-order dispatch over an [`AstNode`] tree, keyed by
/// [`Kind`]. Every hook defaults to a no-op (`enter_*` returns its node
/// unchanged, `exit_*` returns its node as a singleton list); a pass
/// overrides only the kinds it cares about.
///
/// `exit_*` returning more than one node splices them into the parent's
/// child list in place of the original node; returning none deletes it.
pub trait TranslationPass {
    fn enter_unit(&mut self, node: AstNode) -> AstNode {
        node
    }
    fn exit_unit(&mut self, node: AstNode) -> Vec<AstNode> {
        vec![node]
    }

    fn enter_fun(&mut self, node: AstNode) -> AstNode {
        node
    }
    fn exit_fun(&mut self, node: AstNode) -> Vec<AstNode> {
        vec![node]
    }

    fn enter_let(&mut self, node: AstNode) -> AstNode {
        node
    }
    fn exit_let(&mut self, node: AstNode) -> Vec<AstNode> {
        vec![node]
    }

    fn enter_let_scoped(&mut self, node: AstNode) -> AstNode {
        node
    }
    fn exit_let_scoped(&mut self, node: AstNode) -> Vec<AstNode> {
        vec![node]
    }

    fn enter_let_set(&mut self, node: AstNode) -> AstNode {
        node
    }
    fn exit_let_set(&mut self, node: AstNode) -> Vec<AstNode> {
        vec![node]
    }

    fn enter_constant(&mut self, node: AstNode) -> AstNode {
        node
    }
    fn exit_constant(&mut self, node: AstNode) -> Vec<AstNode> {
        vec![node]
    }

    fn enter_storage_class(&mut self, node: AstNode) -> AstNode {
        node
    }
    fn exit_storage_class(&mut self, node: AstNode) -> Vec<AstNode> {
        vec![node]
    }

    fn enter_call(&mut self, node: AstNode) -> AstNode {
        node
    }
    fn exit_call(&mut self, node: AstNode) -> Vec<AstNode> {
        vec![node]
    }

    fn enter_identifier(&mut self, node: AstNode) -> AstNode {
        node
    }
    fn exit_identifier(&mut self, node: AstNode) -> Vec<AstNode> {
        vec![node]
    }

    fn enter_lda(&mut self, node: AstNode) -> AstNode {
        node
    }
    fn exit_lda(&mut self, node: AstNode) -> Vec<AstNode> {
        vec![node]
    }

    fn enter_sta(&mut self, node: AstNode) -> AstNode {
        node
    }
    fn exit_sta(&mut self, node: AstNode) -> Vec<AstNode> {
        vec![node]
    }

    fn enter_jmp(&mut self, node: AstNode) -> AstNode {
        node
    }
    fn exit_jmp(&mut self, node: AstNode) -> Vec<AstNode> {
        vec![node]
    }

    fn enter_rts(&mut self, node: AstNode) -> AstNode {
        node
    }
    fn exit_rts(&mut self, node: AstNode) -> Vec<AstNode> {
        vec![node]
    }

    fn enter_data(&mut self, node: AstNode) -> AstNode {
        node
    }
    fn exit_data(&mut self, node: AstNode) -> Vec<AstNode> {
        vec![node]
    }

    fn enter_fun_symbol(&mut self, node: AstNode) -> AstNode {
        node
    }
    fn exit_fun_symbol(&mut self, node: AstNode) -> Vec<AstNode> {
        vec![node]
    }

    fn enter_dispatch(&mut self, node: AstNode) -> AstNode {
        match node.kind {
            Kind::Unit => self.enter_unit(node),
            Kind::Fun => self.enter_fun(node),
            Kind::Let => self.enter_let(node),
            Kind::LetScoped => self.enter_let_scoped(node),
            Kind::LetSet => self.enter_let_set(node),
            Kind::Constant => self.enter_constant(node),
            Kind::StorageClass => self.enter_storage_class(node),
            Kind::Call => self.enter_call(node),
            Kind::Identifier => self.enter_identifier(node),
            Kind::Lda => self.enter_lda(node),
            Kind::Sta => self.enter_sta(node),
            Kind::Jmp => self.enter_jmp(node),
            Kind::Rts => self.enter_rts(node),
            Kind::Data => self.enter_data(node),
            Kind::FunSymbol => self.enter_fun_symbol(node),
        }
    }

    fn exit_dispatch(&mut self, node: AstNode) -> Vec<AstNode> {
        match node.kind {
            Kind::Unit => self.exit_unit(node),
            Kind::Fun => self.exit_fun(node),
            Kind::Let => self.exit_let(node),
            Kind::LetScoped => self.exit_let_scoped(node),
            Kind::LetSet => self.exit_let_set(node),
            Kind::Constant => self.exit_constant(node),
            Kind::StorageClass => self.exit_storage_class(node),
            Kind::Call => self.exit_call(node),
            Kind::Identifier => self.exit_identifier(node),
            Kind::Lda => self.exit_lda(node),
            Kind::Sta => self.exit_sta(node),
            Kind::Jmp => self.exit_jmp(node),
            Kind::Rts => self.exit_rts(node),
            Kind::Data => self.exit_data(node),
            Kind::FunSymbol => self.exit_fun_symbol(node),
        }
    }

    /// Runs the full pre-order/recurse/post-order traversal over `node`,
    /// returning its replacement(s) -- a singleton in the common case,
    /// zero or many if `exit_*` spliced.
    fn transform(&mut self, node: AstNode) -> Vec<AstNode> {
        let node = self.enter_dispatch(node);
        let AstNode {
            kind,
            position,
            attrs,
            children,
        } = node;
        let mut new_children = Vec::with_capacity(children.len());
        for child in children {
            new_children.extend(self.transform(child));
        }
        let node = AstNode::new(kind, position, attrs, new_children);
        self.exit_dispatch(node)
    }
}

/// The node kinds that own a scope ([`ScopedPass::scopes`] stack entry):
/// `unit` (the whole translation unit) and `fun` (a function body).
pub const SCOPED_KINDS: [Kind; 2] = [Kind::Unit, Kind::Fun];

/// A [`TranslationPass`] that understands lexical scope: entering a
/// `unit` or `fun` node clones it (isolating attribute mutations to that
/// clone), pushes it on [`ScopedPass::scopes`], and symmetrically pops
/// it on exit. `bind_name`/`look_up_name` and
/// `bind_constant`/`look_up_constant` read and write the scope stack,
/// innermost first.
pub trait ScopedPass: TranslationPass {
    fn scopes(&mut self) -> &mut Vec<AstNode>;

    /// Called after the kind-specific `enter_*` hook, once the scope
    /// node has been cloned and pushed.
    fn enter_scope(&mut self, node: AstNode) -> AstNode {
        node
    }

    /// Called before the kind-specific `exit_*` hook, while the scope
    /// node is still on top of the stack.
    fn exit_scope(&mut self, node: AstNode) -> AstNode {
        node
    }

    fn bind_name(&mut self, name: impl Into<String>, value: crate::ast::AttrValue) {
        let top = self.scopes().last_mut().expect("bind_name outside any scope");
        top.names_default("known_names").insert(name.into(), value);
    }

    fn look_up_name(&mut self, name: &str) -> Option<crate::ast::AttrValue> {
        self.scopes()
            .iter()
            .rev()
            .find_map(|scope| scope.attr("known_names")?.as_names()?.get(name).cloned())
    }

    fn bind_constant(&mut self, name: impl Into<String>, value: crate::ast::AttrValue) {
        let top = self.scopes().last_mut().expect("bind_constant outside any scope");
        top.names_default("known_constants").insert(name.into(), value);
    }

    fn look_up_constant(&mut self, name: &str) -> Option<crate::ast::AttrValue> {
        self.scopes()
            .iter()
            .rev()
            .find_map(|scope| scope.attr("known_constants")?.as_names()?.get(name).cloned())
    }

    fn transform_scoped(&mut self, node: AstNode) -> Vec<AstNode> {
        let scoped = SCOPED_KINDS.contains(&node.kind);
        let node = self.enter_dispatch(node);
        let node = if scoped {
            let cloned = node.clone();
            self.scopes().push(cloned.clone());
            self.enter_scope(cloned)
        } else {
            node
        };

        let AstNode {
            kind,
            position,
            attrs,
            children,
        } = node;
        let mut new_children = Vec::with_capacity(children.len());
        for child in children {
            new_children.extend(self.transform_scoped(child));
        }

        // `bind_name`/`bind_constant` write through the scope stack entry
        // pushed above, not through this function's local `attrs` -- pull
        // the now-current version back before reconstructing the node.
        let attrs = if scoped {
            self.scopes()
                .last()
                .expect("scope stack must still hold the entry pushed above")
                .attrs
                .clone()
        } else {
            attrs
        };
        let mut node = AstNode::new(kind, position, attrs, new_children);

        if scoped {
            node = self.exit_scope(node);
        }
        let result = self.exit_dispatch(node);
        if scoped {
            self.scopes().pop();
        }
        result
    }
}
