use lexan::TextSpan;
use std::collections::BTreeMap;
use std::fmt;

use crate::storage::Storage;

/// The tag distinguishing an [`AstNode`]'s shape. Closed, rather than an
/// interned string, so pass dispatch is a match rather than a string
/// comparison -- the typed-variant replacement for the dynamic `any` bag
/// called for by Design Note 9.1.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Kind {
    Unit,
    Fun,
    Let,
    LetScoped,
    LetSet,
    Constant,
    StorageClass,
    Call,
    Identifier,
    Lda,
    Sta,
    Jmp,
    Rts,
    /// A leaf holding already-emitted bytes, produced by
    /// [`crate::codegen::AssembleWithRelocations`] in place of an
    /// instruction node.
    Data,
    FunSymbol,
}

impl fmt::Display for Kind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Kind::Unit => "unit",
            Kind::Fun => "fun",
            Kind::Let => "let",
            Kind::LetScoped => "let_scoped",
            Kind::LetSet => "let_set",
            Kind::Constant => "constant",
            Kind::StorageClass => "storage_class",
            Kind::Call => "call",
            Kind::Identifier => "identifier",
            Kind::Lda => "lda",
            Kind::Sta => "sta",
            Kind::Jmp => "jmp",
            Kind::Rts => "rts",
            Kind::Data => "data",
            Kind::FunSymbol => "fun_symbol",
        };
        f.write_str(s)
    }
}

/// A node attribute's value. Closed over the handful of shapes the
/// passes in this crate actually produce, rather than a dynamic `any`:
/// a `String`, `name -> value` map (`known_names`/`known_constants`),
/// an embedded node (the bound value of a folded `constant`), a storage
/// descriptor, emitted bytes, or a compile-time call target.
#[derive(Debug, Clone, PartialEq)]
pub enum AttrValue {
    Str(String),
    Int(i64),
    Bool(bool),
    Node(Box<AstNode>),
    Storage(Storage),
    Bytes(Vec<u8>),
    Names(BTreeMap<String, AttrValue>),
    /// A compile-time call target: `exit_call` applies this to the call
    /// node's children to fold the call away entirely.
    Target(fn(&[AstNode]) -> AstNode),
}

impl AttrValue {
    pub fn as_str(&self) -> Option<&str> {
        match self {
            AttrValue::Str(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_names(&self) -> Option<&BTreeMap<String, AttrValue>> {
        match self {
            AttrValue::Names(n) => Some(n),
            _ => None,
        }
    }

    pub fn as_names_mut(&mut self) -> Option<&mut BTreeMap<String, AttrValue>> {
        match self {
            AttrValue::Names(n) => Some(n),
            _ => None,
        }
    }
}

/// A node in the AST value tree: `(kind, position, attrs, children)`.
///
/// Nodes are logically immutable: "mutation" is always
/// [`AstNode::clone_with_children`] or cloning then assigning a fresh
/// `attrs` map, never in-place child or attribute mutation shared with
/// another owner. No parent pointers; a pass's traversal stack supplies
/// context (see [`crate::TranslationPass`]).
#[derive(Debug, Clone, PartialEq)]
pub struct AstNode {
    pub kind: Kind,
    pub position: TextSpan,
    pub attrs: BTreeMap<String, AttrValue>,
    pub children: Vec<AstNode>,
}

impl AstNode {
    pub fn new(
        kind: Kind,
        position: TextSpan,
        attrs: BTreeMap<String, AttrValue>,
        children: Vec<AstNode>,
    ) -> Self {
        Self {
            kind,
            position,
            attrs,
            children,
        }
    }

    pub fn leaf(kind: Kind, position: TextSpan, attrs: BTreeMap<String, AttrValue>) -> Self {
        Self::new(kind, position, attrs, Vec::new())
    }

    pub fn attr(&self, key: &str) -> Option<&AttrValue> {
        self.attrs.get(key)
    }

    pub fn set_attr(&mut self, key: impl Into<String>, value: AttrValue) {
        self.attrs.insert(key.into(), value);
    }

    pub fn remove_attr(&mut self, key: &str) -> Option<AttrValue> {
        self.attrs.remove(key)
    }

    /// Returns the `Names` map at `key`, inserting an empty one first if
    /// absent. Mirrors the reference `get_attr_default` used by scope
    /// bookkeeping (`known_names`/`known_constants`).
    pub fn names_default(&mut self, key: &str) -> &mut BTreeMap<String, AttrValue> {
        self.attrs
            .entry(key.to_string())
            .or_insert_with(|| AttrValue::Names(BTreeMap::new()))
            .as_names_mut()
            .expect("attribute was not a Names map")
    }

    /// Structural clone with a replaced child list -- the one way this
    /// value tree is ever "mutated".
    pub fn clone_with_children(&self, children: Vec<AstNode>) -> AstNode {
        AstNode {
            kind: self.kind,
            position: self.position,
            attrs: self.attrs.clone(),
            children,
        }
    }
}
