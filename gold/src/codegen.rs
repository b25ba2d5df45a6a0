use crate::ast::{AstNode, AttrValue, Kind};
use crate::error::AssemblyError;
use crate::storage::Storage;
use lexan::TextSpan;
use std::collections::BTreeMap;
use std::fmt;

/// A run of emitted machine-code bytes. A thin `Vec<u8>` newtype so call
/// sites get a hex-dump `Display` rather than Rust's default debug
/// formatting of a byte vector.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CodeRun(pub Vec<u8>);

impl From<Vec<u8>> for CodeRun {
    fn from(bytes: Vec<u8>) -> Self {
        CodeRun(bytes)
    }
}

impl fmt::Display for CodeRun {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, byte) in self.0.iter().enumerate() {
            if i > 0 {
                write!(f, " ")?;
            }
            write!(f, "{byte:02X}")?;
        }
        Ok(())
    }
}

fn data_node(position: TextSpan, bytes: Vec<u8>) -> AstNode {
    let mut attrs = BTreeMap::new();
    attrs.insert("data".to_string(), AttrValue::Bytes(bytes));
    AstNode::leaf(Kind::Data, position, attrs)
}

/// Lowers `lda`/`sta`/`jmp`/`rts` instruction nodes, each already carrying
/// a resolved `storage` attribute, into [`Kind::Data`] leaves holding
/// their emitted bytes. Any other instruction-shaped node is left
/// untouched.
#[derive(Debug, Default)]
pub struct AssembleWithRelocations;

impl AssembleWithRelocations {
    pub fn run(node: AstNode) -> Result<AstNode, AssemblyError> {
        let AstNode {
            kind,
            position,
            attrs,
            children,
        } = node;
        let mut new_children = Vec::with_capacity(children.len());
        for child in children {
            new_children.push(Self::run(child)?);
        }
        let node = AstNode::new(kind, position, attrs, new_children);
        match node.kind {
            Kind::Lda => Self::assemble_lda(node),
            Kind::Sta => Self::assemble_sta(node),
            Kind::Jmp => Self::assemble_jmp(node),
            Kind::Rts => Ok(Self::assemble_rts(node)),
            _ => Ok(node),
        }
    }

    fn storage_of(node: &AstNode, opcode: &'static str) -> Result<Storage, AssemblyError> {
        match node.attr("storage") {
            Some(AttrValue::Storage(s)) => Ok(*s),
            _ => Err(AssemblyError::MissingAttr {
                kind: opcode,
                attr: "storage",
            }),
        }
    }

    fn assemble_lda(node: AstNode) -> Result<AstNode, AssemblyError> {
        match Self::storage_of(&node, "lda")? {
            Storage::Immediate { value, width: 1 } => {
                Ok(data_node(node.position, vec![0xA9, value as u8]))
            }
            Storage::Immediate { width, .. } => Err(AssemblyError::WrongWidth {
                opcode: "lda",
                expected: 1,
                found: width,
            }),
            other => Err(AssemblyError::UnsupportedStorage {
                opcode: "lda",
                expected: "immediate",
                found: other,
            }),
        }
    }

    fn assemble_sta(node: AstNode) -> Result<AstNode, AssemblyError> {
        match Self::storage_of(&node, "sta")? {
            Storage::Absolute { address, width: 1 } => {
                let [lo, hi] = (address as u16).to_le_bytes();
                Ok(data_node(node.position, vec![0x8D, lo, hi]))
            }
            Storage::Absolute { width, .. } => Err(AssemblyError::WrongWidth {
                opcode: "sta",
                expected: 1,
                found: width,
            }),
            other => Err(AssemblyError::UnsupportedStorage {
                opcode: "sta",
                expected: "absolute",
                found: other,
            }),
        }
    }

    fn assemble_jmp(node: AstNode) -> Result<AstNode, AssemblyError> {
        match Self::storage_of(&node, "jmp")? {
            Storage::Absolute { address, .. } => {
                let [lo, hi] = (address as u16).to_le_bytes();
                Ok(data_node(node.position, vec![0x4C, lo, hi]))
            }
            other => Err(AssemblyError::UnsupportedStorage {
                opcode: "jmp",
                expected: "absolute",
                found: other,
            }),
        }
    }

    fn assemble_rts(node: AstNode) -> AstNode {
        data_node(node.position, vec![0x60])
    }
}

/// Concatenates a `fun`'s emitted instruction bytes into a single
/// `fun_symbol` leaf, and strips the now-unneeded `known_names` scope
/// bookkeeping from `unit` nodes before the tree leaves this pass.
#[derive(Debug, Default)]
pub struct FlattenSymbol;

impl FlattenSymbol {
    pub fn run(node: AstNode) -> Result<AstNode, AssemblyError> {
        let AstNode {
            kind,
            position,
            attrs,
            children,
        } = node;
        let mut new_children = Vec::with_capacity(children.len());
        for child in children {
            new_children.push(Self::run(child)?);
        }
        let node = AstNode::new(kind, position, attrs, new_children);
        match node.kind {
            Kind::Fun => Self::flatten_fun(node),
            Kind::Unit => Ok(Self::flatten_unit(node)),
            _ => Ok(node),
        }
    }

    fn flatten_fun(node: AstNode) -> Result<AstNode, AssemblyError> {
        let mut bytes = Vec::new();
        for child in &node.children {
            match child.attr("data") {
                Some(AttrValue::Bytes(b)) => bytes.extend_from_slice(b),
                _ => {
                    return Err(AssemblyError::MissingAttr {
                        kind: "fun",
                        attr: "data",
                    })
                }
            }
        }
        let name = node.attr("name").cloned().ok_or(AssemblyError::MissingAttr {
            kind: "fun",
            attr: "name",
        })?;
        let ty = node.attr("type").cloned().ok_or(AssemblyError::MissingAttr {
            kind: "fun",
            attr: "type",
        })?;

        let mut attrs = BTreeMap::new();
        attrs.insert("name".to_string(), name);
        attrs.insert("type".to_string(), ty);
        attrs.insert("text".to_string(), AttrValue::Bytes(bytes));
        if let Some(return_addr) = node.attr("return_addr").cloned() {
            attrs.insert("return_addr".to_string(), return_addr);
        }
        Ok(AstNode::leaf(Kind::FunSymbol, node.position, attrs))
    }

    fn flatten_unit(node: AstNode) -> AstNode {
        let mut node = node;
        node.remove_attr("known_names");
        node
    }
}

/// Pulls the emitted byte string out of a `fun_symbol` node, for a
/// collaborator assembling the final object artifact.
pub fn code_run_of(node: &AstNode) -> Result<CodeRun, AssemblyError> {
    match node.attr("text") {
        Some(AttrValue::Bytes(bytes)) => Ok(CodeRun(bytes.clone())),
        _ => Err(AssemblyError::MissingAttr {
            kind: "fun_symbol",
            attr: "text",
        }),
    }
}
