//! The AST pass pipeline sitting downstream of [`lalr1`]: scope
//! resolution, compile-time constant folding, storage descriptors, and
//! 6502 machine-code emission.
//!
//! A parser's `make_node` callback (see [`lalr1::Parser::parse`]) builds
//! an [`ast::AstNode`] tree; [`passes::binding`] resolves names and
//! constants against it; [`codegen`] lowers the result to bytes.

pub mod ast;
pub mod codegen;
pub mod error;
pub mod passes;
pub mod pattern;
pub mod storage;
pub mod visitor;

pub use ast::{AstNode, AttrValue, Kind};
pub use codegen::{code_run_of, AssembleWithRelocations, CodeRun, FlattenSymbol};
pub use error::{AssemblyError, PatternError};
pub use pattern::{Bindings, Order, Pattern, PatternTransform};
pub use storage::Storage;
pub use visitor::{ScopedPass, TranslationPass, SCOPED_KINDS};
