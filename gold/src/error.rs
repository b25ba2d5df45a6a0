use crate::storage::Storage;
use thiserror::Error;

/// A declarative rewrite pattern failed to bind a variable it declared.
/// Always a programming error in the pattern itself, not user input.
#[derive(Debug, Error)]
pub enum PatternError {
    #[error("pattern variable {0:?} was never bound by the match")]
    UnboundVariable(String),
    #[error("pattern variable {0:?} was bound, but not as the capture kind this transform expected")]
    WrongCaptureKind(String),
}

/// An instruction received an operand of unsupported storage kind or
/// width. Fatal to the current unit's emission.
#[derive(Debug, Error)]
pub enum AssemblyError {
    #[error("{opcode} requires {expected}-byte storage, found {found} byte(s)")]
    WrongWidth {
        opcode: &'static str,
        expected: u8,
        found: u8,
    },
    #[error("{opcode} requires {expected} storage, found {found}")]
    UnsupportedStorage {
        opcode: &'static str,
        expected: &'static str,
        found: Storage,
    },
    #[error("node of kind {kind} is missing its required {attr:?} attribute")]
    MissingAttr { kind: &'static str, attr: &'static str },
}
