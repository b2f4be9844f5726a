//! Core error types.

use hdrbind_ast::{NodeKind, TypeKind};

/// Errors raised while collecting and resolving declarations.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CoreError {
    /// A native type has no mapping in the binding vocabulary.
    #[error("unsupported type '{spelling}' ({kind:?})")]
    UnsupportedType { kind: TypeKind, spelling: String },

    /// A node violates the grammar the collector relies on.
    #[error("unsupported declaration shape: {detail}")]
    UnsupportedShape { detail: String },

    /// A type-bearing node arrived without a type descriptor.
    #[error("{kind} '{name}' carries no type information")]
    MissingType { kind: NodeKind, name: String },

    /// A record definition whose size or alignment the front-end did not compute.
    #[error("{kind} '{name}' has no computed layout")]
    IncompleteLayout { kind: NodeKind, name: String },

    /// A typedef of a bare function type, which has no binding counterpart.
    #[error("typedef '{name}' names a function type, not a function pointer")]
    FunctionTypedef { name: String },

    /// An enumerator without a front-end computed value.
    #[error("enumerator '{name}' has no value")]
    MissingEnumValue { name: String },

    /// The diagnostics gate refused to proceed.
    #[error("parse reported {errors} error(s) and {fatals} fatal error(s)")]
    Blocked {
        warnings: usize,
        errors: usize,
        fatals: usize,
    },
}

impl CoreError {
    /// Whether this error aborts generation rather than skipping one declaration.
    pub fn is_fatal(&self) -> bool {
        matches!(
            self,
            CoreError::UnsupportedType { .. }
                | CoreError::UnsupportedShape { .. }
                | CoreError::Blocked { .. }
        )
    }
}

/// Result type alias for core operations.
pub type Result<T> = std::result::Result<T, CoreError>;
