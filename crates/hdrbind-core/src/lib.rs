//! Declaration model and type-mapping engine for hdrbind.
//!
//! Walks a front-end declaration tree, resolves every C type it meets into
//! the binding vocabulary, and assembles the ordered declaration list the
//! emitter serializes.
//!
//! ## Modules
//!
//! - [`expr`]: Binding type expressions and primitives
//! - [`record`]: Declaration records (enumerations, aggregates, functions, aliases)
//! - [`naming`]: Names for declarations, including synthetic anonymous names
//! - [`resolve`]: The type resolver
//! - [`scope`]: Source file allow-list
//! - [`collect`]: The declaration collector
//! - [`gate`]: Diagnostics gate
//! - [`layout`]: Size and alignment recomputation from emitted field lists

pub mod collect;
pub mod error;
pub mod expr;
pub mod gate;
pub mod layout;
pub mod naming;
pub mod record;
pub mod resolve;
pub mod scope;

pub use collect::{Collection, Collector, SkippedDecl};
pub use error::CoreError;
pub use expr::{Primitive, TypeExpr};
pub use gate::DiagnosticsGate;
pub use layout::{verify_layouts, DataModel, LayoutMismatch, TypeLayout};
pub use record::{
    Aggregate, AggregateKind, DeclRecord, Enumeration, Enumerator, Field, Function, Opaque,
    TypeAlias,
};
pub use resolve::{resolve, resolve_parameter};
pub use scope::ScopeFilter;
