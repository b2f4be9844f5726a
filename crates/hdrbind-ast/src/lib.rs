//! Declaration tree model and front-end interface for hdrbind.
//!
//! The C front-end is an external collaborator. This crate fixes the shape
//! of what it hands over: a navigable declaration tree, a type descriptor
//! per type-bearing node, and the parse diagnostics.
//!
//! ## Modules
//!
//! - [`node`]: Declaration nodes, kinds and source locations
//! - [`types`]: Type descriptors as reported by the front-end
//! - [`diagnostic`]: Parse diagnostics and severities
//! - [`frontend`]: The [`FrontEnd`] trait and the JSON tree loader
//! - [`builder`]: Programmatic tree construction
//! - `clang`: libclang-backed front-end (feature `libclang`)

pub mod builder;
#[cfg(feature = "libclang")]
pub mod clang;
pub mod diagnostic;
pub mod error;
pub mod frontend;
pub mod node;
pub mod types;

pub use builder::TreeBuilder;
#[cfg(feature = "libclang")]
pub use clang::ClangFrontEnd;
pub use diagnostic::{Diagnostic, Severity};
pub use error::FrontEndError;
pub use frontend::{FrontEnd, InMemoryFrontEnd, JsonFrontEnd, TranslationUnit};
pub use node::{Node, NodeId, NodeKind, SourceLocation};
pub use types::{DeclRef, TypeDesc, TypeKind};
