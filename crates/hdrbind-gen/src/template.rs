//! Binding template abstraction.
//!
//! A template owns the literal syntax of one target binding language. The
//! [`Emitter`](crate::emit::Emitter) decides what to emit and in which order;
//! the template only renders each piece as lines of text.

use hdrbind_core::{Aggregate, AggregateKind, Enumeration, Function, TypeAlias, TypeExpr};

use crate::config::EnumMode;

/// Pluggable serialization of declaration records.
pub trait BindingTemplate {
    /// File extension of the artifact, without the dot.
    fn extension(&self) -> &'static str;

    /// Fixed preamble: imports and primitive aliases.
    fn header(&self) -> Vec<String>;

    fn enumeration(&self, enumeration: &Enumeration, mode: EnumMode) -> Vec<String>;

    /// Introduce an aggregate name without a layout.
    fn introduce(&self, kind: AggregateKind, name: &str) -> Vec<String>;

    /// Give an introduced aggregate its layout, followed by the size assertion.
    fn layout(&self, aggregate: &Aggregate) -> Vec<String>;

    /// Assert the size of an aggregate that already has its layout.
    fn reassert(&self, aggregate: &Aggregate) -> Vec<String>;

    fn alias(&self, alias: &TypeAlias) -> Vec<String>;

    /// The handle type binding every function to a loaded library.
    fn handle(&self, name: &str, functions: &[&Function], library: Option<&str>) -> Vec<String>;

    /// Spelling of a type expression.
    fn type_expr(&self, ty: &TypeExpr) -> String;
}
