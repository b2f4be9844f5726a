//! Declaration names.
//!
//! Anonymous structs, unions and enums get a synthetic name built from the
//! node id the front-end assigned, so the same declaration always maps to
//! the same name and two distinct declarations never share one.

use hdrbind_ast::{DeclRef, NodeId, NodeKind};

/// Prefix shared by every synthetic name.
pub const ANON_PREFIX: &str = "_anon_";

/// Whether a front-end spelling denotes an anonymous declaration.
///
/// Newer libclang releases spell anonymous records as
/// `struct (unnamed at file.h:3:1)` instead of an empty string.
pub fn is_anonymous_spelling(spelling: &str) -> bool {
    spelling.is_empty() || spelling.contains("(unnamed") || spelling.contains("(anonymous")
}

/// Synthetic name for an anonymous declaration of `kind`.
pub fn synthetic_name(kind: NodeKind, id: NodeId) -> String {
    format!("{ANON_PREFIX}{}_{id}", kind.name())
}

/// The name a declaration is emitted under.
pub fn declared_name(kind: NodeKind, id: NodeId, spelling: &str) -> String {
    if is_anonymous_spelling(spelling) {
        synthetic_name(kind, id)
    } else {
        spelling.to_string()
    }
}

/// The name a type reference resolves to; agrees with [`declared_name`]
/// for the referenced declaration.
pub fn referenced_name(decl: &DeclRef) -> String {
    declared_name(decl.kind, decl.id, &decl.spelling)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn named_declarations_keep_spelling() {
        assert_eq!(declared_name(NodeKind::StructDecl, NodeId(4), "point"), "point");
    }

    #[test]
    fn anonymous_names_are_stable() {
        let a = declared_name(NodeKind::UnionDecl, NodeId(9), "");
        let b = declared_name(NodeKind::UnionDecl, NodeId(9), "");
        assert_eq!(a, b);
        assert_eq!(a, "_anon_union_9");
    }

    #[test]
    fn anonymous_names_do_not_collide() {
        let a = declared_name(NodeKind::StructDecl, NodeId(1), "");
        let b = declared_name(NodeKind::StructDecl, NodeId(2), "");
        let c = declared_name(NodeKind::UnionDecl, NodeId(1), "");
        assert_ne!(a, b);
        assert_ne!(a, c);
    }

    #[test]
    fn libclang_unnamed_spelling_is_anonymous() {
        assert!(is_anonymous_spelling("struct (unnamed at demo.h:3:5)"));
        assert!(is_anonymous_spelling("union (anonymous at demo.h:3:5)"));
        assert!(!is_anonymous_spelling("my_point"));
    }

    #[test]
    fn reference_agrees_with_declaration() {
        let decl = DeclRef {
            id: NodeId(12),
            kind: NodeKind::StructDecl,
            spelling: String::new(),
        };
        assert_eq!(referenced_name(&decl), declared_name(NodeKind::StructDecl, NodeId(12), ""));
    }
}
