//! Declaration tree nodes.
//!
//! A [`Node`] mirrors one cursor of the front-end's tree: a kind tag, the
//! spelling, where it was declared, and, for type-bearing nodes, the type
//! descriptors the front-end computed for it.

use std::fmt;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::types::TypeDesc;

/// Stable per-node identifier assigned by the front-end.
///
/// A declaration and every [`crate::DeclRef`] that points at it share the
/// same id, which is what makes anonymous declarations addressable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NodeId(pub u64);

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Declaration kind tag of a node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NodeKind {
    TranslationUnit,
    StructDecl,
    UnionDecl,
    EnumDecl,
    EnumConstantDecl,
    FieldDecl,
    FunctionDecl,
    ParmDecl,
    TypedefDecl,
    VarDecl,
    MacroDefinition,
    MacroInstantiation,
    InclusionDirective,
    LinkageSpec,
    TypeRef,
    /// Any cursor kind hdrbind has no dedicated tag for (attributes,
    /// expressions, unexposed declarations).
    Other,
}

impl NodeKind {
    /// Whether this kind declares a struct or union.
    pub fn is_aggregate(&self) -> bool {
        matches!(self, NodeKind::StructDecl | NodeKind::UnionDecl)
    }

    /// Short lowercase name, used in logs and synthetic identifiers.
    pub fn name(&self) -> &'static str {
        match self {
            NodeKind::TranslationUnit => "translation_unit",
            NodeKind::StructDecl => "struct",
            NodeKind::UnionDecl => "union",
            NodeKind::EnumDecl => "enum",
            NodeKind::EnumConstantDecl => "enum_constant",
            NodeKind::FieldDecl => "field",
            NodeKind::FunctionDecl => "function",
            NodeKind::ParmDecl => "parameter",
            NodeKind::TypedefDecl => "typedef",
            NodeKind::VarDecl => "variable",
            NodeKind::MacroDefinition => "macro_definition",
            NodeKind::MacroInstantiation => "macro_instantiation",
            NodeKind::InclusionDirective => "inclusion_directive",
            NodeKind::LinkageSpec => "linkage_spec",
            NodeKind::TypeRef => "type_ref",
            NodeKind::Other => "other",
        }
    }
}

impl fmt::Display for NodeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A position in a source file.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SourceLocation {
    pub file: String,
    pub line: u32,
    pub column: u32,
}

impl SourceLocation {
    pub fn new(file: impl Into<String>, line: u32, column: u32) -> Self {
        Self {
            file: file.into(),
            line,
            column,
        }
    }

    pub fn path(&self) -> &Path {
        Path::new(&self.file)
    }
}

impl fmt::Display for SourceLocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{},{}", self.file, self.line, self.column)
    }
}

/// One node of the declaration tree.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Node {
    pub id: NodeId,
    pub kind: NodeKind,
    /// Source spelling; empty for anonymous declarations.
    #[serde(default)]
    pub spelling: String,
    #[serde(default)]
    pub location: Option<SourceLocation>,
    /// Type of the declared entity (record type, field type, function type, ...).
    #[serde(default)]
    pub ty: Option<TypeDesc>,
    /// Result type of a function declaration.
    #[serde(default)]
    pub result_ty: Option<TypeDesc>,
    /// Underlying type of a typedef declaration.
    #[serde(default)]
    pub underlying_ty: Option<TypeDesc>,
    /// Value the front-end computed for an enumerator.
    #[serde(default)]
    pub enum_value: Option<i64>,
    /// Declared width of a bit-field.
    #[serde(default)]
    pub bit_width: Option<u32>,
    #[serde(default)]
    pub is_definition: bool,
    #[serde(default)]
    pub is_variadic: bool,
    #[serde(default)]
    pub children: Vec<Node>,
}

impl Node {
    /// Create a bare node with no location, types or children.
    pub fn new(id: NodeId, kind: NodeKind, spelling: impl Into<String>) -> Self {
        Self {
            id,
            kind,
            spelling: spelling.into(),
            location: None,
            ty: None,
            result_ty: None,
            underlying_ty: None,
            enum_value: None,
            bit_width: None,
            is_definition: false,
            is_variadic: false,
            children: Vec::new(),
        }
    }

    /// File this node was declared in, if the front-end reported one.
    pub fn file(&self) -> Option<&str> {
        self.location.as_ref().map(|loc| loc.file.as_str())
    }

    /// Whether the node carries no source spelling.
    pub fn is_anonymous(&self) -> bool {
        self.spelling.is_empty()
    }

    /// Direct children of the given kind.
    pub fn children_of_kind(&self, kind: NodeKind) -> impl Iterator<Item = &Node> {
        self.children.iter().filter(move |c| c.kind == kind)
    }

    /// Number of nodes in this subtree, including `self`.
    pub fn subtree_len(&self) -> usize {
        1 + self.children.iter().map(Node::subtree_len).sum::<usize>()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn subtree_len_counts_all_descendants() {
        let mut root = Node::new(NodeId(0), NodeKind::TranslationUnit, "demo.h");
        let mut rec = Node::new(NodeId(1), NodeKind::StructDecl, "point");
        rec.children.push(Node::new(NodeId(2), NodeKind::FieldDecl, "x"));
        rec.children.push(Node::new(NodeId(3), NodeKind::FieldDecl, "y"));
        root.children.push(rec);
        assert_eq!(root.subtree_len(), 4);
        assert_eq!(root.children[0].children_of_kind(NodeKind::FieldDecl).count(), 2);
    }

    #[test]
    fn node_kind_serializes_snake_case() {
        let json = serde_json::to_string(&NodeKind::EnumConstantDecl).unwrap();
        assert_eq!(json, "\"enum_constant_decl\"");
    }

    #[test]
    fn location_display() {
        let loc = SourceLocation::new("a/b.h", 10, 2);
        assert_eq!(loc.to_string(), "a/b.h:10,2");
        assert_eq!(loc.path(), Path::new("a/b.h"));
    }
}
