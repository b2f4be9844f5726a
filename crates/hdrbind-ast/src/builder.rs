//! Programmatic construction of declaration trees.
//!
//! Used by tests and by tools that synthesize declarations without a C
//! front-end. Node ids are handed out sequentially and lines advance with
//! every declaration so locations stay distinct.
//!
//! # Example
//!
//! ```rust
//! use hdrbind_ast::builder::TreeBuilder;
//! use hdrbind_ast::{NodeKind, TypeDesc};
//!
//! let mut b = TreeBuilder::new("point.h");
//! let id = b.reserve_id();
//! let x = b.field("x", TypeDesc::double());
//! let y = b.field("y", TypeDesc::int());
//! let point = b.record(id, NodeKind::StructDecl, "point", 16, 8, vec![x, y]);
//! b.push(point);
//! let unit = b.finish();
//! assert_eq!(unit.root.children.len(), 1);
//! ```

use crate::frontend::TranslationUnit;
use crate::node::{Node, NodeId, NodeKind, SourceLocation};
use crate::types::TypeDesc;

/// Builder for a single translation unit.
pub struct TreeBuilder {
    file: String,
    next_id: u64,
    next_line: u32,
    root: Node,
}

impl TreeBuilder {
    /// Start a translation unit whose declarations live in `file`.
    pub fn new(file: &str) -> Self {
        let mut root = Node::new(NodeId(0), NodeKind::TranslationUnit, file);
        root.location = Some(SourceLocation::new(file, 0, 0));
        Self {
            file: file.to_string(),
            next_id: 1,
            next_line: 1,
            root,
        }
    }

    /// Declarations created after this call are located in `file`.
    pub fn in_file(&mut self, file: &str) -> &mut Self {
        self.file = file.to_string();
        self
    }

    /// Allocate an id ahead of building the node, so types can refer to it.
    pub fn reserve_id(&mut self) -> NodeId {
        let id = NodeId(self.next_id);
        self.next_id += 1;
        id
    }

    fn located(&mut self, id: NodeId, kind: NodeKind, spelling: &str) -> Node {
        let mut node = Node::new(id, kind, spelling);
        node.location = Some(SourceLocation::new(self.file.as_str(), self.next_line, 1));
        self.next_line += 1;
        node
    }

    fn fresh(&mut self, kind: NodeKind, spelling: &str) -> Node {
        let id = self.reserve_id();
        self.located(id, kind, spelling)
    }

    pub fn field(&mut self, name: &str, ty: TypeDesc) -> Node {
        let mut node = self.fresh(NodeKind::FieldDecl, name);
        node.ty = Some(ty);
        node
    }

    pub fn bitfield(&mut self, name: &str, ty: TypeDesc, width: u32) -> Node {
        let mut node = self.field(name, ty);
        node.bit_width = Some(width);
        node
    }

    /// A struct or union definition declared as `id`.
    pub fn record(
        &mut self,
        id: NodeId,
        kind: NodeKind,
        name: &str,
        size: u64,
        align: u64,
        children: Vec<Node>,
    ) -> Node {
        let mut node = self.located(id, kind, name);
        node.ty = Some(TypeDesc::record(kind, name, id, size, align));
        node.is_definition = true;
        node.children = children;
        node
    }

    /// A struct declaration without a body (`struct name;`).
    pub fn forward_record(&mut self, name: &str) -> Node {
        let mut node = self.fresh(NodeKind::StructDecl, name);
        node.ty = Some(TypeDesc::incomplete_record(name, node.id));
        node
    }

    pub fn enumeration(&mut self, name: &str, constants: &[(&str, i64)]) -> Node {
        let mut node = self.fresh(NodeKind::EnumDecl, name);
        node.ty = Some(TypeDesc::enumeration(name, node.id));
        node.is_definition = true;
        for (constant, value) in constants {
            let mut c = self.fresh(NodeKind::EnumConstantDecl, constant);
            c.ty = Some(TypeDesc::int());
            c.enum_value = Some(*value);
            node.children.push(c);
        }
        node
    }

    pub fn function(&mut self, name: &str, result: TypeDesc, params: Vec<(&str, TypeDesc)>) -> Node {
        let arg_types = params.iter().map(|(_, t)| t.clone()).collect();
        let mut node = self.fresh(NodeKind::FunctionDecl, name);
        node.ty = Some(TypeDesc::function(result.clone(), arg_types));
        node.result_ty = Some(result);
        for (param, ty) in params {
            let mut p = self.fresh(NodeKind::ParmDecl, param);
            p.ty = Some(ty);
            node.children.push(p);
        }
        node
    }

    pub fn variadic_function(
        &mut self,
        name: &str,
        result: TypeDesc,
        params: Vec<(&str, TypeDesc)>,
    ) -> Node {
        let mut node = self.function(name, result, params);
        node.is_variadic = true;
        if let Some(ty) = node.ty.as_mut() {
            ty.variadic = true;
        }
        node
    }

    /// A typedef declaration plus the type that names it.
    pub fn typedef(&mut self, name: &str, underlying: TypeDesc) -> (Node, TypeDesc) {
        let mut node = self.fresh(NodeKind::TypedefDecl, name);
        let reference = TypeDesc::typedef(name, node.id, &underlying);
        node.ty = Some(reference.clone());
        node.underlying_ty = Some(underlying);
        node.is_definition = true;
        (node, reference)
    }

    pub fn variable(&mut self, name: &str, ty: TypeDesc) -> Node {
        let mut node = self.fresh(NodeKind::VarDecl, name);
        node.ty = Some(ty);
        node
    }

    pub fn macro_definition(&mut self, name: &str) -> Node {
        self.fresh(NodeKind::MacroDefinition, name)
    }

    /// Wrap `children` in a transparent `extern "C" { ... }` block.
    pub fn linkage_spec(&mut self, children: Vec<Node>) -> Node {
        let mut node = self.fresh(NodeKind::LinkageSpec, "");
        node.children = children;
        node
    }

    /// Append a top-level declaration.
    pub fn push(&mut self, node: Node) -> &mut Self {
        self.root.children.push(node);
        self
    }

    pub fn finish(self) -> TranslationUnit {
        TranslationUnit::new(self.root)
    }
}
