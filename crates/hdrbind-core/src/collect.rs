//! The declaration collector.
//!
//! One recursive pass over a translation unit. Each direct child of a
//! transparent node (the root, `extern "C"` blocks, unexposed wrappers) is
//! dispatched on its kind; handled kinds produce at most one record per
//! entity, everything else is recursed into.
//!
//! Failures are isolated per declaration: a non-fatal [`CoreError`] skips
//! the offending node (recorded in [`Collection::skipped`]) and traversal
//! continues with its next sibling. Fatal errors abort the pass.

use std::collections::HashSet;

use hdrbind_ast::{Node, NodeId, NodeKind, TypeDesc, TypeKind};
use tracing::{debug, error, trace, warn};

use crate::error::{CoreError, Result};
use crate::expr::TypeExpr;
use crate::naming;
use crate::record::{
    Aggregate, AggregateKind, DeclRecord, Enumeration, Enumerator, Field, Function, Opaque,
    TypeAlias,
};
use crate::resolve::{resolve, resolve_parameter};
use crate::scope::ScopeFilter;

/// A declaration left out of the output, and why.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SkippedDecl {
    pub name: String,
    pub kind: NodeKind,
    pub file: Option<String>,
    pub line: Option<u32>,
    pub reason: CoreError,
}

/// Output of one collection pass.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Collection {
    /// Records in first-encounter order.
    pub records: Vec<DeclRecord>,
    pub skipped: Vec<SkippedDecl>,
    /// Number of nodes the traversal dispatched on, in scope or not.
    pub visited: usize,
}

impl Collection {
    pub fn aggregates(&self) -> impl Iterator<Item = &Aggregate> {
        self.records.iter().filter_map(DeclRecord::as_aggregate)
    }

    pub fn functions(&self) -> impl Iterator<Item = &Function> {
        self.records.iter().filter_map(DeclRecord::as_function)
    }
}

/// Collection context for a single pass.
#[derive(Debug, Default)]
pub struct Collector {
    scope: ScopeFilter,
    records: Vec<DeclRecord>,
    /// Aggregate names already introduced (opaque or complete).
    declared: HashSet<String>,
    /// Typedef names already recorded as aliases.
    aliases: HashSet<String>,
    /// Enumeration names already recorded.
    enums: HashSet<String>,
    functions: HashSet<String>,
    skipped: Vec<SkippedDecl>,
    visited: usize,
}

impl Collector {
    pub fn new(scope: ScopeFilter) -> Self {
        Self {
            scope,
            ..Self::default()
        }
    }

    /// Walk the children of `root` and return everything collected.
    pub fn collect(mut self, root: &Node) -> Result<Collection> {
        self.visit_children(root)?;
        debug!(
            records = self.records.len(),
            skipped = self.skipped.len(),
            visited = self.visited,
            "collection finished"
        );
        Ok(Collection {
            records: self.records,
            skipped: self.skipped,
            visited: self.visited,
        })
    }

    fn visit_children(&mut self, node: &Node) -> Result<()> {
        for child in &node.children {
            self.visited += 1;
            if !self.scope.admits(child.file()) {
                trace!(kind = child.kind.name(), name = %child.spelling, "out of scope");
                continue;
            }
            match self.dispatch(child) {
                Ok(true) => {}
                Ok(false) => self.visit_children(child)?,
                Err(err) if err.is_fatal() => {
                    error!(
                        file = child.file().unwrap_or("<unknown>"),
                        kind = child.kind.name(),
                        name = %child.spelling,
                        "{err}"
                    );
                    return Err(err);
                }
                Err(err) => self.skip(child, err),
            }
        }
        Ok(())
    }

    /// Handle one node. `Ok(false)` means the kind has no handler and the
    /// node's children should be visited instead.
    fn dispatch(&mut self, node: &Node) -> Result<bool> {
        match node.kind {
            NodeKind::StructDecl | NodeKind::UnionDecl => {
                self.visit_aggregate(node)?;
            }
            NodeKind::EnumDecl => self.visit_enum(node)?,
            NodeKind::FunctionDecl => self.visit_function(node)?,
            NodeKind::TypedefDecl => self.visit_typedef(node)?,
            NodeKind::MacroDefinition
            | NodeKind::MacroInstantiation
            | NodeKind::VarDecl
            | NodeKind::InclusionDirective => {}
            _ => return Ok(false),
        }
        Ok(true)
    }

    fn skip(&mut self, node: &Node, reason: CoreError) {
        let name = display_name(node);
        let line = node.location.as_ref().map(|loc| loc.line);
        warn!(
            file = node.file().unwrap_or("<unknown>"),
            line = line.unwrap_or(0),
            kind = node.kind.name(),
            %name,
            "skipping declaration: {reason}"
        );
        self.skipped.push(SkippedDecl {
            name,
            kind: node.kind,
            file: node.file().map(str::to_string),
            line,
            reason,
        });
    }

    /// Collect a struct or union and return the name it is recorded under.
    /// Nested aggregates are recorded before the one enclosing them; when
    /// the enclosing one fails they are withdrawn with it.
    fn visit_aggregate(&mut self, node: &Node) -> Result<String> {
        let mark = self.records.len();
        let result = self.collect_aggregate(node);
        if result.is_err() {
            self.rollback(mark);
        }
        result
    }

    /// Drop the records pushed since `mark` and forget the names they
    /// introduced.
    fn rollback(&mut self, mark: usize) {
        for record in self.records.split_off(mark) {
            trace!(name = record.name(), "withdrawing nested {}", record.label());
            match record {
                DeclRecord::Opaque(o) => {
                    self.declared.remove(&o.name);
                }
                DeclRecord::Aggregate(a) if !a.forward => {
                    self.declared.remove(&a.name);
                }
                DeclRecord::Enumeration(e) => {
                    let earlier = self.records.iter().any(
                        |r| matches!(r, DeclRecord::Enumeration(prev) if prev.name == e.name),
                    );
                    if !earlier {
                        self.enums.remove(&e.name);
                    }
                }
                _ => {}
            }
        }
    }

    fn collect_aggregate(&mut self, node: &Node) -> Result<String> {
        let kind = if node.kind == NodeKind::UnionDecl {
            AggregateKind::Union
        } else {
            AggregateKind::Struct
        };
        let name = naming::declared_name(node.kind, node.id, &node.spelling);

        let has_body =
            node.is_definition || node.children.iter().any(|c| c.kind == NodeKind::FieldDecl);
        if !has_body {
            if self.declared.insert(name.clone()) {
                debug!(%name, "opaque {}", kind.keyword());
                self.records.push(DeclRecord::Opaque(Opaque {
                    kind,
                    name: name.clone(),
                }));
            }
            return Ok(name);
        }

        let ty = node.ty.as_ref().ok_or_else(|| CoreError::MissingType {
            kind: node.kind,
            name: name.clone(),
        })?;
        let (Some(size), Some(align)) = (ty.size, ty.align) else {
            return Err(CoreError::IncompleteLayout {
                kind: node.kind,
                name,
            });
        };

        let mut fields: Vec<Field> = Vec::new();
        let mut anonymous: Vec<String> = Vec::new();
        // Anonymous nested aggregate waiting to see whether the next field
        // is declared with its type.
        let mut pending: Option<(NodeId, String)> = None;

        for child in &node.children {
            match child.kind {
                NodeKind::FieldDecl => {
                    let field_ty = child.ty.as_ref().ok_or_else(|| CoreError::MissingType {
                        kind: child.kind,
                        name: child.spelling.clone(),
                    })?;
                    if pending
                        .as_ref()
                        .is_some_and(|(id, _)| mentions(field_ty, *id))
                    {
                        pending = None;
                    }
                    flush_anonymous(&mut pending, &mut fields, &mut anonymous);
                    let field_name = if child.spelling.is_empty() {
                        format!("_field{}", fields.len())
                    } else {
                        child.spelling.clone()
                    };
                    fields.push(Field {
                        name: field_name,
                        ty: resolve(field_ty)?,
                        bit_width: child.bit_width,
                    });
                }
                NodeKind::StructDecl | NodeKind::UnionDecl => {
                    flush_anonymous(&mut pending, &mut fields, &mut anonymous);
                    let nested = self.visit_aggregate(child)?;
                    if naming::is_anonymous_spelling(&child.spelling) {
                        pending = Some((child.id, nested));
                    }
                }
                NodeKind::EnumDecl => self.visit_enum(child)?,
                other => trace!(kind = other.name(), %name, "ignoring aggregate child"),
            }
        }
        flush_anonymous(&mut pending, &mut fields, &mut anonymous);

        let forward = self.declared.contains(&name);
        self.declared.insert(name.clone());
        if forward {
            debug!(%name, "patching previously introduced {}", kind.keyword());
        }
        self.records.push(DeclRecord::Aggregate(Aggregate {
            kind,
            name: name.clone(),
            align,
            size,
            fields,
            anonymous,
            forward,
        }));
        Ok(name)
    }

    fn visit_enum(&mut self, node: &Node) -> Result<()> {
        let name = naming::declared_name(node.kind, node.id, &node.spelling);
        if !node.is_definition && node.children.is_empty() {
            debug!(%name, "enum declared without enumerators");
            return Ok(());
        }
        let mut enumerators = Vec::with_capacity(node.children.len());
        for child in &node.children {
            if child.kind != NodeKind::EnumConstantDecl {
                return Err(CoreError::UnsupportedShape {
                    detail: format!("enum '{name}' contains a {} node", child.kind.name()),
                });
            }
            let value = child.enum_value.ok_or_else(|| CoreError::MissingEnumValue {
                name: child.spelling.clone(),
            })?;
            enumerators.push(Enumerator {
                name: child.spelling.clone(),
                value,
            });
        }
        self.enums.insert(name.clone());
        self.records
            .push(DeclRecord::Enumeration(Enumeration { name, enumerators }));
        Ok(())
    }

    fn visit_function(&mut self, node: &Node) -> Result<()> {
        let name = node.spelling.clone();
        if self.functions.contains(&name) {
            trace!(%name, "function redeclared");
            return Ok(());
        }
        let fn_ty = node.ty.as_ref();
        let result = node
            .result_ty
            .as_ref()
            .or_else(|| fn_ty.and_then(TypeDesc::result))
            .ok_or_else(|| CoreError::MissingType {
                kind: node.kind,
                name: name.clone(),
            })?;
        let ret = resolve(result)?;

        let mut args = Vec::new();
        let mut arg_names = Vec::new();
        let params: Vec<&Node> = node.children_of_kind(NodeKind::ParmDecl).collect();
        if !params.is_empty() {
            for param in params {
                let ty = param.ty.as_ref().ok_or_else(|| CoreError::MissingType {
                    kind: param.kind,
                    name: param.spelling.clone(),
                })?;
                args.push(resolve_parameter(ty)?);
                arg_names.push(param.spelling.clone());
            }
        } else if let Some(fn_ty) = fn_ty {
            for ty in &fn_ty.args {
                args.push(resolve_parameter(ty)?);
                arg_names.push(String::new());
            }
        }

        let variadic = node.is_variadic || fn_ty.is_some_and(|t| t.variadic);
        if variadic {
            warn!(%name, "variadic function; only its fixed parameters are bound");
        }
        self.functions.insert(name.clone());
        self.records.push(DeclRecord::Function(Function {
            name,
            ret,
            args,
            arg_names,
            variadic,
        }));
        Ok(())
    }

    fn visit_typedef(&mut self, node: &Node) -> Result<()> {
        let name = node.spelling.clone();
        let underlying = node
            .underlying_ty
            .as_ref()
            .ok_or_else(|| CoreError::MissingType {
                kind: node.kind,
                name: name.clone(),
            })?;
        let canonical = underlying.canonical();
        if canonical.kind.is_function() {
            return Err(CoreError::FunctionTypedef { name });
        }

        let target = match canonical.kind {
            TypeKind::Record | TypeKind::ConstantArray | TypeKind::IncompleteArray => {
                resolve(canonical)?
            }
            TypeKind::Enum => match self.nearer_alias(underlying) {
                Some(alias) => TypeExpr::named(alias),
                None => match self.recorded_enum(canonical) {
                    Some(enum_name) => TypeExpr::named(enum_name),
                    None => resolve(underlying)?,
                },
            },
            _ => match self.nearer_alias(underlying) {
                Some(alias) => TypeExpr::named(alias),
                None => resolve(underlying)?,
            },
        };

        if target.as_name() == Some(name.as_str()) {
            trace!(%name, "suppressing self alias");
            return Ok(());
        }
        if !self.aliases.insert(name.clone()) {
            trace!(%name, "typedef redeclared");
            return Ok(());
        }
        self.records
            .push(DeclRecord::Alias(TypeAlias { name, target }));
        Ok(())
    }

    /// The name of the enumeration `ty` declares, if it was recorded.
    fn recorded_enum(&self, ty: &TypeDesc) -> Option<String> {
        let name = naming::referenced_name(ty.decl.as_ref()?);
        self.enums.contains(&name).then_some(name)
    }

    /// The typedef name `ty` refers to, if it was recorded as an alias.
    fn nearer_alias(&self, ty: &TypeDesc) -> Option<String> {
        let mut ty = ty;
        while ty.kind == TypeKind::Elaborated {
            ty = ty.named()?;
        }
        if ty.kind != TypeKind::Typedef {
            return None;
        }
        let alias = ty
            .decl
            .as_ref()
            .map_or(ty.spelling.as_str(), |decl| decl.spelling.as_str());
        self.aliases.contains(alias).then(|| alias.to_string())
    }
}

fn display_name(node: &Node) -> String {
    match node.kind {
        NodeKind::StructDecl | NodeKind::UnionDecl | NodeKind::EnumDecl => {
            naming::declared_name(node.kind, node.id, &node.spelling)
        }
        _ => node.spelling.clone(),
    }
}

/// Turn a pending anonymous aggregate into a member of its own.
fn flush_anonymous(
    pending: &mut Option<(NodeId, String)>,
    fields: &mut Vec<Field>,
    anonymous: &mut Vec<String>,
) {
    if let Some((_, nested)) = pending.take() {
        let member = format!("_anon{}", anonymous.len());
        fields.push(Field::new(member.clone(), TypeExpr::named(nested)));
        anonymous.push(member);
    }
}

/// Whether `ty` refers to the declaration `id` anywhere in its shape.
fn mentions(ty: &TypeDesc, id: NodeId) -> bool {
    if ty.decl.as_ref().is_some_and(|decl| decl.id == id) {
        return true;
    }
    [
        ty.canonical.as_deref(),
        ty.pointee(),
        ty.element(),
        ty.named(),
    ]
    .into_iter()
    .flatten()
    .any(|inner| mentions(inner, id))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::expr::Primitive;
    use hdrbind_ast::builder::TreeBuilder;
    use hdrbind_ast::TranslationUnit;
    use pretty_assertions::assert_eq;

    fn collect(unit: &TranslationUnit) -> Collection {
        Collector::default().collect(&unit.root).unwrap()
    }

    fn point_and_add(b: &mut TreeBuilder) {
        let pid = b.reserve_id();
        let x = b.field("x", TypeDesc::double());
        let y = b.field("y", TypeDesc::int());
        let point = b.record(pid, NodeKind::StructDecl, "point", 16, 8, vec![x, y]);
        let point_ty = TypeDesc::record(NodeKind::StructDecl, "point", pid, 16, 8);
        let add = b.function(
            "add",
            TypeDesc::int(),
            vec![
                ("p", TypeDesc::pointer_to(TypeDesc::elaborated(point_ty))),
                ("n", TypeDesc::int()),
            ],
        );
        b.push(point).push(add);
    }

    #[test]
    fn point_and_add_with_scope() {
        let mut b = TreeBuilder::new("demo.h");
        point_and_add(&mut b);
        b.in_file("/usr/include/stdlib.h");
        let abort = b.function("abort", TypeDesc::void(), vec![]);
        b.push(abort);
        let unit = b.finish();

        let collection = Collector::new(ScopeFilter::new(["demo.h"]))
            .collect(&unit.root)
            .unwrap();

        assert_eq!(collection.records.len(), 2);
        assert_eq!(collection.visited, 3);
        let point = collection.aggregates().next().unwrap();
        assert_eq!(point.name, "point");
        assert_eq!((point.size, point.align), (16, 8));
        assert!(!point.forward);
        assert_eq!(
            point.fields,
            vec![
                Field::new("x", TypeExpr::prim(Primitive::F64)),
                Field::new("y", TypeExpr::prim(Primitive::I32)),
            ]
        );
        let add = collection.functions().next().unwrap();
        assert_eq!(add.name, "add");
        assert_eq!(add.ret, TypeExpr::prim(Primitive::I32));
        assert_eq!(
            add.args,
            vec![
                TypeExpr::pointer(TypeExpr::named("point")),
                TypeExpr::prim(Primitive::I32),
            ]
        );
        assert_eq!(add.arg_names, vec!["p".to_string(), "n".to_string()]);
    }

    #[test]
    fn self_referential_aggregate() {
        let mut b = TreeBuilder::new("list.h");
        let id = b.reserve_id();
        let node_ty = TypeDesc::record(NodeKind::StructDecl, "node", id, 8, 8);
        let next = b.field("next", TypeDesc::pointer_to(TypeDesc::elaborated(node_ty)));
        let node = b.record(id, NodeKind::StructDecl, "node", 8, 8, vec![next]);
        b.push(node);

        let collection = collect(&b.finish());
        assert_eq!(collection.records.len(), 1);
        let node = collection.aggregates().next().unwrap();
        assert!(!node.forward);
        assert_eq!(node.fields[0].ty, TypeExpr::pointer(TypeExpr::named("node")));
    }

    #[test]
    fn forward_declaration_then_definitions() {
        let mut b = TreeBuilder::new("fwd.h");
        let decl = b.forward_record("s");
        let again = b.forward_record("s");
        let first_id = b.reserve_id();
        let a = b.field("a", TypeDesc::int());
        let first = b.record(first_id, NodeKind::StructDecl, "s", 4, 4, vec![a]);
        let second_id = b.reserve_id();
        let a2 = b.field("a", TypeDesc::int());
        let second = b.record(second_id, NodeKind::StructDecl, "s", 4, 4, vec![a2]);
        b.push(decl).push(again).push(first).push(second);

        let collection = collect(&b.finish());
        let labels: Vec<_> = collection.records.iter().map(DeclRecord::label).collect();
        assert_eq!(labels, vec!["opaque", "struct", "struct"]);
        let forwards: Vec<_> = collection.aggregates().map(|a| a.forward).collect();
        assert_eq!(forwards, vec![true, true]);
    }

    #[test]
    fn repeated_definition_patches() {
        let mut b = TreeBuilder::new("twice.h");
        for _ in 0..3 {
            let id = b.reserve_id();
            let v = b.field("v", TypeDesc::int());
            let rec = b.record(id, NodeKind::StructDecl, "pair", 4, 4, vec![v]);
            b.push(rec);
        }
        let collection = collect(&b.finish());
        let forwards: Vec<_> = collection.aggregates().map(|a| a.forward).collect();
        assert_eq!(forwards, vec![false, true, true]);
    }

    #[test]
    fn anonymous_member_becomes_synthetic_field() {
        let mut b = TreeBuilder::new("anon.h");
        let outer_id = b.reserve_id();
        let union_id = b.reserve_id();
        let a = b.field("a", TypeDesc::int());
        let f = b.field("f", TypeDesc::scalar(TypeKind::Float, "float", 4));
        let inner = b.record(union_id, NodeKind::UnionDecl, "", 4, 4, vec![a, f]);
        let c = b.field("c", TypeDesc::int());
        let outer = b.record(outer_id, NodeKind::StructDecl, "outer", 8, 4, vec![inner, c]);
        b.push(outer);

        let collection = collect(&b.finish());
        let names: Vec<_> = collection.records.iter().map(DeclRecord::name).collect();
        let union_name = naming::synthetic_name(NodeKind::UnionDecl, union_id);
        assert_eq!(names, vec![union_name.as_str(), "outer"]);

        let outer = collection.records[1].as_aggregate().unwrap();
        assert_eq!(outer.anonymous, vec!["_anon0".to_string()]);
        assert_eq!(
            outer.fields,
            vec![
                Field::new("_anon0", TypeExpr::named(union_name)),
                Field::new("c", TypeExpr::prim(Primitive::I32)),
            ]
        );
    }

    #[test]
    fn anonymous_type_of_named_field_is_not_a_member() {
        let mut b = TreeBuilder::new("anon.h");
        let outer_id = b.reserve_id();
        let inner_id = b.reserve_id();
        let a = b.field("a", TypeDesc::int());
        let inner = b.record(inner_id, NodeKind::StructDecl, "", 4, 4, vec![a]);
        let inner_ty = TypeDesc::record(NodeKind::StructDecl, "", inner_id, 4, 4);
        let field = b.field("inner", TypeDesc::elaborated(inner_ty));
        let outer = b.record(outer_id, NodeKind::StructDecl, "outer", 4, 4, vec![inner, field]);
        b.push(outer);

        let collection = collect(&b.finish());
        let outer = collection.records[1].as_aggregate().unwrap();
        assert!(outer.anonymous.is_empty());
        assert_eq!(
            outer.fields,
            vec![Field::new(
                "inner",
                TypeExpr::named(naming::synthetic_name(NodeKind::StructDecl, inner_id))
            )]
        );
    }

    #[test]
    fn distinct_anonymous_aggregates_get_distinct_names() {
        let mut b = TreeBuilder::new("anon.h");
        for _ in 0..2 {
            let id = b.reserve_id();
            let a = b.field("a", TypeDesc::int());
            let rec = b.record(id, NodeKind::StructDecl, "", 4, 4, vec![a]);
            b.push(rec);
        }
        let collection = collect(&b.finish());
        assert_ne!(collection.records[0].name(), collection.records[1].name());
        assert!(collection.aggregates().all(|a| !a.forward));
    }

    #[test]
    fn bitfield_widths_are_carried() {
        let mut b = TreeBuilder::new("bits.h");
        let id = b.reserve_id();
        let lo = b.bitfield("lo", TypeDesc::int(), 3);
        let hi = b.bitfield("hi", TypeDesc::int(), 5);
        let rec = b.record(id, NodeKind::StructDecl, "flags", 4, 4, vec![lo, hi]);
        b.push(rec);
        let collection = collect(&b.finish());
        let flags = collection.aggregates().next().unwrap();
        let widths: Vec<_> = flags.fields.iter().map(|f| f.bit_width).collect();
        assert_eq!(widths, vec![Some(3), Some(5)]);
    }

    #[test]
    fn typedef_to_own_tag_is_suppressed() {
        let mut b = TreeBuilder::new("alias.h");
        let id = b.reserve_id();
        let x = b.field("x", TypeDesc::int());
        let rec = b.record(id, NodeKind::StructDecl, "my_point", 4, 4, vec![x]);
        let rec_ty = TypeDesc::record(NodeKind::StructDecl, "my_point", id, 4, 4);
        let (alias, _) = b.typedef("my_point", TypeDesc::elaborated(rec_ty));
        b.push(rec).push(alias);

        let collection = collect(&b.finish());
        assert_eq!(collection.records.len(), 1);
        assert_eq!(collection.records[0].label(), "struct");
    }

    #[test]
    fn typedef_chain_keeps_nearer_name() {
        let mut b = TreeBuilder::new("alias.h");
        let uint = TypeDesc::scalar(TypeKind::UInt, "unsigned int", 4);
        let (first, first_ty) = b.typedef("u32_t", uint);
        let (second, _) = b.typedef("handle_t", first_ty);
        b.push(first).push(second);

        let collection = collect(&b.finish());
        let aliases: Vec<_> = collection
            .records
            .iter()
            .filter_map(DeclRecord::as_alias)
            .cloned()
            .collect();
        assert_eq!(
            aliases,
            vec![
                TypeAlias {
                    name: "u32_t".into(),
                    target: TypeExpr::prim(Primitive::U32)
                },
                TypeAlias {
                    name: "handle_t".into(),
                    target: TypeExpr::named("u32_t")
                },
            ]
        );
    }

    #[test]
    fn array_typedef_keeps_shape() {
        let mut b = TreeBuilder::new("alias.h");
        let (vec3, _) = b.typedef("vec3", TypeDesc::array_of(TypeDesc::double(), 3));
        b.push(vec3);
        let collection = collect(&b.finish());
        assert_eq!(
            collection.records[0].as_alias().unwrap().target,
            TypeExpr::array(TypeExpr::prim(Primitive::F64), 3)
        );
    }

    #[test]
    fn per_node_failure_is_skipped() {
        let mut b = TreeBuilder::new("partial.h");
        let id = b.reserve_id();
        let mut broken = b.record(id, NodeKind::StructDecl, "broken", 4, 4, vec![]);
        if let Some(ty) = broken.ty.as_mut() {
            ty.size = None;
        }
        let (fn_alias, _) = b.typedef("callback", TypeDesc::function(TypeDesc::void(), vec![]));
        let ok = b.function("ok", TypeDesc::void(), vec![]);
        b.push(broken).push(fn_alias).push(ok);

        let collection = collect(&b.finish());
        assert_eq!(collection.records.len(), 1);
        assert_eq!(collection.records[0].name(), "ok");
        let skipped: Vec<_> = collection.skipped.iter().map(|s| s.name.as_str()).collect();
        assert_eq!(skipped, vec!["broken", "callback"]);
        assert_eq!(collection.skipped[0].file.as_deref(), Some("partial.h"));
        assert!(matches!(
            collection.skipped[1].reason,
            CoreError::FunctionTypedef { .. }
        ));
    }

    #[test]
    fn unsupported_type_aborts() {
        let mut b = TreeBuilder::new("wide.h");
        let id = b.reserve_id();
        let v = b.field("v", TypeDesc::scalar(TypeKind::LongDouble, "long double", 16));
        let rec = b.record(id, NodeKind::StructDecl, "wide", 16, 16, vec![v]);
        let after = b.function("after", TypeDesc::void(), vec![]);
        b.push(rec).push(after);

        let err = Collector::default().collect(&b.finish().root).unwrap_err();
        assert!(matches!(err, CoreError::UnsupportedType { .. }));
    }

    #[test]
    fn enum_with_foreign_child_is_fatal() {
        let mut b = TreeBuilder::new("enum.h");
        let mut color = b.enumeration("color", &[("RED", 0), ("GREEN", 1)]);
        let stray = b.field("oops", TypeDesc::int());
        color.children.push(stray);
        b.push(color);

        let err = Collector::default().collect(&b.finish().root).unwrap_err();
        assert!(matches!(err, CoreError::UnsupportedShape { .. }));
    }

    #[test]
    fn enumerators_keep_front_end_values() {
        let mut b = TreeBuilder::new("enum.h");
        let e = b.enumeration("mode", &[("OFF", 0), ("ON", 4), ("AUTO", -1)]);
        b.push(e);
        let collection = collect(&b.finish());
        let mode = collection.records[0].as_enumeration().unwrap();
        let values: Vec<_> = mode.enumerators.iter().map(|e| e.value).collect();
        assert_eq!(values, vec![0, 4, -1]);
    }

    #[test]
    fn suppressed_kinds_and_linkage_blocks() {
        let mut b = TreeBuilder::new("misc.h");
        let mac = b.macro_definition("VERSION");
        let var = b.variable("counter", TypeDesc::int());
        let f = b.function("inside", TypeDesc::int(), vec![]);
        let block = b.linkage_spec(vec![f]);
        b.push(mac).push(var).push(block);

        let collection = collect(&b.finish());
        let names: Vec<_> = collection.records.iter().map(DeclRecord::name).collect();
        assert_eq!(names, vec!["inside"]);
        assert_eq!(collection.visited, 4);
        assert!(collection.skipped.is_empty());
    }

    #[test]
    fn variadic_and_redeclared_functions() {
        let mut b = TreeBuilder::new("io.h");
        let fmt = TypeDesc::pointer_to(TypeDesc::scalar(TypeKind::CharS, "char", 1));
        let log = b.variadic_function("log_msg", TypeDesc::int(), vec![("fmt", fmt.clone())]);
        let again = b.variadic_function("log_msg", TypeDesc::int(), vec![("fmt", fmt)]);
        b.push(log).push(again);

        let collection = collect(&b.finish());
        assert_eq!(collection.records.len(), 1);
        let log = collection.functions().next().unwrap();
        assert!(log.variadic);
        assert_eq!(log.args, vec![TypeExpr::pointer(TypeExpr::prim(Primitive::I8))]);
    }

    #[test]
    fn failed_aggregate_withdraws_its_nested_records() {
        let mut b = TreeBuilder::new("partial.h");
        let outer_id = b.reserve_id();
        let union_id = b.reserve_id();
        let inner_id = b.reserve_id();
        let a = b.field("a", TypeDesc::int());
        let anon = b.record(union_id, NodeKind::UnionDecl, "", 4, 4, vec![a]);
        let v = b.field("v", TypeDesc::int());
        let inner = b.record(inner_id, NodeKind::StructDecl, "inner", 4, 4, vec![v]);
        let mut bad = b.field("bad", TypeDesc::int());
        bad.ty = None;
        let children = vec![anon, inner, bad];
        let outer = b.record(outer_id, NodeKind::StructDecl, "outer", 12, 4, children);

        let again_id = b.reserve_id();
        let w = b.field("w", TypeDesc::int());
        let inner_again = b.record(again_id, NodeKind::StructDecl, "inner", 4, 4, vec![w]);
        b.push(outer).push(inner_again);

        let collection = collect(&b.finish());
        let names: Vec<_> = collection.records.iter().map(DeclRecord::name).collect();
        assert_eq!(names, vec!["inner"]);
        assert!(!collection.records[0].as_aggregate().unwrap().forward);
        let skipped: Vec<_> = collection.skipped.iter().map(|s| s.name.as_str()).collect();
        assert_eq!(skipped, vec!["outer"]);
    }

    #[test]
    fn typedef_of_same_named_enum_is_suppressed() {
        let mut b = TreeBuilder::new("color.h");
        let color = b.enumeration("color", &[("RED", 0), ("GREEN", 1)]);
        let color_ty = TypeDesc::enumeration("color", color.id);
        let (alias, _) = b.typedef("color", TypeDesc::elaborated(color_ty));
        b.push(color).push(alias);

        let collection = collect(&b.finish());
        let names: Vec<_> = collection.records.iter().map(DeclRecord::name).collect();
        assert_eq!(names, vec!["color"]);
        assert!(collection.records[0].as_enumeration().is_some());
    }

    #[test]
    fn typedef_of_anonymous_enum_names_the_enum() {
        let mut b = TreeBuilder::new("mode.h");
        let mode = b.enumeration("", &[("MODE_OFF", 0), ("MODE_ON", 1)]);
        let enum_name = naming::synthetic_name(NodeKind::EnumDecl, mode.id);
        let mode_ty = TypeDesc::enumeration("", mode.id);
        let (alias, _) = b.typedef("mode_t", TypeDesc::elaborated(mode_ty));
        b.push(mode).push(alias);

        let collection = collect(&b.finish());
        assert_eq!(
            collection.records[1],
            DeclRecord::Alias(TypeAlias {
                name: "mode_t".into(),
                target: TypeExpr::named(enum_name),
            })
        );
    }

    #[test]
    fn typedef_of_unrecorded_enum_stays_integral() {
        let mut b = TreeBuilder::new("sys.h");
        let id = b.reserve_id();
        let (alias, _) = b.typedef("errno_t", TypeDesc::enumeration("errcode", id));
        b.push(alias);

        let collection = collect(&b.finish());
        assert_eq!(
            collection.records,
            vec![DeclRecord::Alias(TypeAlias {
                name: "errno_t".into(),
                target: TypeExpr::prim(Primitive::I32),
            })]
        );
    }
}
