//! Declaration records: the emission-ready form of one source declaration.

use serde::Serialize;

use crate::expr::TypeExpr;

/// Struct or union.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum AggregateKind {
    Struct,
    Union,
}

impl AggregateKind {
    pub fn keyword(&self) -> &'static str {
        match self {
            AggregateKind::Struct => "struct",
            AggregateKind::Union => "union",
        }
    }
}

/// One enumerator and the value the front-end computed for it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Enumerator {
    pub name: String,
    pub value: i64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Enumeration {
    pub name: String,
    pub enumerators: Vec<Enumerator>,
}

/// A field of an aggregate.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Field {
    pub name: String,
    pub ty: TypeExpr,
    /// Declared bit-field width, if any.
    pub bit_width: Option<u32>,
}

impl Field {
    pub fn new(name: impl Into<String>, ty: TypeExpr) -> Self {
        Self {
            name: name.into(),
            ty,
            bit_width: None,
        }
    }
}

/// A struct or union with its front-end computed layout.
///
/// `size` and `align` come from the front-end and are authoritative.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Aggregate {
    pub kind: AggregateKind,
    pub name: String,
    pub align: u64,
    pub size: u64,
    pub fields: Vec<Field>,
    /// Names of synthetic fields standing for anonymous members.
    pub anonymous: Vec<String>,
    /// The name was introduced earlier in the record list, by a bodiless
    /// declaration or a previous definition. Such a record patches the
    /// earlier name instead of introducing a new type.
    pub forward: bool,
}

/// A struct or union declared without a body.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Opaque {
    pub kind: AggregateKind,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Function {
    pub name: String,
    pub ret: TypeExpr,
    pub args: Vec<TypeExpr>,
    /// Parameter names as declared; informational only.
    pub arg_names: Vec<String>,
    pub variadic: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TypeAlias {
    pub name: String,
    pub target: TypeExpr,
}

/// A declaration record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case", tag = "record")]
pub enum DeclRecord {
    Enumeration(Enumeration),
    Aggregate(Aggregate),
    Opaque(Opaque),
    Function(Function),
    Alias(TypeAlias),
}

impl DeclRecord {
    pub fn name(&self) -> &str {
        match self {
            DeclRecord::Enumeration(e) => &e.name,
            DeclRecord::Aggregate(a) => &a.name,
            DeclRecord::Opaque(o) => &o.name,
            DeclRecord::Function(f) => &f.name,
            DeclRecord::Alias(a) => &a.name,
        }
    }

    /// Short label used in logs and reports.
    pub fn label(&self) -> &'static str {
        match self {
            DeclRecord::Enumeration(_) => "enum",
            DeclRecord::Aggregate(a) => a.kind.keyword(),
            DeclRecord::Opaque(_) => "opaque",
            DeclRecord::Function(_) => "function",
            DeclRecord::Alias(_) => "typedef",
        }
    }

    pub fn as_aggregate(&self) -> Option<&Aggregate> {
        match self {
            DeclRecord::Aggregate(a) => Some(a),
            _ => None,
        }
    }

    pub fn as_function(&self) -> Option<&Function> {
        match self {
            DeclRecord::Function(f) => Some(f),
            _ => None,
        }
    }

    pub fn as_alias(&self) -> Option<&TypeAlias> {
        match self {
            DeclRecord::Alias(a) => Some(a),
            _ => None,
        }
    }

    pub fn as_enumeration(&self) -> Option<&Enumeration> {
        match self {
            DeclRecord::Enumeration(e) => Some(e),
            _ => None,
        }
    }
}
