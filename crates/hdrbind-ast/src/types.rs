//! Type descriptors as reported by the front-end.
//!
//! A [`TypeDesc`] carries the declared form of a type together with the
//! pieces the front-end exposes about it: its canonical form (typedefs
//! stripped), pointee, array element, size, alignment and the declaration
//! it refers to. Record types never embed their fields, so a descriptor
//! tree stays finite even for self-referential structs.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::node::{NodeId, NodeKind};

/// Kind tag of a type descriptor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TypeKind {
    Void,
    Bool,
    /// Plain `char` on targets where it is unsigned.
    CharU,
    UChar,
    /// Plain `char` on targets where it is signed.
    CharS,
    SChar,
    Short,
    UShort,
    Int,
    UInt,
    Long,
    ULong,
    LongLong,
    ULongLong,
    Int128,
    UInt128,
    Float,
    Double,
    LongDouble,
    Pointer,
    Record,
    Enum,
    Typedef,
    Elaborated,
    ConstantArray,
    IncompleteArray,
    VariableArray,
    FunctionProto,
    FunctionNoProto,
    Other,
}

impl TypeKind {
    /// Whether this is a function type (with or without prototype).
    pub fn is_function(&self) -> bool {
        matches!(self, TypeKind::FunctionProto | TypeKind::FunctionNoProto)
    }

    /// Whether this is an array type of any flavor.
    pub fn is_array(&self) -> bool {
        matches!(
            self,
            TypeKind::ConstantArray | TypeKind::IncompleteArray | TypeKind::VariableArray
        )
    }
}

/// Reference from a type to the declaration that introduced it.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct DeclRef {
    pub id: NodeId,
    pub kind: NodeKind,
    /// Declaration spelling; empty when anonymous.
    #[serde(default)]
    pub spelling: String,
}

/// A type descriptor.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TypeDesc {
    pub kind: TypeKind,
    #[serde(default)]
    pub spelling: String,
    /// Size in bytes, absent for incomplete or dependent types.
    #[serde(default)]
    pub size: Option<u64>,
    /// Alignment in bytes, absent for incomplete or dependent types.
    #[serde(default)]
    pub align: Option<u64>,
    /// Canonical form; absent when this descriptor is already canonical.
    #[serde(default)]
    pub canonical: Option<Box<TypeDesc>>,
    #[serde(default)]
    pub pointee: Option<Box<TypeDesc>>,
    #[serde(default)]
    pub element: Option<Box<TypeDesc>>,
    #[serde(default)]
    pub array_len: Option<u64>,
    /// Type named by an elaborated reference (`struct foo`, `enum bar`).
    #[serde(default)]
    pub named: Option<Box<TypeDesc>>,
    /// Result type of a function type.
    #[serde(default)]
    pub result: Option<Box<TypeDesc>>,
    /// Parameter types of a function prototype.
    #[serde(default)]
    pub args: Vec<TypeDesc>,
    #[serde(default)]
    pub variadic: bool,
    #[serde(default)]
    pub decl: Option<DeclRef>,
}

impl TypeDesc {
    /// A descriptor of the given kind with nothing else filled in.
    pub fn bare(kind: TypeKind, spelling: impl Into<String>) -> Self {
        Self {
            kind,
            spelling: spelling.into(),
            size: None,
            align: None,
            canonical: None,
            pointee: None,
            element: None,
            array_len: None,
            named: None,
            result: None,
            args: Vec::new(),
            variadic: false,
            decl: None,
        }
    }

    /// A scalar whose size equals its alignment.
    pub fn scalar(kind: TypeKind, spelling: &str, size: u64) -> Self {
        Self {
            size: Some(size),
            align: Some(size),
            ..Self::bare(kind, spelling)
        }
    }

    pub fn void() -> Self {
        Self::bare(TypeKind::Void, "void")
    }

    pub fn int() -> Self {
        Self::scalar(TypeKind::Int, "int", 4)
    }

    pub fn double() -> Self {
        Self::scalar(TypeKind::Double, "double", 8)
    }

    /// Pointer to `pointee` with LP64 pointer width.
    pub fn pointer_to(pointee: TypeDesc) -> Self {
        let canonical = pointee
            .canonical
            .as_deref()
            .map(|c| Box::new(TypeDesc::pointer_to(c.clone())));
        Self {
            spelling: format!("{} *", pointee.spelling),
            size: Some(8),
            align: Some(8),
            canonical,
            pointee: Some(Box::new(pointee)),
            ..Self::bare(TypeKind::Pointer, "")
        }
    }

    /// Fixed-length array of `element`.
    pub fn array_of(element: TypeDesc, len: u64) -> Self {
        let canonical = element
            .canonical
            .as_deref()
            .map(|c| Box::new(TypeDesc::array_of(c.clone(), len)));
        Self {
            spelling: format!("{}[{len}]", element.spelling),
            size: element.size.map(|s| s * len),
            align: element.align,
            canonical,
            array_len: Some(len),
            element: Some(Box::new(element)),
            ..Self::bare(TypeKind::ConstantArray, "")
        }
    }

    /// Function prototype type.
    pub fn function(result: TypeDesc, args: Vec<TypeDesc>) -> Self {
        Self {
            spelling: format!("{} ()", result.spelling),
            result: Some(Box::new(result)),
            args,
            ..Self::bare(TypeKind::FunctionProto, "")
        }
    }

    /// Function type declared without a prototype (`int f()` in C89 style).
    pub fn function_no_proto(result: TypeDesc) -> Self {
        Self {
            spelling: format!("{} ()", result.spelling),
            result: Some(Box::new(result)),
            ..Self::bare(TypeKind::FunctionNoProto, "")
        }
    }

    /// Record type referring to the struct/union declared as `id`.
    pub fn record(kind: NodeKind, name: &str, id: NodeId, size: u64, align: u64) -> Self {
        let keyword = if kind == NodeKind::UnionDecl { "union" } else { "struct" };
        Self {
            size: Some(size),
            align: Some(align),
            decl: Some(DeclRef {
                id,
                kind,
                spelling: name.to_string(),
            }),
            ..Self::bare(TypeKind::Record, format!("{keyword} {name}"))
        }
    }

    /// Record type of a declared-but-never-defined struct.
    pub fn incomplete_record(name: &str, id: NodeId) -> Self {
        Self {
            decl: Some(DeclRef {
                id,
                kind: NodeKind::StructDecl,
                spelling: name.to_string(),
            }),
            ..Self::bare(TypeKind::Record, format!("struct {name}"))
        }
    }

    /// Enumeration type referring to the enum declared as `id`.
    pub fn enumeration(name: &str, id: NodeId) -> Self {
        Self {
            size: Some(4),
            align: Some(4),
            decl: Some(DeclRef {
                id,
                kind: NodeKind::EnumDecl,
                spelling: name.to_string(),
            }),
            ..Self::bare(TypeKind::Enum, format!("enum {name}"))
        }
    }

    /// Elaborated reference (`struct point`) to `named`.
    pub fn elaborated(named: TypeDesc) -> Self {
        let canonical = named.canonical().clone();
        Self {
            spelling: named.spelling.clone(),
            size: named.size,
            align: named.align,
            decl: named.decl.clone(),
            canonical: Some(Box::new(canonical)),
            named: Some(Box::new(named)),
            ..Self::bare(TypeKind::Elaborated, "")
        }
    }

    /// Typedef reference `name` to `underlying`, declared as `id`.
    pub fn typedef(name: &str, id: NodeId, underlying: &TypeDesc) -> Self {
        Self {
            size: underlying.size,
            align: underlying.align,
            canonical: Some(Box::new(underlying.canonical().clone())),
            decl: Some(DeclRef {
                id,
                kind: NodeKind::TypedefDecl,
                spelling: name.to_string(),
            }),
            ..Self::bare(TypeKind::Typedef, name)
        }
    }

    /// The canonical form of this type.
    pub fn canonical(&self) -> &TypeDesc {
        self.canonical.as_deref().unwrap_or(self)
    }

    pub fn pointee(&self) -> Option<&TypeDesc> {
        self.pointee.as_deref()
    }

    pub fn element(&self) -> Option<&TypeDesc> {
        self.element.as_deref()
    }

    pub fn named(&self) -> Option<&TypeDesc> {
        self.named.as_deref()
    }

    pub fn result(&self) -> Option<&TypeDesc> {
        self.result.as_deref()
    }
}

impl fmt::Display for TypeDesc {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.spelling.is_empty() {
            write!(f, "<{:?}>", self.kind)
        } else {
            f.write_str(&self.spelling)
        }
    }
}
