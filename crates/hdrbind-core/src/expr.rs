//! Binding type expressions.
//!
//! A [`TypeExpr`] is the resolved, target-neutral form of a C type. Templates
//! decide the concrete spelling; this module only fixes the structure.

use std::fmt;

use serde::Serialize;

/// Fixed-width primitives of the binding vocabulary.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Primitive {
    I8,
    U8,
    I16,
    U16,
    I32,
    U32,
    I64,
    U64,
    F32,
    F64,
}

impl Primitive {
    /// All primitives, in the order the alias header lists them.
    pub const ALL: [Primitive; 10] = [
        Primitive::I8,
        Primitive::U8,
        Primitive::I16,
        Primitive::U16,
        Primitive::I32,
        Primitive::U32,
        Primitive::I64,
        Primitive::U64,
        Primitive::F32,
        Primitive::F64,
    ];

    /// Size in bytes; primitives are naturally aligned.
    pub fn size(&self) -> u64 {
        match self {
            Primitive::I8 | Primitive::U8 => 1,
            Primitive::I16 | Primitive::U16 => 2,
            Primitive::I32 | Primitive::U32 | Primitive::F32 => 4,
            Primitive::I64 | Primitive::U64 | Primitive::F64 => 8,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Primitive::I8 => "i8",
            Primitive::U8 => "u8",
            Primitive::I16 => "i16",
            Primitive::U16 => "u16",
            Primitive::I32 => "i32",
            Primitive::U32 => "u32",
            Primitive::I64 => "i64",
            Primitive::U64 => "u64",
            Primitive::F32 => "f32",
            Primitive::F64 => "f64",
        }
    }
}

impl fmt::Display for Primitive {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A resolved type expression.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case", tag = "expr")]
pub enum TypeExpr {
    /// The no-value marker (`void`).
    Void,
    Prim { prim: Primitive },
    /// Reference by name to an aggregate or alias emitted in the same artifact.
    Named { name: String },
    Pointer { to: Box<TypeExpr> },
    /// Function pointer. `args` is `None` for a function declared without a prototype.
    FnPointer {
        ret: Box<TypeExpr>,
        args: Option<Vec<TypeExpr>>,
    },
    Array { element: Box<TypeExpr>, len: u64 },
}

impl TypeExpr {
    pub fn prim(prim: Primitive) -> Self {
        TypeExpr::Prim { prim }
    }

    pub fn named(name: impl Into<String>) -> Self {
        TypeExpr::Named { name: name.into() }
    }

    pub fn pointer(to: TypeExpr) -> Self {
        TypeExpr::Pointer { to: Box::new(to) }
    }

    pub fn fn_pointer(ret: TypeExpr, args: Option<Vec<TypeExpr>>) -> Self {
        TypeExpr::FnPointer {
            ret: Box::new(ret),
            args,
        }
    }

    pub fn array(element: TypeExpr, len: u64) -> Self {
        TypeExpr::Array {
            element: Box::new(element),
            len,
        }
    }

    /// The name this expression refers to, if it is a bare name.
    pub fn as_name(&self) -> Option<&str> {
        match self {
            TypeExpr::Named { name } => Some(name),
            _ => None,
        }
    }

    /// Every name referenced anywhere inside this expression, in order.
    pub fn referenced_names(&self) -> Vec<&str> {
        let mut out = Vec::new();
        self.collect_names(&mut out);
        out
    }

    fn collect_names<'a>(&'a self, out: &mut Vec<&'a str>) {
        match self {
            TypeExpr::Void | TypeExpr::Prim { .. } => {}
            TypeExpr::Named { name } => out.push(name),
            TypeExpr::Pointer { to } => to.collect_names(out),
            TypeExpr::FnPointer { ret, args } => {
                ret.collect_names(out);
                for arg in args.iter().flatten() {
                    arg.collect_names(out);
                }
            }
            TypeExpr::Array { element, .. } => element.collect_names(out),
        }
    }
}

impl fmt::Display for TypeExpr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TypeExpr::Void => write!(f, "void"),
            TypeExpr::Prim { prim } => write!(f, "{prim}"),
            TypeExpr::Named { name } => write!(f, "{name}"),
            TypeExpr::Pointer { to } => write!(f, "*{to}"),
            TypeExpr::FnPointer { ret, args } => {
                write!(f, "fn(")?;
                match args {
                    Some(args) => {
                        for (i, arg) in args.iter().enumerate() {
                            if i > 0 {
                                write!(f, ", ")?;
                            }
                            write!(f, "{arg}")?;
                        }
                    }
                    None => write!(f, "..")?,
                }
                write!(f, ") -> {ret}")
            }
            TypeExpr::Array { element, len } => write!(f, "[{element}; {len}]"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_is_compact() {
        let e = TypeExpr::fn_pointer(
            TypeExpr::prim(Primitive::I32),
            Some(vec![
                TypeExpr::pointer(TypeExpr::named("point")),
                TypeExpr::array(TypeExpr::prim(Primitive::U8), 4),
            ]),
        );
        assert_eq!(e.to_string(), "fn(*point, [u8; 4]) -> i32");
        let no_proto = TypeExpr::fn_pointer(TypeExpr::Void, None);
        assert_eq!(no_proto.to_string(), "fn(..) -> void");
    }

    #[test]
    fn referenced_names_walks_everything() {
        let e = TypeExpr::fn_pointer(
            TypeExpr::named("ret_t"),
            Some(vec![TypeExpr::pointer(TypeExpr::named("a")), TypeExpr::named("b")]),
        );
        assert_eq!(e.referenced_names(), vec!["ret_t", "a", "b"]);
    }

    #[test]
    fn primitive_sizes() {
        assert_eq!(Primitive::I8.size(), 1);
        assert_eq!(Primitive::U16.size(), 2);
        assert_eq!(Primitive::F32.size(), 4);
        assert_eq!(Primitive::U64.size(), 8);
    }
}
