//! The type resolver.
//!
//! Maps a front-end [`TypeDesc`] onto a [`TypeExpr`]. Rules, in order:
//!
//! 1. Record and elaborated references resolve to the aggregate's name.
//!    Aggregates are never expanded inline, which is what terminates
//!    resolution on self-referential and mutually recursive records.
//! 2. Pointers to records resolve to a pointer to the name, pointers to
//!    functions to a function pointer, anything else to a pointer to the
//!    recursively resolved pointee.
//! 3. Fixed-size arrays resolve their element and keep the declared length.
//! 4. Everything else goes through the canonical type and a fixed scalar
//!    table; kinds outside the table are [`CoreError::UnsupportedType`].
//!
//! Resolution is a pure function of the descriptor.

use hdrbind_ast::{TypeDesc, TypeKind};

use crate::error::{CoreError, Result};
use crate::expr::{Primitive, TypeExpr};
use crate::naming;

/// Resolve a type descriptor into a binding type expression.
pub fn resolve(ty: &TypeDesc) -> Result<TypeExpr> {
    match ty.kind {
        TypeKind::Record => Ok(TypeExpr::named(record_name(ty)?)),
        TypeKind::Elaborated => match ty.named() {
            Some(named) => resolve(named),
            None => resolve_through_canonical(ty),
        },
        TypeKind::Typedef => resolve_through_canonical(ty),
        TypeKind::Pointer => resolve_pointer(ty),
        TypeKind::ConstantArray | TypeKind::IncompleteArray => resolve_array(ty),
        _ => {
            let canonical = ty.canonical();
            if ty.canonical.is_some() && is_structural(canonical.kind) {
                resolve(canonical)
            } else {
                scalar(canonical)
            }
        }
    }
}

/// Resolve the declared type of a function parameter.
///
/// Array parameters decay to a pointer to their element, as in C.
pub fn resolve_parameter(ty: &TypeDesc) -> Result<TypeExpr> {
    let canonical = ty.canonical();
    if canonical.kind.is_array() {
        let element = canonical.element().ok_or_else(|| unsupported(ty))?;
        return Ok(TypeExpr::pointer(resolve(element)?));
    }
    resolve(ty)
}

fn is_structural(kind: TypeKind) -> bool {
    matches!(
        kind,
        TypeKind::Record | TypeKind::Pointer | TypeKind::ConstantArray | TypeKind::IncompleteArray
    )
}

fn unsupported(ty: &TypeDesc) -> CoreError {
    CoreError::UnsupportedType {
        kind: ty.kind,
        spelling: ty.spelling.clone(),
    }
}

fn resolve_through_canonical(ty: &TypeDesc) -> Result<TypeExpr> {
    match ty.canonical.as_deref() {
        Some(canonical) => resolve(canonical),
        None => Err(unsupported(ty)),
    }
}

fn record_name(ty: &TypeDesc) -> Result<String> {
    if let Some(decl) = &ty.decl {
        return Ok(naming::referenced_name(decl));
    }
    let bare = ty
        .spelling
        .trim_start_matches("const ")
        .trim_start_matches("struct ")
        .trim_start_matches("union ")
        .trim();
    if naming::is_anonymous_spelling(bare) {
        return Err(unsupported(ty));
    }
    Ok(bare.to_string())
}

fn resolve_pointer(ty: &TypeDesc) -> Result<TypeExpr> {
    let pointee = ty
        .pointee()
        .or_else(|| ty.canonical().pointee())
        .ok_or_else(|| unsupported(ty))?;
    let target = pointee.canonical();
    match target.kind {
        TypeKind::Record => Ok(TypeExpr::pointer(TypeExpr::named(record_name(target)?))),
        TypeKind::FunctionProto => function_pointer(target, true),
        TypeKind::FunctionNoProto => function_pointer(target, false),
        _ => Ok(TypeExpr::pointer(resolve(pointee)?)),
    }
}

fn function_pointer(fn_ty: &TypeDesc, prototyped: bool) -> Result<TypeExpr> {
    let result = fn_ty.result().ok_or_else(|| unsupported(fn_ty))?;
    let ret = resolve(result)?;
    let args = if prototyped {
        Some(
            fn_ty
                .args
                .iter()
                .map(resolve_parameter)
                .collect::<Result<Vec<_>>>()?,
        )
    } else {
        None
    };
    Ok(TypeExpr::fn_pointer(ret, args))
}

fn resolve_array(ty: &TypeDesc) -> Result<TypeExpr> {
    let element = ty.element().ok_or_else(|| unsupported(ty))?;
    let len = match ty.kind {
        TypeKind::IncompleteArray => 0,
        _ => ty.array_len.ok_or_else(|| unsupported(ty))?,
    };
    // Pointer elements go straight through the pointer rules so the pointee
    // is unwrapped once, not wrapped a second time.
    let element_expr = if element.kind == TypeKind::Pointer {
        resolve_pointer(element)?
    } else if element.canonical().kind == TypeKind::Pointer {
        resolve_pointer(element.canonical())?
    } else {
        resolve(element)?
    };
    Ok(TypeExpr::array(element_expr, len))
}

fn scalar(canonical: &TypeDesc) -> Result<TypeExpr> {
    let prim = match canonical.kind {
        TypeKind::Void => return Ok(TypeExpr::Void),
        TypeKind::CharS | TypeKind::SChar => Primitive::I8,
        TypeKind::CharU | TypeKind::UChar => Primitive::U8,
        TypeKind::Short => Primitive::I16,
        TypeKind::UShort => Primitive::U16,
        TypeKind::Int => Primitive::I32,
        TypeKind::UInt => Primitive::U32,
        TypeKind::Long if canonical.size == Some(4) => Primitive::I32,
        TypeKind::Long | TypeKind::LongLong => Primitive::I64,
        TypeKind::ULong if canonical.size == Some(4) => Primitive::U32,
        TypeKind::ULong | TypeKind::ULongLong => Primitive::U64,
        TypeKind::Float => Primitive::F32,
        TypeKind::Double => Primitive::F64,
        TypeKind::Enum => Primitive::I32,
        _ => return Err(unsupported(canonical)),
    };
    Ok(TypeExpr::prim(prim))
}

#[cfg(test)]
mod tests {
    use super::*;
    use hdrbind_ast::{NodeId, NodeKind};
    use pretty_assertions::assert_eq;
    use rstest::rstest;

    fn point() -> TypeDesc {
        TypeDesc::record(NodeKind::StructDecl, "point", NodeId(1), 16, 8)
    }

    #[rstest]
    #[case(TypeKind::CharS, 1, Primitive::I8)]
    #[case(TypeKind::SChar, 1, Primitive::I8)]
    #[case(TypeKind::CharU, 1, Primitive::U8)]
    #[case(TypeKind::UChar, 1, Primitive::U8)]
    #[case(TypeKind::Short, 2, Primitive::I16)]
    #[case(TypeKind::UShort, 2, Primitive::U16)]
    #[case(TypeKind::Int, 4, Primitive::I32)]
    #[case(TypeKind::UInt, 4, Primitive::U32)]
    #[case(TypeKind::Long, 8, Primitive::I64)]
    #[case(TypeKind::Long, 4, Primitive::I32)]
    #[case(TypeKind::ULong, 8, Primitive::U64)]
    #[case(TypeKind::ULong, 4, Primitive::U32)]
    #[case(TypeKind::LongLong, 8, Primitive::I64)]
    #[case(TypeKind::ULongLong, 8, Primitive::U64)]
    #[case(TypeKind::Float, 4, Primitive::F32)]
    #[case(TypeKind::Double, 8, Primitive::F64)]
    #[case(TypeKind::Enum, 4, Primitive::I32)]
    fn scalar_table(#[case] kind: TypeKind, #[case] size: u64, #[case] expected: Primitive) {
        let ty = TypeDesc::scalar(kind, "t", size);
        assert_eq!(resolve(&ty).unwrap(), TypeExpr::prim(expected));
    }

    #[rstest]
    #[case(TypeKind::LongDouble)]
    #[case(TypeKind::Bool)]
    #[case(TypeKind::Int128)]
    #[case(TypeKind::VariableArray)]
    #[case(TypeKind::Other)]
    fn kinds_outside_table_are_unsupported(#[case] kind: TypeKind) {
        let err = resolve(&TypeDesc::scalar(kind, "weird", 16)).unwrap_err();
        assert!(matches!(err, CoreError::UnsupportedType { .. }));
        assert!(err.is_fatal());
    }

    #[test]
    fn void_is_no_value_marker() {
        assert_eq!(resolve(&TypeDesc::void()).unwrap(), TypeExpr::Void);
    }

    #[test]
    fn typedef_chain_normalizes_to_primitive() {
        let a = TypeDesc::typedef("int_a", NodeId(2), &TypeDesc::int());
        let b = TypeDesc::typedef("int_b", NodeId(3), &a);
        assert_eq!(resolve(&b).unwrap(), TypeExpr::prim(Primitive::I32));
    }

    #[test]
    fn record_resolves_to_bare_name() {
        assert_eq!(resolve(&point()).unwrap(), TypeExpr::named("point"));
        let elab = TypeDesc::elaborated(point());
        assert_eq!(resolve(&elab).unwrap(), TypeExpr::named("point"));
    }

    #[test]
    fn typedef_to_record_resolves_to_record_name() {
        let alias = TypeDesc::typedef("point_t", NodeId(5), &point());
        assert_eq!(resolve(&alias).unwrap(), TypeExpr::named("point"));
    }

    #[test]
    fn anonymous_record_gets_synthetic_name() {
        let anon = TypeDesc::record(NodeKind::UnionDecl, "", NodeId(44), 8, 8);
        assert_eq!(resolve(&anon).unwrap(), TypeExpr::named("_anon_union_44"));
    }

    #[test]
    fn pointer_to_record() {
        let p = TypeDesc::pointer_to(TypeDesc::elaborated(point()));
        assert_eq!(resolve(&p).unwrap(), TypeExpr::pointer(TypeExpr::named("point")));
    }

    #[test]
    fn pointer_to_self_does_not_recurse() {
        // struct node { struct node *next; }
        let node = TypeDesc::record(NodeKind::StructDecl, "node", NodeId(8), 8, 8);
        let next = TypeDesc::pointer_to(TypeDesc::elaborated(node));
        assert_eq!(resolve(&next).unwrap(), TypeExpr::pointer(TypeExpr::named("node")));
    }

    #[test]
    fn pointer_to_pointer() {
        let pp = TypeDesc::pointer_to(TypeDesc::pointer_to(TypeDesc::int()));
        assert_eq!(
            resolve(&pp).unwrap(),
            TypeExpr::pointer(TypeExpr::pointer(TypeExpr::prim(Primitive::I32)))
        );
    }

    #[test]
    fn void_pointer() {
        let p = TypeDesc::pointer_to(TypeDesc::void());
        assert_eq!(resolve(&p).unwrap(), TypeExpr::pointer(TypeExpr::Void));
    }

    #[test]
    fn function_pointer_with_prototype() {
        // int (*)(int x, int *y)
        let f = TypeDesc::function(
            TypeDesc::int(),
            vec![TypeDesc::int(), TypeDesc::pointer_to(TypeDesc::int())],
        );
        let p = TypeDesc::pointer_to(f);
        assert_eq!(
            resolve(&p).unwrap(),
            TypeExpr::fn_pointer(
                TypeExpr::prim(Primitive::I32),
                Some(vec![
                    TypeExpr::prim(Primitive::I32),
                    TypeExpr::pointer(TypeExpr::prim(Primitive::I32)),
                ]),
            )
        );
    }

    #[test]
    fn function_pointer_with_empty_prototype() {
        let p = TypeDesc::pointer_to(TypeDesc::function(TypeDesc::void(), vec![]));
        assert_eq!(
            resolve(&p).unwrap(),
            TypeExpr::fn_pointer(TypeExpr::Void, Some(vec![]))
        );
    }

    #[test]
    fn function_pointer_without_prototype() {
        let p = TypeDesc::pointer_to(TypeDesc::function_no_proto(TypeDesc::int()));
        assert_eq!(
            resolve(&p).unwrap(),
            TypeExpr::fn_pointer(TypeExpr::prim(Primitive::I32), None)
        );
    }

    #[test]
    fn function_pointer_through_typedef() {
        // typedef int (*cproc)(int a, int b);  cproc field;
        let fp = TypeDesc::pointer_to(TypeDesc::function(
            TypeDesc::int(),
            vec![TypeDesc::int(), TypeDesc::int()],
        ));
        let alias = TypeDesc::typedef("cproc", NodeId(3), &fp);
        let expected = TypeExpr::fn_pointer(
            TypeExpr::prim(Primitive::I32),
            Some(vec![TypeExpr::prim(Primitive::I32), TypeExpr::prim(Primitive::I32)]),
        );
        assert_eq!(resolve(&alias).unwrap(), expected);
    }

    #[test]
    fn array_of_scalars() {
        let arr = TypeDesc::array_of(TypeDesc::int(), 15);
        assert_eq!(
            resolve(&arr).unwrap(),
            TypeExpr::array(TypeExpr::prim(Primitive::I32), 15)
        );
    }

    #[test]
    fn array_of_pointers_is_not_double_wrapped() {
        // int *b[2]
        let arr = TypeDesc::array_of(TypeDesc::pointer_to(TypeDesc::int()), 2);
        assert_eq!(
            resolve(&arr).unwrap(),
            TypeExpr::array(TypeExpr::pointer(TypeExpr::prim(Primitive::I32)), 2)
        );
    }

    #[test]
    fn array_of_function_pointers() {
        let fp = TypeDesc::pointer_to(TypeDesc::function(TypeDesc::int(), vec![TypeDesc::int()]));
        let arr = TypeDesc::array_of(fp, 3);
        assert_eq!(
            resolve(&arr).unwrap(),
            TypeExpr::array(
                TypeExpr::fn_pointer(
                    TypeExpr::prim(Primitive::I32),
                    Some(vec![TypeExpr::prim(Primitive::I32)])
                ),
                3
            )
        );
    }

    #[test]
    fn incomplete_array_has_zero_length() {
        let mut arr = TypeDesc::bare(TypeKind::IncompleteArray, "int[]");
        arr.element = Some(Box::new(TypeDesc::int()));
        assert_eq!(
            resolve(&arr).unwrap(),
            TypeExpr::array(TypeExpr::prim(Primitive::I32), 0)
        );
    }

    #[test]
    fn array_parameter_decays_to_pointer() {
        let arr = TypeDesc::array_of(TypeDesc::double(), 4);
        assert_eq!(
            resolve_parameter(&arr).unwrap(),
            TypeExpr::pointer(TypeExpr::prim(Primitive::F64))
        );
        assert_eq!(
            resolve_parameter(&TypeDesc::int()).unwrap(),
            TypeExpr::prim(Primitive::I32)
        );
    }

    #[test]
    fn typedef_without_canonical_is_unsupported() {
        let broken = TypeDesc::bare(TypeKind::Typedef, "mystery_t");
        assert!(matches!(
            resolve(&broken),
            Err(CoreError::UnsupportedType { .. })
        ));
    }

    #[test]
    fn resolution_is_deterministic() {
        let f = TypeDesc::pointer_to(TypeDesc::function(
            TypeDesc::pointer_to(TypeDesc::elaborated(point())),
            vec![TypeDesc::array_of(TypeDesc::int(), 3)],
        ));
        assert_eq!(resolve(&f).unwrap(), resolve(&f).unwrap());
    }
}
