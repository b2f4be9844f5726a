//! libclang-backed front-end.
//!
//! Converts a libclang translation unit into an owned [`Node`] tree in one
//! pass, so nothing downstream holds libclang handles. Declarations get
//! their [`NodeId`] from their source position, which makes the id of a
//! record cursor equal to the id found in every type that refers to it.

use std::collections::HashMap;
use std::ffi::{CStr, CString};
use std::os::raw::{c_char, c_int, c_uint};
use std::path::Path;
use std::ptr;

use clang_sys::*;
use tracing::debug;

use crate::diagnostic::{Diagnostic, Severity};
use crate::error::{FrontEndError, Result};
use crate::frontend::{FrontEnd, TranslationUnit};
use crate::node::{Node, NodeId, NodeKind, SourceLocation};
use crate::types::{DeclRef, TypeDesc, TypeKind};

/// Front-end that parses headers with libclang.
#[derive(Debug, Default)]
pub struct ClangFrontEnd;

impl ClangFrontEnd {
    pub fn new() -> Self {
        Self
    }
}

impl FrontEnd for ClangFrontEnd {
    fn parse(&self, path: &Path, args: &[String]) -> Result<TranslationUnit> {
        let c_path = CString::new(path.to_string_lossy().as_bytes()).map_err(|_| {
            FrontEndError::Parse {
                detail: format!("path contains a NUL byte: {}", path.display()),
            }
        })?;
        let c_args = args
            .iter()
            .map(|a| CString::new(a.as_str()))
            .collect::<std::result::Result<Vec<_>, _>>()
            .map_err(|_| FrontEndError::Parse {
                detail: "preprocessor argument contains a NUL byte".to_string(),
            })?;
        let arg_ptrs: Vec<*const c_char> = c_args.iter().map(|a| a.as_ptr()).collect();

        unsafe {
            let index = clang_createIndex(0, 0);
            if index.is_null() {
                return Err(FrontEndError::Parse {
                    detail: "failed to create clang index".to_string(),
                });
            }

            let options =
                CXTranslationUnit_DetailedPreprocessingRecord | CXTranslationUnit_SkipFunctionBodies;
            let tu = clang_parseTranslationUnit(
                index,
                c_path.as_ptr(),
                arg_ptrs.as_ptr(),
                arg_ptrs.len() as c_int,
                ptr::null_mut(),
                0,
                options,
            );
            if tu.is_null() {
                clang_disposeIndex(index);
                return Err(FrontEndError::Parse {
                    detail: format!("libclang could not parse {}", path.display()),
                });
            }

            let diagnostics = collect_diagnostics(tu);
            let mut converter = Converter::default();
            let root = converter.convert_cursor(clang_getTranslationUnitCursor(tu));
            debug!(nodes = root.subtree_len(), "converted libclang tree");

            clang_disposeTranslationUnit(tu);
            clang_disposeIndex(index);

            Ok(TranslationUnit { root, diagnostics })
        }
    }
}

unsafe fn collect_diagnostics(tu: CXTranslationUnit) -> Vec<Diagnostic> {
    let count = clang_getNumDiagnostics(tu);
    let mut out = Vec::with_capacity(count as usize);
    for i in 0..count {
        let diag = clang_getDiagnostic(tu, i);
        let severity = match clang_getDiagnosticSeverity(diag) {
            CXDiagnostic_Note => Severity::Note,
            CXDiagnostic_Warning => Severity::Warning,
            CXDiagnostic_Error => Severity::Error,
            CXDiagnostic_Fatal => Severity::Fatal,
            _ => Severity::Ignored,
        };
        let message = cx_string(clang_getDiagnosticSpelling(diag));
        let location = source_location(clang_getDiagnosticLocation(diag));
        clang_disposeDiagnostic(diag);
        out.push(Diagnostic {
            severity,
            location,
            message,
        });
    }
    out
}

unsafe fn cx_string(s: CXString) -> String {
    let raw = clang_getCString(s);
    let out = if raw.is_null() {
        String::new()
    } else {
        CStr::from_ptr(raw).to_string_lossy().into_owned()
    };
    clang_disposeString(s);
    out
}

unsafe fn source_location(loc: CXSourceLocation) -> Option<SourceLocation> {
    let (file, line, column, _) = spelling_position(loc);
    file.map(|file| SourceLocation { file, line, column })
}

unsafe fn spelling_position(loc: CXSourceLocation) -> (Option<String>, u32, u32, u32) {
    let mut file: CXFile = ptr::null_mut();
    let mut line: c_uint = 0;
    let mut column: c_uint = 0;
    let mut offset: c_uint = 0;
    clang_getSpellingLocation(loc, &mut file, &mut line, &mut column, &mut offset);
    let name = if file.is_null() {
        None
    } else {
        Some(cx_string(clang_getFileName(file)))
    };
    (name, line, column, offset)
}

extern "C" fn push_child(
    child: CXCursor,
    _parent: CXCursor,
    data: CXClientData,
) -> CXChildVisitResult {
    // SAFETY: `data` is the `Vec<CXCursor>` passed by `children_of`, alive
    // for the duration of `clang_visitChildren`.
    let children = unsafe { &mut *(data as *mut Vec<CXCursor>) };
    children.push(child);
    CXChildVisit_Continue
}

unsafe fn children_of(cursor: CXCursor) -> Vec<CXCursor> {
    let mut children: Vec<CXCursor> = Vec::new();
    clang_visitChildren(
        cursor,
        push_child,
        &mut children as *mut Vec<CXCursor> as CXClientData,
    );
    children
}

fn node_kind(kind: CXCursorKind) -> NodeKind {
    match kind {
        CXCursor_TranslationUnit => NodeKind::TranslationUnit,
        CXCursor_StructDecl => NodeKind::StructDecl,
        CXCursor_UnionDecl => NodeKind::UnionDecl,
        CXCursor_EnumDecl => NodeKind::EnumDecl,
        CXCursor_EnumConstantDecl => NodeKind::EnumConstantDecl,
        CXCursor_FieldDecl => NodeKind::FieldDecl,
        CXCursor_FunctionDecl => NodeKind::FunctionDecl,
        CXCursor_ParmDecl => NodeKind::ParmDecl,
        CXCursor_TypedefDecl => NodeKind::TypedefDecl,
        CXCursor_VarDecl => NodeKind::VarDecl,
        CXCursor_MacroDefinition => NodeKind::MacroDefinition,
        CXCursor_MacroExpansion => NodeKind::MacroInstantiation,
        CXCursor_InclusionDirective => NodeKind::InclusionDirective,
        CXCursor_LinkageSpec => NodeKind::LinkageSpec,
        CXCursor_TypeRef => NodeKind::TypeRef,
        _ => NodeKind::Other,
    }
}

fn type_kind(kind: CXTypeKind) -> TypeKind {
    match kind {
        CXType_Void => TypeKind::Void,
        CXType_Bool => TypeKind::Bool,
        CXType_Char_U => TypeKind::CharU,
        CXType_UChar => TypeKind::UChar,
        CXType_Char_S => TypeKind::CharS,
        CXType_SChar => TypeKind::SChar,
        CXType_Short => TypeKind::Short,
        CXType_UShort => TypeKind::UShort,
        CXType_Int => TypeKind::Int,
        CXType_UInt => TypeKind::UInt,
        CXType_Long => TypeKind::Long,
        CXType_ULong => TypeKind::ULong,
        CXType_LongLong => TypeKind::LongLong,
        CXType_ULongLong => TypeKind::ULongLong,
        CXType_Int128 => TypeKind::Int128,
        CXType_UInt128 => TypeKind::UInt128,
        CXType_Float => TypeKind::Float,
        CXType_Double => TypeKind::Double,
        CXType_LongDouble => TypeKind::LongDouble,
        CXType_Pointer => TypeKind::Pointer,
        CXType_Record => TypeKind::Record,
        CXType_Enum => TypeKind::Enum,
        CXType_Typedef => TypeKind::Typedef,
        CXType_Elaborated => TypeKind::Elaborated,
        CXType_ConstantArray => TypeKind::ConstantArray,
        CXType_IncompleteArray => TypeKind::IncompleteArray,
        CXType_VariableArray => TypeKind::VariableArray,
        CXType_FunctionProto => TypeKind::FunctionProto,
        CXType_FunctionNoProto => TypeKind::FunctionNoProto,
        _ => TypeKind::Other,
    }
}

fn non_negative(v: i64) -> Option<u64> {
    u64::try_from(v).ok()
}

/// Assigns position-derived ids and converts cursors and types.
#[derive(Default)]
struct Converter {
    ids: HashMap<(String, u32, NodeKind), NodeId>,
    next: u64,
}

impl Converter {
    fn fresh_id(&mut self) -> NodeId {
        let id = NodeId(self.next);
        self.next += 1;
        id
    }

    unsafe fn id_for(&mut self, cursor: CXCursor, kind: NodeKind) -> NodeId {
        let (file, _, _, offset) = spelling_position(clang_getCursorLocation(cursor));
        match file {
            Some(file) => {
                if let Some(id) = self.ids.get(&(file.clone(), offset, kind)) {
                    return *id;
                }
                let id = self.fresh_id();
                self.ids.insert((file, offset, kind), id);
                id
            }
            None => self.fresh_id(),
        }
    }

    unsafe fn spelling(&self, cursor: CXCursor) -> String {
        if clang_Cursor_isAnonymous(cursor) != 0 {
            return String::new();
        }
        cx_string(clang_getCursorSpelling(cursor))
    }

    unsafe fn convert_cursor(&mut self, cursor: CXCursor) -> Node {
        let kind = node_kind(clang_getCursorKind(cursor));
        let id = self.id_for(cursor, kind);
        let mut node = Node::new(id, kind, self.spelling(cursor));
        node.location = source_location(clang_getCursorLocation(cursor));
        node.is_definition = clang_isCursorDefinition(cursor) != 0;

        match kind {
            NodeKind::StructDecl
            | NodeKind::UnionDecl
            | NodeKind::EnumDecl
            | NodeKind::FieldDecl
            | NodeKind::ParmDecl
            | NodeKind::VarDecl => {
                node.ty = Some(self.convert_type(clang_getCursorType(cursor)));
            }
            NodeKind::EnumConstantDecl => {
                node.ty = Some(self.convert_type(clang_getCursorType(cursor)));
                node.enum_value = Some(clang_getEnumConstantDeclValue(cursor));
            }
            NodeKind::FunctionDecl => {
                let fn_ty = clang_getCursorType(cursor);
                node.is_variadic = clang_isFunctionTypeVariadic(fn_ty) != 0;
                node.ty = Some(self.convert_type(fn_ty));
                node.result_ty = Some(self.convert_type(clang_getCursorResultType(cursor)));
            }
            NodeKind::TypedefDecl => {
                node.ty = Some(self.convert_type(clang_getCursorType(cursor)));
                node.underlying_ty =
                    Some(self.convert_type(clang_getTypedefDeclUnderlyingType(cursor)));
            }
            _ => {}
        }

        if kind == NodeKind::FieldDecl && clang_Cursor_isBitField(cursor) != 0 {
            node.bit_width = u32::try_from(clang_getFieldDeclBitWidth(cursor)).ok();
        }

        // Macro and inclusion cursors have no children worth keeping.
        if !matches!(
            kind,
            NodeKind::MacroDefinition | NodeKind::MacroInstantiation | NodeKind::InclusionDirective
        ) {
            for child in children_of(cursor) {
                node.children.push(self.convert_cursor(child));
            }
        }
        node
    }

    unsafe fn decl_ref(&mut self, ty: CXType) -> Option<DeclRef> {
        let decl = clang_getTypeDeclaration(ty);
        if clang_Cursor_isNull(decl) != 0 || clang_getCursorKind(decl) == CXCursor_NoDeclFound {
            return None;
        }
        let kind = node_kind(clang_getCursorKind(decl));
        Some(DeclRef {
            id: self.id_for(decl, kind),
            kind,
            spelling: self.spelling(decl),
        })
    }

    unsafe fn convert_type(&mut self, ty: CXType) -> TypeDesc {
        let kind = type_kind(ty.kind);
        let mut desc = TypeDesc::bare(kind, cx_string(clang_getTypeSpelling(ty)));
        desc.size = non_negative(clang_Type_getSizeOf(ty));
        desc.align = non_negative(clang_Type_getAlignOf(ty));

        let canonical = clang_getCanonicalType(ty);
        if clang_equalTypes(canonical, ty) == 0 {
            desc.canonical = Some(Box::new(self.convert_type(canonical)));
        }

        match kind {
            TypeKind::Pointer => {
                desc.pointee = Some(Box::new(self.convert_type(clang_getPointeeType(ty))));
            }
            TypeKind::ConstantArray | TypeKind::IncompleteArray | TypeKind::VariableArray => {
                desc.element = Some(Box::new(self.convert_type(clang_getArrayElementType(ty))));
                desc.array_len = non_negative(clang_getArraySize(ty));
            }
            TypeKind::Elaborated => {
                desc.named = Some(Box::new(self.convert_type(clang_Type_getNamedType(ty))));
                desc.decl = self.decl_ref(ty);
            }
            TypeKind::Record | TypeKind::Enum | TypeKind::Typedef => {
                desc.decl = self.decl_ref(ty);
            }
            TypeKind::FunctionProto | TypeKind::FunctionNoProto => {
                desc.result = Some(Box::new(self.convert_type(clang_getResultType(ty))));
                let n = clang_getNumArgTypes(ty);
                for i in 0..n.max(0) {
                    let arg = clang_getArgType(ty, i as c_uint);
                    desc.args.push(self.convert_type(arg));
                }
                desc.variadic = clang_isFunctionTypeVariadic(ty) != 0;
            }
            _ => {}
        }
        desc
    }
}
