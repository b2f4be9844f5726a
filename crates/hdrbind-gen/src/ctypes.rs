//! Python `ctypes` template.
//!
//! Aggregates are introduced as empty classes and completed by assigning
//! `_fields_` afterwards, which is the only way `ctypes` expresses
//! self-referential and mutually recursive records.

use std::borrow::Cow;

use hdrbind_core::{
    Aggregate, AggregateKind, Enumeration, Function, Primitive, TypeAlias, TypeExpr,
};

use crate::config::EnumMode;
use crate::template::BindingTemplate;

const INDENT: &str = "    ";

const PYTHON_KEYWORDS: &[&str] = &[
    "False", "None", "True", "and", "as", "assert", "async", "await", "break", "class",
    "continue", "def", "del", "elif", "else", "except", "finally", "for", "from", "global",
    "if", "import", "in", "is", "lambda", "nonlocal", "not", "or", "pass", "raise", "return",
    "try", "while", "with", "yield",
];

/// Renders bindings as a Python module built on `ctypes`.
#[derive(Debug, Clone, Copy, Default)]
pub struct CtypesTemplate;

impl CtypesTemplate {
    pub fn new() -> Self {
        Self
    }

    fn primitive(prim: Primitive) -> &'static str {
        match prim {
            Primitive::I8 => "c_int8",
            Primitive::U8 => "c_uint8",
            Primitive::I16 => "c_int16",
            Primitive::U16 => "c_uint16",
            Primitive::I32 => "c_int32",
            Primitive::U32 => "c_uint32",
            Primitive::I64 => "c_int64",
            Primitive::U64 => "c_uint64",
            Primitive::F32 => "c_float",
            Primitive::F64 => "c_double",
        }
    }

    fn base_class(kind: AggregateKind) -> &'static str {
        match kind {
            AggregateKind::Struct => "Structure",
            AggregateKind::Union => "Union",
        }
    }

    fn signature(&self, ret: &TypeExpr, args: &[TypeExpr]) -> String {
        let mut parts = vec![self.type_expr(ret)];
        parts.extend(args.iter().map(|arg| self.type_expr(arg)));
        format!("CFUNCTYPE({})", parts.join(", "))
    }
}

/// Escape identifiers that are Python keywords with a trailing underscore.
pub fn escape(name: &str) -> Cow<'_, str> {
    if PYTHON_KEYWORDS.contains(&name) {
        Cow::Owned(format!("{name}_"))
    } else {
        Cow::Borrowed(name)
    }
}

/// Double-quoted Python string literal.
fn py_str(value: &str) -> String {
    let mut out = String::with_capacity(value.len() + 2);
    out.push('"');
    for c in value.chars() {
        match c {
            '\\' => out.push_str("\\\\"),
            '"' => out.push_str("\\\""),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            c => out.push(c),
        }
    }
    out.push('"');
    out
}

/// Class name of the handle type: `my_lib` becomes `MyLib`.
pub fn handle_class_name(name: &str) -> String {
    let mut out = String::new();
    for part in name.split(|c: char| !c.is_ascii_alphanumeric()) {
        let mut chars = part.chars();
        if let Some(first) = chars.next() {
            out.push(first.to_ascii_uppercase());
            out.extend(chars);
        }
    }
    if out.is_empty() {
        return "Library".to_string();
    }
    if out.starts_with(|c: char| c.is_ascii_digit()) {
        out.insert(0, '_');
    }
    out
}

impl BindingTemplate for CtypesTemplate {
    fn extension(&self) -> &'static str {
        "py"
    }

    fn header(&self) -> Vec<String> {
        [
            "# Generated by hdrbind. Do not edit.",
            "from enum import IntEnum",
            "from ctypes import (",
            "    CDLL, CFUNCTYPE, POINTER,",
            "    Structure, Union, sizeof,",
            "    c_void_p,",
            "    c_int8, c_uint8,",
            "    c_int16, c_uint16,",
            "    c_int32, c_uint32,",
            "    c_int64, c_uint64,",
            "    c_float, c_double,",
            ")",
        ]
        .iter()
        .map(|line| line.to_string())
        .collect()
    }

    fn enumeration(&self, enumeration: &Enumeration, mode: EnumMode) -> Vec<String> {
        let name = escape(&enumeration.name);
        match mode {
            EnumMode::Named => {
                let mut lines = vec![format!("class {name}(IntEnum):")];
                if enumeration.enumerators.is_empty() {
                    lines.push(format!("{INDENT}pass"));
                }
                for e in &enumeration.enumerators {
                    lines.push(format!("{INDENT}{} = {}", escape(&e.name), e.value));
                }
                lines
            }
            EnumMode::Flat => {
                let mut lines: Vec<String> = enumeration
                    .enumerators
                    .iter()
                    .map(|e| format!("{} = {}", escape(&e.name), e.value))
                    .collect();
                lines.push(format!("{name} = {}", Self::primitive(Primitive::I32)));
                lines
            }
        }
    }

    fn introduce(&self, kind: AggregateKind, name: &str) -> Vec<String> {
        vec![
            format!("class {}({}):", escape(name), Self::base_class(kind)),
            format!("{INDENT}pass"),
        ]
    }

    fn layout(&self, aggregate: &Aggregate) -> Vec<String> {
        let name = escape(&aggregate.name);
        let mut lines = vec![format!("{name}._align_ = {}", aggregate.align)];
        // ctypes reads `_anonymous_` when `_fields_` is assigned.
        if !aggregate.anonymous.is_empty() {
            let members: Vec<String> = aggregate.anonymous.iter().map(|m| py_str(m)).collect();
            let tuple = if members.len() == 1 {
                format!("({},)", members[0])
            } else {
                format!("({})", members.join(", "))
            };
            lines.push(format!("{name}._anonymous_ = {tuple}"));
        }
        if aggregate.fields.is_empty() {
            lines.push(format!("{name}._fields_ = []"));
        } else {
            lines.push(format!("{name}._fields_ = ["));
            for field in &aggregate.fields {
                let field_name = py_str(&escape(&field.name));
                let ty = self.type_expr(&field.ty);
                match field.bit_width {
                    Some(width) => {
                        lines.push(format!("{INDENT}({field_name}, {ty}, {width}),"))
                    }
                    None => lines.push(format!("{INDENT}({field_name}, {ty}),")),
                }
            }
            lines.push("]".to_string());
        }
        lines.extend(self.reassert(aggregate));
        lines
    }

    fn reassert(&self, aggregate: &Aggregate) -> Vec<String> {
        vec![format!(
            "assert sizeof({}) == {}",
            escape(&aggregate.name),
            aggregate.size
        )]
    }

    fn alias(&self, alias: &TypeAlias) -> Vec<String> {
        vec![format!(
            "{} = {}",
            escape(&alias.name),
            self.type_expr(&alias.target)
        )]
    }

    fn handle(&self, name: &str, functions: &[&Function], library: Option<&str>) -> Vec<String> {
        let param = match library {
            Some(path) => format!("path={}", py_str(path)),
            None => "path".to_string(),
        };
        let mut lines = vec![
            format!("class {}:", handle_class_name(name)),
            format!("{INDENT}def __init__(self, {param}):"),
            format!("{INDENT}{INDENT}hdll = self.hdll = CDLL(path)"),
        ];
        for function in functions {
            lines.push(format!(
                "{INDENT}{INDENT}self.{} = {}(({}, hdll))",
                escape(&function.name),
                self.signature(&function.ret, &function.args),
                py_str(&function.name)
            ));
        }
        lines
    }

    fn type_expr(&self, ty: &TypeExpr) -> String {
        match ty {
            TypeExpr::Void => "None".to_string(),
            TypeExpr::Prim { prim } => Self::primitive(*prim).to_string(),
            TypeExpr::Named { name } => escape(name).into_owned(),
            TypeExpr::Pointer { to } => match to.as_ref() {
                TypeExpr::Void => "c_void_p".to_string(),
                inner => format!("POINTER({})", self.type_expr(inner)),
            },
            TypeExpr::FnPointer { ret, args } => {
                self.signature(ret, args.as_deref().unwrap_or_default())
            }
            TypeExpr::Array { element, len } => format!("{} * {len}", self.type_expr(element)),
        }
    }
}
