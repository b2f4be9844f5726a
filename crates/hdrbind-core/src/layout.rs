//! Size and alignment recomputation from emitted field lists.
//!
//! The front-end's layout is authoritative; this module recomputes what a
//! binding runtime will derive from the field list alone (natural C
//! alignment, System V bit-field packing) so disagreements surface at
//! generation time instead of when the artifact is loaded.

use std::collections::HashMap;
use std::fmt;

use crate::expr::TypeExpr;
use crate::record::{Aggregate, AggregateKind, DeclRecord};

/// Pointer width of the target the layout is checked against.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DataModel {
    pub pointer_size: u64,
}

impl DataModel {
    pub fn lp64() -> Self {
        Self { pointer_size: 8 }
    }

    pub fn ilp32() -> Self {
        Self { pointer_size: 4 }
    }

    /// The data model of the machine running the generator.
    pub fn host() -> Self {
        Self {
            pointer_size: std::mem::size_of::<usize>() as u64,
        }
    }
}

impl Default for DataModel {
    fn default() -> Self {
        Self::host()
    }
}

/// Size and alignment of a type, in bytes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TypeLayout {
    pub size: u64,
    pub align: u64,
}

/// An aggregate whose recomputed size disagrees with the recorded one.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LayoutMismatch {
    pub kind: AggregateKind,
    pub name: String,
    pub recorded_size: u64,
    pub recorded_align: u64,
    /// `None` when a member's layout is unknown (an opaque or undefined name).
    pub computed: Option<TypeLayout>,
}

impl fmt::Display for LayoutMismatch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} {}: recorded size {} (align {})",
            self.kind.keyword(),
            self.name,
            self.recorded_size,
            self.recorded_align
        )?;
        match self.computed {
            Some(c) => write!(f, ", recomputed size {} (align {})", c.size, c.align),
            None => f.write_str(", layout cannot be recomputed"),
        }
    }
}

/// Recompute every aggregate in `records` and report the ones that disagree.
pub fn verify_layouts(records: &[DeclRecord], model: DataModel) -> Vec<LayoutMismatch> {
    let env = LayoutEnv::new(records, model);
    records
        .iter()
        .filter_map(DeclRecord::as_aggregate)
        .filter_map(|agg| {
            let computed = env.aggregate(agg);
            if computed.is_some_and(|c| c.size == agg.size) {
                return None;
            }
            Some(LayoutMismatch {
                kind: agg.kind,
                name: agg.name.clone(),
                recorded_size: agg.size,
                recorded_align: agg.align,
                computed,
            })
        })
        .collect()
}

fn align_up(value: u64, align: u64) -> u64 {
    if align <= 1 {
        return value;
    }
    value.div_ceil(align) * align
}

/// Names visible to layout computation.
struct LayoutEnv<'a> {
    model: DataModel,
    aggregates: HashMap<&'a str, TypeLayout>,
    aliases: HashMap<&'a str, &'a TypeExpr>,
}

impl<'a> LayoutEnv<'a> {
    fn new(records: &'a [DeclRecord], model: DataModel) -> Self {
        let mut aggregates = HashMap::new();
        let mut aliases = HashMap::new();
        for record in records {
            match record {
                DeclRecord::Aggregate(a) => {
                    aggregates.entry(a.name.as_str()).or_insert(TypeLayout {
                        size: a.size,
                        align: a.align,
                    });
                }
                DeclRecord::Alias(a) => {
                    aliases.entry(a.name.as_str()).or_insert(&a.target);
                }
                _ => {}
            }
        }
        Self {
            model,
            aggregates,
            aliases,
        }
    }

    fn of(&self, ty: &TypeExpr) -> Option<TypeLayout> {
        self.of_bounded(ty, self.aliases.len() + 1)
    }

    // `depth` bounds alias chasing so an alias cycle cannot loop.
    fn of_bounded(&self, ty: &TypeExpr, depth: usize) -> Option<TypeLayout> {
        match ty {
            TypeExpr::Void => None,
            TypeExpr::Prim { prim } => {
                let size = prim.size();
                Some(TypeLayout {
                    size,
                    align: size.min(self.model.pointer_size),
                })
            }
            TypeExpr::Pointer { .. } | TypeExpr::FnPointer { .. } => Some(TypeLayout {
                size: self.model.pointer_size,
                align: self.model.pointer_size,
            }),
            TypeExpr::Array { element, len } => {
                let elem = self.of_bounded(element, depth)?;
                Some(TypeLayout {
                    size: elem.size * len,
                    align: elem.align,
                })
            }
            TypeExpr::Named { name } => {
                if let Some(layout) = self.aggregates.get(name.as_str()) {
                    return Some(*layout);
                }
                let target = self.aliases.get(name.as_str())?;
                if depth == 0 {
                    return None;
                }
                self.of_bounded(target, depth - 1)
            }
        }
    }

    fn aggregate(&self, agg: &Aggregate) -> Option<TypeLayout> {
        let computed = match agg.kind {
            AggregateKind::Struct => self.structure(agg)?,
            AggregateKind::Union => self.union(agg)?,
        };
        let align = computed.align.max(agg.align);
        Some(TypeLayout {
            size: align_up(computed.size, align),
            align,
        })
    }

    fn structure(&self, agg: &Aggregate) -> Option<TypeLayout> {
        let mut bits = 0u64;
        let mut align = 1u64;
        for field in &agg.fields {
            let layout = self.of(&field.ty)?;
            let unit = layout.align * 8;
            match field.bit_width {
                Some(0) => bits = align_up(bits, unit),
                Some(width) => {
                    // A bit-field never straddles a boundary of its type's alignment.
                    if bits / unit != (bits + u64::from(width) - 1) / unit {
                        bits = align_up(bits, unit);
                    }
                    bits += u64::from(width);
                }
                None => bits = align_up(bits, unit) + layout.size * 8,
            }
            align = align.max(layout.align);
        }
        Some(TypeLayout {
            size: bits.div_ceil(8),
            align,
        })
    }

    fn union(&self, agg: &Aggregate) -> Option<TypeLayout> {
        let mut size = 0u64;
        let mut align = 1u64;
        for field in &agg.fields {
            let layout = self.of(&field.ty)?;
            let member = match field.bit_width {
                Some(width) => u64::from(width).div_ceil(8),
                None => layout.size,
            };
            size = size.max(member);
            align = align.max(layout.align);
        }
        Some(TypeLayout { size, align })
    }
}
