//! The emitter.
//!
//! Serializes the collector's ordered records into one artifact, grouped as:
//! header, enumerations, aggregates and typedefs in encounter order, then
//! the library handle. The same records always produce the same text.
//!
//! Within the aggregate group the emitter tracks which names have been
//! introduced and which have a layout, so that:
//!
//! - a name used before its definition is introduced first and patched later,
//! - a name that is never defined gets an opaque placeholder,
//! - a repeated definition only re-asserts the size.

use std::collections::{HashMap, HashSet};

use hdrbind_core::{Aggregate, AggregateKind, DeclRecord, Function, TypeExpr};
use tracing::{debug, warn};

use crate::config::EnumMode;
use crate::template::BindingTemplate;

/// Emission settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EmitOptions {
    /// Base name of the handle type.
    pub name: String,
    pub enum_mode: EnumMode,
    /// Default library path of the handle constructor.
    pub library: Option<String>,
}

impl EmitOptions {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            enum_mode: EnumMode::default(),
            library: None,
        }
    }
}

pub struct Emitter<'t> {
    template: &'t dyn BindingTemplate,
    options: EmitOptions,
}

impl<'t> Emitter<'t> {
    pub fn new(template: &'t dyn BindingTemplate, options: EmitOptions) -> Self {
        Self { template, options }
    }

    /// Render `records` into the artifact text.
    pub fn emit(&self, records: &[DeclRecord]) -> String {
        let mut blocks: Vec<Vec<String>> = vec![self.template.header()];

        for record in records {
            if let DeclRecord::Enumeration(e) = record {
                blocks.push(self.template.enumeration(e, self.options.enum_mode));
            }
        }

        let mut state = TypeState::new(records);
        for record in records {
            match record {
                DeclRecord::Opaque(o) => {
                    if state.introduced.insert(o.name.clone()) {
                        blocks.push(self.template.introduce(o.kind, &o.name));
                    }
                }
                DeclRecord::Aggregate(a) => self.aggregate(a, &mut state, &mut blocks),
                DeclRecord::Alias(alias) => {
                    self.require(&alias.target, &alias.name, &mut state, &mut blocks);
                    state.aliased.insert(alias.name.clone());
                    blocks.push(self.template.alias(alias));
                }
                DeclRecord::Enumeration(_) | DeclRecord::Function(_) => {}
            }
        }

        let functions: Vec<&Function> = records
            .iter()
            .filter_map(DeclRecord::as_function)
            .collect();
        for function in &functions {
            self.require(&function.ret, &function.name, &mut state, &mut blocks);
            for arg in &function.args {
                self.require(arg, &function.name, &mut state, &mut blocks);
            }
        }
        blocks.push(self.template.handle(
            &self.options.name,
            &functions,
            self.options.library.as_deref(),
        ));

        let mut text = blocks
            .iter()
            .map(|block| block.join("\n"))
            .collect::<Vec<_>>()
            .join("\n\n");
        text.push('\n');
        text
    }

    fn aggregate(&self, agg: &Aggregate, state: &mut TypeState, blocks: &mut Vec<Vec<String>>) {
        if state.completed.contains(&agg.name) {
            debug!(name = %agg.name, "re-asserting size of repeated definition");
            blocks.push(self.template.reassert(agg));
            return;
        }
        if agg.forward {
            debug!(name = %agg.name, "patching layout of earlier declaration");
        }
        // The aggregate's own name is introduced first, so self references
        // need nothing further.
        let mut block = Vec::new();
        if state.introduced.insert(agg.name.clone()) {
            block.extend(self.template.introduce(agg.kind, &agg.name));
        }
        for field in &agg.fields {
            self.require(&field.ty, &agg.name, state, blocks);
        }
        block.extend(self.template.layout(agg));
        state.completed.insert(agg.name.clone());
        blocks.push(block);
    }

    /// Make every name `ty` refers to available before `user` is emitted.
    fn require(
        &self,
        ty: &TypeExpr,
        user: &str,
        state: &mut TypeState,
        blocks: &mut Vec<Vec<String>>,
    ) {
        for name in ty.referenced_names() {
            if state.introduced.contains(name)
                || state.aliased.contains(name)
                || state.enums.contains(name)
            {
                continue;
            }
            let kind = match state.kinds.get(name) {
                Some(kind) => *kind,
                None if state.alias_names.contains(name) => continue,
                None => {
                    warn!(
                        name,
                        user,
                        "type is referenced but never defined; emitting an opaque placeholder"
                    );
                    AggregateKind::Struct
                }
            };
            state.introduced.insert(name.to_string());
            blocks.push(self.template.introduce(kind, name));
        }
    }
}

/// Names known to the aggregate group.
struct TypeState {
    /// Kind of every aggregate name defined or declared anywhere in the records.
    kinds: HashMap<String, AggregateKind>,
    alias_names: HashSet<String>,
    /// Enumerations are emitted ahead of the aggregate group.
    enums: HashSet<String>,
    introduced: HashSet<String>,
    completed: HashSet<String>,
    aliased: HashSet<String>,
}

impl TypeState {
    fn new(records: &[DeclRecord]) -> Self {
        let mut kinds = HashMap::new();
        let mut alias_names = HashSet::new();
        let mut enums = HashSet::new();
        for record in records {
            match record {
                DeclRecord::Aggregate(a) => {
                    kinds.entry(a.name.clone()).or_insert(a.kind);
                }
                DeclRecord::Opaque(o) => {
                    kinds.entry(o.name.clone()).or_insert(o.kind);
                }
                DeclRecord::Alias(a) => {
                    alias_names.insert(a.name.clone());
                }
                DeclRecord::Enumeration(e) => {
                    enums.insert(e.name.clone());
                }
                DeclRecord::Function(_) => {}
            }
        }
        Self {
            kinds,
            alias_names,
            enums,
            introduced: HashSet::new(),
            completed: HashSet::new(),
            aliased: HashSet::new(),
        }
    }
}
