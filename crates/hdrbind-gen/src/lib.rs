//! Binding generation for hdrbind.
//!
//! Turns collected declaration records into a binding artifact and drives
//! the end-to-end run from configuration to file on disk.
//!
//! ## Modules
//!
//! - [`config`]: `BindingConfig` loading from JSON or TOML
//! - [`template`]: The pluggable `BindingTemplate` trait
//! - [`ctypes`]: Python `ctypes` template
//! - [`emit`]: Grouping, ordering and forward introduction of records
//! - [`pipeline`]: Parse, gate, collect, verify, emit, write

pub mod config;
pub mod ctypes;
pub mod emit;
pub mod error;
pub mod pipeline;
pub mod template;

pub use config::{BindingConfig, EnumMode};
pub use ctypes::CtypesTemplate;
pub use emit::{EmitOptions, Emitter};
pub use error::GenError;
pub use pipeline::{
    analyze, front_end_for, generate, generate_with, write_artifact, Analysis, Generated,
};
pub use template::BindingTemplate;
