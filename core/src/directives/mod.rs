#![deny(missing_docs)]

//! # Directives Module
//!
//! - **splitter**: quote/bracket-aware comma splitting and list values.
//! - **models**: typed directive records.
//! - **parser**: comment scanning and directive recognition.

pub mod models;
pub mod parser;
pub mod splitter;

pub use models::{
    Deprecation, DirectiveKind, EnumDirective, EnumValueDirective, ExtraFieldDef,
    ExtraFieldScope, StructDirectives, TargetList, VariantDef, VariantKind,
};
pub use parser::{parse_enum_value_directive, parse_struct_directives, plain_text};
