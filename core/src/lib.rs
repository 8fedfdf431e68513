#![deny(missing_docs)]

//! # GQLScan Core
//!
//! Core library for generating GraphQL SDL from annotated Go structs.

/// Shared error types.
pub mod error;

/// Generator settings.
pub mod config;

/// Go source parsing logic.
pub mod parser;

/// Comment directive parsing.
pub mod directives;

/// Field tag options, naming and visibility.
pub mod fields;

/// Source model: struct, enum and namespace registries.
pub mod registry;

/// Embedded field flattening and generic substitution.
pub mod flatten;

/// Struct reference graph and auto-generation.
pub mod graph;

/// Type mapping logic (Go -> GraphQL).
pub mod type_mapping;

/// SDL block generation.
pub mod schema_generator;

pub use config::{AutoGenerateStrategy, FieldCase, OutputStrategy, Settings};
pub use directives::{parse_struct_directives, StructDirectives, TargetList, VariantKind};
pub use error::{AppError, AppResult};
pub use fields::{is_field_included, FieldOptions, Namer};
pub use flatten::{Flattener, ResolvedField};
pub use graph::{DependencyGraph, GraphNode};
pub use parser::{parse_go_file, parse_go_source, ParsedUnit, TypeExpr};
pub use registry::{ExternalLoader, MemoryLoader, NoExternalLoader, SourceModel};
pub use schema_generator::{
    generate_schema, render_document, BlockKind, RoutingKey, SchemaBlock, SchemaGenerator,
};
pub use type_mapping::{GoToGraphqlMapper, GqlRef, TypeMapper};
