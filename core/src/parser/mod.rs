#![deny(missing_docs)]

//! # Parser Module
//!
//! Handles parsing of Go source code using tree-sitter.
//! Extracts package clauses, imports, struct and named type declarations,
//! const blocks, struct tags and attached comments.

pub mod extractors;
pub mod models;
pub mod struct_tag;
pub mod type_expr;

pub use extractors::{parse_go_file, parse_go_source};
pub use models::{
    ConstExpr, ParsedConst, ParsedConstBlock, ParsedField, ParsedImport, ParsedTypeDecl,
    ParsedTypeKind, ParsedUnit,
};
pub use type_expr::TypeExpr;
