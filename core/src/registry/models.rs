//! # Registry Models
//!
//! Descriptors owned by the `SourceModel` for the length of one run.

use crate::directives::models::{Deprecation, StructDirectives};
use crate::directives::parser::parse_struct_directives;
use crate::fields::options::FieldOptions;
use crate::parser::models::ParsedImport;
use crate::parser::type_expr::TypeExpr;
use std::fmt::{self, Display};
use std::path::{Path, PathBuf};

/// Where a declaration came from.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Origin {
    /// Package identifier.
    pub package: String,
    /// Declaring file.
    pub path: PathBuf,
    /// Package import path, when known.
    pub import_path: Option<String>,
    /// Loaded on demand from outside the scan roots.
    pub external: bool,
}

impl Origin {
    /// Key identifying the declaring package: its import path, else its
    /// directory.
    pub fn package_key(&self) -> String {
        match &self.import_path {
            Some(path) => path.clone(),
            None => self.directory().display().to_string(),
        }
    }

    /// Directory of the declaring file.
    pub fn directory(&self) -> PathBuf {
        self.path
            .parent()
            .map(Path::to_path_buf)
            .unwrap_or_default()
    }

    /// `package.Name` form used by glob filters.
    pub fn qualified(&self, name: &str) -> String {
        format!("{}.{}", self.package, name)
    }
}

/// One struct field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldDescriptor {
    /// Identifier; `None` when embedded.
    pub name: Option<String>,
    /// Declared type.
    pub ty: TypeExpr,
    /// Raw struct tag.
    pub tag: Option<String>,
    /// Parsed tag options.
    pub options: FieldOptions,
    /// Attached comment.
    pub comment: String,
}

/// How an embedded field is treated.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EmbedMode {
    /// Fields are promoted into the embedding struct.
    Inline,
    /// A tag names it, so it is a regular field.
    Named,
    /// Tagged `-`, `ignore` or `omit`: neither inlined nor emitted.
    Dropped,
}

impl FieldDescriptor {
    /// Whether this is an embedded field.
    pub fn is_embedded(&self) -> bool {
        self.name.is_none()
    }

    /// Identifier used for naming: the field name, else the embedded type's
    /// bare name.
    pub fn ident(&self) -> &str {
        match &self.name {
            Some(name) => name,
            None => self.ty.base_name().unwrap_or_default(),
        }
    }

    /// Treatment of an embedded field. Meaningless for named fields.
    pub fn embed_mode(&self, use_json_tag: bool) -> EmbedMode {
        let o = &self.options;
        if o.is_dropped(use_json_tag) || o.ignore || o.omit {
            EmbedMode::Dropped
        } else if o.tag_name(use_json_tag).is_some() {
            EmbedMode::Named
        } else {
            EmbedMode::Inline
        }
    }
}

/// One struct declaration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StructDescriptor {
    /// Source identifier, unique within the run.
    pub name: String,
    /// Fields in declaration order.
    pub fields: Vec<FieldDescriptor>,
    /// Generic parameter names.
    pub type_params: Vec<String>,
    /// Declaring package and file.
    pub origin: Origin,
    /// Imports of the declaring file.
    pub imports: Vec<ParsedImport>,
    /// Raw attached comment.
    pub comment: String,
}

impl StructDescriptor {
    /// Directives parsed from the comment. Recomputed on every call.
    pub fn directives(&self) -> StructDirectives {
        parse_struct_directives(&self.comment)
    }

    /// Whether the struct declares type parameters.
    pub fn is_generic(&self) -> bool {
        !self.type_params.is_empty()
    }

    /// Import path behind a package qualifier used in this struct's file.
    pub fn import_for(&self, qualifier: &str) -> Option<&str> {
        self.imports
            .iter()
            .find(|i| i.local_name() == qualifier)
            .map(|i| i.path.as_str())
    }
}

/// A named string/integer type carrying `@gqlEnum`, before matching.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EnumCandidate {
    /// Source identifier.
    pub name: String,
    /// Underlying basic type.
    pub underlying: TypeExpr,
    /// Declaring package and file.
    pub origin: Origin,
    /// Raw attached comment.
    pub comment: String,
}

/// A literal enum value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EnumLiteral {
    /// String constant.
    Str(String),
    /// Integer constant or auto-increment position.
    Int(i64),
}

impl Display for EnumLiteral {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EnumLiteral::Str(s) => write!(f, "{}", s),
            EnumLiteral::Int(n) => write!(f, "{}", n),
        }
    }
}

/// One matched enum value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EnumValueDescriptor {
    /// Constant identifier.
    pub ident: String,
    /// Output name.
    pub name: String,
    /// Literal value.
    pub value: EnumLiteral,
    /// Description.
    pub description: Option<String>,
    /// Deprecation.
    pub deprecated: Option<Deprecation>,
    /// Where the constant is declared.
    pub origin: Origin,
}

/// A matched enum.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EnumDescriptor {
    /// Source identifier.
    pub ident: String,
    /// Output name.
    pub name: String,
    /// Description.
    pub description: Option<String>,
    /// Where the type is declared.
    pub origin: Origin,
    /// Values in match order.
    pub values: Vec<EnumValueDescriptor>,
    /// Raw comment of the type declaration.
    pub comment: String,
}

/// Basic kinds an enum candidate may be built on.
pub fn is_enum_base(ty: &TypeExpr) -> bool {
    match ty {
        TypeExpr::Named {
            package: None,
            name,
            args,
        } if args.is_empty() => matches!(
            name.as_str(),
            "string"
                | "int"
                | "int8"
                | "int16"
                | "int32"
                | "int64"
                | "uint"
                | "uint8"
                | "uint16"
                | "uint32"
                | "uint64"
                | "byte"
                | "rune"
        ),
        _ => false,
    }
}
