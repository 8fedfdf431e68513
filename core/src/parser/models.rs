//! # Data Models
//!
//! Intermediate Representation (IR) of one parsed Go source file. This is the
//! shape the registry consumes; it is produced by the tree-sitter extractor but
//! can equally be assembled by hand (tests do).

use crate::parser::type_expr::TypeExpr;
use std::path::PathBuf;

/// One `import` line of a source unit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedImport {
    /// Explicit alias (`import m "example.com/models"`), if any.
    pub alias: Option<String>,
    /// The import path without quotes.
    pub path: String,
}

impl ParsedImport {
    /// The identifier the importing file uses for this package.
    pub fn local_name(&self) -> &str {
        match &self.alias {
            Some(alias) => alias,
            None => self.path.rsplit('/').next().unwrap_or(&self.path),
        }
    }
}

/// A struct field (or embedded field when `name` is `None`).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedField {
    /// Field identifier; `None` for embedded fields.
    pub name: Option<String>,
    /// Declared type expression.
    pub ty: TypeExpr,
    /// Raw struct tag without the surrounding backquotes.
    pub tag: Option<String>,
    /// Attached comment text (leading and same-line trailing).
    pub comment: String,
}

impl ParsedField {
    /// A named field.
    pub fn named(name: impl Into<String>, ty: TypeExpr) -> Self {
        Self {
            name: Some(name.into()),
            ty,
            tag: None,
            comment: String::new(),
        }
    }

    /// An embedded field.
    pub fn embedded(ty: TypeExpr) -> Self {
        Self {
            name: None,
            ty,
            tag: None,
            comment: String::new(),
        }
    }

    /// Sets the raw struct tag.
    pub fn with_tag(mut self, tag: impl Into<String>) -> Self {
        self.tag = Some(tag.into());
        self
    }
}

/// What a type declaration declares.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParsedTypeKind {
    /// `type X struct { ... }`
    Struct(Vec<ParsedField>),
    /// `type X <underlying>` for anything that is not a struct.
    Named(TypeExpr),
}

/// One `type` spec.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedTypeDecl {
    /// Declared identifier.
    pub name: String,
    /// Generic parameter names in declaration order.
    pub type_params: Vec<String>,
    /// Attached comment text.
    pub comment: String,
    /// Declared body.
    pub kind: ParsedTypeKind,
}

impl ParsedTypeDecl {
    /// A struct declaration.
    pub fn structure(name: impl Into<String>, fields: Vec<ParsedField>) -> Self {
        Self {
            name: name.into(),
            type_params: Vec::new(),
            comment: String::new(),
            kind: ParsedTypeKind::Struct(fields),
        }
    }

    /// A non-struct named type.
    pub fn named(name: impl Into<String>, underlying: TypeExpr) -> Self {
        Self {
            name: name.into(),
            type_params: Vec::new(),
            comment: String::new(),
            kind: ParsedTypeKind::Named(underlying),
        }
    }

    /// Sets the attached comment.
    pub fn with_comment(mut self, comment: impl Into<String>) -> Self {
        self.comment = comment.into();
        self
    }

    /// Sets the generic parameter names.
    pub fn with_type_params<I, S>(mut self, params: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.type_params = params.into_iter().map(Into::into).collect();
        self
    }
}

/// A constant initializer, classified only as far as enum values need.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConstExpr {
    /// Integer literal (decimal, hex, octal or binary).
    Int(i64),
    /// String literal with the quotes removed.
    Str(String),
    /// The auto-increment identifier.
    Iota,
    /// Anything else, kept verbatim and never evaluated.
    Expr(String),
}

impl ConstExpr {
    /// Classifies raw initializer source text.
    pub fn classify(text: &str) -> Self {
        let text = text.trim();
        if text == "iota" {
            return ConstExpr::Iota;
        }
        if let Some(inner) = text
            .strip_prefix('"')
            .and_then(|rest| rest.strip_suffix('"'))
        {
            return ConstExpr::Str(unescape(inner));
        }
        if let Some(inner) = text
            .strip_prefix('`')
            .and_then(|rest| rest.strip_suffix('`'))
        {
            return ConstExpr::Str(inner.to_string());
        }
        match parse_int_literal(text) {
            Some(value) => ConstExpr::Int(value),
            None => ConstExpr::Expr(text.to_string()),
        }
    }
}

fn unescape(inner: &str) -> String {
    let mut out = String::with_capacity(inner.len());
    let mut chars = inner.chars();
    while let Some(c) = chars.next() {
        if c != '\\' {
            out.push(c);
            continue;
        }
        match chars.next() {
            Some('n') => out.push('\n'),
            Some('t') => out.push('\t'),
            Some(other) => out.push(other),
            None => out.push('\\'),
        }
    }
    out
}

fn parse_int_literal(text: &str) -> Option<i64> {
    let (negative, digits) = match text.strip_prefix('-') {
        Some(rest) => (true, rest),
        None => (false, text),
    };
    let digits = digits.replace('_', "");
    let lower = digits.to_ascii_lowercase();
    let parsed = if let Some(hex) = lower.strip_prefix("0x") {
        i64::from_str_radix(hex, 16).ok()
    } else if let Some(bin) = lower.strip_prefix("0b") {
        i64::from_str_radix(bin, 2).ok()
    } else if let Some(oct) = lower.strip_prefix("0o") {
        i64::from_str_radix(oct, 8).ok()
    } else if lower.len() > 1 && lower.starts_with('0') {
        i64::from_str_radix(&lower[1..], 8).ok()
    } else {
        lower.parse::<i64>().ok()
    }?;
    Some(if negative { -parsed } else { parsed })
}

/// One name in a `const` block.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedConst {
    /// Constant identifier.
    pub name: String,
    /// Explicit type annotation on this spec, if written.
    pub ty: Option<TypeExpr>,
    /// Initializer, if written.
    pub value: Option<ConstExpr>,
    /// Attached comment text.
    pub comment: String,
}

impl ParsedConst {
    /// A constant with an explicit type and initializer.
    pub fn typed(name: impl Into<String>, ty: TypeExpr, value: ConstExpr) -> Self {
        Self {
            name: name.into(),
            ty: Some(ty),
            value: Some(value),
            comment: String::new(),
        }
    }

    /// A bare constant that repeats the previous spec (`iota` idiom).
    pub fn bare(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ty: None,
            value: None,
            comment: String::new(),
        }
    }

    /// Sets the attached comment.
    pub fn with_comment(mut self, comment: impl Into<String>) -> Self {
        self.comment = comment.into();
        self
    }
}

/// A `const ( ... )` block, or a single `const` line.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ParsedConstBlock {
    /// Specs in declaration order.
    pub specs: Vec<ParsedConst>,
}

/// Everything extracted from one source file.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ParsedUnit {
    /// Package identifier from the `package` clause.
    pub package: String,
    /// File location.
    pub path: PathBuf,
    /// Import path of the package, when known.
    pub import_path: Option<String>,
    /// Comment attached to the `package` clause.
    pub doc: String,
    /// Imports in declaration order.
    pub imports: Vec<ParsedImport>,
    /// Type declarations in declaration order.
    pub types: Vec<ParsedTypeDecl>,
    /// Const blocks in declaration order.
    pub consts: Vec<ParsedConstBlock>,
}

impl ParsedUnit {
    /// An empty unit for `package` at `path`.
    pub fn new(package: impl Into<String>, path: impl Into<PathBuf>) -> Self {
        Self {
            package: package.into(),
            path: path.into(),
            ..Self::default()
        }
    }

    /// Sets the package import path.
    pub fn with_import_path(mut self, import_path: impl Into<String>) -> Self {
        self.import_path = Some(import_path.into());
        self
    }

    /// Appends a type declaration.
    pub fn with_type(mut self, decl: ParsedTypeDecl) -> Self {
        self.types.push(decl);
        self
    }

    /// Appends a const block.
    pub fn with_consts(mut self, specs: Vec<ParsedConst>) -> Self {
        self.consts.push(ParsedConstBlock { specs });
        self
    }

    /// Appends an import.
    pub fn with_import(mut self, alias: Option<&str>, path: impl Into<String>) -> Self {
        self.imports.push(ParsedImport {
            alias: alias.map(str::to_string),
            path: path.into(),
        });
        self
    }

    /// The import path a package-local identifier resolves through.
    pub fn import_for(&self, local: &str) -> Option<&ParsedImport> {
        self.imports.iter().find(|i| i.local_name() == local)
    }

    /// Directory holding this unit.
    pub fn directory(&self) -> PathBuf {
        self.path
            .parent()
            .map(|p| p.to_path_buf())
            .unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_classify_literals() {
        assert_eq!(ConstExpr::classify("iota"), ConstExpr::Iota);
        assert_eq!(
            ConstExpr::classify("\"PENDING\""),
            ConstExpr::Str("PENDING".into())
        );
        assert_eq!(ConstExpr::classify("`raw`"), ConstExpr::Str("raw".into()));
        assert_eq!(ConstExpr::classify("42"), ConstExpr::Int(42));
        assert_eq!(ConstExpr::classify("0x1F"), ConstExpr::Int(31));
        assert_eq!(ConstExpr::classify("1_000"), ConstExpr::Int(1000));
        assert_eq!(ConstExpr::classify("-3"), ConstExpr::Int(-3));
        assert_eq!(
            ConstExpr::classify("1 << iota"),
            ConstExpr::Expr("1 << iota".into())
        );
    }

    #[test]
    fn test_import_local_name() {
        let unit = ParsedUnit::new("api", "api/user.go")
            .with_import(None, "example.com/app/models")
            .with_import(Some("shared"), "example.com/app/common");
        assert_eq!(
            unit.import_for("models").map(|i| i.path.as_str()),
            Some("example.com/app/models")
        );
        assert_eq!(
            unit.import_for("shared").map(|i| i.path.as_str()),
            Some("example.com/app/common")
        );
        assert!(unit.import_for("common").is_none());
    }
}
