//! # Extraction Logic
//!
//! Parses Go source with tree-sitter and lifts the declarations schema
//! generation needs (package clause, imports, type specs, const blocks) into
//! the `ParsedUnit` IR. Function bodies and everything else are ignored.

use crate::error::{AppError, AppResult};
use crate::parser::models::{
    ConstExpr, ParsedConst, ParsedConstBlock, ParsedField, ParsedImport, ParsedTypeDecl,
    ParsedTypeKind, ParsedUnit,
};
use crate::parser::type_expr::TypeExpr;
use std::fs;
use std::path::Path;
use tracing::debug;
use tree_sitter::{Node, Parser};

/// Reads and parses one Go file.
pub fn parse_go_file(path: &Path) -> AppResult<ParsedUnit> {
    let code = fs::read_to_string(path)?;
    parse_go_source(path, &code)
}

/// Parses Go source text. `path` is recorded on the unit and used in errors.
pub fn parse_go_source(path: impl AsRef<Path>, code: &str) -> AppResult<ParsedUnit> {
    let path = path.as_ref();
    let display = path.display().to_string();

    let mut parser = Parser::new();
    parser
        .set_language(&tree_sitter_go::LANGUAGE.into())
        .map_err(|e| AppError::parse(&display, format!("tree-sitter init: {}", e)))?;

    let tree = parser
        .parse(code, None)
        .ok_or_else(|| AppError::parse(&display, "failed to parse Go source"))?;
    let root = tree.root_node();

    if root.has_error() {
        let at = first_error(root)
            .map(|n| {
                let pos = n.start_position();
                format!("line {}, column {}", pos.row + 1, pos.column + 1)
            })
            .unwrap_or_else(|| "unknown position".to_string());
        return Err(AppError::parse(&display, format!("syntax error at {}", at)));
    }

    let ctx = ExtractContext {
        source: code,
        path: &display,
    };
    let mut unit = ParsedUnit::new("", path);

    let mut cursor = root.walk();
    for child in root.named_children(&mut cursor) {
        match child.kind() {
            "package_clause" => {
                let mut inner = child.walk();
                if let Some(ident) = child
                    .named_children(&mut inner)
                    .find(|n| n.kind() == "package_identifier")
                {
                    unit.package = ctx.text(ident).to_string();
                }
                unit.doc = ctx.leading_comments(child).join("\n");
            }
            "import_declaration" => ctx.extract_imports(child, &mut unit.imports),
            "type_declaration" => ctx.extract_types(child, &mut unit.types)?,
            "const_declaration" => unit.consts.push(ctx.extract_consts(child)),
            _ => {}
        }
    }

    if unit.package.is_empty() {
        return Err(AppError::parse(&display, "missing package clause"));
    }

    Ok(unit)
}

fn first_error(node: Node<'_>) -> Option<Node<'_>> {
    if node.is_error() || node.is_missing() {
        return Some(node);
    }
    let mut cursor = node.walk();
    let children: Vec<Node<'_>> = node.children(&mut cursor).collect();
    children
        .into_iter()
        .filter(|c| c.has_error() || c.is_missing())
        .find_map(first_error)
}

struct ExtractContext<'a> {
    source: &'a str,
    path: &'a str,
}

impl<'a> ExtractContext<'a> {
    fn text(&self, node: Node) -> &'a str {
        node.utf8_text(self.source.as_bytes()).unwrap_or("")
    }

    /// Comment siblings directly above `node` with no blank line between.
    fn leading_comments(&self, node: Node) -> Vec<String> {
        let mut lines = Vec::new();
        let mut next_row = node.start_position().row;
        let mut current = node.prev_named_sibling();
        while let Some(prev) = current {
            if prev.kind() != "comment" || prev.end_position().row + 1 < next_row {
                break;
            }
            // a comment sharing a row with the previous declaration trails it
            if let Some(before) = prev.prev_named_sibling() {
                if before.kind() != "comment"
                    && before.end_position().row == prev.start_position().row
                {
                    break;
                }
            }
            lines.push(self.text(prev).to_string());
            next_row = prev.start_position().row;
            current = prev.prev_named_sibling();
        }
        lines.reverse();
        lines
    }

    /// A comment starting on the row where `node` ends.
    fn trailing_comment(&self, node: Node) -> Option<String> {
        node.next_named_sibling()
            .filter(|n| n.kind() == "comment")
            .filter(|n| n.start_position().row == node.end_position().row)
            .map(|n| self.text(n).to_string())
    }

    fn attached_comment(&self, node: Node, inherited: &[String]) -> String {
        let mut lines = inherited.to_vec();
        lines.extend(self.leading_comments(node));
        lines.extend(self.trailing_comment(node));
        lines.join("\n")
    }

    /// Type expressions the parser cannot read degrade to opaque types; only
    /// syntax errors reported by tree-sitter are fatal.
    fn parse_type(&self, text: &str) -> TypeExpr {
        text.parse::<TypeExpr>().unwrap_or_else(|e| {
            debug!(path = %self.path, ty = %text, error = %e, "unreadable type, kept opaque");
            TypeExpr::Opaque(text.trim().to_string())
        })
    }

    fn unquote(&self, node: Node) -> String {
        match ConstExpr::classify(self.text(node)) {
            ConstExpr::Str(s) => s,
            _ => self.text(node).to_string(),
        }
    }

    fn extract_imports(&self, decl: Node, imports: &mut Vec<ParsedImport>) {
        let mut cursor = decl.walk();
        let mut specs = Vec::new();
        for child in decl.named_children(&mut cursor) {
            match child.kind() {
                "import_spec" => specs.push(child),
                "import_spec_list" => {
                    let mut inner = child.walk();
                    specs.extend(
                        child
                            .named_children(&mut inner)
                            .filter(|n| n.kind() == "import_spec"),
                    );
                }
                _ => {}
            }
        }

        for spec in specs {
            let Some(path) = spec.child_by_field_name("path") else {
                continue;
            };
            let alias = spec
                .child_by_field_name("name")
                .map(|n| self.text(n).to_string())
                .filter(|a| a != "_" && a != ".");
            imports.push(ParsedImport {
                alias,
                path: self.unquote(path),
            });
        }
    }

    fn extract_types(&self, decl: Node, types: &mut Vec<ParsedTypeDecl>) -> AppResult<()> {
        let mut cursor = decl.walk();
        let specs: Vec<Node> = decl
            .named_children(&mut cursor)
            .filter(|n| matches!(n.kind(), "type_spec" | "alias_declaration"))
            .collect();
        let inherited = if specs.len() == 1 {
            self.leading_comments(decl)
        } else {
            Vec::new()
        };

        for spec in specs {
            let name = spec
                .child_by_field_name("name")
                .map(|n| self.text(n).to_string())
                .ok_or_else(|| AppError::parse(self.path, "type declaration without a name"))?;
            let ty_node = spec.child_by_field_name("type").ok_or_else(|| {
                AppError::parse(self.path, format!("type '{}' has no body", name))
            })?;
            let type_params = spec
                .child_by_field_name("type_parameters")
                .map(|list| self.type_params(list))
                .unwrap_or_default();

            let kind = if ty_node.kind() == "struct_type" {
                ParsedTypeKind::Struct(self.extract_fields(ty_node)?)
            } else {
                ParsedTypeKind::Named(self.parse_type(self.text(ty_node)))
            };

            types.push(ParsedTypeDecl {
                name,
                type_params,
                comment: self.attached_comment(spec, &inherited),
                kind,
            });
        }
        Ok(())
    }

    fn type_params(&self, list: Node) -> Vec<String> {
        let mut names = Vec::new();
        let mut cursor = list.walk();
        let decls: Vec<Node> = list
            .named_children(&mut cursor)
            .filter(|n| n.kind() == "type_parameter_declaration")
            .collect();
        for decl in decls {
            let mut inner = decl.walk();
            names.extend(
                decl.children_by_field_name("name", &mut inner)
                    .map(|n| self.text(n).to_string()),
            );
        }
        names
    }

    fn extract_fields(&self, struct_type: Node) -> AppResult<Vec<ParsedField>> {
        let mut fields = Vec::new();
        let mut cursor = struct_type.walk();
        let Some(list) = struct_type
            .named_children(&mut cursor)
            .find(|n| n.kind() == "field_declaration_list")
        else {
            return Ok(fields);
        };

        let mut list_cursor = list.walk();
        let decls: Vec<Node> = list
            .named_children(&mut list_cursor)
            .filter(|n| n.kind() == "field_declaration")
            .collect();

        for decl in decls {
            let ty_node = decl
                .child_by_field_name("type")
                .ok_or_else(|| AppError::parse(self.path, "field without a type"))?;
            let tag = decl.child_by_field_name("tag").map(|t| self.unquote(t));
            let comment = self.attached_comment(decl, &[]);

            let mut name_cursor = decl.walk();
            let names: Vec<String> = decl
                .children_by_field_name("name", &mut name_cursor)
                .map(|n| self.text(n).to_string())
                .collect();

            if names.is_empty() {
                // embedded: the optional `*` sits outside the `type` field
                let text = self
                    .source
                    .get(decl.start_byte()..ty_node.end_byte())
                    .unwrap_or_else(|| self.text(ty_node));
                fields.push(ParsedField {
                    name: None,
                    ty: self.parse_type(text),
                    tag,
                    comment,
                });
                continue;
            }

            let ty = self.parse_type(self.text(ty_node));
            for name in names {
                fields.push(ParsedField {
                    name: Some(name),
                    ty: ty.clone(),
                    tag: tag.clone(),
                    comment: comment.clone(),
                });
            }
        }
        Ok(fields)
    }

    fn extract_consts(&self, decl: Node) -> ParsedConstBlock {
        let mut cursor = decl.walk();
        let specs: Vec<Node> = decl
            .named_children(&mut cursor)
            .filter(|n| n.kind() == "const_spec")
            .collect();
        let inherited = if specs.len() == 1 {
            self.leading_comments(decl)
        } else {
            Vec::new()
        };

        let mut block = ParsedConstBlock::default();
        for spec in specs {
            let ty = spec
                .child_by_field_name("type")
                .map(|n| self.parse_type(self.text(n)));
            let values: Vec<ConstExpr> = match spec.child_by_field_name("value") {
                Some(list) => {
                    let mut inner = list.walk();
                    list.named_children(&mut inner)
                        .filter(|n| n.kind() != "comment")
                        .map(|n| ConstExpr::classify(self.text(n)))
                        .collect()
                }
                None => Vec::new(),
            };
            let comment = self.attached_comment(spec, &inherited);

            let mut name_cursor = spec.walk();
            let names: Vec<String> = spec
                .children_by_field_name("name", &mut name_cursor)
                .map(|n| self.text(n).to_string())
                .collect();

            for (i, name) in names.into_iter().enumerate() {
                if name == "_" {
                    continue;
                }
                block.specs.push(ParsedConst {
                    name,
                    ty: ty.clone(),
                    value: values.get(i).cloned(),
                    comment: comment.clone(),
                });
            }
        }
        block
    }
}
