//! # Rendering
//!
//! Text layout of resolved blocks. Nothing here decides content.

use crate::directives::models::Deprecation;
use std::fmt::Write;

const INDENT: &str = "  ";

/// One field line of a type or input block.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct FieldLine {
    /// Field name.
    pub name: String,
    /// Rendered type reference.
    pub ty: String,
    /// Description.
    pub description: Option<String>,
    /// Deprecation.
    pub deprecated: Option<Deprecation>,
    /// Append `@goField(forceResolver: true)`.
    pub force_resolver: bool,
}

/// One value line of an enum block.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct EnumValueLine {
    /// Value name.
    pub name: String,
    /// Description.
    pub description: Option<String>,
    /// `@goEnum` target, when annotations are on.
    pub go_enum: Option<String>,
    /// Deprecation.
    pub deprecated: Option<Deprecation>,
}

/// Header of a block: keyword, name and optional annotation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BlockHead<'a> {
    /// `type`, `input` or `enum`.
    pub keyword: &'a str,
    /// Output name.
    pub name: &'a str,
    /// Description.
    pub description: Option<&'a str>,
    /// `@goModel` target.
    pub go_model: Option<&'a str>,
}

/// Renders a `type` or `input` block.
pub fn render_object(head: &BlockHead<'_>, fields: &[FieldLine]) -> String {
    let mut out = open_block(head);
    for field in fields {
        push_description(&mut out, field.description.as_deref(), INDENT);
        let _ = write!(out, "{}{}: {}", INDENT, field.name, field.ty);
        if let Some(deprecation) = &field.deprecated {
            out.push(' ');
            out.push_str(&deprecated(deprecation));
        }
        if field.force_resolver {
            out.push_str(" @goField(forceResolver: true)");
        }
        out.push('\n');
    }
    out.push_str("}\n");
    out
}

/// Renders an `enum` block.
pub fn render_enum(head: &BlockHead<'_>, values: &[EnumValueLine]) -> String {
    let mut out = open_block(head);
    for value in values {
        push_description(&mut out, value.description.as_deref(), INDENT);
        let _ = write!(out, "{}{}", INDENT, value.name);
        if let Some(target) = &value.go_enum {
            let _ = write!(out, " @goEnum(value: {})", quote(target));
        }
        if let Some(deprecation) = &value.deprecated {
            out.push(' ');
            out.push_str(&deprecated(deprecation));
        }
        out.push('\n');
    }
    out.push_str("}\n");
    out
}

fn open_block(head: &BlockHead<'_>) -> String {
    let mut out = String::new();
    push_description(&mut out, head.description, "");
    let _ = write!(out, "{} {}", head.keyword, head.name);
    if let Some(model) = head.go_model {
        let _ = write!(out, " @goModel(model: {})", quote(model));
    }
    out.push_str(" {\n");
    out
}

/// `@deprecated` with an optional quoted reason.
pub fn deprecated(deprecation: &Deprecation) -> String {
    match &deprecation.reason {
        Some(reason) => format!("@deprecated(reason: {})", quote(reason)),
        None => "@deprecated".to_string(),
    }
}

fn push_description(out: &mut String, description: Option<&str>, indent: &str) {
    let Some(text) = description.map(str::trim).filter(|t| !t.is_empty()) else {
        return;
    };
    if text.contains('\n') || text.contains('"') {
        let _ = writeln!(out, "{}\"\"\"", indent);
        for line in text.replace("\"\"\"", "\\\"\"\"").lines() {
            let _ = writeln!(out, "{}{}", indent, line.trim_end());
        }
        let _ = writeln!(out, "{}\"\"\"", indent);
    } else {
        let _ = writeln!(out, "{}{}", indent, quote(text));
    }
}

fn quote(text: &str) -> String {
    format!("\"{}\"", text.replace('\\', "\\\\").replace('"', "\\\""))
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_object_block() {
        let head = BlockHead {
            keyword: "type",
            name: "User",
            description: Some("A user"),
            go_model: Some("example.com/app/models.User"),
        };
        let fields = vec![
            FieldLine {
                name: "id".into(),
                ty: "ID!".into(),
                ..FieldLine::default()
            },
            FieldLine {
                name: "posts".into(),
                ty: "[Post!]!".into(),
                description: Some("Authored posts".into()),
                deprecated: Some(Deprecation {
                    reason: Some("use feed".into()),
                }),
                force_resolver: true,
            },
        ];
        assert_eq!(
            render_object(&head, &fields),
            "\"A user\"\n\
             type User @goModel(model: \"example.com/app/models.User\") {\n\
             \x20 id: ID!\n\
             \x20 \"Authored posts\"\n\
             \x20 posts: [Post!]! @deprecated(reason: \"use feed\") @goField(forceResolver: true)\n\
             }\n"
        );
    }

    #[test]
    fn test_enum_block() {
        let head = BlockHead {
            keyword: "enum",
            name: "Status",
            description: None,
            go_model: None,
        };
        let values = vec![
            EnumValueLine {
                name: "ACTIVE".into(),
                go_enum: Some("app/models.StatusActive".into()),
                ..EnumValueLine::default()
            },
            EnumValueLine {
                name: "LEGACY".into(),
                deprecated: Some(Deprecation { reason: None }),
                ..EnumValueLine::default()
            },
        ];
        assert_eq!(
            render_enum(&head, &values),
            "enum Status {\n\
             \x20 ACTIVE @goEnum(value: \"app/models.StatusActive\")\n\
             \x20 LEGACY @deprecated\n\
             }\n"
        );
    }

    #[test]
    fn test_multiline_description_uses_block_string() {
        let mut out = String::new();
        push_description(&mut out, Some("first\nsays \"hi\""), "  ");
        assert_eq!(out, "  \"\"\"\n  first\n  says \"hi\"\n  \"\"\"\n");
    }
}
