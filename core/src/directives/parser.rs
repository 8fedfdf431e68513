//! # Directive Parsing
//!
//! Turns the comment text attached to a declaration into `StructDirectives`.
//!
//! A directive is a line starting with `@gql` (prefix matched
//! case-insensitively) immediately followed by a known suffix, either bare or
//! with a parenthesised `key:value` list. Unknown suffixes and malformed pairs
//! are dropped without failing.

use crate::directives::models::{
    Deprecation, DirectiveKind, EnumDirective, EnumValueDirective, ExtraFieldDef,
    ExtraFieldScope, StructDirectives, TargetList, VariantDef,
};
use crate::directives::splitter::{
    is_unbalanced, parse_list, split_key_value, split_top_level, unquote,
};
use tracing::debug;

const PREFIX: &str = "gql";

/// One recognised directive line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Directive {
    /// What kind of directive this is.
    pub kind: DirectiveKind,
    /// Its parameters.
    pub params: Params,
}

/// Ordered `key:value` parameters. Values keep their quotes until read.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Params {
    entries: Vec<(String, String)>,
}

impl Params {
    /// Parses the text between the parentheses of a directive.
    ///
    /// Tokens without a colon become either a positional `name` (when quoted)
    /// or a boolean flag set to `true`.
    pub fn parse(raw: &str) -> Self {
        let mut entries = Vec::new();
        for token in split_top_level(raw) {
            match split_key_value(&token) {
                Some((key, value)) => {
                    if key.is_empty() || is_unbalanced(value) {
                        debug!(token = %token, "dropping malformed directive parameter");
                        continue;
                    }
                    entries.push((key.to_string(), value.to_string()));
                }
                None if token.starts_with('"') || token.starts_with('\'') => {
                    if is_unbalanced(&token) {
                        debug!(token = %token, "dropping unterminated directive parameter");
                        continue;
                    }
                    entries.push(("name".to_string(), token));
                }
                None if token.chars().all(|c| c.is_alphanumeric() || c == '_') => {
                    entries.push((token, "true".to_string()));
                }
                None => debug!(token = %token, "dropping malformed directive parameter"),
            }
        }
        Self { entries }
    }

    /// Raw value of the first entry named `key` (case-insensitive).
    pub fn get(&self, key: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(key))
            .map(|(_, v)| v.as_str())
    }

    /// Unquoted, non-empty string value.
    pub fn string(&self, key: &str) -> Option<String> {
        self.get(key).map(unquote).filter(|s| !s.is_empty())
    }

    /// Boolean value; present without an explicit `false` means `true`.
    pub fn flag(&self, key: &str) -> bool {
        self.get(key)
            .map(|v| !unquote(v).eq_ignore_ascii_case("false"))
            .unwrap_or(false)
    }

    /// List value, if the key is present.
    pub fn list(&self, key: &str) -> Option<TargetList> {
        self.get(key).map(parse_list)
    }

    /// Whether no parameters were given.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Strips `//`, `/* */` and leading `*` markers from every comment line.
pub fn comment_lines(comment: &str) -> Vec<String> {
    comment
        .lines()
        .map(|line| {
            let mut line = line.trim();
            if let Some(rest) = line.strip_prefix("//") {
                line = rest;
            } else if let Some(rest) = line.strip_prefix("/*") {
                line = rest;
            }
            if let Some(rest) = line.strip_suffix("*/") {
                line = rest;
            }
            let line = line.trim();
            line.strip_prefix('*').unwrap_or(line).trim().to_string()
        })
        .filter(|line| !line.is_empty())
        .collect()
}

/// Recognises a directive at the start of a marker-stripped comment line.
pub fn parse_line(line: &str) -> Option<Directive> {
    let rest = line.trim().strip_prefix('@')?;
    let prefix = rest.get(..PREFIX.len())?;
    if !prefix.eq_ignore_ascii_case(PREFIX) {
        return None;
    }
    let rest = &rest[PREFIX.len()..];
    let suffix_len: usize = rest
        .chars()
        .take_while(|c| c.is_ascii_alphabetic())
        .map(char::len_utf8)
        .sum();
    let suffix = &rest[..suffix_len];
    let Some(kind) = DirectiveKind::from_suffix(suffix) else {
        debug!(directive = %line, "ignoring unknown directive");
        return None;
    };

    let after = rest[suffix_len..].trim_start();
    let params = match after.strip_prefix('(') {
        Some(inner) => Params::parse(match closing_paren(inner) {
            Some(end) => &inner[..end],
            None => {
                debug!(directive = %line, "unterminated parameter list");
                inner
            }
        }),
        None => Params::default(),
    };

    Some(Directive { kind, params })
}

/// Byte offset of the `)` closing a list whose `(` was already consumed.
fn closing_paren(inner: &str) -> Option<usize> {
    let mut quote: Option<char> = None;
    let mut depth = 0usize;
    for (i, c) in inner.char_indices() {
        match quote {
            Some(q) if c == q => quote = None,
            Some(_) => {}
            None => match c {
                '\'' | '"' => quote = Some(c),
                '(' | '[' => depth += 1,
                ']' => depth = depth.saturating_sub(1),
                ')' if depth == 0 => return Some(i),
                ')' => depth -= 1,
                _ => {}
            },
        }
    }
    None
}

/// Every directive in a comment, in order.
pub fn scan_directives(comment: &str) -> Vec<Directive> {
    comment_lines(comment)
        .iter()
        .filter_map(|line| parse_line(line))
        .collect()
}

/// Comment lines that are not directives, joined with single spaces.
pub fn plain_text(comment: &str) -> Option<String> {
    let lines: Vec<String> = comment_lines(comment)
        .into_iter()
        .filter(|line| !line.starts_with('@'))
        .collect();
    if lines.is_empty() {
        None
    } else {
        Some(lines.join(" "))
    }
}

/// Parses a declaration comment into its directive set.
pub fn parse_struct_directives(comment: &str) -> StructDirectives {
    let mut directives = StructDirectives {
        doc: plain_text(comment),
        ..StructDirectives::default()
    };

    for Directive { kind, params } in scan_directives(comment) {
        match kind {
            DirectiveKind::Type => directives.types.push(variant_def(&params)),
            DirectiveKind::Input => directives.inputs.push(variant_def(&params)),
            DirectiveKind::IgnoreAll => directives.ignore_all = true,
            DirectiveKind::ExtraField => push_extra(&mut directives, &params, ExtraFieldScope::Both),
            DirectiveKind::TypeExtraField => {
                push_extra(&mut directives, &params, ExtraFieldScope::Type)
            }
            DirectiveKind::InputExtraField => {
                push_extra(&mut directives, &params, ExtraFieldScope::Input)
            }
            DirectiveKind::Skip => directives.skip = true,
            DirectiveKind::Namespace => {
                directives.namespace = params.string("name").or_else(|| params.string("namespace"))
            }
            DirectiveKind::UseModelDirective => directives.use_model_directive = true,
            DirectiveKind::Enum => {
                directives.enumeration = Some(EnumDirective {
                    name: params.string("name"),
                    description: params.string("description"),
                })
            }
            // consumed by the enum matcher from const comments
            DirectiveKind::EnumValue => {}
        }
    }

    directives
}

fn variant_def(params: &Params) -> VariantDef {
    VariantDef {
        name: params.string("name"),
        description: params.string("description"),
        ignore_all: params.flag("ignoreAll"),
        namespace: params.string("namespace"),
    }
}

fn push_extra(directives: &mut StructDirectives, params: &Params, scope: ExtraFieldScope) {
    match (params.string("name"), params.string("type")) {
        (Some(name), Some(ty)) => directives.extra_fields.push(ExtraFieldDef {
            name,
            ty,
            description: params.string("description"),
            on: params.list("on").unwrap_or(TargetList::Wildcard),
            scope,
        }),
        _ => debug!(?params, "extra field directive needs both name and type"),
    }
}

/// Parses the `@gqlEnumValue` directive of a constant comment, if any.
pub fn parse_enum_value_directive(comment: &str) -> EnumValueDirective {
    let mut value = EnumValueDirective::default();
    for Directive { kind, params } in scan_directives(comment) {
        if kind != DirectiveKind::EnumValue {
            continue;
        }
        value.name = params.string("name").or(value.name);
        value.description = params.string("description").or(value.description);
        if let Some(raw) = params.get("deprecated") {
            let reason = unquote(raw);
            value.deprecated = match reason.as_str() {
                "false" => None,
                "true" | "" => Some(Deprecation { reason: None }),
                _ => Some(Deprecation {
                    reason: Some(reason),
                }),
            };
        }
    }
    value
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_comment_lines_strip_markers() {
        let lines = comment_lines("// one\n/* two */\n/**\n * three\n */");
        assert_eq!(lines, vec!["one", "two", "three"]);
    }

    #[test]
    fn test_repeated_type_directives_accumulate() {
        let d = parse_struct_directives(
            "// User model\n// @gqlType(name:\"UserV1\")\n// @gqlType(name:\"UserV2\", description:\"v2, improved\")\n// @gqlInput",
        );
        assert_eq!(d.types.len(), 2);
        assert_eq!(d.types[0].name.as_deref(), Some("UserV1"));
        assert_eq!(d.types[1].description.as_deref(), Some("v2, improved"));
        assert_eq!(d.inputs, vec![VariantDef::default()]);
        assert_eq!(d.doc.as_deref(), Some("User model"));
        assert!(d.is_annotated());
    }

    #[test]
    fn test_prefix_case_insensitive_and_unknown_ignored() {
        let d = parse_struct_directives("// @GQLType\n// @gqlFrobnicate(x:1)\n// @gqltype");
        assert_eq!(d.types.len(), 1, "suffix is case-sensitive");
    }

    #[test]
    fn test_variant_flags() {
        let d = parse_struct_directives(
            "// @gqlType(name:'Admin', ignoreAll, namespace:\"admin.views\")\n// @gqlInput(ignoreAll:false)",
        );
        assert!(d.types[0].ignore_all);
        assert_eq!(d.types[0].namespace.as_deref(), Some("admin.views"));
        assert!(!d.inputs[0].ignore_all);
    }

    #[test]
    fn test_extra_fields_default_to_wildcard() {
        let d = parse_struct_directives(
            "// @gqlExtraField(name:\"fullName\", type:\"String!\")\n// @gqlTypeExtraField(name:\"score\", type:\"Int\", on:[UserV1, 'UserV2'])\n// @gqlInputExtraField(name:\"token\", type:\"String\", on:\"\")",
        );
        assert_eq!(d.extra_fields.len(), 3);
        assert_eq!(d.extra_fields[0].on, TargetList::Wildcard);
        assert_eq!(d.extra_fields[0].scope, ExtraFieldScope::Both);
        assert_eq!(
            d.extra_fields[1].on,
            TargetList::Names(vec!["UserV1".into(), "UserV2".into()])
        );
        assert_eq!(d.extra_fields[2].on, TargetList::Unrestricted);
        assert_eq!(d.extra_fields[2].scope, ExtraFieldScope::Input);
    }

    #[test]
    fn test_malformed_pairs_are_dropped() {
        let d = parse_struct_directives(
            "// @gqlType(name:\"Ok\", description:\"unterminated)\n// @gqlExtraField(name:\"x\")",
        );
        assert_eq!(d.types.len(), 1);
        assert_eq!(d.types[0].name.as_deref(), Some("Ok"));
        assert!(d.types[0].description.is_none());
        assert!(d.extra_fields.is_empty());
    }

    #[test]
    fn test_struct_flags() {
        let d = parse_struct_directives(
            "// @gqlIgnoreAll\n// @gqlSkip\n// @gqlUseModelDirective\n// @gqlNamespace(\"billing.invoices\")",
        );
        assert!(d.ignore_all);
        assert!(d.skip);
        assert!(d.use_model_directive);
        assert_eq!(d.namespace.as_deref(), Some("billing.invoices"));
        assert!(!d.is_annotated());
    }

    #[test]
    fn test_enum_directives() {
        let d = parse_struct_directives("// @gqlEnum(name:\"OrderStatus\", description:\"State\")");
        let e = d.enumeration.unwrap();
        assert_eq!(e.name.as_deref(), Some("OrderStatus"));
        assert_eq!(e.description.as_deref(), Some("State"));

        let v = parse_enum_value_directive(
            "// @gqlEnumValue(name:\"ON\", deprecated:\"use ACTIVE\")",
        );
        assert_eq!(v.name.as_deref(), Some("ON"));
        assert_eq!(
            v.deprecated,
            Some(Deprecation {
                reason: Some("use ACTIVE".into())
            })
        );

        let bare = parse_enum_value_directive("// @gqlEnumValue(deprecated)");
        assert_eq!(bare.deprecated, Some(Deprecation { reason: None }));
    }
}
