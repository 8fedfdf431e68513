//! # Field Options
//!
//! Parses a field's `gql` tag (with the `json` tag as a fallback source of
//! names) into a `FieldOptions` record, once, at scan time.
//!
//! Tag grammar: an optional leading name, then bare flags (`omit`, `ro`,
//! `required`, ...) and `key:value` pairs (`type:String!`, `ro:[AdminView]`,
//! `description:'...'`), split with the same quote/bracket-aware splitter the
//! directives use.

use crate::directives::models::{Deprecation, TargetList};
use crate::directives::splitter::{parse_list, split_key_value, split_top_level, unquote};
use crate::parser::struct_tag;
use tracing::debug;

/// Everything a field's tags say about it.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct FieldOptions {
    /// Name from the `gql` tag.
    pub name: Option<String>,
    /// First segment of the `json` tag, unless it is `-`.
    pub json_name: Option<String>,
    /// `gql:"-"`
    pub excluded: bool,
    /// `json:"-"`
    pub json_excluded: bool,
    /// `type:` override, verbatim.
    pub type_override: Option<String>,
    /// `required` (`Some(true)`) or `optional` (`Some(false)`).
    pub required: Option<bool>,
    /// `forceResolver`
    pub force_resolver: bool,
    /// `description:`
    pub description: Option<String>,
    /// `deprecated` / `deprecated:reason`
    pub deprecated: Option<Deprecation>,
    /// Legacy bare `ignore`.
    pub ignore: bool,
    /// Legacy bare `omit`.
    pub omit: bool,
    /// Legacy bare `include`.
    pub include: bool,
    /// `include` / `include:...`
    pub include_list: Option<TargetList>,
    /// `omit`, `ignore`, `omit:...`, `ignore:...`
    pub omit_list: Option<TargetList>,
    /// `ro` / `ro:...`
    pub read_only: Option<TargetList>,
    /// `wo` / `wo:...`
    pub write_only: Option<TargetList>,
    /// `rw` / `rw:...`
    pub read_write: Option<TargetList>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Token {
    Ignore,
    Omit,
    Include,
    Required,
    Optional,
    ForceResolver,
    Deprecated,
    ReadOnly,
    WriteOnly,
    ReadWrite,
    Type,
    Description,
}

impl Token {
    fn lookup(word: &str) -> Option<Self> {
        Some(match word.to_ascii_lowercase().as_str() {
            "ignore" => Token::Ignore,
            "omit" => Token::Omit,
            "include" => Token::Include,
            "required" => Token::Required,
            "optional" => Token::Optional,
            "forceresolver" => Token::ForceResolver,
            "deprecated" => Token::Deprecated,
            "ro" | "readonly" => Token::ReadOnly,
            "wo" | "writeonly" => Token::WriteOnly,
            "rw" | "readwrite" => Token::ReadWrite,
            "type" => Token::Type,
            "description" => Token::Description,
            _ => return None,
        })
    }
}

impl FieldOptions {
    /// Options for a field with the raw struct tag `tag`.
    pub fn from_tag(tag: Option<&str>) -> Self {
        let Some(tag) = tag else {
            return Self::default();
        };
        let mut options = match struct_tag::lookup(tag, "gql") {
            Some(gql) => Self::parse(&gql),
            None => Self::default(),
        };
        match struct_tag::json_name(tag).as_deref() {
            Some("-") => options.json_excluded = true,
            Some(name) => options.json_name = Some(name.to_string()),
            None => {}
        }
        options
    }

    /// Parses a `gql` tag value.
    pub fn parse(value: &str) -> Self {
        let mut options = Self::default();
        if value.trim() == "-" {
            options.excluded = true;
            return options;
        }

        let tokens = split_top_level(value);
        let mut rest = tokens.as_slice();
        if let Some(first) = tokens.first() {
            if split_key_value(first).is_none() && Token::lookup(first).is_none() {
                options.name = Some(unquote(first));
                rest = &tokens[1..];
            }
        }

        for token in rest {
            match split_key_value(token) {
                Some((key, value)) => options.apply_pair(key, value),
                None => options.apply_flag(token),
            }
        }
        options
    }

    fn apply_flag(&mut self, word: &str) {
        match Token::lookup(word) {
            Some(Token::Ignore) => {
                self.ignore = true;
                self.omit_list = Some(TargetList::Wildcard);
            }
            Some(Token::Omit) => {
                self.omit = true;
                self.omit_list = Some(TargetList::Wildcard);
            }
            Some(Token::Include) => {
                self.include = true;
                self.include_list = Some(TargetList::Wildcard);
            }
            Some(Token::Required) => self.required = Some(true),
            Some(Token::Optional) => self.required = Some(false),
            Some(Token::ForceResolver) => self.force_resolver = true,
            Some(Token::Deprecated) => self.deprecated = Some(Deprecation { reason: None }),
            Some(Token::ReadOnly) => self.read_only = Some(TargetList::Wildcard),
            Some(Token::WriteOnly) => self.write_only = Some(TargetList::Wildcard),
            Some(Token::ReadWrite) => self.read_write = Some(TargetList::Wildcard),
            Some(Token::Type) | Some(Token::Description) | None => {
                debug!(flag = %word, "ignoring unknown field flag")
            }
        }
    }

    fn apply_pair(&mut self, key: &str, value: &str) {
        match Token::lookup(key) {
            Some(Token::Type) => self.type_override = Some(unquote(value)).filter(|t| !t.is_empty()),
            Some(Token::Description) => {
                self.description = Some(unquote(value)).filter(|d| !d.is_empty())
            }
            Some(Token::Deprecated) => {
                let reason = unquote(value);
                self.deprecated = match reason.as_str() {
                    "false" => None,
                    "true" | "" => Some(Deprecation { reason: None }),
                    _ => Some(Deprecation {
                        reason: Some(reason),
                    }),
                }
            }
            Some(Token::Include) => self.include_list = Some(parse_list(value)),
            Some(Token::Omit) | Some(Token::Ignore) => self.omit_list = Some(parse_list(value)),
            Some(Token::ReadOnly) => self.read_only = Some(parse_list(value)),
            Some(Token::WriteOnly) => self.write_only = Some(parse_list(value)),
            Some(Token::ReadWrite) => self.read_write = Some(parse_list(value)),
            Some(Token::Required) => self.required = Some(unquote(value) != "false"),
            Some(Token::Optional) => self.required = Some(unquote(value) == "false"),
            Some(Token::ForceResolver) => self.force_resolver = unquote(value) != "false",
            None => debug!(key = %key, "ignoring unknown field option"),
        }
    }

    /// Whether the field must never be emitted.
    pub fn is_dropped(&self, use_json_tag: bool) -> bool {
        self.excluded || (use_json_tag && self.json_excluded && self.name.is_none())
    }

    /// Name given by tags, if any.
    pub fn tag_name(&self, use_json_tag: bool) -> Option<&str> {
        self.name
            .as_deref()
            .or_else(|| self.json_name.as_deref().filter(|_| use_json_tag))
    }
}
