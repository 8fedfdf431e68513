//! # Naming
//!
//! Case conversion for field names and enum values, and derivation of output
//! type/input names from struct identifiers.

use crate::config::{FieldCase, Settings};
use crate::fields::options::FieldOptions;
use heck::ToSnakeCase;

/// Lower camel case. Identifiers of at most three characters that are all
/// upper case (`ID`, `URL`) are lowered entirely; otherwise only the first
/// character is.
pub fn to_lower_camel(ident: &str) -> String {
    if ident.chars().count() <= 3 && ident.chars().all(|c| !c.is_lowercase()) {
        return ident.to_lowercase();
    }
    let mut chars = ident.chars();
    match chars.next() {
        Some(first) => first.to_lowercase().chain(chars).collect(),
        None => String::new(),
    }
}

/// Converts a struct field identifier according to `case`.
pub fn apply_case(ident: &str, case: FieldCase) -> String {
    match case {
        FieldCase::Camel => to_lower_camel(ident),
        FieldCase::Snake => ident.to_snake_case(),
        FieldCase::Pascal | FieldCase::Original | FieldCase::None => ident.to_string(),
    }
}

/// `InProgress` -> `IN_PROGRESS`: an underscore before every upper-case letter
/// past position zero, then everything upper-cased.
pub fn to_upper_snake(ident: &str) -> String {
    let mut out = String::with_capacity(ident.len() + 4);
    for (i, c) in ident.chars().enumerate() {
        if i > 0 && c.is_uppercase() && !out.ends_with('_') {
            out.push('_');
        }
        out.extend(c.to_uppercase());
    }
    out
}

/// Output name of an enum constant: the enum identifier is stripped as a
/// literal prefix when present, then the remainder is upper-snake-cased.
pub fn enum_value_name(const_ident: &str, enum_ident: &str) -> String {
    let remainder = const_ident
        .strip_prefix(enum_ident)
        .filter(|rest| !rest.is_empty())
        .unwrap_or(const_ident);
    to_upper_snake(remainder)
}

/// Derives default output names from struct identifiers.
#[derive(Debug, Clone, Copy)]
pub struct Namer<'a> {
    settings: &'a Settings,
}

impl<'a> Namer<'a> {
    /// A namer over `settings`.
    pub fn new(settings: &'a Settings) -> Self {
        Self { settings }
    }

    fn stripped<'n>(&self, ident: &'n str) -> &'n str {
        let mut name = ident;
        for prefix in &self.settings.strip_prefix {
            if let Some(rest) = name.strip_prefix(prefix.as_str()) {
                if !rest.is_empty() {
                    name = rest;
                    break;
                }
            }
        }
        for suffix in &self.settings.strip_suffix {
            if let Some(rest) = name.strip_suffix(suffix.as_str()) {
                if !rest.is_empty() {
                    name = rest;
                    break;
                }
            }
        }
        name
    }

    /// Default type name for a struct.
    pub fn type_name(&self, ident: &str) -> String {
        format!(
            "{}{}{}",
            self.settings.type_prefix,
            self.stripped(ident),
            self.settings.type_suffix
        )
    }

    /// Default input name for a struct.
    pub fn input_name(&self, ident: &str) -> String {
        format!(
            "{}{}{}",
            self.settings.input_prefix,
            self.stripped(ident),
            self.settings.input_suffix
        )
    }

    /// Output name of a field: the tag name when one is given, else the
    /// identifier in the configured case.
    pub fn field_name(&self, ident: &str, options: &FieldOptions) -> String {
        match options.tag_name(self.settings.use_json_tag) {
            Some(name) => name.to_string(),
            None => apply_case(ident, self.settings.field_case),
        }
    }
}
