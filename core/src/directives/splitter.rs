//! # Parameter Splitting
//!
//! The comma splitter shared by directive parameters, field tags and list
//! values. Commas inside `'...'`, `"..."` or `[...]` do not split.

use crate::directives::models::TargetList;

/// Splits `input` on top-level commas. Empty segments are dropped and every
/// segment is trimmed. An unterminated quote or bracket swallows the rest of
/// the input into the last segment.
pub fn split_top_level(input: &str) -> Vec<String> {
    let mut parts = Vec::new();
    let mut current = String::new();
    let mut quote: Option<char> = None;
    let mut depth = 0usize;
    let mut escaped = false;

    for c in input.chars() {
        if escaped {
            current.push(c);
            escaped = false;
            continue;
        }
        match quote {
            Some(q) => {
                if c == '\\' {
                    escaped = true;
                } else if c == q {
                    quote = None;
                }
                current.push(c);
            }
            None => match c {
                '\'' | '"' => {
                    quote = Some(c);
                    current.push(c);
                }
                '[' => {
                    depth += 1;
                    current.push(c);
                }
                ']' => {
                    depth = depth.saturating_sub(1);
                    current.push(c);
                }
                ',' if depth == 0 => {
                    push_trimmed(&mut parts, &current);
                    current.clear();
                }
                _ => current.push(c),
            },
        }
    }
    push_trimmed(&mut parts, &current);
    parts
}

fn push_trimmed(parts: &mut Vec<String>, segment: &str) {
    let trimmed = segment.trim();
    if !trimmed.is_empty() {
        parts.push(trimmed.to_string());
    }
}

/// Splits `key:value` at the first colon outside quotes and brackets.
/// Returns `None` when the token has no such colon.
pub fn split_key_value(token: &str) -> Option<(&str, &str)> {
    let mut quote: Option<char> = None;
    let mut depth = 0usize;
    for (i, c) in token.char_indices() {
        match quote {
            Some(q) if c == q => quote = None,
            Some(_) => {}
            None => match c {
                '\'' | '"' => quote = Some(c),
                '[' => depth += 1,
                ']' => depth = depth.saturating_sub(1),
                ':' if depth == 0 => return Some((token[..i].trim(), token[i + 1..].trim())),
                _ => {}
            },
        }
    }
    None
}

/// Whether `value` starts with a quote it never closes, or opens a bracket
/// it never closes.
pub fn is_unbalanced(value: &str) -> bool {
    let value = value.trim();
    let mut chars = value.chars();
    match chars.next() {
        Some(q @ ('\'' | '"')) => value.len() < 2 || !value.ends_with(q),
        Some('[') => !value.ends_with(']'),
        _ => false,
    }
}

/// Removes one pair of matching surrounding quotes.
pub fn unquote(value: &str) -> String {
    let value = value.trim();
    for q in ['"', '\''] {
        if value.len() >= 2 && value.starts_with(q) && value.ends_with(q) {
            return value[1..value.len() - 1].replace(&format!("\\{}", q), &q.to_string());
        }
    }
    value.to_string()
}

/// Parses the three surface forms of a list value: `'A,B'`, `A` and
/// `[A, 'B']`. Empty forms normalize to `TargetList::Unrestricted`.
pub fn parse_list(value: &str) -> TargetList {
    let value = value.trim();
    let names: Vec<String> = if let Some(inner) = value
        .strip_prefix('[')
        .and_then(|rest| rest.strip_suffix(']'))
    {
        split_top_level(inner)
            .iter()
            .map(|item| unquote(item))
            .flat_map(|item| split_names(&item))
            .collect()
    } else {
        split_names(&unquote(value))
    };

    if names.is_empty() {
        TargetList::Unrestricted
    } else if names.iter().any(|n| n == "*") {
        TargetList::Wildcard
    } else {
        TargetList::Names(names)
    }
}

fn split_names(joined: &str) -> Vec<String> {
    joined
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}
