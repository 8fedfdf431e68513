//! # Field Visibility
//!
//! Decides whether a field appears in one named variant. First matching rule
//! wins:
//!
//! 1. read-only list: never in inputs; in types iff the variant matches.
//! 2. write-only list: never in types; in inputs iff the variant matches.
//! 3. read-write list: in either side iff the variant matches.
//! 4. omit list matching the variant: excluded.
//! 5. include list: included iff the variant matches.
//! 6. otherwise included unless ignored (ambient ignore-all or legacy
//!    `ignore`/`omit`), or forced by legacy `include`.

use crate::directives::models::VariantKind;
use crate::fields::options::FieldOptions;

/// Whether a field with `options` belongs in the `variant` of `kind`.
/// `ignore_all` is the struct-wide directive OR the variant's own setting.
pub fn is_field_included(
    options: &FieldOptions,
    ignore_all: bool,
    kind: VariantKind,
    variant: &str,
) -> bool {
    let is_input = kind.is_input();

    if let Some(list) = &options.read_only {
        return !is_input && list.matches(variant);
    }
    if let Some(list) = &options.write_only {
        return is_input && list.matches(variant);
    }
    if let Some(list) = &options.read_write {
        return list.matches(variant);
    }
    if let Some(list) = &options.omit_list {
        if list.matches(variant) {
            return false;
        }
    }
    if let Some(list) = &options.include_list {
        return list.matches(variant);
    }

    (!ignore_all && !options.ignore && !options.omit) || options.include
}
