//! # Enum Matching
//!
//! Second pass pairing `@gqlEnum` candidates with const blocks typed by them.
//! Runs after every unit is scanned, since a type and its constants may live
//! in different files or packages.

use crate::directives::parser::{parse_enum_value_directive, parse_struct_directives, plain_text};
use crate::fields::naming::enum_value_name;
use crate::parser::models::{ConstExpr, ParsedConst};
use crate::parser::type_expr::TypeExpr;
use crate::registry::models::{
    EnumCandidate, EnumDescriptor, EnumLiteral, EnumValueDescriptor, Origin,
};
use indexmap::IndexMap;
use tracing::debug;

/// A const block as seen during scanning.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConstBlockRecord {
    /// Declaring package and file.
    pub origin: Origin,
    /// Specs in declaration order.
    pub specs: Vec<ParsedConst>,
}

/// Matches every block against every candidate.
///
/// Enums come out in candidate order and values in block order, so the result
/// does not depend on whether a block was scanned before its type.
pub fn match_enums(
    candidates: &IndexMap<String, EnumCandidate>,
    blocks: &[ConstBlockRecord],
    comment_descriptions: bool,
) -> IndexMap<String, EnumDescriptor> {
    let mut enums: IndexMap<String, EnumDescriptor> = candidates
        .values()
        .map(|candidate| {
            let directive = parse_struct_directives(&candidate.comment)
                .enumeration
                .unwrap_or_default();
            let description = directive.description.or_else(|| {
                comment_descriptions
                    .then(|| plain_text(&candidate.comment))
                    .flatten()
            });
            (
                candidate.name.clone(),
                EnumDescriptor {
                    ident: candidate.name.clone(),
                    name: directive.name.unwrap_or_else(|| candidate.name.clone()),
                    description,
                    origin: candidate.origin.clone(),
                    values: Vec::new(),
                    comment: candidate.comment.clone(),
                },
            )
        })
        .collect();

    for block in blocks {
        let mut counter: i64 = 0;
        let mut block_type: Option<&TypeExpr> = None;

        for spec in &block.specs {
            // a bare spec repeats the previous type; an untyped initializer
            // leaves the constant untyped
            match (&spec.ty, &spec.value) {
                (Some(ty), _) => block_type = Some(ty),
                (None, Some(_)) => block_type = None,
                (None, None) => {}
            }
            let literal = match &spec.value {
                Some(ConstExpr::Int(n)) => EnumLiteral::Int(*n),
                Some(ConstExpr::Str(s)) => EnumLiteral::Str(s.clone()),
                // expressions are not evaluated; they take the counter position
                Some(ConstExpr::Iota) | Some(ConstExpr::Expr(_)) | None => {
                    EnumLiteral::Int(counter)
                }
            };
            counter += 1;

            let Some(enum_ident) = block_type.and_then(|t| t.base_name()) else {
                continue;
            };
            let Some(descriptor) = enums.get_mut(enum_ident) else {
                debug!(
                    constant = %spec.name,
                    ty = %enum_ident,
                    "const does not belong to a known enum"
                );
                continue;
            };
            if descriptor.values.iter().any(|v| v.ident == spec.name) {
                continue;
            }

            let directive = parse_enum_value_directive(&spec.comment);
            let description = directive.description.or_else(|| {
                comment_descriptions
                    .then(|| plain_text(&spec.comment))
                    .flatten()
            });
            descriptor.values.push(EnumValueDescriptor {
                ident: spec.name.clone(),
                name: directive
                    .name
                    .unwrap_or_else(|| enum_value_name(&spec.name, &descriptor.ident)),
                value: literal,
                description,
                deprecated: directive.deprecated,
                origin: block.origin.clone(),
            });
        }
    }

    enums
}
