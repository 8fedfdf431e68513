#![deny(missing_docs)]

//! # Field Flattening
//!
//! Produces the effective field list of a struct: own fields plus the fields
//! promoted from embedded structs, with generic type parameters replaced by
//! the arguments bound at each embedding site.
//!
//! * Arguments bind positionally to the embedded struct's parameters. A
//!   pointer on an argument is dropped when binding; nullability comes from
//!   how the field itself is declared.
//! * Parameters with no argument bind to the configured fallback scalar.
//! * A promoted field loses to any shallower field with the same output name.
//! * A struct already on the expansion path is not expanded again, and
//!   expansion stops at `MAX_EMBED_DEPTH`.

use crate::config::Settings;
use crate::fields::naming::Namer;
use crate::fields::options::FieldOptions;
use crate::parser::type_expr::TypeExpr;
use crate::registry::models::{EmbedMode, StructDescriptor};
use crate::registry::SourceModel;
use std::collections::HashMap;
use tracing::{debug, warn};

/// Deepest embedding chain that is expanded.
pub const MAX_EMBED_DEPTH: usize = 32;

/// A field after embedding and substitution.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedField {
    /// Output name.
    pub name: String,
    /// Source identifier (the type name for a named embedded field).
    pub ident: String,
    /// Declared type with every bound parameter substituted.
    pub ty: TypeExpr,
    /// Tag options.
    pub options: FieldOptions,
    /// Attached comment.
    pub comment: String,
    /// Embedding depth; `0` for the struct's own fields.
    pub depth: usize,
    /// Struct that declares the field.
    pub owner: String,
}

/// Result of expanding one struct.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Flattened {
    /// Effective fields, in promotion order.
    pub fields: Vec<ResolvedField>,
    /// Every inlined embedded type, substituted.
    pub embedded: Vec<TypeExpr>,
}

/// Expands structs against a `SourceModel`.
#[derive(Debug, Clone, Copy)]
pub struct Flattener<'a> {
    model: &'a SourceModel,
    settings: &'a Settings,
    quiet: bool,
}

impl<'a> Flattener<'a> {
    /// A flattener that warns about unbound parameters unless the settings
    /// suppress it.
    pub fn new(model: &'a SourceModel, settings: &'a Settings) -> Self {
        Self {
            model,
            settings,
            quiet: settings.suppress_generic_warnings,
        }
    }

    /// Silences warnings regardless of settings.
    pub fn quiet(mut self) -> Self {
        self.quiet = true;
        self
    }

    /// Flattens `descriptor` as declared. Parameters of a generic struct bind
    /// to the fallback scalar.
    pub fn flatten(&self, descriptor: &StructDescriptor) -> Flattened {
        self.flatten_with_args(descriptor, &[])
    }

    /// Flattens `descriptor` instantiated with `args`.
    pub fn flatten_with_args(
        &self,
        descriptor: &StructDescriptor,
        args: &[TypeExpr],
    ) -> Flattened {
        let bindings = self.bind(descriptor, args);
        let mut out = Flattened::default();
        let mut path = vec![descriptor.name.clone()];
        self.expand(descriptor, &bindings, 0, &mut path, &mut out);
        out.fields = shallowest_wins(out.fields);
        out
    }

    /// Positional parameter bindings for an instantiation.
    pub fn bind(
        &self,
        descriptor: &StructDescriptor,
        args: &[TypeExpr],
    ) -> HashMap<String, TypeExpr> {
        let params = self
            .model
            .generic_params(&descriptor.name)
            .unwrap_or_default();

        params
            .iter()
            .enumerate()
            .map(|(i, param)| {
                let bound = match args.get(i) {
                    Some(arg) => arg.strip_pointers().clone(),
                    None => {
                        if !self.quiet {
                            warn!(
                                owner = %descriptor.name,
                                param = %param,
                                fallback = %self.settings.generic_fallback_scalar,
                                "unresolved type parameter"
                            );
                        }
                        TypeExpr::named(self.settings.generic_fallback_scalar.clone())
                    }
                };
                (param.clone(), bound)
            })
            .collect()
    }

    fn expand(
        &self,
        descriptor: &StructDescriptor,
        bindings: &HashMap<String, TypeExpr>,
        depth: usize,
        path: &mut Vec<String>,
        out: &mut Flattened,
    ) {
        let namer = Namer::new(self.settings);
        let use_json = self.settings.use_json_tag;

        for field in &descriptor.fields {
            let ty = field.ty.substitute(bindings);

            if field.is_embedded() && field.embed_mode(use_json) == EmbedMode::Inline {
                let Some(target) = ty.base_name().and_then(|n| self.model.get_struct(n)) else {
                    debug!(owner = %descriptor.name, embedded = %ty, "embedded type not found");
                    continue;
                };
                if path.iter().any(|p| p == &target.name) {
                    debug!(
                        owner = %descriptor.name,
                        embedded = %target.name,
                        "embedding cycle cut"
                    );
                    continue;
                }
                if depth + 1 > MAX_EMBED_DEPTH {
                    warn!(owner = %descriptor.name, depth, "embedding too deep, not expanded");
                    continue;
                }
                let inner = self.bind(target, ty.type_args());
                out.embedded.push(ty);
                path.push(target.name.clone());
                self.expand(target, &inner, depth + 1, path, out);
                path.pop();
                continue;
            }

            if field.is_embedded() && field.embed_mode(use_json) == EmbedMode::Dropped {
                continue;
            }
            if field.options.is_dropped(use_json) {
                continue;
            }

            let ident = field.ident().to_string();
            out.fields.push(ResolvedField {
                name: namer.field_name(&ident, &field.options),
                ident,
                ty,
                options: field.options.clone(),
                comment: field.comment.clone(),
                depth,
                owner: descriptor.name.clone(),
            });
        }
    }
}

/// Keeps, for every output name, the shallowest field; earlier wins a tie.
fn shallowest_wins(fields: Vec<ResolvedField>) -> Vec<ResolvedField> {
    let mut best: HashMap<&str, (usize, usize)> = HashMap::new();
    for (i, f) in fields.iter().enumerate() {
        match best.get(f.name.as_str()) {
            Some(&(depth, _)) if depth <= f.depth => {}
            _ => {
                best.insert(f.name.as_str(), (f.depth, i));
            }
        }
    }
    let keep: Vec<bool> = fields
        .iter()
        .enumerate()
        .map(|(i, f)| best.get(f.name.as_str()).map(|&(_, k)| k) == Some(i))
        .collect();
    fields
        .into_iter()
        .zip(keep)
        .filter_map(|(f, k)| k.then_some(f))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::models::{ParsedField, ParsedTypeDecl, ParsedUnit};

    fn model(decls: Vec<ParsedTypeDecl>) -> SourceModel {
        let mut m = SourceModel::new(&Settings::default());
        let mut unit = ParsedUnit::new("models", "models/models.go");
        unit.types = decls;
        m.scan(unit);
        m
    }

    fn field(name: &str, ty: &str) -> ParsedField {
        ParsedField::named(name, ty.parse().unwrap())
    }

    fn embed(ty: &str) -> ParsedField {
        ParsedField::embedded(ty.parse().unwrap())
    }

    fn summary(f: &Flattened) -> Vec<(String, String)> {
        f.fields
            .iter()
            .map(|r| (r.name.clone(), r.ty.to_string()))
            .collect()
    }

    #[test]
    fn test_generic_embedding_substitutes_and_drops_argument_pointer() {
        let m = model(vec![
            ParsedTypeDecl::structure("User", vec![field("ID", "string")]),
            ParsedTypeDecl::structure(
                "Wrapper",
                vec![field("Data", "T"), field("Count", "int")],
            )
            .with_type_params(["T"]),
            ParsedTypeDecl::structure("UserWrapper", vec![embed("Wrapper[*User]")]),
        ]);
        let settings = Settings::default();
        let wrapper = m.get_struct("UserWrapper").unwrap();
        let out = Flattener::new(&m, &settings).flatten(wrapper);
        assert_eq!(
            summary(&out),
            vec![
                ("data".to_string(), "User".to_string()),
                ("count".to_string(), "int".to_string()),
            ]
        );
        assert_eq!(out.fields[0].owner, "Wrapper");
        assert_eq!(out.fields[0].depth, 1);
        assert_eq!(
            out.embedded,
            vec!["Wrapper[*User]".parse::<TypeExpr>().unwrap()]
        );
    }

    #[test]
    fn test_nested_generic_chain_leaves_no_parameters() {
        let m = model(vec![
            ParsedTypeDecl::structure("Item", vec![field("Name", "string")]),
            ParsedTypeDecl::structure("Inner", vec![field("Value", "*V"), field("All", "[]V")])
                .with_type_params(["V"]),
            ParsedTypeDecl::structure(
                "Middle",
                vec![embed("Inner[U]"), field("Extra", "map[string]U")],
            )
            .with_type_params(["U"]),
            ParsedTypeDecl::structure("Outer", vec![embed("Middle[T]")]).with_type_params(["T"]),
            ParsedTypeDecl::structure("Root", vec![embed("Outer[Item]")]),
        ]);
        let settings = Settings::default();
        let out = Flattener::new(&m, &settings).flatten(m.get_struct("Root").unwrap());
        assert_eq!(
            summary(&out),
            vec![
                ("value".to_string(), "*Item".to_string()),
                ("all".to_string(), "[]Item".to_string()),
                ("extra".to_string(), "map[string]Item".to_string()),
            ]
        );
        let params = vec!["T".to_string(), "U".to_string(), "V".to_string()];
        assert!(out.fields.iter().all(|f| !f.ty.mentions_any(&params)));
    }

    #[test]
    fn test_unbound_parameter_uses_fallback() {
        let m = model(vec![
            ParsedTypeDecl::structure("Box", vec![field("Content", "T")]).with_type_params(["T"]),
        ]);
        let settings = Settings {
            generic_fallback_scalar: "Any".into(),
            suppress_generic_warnings: true,
            ..Settings::default()
        };
        let out = Flattener::new(&m, &settings).flatten(m.get_struct("Box").unwrap());
        assert_eq!(summary(&out), vec![("content".to_string(), "Any".to_string())]);
    }

    #[test]
    fn test_shallow_field_shadows_promoted_one() {
        let m = model(vec![
            ParsedTypeDecl::structure("Base", vec![field("ID", "int"), field("Note", "string")]),
            ParsedTypeDecl::structure("Doc", vec![embed("Base"), field("ID", "string")]),
        ]);
        let settings = Settings::default();
        let out = Flattener::new(&m, &settings).flatten(m.get_struct("Doc").unwrap());
        assert_eq!(
            summary(&out),
            vec![
                ("note".to_string(), "string".to_string()),
                ("id".to_string(), "string".to_string()),
            ]
        );
    }

    #[test]
    fn test_embedding_cycle_is_cut() {
        let m = model(vec![
            ParsedTypeDecl::structure("A", vec![embed("*B"), field("X", "int")]),
            ParsedTypeDecl::structure("B", vec![embed("*A"), field("Y", "int")]),
        ]);
        let settings = Settings::default();
        let out = Flattener::new(&m, &settings).flatten(m.get_struct("A").unwrap());
        assert_eq!(
            summary(&out),
            vec![
                ("y".to_string(), "int".to_string()),
                ("x".to_string(), "int".to_string()),
            ]
        );
    }

    #[test]
    fn test_named_and_dropped_embeddings() {
        let m = model(vec![
            ParsedTypeDecl::structure("Meta", vec![field("Version", "int")]),
            ParsedTypeDecl::structure(
                "Post",
                vec![
                    embed("Meta").with_tag(r#"json:"meta""#),
                    embed("*Meta").with_tag(r#"gql:"-""#),
                    field("Secret", "string").with_tag(r#"gql:"-""#),
                    field("Title", "string"),
                ],
            ),
        ]);
        let settings = Settings::default();
        let out = Flattener::new(&m, &settings).flatten(m.get_struct("Post").unwrap());
        assert_eq!(
            summary(&out),
            vec![
                ("meta".to_string(), "Meta".to_string()),
                ("title".to_string(), "string".to_string()),
            ]
        );
        assert_eq!(out.fields[0].ident, "Meta");
    }

    #[test]
    fn test_field_options_survive_flattening() {
        let m = model(vec![
            ParsedTypeDecl::structure(
                "Page",
                vec![
                    field("Items", "[]T"),
                    field("Cursor", "string").with_tag(r#"gql:"cursor,omit""#),
                ],
            )
            .with_type_params(["T"]),
            ParsedTypeDecl::structure("Feed", vec![embed("Page[string]")]),
        ]);
        let settings = Settings::default();
        let out = Flattener::new(&m, &settings).flatten(m.get_struct("Feed").unwrap());
        assert!(out.fields[1].options.omit);
        assert_eq!(out.fields[0].ty.to_string(), "[]string");
    }
}
