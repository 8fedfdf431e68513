#![deny(missing_docs)]

//! # Schema Generator
//!
//! Turns the resolved model into SDL blocks: one per (struct, variant) the
//! dependency graph flags, one per generic instantiation those blocks use, and
//! one per matched enum. Every block carries the routing key of the configured
//! output strategy.

pub mod render;
pub mod routing;

pub use render::{BlockHead, EnumValueLine, FieldLine};
pub use routing::RoutingKey;

use crate::config::{OutputStrategy, Settings};
use crate::directives::models::{StructDirectives, VariantDef, VariantKind};
use crate::directives::parser::plain_text;
use crate::error::AppResult;
use crate::fields::naming::Namer;
use crate::fields::visibility::is_field_included;
use crate::flatten::Flattener;
use crate::graph::DependencyGraph;
use crate::parser::models::ParsedUnit;
use crate::parser::type_expr::TypeExpr;
use crate::registry::models::{EnumDescriptor, Origin, StructDescriptor};
use crate::registry::{ExternalLoader, SourceModel};
use crate::type_mapping::{GoToGraphqlMapper, TypeMapper};
use indexmap::IndexMap;
use std::path::PathBuf;
use tracing::{debug, info, warn};

/// What a block declares.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BlockKind {
    /// `type`
    Type,
    /// `input`
    Input,
    /// `enum`
    Enum,
}

impl From<VariantKind> for BlockKind {
    fn from(kind: VariantKind) -> Self {
        match kind {
            VariantKind::Type => BlockKind::Type,
            VariantKind::Input => BlockKind::Input,
        }
    }
}

/// One rendered declaration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SchemaBlock {
    /// Declaration kind.
    pub kind: BlockKind,
    /// Output name.
    pub name: String,
    /// Source struct or enum identifier.
    pub source: String,
    /// Directory of the declaring package.
    pub package_dir: PathBuf,
    /// Namespace, if any.
    pub namespace: Option<String>,
    /// Rendered SDL.
    pub text: String,
    /// Destination group.
    pub routing: RoutingKey,
}

/// Runs the whole pipeline over parsed units: scan, external loading, enum
/// matching, graph propagation and emission.
pub fn generate_schema(
    units: Vec<ParsedUnit>,
    loader: &dyn ExternalLoader,
    settings: &Settings,
) -> AppResult<Vec<SchemaBlock>> {
    let filters = settings.auto_generate.filters()?;

    let mut model = SourceModel::new(settings);
    for unit in units {
        model.scan(unit);
    }
    model.resolve_external_references(loader);
    model.match_enums();

    let mut graph = DependencyGraph::build(&model, settings);
    graph.propagate(
        settings.auto_generate.strategy,
        settings.auto_generate.max_depth,
        &filters,
    );

    let blocks = SchemaGenerator::new(&model, &graph, settings).generate();
    info!(blocks = blocks.len(), "schema generated");
    Ok(blocks)
}

/// Joins blocks into one document, blank-line separated.
pub fn render_document(blocks: &[SchemaBlock]) -> String {
    blocks
        .iter()
        .map(|b| b.text.as_str())
        .collect::<Vec<_>>()
        .join("\n")
}

/// An instantiation waiting to be emitted.
#[derive(Debug, Clone)]
struct PendingInstantiation {
    ty: TypeExpr,
    kind: VariantKind,
    namespace: Option<String>,
}

/// The variant a field list is resolved for.
#[derive(Debug, Clone, Copy)]
struct VariantScope<'s> {
    directives: &'s StructDirectives,
    ignore_all: bool,
    kind: VariantKind,
    name: &'s str,
    namespace: Option<&'s str>,
}

/// Read-only emitter over a scanned model and a propagated graph.
#[derive(Debug, Clone, Copy)]
pub struct SchemaGenerator<'a> {
    model: &'a SourceModel,
    graph: &'a DependencyGraph,
    settings: &'a Settings,
}

impl<'a> SchemaGenerator<'a> {
    /// A generator over `model` and `graph`.
    pub fn new(
        model: &'a SourceModel,
        graph: &'a DependencyGraph,
        settings: &'a Settings,
    ) -> Self {
        Self {
            model,
            graph,
            settings,
        }
    }

    fn namer(&self) -> Namer<'a> {
        Namer::new(self.settings)
    }

    fn mapper(&self) -> GoToGraphqlMapper<'a> {
        GoToGraphqlMapper::new(self.model, self.namer())
    }

    /// Every block, in order: struct variants (types then inputs per struct),
    /// generic instantiations, enums.
    pub fn generate(&self) -> Vec<SchemaBlock> {
        let mut blocks = Vec::new();
        let mut pending: IndexMap<String, PendingInstantiation> = IndexMap::new();

        for descriptor in self.model.structs() {
            let directives = descriptor.directives();
            if directives.skip {
                continue;
            }
            for kind in [VariantKind::Type, VariantKind::Input] {
                if !self.graph.should_generate(&descriptor.name, kind) {
                    continue;
                }
                if descriptor.is_generic() {
                    debug!(
                        name = %descriptor.name,
                        "generic struct emitted with unbound parameters"
                    );
                }
                let declared = directives.variants(kind);
                let defaults = [VariantDef::default()];
                let variants = if declared.is_empty() {
                    &defaults[..]
                } else {
                    declared
                };
                for variant in variants {
                    blocks.push(self.struct_block(
                        descriptor,
                        &directives,
                        variant,
                        kind,
                        &mut pending,
                    ));
                }
            }
        }

        let mut emitted = 0;
        while emitted < pending.len() {
            let Some((name, item)) = pending
                .get_index(emitted)
                .map(|(n, p)| (n.clone(), p.clone()))
            else {
                break;
            };
            emitted += 1;
            if let Some(block) = self.instantiation_block(&name, &item, &mut pending) {
                blocks.push(block);
            }
        }

        for enumeration in self.model.enums() {
            if enumeration.values.is_empty() {
                warn!(name = %enumeration.ident, "enum has no matching constants, skipped");
                continue;
            }
            blocks.push(self.enum_block(enumeration));
        }

        if self.settings.output.strategy == OutputStrategy::PerPackage {
            let stems = routing::package_stems(blocks.iter().map(|b| b.package_dir.as_path()));
            for block in &mut blocks {
                if let Some(stem) = stems.get(&block.package_dir) {
                    block.routing = RoutingKey::Package(stem.clone());
                }
            }
        }

        blocks
    }

    fn struct_block(
        &self,
        descriptor: &StructDescriptor,
        directives: &StructDirectives,
        variant: &VariantDef,
        kind: VariantKind,
        pending: &mut IndexMap<String, PendingInstantiation>,
    ) -> SchemaBlock {
        let name = match (&variant.name, kind) {
            (Some(name), _) => name.clone(),
            (None, VariantKind::Type) => self.namer().type_name(&descriptor.name),
            (None, VariantKind::Input) => self.namer().input_name(&descriptor.name),
        };
        let description = variant.description.clone().or_else(|| {
            self.settings
                .comment_descriptions
                .then(|| directives.doc.clone())
                .flatten()
        });
        let namespace = variant
            .namespace
            .clone()
            .or_else(|| self.model.namespace_for(descriptor));
        let go_model = (self.settings.gqlgen_directives || directives.use_model_directive)
            .then(|| self.model_path(&descriptor.origin, &descriptor.name));

        let scope = VariantScope {
            directives,
            ignore_all: directives.ignore_all || variant.ignore_all,
            kind,
            name: &name,
            namespace: namespace.as_deref(),
        };
        let fields = self.field_lines(descriptor, &[], &scope, pending);
        let text = render::render_object(
            &BlockHead {
                keyword: kind.keyword(),
                name: &name,
                description: description.as_deref(),
                go_model: go_model.as_deref(),
            },
            &fields,
        );
        self.block(
            kind.into(),
            name,
            &descriptor.name,
            &descriptor.origin,
            namespace,
            text,
        )
    }

    fn instantiation_block(
        &self,
        name: &str,
        item: &PendingInstantiation,
        pending: &mut IndexMap<String, PendingInstantiation>,
    ) -> Option<SchemaBlock> {
        let descriptor = item
            .ty
            .base_name()
            .and_then(|n| self.model.get_struct(n))?;
        let directives = descriptor.directives();
        if directives.skip {
            return None;
        }
        let scope = VariantScope {
            directives: &directives,
            ignore_all: directives.ignore_all,
            kind: item.kind,
            name,
            namespace: item.namespace.as_deref(),
        };
        let fields = self.field_lines(descriptor, item.ty.type_args(), &scope, pending);
        let text = render::render_object(
            &BlockHead {
                keyword: item.kind.keyword(),
                name,
                description: None,
                go_model: None,
            },
            &fields,
        );
        Some(self.block(
            item.kind.into(),
            name.to_string(),
            &descriptor.name,
            &descriptor.origin,
            item.namespace.clone(),
            text,
        ))
    }

    fn field_lines(
        &self,
        descriptor: &StructDescriptor,
        args: &[TypeExpr],
        scope: &VariantScope<'_>,
        pending: &mut IndexMap<String, PendingInstantiation>,
    ) -> Vec<FieldLine> {
        let mapper = self.mapper();
        let kind = scope.kind;
        let flattened =
            Flattener::new(self.model, self.settings).flatten_with_args(descriptor, args);
        let mut lines = Vec::new();

        for field in flattened.fields {
            if !is_field_included(&field.options, scope.ignore_all, kind, scope.name) {
                continue;
            }
            let ty = match &field.options.type_override {
                Some(custom) => custom.clone(),
                None => {
                    for instantiation in mapper.instantiations(&field.ty) {
                        let name = mapper.instantiation_name(&instantiation, kind);
                        pending.entry(name).or_insert_with(|| PendingInstantiation {
                            ty: instantiation,
                            kind,
                            namespace: scope.namespace.map(str::to_string),
                        });
                    }
                    let mut reference = mapper.map(&field.ty, kind);
                    if let Some(required) = field.options.required {
                        reference = reference.with_non_null(required);
                    }
                    reference.to_string()
                }
            };
            let description = field.options.description.clone().or_else(|| {
                self.settings
                    .comment_descriptions
                    .then(|| plain_text(&field.comment))
                    .flatten()
            });
            lines.push(FieldLine {
                name: field.name,
                ty,
                description,
                deprecated: field.options.deprecated.clone(),
                force_resolver: field.options.force_resolver && kind == VariantKind::Type,
            });
        }

        for extra in &scope.directives.extra_fields {
            if extra.scope.covers(kind) && extra.on.matches(scope.name) {
                lines.push(FieldLine {
                    name: extra.name.clone(),
                    ty: extra.ty.clone(),
                    description: extra.description.clone(),
                    ..FieldLine::default()
                });
            }
        }

        lines
    }

    fn enum_block(&self, enumeration: &EnumDescriptor) -> SchemaBlock {
        let annotate = self.settings.gqlgen_directives;
        let go_model =
            annotate.then(|| self.model_path(&enumeration.origin, &enumeration.ident));
        let values: Vec<EnumValueLine> = enumeration
            .values
            .iter()
            .map(|value| EnumValueLine {
                name: value.name.clone(),
                description: value.description.clone(),
                go_enum: annotate.then(|| self.model_path(&value.origin, &value.ident)),
                deprecated: value.deprecated.clone(),
            })
            .collect();
        let text = render::render_enum(
            &BlockHead {
                keyword: "enum",
                name: &enumeration.name,
                description: enumeration.description.as_deref(),
                go_model: go_model.as_deref(),
            },
            &values,
        );
        let namespace = self.model.package_namespace(&enumeration.origin);
        self.block(
            BlockKind::Enum,
            enumeration.name.clone(),
            &enumeration.ident,
            &enumeration.origin,
            namespace,
            text,
        )
    }

    /// `path.Ident` for gqlgen annotations. External declarations always use
    /// their real import path; scanned ones prefer the configured override.
    fn model_path(&self, origin: &Origin, ident: &str) -> String {
        let package = if origin.external {
            origin
                .import_path
                .clone()
                .unwrap_or_else(|| origin.package.clone())
        } else {
            self.settings
                .model_path
                .clone()
                .or_else(|| origin.import_path.clone())
                .unwrap_or_else(|| origin.package.clone())
        };
        format!("{}.{}", package, ident)
    }

    fn block(
        &self,
        kind: BlockKind,
        name: String,
        source: &str,
        origin: &Origin,
        namespace: Option<String>,
        text: String,
    ) -> SchemaBlock {
        let package_dir = origin.directory();
        let routing = RoutingKey::for_block(
            self.settings.output.strategy,
            source,
            &package_dir,
            namespace.as_deref(),
        );
        SchemaBlock {
            kind,
            name,
            source: source.to_string(),
            package_dir,
            namespace,
            text,
            routing,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::parse_go_source;
    use crate::registry::NoExternalLoader;
    use pretty_assertions::assert_eq;

    fn generate(code: &str, settings: &Settings) -> Vec<SchemaBlock> {
        let unit = parse_go_source("app/models/models.go", code).unwrap();
        generate_schema(vec![unit], &NoExternalLoader, settings).unwrap()
    }

    #[test]
    fn test_type_and_input_blocks() {
        let blocks = generate(
            r#"package models

// User is a member.
// @gqlType
// @gqlInput(name:"UserInput")
type User struct {
	ID        string  `json:"id" gql:"id,ro"`
	Email     *string `json:"email"`
	Password  string  `json:"-"`
	Nickname  string  `gql:"nick,description:'Public name'"`
	Score     int     `gql:",optional,deprecated:'use rank'"`
	Avatar    string  `gql:"avatar,type:Upload,wo"`
}
"#,
            &Settings::default(),
        );
        assert_eq!(blocks.len(), 2);
        assert_eq!(
            blocks[0].text,
            "type User {\n\
             \x20 id: String!\n\
             \x20 email: String\n\
             \x20 \"Public name\"\n\
             \x20 nick: String!\n\
             \x20 score: Int @deprecated(reason: \"use rank\")\n\
             }\n"
        );
        assert_eq!(
            blocks[1].text,
            "input UserInput {\n\
             \x20 email: String\n\
             \x20 \"Public name\"\n\
             \x20 nick: String!\n\
             \x20 score: Int @deprecated(reason: \"use rank\")\n\
             \x20 avatar: Upload\n\
             }\n"
        );
        assert_eq!(blocks[0].kind, BlockKind::Type);
        assert_eq!(blocks[1].routing, RoutingKey::Single);
    }

    #[test]
    fn test_extra_fields_and_ignore_all() {
        let blocks = generate(
            r#"package models

// @gqlType(name:"Public", ignoreAll)
// @gqlType(name:"Full")
// @gqlTypeExtraField(name:"fullName", type:"String!", on:"Full", description:"Joined")
// @gqlExtraField(name:"version", type:"Int!")
type Person struct {
	First string `gql:"first,include:Public"`
	Last  string
}
"#,
            &Settings::default(),
        );
        assert_eq!(
            blocks[0].text,
            "type Public {\n  first: String!\n  version: Int!\n}\n"
        );
        assert_eq!(
            blocks[1].text,
            "type Full {\n  last: String!\n  \"Joined\"\n  fullName: String!\n  version: Int!\n}\n"
        );
    }

    #[test]
    fn test_instantiation_and_enum_blocks_with_annotations() {
        let settings = Settings {
            gqlgen_directives: true,
            ..Settings::default()
        };
        let blocks = generate(
            r#"package models

// @gqlEnum
type Status string

const (
	StatusOpen   Status = "open"
	StatusClosed Status = "closed"
)

type Page[T any] struct {
	Items []T
	Total int
}

type Ticket struct {
	Title string
}

// @gqlType
type Board struct {
	Tickets Page[*Ticket]
	State   Status `gql:"state,forceResolver"`
}
"#,
            &settings,
        );
        let names: Vec<_> = blocks.iter().map(|b| (b.kind, b.name.as_str())).collect();
        assert_eq!(
            names,
            vec![
                (BlockKind::Type, "Board"),
                (BlockKind::Type, "PageTicket"),
                (BlockKind::Enum, "Status"),
            ]
        );
        assert_eq!(
            blocks[0].text,
            "type Board @goModel(model: \"models.Board\") {\n\
             \x20 tickets: PageTicket!\n\
             \x20 state: Status! @goField(forceResolver: true)\n\
             }\n"
        );
        assert_eq!(
            blocks[1].text,
            "type PageTicket {\n  items: [Ticket!]!\n  total: Int!\n}\n"
        );
        assert_eq!(
            blocks[2].text,
            "enum Status @goModel(model: \"models.Status\") {\n\
             \x20 OPEN @goEnum(value: \"models.StatusOpen\")\n\
             \x20 CLOSED @goEnum(value: \"models.StatusClosed\")\n\
             }\n"
        );
    }

    #[test]
    fn test_model_path_override_and_namespace_routing() {
        let settings = Settings {
            model_path: Some("example.com/app/models".into()),
            output: crate::config::OutputSettings {
                strategy: crate::config::OutputStrategy::PerNamespace,
                ..Default::default()
            },
            ..Settings::default()
        };
        let blocks = generate(
            r#"// @gqlNamespace("app.core")
package models

// @gqlType
// @gqlUseModelDirective
type Account struct {
	ID string
}

// @gqlType(namespace:"app.admin")
type Audit struct {
	Note string
}
"#,
            &settings,
        );
        assert!(blocks[0]
            .text
            .starts_with("type Account @goModel(model: \"example.com/app/models.Account\") {"));
        assert_eq!(
            blocks[0].routing,
            RoutingKey::Namespace(Some("app.core".into()))
        );
        assert_eq!(
            blocks[1].routing,
            RoutingKey::Namespace(Some("app.admin".into()))
        );
        assert!(!blocks[1].text.contains("@goModel"));
    }

    #[test]
    fn test_per_package_routing_separates_same_named_packages() {
        let settings = Settings {
            output: crate::config::OutputSettings {
                strategy: OutputStrategy::PerPackage,
                ..Default::default()
            },
            ..Settings::default()
        };
        let units = vec![
            parse_go_source(
                "billing/models/invoice.go",
                "package models\n\n// @gqlType\ntype Invoice struct{ Total int }\n",
            )
            .unwrap(),
            parse_go_source(
                "users/models/user.go",
                "package models\n\n// @gqlType\ntype User struct{ Name string }\n",
            )
            .unwrap(),
        ];
        let blocks = generate_schema(units, &NoExternalLoader, &settings).unwrap();
        let destinations: Vec<_> = blocks
            .iter()
            .map(|b| b.routing.destination(&settings.output))
            .collect();
        assert_eq!(
            destinations,
            vec![
                PathBuf::from("graph/schema/billing_models.graphqls"),
                PathBuf::from("graph/schema/users_models.graphqls"),
            ]
        );
    }

    #[test]
    fn test_render_document_joins_blocks() {
        let blocks = generate(
            "package models\n\n// @gqlType\ntype A struct{ X int }\n\n// @gqlType\ntype B struct{ Y int }\n",
            &Settings::default(),
        );
        assert_eq!(
            render_document(&blocks),
            "type A {\n  x: Int!\n}\n\ntype B {\n  y: Int!\n}\n"
        );
    }
}
