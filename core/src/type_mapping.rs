#![deny(missing_docs)]

//! # Type Mapping
//!
//! Converts Go type expressions into GraphQL type references.
//! Handles scalars, lists, nullability (pointers), enums, struct references
//! and generic instantiations.

use crate::directives::models::VariantKind;
use crate::fields::naming::Namer;
use crate::parser::type_expr::TypeExpr;
use crate::registry::models::StructDescriptor;
use crate::registry::SourceModel;
use std::fmt::{self, Display};

/// The named or list part of a GraphQL type reference.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GqlType {
    /// A scalar, enum, object or input name.
    Named(String),
    /// A list of another reference.
    List(Box<GqlRef>),
}

/// A GraphQL type reference with its non-null marker.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GqlRef {
    /// Referenced type.
    pub ty: GqlType,
    /// Whether the reference carries `!`.
    pub non_null: bool,
}

impl GqlRef {
    /// A non-null named reference.
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            ty: GqlType::Named(name.into()),
            non_null: true,
        }
    }

    /// Same reference with `non_null` replaced.
    pub fn with_non_null(mut self, non_null: bool) -> Self {
        self.non_null = non_null;
        self
    }
}

impl Display for GqlRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.ty {
            GqlType::Named(name) => write!(f, "{}", name)?,
            GqlType::List(inner) => write!(f, "[{}]", inner)?,
        }
        if self.non_null {
            write!(f, "!")?;
        }
        Ok(())
    }
}

/// Trait for converting Go type expressions to GraphQL references.
pub trait TypeMapper {
    /// Maps `ty` as seen from a variant of `kind`.
    fn map(&self, ty: &TypeExpr, kind: VariantKind) -> GqlRef;
}

/// Maps against the structs and enums of a `SourceModel`.
#[derive(Debug, Clone, Copy)]
pub struct GoToGraphqlMapper<'a> {
    model: &'a SourceModel,
    namer: Namer<'a>,
}

impl<'a> GoToGraphqlMapper<'a> {
    /// A mapper over `model`, naming structs with `namer`.
    pub fn new(model: &'a SourceModel, namer: Namer<'a>) -> Self {
        Self { model, namer }
    }

    /// Output name of a named type in `kind` context.
    fn named_type(&self, ty: &TypeExpr, kind: VariantKind) -> String {
        let TypeExpr::Named {
            package,
            name,
            args,
        } = ty
        else {
            return "JSON".to_string();
        };
        if let Some(scalar) = scalar_name(package.as_deref(), name) {
            return scalar.to_string();
        }
        if let Some(descriptor) = self.model.get_struct(name) {
            if !args.is_empty() {
                return self.instantiation_name(ty, kind);
            }
            return struct_output_name(&self.namer, descriptor, kind);
        }
        if let Some(enumeration) = self.model.get_enum(name) {
            return enumeration.name.clone();
        }
        name.clone()
    }

    /// Output name of a generic instantiation: the stems of the base and of
    /// each argument concatenated (`Page[*Item]` -> `PageItem`), then given
    /// the context's affixes.
    pub fn instantiation_name(&self, ty: &TypeExpr, kind: VariantKind) -> String {
        let stem = self.stem(ty);
        match kind {
            VariantKind::Type => self.namer.type_name(&stem),
            VariantKind::Input => self.namer.input_name(&stem),
        }
    }

    fn stem(&self, ty: &TypeExpr) -> String {
        match ty {
            TypeExpr::Pointer(inner) => self.stem(inner),
            TypeExpr::Slice(inner) => format!("{}List", self.stem(inner)),
            TypeExpr::Map(..) | TypeExpr::Opaque(_) => "JSON".to_string(),
            TypeExpr::Named {
                package,
                name,
                args,
            } => {
                if let Some(scalar) = scalar_name(package.as_deref(), name) {
                    return scalar.to_string();
                }
                let base = match self.model.get_enum(name) {
                    Some(enumeration) => enumeration.name.clone(),
                    None => name.clone(),
                };
                args.iter().fold(base, |mut acc, arg| {
                    acc.push_str(&self.stem(arg));
                    acc
                })
            }
        }
    }

    /// Generic instantiations of known structs mentioned anywhere in `ty`.
    pub fn instantiations(&self, ty: &TypeExpr) -> Vec<TypeExpr> {
        ty.named_refs()
            .into_iter()
            .filter(|r| {
                r.is_instantiation()
                    && r.base_name()
                        .and_then(|n| self.model.get_struct(n))
                        .is_some_and(StructDescriptor::is_generic)
            })
            .cloned()
            .collect()
    }
}

impl TypeMapper for GoToGraphqlMapper<'_> {
    fn map(&self, ty: &TypeExpr, kind: VariantKind) -> GqlRef {
        match ty {
            TypeExpr::Pointer(inner) => self
                .map(inner.strip_pointers(), kind)
                .with_non_null(false),
            TypeExpr::Slice(inner) if is_byte(inner) => GqlRef::named("String"),
            TypeExpr::Slice(inner) => GqlRef {
                ty: GqlType::List(Box::new(self.map(inner, kind))),
                non_null: true,
            },
            TypeExpr::Map(..) | TypeExpr::Opaque(_) => GqlRef::named("JSON"),
            TypeExpr::Named { .. } => GqlRef::named(self.named_type(ty, kind)),
        }
    }
}

/// Name a struct is referenced by in `kind` context: its first declared
/// variant's explicit name, else the derived default.
pub fn struct_output_name(
    namer: &Namer<'_>,
    descriptor: &StructDescriptor,
    kind: VariantKind,
) -> String {
    let directives = descriptor.directives();
    if let Some(name) = directives
        .variants(kind)
        .first()
        .and_then(|v| v.name.clone())
    {
        return name;
    }
    match kind {
        VariantKind::Type => namer.type_name(&descriptor.name),
        VariantKind::Input => namer.input_name(&descriptor.name),
    }
}

/// Built-in scalar for a Go named type.
pub fn scalar_name(package: Option<&str>, name: &str) -> Option<&'static str> {
    match (package, name) {
        (None, "string") => Some("String"),
        (None, "bool") => Some("Boolean"),
        (
            None,
            "int" | "int8" | "int16" | "int32" | "int64" | "uint" | "uint8" | "uint16" | "uint32"
            | "uint64" | "uintptr" | "byte" | "rune",
        ) => Some("Int"),
        (None, "float32" | "float64") => Some("Float"),
        (None, "any") => Some("JSON"),
        (Some("time"), "Time") => Some("Time"),
        (Some("json"), "RawMessage") => Some("JSON"),
        _ => None,
    }
}

fn is_byte(ty: &TypeExpr) -> bool {
    match ty {
        TypeExpr::Named {
            package: None,
            name,
            args,
        } => args.is_empty() && (name == "byte" || name == "uint8"),
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Settings;
    use crate::parser::models::{ConstExpr, ParsedConst, ParsedField, ParsedTypeDecl, ParsedUnit};

    fn model() -> SourceModel {
        let mut m = SourceModel::new(&Settings::default());
        m.scan(
            ParsedUnit::new("models", "models/models.go")
                .with_type(
                    ParsedTypeDecl::structure("User", vec![])
                        .with_comment("// @gqlType(name:\"Account\")\n// @gqlInput"),
                )
                .with_type(ParsedTypeDecl::structure("Item", vec![]))
                .with_type(
                    ParsedTypeDecl::structure(
                        "Page",
                        vec![ParsedField::named("Items", "[]T".parse().unwrap())],
                    )
                    .with_type_params(["T"]),
                )
                .with_type(
                    ParsedTypeDecl::named("Role", TypeExpr::named("string"))
                        .with_comment("// @gqlEnum(name:\"UserRole\")"),
                )
                .with_consts(vec![ParsedConst::typed(
                    "RoleAdmin",
                    TypeExpr::named("Role"),
                    ConstExpr::Str("admin".into()),
                )]),
        );
        m.match_enums();
        m
    }

    fn render(m: &SourceModel, ty: &str, kind: VariantKind) -> String {
        let settings = Settings::default();
        let mapper = GoToGraphqlMapper::new(m, Namer::new(&settings));
        mapper.map(&ty.parse().unwrap(), kind).to_string()
    }

    #[test]
    fn test_scalars_and_nullability() {
        let m = model();
        assert_eq!(render(&m, "string", VariantKind::Type), "String!");
        assert_eq!(render(&m, "*int64", VariantKind::Type), "Int");
        assert_eq!(render(&m, "float32", VariantKind::Type), "Float!");
        assert_eq!(render(&m, "*time.Time", VariantKind::Type), "Time");
        assert_eq!(render(&m, "map[string]any", VariantKind::Type), "JSON!");
        assert_eq!(render(&m, "interface{}", VariantKind::Type), "JSON!");
        assert_eq!(render(&m, "json.RawMessage", VariantKind::Type), "JSON!");
        assert_eq!(render(&m, "[]byte", VariantKind::Type), "String!");
    }

    #[test]
    fn test_lists() {
        let m = model();
        assert_eq!(render(&m, "[]string", VariantKind::Type), "[String!]!");
        assert_eq!(render(&m, "[]*string", VariantKind::Type), "[String]!");
        assert_eq!(render(&m, "*[]string", VariantKind::Type), "[String!]");
        assert_eq!(render(&m, "[][]int", VariantKind::Type), "[[Int!]!]!");
    }

    #[test]
    fn test_structs_enums_and_instantiations_per_context() {
        let m = model();
        assert_eq!(render(&m, "*User", VariantKind::Type), "Account");
        assert_eq!(render(&m, "User", VariantKind::Input), "UserInput!");
        assert_eq!(render(&m, "[]Item", VariantKind::Input), "[ItemInput!]!");
        assert_eq!(render(&m, "Role", VariantKind::Input), "UserRole!");
        assert_eq!(render(&m, "Page[*Item]", VariantKind::Type), "PageItem!");
        assert_eq!(render(&m, "Page[Role]", VariantKind::Input), "PageUserRoleInput!");
        assert_eq!(render(&m, "other.Thing", VariantKind::Type), "Thing!");
    }

    #[test]
    fn test_instantiations_collected() {
        let m = model();
        let settings = Settings::default();
        let mapper = GoToGraphqlMapper::new(&m, Namer::new(&settings));
        let ty: TypeExpr = "map[string][]*Page[Item]".parse().unwrap();
        assert_eq!(
            mapper.instantiations(&ty),
            vec!["Page[Item]".parse::<TypeExpr>().unwrap()]
        );
        assert!(mapper.instantiations(&"[]Item".parse().unwrap()).is_empty());
    }
}
