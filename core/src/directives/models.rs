//! # Directive Models
//!
//! Structured forms of the `@gql...` comment directives.

/// Which variants a list-valued setting applies to.
///
/// `Unrestricted` comes from an empty list (`[]`, `""`); `Wildcard` from an
/// explicit `*` or an omitted `on:`. Both match every variant.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum TargetList {
    /// Empty list form.
    Unrestricted,
    /// Explicit or defaulted wildcard.
    #[default]
    Wildcard,
    /// Literal variant names.
    Names(Vec<String>),
}

impl TargetList {
    /// Whether the list covers `variant`.
    pub fn matches(&self, variant: &str) -> bool {
        match self {
            TargetList::Unrestricted | TargetList::Wildcard => true,
            TargetList::Names(names) => names.iter().any(|n| n == variant),
        }
    }
}

/// The directive kinds recognised after the `@gql` prefix.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DirectiveKind {
    /// `@gqlType`
    Type,
    /// `@gqlInput`
    Input,
    /// `@gqlIgnoreAll`
    IgnoreAll,
    /// `@gqlExtraField`
    ExtraField,
    /// `@gqlTypeExtraField`
    TypeExtraField,
    /// `@gqlInputExtraField`
    InputExtraField,
    /// `@gqlSkip`
    Skip,
    /// `@gqlNamespace`
    Namespace,
    /// `@gqlUseModelDirective`
    UseModelDirective,
    /// `@gqlEnum`
    Enum,
    /// `@gqlEnumValue`
    EnumValue,
}

impl DirectiveKind {
    /// Maps the identifier after the prefix to a kind.
    pub fn from_suffix(suffix: &str) -> Option<Self> {
        Some(match suffix {
            "Type" => DirectiveKind::Type,
            "Input" => DirectiveKind::Input,
            "IgnoreAll" => DirectiveKind::IgnoreAll,
            "ExtraField" => DirectiveKind::ExtraField,
            "TypeExtraField" => DirectiveKind::TypeExtraField,
            "InputExtraField" => DirectiveKind::InputExtraField,
            "Skip" => DirectiveKind::Skip,
            "Namespace" => DirectiveKind::Namespace,
            "UseModelDirective" => DirectiveKind::UseModelDirective,
            "Enum" => DirectiveKind::Enum,
            "EnumValue" => DirectiveKind::EnumValue,
            _ => return None,
        })
    }
}

/// Whether a variant is an object type or an input.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum VariantKind {
    /// `type X { ... }`
    Type,
    /// `input X { ... }`
    Input,
}

impl VariantKind {
    /// Schema keyword.
    pub fn keyword(self) -> &'static str {
        match self {
            VariantKind::Type => "type",
            VariantKind::Input => "input",
        }
    }

    /// Whether this is the input side.
    pub fn is_input(self) -> bool {
        matches!(self, VariantKind::Input)
    }
}

/// One `@gqlType(...)` or `@gqlInput(...)` declaration.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct VariantDef {
    /// Explicit output name.
    pub name: Option<String>,
    /// Explicit description.
    pub description: Option<String>,
    /// Drop every field not explicitly included.
    pub ignore_all: bool,
    /// Namespace override for this variant only.
    pub namespace: Option<String>,
}

/// Which side an extra field is injected into.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExtraFieldScope {
    /// `@gqlExtraField`
    Both,
    /// `@gqlTypeExtraField`
    Type,
    /// `@gqlInputExtraField`
    Input,
}

impl ExtraFieldScope {
    /// Whether fields with this scope go into `kind` variants.
    pub fn covers(self, kind: VariantKind) -> bool {
        match self {
            ExtraFieldScope::Both => true,
            ExtraFieldScope::Type => kind == VariantKind::Type,
            ExtraFieldScope::Input => kind == VariantKind::Input,
        }
    }
}

/// A synthetic field declared by directive.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExtraFieldDef {
    /// Field name.
    pub name: String,
    /// Schema type, verbatim.
    pub ty: String,
    /// Optional description.
    pub description: Option<String>,
    /// Target variants.
    pub on: TargetList,
    /// Type side, input side or both.
    pub scope: ExtraFieldScope,
}

/// Deprecation state of a field or enum value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Deprecation {
    /// Optional reason.
    pub reason: Option<String>,
}

/// `@gqlEnum(...)` on a named type.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct EnumDirective {
    /// Output enum name.
    pub name: Option<String>,
    /// Description.
    pub description: Option<String>,
}

/// `@gqlEnumValue(...)` on a constant.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct EnumValueDirective {
    /// Output value name.
    pub name: Option<String>,
    /// Description.
    pub description: Option<String>,
    /// Deprecation marker.
    pub deprecated: Option<Deprecation>,
}

/// Everything the directive parser finds in one declaration comment.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct StructDirectives {
    /// Type variants in declaration order.
    pub types: Vec<VariantDef>,
    /// Input variants in declaration order.
    pub inputs: Vec<VariantDef>,
    /// `@gqlIgnoreAll`
    pub ignore_all: bool,
    /// Extra fields in declaration order.
    pub extra_fields: Vec<ExtraFieldDef>,
    /// `@gqlSkip`
    pub skip: bool,
    /// `@gqlNamespace`
    pub namespace: Option<String>,
    /// `@gqlUseModelDirective`
    pub use_model_directive: bool,
    /// `@gqlEnum`
    pub enumeration: Option<EnumDirective>,
    /// Comment lines that are not directives, joined with spaces.
    pub doc: Option<String>,
}

impl StructDirectives {
    /// Whether the declaration asks for any output at all.
    pub fn is_annotated(&self) -> bool {
        !self.types.is_empty() || !self.inputs.is_empty()
    }

    /// Variants of `kind`.
    pub fn variants(&self, kind: VariantKind) -> &[VariantDef] {
        match kind {
            VariantKind::Type => &self.types,
            VariantKind::Input => &self.inputs,
        }
    }
}
