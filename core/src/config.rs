#![deny(missing_docs)]

//! # Settings
//!
//! The generator's configuration, read from YAML. Every key is optional;
//! unknown keys and unknown enum names are rejected before any scanning starts.

use crate::error::{AppError, AppResult};
use glob::Pattern;
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};

/// How struct field identifiers become schema field names.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FieldCase {
    /// `UserName` -> `userName`, short acronyms fully lowered.
    #[default]
    Camel,
    /// `UserName` -> `user_name`
    Snake,
    /// Identifier kept as written.
    Pascal,
    /// Identifier kept as written.
    Original,
    /// Identifier kept as written.
    None,
}

/// How non-annotated structs become eligible for generation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AutoGenerateStrategy {
    /// Only annotated structs.
    #[default]
    None,
    /// Every struct not excluded.
    All,
    /// Structs referenced from annotated ones, breadth first.
    Reachable,
    /// Structs matching the include globs.
    Patterns,
}

/// Auto-generation settings.
#[derive(Debug, Clone, PartialEq, Eq, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct AutoGenerate {
    /// Propagation strategy.
    pub strategy: AutoGenerateStrategy,
    /// Maximum distance from an annotated struct; `0` means unlimited.
    pub max_depth: usize,
    /// Globs a struct must match (patterns strategy).
    pub include: Vec<String>,
    /// Globs that keep a struct out.
    pub exclude: Vec<String>,
}

/// Compiled include/exclude globs.
#[derive(Debug, Clone, Default)]
pub struct NameFilters {
    /// Include patterns.
    pub include: Vec<Pattern>,
    /// Exclude patterns.
    pub exclude: Vec<Pattern>,
}

impl NameFilters {
    /// Whether any candidate string matches an include pattern.
    pub fn included<'a>(&self, candidates: impl IntoIterator<Item = &'a str> + Clone) -> bool {
        self.include
            .iter()
            .any(|p| candidates.clone().into_iter().any(|c| p.matches(c)))
    }

    /// Whether any candidate string matches an exclude pattern.
    pub fn excluded<'a>(&self, candidates: impl IntoIterator<Item = &'a str> + Clone) -> bool {
        self.exclude
            .iter()
            .any(|p| candidates.clone().into_iter().any(|c| p.matches(c)))
    }
}

impl AutoGenerate {
    /// Compiles the glob lists.
    pub fn filters(&self) -> AppResult<NameFilters> {
        Ok(NameFilters {
            include: compile(&self.include)?,
            exclude: compile(&self.exclude)?,
        })
    }
}

fn compile(patterns: &[String]) -> AppResult<Vec<Pattern>> {
    patterns
        .iter()
        .map(|p| {
            Pattern::new(p)
                .map_err(|e| AppError::Config(format!("invalid glob pattern '{}': {}", p, e)))
        })
        .collect()
}

/// Routing of rendered blocks to destinations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OutputStrategy {
    /// Everything in one file.
    #[default]
    Single,
    /// One file per struct or enum.
    PerType,
    /// One file per package directory.
    PerPackage,
    /// One file per namespace.
    PerNamespace,
}

/// Output settings.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct OutputSettings {
    /// Routing strategy.
    pub strategy: OutputStrategy,
    /// Destination for the single strategy.
    pub file: PathBuf,
    /// Root directory for the per-* strategies.
    pub dir: PathBuf,
    /// File extension for the per-* strategies.
    pub extension: String,
    /// Replaces `.` when a namespace becomes a path.
    pub namespace_separator: String,
}

impl Default for OutputSettings {
    fn default() -> Self {
        Self {
            strategy: OutputStrategy::Single,
            file: PathBuf::from("schema.graphqls"),
            dir: PathBuf::from("graph/schema"),
            extension: "graphqls".to_string(),
            namespace_separator: "/".to_string(),
        }
    }
}

/// Generator settings.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Settings {
    /// Scan roots.
    pub packages: Vec<PathBuf>,
    /// Field name case style.
    pub field_case: FieldCase,
    /// Fall back to the `json` tag for names and `-` exclusion.
    pub use_json_tag: bool,
    /// Emit `@goModel` / `@goEnum` / `@goField` annotations.
    pub gqlgen_directives: bool,
    /// Package path reported for scanned (non-external) types.
    pub model_path: Option<String>,
    /// Prefixes removed from struct names before naming outputs.
    pub strip_prefix: Vec<String>,
    /// Suffixes removed from struct names before naming outputs.
    pub strip_suffix: Vec<String>,
    /// Prefix added to derived type names.
    pub type_prefix: String,
    /// Suffix added to derived type names.
    pub type_suffix: String,
    /// Prefix added to derived input names.
    pub input_prefix: String,
    /// Suffix added to derived input names.
    pub input_suffix: String,
    /// Auto-generation of non-annotated structs.
    pub auto_generate: AutoGenerate,
    /// Scalar used when a type parameter has no binding.
    pub generic_fallback_scalar: String,
    /// Silence the unresolved type parameter warning.
    pub suppress_generic_warnings: bool,
    /// Use plain comment text as description when none is given explicitly.
    pub comment_descriptions: bool,
    /// Output routing.
    pub output: OutputSettings,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            packages: vec![PathBuf::from(".")],
            field_case: FieldCase::Camel,
            use_json_tag: true,
            gqlgen_directives: false,
            model_path: None,
            strip_prefix: Vec::new(),
            strip_suffix: Vec::new(),
            type_prefix: String::new(),
            type_suffix: String::new(),
            input_prefix: String::new(),
            input_suffix: "Input".to_string(),
            auto_generate: AutoGenerate::default(),
            generic_fallback_scalar: "JSON".to_string(),
            suppress_generic_warnings: false,
            comment_descriptions: false,
            output: OutputSettings::default(),
        }
    }
}

impl Settings {
    /// Parses and validates settings from YAML text.
    pub fn from_yaml(yaml: &str) -> AppResult<Self> {
        let settings: Settings = if yaml.trim().is_empty() {
            Settings::default()
        } else {
            serde_yaml::from_str(yaml)?
        };
        settings.validate()?;
        Ok(settings)
    }

    /// Reads, parses and validates a settings file.
    pub fn load(path: &Path) -> AppResult<Self> {
        let yaml = fs::read_to_string(path).map_err(|e| {
            AppError::Config(format!("cannot read settings '{}': {}", path.display(), e))
        })?;
        Self::from_yaml(&yaml)
    }

    /// Checks values serde cannot check.
    pub fn validate(&self) -> AppResult<()> {
        if self.generic_fallback_scalar.trim().is_empty() {
            return Err(AppError::Config(
                "generic_fallback_scalar must not be empty".to_string(),
            ));
        }
        if self.output.extension.trim().is_empty() {
            return Err(AppError::Config(
                "output.extension must not be empty".to_string(),
            ));
        }
        self.auto_generate.filters()?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_yaml_is_default() {
        let settings = Settings::from_yaml("").unwrap();
        assert_eq!(settings, Settings::default());
        assert_eq!(settings.input_suffix, "Input");
    }

    #[test]
    fn test_parse_full_settings() {
        let yaml = r#"
field_case: snake
use_json_tag: false
gqlgen_directives: true
strip_suffix: [Model, DTO]
auto_generate:
  strategy: reachable
  max_depth: 2
  exclude: ["internal.*"]
output:
  strategy: per_namespace
  namespace_separator: "_"
"#;
        let settings = Settings::from_yaml(yaml).unwrap();
        assert_eq!(settings.field_case, FieldCase::Snake);
        assert!(!settings.use_json_tag);
        assert_eq!(settings.strip_suffix, vec!["Model", "DTO"]);
        assert_eq!(
            settings.auto_generate.strategy,
            AutoGenerateStrategy::Reachable
        );
        assert_eq!(settings.auto_generate.max_depth, 2);
        assert_eq!(settings.output.strategy, OutputStrategy::PerNamespace);
        assert_eq!(settings.output.extension, "graphqls");
    }

    #[test]
    fn test_unknown_case_style_is_fatal() {
        let err = Settings::from_yaml("field_case: kebab").unwrap_err();
        assert!(matches!(err, AppError::Yaml(_)));
    }

    #[test]
    fn test_unknown_strategy_is_fatal() {
        let err = Settings::from_yaml("auto_generate:\n  strategy: everything\n").unwrap_err();
        assert!(err.to_string().starts_with("Config Error"));
    }

    #[test]
    fn test_invalid_glob_is_fatal() {
        let err = Settings::from_yaml("auto_generate:\n  include: [\"[oops\"]\n").unwrap_err();
        assert!(matches!(err, AppError::Config(_)));
    }

    #[test]
    fn test_filters_match() {
        let auto = AutoGenerate {
            include: vec!["models.*".into()],
            exclude: vec!["*Internal".into()],
            ..AutoGenerate::default()
        };
        let filters = auto.filters().unwrap();
        assert!(filters.included(["models.User"]));
        assert!(!filters.included(["api.User"]));
        assert!(filters.excluded(["models.UserInternal"]));
    }
}
