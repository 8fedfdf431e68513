#![deny(missing_docs)]

//! # Source Model
//!
//! The build context of one generation run. `scan` ingests parsed units into
//! append-only registries keyed by identifier (first seen wins);
//! `match_enums` pairs enum candidates with const blocks once every unit is
//! in; `resolve_external_references` pulls in packages the scanned structs
//! point at.

pub mod enums;
pub mod external;
pub mod models;

pub use enums::{match_enums, ConstBlockRecord};
pub use external::{ExternalLoader, MemoryLoader, NoExternalLoader};
pub use models::{
    is_enum_base, EmbedMode, EnumCandidate, EnumDescriptor, EnumLiteral, EnumValueDescriptor,
    FieldDescriptor, Origin, StructDescriptor,
};

use crate::config::Settings;
use crate::directives::parser::parse_struct_directives;
use crate::fields::options::FieldOptions;
use crate::parser::models::{ParsedTypeKind, ParsedUnit};
use indexmap::IndexMap;
use std::collections::{HashSet, VecDeque};
use tracing::{debug, warn};

/// Registries populated by scanning.
#[derive(Debug, Clone, Default)]
pub struct SourceModel {
    structs: IndexMap<String, StructDescriptor>,
    enum_candidates: IndexMap<String, EnumCandidate>,
    const_blocks: Vec<ConstBlockRecord>,
    generics: IndexMap<String, Vec<String>>,
    namespaces: IndexMap<String, String>,
    enums: IndexMap<String, EnumDescriptor>,
    loaded_packages: HashSet<String>,
    comment_descriptions: bool,
}

impl SourceModel {
    /// An empty model configured from `settings`.
    pub fn new(settings: &Settings) -> Self {
        Self {
            comment_descriptions: settings.comment_descriptions,
            ..Self::default()
        }
    }

    /// Ingests one unit from the scan roots.
    pub fn scan(&mut self, unit: ParsedUnit) {
        self.scan_unit(unit, false);
    }

    /// Ingests `unit`, returning the names of structs it added.
    fn scan_unit(&mut self, unit: ParsedUnit, external: bool) -> Vec<String> {
        let origin = Origin {
            package: unit.package.clone(),
            path: unit.path.clone(),
            import_path: unit.import_path.clone(),
            external,
        };
        if let Some(import_path) = &unit.import_path {
            self.loaded_packages.insert(import_path.clone());
        }

        let package_key = origin.package_key();
        if let Some(namespace) = parse_struct_directives(&unit.doc).namespace {
            match self.namespaces.get(&package_key) {
                Some(existing) if existing != &namespace => debug!(
                    package = %package_key,
                    kept = %existing,
                    ignored = %namespace,
                    "conflicting package namespace"
                ),
                Some(_) => {}
                None => {
                    self.namespaces.insert(package_key, namespace);
                }
            }
        }

        let mut added = Vec::new();
        for decl in unit.types {
            match decl.kind {
                ParsedTypeKind::Struct(fields) => {
                    if self.structs.contains_key(&decl.name) {
                        debug!(
                            name = %decl.name,
                            path = %unit.path.display(),
                            "duplicate struct ignored"
                        );
                        continue;
                    }
                    if !decl.type_params.is_empty() {
                        self.generics
                            .insert(decl.name.clone(), decl.type_params.clone());
                    }
                    let fields = fields
                        .into_iter()
                        .map(|f| FieldDescriptor {
                            options: FieldOptions::from_tag(f.tag.as_deref()),
                            name: f.name,
                            ty: f.ty,
                            tag: f.tag,
                            comment: f.comment,
                        })
                        .collect();
                    added.push(decl.name.clone());
                    self.structs.insert(
                        decl.name.clone(),
                        StructDescriptor {
                            name: decl.name,
                            fields,
                            type_params: decl.type_params,
                            origin: origin.clone(),
                            imports: unit.imports.clone(),
                            comment: decl.comment,
                        },
                    );
                }
                ParsedTypeKind::Named(underlying) => {
                    if !is_enum_base(&underlying)
                        || parse_struct_directives(&decl.comment).enumeration.is_none()
                    {
                        continue;
                    }
                    if self.enum_candidates.contains_key(&decl.name) {
                        debug!(name = %decl.name, "duplicate enum candidate ignored");
                        continue;
                    }
                    self.enum_candidates.insert(
                        decl.name.clone(),
                        EnumCandidate {
                            name: decl.name,
                            underlying,
                            origin: origin.clone(),
                            comment: decl.comment,
                        },
                    );
                }
            }
        }

        for block in unit.consts {
            self.const_blocks.push(ConstBlockRecord {
                origin: origin.clone(),
                specs: block.specs,
            });
        }

        added
    }

    /// Loads the package at `import_path` unless it was loaded before.
    /// Returns the names of structs it added.
    pub fn resolve_external(
        &mut self,
        loader: &dyn ExternalLoader,
        import_path: &str,
    ) -> Vec<String> {
        if !self.loaded_packages.insert(import_path.to_string()) {
            return Vec::new();
        }
        match loader.load(import_path) {
            Ok(units) => {
                let mut added = Vec::new();
                for mut unit in units {
                    if unit.import_path.is_none() {
                        unit.import_path = Some(import_path.to_string());
                    }
                    added.extend(self.scan_unit(unit, true));
                }
                debug!(import_path, structs = added.len(), "loaded external package");
                added
            }
            Err(e) => {
                warn!(import_path, error = %e, "failed to load external package");
                Vec::new()
            }
        }
    }

    /// Follows every package-qualified field type of every struct to its
    /// import and loads it, repeating for structs that loading brings in.
    pub fn resolve_external_references(&mut self, loader: &dyn ExternalLoader) {
        let mut pending: VecDeque<String> = self.structs.keys().cloned().collect();
        while let Some(name) = pending.pop_front() {
            let Some(descriptor) = self.structs.get(&name) else {
                continue;
            };
            let mut paths: Vec<String> = Vec::new();
            for field in &descriptor.fields {
                for reference in field.ty.named_refs() {
                    let Some(qualifier) = reference.qualifier() else {
                        continue;
                    };
                    match descriptor.import_for(qualifier) {
                        Some(path) => {
                            if !paths.iter().any(|p| p == path) {
                                paths.push(path.to_string());
                            }
                        }
                        None => debug!(
                            owner = %name,
                            qualifier,
                            "qualifier has no matching import"
                        ),
                    }
                }
            }
            for path in paths {
                pending.extend(self.resolve_external(loader, &path));
            }
        }
    }

    /// Pairs enum candidates with const blocks. Recomputes from scratch, so
    /// calling it again yields the same enums.
    pub fn match_enums(&mut self) {
        self.enums = match_enums(
            &self.enum_candidates,
            &self.const_blocks,
            self.comment_descriptions,
        );
    }

    /// Structs in scan order.
    pub fn structs(&self) -> impl Iterator<Item = &StructDescriptor> {
        self.structs.values()
    }

    /// Struct by identifier.
    pub fn get_struct(&self, name: &str) -> Option<&StructDescriptor> {
        self.structs.get(name)
    }

    /// Enum candidates in scan order.
    pub fn enum_candidates(&self) -> impl Iterator<Item = &EnumCandidate> {
        self.enum_candidates.values()
    }

    /// Whether `name` is a known enum candidate.
    pub fn is_enum(&self, name: &str) -> bool {
        self.enum_candidates.contains_key(name)
    }

    /// Matched enums, empty until `match_enums` runs.
    pub fn enums(&self) -> impl Iterator<Item = &EnumDescriptor> {
        self.enums.values()
    }

    /// Matched enum by source identifier.
    pub fn get_enum(&self, ident: &str) -> Option<&EnumDescriptor> {
        self.enums.get(ident)
    }

    /// Type parameter names of a generic struct.
    pub fn generic_params(&self, name: &str) -> Option<&[String]> {
        self.generics.get(name).map(Vec::as_slice)
    }

    /// Namespace of a struct: its own directive, else its package's.
    pub fn namespace_for(&self, descriptor: &StructDescriptor) -> Option<String> {
        descriptor
            .directives()
            .namespace
            .or_else(|| self.package_namespace(&descriptor.origin))
    }

    /// Namespace declared on the package doc comment of `origin`.
    pub fn package_namespace(&self, origin: &Origin) -> Option<String> {
        self.namespaces.get(&origin.package_key()).cloned()
    }
}
