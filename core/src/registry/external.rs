//! # External Loading
//!
//! Interface for loading packages that live outside the scan roots, used when
//! a scanned struct references `pkg.Type` from an imported package.

use crate::error::AppResult;
use crate::parser::models::ParsedUnit;
use std::collections::HashMap;

/// Loads the source units of a package by import path.
///
/// Implementors decide where import paths live on disk (module roots,
/// vendored trees, in-memory fixtures). The model calls `load` at most once
/// per import path in a run.
pub trait ExternalLoader {
    /// Returns every unit of the package at `import_path`.
    ///
    /// An unknown import path should yield an empty list or an error; either
    /// way the reference is left unresolved and generation continues.
    fn load(&self, import_path: &str) -> AppResult<Vec<ParsedUnit>>;
}

/// Loader that resolves nothing.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoExternalLoader;

impl ExternalLoader for NoExternalLoader {
    fn load(&self, _import_path: &str) -> AppResult<Vec<ParsedUnit>> {
        Ok(Vec::new())
    }
}

/// Loader over pre-parsed units keyed by import path.
#[derive(Debug, Clone, Default)]
pub struct MemoryLoader {
    packages: HashMap<String, Vec<ParsedUnit>>,
}

impl MemoryLoader {
    /// Empty loader.
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers `unit` under `import_path`.
    pub fn with_unit(mut self, import_path: impl Into<String>, unit: ParsedUnit) -> Self {
        self.packages.entry(import_path.into()).or_default().push(unit);
        self
    }
}

impl ExternalLoader for MemoryLoader {
    fn load(&self, import_path: &str) -> AppResult<Vec<ParsedUnit>> {
        Ok(self.packages.get(import_path).cloned().unwrap_or_default())
    }
}
