#![deny(missing_docs)]

//! # Source Loading
//!
//! Finds `.go` files under the scan roots, works out their import paths from
//! the enclosing `go.mod`, and loads packages referenced from outside the
//! roots on demand.

use gqlscan_core::{parse_go_file, AppResult, ExternalLoader, ParsedUnit};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;
use walkdir::WalkDir;

/// A Go module: its path and its root directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GoModule {
    /// Module path from the `module` directive.
    pub path: String,
    /// Directory holding `go.mod`.
    pub root: PathBuf,
}

impl GoModule {
    /// Finds the nearest `go.mod` at or above `start`.
    pub fn find(start: &Path) -> Option<Self> {
        let start = fs::canonicalize(start).unwrap_or_else(|_| start.to_path_buf());
        for dir in start.ancestors() {
            let manifest = dir.join("go.mod");
            if let Ok(text) = fs::read_to_string(&manifest) {
                return module_path(&text).map(|path| GoModule {
                    path,
                    root: dir.to_path_buf(),
                });
            }
        }
        None
    }

    /// Import path of the package in `dir`, if `dir` is inside the module.
    pub fn import_path_of(&self, dir: &Path) -> Option<String> {
        let dir = fs::canonicalize(dir).unwrap_or_else(|_| dir.to_path_buf());
        let relative = dir.strip_prefix(&self.root).ok()?;
        let mut path = self.path.clone();
        for part in relative.components() {
            path.push('/');
            path.push_str(&part.as_os_str().to_string_lossy());
        }
        Some(path)
    }

    /// Directory of `import_path`, if it belongs to the module.
    pub fn dir_of(&self, import_path: &str) -> Option<PathBuf> {
        if import_path == self.path {
            return Some(self.root.clone());
        }
        let rest = import_path.strip_prefix(&self.path)?.strip_prefix('/')?;
        Some(rest.split('/').fold(self.root.clone(), |dir, part| dir.join(part)))
    }
}

/// The `module` directive of a `go.mod` file.
fn module_path(go_mod: &str) -> Option<String> {
    go_mod.lines().find_map(|line| {
        let rest = line.trim().strip_prefix("module")?;
        if !rest.starts_with(char::is_whitespace) {
            return None;
        }
        let path = rest.trim().trim_matches('"');
        (!path.is_empty()).then(|| path.to_string())
    })
}

/// Whether `path` is a Go source file worth scanning.
fn is_go_source(path: &Path) -> bool {
    path.extension().is_some_and(|ext| ext == "go")
        && !path
            .file_name()
            .is_some_and(|name| name.to_string_lossy().ends_with("_test.go"))
}

/// Every non-test `.go` file under `root`, sorted, skipping `vendor` and
/// hidden directories.
pub fn discover_go_files(root: &Path) -> Vec<PathBuf> {
    let mut files: Vec<PathBuf> = WalkDir::new(root)
        .into_iter()
        .filter_entry(|e| {
            let name = e.file_name().to_string_lossy();
            e.depth() == 0 || !(name.starts_with('.') || name == "vendor" || name == "testdata")
        })
        .filter_map(|e| e.ok())
        .filter(|e| e.file_type().is_file() && is_go_source(e.path()))
        .map(|e| e.into_path())
        .collect();
    files.sort();
    files
}

/// Parses one file, recording its package import path when known.
pub fn load_unit(path: &Path, module: Option<&GoModule>) -> AppResult<ParsedUnit> {
    let mut unit = parse_go_file(path)?;
    let dir = path.parent().unwrap_or(Path::new("."));
    if let Some(import_path) = module.and_then(|m| m.import_path_of(dir)) {
        unit.import_path = Some(import_path);
    }
    Ok(unit)
}

/// Loads packages of the current module from disk.
#[derive(Debug, Clone, Default)]
pub struct DiskLoader {
    module: Option<GoModule>,
}

impl DiskLoader {
    /// A loader resolving import paths inside `module`.
    pub fn new(module: Option<GoModule>) -> Self {
        Self { module }
    }
}

impl ExternalLoader for DiskLoader {
    fn load(&self, import_path: &str) -> AppResult<Vec<ParsedUnit>> {
        let Some(dir) = self.module.as_ref().and_then(|m| m.dir_of(import_path)) else {
            debug!(import_path, "import path outside the current module");
            return Ok(Vec::new());
        };
        if !dir.is_dir() {
            debug!(import_path, dir = %dir.display(), "package directory missing");
            return Ok(Vec::new());
        }

        let mut files: Vec<PathBuf> = fs::read_dir(&dir)?
            .filter_map(|e| e.ok())
            .map(|e| e.path())
            .filter(|p| p.is_file() && is_go_source(p))
            .collect();
        files.sort();

        files
            .iter()
            .map(|file| {
                let mut unit = parse_go_file(file)?;
                unit.import_path = Some(import_path.to_string());
                Ok(unit)
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use tempfile::tempdir;

    #[test]
    fn test_module_path_parsing() {
        assert_eq!(
            module_path("// comment\nmodule example.com/app\n\ngo 1.22\n").as_deref(),
            Some("example.com/app")
        );
        assert_eq!(module_path("module \"quoted/mod\"").as_deref(), Some("quoted/mod"));
        assert_eq!(module_path("modules x\n"), None);
    }

    #[test]
    fn test_discovery_and_import_paths() {
        let dir = tempdir().unwrap();
        let root = dir.path();
        fs::write(root.join("go.mod"), "module example.com/app\n").unwrap();
        fs::create_dir_all(root.join("models")).unwrap();
        fs::create_dir_all(root.join("vendor/x")).unwrap();
        fs::write(root.join("models/user.go"), "package models\n").unwrap();
        fs::write(root.join("models/user_test.go"), "package models\n").unwrap();
        fs::write(root.join("vendor/x/x.go"), "package x\n").unwrap();
        fs::write(root.join("main.go"), "package main\n").unwrap();

        let files = discover_go_files(root);
        let names: Vec<_> = files
            .iter()
            .map(|f| f.strip_prefix(root).unwrap().to_string_lossy().replace('\\', "/"))
            .collect();
        assert_eq!(names, vec!["main.go", "models/user.go"]);

        let module = GoModule::find(&root.join("models")).unwrap();
        assert_eq!(module.path, "example.com/app");
        let unit = load_unit(&root.join("models/user.go"), Some(&module)).unwrap();
        assert_eq!(unit.import_path.as_deref(), Some("example.com/app/models"));
    }

    #[test]
    fn test_disk_loader_reads_module_packages_only() {
        let dir = tempdir().unwrap();
        let root = dir.path();
        fs::write(root.join("go.mod"), "module example.com/app\n").unwrap();
        fs::create_dir_all(root.join("shared")).unwrap();
        fs::write(
            root.join("shared/audit.go"),
            "package shared\n\ntype Audit struct {\n\tBy string\n}\n",
        )
        .unwrap();
        fs::write(root.join("shared/audit_test.go"), "package shared\n").unwrap();

        let loader = DiskLoader::new(GoModule::find(root));
        let units = loader.load("example.com/app/shared").unwrap();
        assert_eq!(units.len(), 1);
        assert_eq!(units[0].package, "shared");
        assert_eq!(units[0].import_path.as_deref(), Some("example.com/app/shared"));
        assert!(loader.load("github.com/other/pkg").unwrap().is_empty());
    }
}
