//! # Routing Keys
//!
//! Where a rendered block goes under each output strategy. Keys are computed
//! here; writing files is left to the caller.

use crate::config::{OutputSettings, OutputStrategy};
use heck::ToSnakeCase;
use indexmap::IndexMap;
use std::collections::HashMap;
use std::fmt::{self, Display};
use std::path::{Component, Path, PathBuf};

/// Destination group of a block.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum RoutingKey {
    /// The one shared destination.
    Single,
    /// One destination per declaring struct or enum identifier.
    Type(String),
    /// One destination per declaring package directory.
    Package(PathBuf),
    /// One destination per namespace; blocks without one share the single
    /// destination.
    Namespace(Option<String>),
}

impl RoutingKey {
    /// Key for a block under `strategy`.
    pub fn for_block(
        strategy: OutputStrategy,
        source: &str,
        package_dir: &Path,
        namespace: Option<&str>,
    ) -> Self {
        match strategy {
            OutputStrategy::Single => RoutingKey::Single,
            OutputStrategy::PerType => RoutingKey::Type(source.to_string()),
            OutputStrategy::PerPackage => RoutingKey::Package(package_dir.to_path_buf()),
            OutputStrategy::PerNamespace => {
                RoutingKey::Namespace(namespace.map(str::to_string))
            }
        }
    }

    /// File the key resolves to.
    pub fn destination(&self, output: &OutputSettings) -> PathBuf {
        let file = |stem: &str| output.dir.join(format!("{}.{}", stem, output.extension));
        match self {
            RoutingKey::Single | RoutingKey::Namespace(None) => output.file.clone(),
            RoutingKey::Type(source) => file(&source.to_snake_case()),
            RoutingKey::Package(dir) => {
                let stem = normal_parts(dir).join("_");
                file(if stem.is_empty() { "root" } else { &stem })
            }
            RoutingKey::Namespace(Some(namespace)) => {
                file(&namespace.replace('.', &output.namespace_separator))
            }
        }
    }
}

fn normal_parts(dir: &Path) -> Vec<String> {
    dir.components()
        .filter_map(|c| match c {
            Component::Normal(part) => Some(part.to_string_lossy().into_owned()),
            _ => None,
        })
        .collect()
}

/// Shortest trailing path of each package directory that no other directory
/// shares, so `a/models` and `b/models` stay apart while `c/users` is just
/// `users`.
pub fn package_stems<'p, I>(dirs: I) -> HashMap<PathBuf, PathBuf>
where
    I: IntoIterator<Item = &'p Path>,
{
    let mut parts: IndexMap<PathBuf, Vec<String>> = IndexMap::new();
    for dir in dirs {
        parts
            .entry(dir.to_path_buf())
            .or_insert_with(|| normal_parts(dir));
    }

    parts
        .iter()
        .map(|(dir, own)| {
            let mut take = own.len().min(1);
            while take < own.len() {
                let suffix = &own[own.len() - take..];
                let shared = parts
                    .iter()
                    .any(|(other, theirs)| other != dir && theirs.ends_with(suffix));
                if !shared {
                    break;
                }
                take += 1;
            }
            let stem: PathBuf = own[own.len() - take..].iter().collect();
            (dir.clone(), stem)
        })
        .collect()
}

impl Display for RoutingKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RoutingKey::Single => write!(f, "single"),
            RoutingKey::Type(source) => write!(f, "type:{}", source),
            RoutingKey::Package(dir) => write!(f, "package:{}", dir.display()),
            RoutingKey::Namespace(Some(ns)) => write!(f, "namespace:{}", ns),
            RoutingKey::Namespace(None) => write!(f, "namespace:-"),
        }
    }
}
