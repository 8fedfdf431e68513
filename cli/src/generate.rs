#![deny(missing_docs)]

//! # Generate Command
//!
//! Scans the configured packages and writes the generated schema.
//!
//! 1. **Settings**: read from the YAML file, defaults when absent.
//! 2. **Scan**: every non-test `.go` file under each root is parsed.
//! 3. **Generate**: the core pipeline resolves and renders blocks.
//! 4. **Write**: blocks are grouped by routing key, one file per key.

use crate::error::{CliError, CliResult};
use crate::loader::{discover_go_files, load_unit, DiskLoader, GoModule};
use gqlscan_core::{generate_schema, render_document, SchemaBlock, Settings};
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// Header written at the top of every generated file.
pub const HEADER: &str = "# Code generated by gqlscan. DO NOT EDIT.\n";

/// Arguments for the generate command.
#[derive(clap::Args, Debug, Clone)]
pub struct GenerateArgs {
    /// Settings file. A missing default file means default settings.
    #[clap(long, short, default_value = "gqlscan.yml", env = "GQLSCAN_CONFIG")]
    pub config: PathBuf,

    /// Scan roots; overrides `packages` from the settings.
    #[clap(long = "package", short = 'p')]
    pub packages: Vec<PathBuf>,

    /// Print the schema to stdout instead of writing files.
    #[clap(long)]
    pub stdout: bool,
}

/// Executes the generate command.
pub fn execute(args: &GenerateArgs) -> CliResult<()> {
    let settings = load_settings(&args.config)?;
    let roots = if args.packages.is_empty() {
        settings.packages.clone()
    } else {
        args.packages.clone()
    };

    let blocks = generate(&roots, &settings)?;

    if args.stdout {
        print!("{}", render_document(&blocks));
        return Ok(());
    }

    for (path, contents) in assemble(&blocks, &settings) {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)?;
        }
        fs::write(&path, contents)?;
        info!(path = %path.display(), "wrote schema file");
    }
    Ok(())
}

/// Reads settings, falling back to defaults when the file does not exist.
pub fn load_settings(path: &Path) -> CliResult<Settings> {
    if path.exists() {
        Ok(Settings::load(path)?)
    } else {
        debug!(path = %path.display(), "no settings file, using defaults");
        Ok(Settings::default())
    }
}

/// Parses every package under `roots` and runs the generator.
pub fn generate(roots: &[PathBuf], settings: &Settings) -> CliResult<Vec<SchemaBlock>> {
    let mut units = Vec::new();
    let mut module = None;

    for root in roots {
        if !root.exists() {
            return Err(CliError::General(format!(
                "package root not found: {}",
                root.display()
            )));
        }
        let root_module = GoModule::find(root);
        for file in discover_go_files(root) {
            units.push(load_unit(&file, root_module.as_ref())?);
        }
        if module.is_none() {
            module = root_module;
        }
    }
    info!(files = units.len(), "parsed source files");

    let loader = DiskLoader::new(module);
    Ok(generate_schema(units, &loader, settings)?)
}

/// Groups blocks by destination. Files come out sorted by path; blocks keep
/// their generation order within a file.
pub fn assemble(blocks: &[SchemaBlock], settings: &Settings) -> BTreeMap<PathBuf, String> {
    let mut grouped: BTreeMap<PathBuf, Vec<&SchemaBlock>> = BTreeMap::new();
    for block in blocks {
        grouped
            .entry(block.routing.destination(&settings.output))
            .or_default()
            .push(block);
    }
    grouped
        .into_iter()
        .map(|(path, blocks)| {
            let body: Vec<&str> = blocks.iter().map(|b| b.text.as_str()).collect();
            (path, format!("{}\n{}", HEADER, body.join("\n")))
        })
        .collect()
}
