#![deny(missing_docs)]

//! # Dependency Graph
//!
//! Reference edges between structs and the propagation of "generate as type"
//! and "generate as input" flags from annotated structs to the ones they use.
//!
//! An embedded struct is inlined rather than referenced, so instead of an
//! edge to the embedded type the graph gets edges to whatever its promoted
//! fields (and its type arguments) reference.

use crate::config::{AutoGenerateStrategy, NameFilters, Settings};
use crate::directives::models::VariantKind;
use crate::flatten::Flattener;
use crate::registry::models::StructDescriptor;
use crate::registry::SourceModel;
use indexmap::IndexMap;
use std::collections::{HashMap, VecDeque};
use tracing::debug;

/// Generation state of one struct.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GraphNode {
    /// Struct identifier.
    pub name: String,
    /// `package.Name`, matched by glob filters.
    pub qualified: String,
    /// Declaring file, matched by glob filters.
    pub location: String,
    /// Carries at least one `@gqlType`.
    pub annotated_type: bool,
    /// Carries at least one `@gqlInput`.
    pub annotated_input: bool,
    /// Carries `@gqlSkip`.
    pub skip: bool,
    /// Declares type parameters.
    pub generic: bool,
    /// Should become a type.
    pub generate_type: bool,
    /// Should become an input.
    pub generate_input: bool,
    /// Distance from the nearest annotated struct, when flagged.
    pub depth: Option<usize>,
}

impl GraphNode {
    fn from_descriptor(descriptor: &StructDescriptor) -> Self {
        let directives = descriptor.directives();
        let skip = directives.skip;
        let annotated_type = !directives.types.is_empty();
        let annotated_input = !directives.inputs.is_empty();
        Self {
            name: descriptor.name.clone(),
            qualified: descriptor.origin.qualified(&descriptor.name),
            location: descriptor.origin.path.display().to_string(),
            annotated_type,
            annotated_input,
            skip,
            generic: descriptor.is_generic(),
            generate_type: annotated_type && !skip,
            generate_input: annotated_input && !skip,
            depth: (!skip && (annotated_type || annotated_input)).then_some(0),
        }
    }

    /// Whether the node is flagged for `kind`.
    pub fn generates(&self, kind: VariantKind) -> bool {
        match kind {
            VariantKind::Type => self.generate_type,
            VariantKind::Input => self.generate_input,
        }
    }

    fn annotated(&self, kind: VariantKind) -> bool {
        match kind {
            VariantKind::Type => self.annotated_type,
            VariantKind::Input => self.annotated_input,
        }
    }

    fn mark(&mut self, kind: VariantKind, depth: usize) {
        match kind {
            VariantKind::Type => self.generate_type = true,
            VariantKind::Input => self.generate_input = true,
        }
        self.depth = Some(self.depth.map_or(depth, |d| d.min(depth)));
    }

    fn excluded_by(&self, filters: &NameFilters) -> bool {
        filters.excluded([
            self.qualified.as_str(),
            self.name.as_str(),
            self.location.as_str(),
        ])
    }

    fn included_by(&self, filters: &NameFilters) -> bool {
        filters.included([
            self.qualified.as_str(),
            self.name.as_str(),
            self.location.as_str(),
        ])
    }

    /// Auto-generation never flags skipped or generic structs; generics are
    /// emitted per instantiation instead.
    fn auto_eligible(&self) -> bool {
        !self.skip && !self.generic
    }
}

/// Struct reference graph.
#[derive(Debug, Clone, Default)]
pub struct DependencyGraph {
    nodes: IndexMap<String, GraphNode>,
    edges: IndexMap<String, Vec<String>>,
}

impl DependencyGraph {
    /// Builds nodes and edges for every struct in `model`.
    pub fn build(model: &SourceModel, settings: &Settings) -> Self {
        let flattener = Flattener::new(model, settings).quiet();
        let mut graph = DependencyGraph::default();

        for descriptor in model.structs() {
            graph
                .nodes
                .insert(descriptor.name.clone(), GraphNode::from_descriptor(descriptor));

            let flattened = flattener.flatten(descriptor);
            let mut targets: Vec<String> = Vec::new();
            let referenced = flattened
                .fields
                .iter()
                .map(|f| &f.ty)
                .chain(flattened.embedded.iter().flat_map(|e| e.type_args()));
            for ty in referenced {
                for reference in ty.named_refs() {
                    let Some(name) = reference.base_name() else {
                        continue;
                    };
                    if name == descriptor.name
                        || model.get_struct(name).is_none()
                        || targets.iter().any(|t| t == name)
                    {
                        continue;
                    }
                    targets.push(name.to_string());
                }
            }
            graph.edges.insert(descriptor.name.clone(), targets);
        }

        graph
    }

    /// Outgoing references of `name`.
    pub fn references(&self, name: &str) -> &[String] {
        self.edges.get(name).map(Vec::as_slice).unwrap_or_default()
    }

    /// Node of `name`.
    pub fn node(&self, name: &str) -> Option<&GraphNode> {
        self.nodes.get(name)
    }

    /// Nodes in scan order.
    pub fn nodes(&self) -> impl Iterator<Item = &GraphNode> {
        self.nodes.values()
    }

    /// Whether `name` should be generated as `kind`.
    pub fn should_generate(&self, name: &str, kind: VariantKind) -> bool {
        self.nodes.get(name).is_some_and(|n| n.generates(kind))
    }

    /// Flags non-annotated structs according to `strategy`. `max_depth` of
    /// `0` means unlimited.
    pub fn propagate(
        &mut self,
        strategy: AutoGenerateStrategy,
        max_depth: usize,
        filters: &NameFilters,
    ) {
        match strategy {
            AutoGenerateStrategy::None => {}
            AutoGenerateStrategy::All => {
                for node in self.nodes.values_mut() {
                    if !node.auto_eligible()
                        || node.annotated_type
                        || node.annotated_input
                        || node.excluded_by(filters)
                    {
                        continue;
                    }
                    node.mark(VariantKind::Type, 0);
                    node.mark(VariantKind::Input, 0);
                }
            }
            AutoGenerateStrategy::Reachable => {
                self.reach(VariantKind::Type, max_depth, filters);
                self.reach(VariantKind::Input, max_depth, filters);
            }
            AutoGenerateStrategy::Patterns => {
                for node in self.nodes.values_mut() {
                    if !node.auto_eligible()
                        || node.annotated_type
                        || node.annotated_input
                        || !node.included_by(filters)
                        || node.excluded_by(filters)
                    {
                        continue;
                    }
                    node.mark(VariantKind::Type, 0);
                    node.mark(VariantKind::Input, 0);
                }
            }
        }
    }

    /// Breadth-first walk from every node annotated for `kind`.
    fn reach(&mut self, kind: VariantKind, max_depth: usize, filters: &NameFilters) {
        let mut visited: HashMap<String, usize> = HashMap::new();
        let mut queue: VecDeque<(String, usize)> = VecDeque::new();
        for node in self.nodes.values() {
            if node.annotated(kind) && !node.skip {
                visited.insert(node.name.clone(), 0);
                queue.push_back((node.name.clone(), 0));
            }
        }

        while let Some((name, depth)) = queue.pop_front() {
            let next = depth + 1;
            if max_depth != 0 && next > max_depth {
                continue;
            }
            let targets = self.edges.get(&name).cloned().unwrap_or_default();
            for target in targets {
                if visited.get(&target).is_some_and(|&d| d <= next) {
                    continue;
                }
                let Some(node) = self.nodes.get_mut(&target) else {
                    continue;
                };
                if node.skip || node.excluded_by(filters) {
                    debug!(from = %name, to = %target, "propagation stopped at excluded struct");
                    continue;
                }
                visited.insert(target.clone(), next);
                if !node.generic {
                    node.mark(kind, next);
                }
                queue.push_back((target, next));
            }
        }
    }
}
