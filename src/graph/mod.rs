//! Schema Reference Graph
//!
//! Directed graph of `$ref` edges between intake entries, built with petgraph.
//! Used to reject cyclic schemas up front (naming a concrete cycle path)
//! and to export the dependency structure as DOT.
//!
//! Edges follow the same lookup rule as the resolver: a pointer matches an
//! entry literally or with the `Schema` suffix appended.

pub mod diagnostics;
pub mod loader;

pub use diagnostics::{DiagnosticCode, DiagnosticItem, Diagnostics, Severity};
pub use loader::{load_directory, load_openapi, load_openapi_file, load_path, LoadConfig};

use std::collections::{HashMap, HashSet, VecDeque};

use indexmap::IndexMap;
use petgraph::algo::kosaraju_scc;
use petgraph::graph::{DiGraph, NodeIndex};
use petgraph::visit::EdgeRef;
use petgraph::Direction;

use crate::error::BuilderError;
use crate::resolve::Resolver;
use crate::schema::{Schema, SchemaKind};

/// Entry name as used in the intake mapping
pub type SchemaId = String;

/// Rough shape of an entry, for DOT styling
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NodeKind {
    Object,
    Enumeration,
    Array,
    Union,
    Value,
}

impl NodeKind {
    fn of(schema: &Schema) -> Self {
        match &schema.kind {
            SchemaKind::Object(_) | SchemaKind::AllOf(_) => Self::Object,
            SchemaKind::VariantList(_) | SchemaKind::Enum { .. } => Self::Enumeration,
            SchemaKind::Array(_) => Self::Array,
            SchemaKind::OrList(_) | SchemaKind::Choice { .. } => Self::Union,
            SchemaKind::Reference(_) | SchemaKind::Leaf(_) => Self::Value,
        }
    }

    fn color(&self) -> &'static str {
        match self {
            Self::Object => "#00BCD4",
            Self::Enumeration => "#FF5722",
            Self::Array => "#4CAF50",
            Self::Union => "#9C27B0",
            Self::Value => "#607D8B",
        }
    }
}

/// The reference graph over one intake mapping
pub struct ReferenceGraph {
    /// Edge weight is the raw `$ref` pointer
    graph: DiGraph<SchemaId, String>,
    node_indices: HashMap<SchemaId, NodeIndex>,
    kinds: HashMap<NodeIndex, NodeKind>,
    /// Pointers that match no entry, per source entry
    dangling: Vec<(SchemaId, String)>,
    /// Pointers under unparsed keywords; not edges, never inlined
    unfollowed: Vec<(SchemaId, String)>,
}

impl ReferenceGraph {
    /// Build the graph; nodes keep the mapping's order.
    pub fn from_schemas(schemas: &IndexMap<String, Schema>) -> Self {
        let mut graph = DiGraph::with_capacity(schemas.len(), schemas.len() * 2);
        let mut node_indices = HashMap::with_capacity(schemas.len());
        let mut kinds = HashMap::with_capacity(schemas.len());

        for (name, schema) in schemas {
            let idx = graph.add_node(name.clone());
            node_indices.insert(name.clone(), idx);
            kinds.insert(idx, NodeKind::of(schema));
        }

        let lookup = Resolver::new(schemas);
        let mut dangling = Vec::new();
        let mut unfollowed = Vec::new();
        for (name, schema) in schemas {
            let from = node_indices[name];
            unfollowed.extend(
                schema
                    .unparsed_references()
                    .into_iter()
                    .map(|(_, pointer)| (name.clone(), pointer.to_string())),
            );
            for pointer in schema.references() {
                match lookup.lookup(pointer) {
                    Some((target, _)) => {
                        let to = node_indices[target];
                        graph.add_edge(from, to, pointer.to_string());
                    }
                    None => dangling.push((name.clone(), pointer.to_string())),
                }
            }
        }

        Self {
            graph,
            node_indices,
            kinds,
            dangling,
            unfollowed,
        }
    }

    pub fn schema_count(&self) -> usize {
        self.graph.node_count()
    }

    pub fn edge_count(&self) -> usize {
        self.graph.edge_count()
    }

    /// References that match no entry
    pub fn dangling(&self) -> &[(SchemaId, String)] {
        &self.dangling
    }

    /// References under keywords the resolver does not follow
    pub fn unfollowed(&self) -> &[(SchemaId, String)] {
        &self.unfollowed
    }

    /// Entries referenced directly by `id`, deduplicated, in edge order
    pub fn refs_out(&self, id: &str) -> Vec<&SchemaId> {
        let Some(&idx) = self.node_indices.get(id) else {
            return Vec::new();
        };
        let mut seen = HashSet::new();
        let mut targets: Vec<NodeIndex> = self
            .graph
            .edges_directed(idx, Direction::Outgoing)
            .map(|e| e.target())
            .collect();
        // petgraph walks edges newest first
        targets.reverse();
        targets
            .into_iter()
            .filter(|t| seen.insert(*t))
            .map(|t| &self.graph[t])
            .collect()
    }

    /// Reference cycles: strongly connected components with more than one
    /// member, or a single member that references itself.
    ///
    /// Members of each cycle are listed in intake order; cycles are ordered by
    /// their first member.
    pub fn cycles(&self) -> Vec<Vec<SchemaId>> {
        let mut groups: Vec<Vec<NodeIndex>> = kosaraju_scc(&self.graph)
            .into_iter()
            .filter(|scc| scc.len() > 1 || self.graph.contains_edge(scc[0], scc[0]))
            .map(|mut scc| {
                scc.sort();
                scc
            })
            .collect();
        groups.sort_by_key(|scc| scc[0]);

        groups
            .into_iter()
            .map(|scc| scc.into_iter().map(|idx| self.graph[idx].clone()).collect())
            .collect()
    }

    /// A concrete reference path from `start` back to itself, e.g. `A -> B -> A`
    pub fn cycle_path(&self, start: &str) -> Option<Vec<SchemaId>> {
        let &start_idx = self.node_indices.get(start)?;
        let mut previous: HashMap<NodeIndex, NodeIndex> = HashMap::new();
        let mut queue = VecDeque::from([start_idx]);

        while let Some(idx) = queue.pop_front() {
            let mut next: Vec<NodeIndex> = self.graph.neighbors(idx).collect();
            next.reverse();
            for target in next {
                if target == start_idx {
                    let mut middle = Vec::new();
                    let mut cursor = idx;
                    while cursor != start_idx {
                        middle.push(self.graph[cursor].clone());
                        cursor = previous[&cursor];
                    }
                    middle.reverse();

                    let mut path = Vec::with_capacity(middle.len() + 2);
                    path.push(self.graph[start_idx].clone());
                    path.extend(middle);
                    path.push(self.graph[start_idx].clone());
                    return Some(path);
                }
                if !previous.contains_key(&target) {
                    previous.insert(target, idx);
                    queue.push_back(target);
                }
            }
        }
        None
    }

    /// Error for the first cycle, if there is one
    pub fn check_acyclic(&self) -> Result<(), BuilderError> {
        let Some(first) = self.cycles().into_iter().next() else {
            return Ok(());
        };
        let schema = first[0].clone();
        let cycle = self.cycle_path(&schema).unwrap_or(first);
        Err(BuilderError::CyclicSchema { schema, cycle })
    }

    /// Record every cycle as an error diagnostic
    pub fn cycle_diagnostics(&self) -> Diagnostics {
        let mut diagnostics = Diagnostics::new();
        for members in self.cycles() {
            let path = self.cycle_path(&members[0]).unwrap_or_else(|| members.clone());
            diagnostics.push(
                DiagnosticItem::new(
                    members[0].clone(),
                    DiagnosticCode::CyclicSchema,
                    format!("Cyclic schema: {}", path.join(" -> ")),
                )
                .with_context(format!("Members: {}", members.join(", "))),
            );
        }
        diagnostics
    }

    /// Export as Graphviz DOT; cycle members get a red border
    pub fn to_dot(&self) -> String {
        let in_cycle: HashSet<SchemaId> = self.cycles().into_iter().flatten().collect();
        let mut output = String::new();

        output.push_str("digraph ReferenceGraph {\n");
        output.push_str("  rankdir=LR;\n");
        output.push_str("  node [shape=box, style=\"filled,rounded\", fontname=\"Helvetica\", fontsize=10, fontcolor=\"white\"];\n");
        output.push_str("  edge [fontname=\"Helvetica\", fontsize=8];\n\n");

        for idx in self.graph.node_indices() {
            let id = &self.graph[idx];
            let color = self.kinds.get(&idx).map(NodeKind::color).unwrap_or("#9E9E9E");
            let border = if in_cycle.contains(id) { "#F44336" } else { "#404040" };
            output.push_str(&format!(
                "  \"{}\" [fillcolor=\"{}\", color=\"{}\"];\n",
                dot_escape(id),
                color,
                border
            ));
        }

        output.push('\n');

        let mut edges: Vec<_> = self.graph.edge_references().collect();
        edges.sort_by_key(|e| e.id());
        for edge in edges {
            output.push_str(&format!(
                "  \"{}\" -> \"{}\";\n",
                dot_escape(&self.graph[edge.source()]),
                dot_escape(&self.graph[edge.target()])
            ));
        }

        output.push_str("}\n");
        output
    }
}

fn dot_escape(id: &str) -> String {
    id.replace('\\', "\\\\").replace('"', "\\\"")
}
