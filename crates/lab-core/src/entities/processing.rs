use std::collections::{BTreeMap, BTreeSet, HashMap};

use rustworkx_core::petgraph::algo::toposort;
use rustworkx_core::petgraph::graph::{DiGraph, NodeIndex};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::components::{Code, DataProcess};
use crate::errors::ValidationError;
use crate::record::Record;
use crate::validate::{Validate, check_schema_version, validate_each};

fn default_schema_version() -> String {
    Processing::SCHEMA_VERSION.to_string()
}

/// Process name mapped to the names of the processes it depends on.
pub type ProcessGraph = BTreeMap<String, Vec<String>>;

/// Every processing and analysis step applied to a data asset.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct Processing {
    #[serde(default = "default_schema_version")]
    pub schema_version: String,
    pub data_processes: Vec<DataProcess>,
    pub pipelines: Option<Vec<Code>>,
    pub dependency_graph: Option<ProcessGraph>,
    pub notes: Option<String>,
}

impl Processing {
    /// A processing record whose steps ran one after another in the given
    /// order.
    #[must_use]
    pub fn sequential(data_processes: Vec<DataProcess>) -> Self {
        let mut graph = ProcessGraph::new();
        let mut previous: Option<&str> = None;
        for process in &data_processes {
            graph.insert(
                process.name.clone(),
                previous.map(str::to_string).into_iter().collect(),
            );
            previous = Some(process.name.as_str());
        }
        Self {
            schema_version: default_schema_version(),
            data_processes,
            pipelines: None,
            dependency_graph: Some(graph),
            notes: None,
        }
    }

    #[must_use]
    pub fn process_names(&self) -> Vec<&str> {
        self.data_processes.iter().map(|p| p.name.as_str()).collect()
    }

    /// Processes the dependency graph does not mention. Without a graph
    /// every process is isolated.
    #[must_use]
    pub fn isolated_processes(&self) -> Vec<String> {
        let Some(graph) = &self.dependency_graph else {
            return self.process_names().into_iter().map(str::to_string).collect();
        };
        let mentioned: BTreeSet<&str> = graph
            .iter()
            .flat_map(|(node, preds)| std::iter::once(node).chain(preds))
            .map(String::as_str)
            .collect();
        self.process_names()
            .into_iter()
            .filter(|name| !mentioned.contains(name))
            .map(str::to_string)
            .collect()
    }

    /// Names in an order where every process follows its dependencies, or
    /// `None` when there is no graph or it contains a cycle.
    #[must_use]
    pub fn execution_order(&self) -> Option<Vec<String>> {
        let graph = self.dependency_graph.as_ref()?;
        let digraph = build_digraph(graph);
        let sorted = toposort(&digraph, None).ok()?;
        Some(sorted.into_iter().map(|idx| digraph[idx].to_string()).collect())
    }

    fn validate_graph(&self, graph: &ProcessGraph) -> Result<(), ValidationError> {
        let declared: BTreeSet<&str> = self.process_names().into_iter().collect();
        for (node, predecessors) in graph {
            if !declared.contains(node.as_str()) {
                return Err(ValidationError::field(
                    "Processing",
                    "dependency_graph",
                    node,
                    "names a process that is not in data_processes",
                ));
            }
            if let Some(unknown) = predecessors.iter().find(|p| !declared.contains(p.as_str())) {
                return Err(ValidationError::field(
                    "Processing",
                    format!("dependency_graph.{node}"),
                    unknown,
                    "depends on a process that is not in data_processes",
                ));
            }
        }
        let digraph = build_digraph(graph);
        if let Err(cycle) = toposort(&digraph, None) {
            return Err(ValidationError::field(
                "Processing",
                "dependency_graph",
                digraph[cycle.node_id()],
                "dependency graph contains a cycle",
            ));
        }
        Ok(())
    }
}

/// Edges point from a dependency to the process that needs it.
fn build_digraph(graph: &ProcessGraph) -> DiGraph<&str, ()> {
    let mut digraph = DiGraph::new();
    let mut indices: HashMap<&str, NodeIndex> = HashMap::new();
    for (node, predecessors) in graph {
        for name in std::iter::once(node).chain(predecessors) {
            indices
                .entry(name.as_str())
                .or_insert_with(|| digraph.add_node(name.as_str()));
        }
    }
    for (node, predecessors) in graph {
        let target = indices[node.as_str()];
        for predecessor in predecessors {
            digraph.add_edge(indices[predecessor.as_str()], target, ());
        }
    }
    digraph
}

impl Validate for Processing {
    fn validate(&self) -> Result<(), ValidationError> {
        check_schema_version("Processing", &self.schema_version, Self::SCHEMA_VERSION)?;
        if self.data_processes.is_empty() {
            return Err(ValidationError::field(
                "Processing",
                "data_processes",
                &self.data_processes.len(),
                "must hold at least one process",
            ));
        }
        validate_each("data_processes", &self.data_processes)?;

        let mut seen = BTreeSet::new();
        for (index, name) in self.process_names().into_iter().enumerate() {
            if !seen.insert(name) {
                return Err(ValidationError::field(
                    "Processing",
                    format!("data_processes[{index}].name"),
                    name,
                    "process names must be unique",
                ));
            }
        }
        match &self.dependency_graph {
            Some(graph) => self.validate_graph(graph),
            None => Ok(()),
        }
    }
}

impl Record for Processing {
    const SCHEMA_VERSION: &'static str = "2.0.0";
    const FILE_STEM: &'static str = "processing";

    fn schema_version(&self) -> &str {
        &self.schema_version
    }
}
