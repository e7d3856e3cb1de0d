//! Pipeline graph model
//!
//! The scan result is a flat node list, a raw edge list and an id-keyed
//! source mapping. Nodes are deduplicated by id; edges are not.

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};

/// One pipeline task, model or job
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Node {
    /// Identity derived from (defining file, logical name)
    pub id: String,

    /// Logical name (task/model/job name)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
}

impl Node {
    /// Create a labelled node
    pub fn new(id: impl Into<String>, label: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            label: Some(label.into()),
        }
    }

    /// Label to show for this node, falling back to the id
    pub fn display_label(&self) -> &str {
        self.label.as_deref().unwrap_or(&self.id)
    }
}

/// Directed dependency: `from` feeds (or is a prerequisite of) `to`
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Edge {
    pub from: String,
    pub to: String,
}

impl Edge {
    pub fn new(from: impl Into<String>, to: impl Into<String>) -> Self {
        Self {
            from: from.into(),
            to: to.into(),
        }
    }
}

/// Source location of a node, used for jump-to-source
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MappingEntry {
    /// Absolute file path
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub file: Option<String>,

    /// 1-indexed line number
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub line: Option<usize>,
}

impl MappingEntry {
    /// Create an entry with file and line
    pub fn with_line(file: impl Into<String>, line: usize) -> Self {
        Self {
            file: Some(file.into()),
            line: Some(line),
        }
    }

    /// Whether the entry points somewhere an editor can open
    pub fn is_navigable(&self) -> bool {
        self.file.is_some()
    }
}

/// Counts describing a scan result
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScanSummary {
    pub nodes: usize,
    pub edges: usize,
    pub mapped: usize,
}

/// Combined graph returned by a workspace scan
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScanResult {
    /// Deduplicated nodes, in order of first appearance
    pub nodes: Vec<Node>,

    /// Raw edges, duplicates included
    pub edges: Vec<Edge>,

    /// Node id -> source location (last registration wins)
    pub mapping: BTreeMap<String, MappingEntry>,
}

impl ScanResult {
    /// True when the scan found no pipeline nodes
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Find a node by id
    pub fn node(&self, id: &str) -> Option<&Node> {
        self.nodes.iter().find(|n| n.id == id)
    }

    /// All nodes whose display label equals `label`
    ///
    /// Labels are not unique: the same task name in two files yields two nodes.
    pub fn find_by_label(&self, label: &str) -> Vec<&Node> {
        self.nodes
            .iter()
            .filter(|n| n.display_label() == label)
            .collect()
    }

    /// Source location registered for a node id
    pub fn location(&self, id: &str) -> Option<&MappingEntry> {
        self.mapping.get(id)
    }

    pub fn summary(&self) -> ScanSummary {
        ScanSummary {
            nodes: self.nodes.len(),
            edges: self.edges.len(),
            mapped: self
                .nodes
                .iter()
                .filter(|n| self.mapping.get(&n.id).is_some_and(MappingEntry::is_navigable))
                .count(),
        }
    }

    /// Serialize to a pretty JSON string
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    /// Serialize to a single-line JSON string
    pub fn to_json_compact(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }

    /// Save as pretty JSON
    pub fn save_to_file(&self, path: &std::path::Path) -> Result<(), std::io::Error> {
        let json = self
            .to_json()
            .map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidData, e))?;
        std::fs::write(path, json)
    }
}

/// Accumulates node/edge/mapping contributions and produces a [`ScanResult`]
///
/// Contributions are applied in call order. Node pushes with an id that was
/// already seen keep their original position but take the newest label.
#[derive(Debug, Default)]
pub struct GraphBuilder {
    nodes: Vec<Node>,
    edges: Vec<Edge>,
    mapping: BTreeMap<String, MappingEntry>,
}

impl GraphBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push_node(&mut self, node: Node) {
        self.nodes.push(node);
    }

    pub fn push_edge(&mut self, edge: Edge) {
        self.edges.push(edge);
    }

    /// Register a source location, replacing any earlier one for the id
    pub fn set_location(&mut self, id: impl Into<String>, entry: MappingEntry) {
        self.mapping.insert(id.into(), entry);
    }

    /// Number of node pushes so far, before deduplication
    pub fn raw_node_count(&self) -> usize {
        self.nodes.len()
    }

    /// Deduplicate nodes by id and return the final graph
    pub fn build(self) -> ScanResult {
        let mut index: HashMap<String, usize> = HashMap::new();
        let mut nodes: Vec<Node> = Vec::with_capacity(self.nodes.len());

        for node in self.nodes {
            match index.get(&node.id) {
                Some(&pos) => nodes[pos] = node,
                None => {
                    index.insert(node.id.clone(), nodes.len());
                    nodes.push(node);
                }
            }
        }

        ScanResult {
            nodes,
            edges: self.edges,
            mapping: self.mapping,
        }
    }
}
