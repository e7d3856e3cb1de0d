//! Parser outcome types and the parser trait

use dagscout_core::{Edge, GraphBuilder, MappingEntry, Node, SourceFormat};

/// Ordered contributions of one parser for one file
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ParseFragment {
    pub nodes: Vec<Node>,
    pub edges: Vec<Edge>,
    /// Location registrations, in the order they were made
    pub locations: Vec<(String, MappingEntry)>,
}

impl ParseFragment {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_node(&mut self, id: &str, label: &str) {
        self.nodes.push(Node::new(id, label));
    }

    pub fn add_edge(&mut self, from: &str, to: &str) {
        self.edges.push(Edge::new(from, to));
    }

    pub fn locate(&mut self, id: &str, file: &str, line: usize) {
        self.locations
            .push((id.to_string(), MappingEntry::with_line(file, line)));
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty() && self.edges.is_empty() && self.locations.is_empty()
    }

    /// `Ok(self)` if anything was found, `Err(Ignored::NoMatch)` otherwise
    pub fn into_outcome(self) -> ParseOutcome {
        if self.is_empty() {
            Err(Ignored::NoMatch)
        } else {
            Ok(self)
        }
    }

    /// Replay the contributions into a graph builder, preserving order
    pub fn apply_to(self, builder: &mut GraphBuilder) {
        for node in self.nodes {
            builder.push_node(node);
        }
        for edge in self.edges {
            builder.push_edge(edge);
        }
        for (id, entry) in self.locations {
            builder.set_location(id, entry);
        }
    }
}

/// Why a parser contributed nothing for a file
///
/// This is a normal outcome of a structural scan, not a failure.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum Ignored {
    /// No line had the expected shape
    #[error("no matching structure")]
    NoMatch,

    /// The document parsed but lacks the section this format needs
    #[error("document has no `{0}` section")]
    NotApplicable(&'static str),

    /// The structured document could not be parsed
    #[error("malformed document: {0}")]
    Malformed(String),
}

pub type ParseOutcome = Result<ParseFragment, Ignored>;

/// A structural parser for one pipeline format
pub trait FormatParser: Send + Sync {
    /// Format handled by this parser
    fn format(&self) -> SourceFormat;

    /// Extract nodes, edges and locations from `content`
    ///
    /// `file` is the absolute path of the file, used for node identity and
    /// source mapping.
    fn parse(&self, content: &str, file: &str) -> ParseOutcome;
}
