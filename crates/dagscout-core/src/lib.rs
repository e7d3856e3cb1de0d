//! DagScout Core
//!
//! Shared domain model for pipeline graph extraction: nodes, edges,
//! source mapping, node identity and configuration.
//! Node ids are part of the output contract - never change the identity scheme.

pub mod identity;
pub mod graph;
pub mod format;
pub mod config;

pub use identity::identity;
pub use graph::{Node, Edge, MappingEntry, ScanResult, ScanSummary, GraphBuilder};
pub use format::SourceFormat;
pub use config::{Config, ConfigError, DiscoveryConfig, FormatToggles};
