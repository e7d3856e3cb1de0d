//! DagScout Workspace Engine
//!
//! Discovers pipeline definition files under a project root, runs the format
//! parsers over them and merges everything into one deduplicated graph.
//! A scan never fails: unreadable files and unparsable documents are skipped.

pub mod discovery;
pub mod scanner;

pub use discovery::{discover, DiscoveredFiles};
pub use scanner::{scan_workspace, WorkspaceScanner};
