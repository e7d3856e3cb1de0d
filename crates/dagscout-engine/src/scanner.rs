//! Workspace scanner
//!
//! Parse order is fixed: Python files (Airflow, then Prefect), SQL files,
//! then YAML files (dbt schema, then GitHub Actions). Fragments are merged in
//! that order, which decides which label and location win when ids collide.

use crate::discovery::{discover, DiscoveredFiles};
use dagscout_core::{Config, GraphBuilder, ScanResult};
use dagscout_parsers::{
    AirflowParser, DbtSchemaParser, DbtSqlParser, FormatParser, GithubActionsParser, PrefectParser,
};
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// Scans a project tree for pipeline definitions
pub struct WorkspaceScanner {
    config: Config,

    /// Set from another thread to stop reading further files
    cancel: Option<Arc<AtomicBool>>,

    python_parsers: Vec<Box<dyn FormatParser>>,
    sql_parsers: Vec<Box<dyn FormatParser>>,
    yaml_parsers: Vec<Box<dyn FormatParser>>,
}

impl WorkspaceScanner {
    /// Create a scanner; formats disabled in `config` are not parsed
    pub fn new(config: Config) -> Self {
        let python_parsers = enabled_parsers(
            &config,
            vec![Box::new(AirflowParser), Box::new(PrefectParser)],
        );
        let sql_parsers = enabled_parsers(&config, vec![Box::new(DbtSqlParser)]);
        let yaml_parsers = enabled_parsers(
            &config,
            vec![Box::new(DbtSchemaParser), Box::new(GithubActionsParser)],
        );

        Self {
            config,
            cancel: None,
            python_parsers,
            sql_parsers,
            yaml_parsers,
        }
    }

    /// Stop the scan at the next file boundary once `flag` is set
    pub fn with_cancel_flag(mut self, flag: Arc<AtomicBool>) -> Self {
        self.cancel = Some(flag);
        self
    }

    fn is_cancelled(&self) -> bool {
        self.cancel
            .as_ref()
            .is_some_and(|flag| flag.load(Ordering::Relaxed))
    }

    /// Scan `root` and return the combined graph
    ///
    /// Never fails. Files that can't be read contribute nothing; a root that
    /// can't be read gives an empty graph.
    pub fn scan(&self, root: &Path) -> ScanResult {
        let root = absolute_root(root);
        tracing::info!(root = %root.display(), "Scanning workspace");

        let files = discover(&root, self.config.discovery.follow_links);
        tracing::debug!(
            total = files.total(),
            python = files.python.len(),
            sql = files.sql.len(),
            yaml = files.yaml.len(),
            "Discovered candidate files"
        );

        let mut builder = GraphBuilder::new();
        let completed = self.run(&files, &mut builder);
        let raw_nodes = builder.raw_node_count();
        let result = builder.build();

        if completed {
            tracing::info!(
                nodes = result.nodes.len(),
                duplicates = raw_nodes - result.nodes.len(),
                edges = result.edges.len(),
                "Scan complete"
            );
        } else {
            tracing::info!(nodes = result.nodes.len(), "Scan cancelled");
        }

        result
    }

    /// Parse every candidate in order; false if cancelled part-way
    fn run(&self, files: &DiscoveredFiles, builder: &mut GraphBuilder) -> bool {
        let python = if self.python_parsers.is_empty() {
            Vec::new()
        } else {
            match self.python_queue(files) {
                Some(queue) => queue,
                None => return false,
            }
        };

        let batches: [(&[PathBuf], &[Box<dyn FormatParser>]); 3] = [
            (python.as_slice(), self.python_parsers.as_slice()),
            (files.sql.as_slice(), self.sql_parsers.as_slice()),
            (files.yaml.as_slice(), self.yaml_parsers.as_slice()),
        ];

        for (paths, parsers) in batches {
            if parsers.is_empty() {
                continue;
            }
            for path in paths {
                if self.is_cancelled() {
                    return false;
                }
                self.parse_file(path, parsers, builder);
            }
        }

        true
    }

    /// `*_dag.py` files first, then any `*.py` whose content has a marker
    ///
    /// Returns `None` if cancelled while reading.
    fn python_queue(&self, files: &DiscoveredFiles) -> Option<Vec<PathBuf>> {
        let mut queued: HashSet<&Path> = HashSet::new();
        let mut queue = Vec::new();

        for path in &files.dag_python {
            if queued.insert(path.as_path()) {
                queue.push(path.clone());
            }
        }

        for path in &files.python {
            if queued.contains(path.as_path()) {
                continue;
            }
            if self.is_cancelled() {
                return None;
            }
            let Some(content) = read_source(path) else {
                continue;
            };
            if self.config.discovery.is_pipeline_python(&content) {
                queued.insert(path.as_path());
                queue.push(path.clone());
            }
        }

        Some(queue)
    }

    fn parse_file(&self, path: &Path, parsers: &[Box<dyn FormatParser>], builder: &mut GraphBuilder) {
        let Some(content) = read_source(path) else {
            return;
        };
        let file = path.to_string_lossy();

        for parser in parsers {
            match parser.parse(&content, &file) {
                Ok(fragment) => {
                    tracing::debug!(
                        file = %file,
                        format = %parser.format(),
                        nodes = fragment.nodes.len(),
                        edges = fragment.edges.len(),
                        "Parsed"
                    );
                    fragment.apply_to(builder);
                }
                Err(reason) => {
                    tracing::debug!(file = %file, format = %parser.format(), %reason, "Ignored");
                }
            }
        }
    }
}

impl Default for WorkspaceScanner {
    fn default() -> Self {
        Self::new(Config::default())
    }
}

fn enabled_parsers(
    config: &Config,
    parsers: Vec<Box<dyn FormatParser>>,
) -> Vec<Box<dyn FormatParser>> {
    parsers
        .into_iter()
        .filter(|parser| config.formats.is_enabled(parser.format()))
        .collect()
}

/// Scan `root` with the default configuration
pub fn scan_workspace(root: &Path) -> ScanResult {
    WorkspaceScanner::default().scan(root)
}

/// Read a file as text, replacing invalid UTF-8; `None` if it can't be read
fn read_source(path: &Path) -> Option<String> {
    match std::fs::read(path) {
        Ok(bytes) => Some(String::from_utf8_lossy(&bytes).into_owned()),
        Err(err) => {
            tracing::debug!(file = %path.display(), error = %err, "Skipping unreadable file");
            None
        }
    }
}

/// Mapping entries carry absolute paths, so resolve a relative root first
fn absolute_root(root: &Path) -> PathBuf {
    if root.is_absolute() {
        return root.to_path_buf();
    }
    std::env::current_dir()
        .map(|cwd| cwd.join(root))
        .unwrap_or_else(|_| root.to_path_buf())
}
