//! Python pipeline parsers (Airflow and Prefect)
//!
//! Both work line by line. Airflow tasks are operator assignments wired with
//! `>>`; Prefect tasks are functions decorated with `@task`.

use crate::fragment::{FormatParser, ParseFragment, ParseOutcome};
use dagscout_core::{identity, SourceFormat};
use once_cell::sync::Lazy;
use regex::Regex;
use std::collections::HashMap;

/// `<name> = <Something>Operator(`
///
/// Word characters are ASCII-only, consistent with [`IDENTIFIER`].
static OPERATOR_ASSIGNMENT: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"((?-u:\w)+)\s*=\s*(?-u:\w)*Operator\(").expect("valid regex")
});

static IDENTIFIER: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"[A-Za-z_][A-Za-z0-9_]*").expect("valid regex"));

/// `def <name>(`
static FUNCTION_DEF: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"def\s+((?-u:\w)+)\s*\(").expect("valid regex"));

const UPSTREAM_OPERATOR: &str = ">>";

/// Airflow DAG files
pub struct AirflowParser;

impl AirflowParser {
    /// First identifier-like token in a chain segment
    fn first_identifier(segment: &str) -> Option<&str> {
        IDENTIFIER.find(segment).map(|m| m.as_str())
    }
}

impl FormatParser for AirflowParser {
    fn format(&self) -> SourceFormat {
        SourceFormat::Airflow
    }

    fn parse(&self, content: &str, file: &str) -> ParseOutcome {
        let mut fragment = ParseFragment::new();
        // Task variable -> node id, for this file only
        let mut tasks: HashMap<&str, String> = HashMap::new();

        for (idx, line) in content.lines().enumerate() {
            if let Some(caps) = OPERATOR_ASSIGNMENT.captures(line) {
                if let Some(name) = caps.get(1).map(|m| m.as_str()) {
                    let id = identity(file, name);
                    fragment.add_node(&id, name);
                    fragment.locate(&id, file, idx + 1);
                    tasks.insert(name, id);
                }
            }

            if line.contains(UPSTREAM_OPERATOR) {
                let tokens: Vec<Option<&str>> = line
                    .split(UPSTREAM_OPERATOR)
                    .map(|segment| Self::first_identifier(segment.trim()))
                    .collect();

                for pair in tokens.windows(2) {
                    let (Some(upstream), Some(downstream)) = (pair[0], pair[1]) else {
                        continue;
                    };

                    let up_id = tasks
                        .get(upstream)
                        .cloned()
                        .unwrap_or_else(|| identity(file, upstream));
                    let down_id = tasks
                        .get(downstream)
                        .cloned()
                        .unwrap_or_else(|| identity(file, downstream));

                    fragment.add_node(&up_id, upstream);
                    fragment.add_node(&down_id, downstream);
                    fragment.add_edge(&up_id, &down_id);
                }
            }
        }

        fragment.into_outcome()
    }
}

/// Prefect flows
pub struct PrefectParser;

impl FormatParser for PrefectParser {
    fn format(&self) -> SourceFormat {
        SourceFormat::Prefect
    }

    fn parse(&self, content: &str, file: &str) -> ParseOutcome {
        let mut fragment = ParseFragment::new();
        let lines: Vec<&str> = content.lines().collect();

        for (idx, line) in lines.iter().enumerate() {
            if !line.trim().starts_with("@task") {
                continue;
            }

            // The decorated definition must be on the very next line
            let Some(caps) = lines.get(idx + 1).and_then(|next| FUNCTION_DEF.captures(next)) else {
                continue;
            };

            if let Some(name) = caps.get(1).map(|m| m.as_str()) {
                let id = identity(file, name);
                fragment.add_node(&id, name);
                fragment.locate(&id, file, idx + 2);
            }
        }

        fragment.into_outcome()
    }
}
