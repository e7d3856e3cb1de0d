//! GitHub Actions workflow parser
//!
//! Jobs become nodes; `needs` becomes edges from the needed job to the job.

use crate::fragment::{FormatParser, Ignored, ParseFragment, ParseOutcome};
use dagscout_core::{identity, SourceFormat};
use serde_yaml::Value;

const JOB_LINE: usize = 1;

/// GitHub Actions workflows
pub struct GithubActionsParser;

impl GithubActionsParser {
    /// Job keys are usually strings, but YAML allows bare numbers and booleans
    fn job_name(key: &Value) -> Option<String> {
        match key {
            Value::String(s) => Some(s.clone()),
            Value::Number(n) => Some(n.to_string()),
            Value::Bool(b) => Some(b.to_string()),
            _ => None,
        }
    }

    /// Job names listed in `needs`, which is either one string or a list
    fn needs(job: &Value) -> Vec<&str> {
        match job.get("needs") {
            Some(Value::String(single)) => vec![single.as_str()],
            Some(Value::Sequence(list)) => list.iter().filter_map(Value::as_str).collect(),
            _ => Vec::new(),
        }
    }
}

impl FormatParser for GithubActionsParser {
    fn format(&self) -> SourceFormat {
        SourceFormat::GithubActions
    }

    fn parse(&self, content: &str, file: &str) -> ParseOutcome {
        let doc: Value =
            serde_yaml::from_str(content).map_err(|e| Ignored::Malformed(e.to_string()))?;

        let jobs = doc
            .get("jobs")
            .and_then(Value::as_mapping)
            .ok_or(Ignored::NotApplicable("jobs"))?;

        let mut fragment = ParseFragment::new();

        for (key, job) in jobs {
            let Some(name) = Self::job_name(key) else {
                continue;
            };

            let job_id = identity(file, &name);
            fragment.add_node(&job_id, &name);
            fragment.locate(&job_id, file, JOB_LINE);

            for needed in Self::needs(job) {
                let needed_id = identity(file, needed);
                fragment.add_node(&needed_id, needed);
                fragment.locate(&needed_id, file, JOB_LINE);
                fragment.add_edge(&needed_id, &job_id);
            }
        }

        fragment.into_outcome()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use dagscout_core::Edge;
    use pretty_assertions::assert_eq;

    const FILE: &str = "/repo/.github/workflows/ci.yml";

    fn id(name: &str) -> String {
        identity(FILE, name)
    }

    #[test]
    fn needs_as_string() {
        let content = "jobs:\n  build: {}\n  test:\n    needs: build\n";
        let fragment = GithubActionsParser.parse(content, FILE).unwrap();

        let labels: Vec<_> = fragment.nodes.iter().map(|n| n.display_label()).collect();
        assert_eq!(labels, vec!["build", "test", "build"]);
        assert_eq!(fragment.edges, vec![Edge::new(id("build"), id("test"))]);
    }

    #[test]
    fn needs_as_list() {
        let content = "\
name: CI
on: [push]
jobs:
  lint:
    runs-on: ubuntu-latest
  build:
    runs-on: ubuntu-latest
  deploy:
    needs: [lint, build]
    runs-on: ubuntu-latest
";
        let fragment = GithubActionsParser.parse(content, FILE).unwrap();

        assert_eq!(
            fragment.edges,
            vec![
                Edge::new(id("lint"), id("deploy")),
                Edge::new(id("build"), id("deploy")),
            ]
        );
    }

    #[test]
    fn non_string_needs_entries_are_skipped() {
        let content = "jobs:\n  a: {}\n  b:\n    needs: [a, {x: 1}]\n";
        let fragment = GithubActionsParser.parse(content, FILE).unwrap();
        assert_eq!(fragment.edges, vec![Edge::new(id("a"), id("b"))]);
    }

    #[test]
    fn empty_job_body() {
        let content = "jobs:\n  build:\n  test:\n    needs: build\n";
        let fragment = GithubActionsParser.parse(content, FILE).unwrap();
        assert_eq!(fragment.edges.len(), 1);
    }

    #[test]
    fn numeric_job_key() {
        let content = "jobs:\n  1: {}\n";
        let fragment = GithubActionsParser.parse(content, FILE).unwrap();
        assert_eq!(fragment.nodes[0].label.as_deref(), Some("1"));
    }

    #[test]
    fn dbt_schema_is_not_a_workflow() {
        let content = "version: 2\nmodels:\n  - name: customers\n";
        assert_eq!(
            GithubActionsParser.parse(content, FILE),
            Err(Ignored::NotApplicable("jobs"))
        );
    }

    #[test]
    fn jobs_must_be_a_mapping() {
        assert_eq!(
            GithubActionsParser.parse("jobs: [build, test]\n", FILE),
            Err(Ignored::NotApplicable("jobs"))
        );
    }

    #[test]
    fn malformed_workflow() {
        let outcome = GithubActionsParser.parse("jobs:\n  build: {\n", FILE);
        assert!(matches!(outcome, Err(Ignored::Malformed(_))));
    }

    #[test]
    fn empty_jobs_mapping_is_no_match() {
        assert_eq!(GithubActionsParser.parse("jobs: {}\n", FILE), Err(Ignored::NoMatch));
    }
}
