//! Structural parsers for pipeline definition formats
//!
//! Each parser turns one file's text into a [`ParseFragment`] of nodes, edges
//! and source locations. Parsers are best-effort: text that doesn't have the
//! expected shape yields [`Ignored`], never an error or a panic.
//!
//! Supported formats:
//! - Airflow operator assignments and `>>` chains
//! - Prefect `@task` functions
//! - dbt SQL models (`ref()` calls) and dbt YAML schemas
//! - GitHub Actions workflows (`jobs` / `needs`)

pub mod fragment;
pub mod python;
pub mod dbt;
pub mod github;

pub use fragment::{FormatParser, Ignored, ParseFragment, ParseOutcome};
pub use python::{AirflowParser, PrefectParser};
pub use dbt::{DbtSchemaParser, DbtSqlParser};
pub use github::GithubActionsParser;
