//! Pipeline definition formats recognized by the scanner

use serde::{Deserialize, Serialize};

/// A pipeline definition format
///
/// The string forms are used in `dagscout.toml` and in logs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SourceFormat {
    /// Airflow operator assignments and `>>` chains
    Airflow,

    /// Prefect `@task` decorated functions
    Prefect,

    /// dbt SQL models with `ref()` calls
    DbtSql,

    /// dbt YAML schema files (`models:` list)
    DbtSchema,

    /// GitHub Actions workflows (`jobs:` mapping)
    GithubActions,
}

impl SourceFormat {
    /// All formats, in the order the scanner runs them
    pub const ALL: [SourceFormat; 5] = [
        Self::Airflow,
        Self::Prefect,
        Self::DbtSql,
        Self::DbtSchema,
        Self::GithubActions,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Airflow => "airflow",
            Self::Prefect => "prefect",
            Self::DbtSql => "dbt_sql",
            Self::DbtSchema => "dbt_schema",
            Self::GithubActions => "github_actions",
        }
    }
}

impl std::fmt::Display for SourceFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
