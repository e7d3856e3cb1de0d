//! dbt project parsers
//!
//! SQL models are named after their file and depend on every `ref()` they
//! call. YAML schema files declare models under a top-level `models` list.

use crate::fragment::{FormatParser, Ignored, ParseFragment, ParseOutcome};
use dagscout_core::{identity, SourceFormat};
use once_cell::sync::Lazy;
use regex::Regex;
use serde_yaml::Value;
use std::path::Path;

/// `ref('model')` or `ref("model")`, model names limited to ASCII word characters, `.` and `-`
static REF_CALL: Lazy<Regex> =
    Lazy::new(|| Regex::new(r#"ref\(["']((?-u:[\w.\-])+)["']\)"#).expect("valid regex"));

/// dbt models carry no meaningful line, point at the top of the file
const MODEL_LINE: usize = 1;

/// dbt SQL models
pub struct DbtSqlParser;

impl DbtSqlParser {
    /// Model name: file name without the `.sql` extension
    fn model_name(file: &str) -> &str {
        let base = Path::new(file)
            .file_name()
            .and_then(|name| name.to_str())
            .unwrap_or(file);
        base.strip_suffix(".sql").unwrap_or(base)
    }
}

impl FormatParser for DbtSqlParser {
    fn format(&self) -> SourceFormat {
        SourceFormat::DbtSql
    }

    /// Every SQL file is a model, so this never returns `Ignored`
    fn parse(&self, content: &str, file: &str) -> ParseOutcome {
        let mut fragment = ParseFragment::new();

        let model = Self::model_name(file);
        let model_id = identity(file, model);
        fragment.add_node(&model_id, model);
        fragment.locate(&model_id, file, MODEL_LINE);

        for caps in REF_CALL.captures_iter(content) {
            let Some(target) = caps.get(1).map(|m| m.as_str()) else {
                continue;
            };

            let target_id = identity(file, target);
            fragment.add_node(&target_id, target);
            fragment.locate(&target_id, file, MODEL_LINE);
            fragment.add_edge(&target_id, &model_id);
        }

        Ok(fragment)
    }
}

/// dbt YAML schema files
pub struct DbtSchemaParser;

impl FormatParser for DbtSchemaParser {
    fn format(&self) -> SourceFormat {
        SourceFormat::DbtSchema
    }

    fn parse(&self, content: &str, file: &str) -> ParseOutcome {
        let doc: Value =
            serde_yaml::from_str(content).map_err(|e| Ignored::Malformed(e.to_string()))?;

        let models = doc
            .get("models")
            .and_then(Value::as_sequence)
            .ok_or(Ignored::NotApplicable("models"))?;

        let mut fragment = ParseFragment::new();

        for model in models {
            let Some(name) = model.get("name").and_then(Value::as_str) else {
                continue;
            };
            if name.is_empty() {
                continue;
            }

            let id = identity(file, name);
            fragment.add_node(&id, name);
            fragment.locate(&id, file, MODEL_LINE);
        }

        fragment.into_outcome()
    }
}
