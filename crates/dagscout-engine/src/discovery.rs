//! Candidate file discovery
//!
//! Walks the whole tree with no directory exclusions. Entries are visited in
//! file-name order so repeated scans of the same tree see files in the same
//! order.

use std::path::{Path, PathBuf};
use walkdir::{DirEntry, WalkDir};

/// Airflow DAG files, parsed without a content check
const DAG_FILE_SUFFIX: &str = "_dag.py";

/// Files found under a root, bucketed by how they will be parsed
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DiscoveredFiles {
    /// `*_dag.py`
    pub dag_python: Vec<PathBuf>,

    /// Every `*.py`, `*_dag.py` included
    pub python: Vec<PathBuf>,

    /// `*.sql`
    pub sql: Vec<PathBuf>,

    /// `*.yml` (`*.yaml` is not matched)
    pub yaml: Vec<PathBuf>,
}

impl DiscoveredFiles {
    pub fn total(&self) -> usize {
        self.python.len() + self.sql.len() + self.yaml.len()
    }
}

/// Walk `root` and collect candidate files
///
/// A missing or unreadable root yields no files.
pub fn discover(root: &Path, follow_links: bool) -> DiscoveredFiles {
    let mut files = DiscoveredFiles::default();

    for entry in WalkDir::new(root)
        .follow_links(follow_links)
        .sort_by_file_name()
        .into_iter()
        .filter_map(|e| match e {
            Ok(entry) => Some(entry),
            Err(err) => {
                tracing::debug!(error = %err, "Skipping unreadable entry");
                None
            }
        })
    {
        if !is_candidate_file(&entry) {
            continue;
        }

        let Some(name) = entry.file_name().to_str() else {
            continue;
        };
        let path = entry.path().to_path_buf();

        if name.ends_with(".py") {
            if name.ends_with(DAG_FILE_SUFFIX) {
                files.dag_python.push(path.clone());
            }
            files.python.push(path);
        } else if name.ends_with(".sql") {
            files.sql.push(path);
        } else if name.ends_with(".yml") {
            files.yaml.push(path);
        }
    }

    files
}

/// Regular files, and symlinks unless they point at a directory
///
/// Dangling links are kept: reading them fails later and the file is skipped.
fn is_candidate_file(entry: &DirEntry) -> bool {
    let file_type = entry.file_type();
    if file_type.is_file() {
        return true;
    }
    if !file_type.is_symlink() {
        return false;
    }
    !std::fs::metadata(entry.path()).is_ok_and(|meta| meta.is_dir())
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::fs;

    fn touch(root: &Path, rel: &str) {
        let path = root.join(rel);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).unwrap();
        }
        fs::write(path, "").unwrap();
    }

    #[test]
    fn buckets_by_extension() {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path();
        touch(root, "dags/etl_dag.py");
        touch(root, "dags/helpers.py");
        touch(root, "models/orders.sql");
        touch(root, ".github/workflows/ci.yml");
        touch(root, "models/schema.yaml");
        touch(root, "README.md");

        let files = discover(root, false);

        assert_eq!(files.dag_python, vec![root.join("dags/etl_dag.py")]);
        assert_eq!(
            files.python,
            vec![root.join("dags/etl_dag.py"), root.join("dags/helpers.py")]
        );
        assert_eq!(files.sql, vec![root.join("models/orders.sql")]);
        assert_eq!(files.yaml, vec![root.join(".github/workflows/ci.yml")]);
        assert_eq!(files.total(), 4);
    }

    #[test]
    fn vendor_directories_are_not_excluded() {
        let dir = tempfile::tempdir().unwrap();
        touch(dir.path(), "node_modules/pkg/build_dag.py");
        touch(dir.path(), ".venv/lib/site.py");

        let files = discover(dir.path(), false);
        assert_eq!(files.python.len(), 2);
        assert_eq!(files.dag_python.len(), 1);
    }

    #[test]
    fn order_is_stable() {
        let dir = tempfile::tempdir().unwrap();
        for name in ["c.sql", "a.sql", "b/z.sql", "b/a.sql"] {
            touch(dir.path(), name);
        }

        let first = discover(dir.path(), false);
        let second = discover(dir.path(), false);
        assert_eq!(first, second);
        assert_eq!(
            first.sql,
            vec![
                dir.path().join("a.sql"),
                dir.path().join("b/a.sql"),
                dir.path().join("b/z.sql"),
                dir.path().join("c.sql"),
            ]
        );
    }

    #[cfg(unix)]
    #[test]
    fn symlinked_files_are_discovered() {
        use std::os::unix::fs::symlink;

        let dir = tempfile::tempdir().unwrap();
        let root = dir.path();
        touch(root, "shared/orders.sql");
        fs::create_dir_all(root.join("models")).unwrap();
        symlink(root.join("shared/orders.sql"), root.join("models/orders.sql")).unwrap();
        symlink(root.join("shared/gone_dag.py"), root.join("models/gone_dag.py")).unwrap();
        symlink(root.join("shared"), root.join("linked_dir.sql")).unwrap();

        let files = discover(root, false);

        assert_eq!(
            files.sql,
            vec![root.join("models/orders.sql"), root.join("shared/orders.sql")]
        );
        assert_eq!(files.dag_python, vec![root.join("models/gone_dag.py")]);
    }

    #[test]
    fn missing_root_is_empty() {
        let files = discover(Path::new("/definitely/not/here"), false);
        assert_eq!(files, DiscoveredFiles::default());
    }
}
