use std::path::{Path, PathBuf};
use ignore::WalkBuilder;
use tracing::warn;

use crate::config::CollectionConfig;
use crate::error::{ClassdotError, Result};

/// Walks a source root and returns the ordered set of TypeScript files
/// to analyze, after applying the configured exclusion rules.
pub struct SourceCollector {
    config: CollectionConfig,
}

impl SourceCollector {
    pub fn new(config: &CollectionConfig) -> Self {
        Self {
            config: config.clone(),
        }
    }

    /// Collect source files under `root`, sorted by path so downstream
    /// output is stable across runs.
    pub fn collect<P: AsRef<Path>>(&self, root: P) -> Result<Vec<PathBuf>> {
        let root = root.as_ref();
        if !root.exists() {
            return Err(ClassdotError::Usage(format!(
                "source root {} does not exist",
                root.display()
            )));
        }

        let mut files = Vec::new();

        // Respect .gitignore on top of the configured exclusions
        let walker = WalkBuilder::new(root)
            .hidden(false)
            .git_ignore(true)
            .build();

        for entry in walker {
            let entry = entry.map_err(|e| ClassdotError::FileSystem(e.to_string()))?;
            let path = entry.path();

            if path.is_file() && self.should_collect(path) {
                files.push(path.to_path_buf());
            }
        }

        files.sort();
        Ok(files)
    }

    fn should_collect(&self, path: &Path) -> bool {
        let extension = match path.extension().and_then(|ext| ext.to_str()) {
            Some(ext) => ext,
            None => return false,
        };
        if extension != "ts" && extension != "tsx" {
            return false;
        }

        let file_name = path
            .file_name()
            .and_then(|n| n.to_str())
            .unwrap_or_default();
        if self
            .config
            .ignore_file_patterns
            .iter()
            .any(|pattern| file_name.ends_with(pattern.as_str()))
        {
            return false;
        }

        if path.components().any(|component| {
            component
                .as_os_str()
                .to_str()
                .map(|name| self.config.ignore_dirs.iter().any(|dir| dir == name))
                .unwrap_or(false)
        }) {
            return false;
        }

        match std::fs::metadata(path) {
            Ok(metadata) if metadata.len() as usize > self.config.max_file_size => {
                warn!("Skipping {}: exceeds maximum file size", path.display());
                false
            }
            Ok(_) => true,
            Err(_) => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use std::fs;

    fn write(dir: &Path, rel: &str, content: &str) {
        let path = dir.join(rel);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, content).unwrap();
    }

    #[test]
    fn test_collects_ts_files_sorted() {
        let dir = tempfile::tempdir().unwrap();
        write(dir.path(), "b.ts", "export class B {}");
        write(dir.path(), "a.ts", "export class A {}");
        write(dir.path(), "notes.md", "not source");

        let collector = SourceCollector::new(&Config::default().collection);
        let files = collector.collect(dir.path()).unwrap();

        let names: Vec<_> = files
            .iter()
            .map(|p| p.file_name().unwrap().to_str().unwrap().to_string())
            .collect();
        assert_eq!(names, vec!["a.ts", "b.ts"]);
    }

    #[test]
    fn test_applies_exclusion_rules() {
        let dir = tempfile::tempdir().unwrap();
        write(dir.path(), "app.component.ts", "export class AppComponent {}");
        write(dir.path(), "app.component.spec.ts", "describe()");
        write(dir.path(), "types.d.ts", "declare module x;");
        write(dir.path(), "node_modules/lib/index.ts", "export class Lib {}");

        let collector = SourceCollector::new(&Config::default().collection);
        let files = collector.collect(dir.path()).unwrap();

        assert_eq!(files.len(), 1);
        assert!(files[0].ends_with("app.component.ts"));
    }

    #[test]
    fn test_missing_root_is_a_usage_error() {
        let collector = SourceCollector::new(&Config::default().collection);
        let result = collector.collect("/definitely/not/a/real/path");
        assert!(matches!(result, Err(ClassdotError::Usage(_))));
    }
}
