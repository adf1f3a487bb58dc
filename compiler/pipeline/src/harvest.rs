//! Collection of generated sources from the output directory.

use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

use types::GeneratedFile;
use walkdir::WalkDir;

use crate::{PipelineError, Result};

/// Extension of the sources the aspnetcore target produces.
pub const DEFAULT_SOURCE_EXTENSION: &str = "cs";

/// Reads every generated source under an output directory
#[derive(Debug, Clone)]
pub struct OutputHarvester {
    extension: String,
}

impl Default for OutputHarvester {
    fn default() -> Self { Self::new(DEFAULT_SOURCE_EXTENSION) }
}

impl OutputHarvester {
    /// Harvest files whose extension is `extension` (without the dot).
    pub fn new(extension: impl Into<String>) -> Self { Self { extension: extension.into() } }

    /// Extension being harvested.
    pub fn extension(&self) -> &str { &self.extension }

    /// Collect every matching file under `output_dir`.
    ///
    /// Files are visited depth-first, sorted by name at each level. The whole
    /// set is read before anything is returned; any failure discards it.
    pub fn harvest(&self, output_dir: &Path) -> Result<Vec<GeneratedFile>> {
        let mut files = Vec::new();
        let mut hint_names: HashMap<String, PathBuf> = HashMap::new();

        for entry in WalkDir::new(output_dir).sort_by_file_name() {
            let entry = entry?;
            if !entry.file_type().is_file() || !self.matches(entry.path()) {
                continue;
            }

            let content = fs::read_to_string(entry.path()).map_err(|source| {
                PipelineError::Harvest { path: entry.path().to_path_buf(), source }
            })?;
            let relative_path = pathdiff::diff_paths(entry.path(), output_dir)
                .unwrap_or_else(|| entry.path().to_path_buf());
            let file = GeneratedFile::new(relative_path, content);

            if let Some(first) = hint_names.insert(file.hint_name(), file.relative_path.clone()) {
                return Err(PipelineError::DuplicateHintName {
                    hint_name: file.hint_name(),
                    first,
                    second: file.relative_path,
                });
            }
            files.push(file);
        }

        Ok(files)
    }

    fn matches(&self, path: &Path) -> bool {
        path.extension()
            .and_then(|ext| ext.to_str())
            .map_or(false, |ext| ext.eq_ignore_ascii_case(&self.extension))
    }
}
