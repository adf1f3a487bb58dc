//! Source files harvested from the generator output.

use std::path::{Path, PathBuf};

use serde::Serialize;

/// Marker inserted between the base name and the extension of every
/// harvested source, so `Pet.cs` becomes `Pet.g.cs`.
pub const GENERATED_SUFFIX: &str = "g";

/// A generated source file read from the output directory.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GeneratedFile {
    /// Path relative to the generator output directory
    pub relative_path: PathBuf,
    /// Full file contents
    pub content: String,
}

impl GeneratedFile {
    /// Create a new generated file entry.
    pub fn new(relative_path: impl Into<PathBuf>, content: impl Into<String>) -> Self {
        Self { relative_path: relative_path.into(), content: content.into() }
    }

    /// Name under which this file is added to the compilation.
    pub fn hint_name(&self) -> String { hint_name_for(&self.relative_path) }
}

/// Derive the compilation name for a generated file: `<base name>.g.<ext>`.
///
/// Directory components are dropped. Files without an extension get
/// `<base name>.g`.
pub fn hint_name_for(path: &Path) -> String {
    let stem = path.file_stem().map(|s| s.to_string_lossy()).unwrap_or_default();
    match path.extension() {
        Some(ext) => format!("{}.{}.{}", stem, GENERATED_SUFFIX, ext.to_string_lossy()),
        None => format!("{}.{}", stem, GENERATED_SUFFIX),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hint_name_drops_directories() {
        let file = GeneratedFile::new("src/Controllers/IPetApi.cs", "interface IPetApi {}");
        assert_eq!(file.hint_name(), "IPetApi.g.cs");
    }

    #[test]
    fn test_hint_name_keeps_inner_dots() {
        assert_eq!(hint_name_for(Path::new("Models/Pet.Status.cs")), "Pet.Status.g.cs");
    }

    #[test]
    fn test_hint_name_without_extension() {
        assert_eq!(hint_name_for(Path::new("README")), "README.g");
    }

    #[test]
    fn test_generated_file_serializes_relative_path() {
        let file = GeneratedFile::new("Models/Pet.cs", "class Pet {}");
        let json = serde_json::to_value(&file).expect("Failed to serialize generated file");
        assert_eq!(json["relative_path"], "Models/Pet.cs");
        assert_eq!(json["content"], "class Pet {}");
    }
}
