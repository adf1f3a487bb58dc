// SPDX-License-Identifier: CC0-1.0

//! Path utility functions for finding project roots and resolving paths.
//!
//! Resolution here is purely lexical. Nothing is canonicalized and the
//! resolved files do not have to exist yet.

use std::path::{Component, Path, PathBuf};

/// Find the nearest project root by looking for a `Cargo.toml`
///
/// This function walks up the directory tree from `start` until it finds a
/// directory containing a `Cargo.toml` file.
///
/// # Returns
///
/// Returns `Result<PathBuf>` containing the path to the project root directory.
/// Returns an error if no ancestor contains a `Cargo.toml`.
pub fn find_project_root(start: &Path) -> Result<PathBuf, Box<dyn std::error::Error>> {
    let mut current = absolutize(start)?;
    loop {
        if current.join("Cargo.toml").is_file() {
            return Ok(current);
        }
        if !current.pop() {
            return Err(format!(
                "Could not find project root (no Cargo.toml above {})",
                start.display()
            )
            .into());
        }
    }
}

/// Make `path` absolute against the process working directory.
///
/// Absolute paths are only normalized.
pub fn absolutize(path: &Path) -> std::io::Result<PathBuf> {
    if path.is_absolute() {
        return Ok(normalize_lexically(path));
    }
    let cwd = std::env::current_dir()?;
    Ok(normalize_lexically(&cwd.join(path)))
}

/// Resolve a property value against a root directory
///
/// # Arguments
///
/// * `root` - Absolute directory relative values are joined onto
/// * `value` - Path as given by the build configuration (relative or absolute)
///
/// # Returns
///
/// `value` itself when it is already absolute, otherwise `root` joined with
/// `value`. Either way `.` and `..` components are folded.
///
/// # Examples
///
/// ```
/// use std::path::Path;
/// use servergen_path::resolve_against;
///
/// let root = Path::new("/work/app");
/// assert_eq!(resolve_against(root, Path::new("api/spec.yaml")), Path::new("/work/app/api/spec.yaml"));
/// assert_eq!(resolve_against(root, Path::new("../shared/spec.yaml")), Path::new("/work/shared/spec.yaml"));
/// assert_eq!(resolve_against(root, Path::new("/etc/spec.yaml")), Path::new("/etc/spec.yaml"));
/// ```
pub fn resolve_against(root: &Path, value: &Path) -> PathBuf {
    if value.is_absolute() {
        normalize_lexically(value)
    } else {
        normalize_lexically(&root.join(value))
    }
}

/// Fold `.` and `..` components without touching the filesystem.
///
/// `..` at the root stays at the root, matching how the OS treats `/..`.
pub fn normalize_lexically(path: &Path) -> PathBuf {
    let mut out = PathBuf::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                let at_root = matches!(
                    out.components().next_back(),
                    None | Some(Component::RootDir) | Some(Component::Prefix(_))
                );
                if at_root {
                    if !path.has_root() {
                        out.push("..");
                    }
                } else if matches!(out.components().next_back(), Some(Component::ParentDir)) {
                    out.push("..");
                } else {
                    out.pop();
                }
            }
            other => out.push(other.as_os_str()),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use std::fs;

    use super::*;

    #[test]
    fn test_normalize_lexically() {
        assert_eq!(normalize_lexically(Path::new("/a/./b/../c")), PathBuf::from("/a/c"));
        assert_eq!(normalize_lexically(Path::new("/../a")), PathBuf::from("/a"));
        assert_eq!(normalize_lexically(Path::new("a/../../b")), PathBuf::from("../b"));
        assert_eq!(normalize_lexically(Path::new("../../b")), PathBuf::from("../../b"));
    }

    #[test]
    fn test_resolve_against_relative_and_absolute() {
        let root = std::env::temp_dir().join("project");
        assert_eq!(
            resolve_against(&root, Path::new("openapi/config.json")),
            root.join("openapi").join("config.json")
        );

        let absolute = std::env::temp_dir().join("elsewhere").join("spec.yaml");
        assert_eq!(resolve_against(&root, &absolute), absolute);
    }

    #[test]
    fn test_absolutize_relative_uses_cwd() {
        let cwd = std::env::current_dir().expect("Failed to get current directory");
        let resolved = absolutize(Path::new("some/file.txt")).expect("Failed to absolutize");
        assert!(resolved.is_absolute());
        assert_eq!(resolved, normalize_lexically(&cwd.join("some/file.txt")));
    }

    #[test]
    fn test_find_project_root_walks_up() {
        let temp_dir = tempfile::tempdir().expect("Failed to create temporary directory");
        fs::write(temp_dir.path().join("Cargo.toml"), "[package]\nname = \"app\"\n")
            .expect("Failed to write Cargo.toml");
        let nested = temp_dir.path().join("src").join("api");
        fs::create_dir_all(&nested).expect("Failed to create nested directories");

        let root = find_project_root(&nested).expect("Failed to find project root");
        assert_eq!(root, normalize_lexically(temp_dir.path()));
    }
}
