//! Path guard for file-writing tools.
//!
//! Resolves a model-supplied filename to an absolute path and checks it
//! against forbidden prefixes and (optionally) allowed roots. Relative names
//! resolve against the process working directory.

use std::path::{Component, Path, PathBuf};

/// Error returned when a path is rejected.
#[derive(Debug, thiserror::Error)]
pub enum PathError {
    #[error("path '{path}' is outside the allowed roots")]
    OutsideAllowedRoots { path: String },

    #[error("path '{path}' is under forbidden prefix '{prefix}'")]
    Forbidden { path: String, prefix: String },

    #[error("path '{path}' contains a parent-directory component")]
    Traversal { path: String },

    #[error("cannot resolve path '{path}': {reason}")]
    Unresolvable { path: String, reason: String },
}

/// Write-path policy for a tool.
#[derive(Debug, Clone, Default)]
pub struct PathGuard {
    allowed_roots: Vec<(String, PathBuf)>,
    forbidden: Vec<(String, PathBuf)>,
}

impl PathGuard {
    /// A guard that only rejects parent-directory traversal.
    pub fn unrestricted() -> Self {
        Self::default()
    }

    pub fn new(allowed_roots: &[String], forbidden_paths: &[String]) -> Self {
        let prepare = |raw: &String| (raw.clone(), normalize(&resolve_existing(&expand_tilde(raw))));
        Self {
            allowed_roots: allowed_roots.iter().map(prepare).collect(),
            forbidden: forbidden_paths.iter().map(prepare).collect(),
        }
    }

    /// Resolve `path` and check it against the policy.
    ///
    /// Forbidden prefixes win over allowed roots.
    pub fn resolve(&self, path: &str) -> Result<PathBuf, PathError> {
        let input = Path::new(path);
        if input.components().any(|c| matches!(c, Component::ParentDir)) {
            return Err(PathError::Traversal { path: path.into() });
        }

        let absolute = if input.is_absolute() {
            input.to_path_buf()
        } else {
            std::env::current_dir()
                .map_err(|e| PathError::Unresolvable {
                    path: path.into(),
                    reason: e.to_string(),
                })?
                .join(input)
        };

        let resolved = resolve_existing(&absolute);
        let comparable = normalize(&resolved);

        if let Some((prefix, _)) = self
            .forbidden
            .iter()
            .find(|(_, forbidden)| comparable.starts_with(forbidden))
        {
            return Err(PathError::Forbidden {
                path: path.into(),
                prefix: prefix.clone(),
            });
        }

        if !self.allowed_roots.is_empty()
            && !self.allowed_roots.iter().any(|(_, root)| comparable.starts_with(root))
        {
            return Err(PathError::OutsideAllowedRoots { path: path.into() });
        }

        Ok(resolved)
    }
}

/// Canonicalize the longest existing ancestor and re-append the rest, so
/// symlinked directories resolve even when the file doesn't exist yet.
fn resolve_existing(path: &Path) -> PathBuf {
    let mut existing = path;
    let mut rest = Vec::new();
    loop {
        if let Ok(canonical) = existing.canonicalize() {
            return rest.iter().rev().fold(canonical, |acc, part| acc.join(part));
        }
        match (existing.parent(), existing.file_name()) {
            (Some(parent), Some(name)) => {
                rest.push(name.to_os_string());
                existing = parent;
            }
            _ => return path.to_path_buf(),
        }
    }
}

/// Lowercased, forward-slash form used only for prefix comparison.
fn normalize(path: &Path) -> PathBuf {
    let text = path.to_string_lossy().replace('\\', "/").to_lowercase();
    // canonicalize() on Windows adds the \\?\ prefix
    PathBuf::from(text.strip_prefix("//?/").unwrap_or(&text))
}

fn expand_tilde(path: &str) -> PathBuf {
    if path == "~" || path.starts_with("~/") {
        let home = if cfg!(target_os = "windows") {
            std::env::var("USERPROFILE")
        } else {
            std::env::var("HOME")
        };
        if let Ok(home) = home {
            return PathBuf::from(path.replacen('~', &home, 1));
        }
    }
    PathBuf::from(path)
}
