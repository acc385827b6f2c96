//! Path validation for deployer-supplied file names.
//!
//! Lifecycle scripts delete files named by manifest properties. The helpers
//! here confine those names to a fixed directory using purely lexical
//! normalization: nothing touches the filesystem and symlinks are not
//! resolved.

use std::path::{Component, Path, PathBuf};

/// Resolves `.` and `..` components without consulting the filesystem.
///
/// `..` at the root of an absolute path stays at the root, as the kernel
/// does. `..` that climbs above the start of a relative path cannot be
/// represented and yields `None`.
///
/// ```
/// use jobrender::utils::path_validation::normalize_lexically;
/// use std::path::{Path, PathBuf};
///
/// assert_eq!(
///     normalize_lexically(Path::new("/etc/rsyslog.d/../../var/log/syslog")),
///     Some(PathBuf::from("/var/log/syslog"))
/// );
/// assert_eq!(normalize_lexically(Path::new("../escape")), None);
/// ```
#[must_use]
pub fn normalize_lexically(path: &Path) -> Option<PathBuf> {
    let mut normalized = PathBuf::new();
    let mut depth: usize = 0;

    for component in path.components() {
        match component {
            Component::Prefix(prefix) => normalized.push(prefix.as_os_str()),
            Component::RootDir => normalized.push(Component::RootDir.as_os_str()),
            Component::CurDir => {}
            Component::ParentDir => {
                if depth > 0 {
                    normalized.pop();
                    depth -= 1;
                } else if !normalized.has_root() {
                    return None;
                }
            }
            Component::Normal(name) => {
                normalized.push(name);
                depth += 1;
            }
        }
    }

    Some(normalized)
}

/// Whether `path` lies strictly inside `base`.
///
/// Both paths are normalized first. The comparison is per component, so
/// `/etc/rsyslog.d-evil` is not inside `/etc/rsyslog.d`, and `base` itself is
/// not considered inside.
#[must_use]
pub fn is_within_directory(path: &Path, base: &Path) -> bool {
    let (Some(path), Some(base)) = (normalize_lexically(path), normalize_lexically(base)) else {
        return false;
    };
    path != base && path.starts_with(&base)
}

/// Filters deletion requests down to entries inside `base`.
///
/// Each entry is joined to `base` (an absolute entry replaces it, as
/// [`Path::join`] does), normalized, and kept only if the result stays
/// strictly inside `base`. Entries that escape, are empty, or name `base`
/// itself are dropped with a warning. The function never fails, so a single
/// bad entry cannot stop a boot-time script from cleaning up the rest.
///
/// ```
/// use jobrender::utils::path_validation::sanitize_cleanup_paths;
/// use std::path::{Path, PathBuf};
///
/// let kept = sanitize_cleanup_paths(
///     Path::new("/etc/rsyslog.d"),
///     &["../../var/log/syslog", "00-default.conf"],
/// );
/// assert_eq!(kept, vec![PathBuf::from("/etc/rsyslog.d/00-default.conf")]);
/// ```
pub fn sanitize_cleanup_paths<S: AsRef<str>>(base: &Path, requested: &[S]) -> Vec<PathBuf> {
    let Some(normalized_base) = normalize_lexically(base) else {
        tracing::warn!("Cleanup base '{}' cannot be normalized; skipping all entries", base.display());
        return Vec::new();
    };

    requested
        .iter()
        .filter_map(|entry| {
            let entry = entry.as_ref();
            if entry.is_empty() {
                tracing::warn!("Skipping empty cleanup entry");
                return None;
            }

            let candidate = normalize_lexically(&normalized_base.join(entry));
            match candidate {
                Some(path) if is_within_directory(&path, &normalized_base) => Some(path),
                _ => {
                    tracing::warn!(
                        "Refusing to clean up '{}': it resolves outside {}",
                        entry,
                        normalized_base.display()
                    );
                    None
                }
            }
        })
        .collect()
}
