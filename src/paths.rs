//! Lexical path arithmetic for link targets.
//!
//! Links written into the Markdown are computed from paths, never from the
//! filesystem: the image has already been moved and the PDF may live on a
//! different mount. Everything here is pure string-level component handling
//! (`.` and `..` folded without resolving symlinks).

use std::path::{Component, Path, PathBuf};

/// Make `path` absolute against `base` and fold `.`/`..` components.
pub fn absolutize(path: &Path, base: &Path) -> PathBuf {
    if path.is_absolute() {
        normalize(path)
    } else {
        normalize(&base.join(path))
    }
}

/// Fold `.` and `..` components without touching the filesystem.
///
/// `..` at the root is dropped; leading `..` on a relative path is kept.
pub fn normalize(path: &Path) -> PathBuf {
    let mut out: Vec<Component<'_>> = Vec::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => match out.last() {
                Some(Component::Normal(_)) => {
                    out.pop();
                }
                Some(Component::RootDir) | Some(Component::Prefix(_)) => {}
                _ => out.push(component),
            },
            other => out.push(other),
        }
    }
    if out.is_empty() {
        return PathBuf::from(".");
    }
    out.iter().collect()
}

/// Path of `target` as seen from the directory `base_dir`.
///
/// Both inputs should be absolute (see [`absolutize`]). Returns an empty
/// path when they are equal. If they share no root (different drive
/// prefixes) `target` is returned unchanged.
pub fn relative_to(target: &Path, base_dir: &Path) -> PathBuf {
    let target = normalize(target);
    let base = normalize(base_dir);
    let target_parts: Vec<Component<'_>> = target.components().collect();
    let base_parts: Vec<Component<'_>> = base.components().collect();

    let common = target_parts
        .iter()
        .zip(&base_parts)
        .take_while(|(a, b)| a == b)
        .count();

    let rooted = |c: Option<&Component<'_>>| {
        matches!(c, Some(Component::Prefix(_)) | Some(Component::RootDir))
    };
    if common == 0 && (rooted(target_parts.first()) || rooted(base_parts.first())) {
        return target.clone();
    }

    let mut rel = PathBuf::new();
    for _ in common..base_parts.len() {
        rel.push("..");
    }
    for part in &target_parts[common..] {
        rel.push(part.as_os_str());
    }
    rel
}

/// Render a path with `/` separators regardless of platform.
pub fn to_slash(path: &Path) -> String {
    let mut out = String::new();
    for component in path.components() {
        match component {
            Component::Prefix(prefix) => out.push_str(&prefix.as_os_str().to_string_lossy()),
            Component::RootDir => out.push('/'),
            other => {
                if !out.is_empty() && !out.ends_with('/') {
                    out.push('/');
                }
                out.push_str(&other.as_os_str().to_string_lossy());
            }
        }
    }
    out
}
