use std::path::{Component, Path, PathBuf};

/// Find the project root by walking up from `cwd` looking for `package.json` or `.git`.
///
/// Returns the first directory containing either marker, or `None` if neither is found.
#[must_use]
pub fn project_root(cwd: &Path) -> Option<PathBuf> {
    let mut current = cwd.to_path_buf();

    loop {
        if current.join("package.json").exists() || current.join(".git").exists() {
            return Some(current);
        }

        if !current.pop() {
            return None;
        }
    }
}

/// Lexical equivalent of Node's `path.resolve(...segments)`.
///
/// Segments are processed right to left until an absolute one is found; if none is,
/// `base` is prepended. The result is normalized (`.` dropped, `..` popped) without
/// touching the filesystem, so the target does not need to exist.
#[must_use]
pub fn resolve_path<S: AsRef<Path>>(base: &Path, segments: &[S]) -> PathBuf {
    let mut joined = PathBuf::new();
    let mut anchored = false;

    for segment in segments.iter().rev() {
        let segment = segment.as_ref();
        if segment.as_os_str().is_empty() {
            continue;
        }
        joined = if joined.as_os_str().is_empty() {
            segment.to_path_buf()
        } else {
            segment.join(&joined)
        };
        if segment.is_absolute() {
            anchored = true;
            break;
        }
    }

    if !anchored {
        joined = if joined.as_os_str().is_empty() {
            base.to_path_buf()
        } else {
            base.join(&joined)
        };
    }

    normalize(&joined)
}

/// Lexical equivalent of Node's `path.join(...segments)`.
///
/// Unlike [`PathBuf::push`], a rooted segment after the first is appended rather than
/// replacing what came before: `join_path(["/repo", "/src"])` is `/repo/src`.
#[must_use]
pub fn join_path<S: AsRef<Path>>(segments: &[S]) -> PathBuf {
    let mut joined = PathBuf::new();
    for segment in segments {
        let segment = segment.as_ref();
        if joined.as_os_str().is_empty() {
            joined.push(segment);
        } else {
            joined.extend(segment.components().filter(|c| {
                matches!(c, Component::Normal(_) | Component::CurDir | Component::ParentDir)
            }));
        }
    }
    normalize(&joined)
}

/// Remove `.` components and fold `..` into its parent, lexically.
///
/// `..` at the root stays at the root, matching `path.resolve("/", "..")`.
#[must_use]
pub fn normalize(path: &Path) -> PathBuf {
    let mut out = PathBuf::new();
    for component in path.components() {
        match component {
            Component::Prefix(_) | Component::RootDir => out.push(component.as_os_str()),
            Component::CurDir => {}
            Component::ParentDir => match out.components().next_back() {
                Some(Component::Normal(_)) => {
                    out.pop();
                }
                Some(Component::RootDir | Component::Prefix(_)) => {}
                _ => out.push(".."),
            },
            Component::Normal(part) => out.push(part),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_project_root_finds_package_json() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("package.json"), "{}").unwrap();
        let nested = dir.path().join("src").join("pages");
        std::fs::create_dir_all(&nested).unwrap();

        assert_eq!(project_root(&nested), Some(dir.path().to_path_buf()));
    }

    #[cfg(unix)]
    #[test]
    fn test_resolve_relative_against_base() {
        let resolved = resolve_path(Path::new("/repo"), &["./src/pages"]);
        assert_eq!(resolved, PathBuf::from("/repo/src/pages"));
    }

    #[cfg(unix)]
    #[test]
    fn test_resolve_stops_at_absolute_segment() {
        let resolved = resolve_path(Path::new("/repo"), &["/other", "lib", "../src"]);
        assert_eq!(resolved, PathBuf::from("/other/src"));
    }

    #[cfg(unix)]
    #[test]
    fn test_resolve_no_segments_is_base() {
        let resolved = resolve_path::<&str>(Path::new("/repo/app"), &[]);
        assert_eq!(resolved, PathBuf::from("/repo/app"));
    }

    #[cfg(unix)]
    #[test]
    fn test_join_appends_rooted_segments() {
        assert_eq!(join_path(&["/repo", "/src/x"]), PathBuf::from("/repo/src/x"));
        assert_eq!(join_path(&["/repo", "src", "../lib"]), PathBuf::from("/repo/lib"));
        assert_eq!(join_path(&["src", "/pages"]), PathBuf::from("src/pages"));
    }

    #[cfg(unix)]
    #[test]
    fn test_normalize_parent_at_root() {
        assert_eq!(normalize(Path::new("/../a")), PathBuf::from("/a"));
        assert_eq!(normalize(Path::new("/a/./b/../c")), PathBuf::from("/a/c"));
    }
}
