//! Path normalization: one canonical, comparable identity per target file.
//!
//! Detection must keep working for files deleted after being opened (an
//! application may still hold the handle), so normalization never requires
//! existence: paths that exist are symlink-resolved, paths that do not are
//! lexically cleaned instead.

use std::fmt;
use std::path::{Component, Path, PathBuf};

use fs_err as fs;

/// An absolute, symlink-resolved target path.
///
/// Two targets are equal iff their resolved paths are byte-equal.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct TargetFile {
    path: PathBuf,
}

impl TargetFile {
    /// Parses user input: a `file://` URL, an absolute or relative path, or
    /// a `~`-prefixed path. Whitespace is trimmed; empty input is rejected.
    pub fn from_input(input: &str) -> Option<TargetFile> {
        let trimmed = input.trim();
        if trimmed.is_empty() {
            return None;
        }

        let raw = match file_url_path(trimmed) {
            Some(url_path) => url_path,
            None => PathBuf::from(expand_tilde(trimmed)),
        };

        Some(TargetFile {
            path: normalize(&raw),
        })
    }

    /// Second entry point for values that are already filesystem paths.
    /// Idempotent: normalizing an already-normalized path is a no-op.
    pub fn from_path(path: &Path) -> TargetFile {
        TargetFile {
            path: normalize(path),
        }
    }

    pub fn as_path(&self) -> &Path {
        &self.path
    }

    /// Final path component, used as the tab-title match key.
    pub fn basename(&self) -> &str {
        self.path
            .file_name()
            .and_then(|name| name.to_str())
            .unwrap_or("")
    }
}

impl fmt::Display for TargetFile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.path.display().fmt(f)
    }
}

/// Resolves symlinks when the path exists, otherwise returns the lexically
/// cleaned absolute form.
pub fn normalize(path: &Path) -> PathBuf {
    let absolute = if path.is_absolute() {
        path.to_path_buf()
    } else {
        std::env::current_dir()
            .map(|cwd| cwd.join(path))
            .unwrap_or_else(|_| path.to_path_buf())
    };
    let cleaned = lexical_clean(&absolute);
    fs::canonicalize(&cleaned).unwrap_or(cleaned)
}

/// Removes `.` and `..` components without touching the filesystem.
fn lexical_clean(path: &Path) -> PathBuf {
    let mut out = PathBuf::new();
    for component in path.components() {
        match component {
            Component::RootDir | Component::Prefix(_) => out.push(component.as_os_str()),
            Component::CurDir => {}
            Component::ParentDir => {
                out.pop();
            }
            Component::Normal(part) => out.push(part),
        }
    }
    if out.as_os_str().is_empty() {
        PathBuf::from("/")
    } else {
        out
    }
}

/// Extracts the path of a `file://` URL, decoding percent escapes.
/// `file:///x` has an empty authority; `file://localhost/x` names one.
fn file_url_path(input: &str) -> Option<PathBuf> {
    let rest = input.strip_prefix("file://")?;
    let path_part = if rest.starts_with('/') {
        rest
    } else {
        &rest[rest.find('/')?..]
    };
    Some(PathBuf::from(percent_decode(path_part)))
}

fn percent_decode(input: &str) -> String {
    let bytes = input.as_bytes();
    let mut out = Vec::with_capacity(bytes.len());
    let mut i = 0;
    while i < bytes.len() {
        if bytes[i] == b'%' && i + 2 < bytes.len() {
            if let (Some(hi), Some(lo)) = (hex_value(bytes[i + 1]), hex_value(bytes[i + 2])) {
                out.push(hi * 16 + lo);
                i += 3;
                continue;
            }
        }
        out.push(bytes[i]);
        i += 1;
    }
    String::from_utf8(out).unwrap_or_else(|_| input.to_string())
}

fn hex_value(byte: u8) -> Option<u8> {
    match byte {
        b'0'..=b'9' => Some(byte - b'0'),
        b'a'..=b'f' => Some(byte - b'a' + 10),
        b'A'..=b'F' => Some(byte - b'A' + 10),
        _ => None,
    }
}

fn expand_tilde(input: &str) -> String {
    if input == "~" {
        if let Some(home) = dirs::home_dir() {
            return home.to_string_lossy().into_owned();
        }
    } else if let Some(rest) = input.strip_prefix("~/") {
        if let Some(home) = dirs::home_dir() {
            return home.join(rest).to_string_lossy().into_owned();
        }
    }
    input.to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_empty_and_whitespace_input() {
        assert!(TargetFile::from_input("").is_none());
        assert!(TargetFile::from_input("   ").is_none());
        assert!(TargetFile::from_input("\t\n").is_none());
    }

    #[test]
    fn accepts_file_url() {
        let target = TargetFile::from_input("file:///tmp/test.txt").unwrap();
        assert_eq!(target.as_path(), Path::new("/tmp/test.txt"));
    }

    #[test]
    fn decodes_percent_escapes_in_file_url() {
        let target = TargetFile::from_input("file:///tmp/a%20b.txt").unwrap();
        assert_eq!(target.as_path(), Path::new("/tmp/a b.txt"));
    }

    #[test]
    fn normalization_is_idempotent() {
        let first = TargetFile::from_input("/tmp/foo/../bar.txt").unwrap();
        let second = TargetFile::from_path(first.as_path());
        assert_eq!(first, second);
    }

    #[test]
    fn cleans_nonexistent_paths_lexically() {
        let target = TargetFile::from_input("/nonexistent/a/./b/../c.txt").unwrap();
        assert_eq!(target.as_path(), Path::new("/nonexistent/a/c.txt"));
    }

    #[test]
    fn expands_tilde_when_home_is_known() {
        if let Some(home) = dirs::home_dir() {
            let target = TargetFile::from_input("~/somefile.txt").unwrap();
            assert!(target.as_path().starts_with(normalize(&home)));
        }
    }

    #[cfg(unix)]
    #[test]
    fn resolves_symlinks_for_existing_paths() {
        let dir = tempfile::tempdir().unwrap();
        let real = dir.path().join("real.txt");
        std::fs::write(&real, b"x").unwrap();
        let link = dir.path().join("link.txt");
        std::os::unix::fs::symlink(&real, &link).unwrap();

        let via_link = TargetFile::from_path(&link);
        let via_real = TargetFile::from_path(&real);
        assert_eq!(via_link, via_real);
    }

    #[test]
    fn basename_is_final_component() {
        let target = TargetFile::from_input("/tmp/dir/main.go").unwrap();
        assert_eq!(target.basename(), "main.go");
    }
}
