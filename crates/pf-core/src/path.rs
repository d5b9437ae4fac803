//! The path value threaded through every navigation step.
//!
//! A [`PathModel`] wraps the raw text the user typed (or that a candidate
//! carries) and splits it at the last separator into a `directory` and a
//! `fragment`. Resolution to an absolute path and the filesystem `stat` are
//! computed on first access and cached for the life of the value; a new
//! keystroke always produces a new `PathModel`, so the cache never goes stale
//! from the caller's point of view.
//!
//! # Examples
//!
//! ```
//! use pf_core::PathModel;
//!
//! let path = PathModel::new("src/bin/ma");
//! assert_eq!(path.directory(), "src/bin/");
//! assert_eq!(path.fragment(), "ma");
//! assert_eq!(path.as_directory().full(), "src/bin/ma/");
//! ```

use std::cmp::Ordering;
use std::fmt;
use std::fs::OpenOptions;
use std::hash::{Hash, Hasher};
use std::io;
use std::path::MAIN_SEPARATOR;
use std::sync::{Arc, OnceLock};

use camino::{Utf8Component, Utf8Path, Utf8PathBuf};
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::ProjectRoots;

/// Result of a single `stat` of the resolved path.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Entry {
    Missing,
    Directory,
    File,
    /// The stat failed for a reason other than non-existence.
    Unknown,
}

impl Entry {
    fn probe(path: &Utf8Path) -> Self {
        match std::fs::metadata(path) {
            Ok(meta) if meta.is_dir() => Self::Directory,
            Ok(_) => Self::File,
            Err(err)
                if matches!(
                    err.kind(),
                    io::ErrorKind::NotFound | io::ErrorKind::NotADirectory
                ) =>
            {
                Self::Missing
            }
            Err(_) => Self::Unknown,
        }
    }

    const fn known(self) -> Option<Self> {
        match self {
            Self::Unknown => None,
            known => Some(known),
        }
    }
}

/// An immutable filesystem path as typed, split into directory and fragment.
///
/// Invariants:
///
/// - `full == directory + fragment`
/// - `directory` is empty or ends with the separator
/// - equality, ordering and hashing look at `full` only; the base directory
///   and cached state are ignored
///
/// Relative paths resolve against an optional base directory (normally the
/// primary project root) and fall back to the process working directory.
#[derive(Clone)]
pub struct PathModel {
    full: String,
    /// Byte offset where the fragment starts.
    split: usize,
    separator: char,
    base: Option<Arc<Utf8PathBuf>>,
    absolute: OnceLock<Utf8PathBuf>,
    entry: OnceLock<Entry>,
}

impl PathModel {
    /// Creates a path with no base directory.
    #[must_use]
    pub fn new(full: impl Into<String>) -> Self {
        Self::with_base(full, None)
    }

    /// Creates a path whose relative forms resolve against `base`.
    #[must_use]
    pub fn with_base(full: impl Into<String>, base: Option<Arc<Utf8PathBuf>>) -> Self {
        let full = full.into();
        let separator = detect_separator(&full);
        let split = full
            .rfind(separator)
            .map_or(0, |idx| idx + separator.len_utf8());
        Self {
            full,
            split,
            separator,
            base,
            absolute: OnceLock::new(),
            entry: OnceLock::new(),
        }
    }

    /// The empty path, resolving to the base directory.
    #[must_use]
    pub fn empty(base: Option<Arc<Utf8PathBuf>>) -> Self {
        Self::with_base(String::new(), base)
    }

    /// Builds another path sharing this one's base directory.
    #[must_use]
    pub fn derive(&self, full: impl Into<String>) -> Self {
        Self::with_base(full, self.base.clone())
    }

    /// The raw text.
    #[inline]
    #[must_use]
    pub fn full(&self) -> &str {
        &self.full
    }

    /// Everything up to and including the last separator.
    #[inline]
    #[must_use]
    pub fn directory(&self) -> &str {
        &self.full[..self.split]
    }

    /// The trailing segment after the last separator.
    #[inline]
    #[must_use]
    pub fn fragment(&self) -> &str {
        &self.full[self.split..]
    }

    /// The separator detected from the raw text.
    #[inline]
    #[must_use]
    pub const fn separator(&self) -> char {
        self.separator
    }

    /// The directory relative paths resolve against, if one was given.
    #[must_use]
    pub fn base(&self) -> Option<&Utf8Path> {
        self.base.as_deref().map(Utf8PathBuf::as_path)
    }

    /// Shared handle to the base directory.
    #[must_use]
    pub fn base_handle(&self) -> Option<Arc<Utf8PathBuf>> {
        self.base.clone()
    }

    /// Returns `true` if the raw text is empty.
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.full.is_empty()
    }

    /// The resolved, lexically normalized absolute path.
    ///
    /// `~` expands to the home directory; absolute text is taken as is and
    /// anything else is joined onto the base (or working) directory.
    pub fn absolute(&self) -> &Utf8Path {
        self.absolute
            .get_or_init(|| resolve(&self.full, self.separator, self.base()))
    }

    fn entry(&self) -> Entry {
        *self.entry.get_or_init(|| Entry::probe(self.absolute()))
    }

    /// Whether the path exists. `None` if the stat failed for another reason.
    pub fn exists(&self) -> Option<bool> {
        self.entry().known().map(|entry| entry != Entry::Missing)
    }

    /// Whether the path is an existing directory.
    pub fn is_directory(&self) -> Option<bool> {
        self.entry().known().map(|entry| entry == Entry::Directory)
    }

    /// Whether the path is an existing non-directory.
    pub fn is_file(&self) -> Option<bool> {
        self.entry().known().map(|entry| entry == Entry::File)
    }

    /// Returns `true` if the absolute path has no parent (a filesystem or
    /// drive root).
    pub fn is_root(&self) -> bool {
        let abs = self.absolute();
        abs.has_root() && abs.parent().is_none()
    }

    /// Returns `true` if the fragment contains characters that change under
    /// lowercasing, which switches matching to case-sensitive.
    #[must_use]
    pub fn has_case_sensitive_fragment(&self) -> bool {
        let fragment = self.fragment();
        !fragment.is_empty() && fragment.to_lowercase() != fragment
    }

    /// The same path with a trailing separator, so the fragment becomes empty.
    #[must_use]
    pub fn as_directory(&self) -> Self {
        if self.fragment().is_empty() {
            self.clone()
        } else {
            let mut full = self.full.clone();
            full.push(self.separator);
            self.derive(full)
        }
    }

    /// One step up.
    ///
    /// Drops the fragment if there is one, otherwise climbs one directory and
    /// keeps the trailing separator. A root is its own parent.
    pub fn parent(&self) -> Self {
        if self.is_root() {
            return self.clone();
        }
        if !self.fragment().is_empty() {
            return self.derive(self.directory());
        }

        let trimmed = self.directory().trim_end_matches(self.separator);
        let (head, last) = match trimmed.rfind(self.separator) {
            Some(idx) => (&trimmed[..=idx], &trimmed[idx + 1..]),
            None => ("", trimmed),
        };
        // Segments whose parent depends on resolution climb the absolute path.
        if matches!(last, "" | "." | ".." | "~") {
            return self.climb_absolute();
        }
        self.derive(head)
    }

    fn climb_absolute(&self) -> Self {
        let Some(parent) = self.absolute().parent() else {
            return self.clone();
        };
        let mut full = parent.as_str().to_owned();
        if !full.ends_with(self.separator) {
            full.push(self.separator);
        }
        self.derive(full)
    }

    /// The root of the filesystem (or drive) this path lives on.
    pub fn root(&self) -> Self {
        let abs = self.absolute();
        let top = abs.ancestors().last().unwrap_or(abs);
        self.derive(top.as_str())
    }

    /// Creates every directory in `directory`, succeeding if they exist.
    pub fn create_directories(&self) -> io::Result<()> {
        if self.directory().is_empty() {
            return Ok(());
        }
        let dir = resolve(self.directory(), self.separator, self.base());
        std::fs::create_dir_all(dir)
    }

    /// Creates an empty file at this path (and its parent directories) if it
    /// does not already exist.
    pub fn create_file(&self) -> io::Result<()> {
        self.create_directories()?;
        OpenOptions::new()
            .create(true)
            .append(true)
            .open(self.absolute())?;
        Ok(())
    }

    /// Returns `true` if the absolute path is a registered project root.
    pub fn is_project_directory(&self, roots: &ProjectRoots) -> bool {
        roots.contains(self.absolute())
    }
}

fn detect_separator(full: &str) -> char {
    if cfg!(windows) && !full.contains('\\') && full.contains('/') {
        '/'
    } else {
        MAIN_SEPARATOR
    }
}

fn resolve(full: &str, separator: char, base: Option<&Utf8Path>) -> Utf8PathBuf {
    let joined = if let Some(home) = expand_home(full, separator) {
        home
    } else if Utf8Path::new(full).is_absolute() {
        Utf8PathBuf::from(full)
    } else {
        working_base(base).join(full)
    };
    normalize(&joined)
}

fn expand_home(full: &str, separator: char) -> Option<Utf8PathBuf> {
    let rest = full.strip_prefix('~')?;
    if !(rest.is_empty() || rest.starts_with(separator)) {
        return None;
    }
    let home = dirs::home_dir().and_then(|dir| Utf8PathBuf::from_path_buf(dir).ok())?;
    Some(home.join(rest.trim_start_matches(separator)))
}

fn working_base(base: Option<&Utf8Path>) -> Utf8PathBuf {
    base.map(Utf8Path::to_path_buf)
        .or_else(|| {
            std::env::current_dir()
                .ok()
                .and_then(|dir| Utf8PathBuf::from_path_buf(dir).ok())
        })
        .unwrap_or_default()
}

/// Removes `.` components and folds `..` lexically without touching the disk.
fn normalize(path: &Utf8Path) -> Utf8PathBuf {
    let mut out = Utf8PathBuf::new();
    for component in path.components() {
        match component {
            Utf8Component::CurDir => {}
            Utf8Component::ParentDir => {
                if matches!(out.components().next_back(), Some(Utf8Component::Normal(_))) {
                    out.pop();
                } else if !out.has_root() {
                    out.push("..");
                }
            }
            other => out.push(other.as_str()),
        }
    }
    out
}

impl fmt::Debug for PathModel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PathModel")
            .field("full", &self.full)
            .field("base", &self.base())
            .finish_non_exhaustive()
    }
}

impl fmt::Display for PathModel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.full)
    }
}

impl PartialEq for PathModel {
    fn eq(&self, other: &Self) -> bool {
        self.full == other.full
    }
}

impl Eq for PathModel {}

impl Hash for PathModel {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.full.hash(state);
    }
}

impl PartialOrd for PathModel {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for PathModel {
    fn cmp(&self, other: &Self) -> Ordering {
        self.full.cmp(&other.full)
    }
}

impl From<&str> for PathModel {
    fn from(full: &str) -> Self {
        Self::new(full)
    }
}

impl From<String> for PathModel {
    fn from(full: String) -> Self {
        Self::new(full)
    }
}

impl Serialize for PathModel {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.full)
    }
}

impl<'de> Deserialize<'de> for PathModel {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        String::deserialize(deserializer).map(Self::new)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn utf8_dir(dir: &TempDir) -> Utf8PathBuf {
        Utf8PathBuf::from_path_buf(dir.path().to_path_buf()).expect("temp dir is UTF-8")
    }

    #[test]
    fn test_directory_plus_fragment_is_full() {
        for raw in ["", "a", "a/", "a/b", "/", "/usr/lib/x", "~/", "./rel/", "x//y"] {
            let path = PathModel::new(raw);
            assert_eq!(format!("{}{}", path.directory(), path.fragment()), raw);
            assert!(path.directory().is_empty() || path.directory().ends_with(path.separator()));
            assert_eq!(path, PathModel::new(raw));
        }
    }

    #[test]
    fn test_fragment_empty_after_separator() {
        let path = PathModel::new("src/bin/");
        assert_eq!(path.directory(), "src/bin/");
        assert_eq!(path.fragment(), "");
    }

    #[test]
    fn test_equality_ignores_base() {
        let a = PathModel::with_base("src", Some(Arc::new(Utf8PathBuf::from("/one"))));
        let b = PathModel::with_base("src", Some(Arc::new(Utf8PathBuf::from("/two"))));
        assert_eq!(a, b);
        assert_ne!(a, PathModel::new("src/"));
    }

    #[test]
    fn test_as_directory_is_idempotent() {
        let path = PathModel::new("src/lib");
        let once = path.as_directory();
        assert_eq!(once.full(), "src/lib/");
        assert_eq!(once.as_directory(), once);
    }

    #[cfg(unix)]
    #[test]
    fn test_parent_of_root_is_root() {
        let root = PathModel::new("/");
        assert!(root.is_root());
        assert_eq!(root.parent(), root);
        assert_eq!(root.parent().parent(), root);
    }

    #[cfg(unix)]
    #[test]
    fn test_parent_climbs_to_root() {
        let path = PathModel::new("/usr/lib/libc");
        let steps: Vec<String> = std::iter::successors(Some(path), |p| {
            let next = p.parent();
            (next != *p).then_some(next)
        })
        .map(|p| p.full().to_owned())
        .collect();
        assert_eq!(steps, vec!["/usr/lib/libc", "/usr/lib/", "/usr/", "/"]);
    }

    #[cfg(unix)]
    #[test]
    fn test_parent_of_relative_directory_is_empty() {
        let base = Some(Arc::new(Utf8PathBuf::from("/work/project")));
        let path = PathModel::with_base("src/", base);
        assert_eq!(path.parent().full(), "");
        assert_eq!(path.parent().parent().full(), "/work/");
    }

    #[cfg(unix)]
    #[test]
    fn test_parent_of_dot_dot_climbs_absolute() {
        let base = Some(Arc::new(Utf8PathBuf::from("/work/project/src")));
        let path = PathModel::with_base("../", base);
        assert_eq!(path.absolute(), "/work/project");
        assert_eq!(path.parent().full(), "/work/");
    }

    #[cfg(unix)]
    #[test]
    fn test_absolute_joins_base_and_normalizes() {
        let base = Some(Arc::new(Utf8PathBuf::from("/work/project")));
        assert_eq!(
            PathModel::with_base("./src/../lib/x.rs", base.clone()).absolute(),
            "/work/project/lib/x.rs"
        );
        assert_eq!(PathModel::with_base("", base.clone()).absolute(), "/work/project");
        assert_eq!(PathModel::with_base("/etc/", base).absolute(), "/etc");
    }

    #[test]
    fn test_home_expansion() {
        let Some(home) = dirs::home_dir().and_then(|d| Utf8PathBuf::from_path_buf(d).ok()) else {
            return;
        };
        let path = PathModel::new(format!("~{MAIN_SEPARATOR}notes"));
        assert_eq!(path.absolute(), normalize(&home.join("notes")));
        assert_eq!(PathModel::new("~other").absolute().file_name(), Some("~other"));
    }

    #[test]
    fn test_case_sensitive_fragment() {
        assert!(!PathModel::new("").has_case_sensitive_fragment());
        assert!(!PathModel::new("Src/readme").has_case_sensitive_fragment());
        assert!(PathModel::new("src/README").has_case_sensitive_fragment());
        assert!(!PathModel::new("src/123_").has_case_sensitive_fragment());
    }

    #[test]
    fn test_stat_queries() {
        let dir = TempDir::new().expect("create temp dir");
        let base = Some(Arc::new(utf8_dir(&dir)));
        std::fs::write(dir.path().join("file.txt"), "x").expect("write file");
        std::fs::create_dir(dir.path().join("sub")).expect("create dir");

        let file = PathModel::with_base("file.txt", base.clone());
        assert_eq!(file.exists(), Some(true));
        assert_eq!(file.is_file(), Some(true));
        assert_eq!(file.is_directory(), Some(false));

        let sub = PathModel::with_base("sub", base.clone());
        assert_eq!(sub.is_directory(), Some(true));
        assert_eq!(sub.is_file(), Some(false));

        let missing = PathModel::with_base("nope/deeper", base);
        assert_eq!(missing.exists(), Some(false));
        assert_eq!(missing.is_directory(), Some(false));
    }

    #[test]
    fn test_stat_is_cached_per_instance() {
        let dir = TempDir::new().expect("create temp dir");
        let base = Some(Arc::new(utf8_dir(&dir)));
        let path = PathModel::with_base("late.txt", base);
        assert_eq!(path.exists(), Some(false));
        std::fs::write(dir.path().join("late.txt"), "x").expect("write file");
        assert_eq!(path.exists(), Some(false));
        assert_eq!(path.derive(path.full()).exists(), Some(true));
    }

    #[test]
    fn test_create_file_creates_parents() {
        let dir = TempDir::new().expect("create temp dir");
        let base = Some(Arc::new(utf8_dir(&dir)));
        let path = PathModel::with_base("a/b/new.txt", base);
        path.create_file().expect("create file");
        assert!(dir.path().join("a/b/new.txt").is_file());
        // Second call is a no-op.
        path.create_file().expect("create file again");
    }

    #[test]
    fn test_create_directories_for_directory_path() {
        let dir = TempDir::new().expect("create temp dir");
        let base = Some(Arc::new(utf8_dir(&dir)));
        PathModel::with_base("x/y/", base)
            .create_directories()
            .expect("create dirs");
        assert!(dir.path().join("x/y").is_dir());
    }

    #[cfg(unix)]
    #[test]
    fn test_root() {
        assert_eq!(PathModel::new("/usr/lib/x").root().full(), "/");
    }

    #[cfg(unix)]
    #[test]
    fn test_project_directory() {
        let roots = ProjectRoots::new([Utf8PathBuf::from("/work/project")]);
        let base = Some(Arc::new(Utf8PathBuf::from("/work")));
        assert!(PathModel::with_base("project", base.clone()).is_project_directory(&roots));
        assert!(!PathModel::with_base("other", base).is_project_directory(&roots));
    }

    #[test]
    fn test_serializes_as_string() {
        let path = PathModel::new("src/main.rs");
        let json = serde_json::to_string(&path).unwrap();
        assert_eq!(json, r#""src/main.rs""#);
        let back: PathModel = serde_json::from_str(&json).unwrap();
        assert_eq!(back, path);
    }

    #[test]
    fn test_ordering_by_full() {
        let mut paths = vec![PathModel::new("b"), PathModel::new("a/"), PathModel::new("a")];
        paths.sort();
        let fulls: Vec<&str> = paths.iter().map(PathModel::full).collect();
        assert_eq!(fulls, vec!["a", "a/", "b"]);
    }
}
