//! Resolution of `include:` patterns to files.
use once_cell::sync::Lazy;
use regex::Regex;
use std::{
    fs, io,
    path::{Component, Path, PathBuf},
};
use thiserror::Error;
use walkdir::WalkDir;

#[derive(Debug, Error)]
pub enum IncludeError {
    #[error("the include pattern is empty")]
    EmptyPattern,
    #[error("absolute include paths are not supported, use a path relative to the including file")]
    AbsolutePath,
    #[error("relative includes need the path of the including file")]
    MissingCurrentFile,
    #[error("the glob `{0}` is not supported, only `<dir>/*<suffix>` and `<dir>/**/*<suffix>` are")]
    UnsupportedGlob(String),
    #[error("`{}` does not point to a directory", .0.display())]
    NotADirectory(PathBuf),
    #[error("failed to list `{}`: {err}", .path.display())]
    Walk { path: PathBuf, err: walkdir::Error },
    #[error("no such file `{}`", .0.display())]
    NotFound(PathBuf),
    #[error("{err}")]
    Read { err: io::Error },
}

/// Turns include patterns into files and reads them.
pub trait IncludeResolver: Send + Sync {
    /// Resolves `pattern` relative to `current_file`, the file holding the
    /// include statement. The returned order is the order of inclusion.
    fn resolve(&self, pattern: &str, current_file: Option<&Path>)
        -> Result<Vec<PathBuf>, IncludeError>;

    fn read_source(&self, file: &Path) -> Result<String, IncludeError>;

    fn is_same_file(&self, a: &Path, b: &Path) -> bool {
        a == b
    }
}

static SIMPLE_GLOB: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^(?P<base>[^*]*)/\*(?P<end>[^*/]*)$")
        .expect("glob patterns are valid regular expressions")
});
static RECURSIVE_GLOB: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^(?P<base>[^*]*)/\*\*/\*(?P<end>[^*/]*)$")
        .expect("glob patterns are valid regular expressions")
});

/// Resolves patterns against the local file system.
#[derive(Clone, Debug)]
pub struct FileSystemIncludeResolver {
    default_extension: String,
}

impl Default for FileSystemIncludeResolver {
    fn default() -> Self {
        Self::new(format!(".{}", fusion_types::constants::DEFAULT_FILE_EXTENSION))
    }
}

impl FileSystemIncludeResolver {
    pub fn new(default_extension: impl Into<String>) -> Self {
        Self {
            default_extension: default_extension.into(),
        }
    }

    pub fn default_extension(&self) -> &str {
        &self.default_extension
    }

    fn resolve_glob(&self, pattern: &Path) -> Result<Vec<PathBuf>, IncludeError> {
        let pattern = pattern.to_string_lossy();
        let (captures, max_depth) = match SIMPLE_GLOB.captures(&pattern) {
            Some(captures) => (captures, 1),
            None => match RECURSIVE_GLOB.captures(&pattern) {
                Some(captures) => (captures, usize::MAX),
                None => return Err(IncludeError::UnsupportedGlob(pattern.to_string())),
            },
        };
        let base = PathBuf::from(&captures["base"]);
        let ending = match &captures["end"] {
            "" => self.default_extension.as_str(),
            end => end,
        };
        if !base.is_dir() {
            return Err(IncludeError::NotADirectory(base));
        }

        let mut files = vec![];
        for entry in WalkDir::new(&base)
            .min_depth(1)
            .max_depth(max_depth)
            .sort_by_file_name()
        {
            let entry = entry.map_err(|err| IncludeError::Walk {
                path: base.clone(),
                err,
            })?;
            if entry.file_type().is_dir() {
                continue;
            }
            if entry.file_name().to_string_lossy().ends_with(ending) {
                files.push(entry.into_path());
            }
        }
        Ok(files)
    }
}

impl IncludeResolver for FileSystemIncludeResolver {
    fn resolve(
        &self,
        pattern: &str,
        current_file: Option<&Path>,
    ) -> Result<Vec<PathBuf>, IncludeError> {
        let pattern = pattern.trim();
        if pattern.is_empty() {
            return Err(IncludeError::EmptyPattern);
        }
        if pattern.starts_with('/') {
            return Err(IncludeError::AbsolutePath);
        }
        let current_dir = current_file
            .ok_or(IncludeError::MissingCurrentFile)?
            .parent()
            .unwrap_or_else(|| Path::new(""));
        let pattern = normalize_path(&current_dir.join(pattern));

        if !pattern.to_string_lossy().contains('*') {
            return Ok(vec![pattern]);
        }
        self.resolve_glob(&pattern)
    }

    fn read_source(&self, file: &Path) -> Result<String, IncludeError> {
        fs::read_to_string(file).map_err(|err| match err.kind() {
            io::ErrorKind::NotFound => IncludeError::NotFound(file.to_path_buf()),
            _ => IncludeError::Read { err },
        })
    }

    fn is_same_file(&self, a: &Path, b: &Path) -> bool {
        match (fs::canonicalize(a), fs::canonicalize(b)) {
            (Ok(a), Ok(b)) => a == b,
            _ => a == b,
        }
    }
}

/// Folds `.` and `..` components without touching the file system.
fn normalize_path(path: &Path) -> PathBuf {
    let mut normalized = PathBuf::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                if !normalized.pop() {
                    normalized.push("..");
                }
            }
            component => normalized.push(component),
        }
    }
    normalized
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;
    use pretty_assertions::assert_eq;

    fn touch(path: &Path) {
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, "").unwrap();
    }

    #[test]
    fn relative_single_file() {
        let resolver = FileSystemIncludeResolver::default();
        let files = resolver
            .resolve(" ../Other/Button.fusion ", Some(Path::new("/site/Root/Root.fusion")))
            .unwrap();
        assert_eq!(files, [PathBuf::from("/site/Other/Button.fusion")]);

        let files = resolver
            .resolve("./Button.fusion", Some(Path::new("/site/Root.fusion")))
            .unwrap();
        assert_eq!(files, [PathBuf::from("/site/Button.fusion")]);
    }

    #[test]
    fn rejected_patterns() {
        let resolver = FileSystemIncludeResolver::default();
        let current = Some(Path::new("/site/Root.fusion"));
        assert_matches!(resolver.resolve("  ", current), Err(IncludeError::EmptyPattern));
        assert_matches!(
            resolver.resolve("/etc/Root.fusion", current),
            Err(IncludeError::AbsolutePath)
        );
        assert_matches!(
            resolver.resolve("Root.fusion", None),
            Err(IncludeError::MissingCurrentFile)
        );
        assert_matches!(
            resolver.resolve("Components/Button*.fusion", current),
            Err(IncludeError::UnsupportedGlob(_))
        );
        assert_matches!(
            resolver.resolve("*/Button.fusion", current),
            Err(IncludeError::UnsupportedGlob(_))
        );
    }

    #[test]
    fn globs() {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path().join("Root.fusion");
        for file in [
            "Root.fusion",
            "Components/B.fusion",
            "Components/A.fusion",
            "Components/notes.txt",
            "Components/Nested/C.fusion",
            "Components/Nested/C.ts2",
        ] {
            touch(&dir.path().join(file));
        }
        let resolver = FileSystemIncludeResolver::default();
        let rel = |files: Vec<PathBuf>| -> Vec<String> {
            files
                .iter()
                .map(|file| {
                    file.strip_prefix(dir.path())
                        .unwrap()
                        .to_string_lossy()
                        .replace('\\', "/")
                })
                .collect()
        };

        let files = resolver.resolve("Components/*", Some(&root)).unwrap();
        assert_eq!(rel(files), ["Components/A.fusion", "Components/B.fusion"]);

        let files = resolver.resolve("Components/**/*", Some(&root)).unwrap();
        assert_eq!(
            rel(files),
            [
                "Components/A.fusion",
                "Components/B.fusion",
                "Components/Nested/C.fusion"
            ]
        );

        let files = resolver.resolve("Components/**/*.ts2", Some(&root)).unwrap();
        assert_eq!(rel(files), ["Components/Nested/C.ts2"]);

        let files = resolver.resolve("./*", Some(&root)).unwrap();
        assert_eq!(rel(files), ["Root.fusion"]);

        assert_matches!(
            resolver.resolve("Missing/*", Some(&root)),
            Err(IncludeError::NotADirectory(_))
        );
    }

    #[test]
    fn same_file_through_different_spellings() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("Root.fusion");
        touch(&file);
        let resolver = FileSystemIncludeResolver::default();
        assert!(resolver.is_same_file(&file, &dir.path().join("./Root.fusion")));
        assert!(!resolver.is_same_file(&file, &dir.path().join("Other.fusion")));
    }

    #[test]
    fn unreadable_files() {
        let resolver = FileSystemIncludeResolver::default();
        assert_matches!(
            resolver.read_source(Path::new("/nonexistent/Root.fusion")),
            Err(IncludeError::NotFound(_))
        );
    }
}
