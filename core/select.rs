use crate::config::IGNORE_FILENAME;
use crate::error::{AppError, Result};
use globset::{GlobBuilder, GlobSet, GlobSetBuilder};
use ignore::gitignore::{Gitignore, GitignoreBuilder};
use log;
use serde::Serialize;
use std::path::{Component, Path, PathBuf};
use walkdir::{DirEntry, WalkDir};

const VCS_DIR_NAME: &str = ".git";

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SelectedFile {
    /// Path as reached by the walk (root joined with the relative path).
    pub path: PathBuf,
    /// Root-relative path with forward slashes.
    pub relative_path: String,
}

/// Walks a project tree and decides which regular files feed the pipeline.
#[derive(Debug)]
pub struct Selector {
    root: PathBuf,
    ignore_rules: Gitignore,
    include_set: GlobSet,
    has_includes: bool,
    /// Root-relative directories pruned from the walk.
    excluded_dirs: Vec<String>,
}

impl Selector {
    /// Builds a selector using `.chunkyignore` at the root, if present.
    pub fn for_root(root: &Path, include_globs: &[String]) -> Result<Self> {
        Self::new(root, Some(&root.join(IGNORE_FILENAME)), include_globs)
    }

    pub fn new(root: &Path, ignore_file: Option<&Path>, include_globs: &[String]) -> Result<Self> {
        let ignore_rules = compile_ignore_file(root, ignore_file)?;
        let include_set = build_include_set(include_globs)?;
        Ok(Self {
            root: root.to_path_buf(),
            ignore_rules,
            include_set,
            has_includes: !include_globs.is_empty(),
            excluded_dirs: Vec::new(),
        })
    }

    /// Prunes `dir` from the walk when it exists and lies strictly under the
    /// root. Relative paths resolve against the working directory.
    pub fn exclude_dir(mut self, dir: &Path) -> Self {
        match relative_dir_under_root(&self.root, dir) {
            Some(rel) => {
                log::debug!("Excluding directory from selection: {}", rel);
                self.excluded_dirs.push(rel);
            }
            None => log::trace!(
                "Not excluding {}: missing or outside the project root",
                dir.display()
            ),
        }
        self
    }

    /// Depth-first walk, lexical within each directory. Any walk error aborts.
    pub fn select(&self) -> Result<Vec<SelectedFile>> {
        log::info!("Walking project directory: {}", self.root.display());
        let mut selected = Vec::new();

        let walker = WalkDir::new(&self.root)
            .sort_by_file_name()
            .into_iter()
            .filter_entry(|entry| !is_vcs_dir(entry) && !self.is_excluded_dir(entry));

        for entry_result in walker {
            let entry = entry_result?;
            if !entry.file_type().is_file() {
                continue;
            }
            let path = entry.path();
            let relative_path = match pathdiff::diff_paths(path, &self.root) {
                Some(rel) => to_slash(&rel),
                None => {
                    log::warn!("Could not get relative path for: {}", path.display());
                    continue;
                }
            };

            if self.should_include(&relative_path) {
                log::trace!("Selected: {}", relative_path);
                selected.push(SelectedFile {
                    path: path.to_path_buf(),
                    relative_path,
                });
            }
        }

        log::info!(
            "Directory walk complete. Selected {} files.",
            selected.len()
        );
        Ok(selected)
    }

    fn is_excluded_dir(&self, entry: &DirEntry) -> bool {
        if self.excluded_dirs.is_empty() || entry.depth() == 0 || !entry.file_type().is_dir() {
            return false;
        }
        match entry.path().strip_prefix(&self.root) {
            Ok(rel) => {
                let rel = to_slash(rel);
                self.excluded_dirs.iter().any(|dir| *dir == rel)
            }
            Err(_) => false,
        }
    }

    fn should_include(&self, relative_path: &str) -> bool {
        if self
            .ignore_rules
            .matched_path_or_any_parents(relative_path, false)
            .is_ignore()
        {
            log::trace!("Path excluded by ignore rules: {}", relative_path);
            return false;
        }

        if self.has_includes && !self.include_set.is_match(relative_path) {
            log::trace!("Path not matched by include globs: {}", relative_path);
            return false;
        }

        true
    }
}

fn is_vcs_dir(entry: &DirEntry) -> bool {
    entry.depth() > 0 && entry.file_type().is_dir() && entry.file_name() == VCS_DIR_NAME
}

fn relative_dir_under_root(root: &Path, dir: &Path) -> Option<String> {
    let root = root.canonicalize().ok()?;
    let dir = dir.canonicalize().ok()?;
    let rel = to_slash(dir.strip_prefix(&root).ok()?);
    if rel.is_empty() { None } else { Some(rel) }
}

fn compile_ignore_file(root: &Path, ignore_file: Option<&Path>) -> Result<Gitignore> {
    let mut builder = GitignoreBuilder::new(root);
    match ignore_file {
        Some(path) if path.is_file() => {
            log::debug!("Compiling ignore rules from {}", path.display());
            if let Some(err) = builder.add(path) {
                log::error!("Invalid ignore file {}: {}", path.display(), err);
                return Err(AppError::Ignore(err));
            }
        }
        Some(path) => {
            log::debug!("No ignore file at {}, nothing excluded.", path.display());
        }
        None => {}
    }
    Ok(builder.build()?)
}

fn build_include_set(patterns: &[String]) -> Result<GlobSet> {
    let mut builder = GlobSetBuilder::new();
    for pattern_str in patterns {
        let glob = GlobBuilder::new(pattern_str.trim())
            .literal_separator(true)
            .build()
            .map_err(|e| {
                log::error!("Invalid glob pattern \"{}\": {}", pattern_str, e);
                AppError::Glob(format!("Invalid glob pattern \"{}\": {}", pattern_str, e))
            })?;
        log::trace!("Adding include glob: {}", pattern_str);
        builder.add(glob);
    }
    Ok(builder.build()?)
}

fn to_slash(path: &Path) -> String {
    path.components()
        .filter_map(|c| match c {
            Component::Normal(name) => Some(name.to_string_lossy().into_owned()),
            _ => None,
        })
        .collect::<Vec<_>>()
        .join("/")
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn touch(root: &Path, rel: &str) {
        let path = root.join(rel);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, "x").unwrap();
    }

    fn fixture() -> TempDir {
        let dir = TempDir::new().unwrap();
        let root = dir.path();
        touch(root, "b.go");
        touch(root, "a.txt");
        touch(root, "src/main.go");
        touch(root, "src/util/helpers.go");
        touch(root, "build/out.go");
        touch(root, "notes.log");
        touch(root, ".git/config");
        touch(root, ".git/objects/ab/cdef");
        touch(root, "vendor/.git/HEAD");
        dir
    }

    fn relative(files: &[SelectedFile]) -> Vec<&str> {
        files.iter().map(|f| f.relative_path.as_str()).collect()
    }

    #[test]
    fn walk_is_depth_first_and_lexical() {
        let dir = fixture();
        let files = Selector::for_root(dir.path(), &[]).unwrap().select().unwrap();
        assert_eq!(
            relative(&files),
            vec![
                "a.txt",
                "b.go",
                "build/out.go",
                "notes.log",
                "src/main.go",
                "src/util/helpers.go",
            ]
        );
        assert!(files[0].path.ends_with("a.txt"));
    }

    #[test]
    fn vcs_directories_are_always_skipped() {
        let dir = fixture();
        fs::write(dir.path().join(IGNORE_FILENAME), "!.git/\n").unwrap();
        let files = Selector::for_root(dir.path(), &[]).unwrap().select().unwrap();
        assert!(
            files
                .iter()
                .all(|f| !f.relative_path.split('/').any(|seg| seg == ".git"))
        );
    }

    #[test]
    fn ignore_file_excludes_matches_and_supports_negation() {
        let dir = fixture();
        fs::write(
            dir.path().join(IGNORE_FILENAME),
            "*.log\nbuild/\nsrc/**/*.go\n!src/main.go\n",
        )
        .unwrap();
        let files = Selector::for_root(dir.path(), &[]).unwrap().select().unwrap();
        assert_eq!(
            relative(&files),
            vec![".chunkyignore", "a.txt", "b.go", "src/main.go"]
        );
    }

    #[test]
    fn missing_ignore_file_is_not_an_error() {
        let dir = fixture();
        let selector = Selector::new(dir.path(), Some(&dir.path().join("nope")), &[]).unwrap();
        assert_eq!(selector.select().unwrap().len(), 6);
    }

    #[test]
    fn include_globs_restrict_selection() {
        let dir = fixture();
        let globs = vec!["*.go".to_string(), "src/**/*.go".to_string()];
        let files = Selector::for_root(dir.path(), &globs).unwrap().select().unwrap();
        assert_eq!(
            relative(&files),
            vec!["b.go", "src/main.go", "src/util/helpers.go"]
        );
    }

    #[test]
    fn single_star_does_not_cross_directories() {
        let dir = fixture();
        let globs = vec!["src/*.go".to_string()];
        let files = Selector::for_root(dir.path(), &globs).unwrap().select().unwrap();
        assert_eq!(relative(&files), vec!["src/main.go"]);
    }

    #[test]
    fn ignore_and_include_combine_as_intersection() {
        let dir = fixture();
        fs::write(dir.path().join(IGNORE_FILENAME), "src/util/\n").unwrap();
        let globs = vec!["**/*.go".to_string()];
        let files = Selector::for_root(dir.path(), &globs).unwrap().select().unwrap();
        assert_eq!(
            relative(&files),
            vec!["b.go", "build/out.go", "src/main.go"]
        );
    }

    #[test]
    fn excluded_output_dir_is_pruned() {
        let dir = fixture();
        touch(dir.path(), "chunk_output/demo/000_chunk.txt");
        touch(dir.path(), "chunk_output/demo/manifest.json");
        let files = Selector::for_root(dir.path(), &[])
            .unwrap()
            .exclude_dir(&dir.path().join("chunk_output"))
            .select()
            .unwrap();
        assert!(
            files
                .iter()
                .all(|f| !f.relative_path.starts_with("chunk_output/"))
        );
        assert_eq!(files.len(), 6);
    }

    #[test]
    fn exclusions_outside_root_or_of_root_itself_are_ignored() {
        let dir = fixture();
        let elsewhere = TempDir::new().unwrap();
        let files = Selector::for_root(dir.path(), &[])
            .unwrap()
            .exclude_dir(elsewhere.path())
            .exclude_dir(dir.path())
            .exclude_dir(&dir.path().join("not-created-yet"))
            .select()
            .unwrap();
        assert_eq!(files.len(), 6);
    }

    #[test]
    fn invalid_include_glob_is_fatal() {
        let dir = fixture();
        let err = Selector::for_root(dir.path(), &["src/[".to_string()]).unwrap_err();
        assert!(matches!(err, AppError::Glob(_)));
    }

    #[test]
    fn missing_root_propagates_walk_error() {
        let dir = TempDir::new().unwrap();
        let missing = dir.path().join("does-not-exist");
        let err = Selector::new(&missing, None, &[]).unwrap().select().unwrap_err();
        assert!(matches!(err, AppError::WalkDir(_)));
    }
}
