use anyhow::Result;
use glob::Pattern;
use std::path::{Path, PathBuf};

use crate::runtime::Runtime;

/// List the immediate subdirectories of `root`, sorted by path.
///
/// Directory structure: `<root>/<package>/`. A missing root means nothing
/// is installed and yields an empty list.
#[tracing::instrument(skip(runtime))]
pub fn list_package_dirs<R: Runtime>(runtime: &R, root: &Path) -> Result<Vec<PathBuf>> {
    if !runtime.exists(root) {
        return Ok(Vec::new());
    }

    let mut dirs: Vec<PathBuf> = runtime
        .read_dir(root)?
        .into_iter()
        .filter(|path| runtime.is_dir(path))
        .collect();
    dirs.sort();

    Ok(dirs)
}

/// Regular files directly inside `dir` whose names match `pattern`, sorted.
#[tracing::instrument(skip(runtime))]
pub fn matching_files<R: Runtime>(
    runtime: &R,
    dir: &Path,
    pattern: &Pattern,
) -> Result<Vec<PathBuf>> {
    let mut files: Vec<PathBuf> = runtime
        .read_dir(dir)?
        .into_iter()
        .filter(|path| {
            path.file_name()
                .and_then(|name| name.to_str())
                .is_some_and(|name| pattern.matches(name))
        })
        .filter(|path| runtime.is_file(path))
        .collect();
    files.sort();

    Ok(files)
}

/// Whether `dir` holds at least one matching file at its top level.
pub fn has_matching_file<R: Runtime>(runtime: &R, dir: &Path, pattern: &Pattern) -> Result<bool> {
    Ok(!matching_files(runtime, dir, pattern)?.is_empty())
}
