//! Recursive directory copy with overwrite.

use anyhow::{Context, Result};
use std::fs;
use std::path::Path;

use super::RealRuntime;

impl RealRuntime {
    #[tracing::instrument(skip(self))]
    pub(crate) fn copy_dir_all_impl(&self, from: &Path, to: &Path) -> Result<u64> {
        fs::create_dir_all(to).with_context(|| format!("Failed to create directory {:?}", to))?;

        let mut copied = 0;
        for entry in fs::read_dir(from).with_context(|| format!("Failed to read {:?}", from))? {
            let entry = entry?;
            let source = entry.path();
            let dest = to.join(entry.file_name());
            let file_type = entry.file_type()?;

            if file_type.is_symlink() {
                copy_symlink(&source, &dest)?;
                copied += 1;
            } else if file_type.is_dir() {
                copied += self.copy_dir_all_impl(&source, &dest)?;
            } else {
                fs::copy(&source, &dest)
                    .with_context(|| format!("Failed to copy {:?} to {:?}", source, dest))?;
                copied += 1;
            }
        }

        Ok(copied)
    }
}

/// Recreate a symlink at `dest`, replacing whatever file or link is there.
#[cfg(unix)]
fn copy_symlink(source: &Path, dest: &Path) -> Result<()> {
    let target = fs::read_link(source)
        .with_context(|| format!("Failed to read symlink {:?}", source))?;

    if fs::symlink_metadata(dest).is_ok_and(|m| !m.is_dir()) {
        fs::remove_file(dest).with_context(|| format!("Failed to replace {:?}", dest))?;
    }

    std::os::unix::fs::symlink(&target, dest)
        .with_context(|| format!("Failed to create symlink {:?}", dest))
}

/// Windows symlinks need privileges; copy what the link points at instead.
#[cfg(not(unix))]
fn copy_symlink(source: &Path, dest: &Path) -> Result<()> {
    if source.is_dir() {
        RealRuntime.copy_dir_all_impl(source, dest)?;
    } else {
        fs::copy(source, dest)
            .with_context(|| format!("Failed to copy {:?} to {:?}", source, dest))?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use crate::runtime::{RealRuntime, Runtime};
    use std::fs;
    use tempfile::tempdir;

    #[test]
    fn test_copy_dir_all_copies_nested_tree() {
        let runtime = RealRuntime;
        let dir = tempdir().unwrap();
        let src = dir.path().join("src");
        fs::create_dir_all(src.join("lib/deep")).unwrap();
        fs::write(src.join("main.ol"), "service Main {}").unwrap();
        fs::write(src.join("package.json"), "{}").unwrap();
        fs::write(src.join("lib/deep/util.ol"), "// util").unwrap();

        let dest = dir.path().join("out/pkg");
        let copied = runtime.copy_dir_all(&src, &dest).unwrap();

        assert_eq!(copied, 3);
        assert_eq!(
            fs::read_to_string(dest.join("main.ol")).unwrap(),
            "service Main {}"
        );
        assert!(dest.join("package.json").is_file());
        assert!(dest.join("lib/deep/util.ol").is_file());
    }

    #[test]
    fn test_copy_dir_all_overwrites_and_keeps_extra_files() {
        let runtime = RealRuntime;
        let dir = tempdir().unwrap();
        let src = dir.path().join("src");
        let dest = dir.path().join("dest");
        fs::create_dir_all(&src).unwrap();
        fs::create_dir_all(&dest).unwrap();
        fs::write(src.join("main.ol"), "new").unwrap();
        fs::write(dest.join("main.ol"), "old").unwrap();
        fs::write(dest.join("stale.txt"), "stale").unwrap();

        runtime.copy_dir_all(&src, &dest).unwrap();

        assert_eq!(fs::read_to_string(dest.join("main.ol")).unwrap(), "new");
        assert!(dest.join("stale.txt").exists());
    }

    #[cfg(unix)]
    #[test]
    fn test_copy_dir_all_preserves_symlinks() {
        let runtime = RealRuntime;
        let dir = tempdir().unwrap();
        let src = dir.path().join("src");
        fs::create_dir_all(src.join("bin")).unwrap();
        fs::write(src.join("cli.js"), "#!/usr/bin/env node").unwrap();
        std::os::unix::fs::symlink("../cli.js", src.join("bin/cli")).unwrap();

        let dest = dir.path().join("dest");
        runtime.copy_dir_all(&src, &dest).unwrap();
        // second pass must replace the existing link
        runtime.copy_dir_all(&src, &dest).unwrap();

        let link = dest.join("bin/cli");
        assert!(fs::symlink_metadata(&link).unwrap().file_type().is_symlink());
        assert_eq!(fs::read_link(&link).unwrap(), std::path::Path::new("../cli.js"));
    }

    #[test]
    fn test_copy_dir_all_missing_source() {
        let runtime = RealRuntime;
        let dir = tempdir().unwrap();

        let result = runtime.copy_dir_all(&dir.path().join("missing"), &dir.path().join("dest"));
        assert!(result.is_err());
    }
}
