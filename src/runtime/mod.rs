//! Runtime abstraction for filesystem operations.
//!
//! Every stage talks to the disk through [`Runtime`] so that scanning and
//! relocation logic can be exercised against a mock in unit tests.
//!
//! # Structure
//!
//! - `fs` - File and directory operations backed by `std::fs`
//! - `tree` - Recursive directory copy

mod fs;
mod tree;

use anyhow::Result;
use std::path::{Path, PathBuf};

#[cfg_attr(test, mockall::automock)]
pub trait Runtime: Send + Sync {
    fn exists(&self, path: &Path) -> bool;
    fn is_dir(&self, path: &Path) -> bool;
    fn is_file(&self, path: &Path) -> bool;
    fn read_dir(&self, path: &Path) -> Result<Vec<PathBuf>>;
    fn read_to_string(&self, path: &Path) -> Result<String>;
    fn create_dir_all(&self, path: &Path) -> Result<()>;

    /// Create (or truncate) a file for streaming writes.
    fn create_file(&self, path: &Path) -> Result<Box<dyn std::io::Write + Send>>;

    /// Copy a single file, overwriting the destination. Returns bytes copied.
    fn copy(&self, from: &Path, to: &Path) -> Result<u64>;

    /// Copy a directory tree into `to`, overwriting files that already exist
    /// there. Files present only at the destination are left alone.
    /// Returns the number of files copied.
    fn copy_dir_all(&self, from: &Path, to: &Path) -> Result<u64>;

    fn remove_dir_all(&self, path: &Path) -> Result<()>;
}

pub struct RealRuntime;

impl Runtime for RealRuntime {
    fn exists(&self, path: &Path) -> bool {
        self.exists_impl(path)
    }

    fn is_dir(&self, path: &Path) -> bool {
        self.is_dir_impl(path)
    }

    fn is_file(&self, path: &Path) -> bool {
        self.is_file_impl(path)
    }

    fn read_dir(&self, path: &Path) -> Result<Vec<PathBuf>> {
        self.read_dir_impl(path)
    }

    fn read_to_string(&self, path: &Path) -> Result<String> {
        self.read_to_string_impl(path)
    }

    fn create_dir_all(&self, path: &Path) -> Result<()> {
        self.create_dir_all_impl(path)
    }

    fn create_file(&self, path: &Path) -> Result<Box<dyn std::io::Write + Send>> {
        self.create_file_impl(path)
    }

    fn copy(&self, from: &Path, to: &Path) -> Result<u64> {
        self.copy_impl(from, to)
    }

    fn copy_dir_all(&self, from: &Path, to: &Path) -> Result<u64> {
        self.copy_dir_all_impl(from, to)
    }

    fn remove_dir_all(&self, path: &Path) -> Result<()> {
        self.remove_dir_all_impl(path)
    }
}
