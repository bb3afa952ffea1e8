//! Installed package discovery.
//!
//! Scans a package root for installed package directories and for files of
//! interest at the top level of a single package.

mod discovery;

pub use discovery::{has_matching_file, list_package_dirs, matching_files};
