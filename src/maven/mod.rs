//! Maven coordinates, repository layout and `pom.xml` manifests.

mod artifact;
mod manifest;

pub use artifact::{DEFAULT_EXTENSION, DEFAULT_REPOSITORY, Dependency};
pub use manifest::{MANIFEST_FILE, ManifestEntry, RESERVED_GROUP, parse_manifest, read_manifest};
