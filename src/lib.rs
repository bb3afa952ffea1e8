//! Post-install step for Jolie packages distributed through npm.
//!
//! After `npm install`, three stages run in order:
//!
//! 1. download the runtime jars each package declares in its `pom.xml` into `lib/`
//! 2. copy packages containing Jolie modules (`*.ol`) into `packages/`
//! 3. move jars built under `packages/*/target/` into `lib/`

pub mod config;
pub mod download;
pub mod http;
pub mod maven;
pub mod package;
pub mod report;
pub mod runtime;
pub mod stage;
