//! repodb: pacman repository database parsing and kernel package resolution
//!
//! This crate provides tools for:
//! - Inflating compressed sync database dumps (xz, zstd, gzip)
//! - Parsing the line-oriented `%MARKER%` record format into a typed catalog
//! - Numeric-aware version comparison between packages of the same name
//! - Deriving the artifact filenames (archive + detached signature) a
//!   fetcher must download, including the automatic `-headers` companion
//!   for kernel image packages

pub mod db;
pub mod decompress;
pub mod error;
pub mod package;
mod version;

pub use db::{Database, Record};
pub use decompress::{decompress_to_string, Codec};
pub use error::{Error, Result};
pub use package::{Artifact, Package, VersionCmp, DEFAULT_EXTENSION};
