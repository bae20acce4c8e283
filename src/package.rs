//! Package value types and artifact derivation
//!
//! A [`Package`] is an immutable name/version pair parsed from a
//! `"name=version"` spec. It knows how to compare itself against other
//! packages of the same name, how to sort deterministically across names,
//! and which repository artifacts (archive plus detached signature) a
//! fetcher must retrieve for it — including the automatic `-headers`
//! companion for kernel images.

use std::cmp::Ordering;
use std::fmt;
use std::hash::{Hash, Hasher};

use indexmap::IndexMap;
use serde::Serialize;

use crate::version::{VersionKey, GENERAL, KERNEL};
use crate::{Error, Result};

/// Target architecture baked into artifact filenames.
const ARCH: &str = "x86_64";

/// Default archive extension when the source doesn't tell us otherwise.
pub const DEFAULT_EXTENSION: &str = "zst";

/// Outcome of an identity-sensitive version comparison.
///
/// Packages with different names have no version relationship at all, so
/// comparing them yields [`Incomparable`](VersionCmp::Incomparable) rather
/// than any boolean. Callers must handle that case explicitly.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VersionCmp {
    Less,
    Equal,
    Greater,
    Incomparable,
}

impl VersionCmp {
    /// The plain ordering, or `None` for different package names.
    pub fn ordering(self) -> Option<Ordering> {
        match self {
            VersionCmp::Less => Some(Ordering::Less),
            VersionCmp::Equal => Some(Ordering::Equal),
            VersionCmp::Greater => Some(Ordering::Greater),
            VersionCmp::Incomparable => None,
        }
    }

    pub fn is_incomparable(self) -> bool {
        self == VersionCmp::Incomparable
    }
}

/// Which artifact-derivation rule and key precision a package uses.
#[derive(Debug, Clone, PartialEq, Eq)]
enum PackageKind {
    /// Ordinary repository package; headers are injected only for
    /// kernel-image names.
    General { extension: String },
    /// Known kernel image; always paired with its headers package,
    /// fixed `zst` extension, coarser version key.
    Kernel,
}

/// One artifact a fetcher must retrieve: the detached signature and the
/// package archive itself.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Artifact {
    pub signature: String,
    pub archive: String,
}

impl Artifact {
    fn for_archive(archive: String) -> Self {
        Artifact {
            signature: format!("{archive}.sig"),
            archive,
        }
    }
}

/// An immutable versioned package.
///
/// Equality and hashing use the name plus the derived numeric version key,
/// so `"k=1.2"` and `"k=1.02"` are the same package for sets and
/// deduplication even though their raw version strings differ.
#[derive(Debug, Clone)]
pub struct Package {
    name: String,
    version: String,
    key: VersionKey,
    kind: PackageKind,
}

impl Package {
    /// Parse a general package from a `"name=version"` spec with the
    /// default archive extension.
    pub fn parse(spec: &str) -> Result<Self> {
        Self::with_extension(spec, DEFAULT_EXTENSION)
    }

    /// Parse a general package with an explicit archive extension.
    pub fn with_extension(spec: &str, extension: &str) -> Result<Self> {
        let (name, version) = split_spec(spec)?;
        Ok(Self::from_parts(name, version, extension))
    }

    /// Parse a kernel image package (coarse version key, unconditional
    /// headers companion).
    pub fn kernel(spec: &str) -> Result<Self> {
        let (name, version) = split_spec(spec)?;
        Ok(Package {
            name: name.to_string(),
            version: version.to_string(),
            key: VersionKey::encode(version, KERNEL),
            kind: PackageKind::Kernel,
        })
    }

    pub(crate) fn from_parts(name: &str, version: &str, extension: &str) -> Self {
        Package {
            name: name.to_string(),
            version: version.to_string(),
            key: VersionKey::encode(version, GENERAL),
            kind: PackageKind::General {
                extension: extension.to_string(),
            },
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn version(&self) -> &str {
        &self.version
    }

    /// Archive extension used in derived filenames.
    pub fn extension(&self) -> &str {
        match &self.kind {
            PackageKind::General { extension } => extension,
            PackageKind::Kernel => DEFAULT_EXTENSION,
        }
    }

    /// Compare versions with another package of the same name.
    ///
    /// Different names yield [`VersionCmp::Incomparable`].
    pub fn compare(&self, other: &Package) -> VersionCmp {
        if self.name != other.name {
            return VersionCmp::Incomparable;
        }
        match self.key.cmp(&other.key) {
            Ordering::Less => VersionCmp::Less,
            Ordering::Equal => VersionCmp::Equal,
            Ordering::Greater => VersionCmp::Greater,
        }
    }

    /// Deterministic total order over the canonical `"name=version"`
    /// string, defined for any pair of packages. Used for sorting mixed
    /// collections; it says nothing about version recency.
    pub fn canonical_cmp(&self, other: &Package) -> Ordering {
        let lhs = self
            .name
            .bytes()
            .chain(std::iter::once(b'='))
            .chain(self.version.bytes());
        let rhs = other
            .name
            .bytes()
            .chain(std::iter::once(b'='))
            .chain(other.version.bytes());
        lhs.cmp(rhs)
    }

    /// The artifacts a fetcher must download for this package, keyed by
    /// package name in insertion order.
    ///
    /// Kernel images (names starting with `linux`, excluding headers
    /// packages themselves) automatically pull in the matching
    /// `<name>-headers` artifact.
    pub fn required_artifacts(&self) -> IndexMap<String, Artifact> {
        let extension = self.extension();
        let mut artifacts = IndexMap::new();

        artifacts.insert(
            self.name.clone(),
            Artifact::for_archive(format!(
                "{}-{}-{ARCH}.pkg.tar.{extension}",
                self.name, self.version
            )),
        );

        let wants_headers = match self.kind {
            PackageKind::Kernel => true,
            PackageKind::General { .. } => {
                self.name.starts_with("linux") && !self.name.contains("headers")
            }
        };
        if wants_headers {
            artifacts.insert(
                format!("{}-headers", self.name),
                Artifact::for_archive(format!(
                    "{}-headers-{}-{ARCH}.pkg.tar.{extension}",
                    self.name, self.version
                )),
            );
        }

        artifacts
    }
}

fn split_spec(spec: &str) -> Result<(&str, &str)> {
    spec.split_once('=')
        .ok_or_else(|| Error::InvalidPackageSpec(spec.to_string()))
}

impl fmt::Display for Package {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}={}", self.name, self.version)
    }
}

impl PartialEq for Package {
    fn eq(&self, other: &Self) -> bool {
        self.name == other.name && self.key == other.key
    }
}

impl Eq for Package {}

impl Hash for Package {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.name.hash(state);
        self.key.hash(state);
    }
}
