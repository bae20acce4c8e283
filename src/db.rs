//! Repository database parsing
//!
//! Pacman sync databases are a stream of records, each a run of
//! `%MARKER%` lines followed by value lines:
//!
//! ```text
//! %FILENAME%
//! linux66-6.6.21-1-x86_64.pkg.tar.zst
//!
//! %NAME%
//! linux66
//!
//! %VERSION%
//! 6.6.21-1
//!
//! %DEPENDS%
//! coreutils
//! linux66=6.6.21-1
//! ```
//!
//! There is no end-of-record marker; a new `%FILENAME%` implicitly starts
//! the next record. The parser is a one-shot batch pass: feed it the full
//! decompressed text, read the catalog afterwards.
//!
//! Only the four markers above are recognized. Any other `%` line (or a
//! blank line) just resets the current field; everything else in the dump
//! is ignored. Under `%DEPENDS%`, only lines naming a kernel package
//! (containing `linux`, excluding `spl` module packages) are kept, parsed
//! as full [`Package`] values.

use std::collections::HashSet;

use indexmap::IndexMap;
use tracing::{debug, warn};

use crate::package::Package;
use crate::{Error, Result};

/// Which field the upcoming value lines belong to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Field {
    FileName,
    PkgName,
    Version,
    KernelDepends,
}

/// One parsed database entry, keyed by package name in [`Database`].
#[derive(Debug, Clone, Default)]
pub struct Record {
    /// Raw archive filename from `%FILENAME%`.
    pub file_name: Option<String>,
    /// Raw version string from `%VERSION%`.
    pub version: Option<String>,
    /// Typed package value, built as soon as the version line is seen.
    pub package: Option<Package>,
    /// Kernel image this package depends on, if any of its `%DEPENDS%`
    /// lines named one.
    pub kernel_depends: Option<Package>,
}

#[derive(Debug, Default)]
struct RecordBuilder {
    pkg_name: Option<String>,
    record: Record,
}

/// A spot where the dump broke the expected record shape. Lenient parsing
/// only logs these; strict parsing surfaces the first one as an error.
struct Violation {
    line: usize,
    reason: String,
}

/// A fully parsed repository database.
///
/// Built in one synchronous pass over the decompressed text and read-only
/// afterwards; all views below are pure functions of the parsed records.
#[derive(Debug, Clone)]
pub struct Database {
    records: IndexMap<String, Record>,
}

impl Database {
    /// Parse a decompressed database dump, tolerating malformed records.
    ///
    /// This is the default mode: incomplete or out-of-order records
    /// degrade to absent fields (logged at `warn`) instead of failing the
    /// whole catalog.
    pub fn parse(text: &str) -> Self {
        Self::run(text).0
    }

    /// Parse a decompressed database dump, rejecting malformed records.
    ///
    /// Fails with [`Error::MalformedRecord`] on a field value before the
    /// first `%FILENAME%`, a `%VERSION%` value with no preceding name or
    /// filename, or an unparseable kernel dependency line. The error
    /// carries the first offending line.
    pub fn parse_strict(text: &str) -> Result<Self> {
        let (db, violations) = Self::run(text);
        match violations.into_iter().next() {
            Some(v) => Err(Error::MalformedRecord {
                line: v.line,
                reason: v.reason,
            }),
            None => Ok(db),
        }
    }

    fn run(text: &str) -> (Self, Vec<Violation>) {
        let mut builders: Vec<RecordBuilder> = Vec::new();
        let mut current: Option<Field> = None;
        let mut violations: Vec<Violation> = Vec::new();

        for (idx, raw) in text.lines().enumerate() {
            let line = raw.trim();
            let lineno = idx + 1;

            if line.contains("%FILENAME%") {
                builders.push(RecordBuilder::default());
                current = Some(Field::FileName);
            } else if line.contains("%NAME%") {
                current = Some(Field::PkgName);
            } else if line.contains("%VERSION%") {
                current = Some(Field::Version);
            } else if line.contains("%DEPENDS%") {
                current = Some(Field::KernelDepends);
            } else if line.contains('%') || line.is_empty() {
                // Unrecognized marker or record separator.
                current = None;
            } else if let Some(field) = current {
                let Some(builder) = builders.last_mut() else {
                    warn!("line {lineno}: value before first %FILENAME%, skipping");
                    violations.push(Violation {
                        line: lineno,
                        reason: format!("field value '{line}' before first %FILENAME%"),
                    });
                    continue;
                };
                assign(builder, field, line, lineno, &mut violations);
            }
        }

        let mut records = IndexMap::with_capacity(builders.len());
        for builder in builders {
            let Some(name) = builder.pkg_name else {
                warn!("dropping record without %NAME% (file: {:?})", builder.record.file_name);
                continue;
            };
            records.insert(name, builder.record);
        }

        (Database { records }, violations)
    }

    /// All parsed records, keyed by package name in stream order.
    pub fn records(&self) -> &IndexMap<String, Record> {
        &self.records
    }

    /// Look up a single record by package name.
    pub fn get(&self, name: &str) -> Option<&Record> {
        self.records.get(name)
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Every record's package, in catalog order. Records that never saw a
    /// `%VERSION%` line have no package and are skipped.
    pub fn packages(&self) -> Vec<Package> {
        self.records
            .values()
            .filter_map(|r| r.package.clone())
            .collect()
    }

    /// All kernel image dependencies across the catalog, sorted by
    /// canonical `name=version` order and deduplicated by name plus
    /// version key.
    pub fn kernel_dependencies(&self) -> Vec<Package> {
        sort_and_dedup(
            self.records
                .values()
                .filter_map(|r| r.kernel_depends.clone())
                .collect(),
        )
    }

    /// Sorted, deduplicated union of [`packages`](Self::packages) and
    /// [`kernel_dependencies`](Self::kernel_dependencies).
    pub fn packages_with_kernel_dependencies(&self) -> Vec<Package> {
        let mut all = self.packages();
        all.extend(
            self.records
                .values()
                .filter_map(|r| r.kernel_depends.clone()),
        );
        sort_and_dedup(all)
    }
}

/// True for `%DEPENDS%` lines that name a kernel image package. The
/// exclusion of `spl` filters out ZFS module packages that would otherwise
/// match on their `linuxXX` prefix.
fn is_kernel_module_dep(line: &str) -> bool {
    line.contains("linux") && !line.contains("spl")
}

fn assign(
    builder: &mut RecordBuilder,
    field: Field,
    line: &str,
    lineno: usize,
    violations: &mut Vec<Violation>,
) {
    match field {
        Field::FileName => builder.record.file_name = Some(line.to_string()),
        Field::PkgName => builder.pkg_name = Some(line.to_string()),
        Field::KernelDepends => {
            if !is_kernel_module_dep(line) {
                debug!("line {lineno}: ignoring non-kernel dependency '{line}'");
                return;
            }
            match Package::parse(line) {
                Ok(pkg) => builder.record.kernel_depends = Some(pkg),
                Err(e) => {
                    warn!("line {lineno}: skipping kernel dependency '{line}': {e}");
                    violations.push(Violation {
                        line: lineno,
                        reason: format!("bad kernel dependency: {e}"),
                    });
                }
            }
        }
        Field::Version => {
            builder.record.version = Some(line.to_string());
            // The dump guarantees %FILENAME% and %NAME% precede %VERSION%;
            // build the typed package the moment the version arrives.
            let extension = builder
                .record
                .file_name
                .as_deref()
                .and_then(|f| f.rsplit('.').next());
            match (&builder.pkg_name, extension) {
                (Some(name), Some(ext)) => {
                    builder.record.package = Some(Package::from_parts(name, line, ext));
                }
                _ => {
                    warn!("line {lineno}: %VERSION% before %NAME% or %FILENAME%, record has no package");
                    violations.push(Violation {
                        line: lineno,
                        reason: "%VERSION% before %NAME% or %FILENAME%".to_string(),
                    });
                }
            }
        }
    }
}

/// Sort by the canonical string order, then drop later duplicates by
/// `(name, version key)` equality.
fn sort_and_dedup(mut packages: Vec<Package>) -> Vec<Package> {
    packages.sort_by(|a, b| a.canonical_cmp(b));
    let mut seen = HashSet::new();
    packages.retain(|pkg| seen.insert(pkg.clone()));
    packages
}
