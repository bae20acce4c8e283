//! repodb CLI
//!
//! Inspects a pacman sync database file: lists the parsed catalog, the
//! kernel dependencies it pulls in, and the artifact files a fetcher
//! would need to download.

use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};
use tracing::{debug, info, Level};
use tracing_subscriber::FmtSubscriber;

use repodb::{decompress_to_string, Codec, Database, Package, Result};

#[derive(Parser)]
#[command(name = "repodb")]
#[command(about = "Pacman repository database inspector", long_about = None)]
#[command(version)]
struct Cli {
    /// Log level (error, warn, info, debug, trace)
    #[arg(long, default_value = "warn")]
    log_level: String,

    /// Fail on malformed records instead of skipping them
    #[arg(long)]
    strict: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List every package in the database
    Packages {
        /// Path to the database file (xz, zstd, gzip or plain text)
        db: PathBuf,

        /// Emit JSON instead of one package per line
        #[arg(long)]
        json: bool,
    },

    /// List kernel image dependencies, sorted and deduplicated
    KernelDeps {
        /// Path to the database file
        db: PathBuf,

        /// Include the packages themselves (sorted, deduplicated union)
        #[arg(long)]
        union: bool,

        /// Emit JSON instead of one package per line
        #[arg(long)]
        json: bool,
    },

    /// List the artifact files a fetcher must download
    Artifacts {
        /// Path to the database file
        db: PathBuf,

        /// Emit JSON instead of one filename per line
        #[arg(long)]
        json: bool,
    },
}

fn setup_logging(level: &str) {
    let level = match level.to_lowercase().as_str() {
        "error" => Level::ERROR,
        "warn" => Level::WARN,
        "info" => Level::INFO,
        "debug" => Level::DEBUG,
        "trace" => Level::TRACE,
        _ => Level::WARN,
    };

    let subscriber = FmtSubscriber::builder()
        .with_max_level(level)
        .with_target(false)
        .compact()
        .finish();

    tracing::subscriber::set_global_default(subscriber).expect("Failed to set tracing subscriber");
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    setup_logging(&cli.log_level);

    match cli.command {
        Commands::Packages { db, json } => {
            let db = load_database(&db, cli.strict)?;
            cmd_packages(&db, json)
        }
        Commands::KernelDeps { db, union, json } => {
            let db = load_database(&db, cli.strict)?;
            cmd_kernel_deps(&db, union, json)
        }
        Commands::Artifacts { db, json } => {
            let db = load_database(&db, cli.strict)?;
            cmd_artifacts(&db, json)
        }
    }
}

fn load_database(path: &Path, strict: bool) -> Result<Database> {
    let raw = std::fs::read(path)?;
    debug!("read {} bytes, codec {:?}", raw.len(), Codec::detect(&raw));

    let text = decompress_to_string(&raw)?;
    let db = if strict {
        Database::parse_strict(&text)?
    } else {
        Database::parse(&text)
    };

    info!("parsed {} records from {:?}", db.len(), path);
    Ok(db)
}

#[derive(serde::Serialize)]
struct PackageView<'a> {
    name: &'a str,
    version: &'a str,
}

impl<'a> PackageView<'a> {
    fn from(pkg: &'a Package) -> Self {
        PackageView {
            name: pkg.name(),
            version: pkg.version(),
        }
    }
}

fn print_packages(packages: &[Package], json: bool) -> Result<()> {
    if json {
        let views: Vec<PackageView> = packages.iter().map(PackageView::from).collect();
        println!("{}", serde_json::to_string_pretty(&views)?);
    } else {
        for pkg in packages {
            println!("{pkg}");
        }
    }
    Ok(())
}

fn cmd_packages(db: &Database, json: bool) -> Result<()> {
    print_packages(&db.packages(), json)
}

fn cmd_kernel_deps(db: &Database, union: bool, json: bool) -> Result<()> {
    let packages = if union {
        db.packages_with_kernel_dependencies()
    } else {
        db.kernel_dependencies()
    };
    print_packages(&packages, json)
}

fn cmd_artifacts(db: &Database, json: bool) -> Result<()> {
    let packages = db.packages_with_kernel_dependencies();

    if json {
        let mut all = indexmap::IndexMap::new();
        for pkg in &packages {
            all.extend(pkg.required_artifacts());
        }
        println!("{}", serde_json::to_string_pretty(&all)?);
    } else {
        for pkg in &packages {
            for artifact in pkg.required_artifacts().values() {
                println!("{}", artifact.archive);
                println!("{}", artifact.signature);
            }
        }
    }
    Ok(())
}
