//! Command Line Interface (§6 "External Interfaces").
//!
//! Output of `--help`:
//! ```text
//! Offline compiler for point-in-polygon country lookup tables
//!
//!     Usage: quadgeo [OPTIONS] <COMMAND>
//!
//!     Commands:
//!         build  Build a lookup table blob (and optional generated module)
//!         stats  Report header fields and node counts for an existing blob
//!
//!     Options:
//!         -v, --verbose...  More output per occurrence
//!         -q, --quiet...    Less output per occurrence
//!         -h, --help        Print help
//!         -V, --version     Print version
//! ```

use std::path::PathBuf;
use std::str::FromStr;

use clap::{command, Args, Parser, Subcommand, ValueEnum};
use clap_verbosity_flag::{Verbosity, WarnLevel};

use crate::quantize::Precision;

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    #[command(flatten)]
    pub verbose: Verbosity<WarnLevel>,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Build a lookup table blob (and optionally a generated Rust module).
    Build(BuildArgs),
    /// Report header fields and node counts for an existing blob.
    Stats(StatsArgs),
}

#[derive(Args, Debug)]
pub struct BuildArgs {
    /// TOML file of build settings; explicit flags below override it.
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Lattice precision (decimal places retained per degree).
    #[arg(short, long, value_parser = Precision::from_str)]
    pub precision: Option<Precision>,

    /// Directory or `.qgt` file path for the output blob.
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Number of extra deterministic PRNG sample points per rectangle.
    #[arg(long)]
    pub sample_k: Option<u32>,

    /// Lattice point count below which a candidate leaf is exhaustively
    /// verified rather than accepted on sampling alone.
    #[arg(long)]
    pub brute_force_threshold: Option<u64>,

    /// Namespace used for the generated module and default output filename.
    #[arg(long)]
    pub namespace: Option<String>,

    /// Use the multi-threaded builder instead of the single-threaded one.
    #[arg(long)]
    pub parallel: bool,

    /// Emit a generated Rust module embedding the blob alongside it.
    #[arg(long)]
    pub emit_rust: bool,

    #[command(flatten)]
    pub oracle_source: OracleSource,
}

#[derive(Args, Debug)]
#[group(required = true, multiple = false)]
pub struct OracleSource {
    /// Use a built-in mock oracle for testing: rectangle, circle, or simple.
    #[arg(long, value_enum)]
    pub mock_oracle: Option<MockOracleKind>,

    /// Path to a shapefile describing country boundaries.
    ///
    /// Reading real-world boundary data is out of this build tool's core
    /// scope; this flag is accepted so the CLI surface matches the design,
    /// but it always fails with a clear "not implemented" error.
    #[arg(long)]
    pub shapefile: Option<PathBuf>,
}

#[derive(ValueEnum, Clone, Copy, Debug)]
pub enum MockOracleKind {
    Rectangle,
    Circle,
    Simple,
}

#[derive(Args, Debug)]
pub struct StatsArgs {
    /// Path to an existing `.qgt` blob file.
    pub input: PathBuf,
}
