use std::process::ExitCode;

use clap::Parser;
use logging_timer::{finish, stimer, Level};

use quadgeo::builder::TreeBuilder;
use quadgeo::cli::{BuildArgs, Cli, Command, MockOracleKind, StatsArgs};
use quadgeo::config::ConfigParser;
use quadgeo::country::{CountryTable, IsoCode};
use quadgeo::geometry::Rectangle;
use quadgeo::io::{parse_blob_path, read_blob_file, write_blob_file};
use quadgeo::node::CountryId;
use quadgeo::oracle::{CircleOracle, Oracle, OracleError, RectangleOracle, SimpleOracle};
use quadgeo::runtime::Table;
use quadgeo::serialize::serialize;

fn main() -> ExitCode {
    let cli = Cli::parse();
    env_logger::Builder::new()
        .filter_level(cli.verbose.log_level_filter())
        .init();

    let result = match cli.command {
        Command::Build(args) => run_build(args),
        Command::Stats(args) => run_stats(args),
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            log::error!("{e}");
            ExitCode::FAILURE
        }
    }
}

/// The mock oracle selected on the command line, held as a single
/// concrete enum rather than a trait object so it can be passed to both
/// the single- and multi-threaded builders (the latter is generic over
/// `Oracle + Send + Sync + 'static`, which rules out an unsized `dyn`).
enum SelectedOracle {
    Rectangle(RectangleOracle),
    Circle(CircleOracle),
    Simple(SimpleOracle),
}

impl Oracle for SelectedOracle {
    fn country_at(&self, ilat: u32, ilon: u32) -> Result<CountryId, OracleError> {
        match self {
            SelectedOracle::Rectangle(o) => o.country_at(ilat, ilon),
            SelectedOracle::Circle(o) => o.country_at(ilat, ilon),
            SelectedOracle::Simple(o) => o.country_at(ilat, ilon),
        }
    }
}

fn run_build(args: BuildArgs) -> Result<(), Box<dyn std::error::Error>> {
    let mut config = ConfigParser::from_config_file_path_opt(args.config.clone()).parse()?;

    if let Some(precision) = args.precision {
        config.precision = precision;
    }
    if let Some(sample_k) = args.sample_k {
        config.sample_k = sample_k;
    }
    if let Some(threshold) = args.brute_force_threshold {
        config.brute_force_threshold = threshold;
    }
    if let Some(namespace) = args.namespace.clone() {
        config.namespace = namespace;
    }

    let tmr = stimer!(Level::Info; "Build");

    let oracle = oracle_from_args(&args)?;
    let builder = TreeBuilder::new().with_config(config.clone());
    let tree = if args.parallel {
        builder.build_using_multi_threaded_algorithm(&oracle)?
    } else {
        builder.build_using_single_threaded_algorithm(&oracle)?
    };

    let root_rect = Rectangle::root(config.precision.x_max(), config.precision.y_max());
    let table = CountryTable::new(vec![IsoCode::EMPTY])?;
    let blob = serialize(&tree, root_rect, config.precision, &table);

    let output = args.output.unwrap_or_else(|| std::path::PathBuf::from("."));
    let blob_path = parse_blob_path(output, &config.namespace)?;
    write_blob_file(&blob, blob_path.clone())?;
    log::info!(
        "wrote {} bytes ({} leaves, {} internal nodes) to {}",
        blob.len(),
        tree.leaf_count(),
        tree.internal_count(),
        blob_path.display()
    );

    if args.emit_rust {
        let module_path = blob_path.with_extension("rs");
        let source = quadgeo::codegen::generate_rust_module(&config.namespace, &blob);
        std::fs::write(&module_path, source)?;
        log::info!("wrote generated module to {}", module_path.display());
    }

    finish!(tmr, "Build finished");
    Ok(())
}

fn oracle_from_args(args: &BuildArgs) -> Result<SelectedOracle, Box<dyn std::error::Error>> {
    if let Some(path) = &args.oracle_source.shapefile {
        return Err(format!(
            "shapefile-backed oracles are not implemented in this build tool core: {}",
            path.display()
        )
        .into());
    }

    let kind = args
        .oracle_source
        .mock_oracle
        .ok_or("either --mock-oracle or --shapefile must be given")?;

    Ok(match kind {
        MockOracleKind::Rectangle => SelectedOracle::Rectangle(RectangleOracle {
            rect_ilon: (0, 100),
            rect_ilat: (0, 100),
            id: 1,
        }),
        MockOracleKind::Circle => SelectedOracle::Circle(CircleOracle {
            center_ilat: 90,
            center_ilon: 180,
            radius: 50,
            id: 1,
        }),
        MockOracleKind::Simple => SelectedOracle::Simple(SimpleOracle { y_max: 180 }),
    })
}

fn run_stats(args: StatsArgs) -> Result<(), Box<dyn std::error::Error>> {
    let bytes = read_blob_file(args.input)?;
    let table = Table::decode(&bytes)?;
    println!("precision: {}", table.precision().as_u8());
    println!("country codes: {}", table.country_table().len());
    println!("blob size: {} bytes", bytes.len());
    Ok(())
}
