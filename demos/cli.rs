use std::path::PathBuf;

use chrs_persiann::{Client, DataType, FetchParams};
use clap::{Parser, ValueEnum};
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Debug, Clone, Copy, ValueEnum)]
enum Collection {
    Persiann,
    Ccs,
    Cdr,
    Pdir,
    /// All four collections, one after another.
    All,
}

/// Order and download PERSIANN precipitation data from the CHRS data portal.
///
/// Endpoints and timeouts can be overridden with the CHRS_* environment variables.
#[derive(Debug, Parser)]
#[command(name = "chrs-persiann")]
struct Args {
    collection: Collection,

    /// Start date, yyyymmddHH
    #[arg(long, default_value = "2021010100")]
    start: String,

    /// End date, yyyymmddHH
    #[arg(long, default_value = "2021010300")]
    end: String,

    /// Address notified by the portal when the download link is ready
    #[arg(long)]
    email: String,

    #[arg(long, default_value = "~/Downloads")]
    dir: PathBuf,

    /// ArcGrid, Tif or NetCDF
    #[arg(long, default_value = "Tif")]
    format: String,

    /// 1hrly, 3hrly, 6hrly, daily, monthly or yearly
    #[arg(long, default_value = "daily")]
    timestep: String,

    #[arg(long, default_value = "zip")]
    compression: String,

    #[arg(short, long)]
    verbose: bool,
}

fn init_logger(verbose: bool) {
    let default = if verbose {
        "chrs_persiann=debug,info"
    } else {
        "chrs_persiann=info"
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));

    tracing_subscriber::registry()
        .with(filter)
        .with(
            tracing_subscriber::fmt::layer()
                .with_target(false)
                .compact(),
        )
        .init();
}

fn main() {
    let args = Args::parse();
    init_logger(args.verbose);

    let client = match Client::from_env() {
        Ok(c) => c,
        Err(e) => {
            eprintln!("{e}");
            std::process::exit(2);
        }
    };

    let params = FetchParams::new(&args.start, &args.end, &args.email, &args.dir)
        .file_format(&args.format)
        .timestep(&args.timestep)
        .compression(&args.compression);

    let collections: Vec<DataType> = match args.collection {
        Collection::Persiann => vec![DataType::Persiann],
        Collection::Ccs => vec![DataType::Ccs],
        Collection::Cdr => vec![DataType::Cdr],
        Collection::Pdir => vec![DataType::Pdir],
        Collection::All => DataType::ALL.to_vec(),
    };

    let mut failed = false;
    for data_type in collections {
        match client.fetch(data_type, &params) {
            Ok(download) => {
                println!(
                    "{data_type}: {bytes} bytes -> {path}",
                    bytes = download.size_bytes,
                    path = download.path.display()
                );
            }
            Err(e) => {
                failed = true;
                eprintln!("{data_type}: {e}");
                let mut cause = std::error::Error::source(&e);
                while let Some(inner) = cause {
                    eprintln!("{data_type}:   caused by: {inner}");
                    cause = inner.source();
                }
                if let Some(path) = e.partial_file() {
                    eprintln!("{data_type}: incomplete file left at {}", path.display());
                }
            }
        }
    }

    if failed {
        std::process::exit(1);
    }
}
