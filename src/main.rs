#![forbid(unsafe_code)]

use clap::Parser;
use lbyad_lib::{UnpackReport, Unpacker};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

#[derive(Debug, Parser)]
#[command(name = "lbyad", version, about = "Unpacks TheoTown assets from an apk/xapk/apks file")]
struct Cli {
    /// The apk/xapk/apks file to process.
    apk_file: PathBuf,

    /// The directory to output to (defaults to the current directory).
    #[arg(short = 'o', long)]
    output: Option<PathBuf>,

    /// Turns verbose logging on.
    #[arg(short = 'v', long, default_value_t = false)]
    verbose: bool,

    /// Write `.json` files exactly as decrypted.
    #[arg(long, default_value_t = false)]
    keep_json: bool,

    /// Don't dump `scripting.json` into `lua_src/`.
    #[arg(long, default_value_t = false)]
    no_scripts: bool,

    /// Extract PNGs too, even though they don't decrypt properly.
    #[arg(long, default_value_t = false)]
    include_png: bool,
}

fn init_logging(verbose: bool) {
    let default_level: &str = if verbose { "debug" } else { "info" };
    let filter: EnvFilter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .without_time()
        .with_target(false)
        .init();
}

fn run(cli: Cli) -> lbyad_lib::Result<UnpackReport> {
    let output: PathBuf = match cli.output {
        Some(output) => output,
        None => std::env::current_dir().map_err(|e| lbyad_lib::Error::Io {
            path: PathBuf::from("."),
            source: e,
        })?,
    };

    std::fs::create_dir_all(&output).map_err(|e| lbyad_lib::Error::Io {
        path: output.clone(),
        source: e,
    })?;

    let mut unpacker: Unpacker = Unpacker::new();
    unpacker.set_verbose(cli.verbose);
    unpacker.set_reformat_json(!cli.keep_json);
    unpacker.set_export_scripts(!cli.no_scripts);

    if cli.include_png {
        unpacker.set_excluded_extensions(Vec::<String>::new());
    }

    unpacker.unpack(&cli.apk_file, &output)
}

fn main() {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    match run(cli) {
        Ok(report) => {
            println!(
                "ok: {} files written, {} skipped, {} warnings",
                report.extraction.written.len(),
                report.extraction.skipped.len(),
                report.extraction.warnings.len()
            );
        }
        Err(e) => {
            eprintln!("error: {e}");
            std::process::exit(1);
        }
    }
}
