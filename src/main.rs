use std::process::exit;

use clap::Parser;
use log::LevelFilter;

use assetql::cli::{run, Cli, CliError};

fn init_logging(verbose: u8) {
    let level = match verbose {
        0 => LevelFilter::Warn,
        1 => LevelFilter::Info,
        _ => LevelFilter::Debug,
    };
    let mut builder = pretty_env_logger::formatted_builder();
    builder.filter_level(level);
    if let Ok(filters) = std::env::var("RUST_LOG") {
        builder.parse_filters(&filters);
    }
    builder.init();
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    init_logging(cli.verbose);
    match run(cli).await {
        Ok(()) => {}
        Err(CliError::Reported) => exit(1),
        Err(err) => {
            eprintln!("error: {}", err);
            exit(1);
        }
    }
}
