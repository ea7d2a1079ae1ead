use clap::Parser;
use gdf_core::logging;

mod cli;

use crate::cli::Cli;

fn main() {
    // Initialize logging as early as possible; stderr if the state dir is unusable.
    logging::init();

    // Usage errors exit 1 before any network traffic; --help/--version exit 0.
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(err) if !err.use_stderr() => err.exit(),
        Err(err) => {
            let _ = err.print();
            std::process::exit(1);
        }
    };

    if let Err(err) = cli.run() {
        tracing::error!("{:#}", err);
        eprintln!("gdf error: {:#}", err);
        std::process::exit(1);
    }
}
