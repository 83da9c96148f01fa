// src/main.rs

use convoy::errors::ConvoyError;
use convoy::relay::Palette;
use convoy::{cli, logging, run};

/// Exit status for a pre-run configuration-discovery failure, distinct from
/// ordinary fatal errors.
const EXIT_CONFIG_DISCOVERY: i32 = 2;

#[tokio::main]
async fn main() {
    let args = cli::parse();
    let palette = Palette::new(!args.no_color);

    if let Err(err) = run_main(args).await {
        eprintln!("{}", palette.paint_diagnostic(&format!("Error: {err}")));

        let code = match err {
            ConvoyError::ConfigDiscovery { .. } => EXIT_CONFIG_DISCOVERY,
            _ => 1,
        };
        std::process::exit(code);
    }
}

async fn run_main(args: cli::CliArgs) -> convoy::errors::Result<()> {
    logging::init_logging(args.log_level)?;
    run(args).await
}
