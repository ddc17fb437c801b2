use anyhow::Result;
use clap::{CommandFactory, Parser};
use fsqueue::{execute, report_unknown_args, report_usage_error, Args, Listing, NAME};
use std::process::ExitCode;
use wrappers_common::{
    cli::split_known_args,
    configuration::get_configuration,
    log,
    telemetry::{get_subscriber, init_subscriber, level_for_verbosity},
    FluxCli, Settings,
};

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<ExitCode> {
    let split = split_known_args(Args::command(), std::env::args());
    let args = Args::parse_from(split.known);
    let settings: Settings = get_configuration()?;

    let subscriber = get_subscriber(
        NAME.into(),
        level_for_verbosity(args.verbosity()).into(),
        settings.logging.format,
        std::io::stderr,
    );
    init_subscriber(subscriber)?;
    log!(debug, "{settings}");

    report_unknown_args(&split.unknown);

    let listing = match Listing::from_args(&args) {
        Ok(listing) => listing,
        Err(e) => {
            report_usage_error(&e);
            return Ok(ExitCode::FAILURE);
        }
    };

    let mut flux = FluxCli::new(&settings.flux);
    let stdout = std::io::stdout();
    match execute(&args, &listing, &mut flux, &mut stdout.lock()).await {
        Ok(_) => Ok(ExitCode::SUCCESS),
        Err(e) => {
            log!(error, "{NAME}: error: {e}");
            Ok(ExitCode::FAILURE)
        }
    }
}
