use anyhow::Result;
use clap::{CommandFactory, Parser};
use fshowq::{execute, report_unknown_args, Args, Report, NAME};
use std::process::ExitCode;
use wrappers_common::{
    cli::split_known_args,
    configuration::get_configuration,
    log,
    telemetry::{get_subscriber, init_subscriber},
    FluxCli, Settings,
};

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<ExitCode> {
    let split = split_known_args(Args::command(), std::env::args());
    let args = Args::parse_from(split.known);
    let settings: Settings = get_configuration()?;

    let subscriber = get_subscriber(NAME.into(), "warn".into(), settings.logging.format, std::io::stderr);
    init_subscriber(subscriber)?;
    log!(debug, "{settings}");

    report_unknown_args(&split.unknown);

    let report = match Report::from_args(&args) {
        Ok(report) => report,
        Err(e) => {
            log!(error, "{NAME}: error: {e}");
            return Ok(ExitCode::FAILURE);
        }
    };

    let mut flux = FluxCli::new(&settings.flux);
    let stdout = std::io::stdout();
    match execute(&report, &mut flux, &mut stdout.lock()).await {
        Ok(_) => Ok(ExitCode::SUCCESS),
        Err(e) => {
            log!(error, "{NAME}: error: {e}");
            Ok(ExitCode::FAILURE)
        }
    }
}
