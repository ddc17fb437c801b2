use anyhow::Result;
use clap::Parser;
use fscancel::{execute, report_usage_error, Args, Plan, NAME};
use std::process::ExitCode;
use wrappers_common::{
    configuration::get_configuration,
    log,
    telemetry::{get_subscriber, init_subscriber},
    FluxCli, Settings,
};

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<ExitCode> {
    let args = Args::parse();
    let settings: Settings = get_configuration()?;

    let level = if args.quiet {
        "error"
    } else if args.verbose {
        "info"
    } else {
        "warn"
    };
    let subscriber = get_subscriber(NAME.into(), level.into(), settings.logging.format, std::io::stderr);
    init_subscriber(subscriber)?;
    log!(debug, "{settings}");

    log!(
        warn,
        "WARNING: {NAME} is a wrapper script for the native \"flux job cancel\" command."
    );

    let login_user = settings.resolve_user(whoami::username);
    let plan = match Plan::from_args(&args, &login_user) {
        Ok(plan) => plan,
        Err(e) => {
            report_usage_error(&e);
            return Ok(ExitCode::FAILURE);
        }
    };

    let mut flux = FluxCli::new(&settings.flux);
    let stdin = std::io::stdin();
    let stdout = std::io::stdout();
    match execute(&plan, &mut flux, &mut stdin.lock(), &mut stdout.lock()).await {
        Ok(summary) => {
            log!(debug, "{NAME}: {summary:?}");
            Ok(ExitCode::SUCCESS)
        }
        Err(e) => {
            log!(error, "{NAME}: error: {e}");
            Ok(ExitCode::FAILURE)
        }
    }
}
