use clap::{ArgGroup, Parser};

#[derive(Parser, Debug, Default)]
#[command(
    version,
    about = "List running and queued jobs in showq format.",
    long_about = None,
    group(ArgGroup::new("bucket").args(["completed", "blocked", "eligible", "running"]))
)]
pub struct Args {
    /// do not print a header
    #[arg(short = 'H', long = "noheader")]
    pub noheader: bool,

    /// show jobs run by user
    #[arg(short = 'u', long = "user", value_name = "<user>")]
    pub user: Option<String>,

    /// show only job with jobid
    #[arg(short = 'j', long = "jobid", value_name = "<jobid>")]
    pub jobid: Option<String>,

    /// display only completed jobs
    #[arg(short = 'c')]
    pub completed: bool,

    /// display only blocked jobs
    #[arg(short = 'b')]
    pub blocked: bool,

    /// display only eligible jobs
    #[arg(short = 'i')]
    pub eligible: bool,

    /// display only running jobs
    #[arg(short = 'r')]
    pub running: bool,
}
