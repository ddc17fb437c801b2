use clap::Parser;

#[derive(Parser, Debug, Default)]
#[command(version, about = "scancel like wrapper for Flux.", long_about = None)]
pub struct Args {
    /// require response from user for each job
    #[arg(short = 'i', long = "interactive")]
    pub interactive: bool,

    /// act only on jobs with this name
    #[arg(short = 'n', long = "name", value_name = "job_name")]
    pub name: Option<String>,

    /// act only on jobs in this partition
    #[arg(short = 'p', long = "partition", value_name = "partition")]
    pub partition: Option<String>,

    /// disable warnings
    #[arg(short = 'Q', long = "quiet")]
    pub quiet: bool,

    /// signal to send to job, default is SIGKILL
    #[arg(
        short = 's',
        long = "signal",
        value_name = "name|integer",
        num_args = 0..=1,
        default_missing_value = "KILL"
    )]
    pub signal: Option<String>,

    /// act only on jobs in this state
    #[arg(short = 't', long = "state", value_name = "state")]
    pub state: Option<String>,

    /// act only on jobs of this user
    #[arg(short = 'u', long = "user", value_name = "username")]
    pub user: Option<String>,

    /// show verbose output
    #[arg(short = 'v', long = "verbose")]
    pub verbose: bool,

    /// act only on jobs on these nodes
    #[arg(short = 'w', long = "nodelist", value_name = "node_list")]
    pub nodelist: Option<String>,

    /// Job ids
    #[arg(value_name = "job_id")]
    pub job_ids: Vec<String>,
}

impl Args {
    /// Whether anything narrows down which jobs to act on.
    pub fn identifies_jobs(&self) -> bool {
        !self.job_ids.is_empty()
            || self.name.is_some()
            || self.partition.is_some()
            || self.state.is_some()
            || self.user.is_some()
            || self.nodelist.is_some()
    }
}
