use clap::{ArgAction, Parser};
use wrappers_common::format::DEFAULT_FORMAT;

#[derive(Parser, Debug)]
#[command(
    version,
    about = "List running and queued jobs in squeue format.",
    long_about = None,
    disable_help_flag = true
)]
pub struct Args {
    /// show jobs run by user
    #[arg(short = 'u', long = "user", value_name = "<user>")]
    pub user: Option<String>,

    /// use "-t all" to show jobs in all states, including completed jobs
    #[arg(short = 't', long = "state", value_name = "<state>")]
    pub state: Option<String>,

    /// display only jobs specified
    #[arg(short = 'j', long = "jobs", value_name = "<jobid>,<jobid>,....")]
    pub jobs: Option<String>,

    /// do not print a header
    #[arg(short = 'h', long = "noheader")]
    pub noheader: bool,

    /// format specification
    #[arg(short = 'o', long = "format", value_name = "<format>", default_value = DEFAULT_FORMAT)]
    pub format: String,

    /// report details of script actions (twice for equivalent flux commands)
    #[arg(short = 'v', long = "verbose", action = ArgAction::Count)]
    pub verbose: u8,

    /// show equivalent flux commands
    #[arg(long = "very-verbose")]
    pub very_verbose: bool,

    /// show jobs that ran on nodelist
    #[arg(short = 'w', long = "nodelist", value_name = "<nodelist>")]
    pub nodelist: Option<String>,

    /// Print help
    #[arg(long = "help", action = ArgAction::Help)]
    pub help: Option<bool>,
}

impl Args {
    /// `-v` count with `--very-verbose` folded in.
    pub fn verbosity(&self) -> u8 {
        if self.very_verbose {
            self.verbose.max(2)
        } else {
            self.verbose
        }
    }

    /// Argument names and values, as squeue prints them when verbose.
    pub fn describe(&self) -> Vec<(&'static str, String)> {
        let show = |value: &Option<String>| value.clone().unwrap_or_else(|| "(null)".to_string());
        vec![
            ("user", show(&self.user)),
            ("state", show(&self.state)),
            ("jobs", show(&self.jobs)),
            ("noheader", self.noheader.to_string()),
            ("format", self.format.clone()),
            ("verbose", self.verbosity().to_string()),
            ("nodelist", show(&self.nodelist)),
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let args = Args::parse_from(["fsqueue"]);
        assert_eq!(args.format, DEFAULT_FORMAT);
        assert!(!args.noheader);
        assert_eq!(args.verbosity(), 0);
    }

    #[test]
    fn test_short_h_is_noheader() {
        let args = Args::parse_from(["fsqueue", "-h", "-u", "alice"]);
        assert!(args.noheader);
        assert_eq!(args.user.as_deref(), Some("alice"));
    }

    #[test]
    fn test_verbosity() {
        assert_eq!(Args::parse_from(["fsqueue", "-v"]).verbosity(), 1);
        assert_eq!(Args::parse_from(["fsqueue", "-vv"]).verbosity(), 2);
        assert_eq!(Args::parse_from(["fsqueue", "--very-verbose"]).verbosity(), 2);
    }

    #[test]
    fn test_describe() {
        let args = Args::parse_from(["fsqueue", "-t", "pd"]);
        let described = args.describe();
        assert_eq!(described[0], ("user", "(null)".to_string()));
        assert_eq!(described[1], ("state", "pd".to_string()));
    }
}
