pub mod arg;

pub use arg::Args;

use anyhow::Result;
use std::io::Write;
use wrappers_common::{
    job::parse_job_ids, log, FilterSet, Header, Hostlist, JobFilter, JobQuery, JobRecord,
    JobService, StateFilter, Template, UsageError, UserScope,
};

pub const NAME: &str = env!("CARGO_PKG_NAME");

const KNOWN_STATES: [(&str, StateFilter); 5] = [
    ("running", StateFilter::Running),
    ("r", StateFilter::Running),
    ("pending", StateFilter::Pending),
    ("pd", StateFilter::Pending),
    ("all", StateFilter::Active),
];

/// Log the "wrapper script" hint lines at `warn` or `debug`.
pub fn disclaimer(as_warning: bool) {
    let lines = [
        format!("{NAME}: hint: {NAME} is a wrapper script for the native \"flux jobs\" command."),
        format!("{NAME}: hint: See \"man flux jobs\" for help using the native commands."),
    ];
    for line in lines {
        if as_warning {
            log!(warn, "{line}");
        } else {
            log!(debug, "{line}");
        }
    }
}

/// Warn about arguments this wrapper does not implement.
pub fn report_unknown_args(unknown: &[String]) {
    if unknown.is_empty() {
        disclaimer(false);
        return;
    }
    log!(
        warn,
        "{NAME}: warning: \"{}\" is not supported by this wrapper and is being ignored.",
        unknown.join(" ")
    );
    disclaimer(true);
}

pub fn report_usage_error(error: &UsageError) {
    log!(error, "{NAME}: error: {error}");
    if let UsageError::InvalidState(_) = error {
        let valid: Vec<&str> = KNOWN_STATES.iter().map(|(name, _)| *name).collect();
        log!(
            error,
            "{NAME}: error: Valid job states include: {}",
            valid.join(",")
        );
    }
}

/// A validated listing request.
#[derive(Clone, Debug, PartialEq)]
pub struct Listing {
    pub query: JobQuery,
    pub filters: FilterSet,
    pub template: Template,
    pub noheader: bool,
    /// The `flux jobs` invocation that shows the same jobs
    pub native_command: String,
}

impl Listing {
    pub fn from_args(args: &Args) -> std::result::Result<Self, UsageError> {
        let mut native_command = String::from("flux jobs");

        let user = match &args.user {
            Some(user) => {
                native_command.push_str(&format!(" -u {user}"));
                UserScope::from(user.as_str())
            }
            None => {
                native_command.push_str(" -A");
                UserScope::All
            }
        };

        let states = match &args.state {
            Some(state) => {
                let state = StateFilter::lookup(&KNOWN_STATES, state)
                    .ok_or_else(|| UsageError::InvalidState(state.clone()))?;
                native_command.push_str(&format!(" -f {state}"));
                vec![state]
            }
            None => vec![StateFilter::Pending, StateFilter::Running],
        };

        let ids = match &args.jobs {
            Some(jobs) => {
                let ids = parse_job_ids(jobs)?;
                for id in jobs.split(',').filter(|id| !id.trim().is_empty()) {
                    native_command.push(' ');
                    native_command.push_str(id.trim());
                }
                ids
            }
            None => Vec::new(),
        };

        let mut filters = FilterSet::new();
        if let Some(nodelist) = &args.nodelist {
            filters.with(JobFilter::Nodes(Hostlist::parse(nodelist)?));
        }

        Ok(Self {
            query: JobQuery::new(user).ids(ids).states(states),
            filters,
            template: Template::parse(&args.format),
            noheader: args.noheader,
            native_command,
        })
    }

    /// Report the designator of every template token that names no field.
    pub fn report_unknown_tokens(&self) {
        for token in self.template.unknown_tokens() {
            let designator = token.trim_start_matches('%');
            log!(
                error,
                "{NAME}: error: Invalid job format specification: {designator}"
            );
        }
    }

    /// Write the header (unless disabled) and one line per job.
    pub fn write<W: Write>(&self, jobs: &[JobRecord], out: &mut W) -> std::io::Result<()> {
        if !self.noheader {
            writeln!(out, "{}", self.template.render(&Header))?;
        }
        for job in jobs {
            writeln!(out, "{}", self.template.render(job))?;
        }
        Ok(())
    }
}

/// Fetch, filter and print. Returns the number of jobs listed.
pub async fn execute<S, W>(args: &Args, listing: &Listing, service: &mut S, out: &mut W) -> Result<usize>
where
    S: JobService,
    W: Write,
{
    let jobs = service.list_jobs(&listing.query).await?;
    let jobs = listing.filters.apply(jobs);

    log!(debug, "{NAME}: hint: To see an equivelent output from flux try running,");
    log!(debug, "");
    log!(debug, "\t{}", listing.native_command);
    log!(debug, "");

    log!(info, "-----------------------------");
    for (name, value) in args.describe() {
        log!(info, "{name:<11} = {value}");
    }
    log!(info, "-----------------------------");
    log!(info, "");
    log!(info, "");
    log!(info, "{}", chrono::Local::now().format("%a %b %d %H:%M:%S %Y"));
    log!(
        info,
        "last_update_time={} records={}",
        chrono::Utc::now().timestamp(),
        jobs.len()
    );

    listing.report_unknown_tokens();
    listing.write(&jobs, out)?;
    Ok(jobs.len())
}
