pub mod arg;

pub use arg::Args;

use anyhow::{bail, Result};
use std::io::{self, BufRead, Write};
use wrappers_common::{
    job::parse_job_ids, log, FilterSet, Hostlist, JobFilter, JobQuery, JobRecord, JobService,
    MutationError, Signal, StateFilter, UsageError, UserScope,
};

pub const NAME: &str = env!("CARGO_PKG_NAME");

const KNOWN_STATES: [(&str, StateFilter); 4] = [
    ("running", StateFilter::Running),
    ("r", StateFilter::Running),
    ("pending", StateFilter::Pending),
    ("pd", StateFilter::Pending),
];

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Action {
    Cancel,
    Signal(Signal),
}

/// Everything needed to act on jobs, validated up front.
#[derive(Clone, Debug, PartialEq)]
pub struct Plan {
    pub query: JobQuery,
    pub filters: FilterSet,
    pub action: Action,
    pub interactive: bool,
    pub verbose: bool,
}

impl Plan {
    /// Validate the command line. `login_user` scopes the request when no
    /// `--user` is given.
    pub fn from_args(args: &Args, login_user: &str) -> std::result::Result<Self, UsageError> {
        if !args.identifies_jobs() {
            return Err(UsageError::NoJobIdentification);
        }

        let action = match &args.signal {
            Some(signal) => Action::Signal(signal.parse()?),
            None => Action::Cancel,
        };

        let mut filters = FilterSet::new();
        let states = match &args.state {
            Some(state) => {
                let state = StateFilter::lookup(&KNOWN_STATES, state)
                    .ok_or_else(|| UsageError::InvalidState(state.clone()))?;
                filters.fetched("state", state.as_str());
                vec![state]
            }
            None => vec![StateFilter::Pending, StateFilter::Running],
        };

        let ids = parse_job_ids(&args.job_ids.join(","))?;

        let user = args.user.as_deref().unwrap_or(login_user);
        let user = if user == "root" {
            UserScope::All
        } else {
            UserScope::from(user)
        };
        filters.fetched("user", user.to_string());

        if let Some(nodelist) = &args.nodelist {
            filters.with(JobFilter::Nodes(Hostlist::parse(nodelist)?));
        }
        if let Some(name) = &args.name {
            filters.with(JobFilter::Name(name.clone()));
        }
        if let Some(partition) = &args.partition {
            filters.with(JobFilter::Partition(partition.clone()));
        }

        Ok(Self {
            query: JobQuery::new(user).ids(ids).states(states),
            filters,
            action,
            interactive: args.interactive,
            verbose: args.verbose,
        })
    }
}

/// Log a pre-flight error the way scancel words it.
pub fn report_usage_error(error: &UsageError) {
    match error {
        UsageError::UnknownSignal(_) => log!(error, "{error}"),
        UsageError::InvalidState(_) => {
            log!(error, "{error}");
            log!(error, "Valid job states are PENDING and RUNNING");
        }
        _ => log!(error, "{NAME}: error: {error}"),
    }
}

/// Ask whether to act on `job`. Only `y` or `n` are accepted; end of input
/// counts as `n`.
pub fn confirm<R: BufRead, W: Write>(
    job: &JobRecord,
    input: &mut R,
    output: &mut W,
) -> io::Result<bool> {
    loop {
        write!(
            output,
            "Cancel job_id={} name={} partition={} [y/n]? ",
            job.id, job.name, job.queue
        )?;
        output.flush()?;

        let mut answer = String::new();
        if input.read_line(&mut answer)? == 0 {
            writeln!(output)?;
            return Ok(false);
        }
        match answer.trim().to_lowercase().as_str() {
            "y" => return Ok(true),
            "n" => return Ok(false),
            _ => {}
        }
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Summary {
    /// Jobs the scheduler accepted a request for
    pub done: usize,
    /// Jobs declined at the prompt
    pub skipped: usize,
    pub denied: usize,
    pub not_found: usize,
}

/// Fetch the matching jobs and cancel or signal each in turn.
///
/// Permission and not-found failures are logged and the loop moves on. Any
/// other failure stops the loop and is returned.
pub async fn execute<S, R, W>(
    plan: &Plan,
    service: &mut S,
    input: &mut R,
    output: &mut W,
) -> Result<Summary>
where
    S: JobService,
    R: BufRead,
    W: Write,
{
    let jobs = service.list_jobs(&plan.query).await?;
    let jobs = plan.filters.apply(jobs);

    if plan.verbose && jobs.is_empty() {
        log!(
            error,
            "{NAME}: error: No active jobs match ALL job filters, including: {}",
            plan.filters.describe()
        );
    }

    let mut summary = Summary::default();
    for job in &jobs {
        if plan.interactive && !confirm(job, input, output)? {
            summary.skipped += 1;
            continue;
        }

        let outcome = match plan.action {
            Action::Cancel => service.cancel(job.id).await,
            Action::Signal(signal) => service.kill(job.id, signal).await,
        };
        match outcome {
            Ok(()) => {
                log!(info, "{NAME}: {:?} sent to job {}", plan.action, job.id);
                summary.done += 1;
            }
            Err(e @ MutationError::PermissionDenied) => {
                log!(error, "{NAME}: error: Kill job error on job id {}: {e}", job.id);
                summary.denied += 1;
            }
            Err(e @ MutationError::NotFound) => {
                if plan.verbose {
                    log!(error, "{NAME}: error: Kill job error on job id {}: {e}", job.id);
                }
                summary.not_found += 1;
            }
            Err(MutationError::Fault(reason)) => {
                bail!("Kill job error on job id {}: {reason}", job.id)
            }
        }
    }

    Ok(summary)
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;
    use std::io::Cursor;
    use wrappers_common::memory::Mutation;
    use wrappers_common::{InMemoryScheduler, JobId, JobStatus};

    fn args(argv: &[&str]) -> Args {
        Args::parse_from(std::iter::once("fscancel").chain(argv.iter().copied()))
    }

    fn plan(argv: &[&str]) -> Plan {
        Plan::from_args(&args(argv), "alice").unwrap()
    }

    fn jobs() -> Vec<JobRecord> {
        vec![
            JobRecord::new(JobId(10), "alice", "sim")
                .with_status(JobStatus::Run)
                .with_queue("batch")
                .with_nodes("node[1-2]", 2),
            JobRecord::new(JobId(11), "alice", "post").with_queue("debug"),
            JobRecord::new(JobId(12), "bob", "sim")
                .with_status(JobStatus::Run)
                .with_queue("batch")
                .with_nodes("node3", 1),
            JobRecord::new(JobId(13), "alice", "old").with_status(JobStatus::Completed),
        ]
    }

    async fn run(plan: &Plan, scheduler: &mut InMemoryScheduler, input: &str) -> (Summary, String) {
        let mut input = Cursor::new(input.to_string());
        let mut output = Vec::new();
        let summary = execute(plan, scheduler, &mut input, &mut output)
            .await
            .unwrap();
        (summary, String::from_utf8(output).unwrap())
    }

    #[test]
    fn test_no_identification() {
        assert_eq!(
            Plan::from_args(&args(&["-v"]), "alice"),
            Err(UsageError::NoJobIdentification)
        );
    }

    #[test]
    fn test_unknown_signal_is_rejected_before_anything_else() {
        assert_eq!(
            Plan::from_args(&args(&["-s", "BOGUS", "-t", "nope", "10"]), "alice"),
            Err(UsageError::UnknownSignal("BOGUS".to_string()))
        );
    }

    #[test]
    fn test_invalid_state() {
        assert_eq!(
            Plan::from_args(&args(&["-t", "completed"]), "alice"),
            Err(UsageError::InvalidState("completed".to_string()))
        );
    }

    #[test]
    fn test_defaults() {
        let plan = plan(&["10"]);
        assert_eq!(plan.action, Action::Cancel);
        assert_eq!(plan.query.user, UserScope::User("alice".to_string()));
        assert_eq!(plan.query.ids, vec![JobId(10)]);
        assert_eq!(
            plan.query.states,
            vec![StateFilter::Pending, StateFilter::Running]
        );
    }

    #[test]
    fn test_root_means_every_user() {
        assert_eq!(plan(&["-u", "root", "10"]).query.user, UserScope::All);
        let plan = Plan::from_args(&args(&["10"]), "root").unwrap();
        assert_eq!(plan.query.user, UserScope::All);
    }

    #[test]
    fn test_signal_forms() {
        assert_eq!(plan(&["-s", "--", "10"]).action, Action::Signal(Signal::KILL));
        assert_eq!(plan(&["-s", "term", "10"]).action, Action::Signal(Signal(15)));
        assert_eq!(plan(&["--signal=2", "10"]).action, Action::Signal(Signal(2)));
    }

    #[test]
    fn test_filter_description() {
        let plan = plan(&["-t", "PD", "-w", "node[1-2]", "-n", "sim", "-p", "batch"]);
        assert_eq!(
            plan.filters.describe(),
            "state=pending,user=alice,nodelist=node1,node2,name=sim,partition=batch"
        );
    }

    #[tokio::test]
    async fn test_cancels_matching_jobs() {
        let mut scheduler = InMemoryScheduler::new(jobs());
        let (summary, _) = run(&plan(&["-n", "sim"]), &mut scheduler, "").await;

        assert_eq!(summary.done, 1);
        assert_eq!(scheduler.mutations(), &[Mutation::Cancel(JobId(10))]);
    }

    #[tokio::test]
    async fn test_signals_jobs_on_nodes() {
        let mut scheduler = InMemoryScheduler::new(jobs());
        let plan = plan(&["-u", "root", "-w", "node2,node3", "-s", "HUP"]);
        run(&plan, &mut scheduler, "").await;

        assert_eq!(
            scheduler.mutations(),
            &[
                Mutation::Kill(JobId(10), Signal(1)),
                Mutation::Kill(JobId(12), Signal(1)),
            ]
        );
    }

    #[tokio::test]
    async fn test_interactive_reprompts_then_skips() {
        let mut scheduler = InMemoryScheduler::new(jobs());
        let plan = plan(&["-i", "10"]);
        let (summary, output) = run(&plan, &mut scheduler, "x\nn\n").await;

        assert!(scheduler.mutations().is_empty());
        assert_eq!(summary.skipped, 1);
        assert_eq!(
            output,
            "Cancel job_id=fB name=sim partition=batch [y/n]? ".repeat(2)
        );
    }

    #[tokio::test]
    async fn test_interactive_accepts_upper_case() {
        let mut scheduler = InMemoryScheduler::new(jobs());
        let (summary, _) = run(&plan(&["-i", "-u", "root", "-n", "sim"]), &mut scheduler, "Y\nN\n").await;

        assert_eq!(summary.done, 1);
        assert_eq!(summary.skipped, 1);
        assert_eq!(scheduler.mutations(), &[Mutation::Cancel(JobId(10))]);
    }

    #[tokio::test]
    async fn test_end_of_input_declines() {
        let mut scheduler = InMemoryScheduler::new(jobs());
        let (summary, _) = run(&plan(&["-i", "10", "11"]), &mut scheduler, "").await;

        assert_eq!(summary.skipped, 2);
        assert!(scheduler.mutations().is_empty());
    }

    #[tokio::test]
    async fn test_permission_and_not_found_do_not_stop_the_loop() {
        let mut scheduler = InMemoryScheduler::new(jobs())
            .fail_with(JobId(10), MutationError::PermissionDenied)
            .fail_with(JobId(11), MutationError::NotFound);
        let plan = plan(&["-v", "-u", "root"]);
        let (summary, _) = run(&plan, &mut scheduler, "").await;

        assert_eq!(
            summary,
            Summary {
                done: 1,
                skipped: 0,
                denied: 1,
                not_found: 1
            }
        );
        assert_eq!(scheduler.mutations().len(), 3);
    }

    #[tokio::test]
    async fn test_other_faults_stop_the_loop() {
        let mut scheduler = InMemoryScheduler::new(jobs())
            .fail_with(JobId(10), MutationError::Fault("broker gone".to_string()));
        let plan = plan(&["-u", "root"]);
        let mut output = Vec::new();
        let result = execute(&plan, &mut scheduler, &mut Cursor::new(""), &mut output).await;

        let error = result.unwrap_err().to_string();
        assert!(error.contains("broker gone"));
        assert_eq!(scheduler.mutations(), &[Mutation::Cancel(JobId(10))]);
    }

    #[tokio::test]
    async fn test_no_match_is_not_an_error() {
        let mut scheduler = InMemoryScheduler::new(jobs());
        let (summary, _) = run(&plan(&["-v", "-p", "nowhere"]), &mut scheduler, "").await;

        assert_eq!(summary, Summary::default());
        assert!(scheduler.mutations().is_empty());
    }
}
