pub mod arg;

pub use arg::Args;

use anyhow::Result;
use chrono::DateTime;
use std::fmt;
use std::io::Write;
use wrappers_common::{
    format::format_duration, log, JobId, JobQuery, JobRecord, JobService, UsageError, UserScope,
};

pub const NAME: &str = env!("CARGO_PKG_NAME");

const NA_COLUMNS: &str = " NA         NA        NA         NA        ";

pub fn report_unknown_args(unknown: &[String]) {
    if unknown.is_empty() {
        return;
    }
    log!(
        warn,
        "WARNING: \"{}\" is not supported by this wrapper and is being ignored.",
        unknown.join(" ")
    );
    log!(
        warn,
        "WARNING: {NAME} is a wrapper script for the native \"flux jobs\" command."
    );
    log!(warn, "See \"flux help jobs\" for help using the native commands.");
}

/// The showq section a job is listed in.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Bucket {
    Active,
    Eligible,
    Blocked,
    Completed,
}

impl Bucket {
    pub fn of(job: &JobRecord) -> Self {
        if job.status.is_finished() {
            Bucket::Completed
        } else if job.status.is_pending() {
            Bucket::Eligible
        } else if job.status == wrappers_common::JobStatus::Run {
            Bucket::Active
        } else {
            Bucket::Blocked
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Bucket::Active => "active",
            Bucket::Eligible => "eligible",
            Bucket::Blocked => "blocked",
            Bucket::Completed => "completed",
        }
    }

    fn columns(&self) -> &'static str {
        match self {
            Bucket::Active => {
                "JOBID      USERNAME   STATE        PROCS    REMAINING            STARTTIME"
            }
            Bucket::Completed => "JOBID      USERNAME   ACCOUNT    QOS       CLASS      EXEHOST    STATE        CCODE  PROCS     WALLTIME       COMPLETIONTIME",
            Bucket::Eligible | Bucket::Blocked => {
                "JOBID      USERNAME   STATE        PROCS      WCLIMIT            QUEUETIME"
            }
        }
    }

    /// One fixed-layout line for `job`.
    pub fn row(&self, job: &JobRecord) -> String {
        let id = job.id.f58();
        let status = job.status.as_str();
        match self {
            Bucket::Completed => {
                let code = if job.exception.occurred {
                    format!("1:{}", job.exception.severity)
                } else {
                    "0:0".to_string()
                };
                format!(
                    "{id:<10} {:<9} {NA_COLUMNS} {status:<12} {code:>5} {:>6} {:>12}  {}",
                    job.user,
                    job.ntasks,
                    format_duration(job.runtime),
                    format_date(job.t_cleanup)
                )
            }
            Bucket::Active => format!(
                "{id:<10} {:<9}  {status:<9}   {:>6}    {:>9}  {}",
                job.user,
                job.ntasks,
                format_duration(job.remaining),
                format_date(job.t_run)
            ),
            Bucket::Eligible | Bucket::Blocked => format!(
                "{id:<10} {:<9}  {status:<9}   {:>6}    {:>9}  {}",
                job.user,
                job.ntasks,
                format_duration(job.runtime),
                format_date(job.t_submit)
            ),
        }
    }
}

impl fmt::Display for Bucket {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Epoch seconds as a UTC date without the year.
pub fn format_date(epoch: f64) -> String {
    DateTime::from_timestamp(epoch.floor() as i64, 0)
        .map(|date| date.format("%a %b %d %H:%M:%S").to_string())
        .unwrap_or_default()
}

#[derive(Clone, Debug, PartialEq)]
pub struct Report {
    pub query: JobQuery,
    /// Sections to print, in order
    pub buckets: Vec<Bucket>,
    pub noheader: bool,
}

impl Report {
    pub fn from_args(args: &Args) -> std::result::Result<Self, UsageError> {
        let user = args
            .user
            .as_deref()
            .map(UserScope::from)
            .unwrap_or(UserScope::All);
        let ids = match &args.jobid {
            Some(id) => vec![id.parse::<JobId>()?],
            None => Vec::new(),
        };

        let buckets = if args.completed {
            vec![Bucket::Completed]
        } else if args.blocked {
            vec![Bucket::Blocked]
        } else if args.eligible {
            vec![Bucket::Eligible]
        } else if args.running {
            vec![Bucket::Active]
        } else {
            vec![Bucket::Active, Bucket::Eligible, Bucket::Blocked]
        };

        Ok(Self {
            query: JobQuery::new(user).ids(ids),
            buckets,
            noheader: args.noheader,
        })
    }

    /// Print every selected section. Returns the number of jobs printed.
    pub fn write<W: Write>(&self, jobs: &[JobRecord], out: &mut W) -> std::io::Result<usize> {
        let mut total = 0;
        for bucket in &self.buckets {
            let section: Vec<&JobRecord> =
                jobs.iter().filter(|job| Bucket::of(job) == *bucket).collect();

            if !self.noheader {
                writeln!(out, "{bucket} jobs------------------------")?;
                writeln!(out, "{}", bucket.columns())?;
                writeln!(out)?;
            }
            for job in &section {
                writeln!(out, "{}", bucket.row(job))?;
            }
            if !self.noheader {
                writeln!(out)?;
                writeln!(out, "{} {bucket} jobs", section.len())?;
                writeln!(out)?;
                writeln!(out)?;
            }
            total += section.len();
        }
        if !self.noheader {
            writeln!(out, "Total jobs: {total:>3}")?;
            writeln!(out)?;
        }
        Ok(total)
    }
}

pub async fn execute<S, W>(report: &Report, service: &mut S, out: &mut W) -> Result<usize>
where
    S: JobService,
    W: Write,
{
    let jobs = service.list_jobs(&report.query).await?;
    log!(debug, "{NAME}: fetched {} jobs", jobs.len());
    Ok(report.write(&jobs, out)?)
}
