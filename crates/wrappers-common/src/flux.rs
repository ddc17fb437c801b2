//! [`JobService`] backed by the `flux` command line client.

use crate::client::{JobQuery, JobService, UserScope};
use crate::error::{Error, MutationError, Result};
use crate::job::{JobException, JobId, JobRecord, JobStatus};
use crate::settings::FluxSettings;
use crate::signal::Signal;
use crate::log;
use serde::Deserialize;
use serde_aux::field_attributes::deserialize_default_from_null;
use tokio::process::Command;

#[derive(Clone, Debug)]
pub struct FluxCli {
    command: String,
}

impl FluxCli {
    pub fn new(settings: &FluxSettings) -> Self {
        Self {
            command: settings.command.clone(),
        }
    }

    /// Arguments for `flux jobs` answering `query` as JSON.
    pub fn list_args(query: &JobQuery) -> Vec<String> {
        let mut args = vec!["jobs".to_string(), "--json".to_string()];
        match &query.user {
            UserScope::All => args.push("-A".to_string()),
            UserScope::User(name) => args.push(format!("--user={name}")),
        }
        if query.states.is_empty() {
            args.push("-a".to_string());
        } else {
            let states: Vec<&str> = query.states.iter().map(|s| s.as_str()).collect();
            args.push(format!("--filter={}", states.join(",")));
        }
        args.extend(query.ids.iter().map(|id| id.0.to_string()));
        args
    }

    async fn run(&self, args: &[String]) -> std::io::Result<std::process::Output> {
        log!(debug, "running {} {}", self.command, args.join(" "));
        Command::new(&self.command).args(args).output().await
    }

    async fn mutate(&self, args: Vec<String>) -> std::result::Result<(), MutationError> {
        let output = self
            .run(&args)
            .await
            .map_err(|e| MutationError::Fault(format!("{}: {e}", self.command)))?;
        if output.status.success() {
            Ok(())
        } else {
            Err(MutationError::classify(&String::from_utf8_lossy(
                &output.stderr,
            )))
        }
    }
}

impl JobService for FluxCli {
    async fn list_jobs(&mut self, query: &JobQuery) -> Result<Vec<JobRecord>> {
        let args = Self::list_args(query);
        let output = self.run(&args).await?;
        if !output.status.success() {
            return Err(Error::Command {
                command: format!("{} {}", self.command, args.join(" ")),
                stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            });
        }
        let now = chrono::Utc::now().timestamp_millis() as f64 / 1000.0;
        parse_jobs(&String::from_utf8_lossy(&output.stdout), now)
    }

    async fn cancel(&mut self, id: JobId) -> std::result::Result<(), MutationError> {
        self.mutate(vec!["cancel".to_string(), id.0.to_string()])
            .await
    }

    async fn kill(&mut self, id: JobId, signal: Signal) -> std::result::Result<(), MutationError> {
        self.mutate(vec![
            "job".to_string(),
            "kill".to_string(),
            format!("--signal={signal}"),
            id.0.to_string(),
        ])
        .await
    }
}

/// Decode `flux jobs --json` output. `now` (epoch seconds) is used for run
/// and remaining time when the client did not compute them.
pub fn parse_jobs(payload: &str, now: f64) -> Result<Vec<JobRecord>> {
    if payload.trim().is_empty() {
        return Ok(Vec::new());
    }
    let payload: Payload = serde_json::from_str(payload)?;
    let jobs = match payload {
        Payload::List { jobs } => jobs,
        Payload::Single(job) => vec![*job],
    };
    Ok(jobs.into_iter().map(|job| job.into_record(now)).collect())
}

#[derive(Deserialize)]
#[serde(untagged)]
enum Payload {
    List { jobs: Vec<FluxJob> },
    Single(Box<FluxJob>),
}

#[derive(Deserialize, Debug)]
#[serde(untagged)]
enum Code {
    Number(u64),
    Name(String),
}

#[derive(Deserialize, Debug, Default)]
struct Exception {
    #[serde(default, deserialize_with = "deserialize_default_from_null")]
    occurred: bool,
    #[serde(default, deserialize_with = "deserialize_default_from_null")]
    severity: i32,
}

#[derive(Deserialize, Debug, Default)]
struct SchedAnnotations {
    #[serde(default, deserialize_with = "deserialize_default_from_null")]
    reason_pending: String,
}

#[derive(Deserialize, Debug, Default)]
struct Annotations {
    #[serde(default, deserialize_with = "deserialize_default_from_null")]
    sched: SchedAnnotations,
}

/// One job as the Flux client prints it. Every field is optional.
#[derive(Deserialize, Debug, Default)]
#[serde(default)]
struct FluxJob {
    id: u64,
    #[serde(deserialize_with = "deserialize_default_from_null")]
    username: String,
    #[serde(deserialize_with = "deserialize_default_from_null")]
    name: String,
    #[serde(deserialize_with = "deserialize_default_from_null")]
    queue: String,
    #[serde(deserialize_with = "deserialize_default_from_null")]
    nodelist: String,
    #[serde(deserialize_with = "deserialize_default_from_null")]
    ntasks: u32,
    #[serde(deserialize_with = "deserialize_default_from_null")]
    nnodes: u32,
    #[serde(deserialize_with = "deserialize_default_from_null")]
    t_submit: f64,
    #[serde(deserialize_with = "deserialize_default_from_null")]
    t_run: f64,
    #[serde(deserialize_with = "deserialize_default_from_null")]
    t_cleanup: f64,
    #[serde(deserialize_with = "deserialize_default_from_null")]
    expiration: f64,
    state: Option<Code>,
    result: Option<Code>,
    status: Option<String>,
    status_abbrev: Option<String>,
    runtime: Option<f64>,
    t_remaining: Option<f64>,
    exception: Option<Exception>,
    exception_occurred: Option<bool>,
    exception_severity: Option<i32>,
    #[serde(deserialize_with = "deserialize_default_from_null")]
    annotations: Annotations,
}

/// Job state bits of the Flux job manager.
fn status_from_state(state: u64, result: Option<&Code>) -> JobStatus {
    match state {
        1 => JobStatus::Depend,
        2 => JobStatus::Priority,
        4 => JobStatus::Sched,
        8 => JobStatus::Run,
        16 => JobStatus::Cleanup,
        32 => match result {
            Some(Code::Number(1)) => JobStatus::Completed,
            Some(Code::Number(2)) => JobStatus::Failed,
            Some(Code::Number(4)) => JobStatus::Canceled,
            Some(Code::Number(8)) => JobStatus::Timeout,
            Some(Code::Name(name)) => JobStatus::from(name.as_str()),
            _ => JobStatus::Inactive,
        },
        other => JobStatus::Unknown(other.to_string()),
    }
}

impl FluxJob {
    fn status(&self) -> JobStatus {
        if let Some(status) = &self.status {
            return JobStatus::from(status.as_str());
        }
        match &self.state {
            Some(Code::Number(state)) => status_from_state(*state, self.result.as_ref()),
            Some(Code::Name(name)) => {
                let status = JobStatus::from(name.as_str());
                match (&status, &self.result) {
                    (JobStatus::Inactive, Some(Code::Name(result))) => {
                        JobStatus::from(result.as_str())
                    }
                    _ => status,
                }
            }
            None => JobStatus::Unknown(String::new()),
        }
    }

    fn into_record(self, now: f64) -> JobRecord {
        let status = self.status();
        let status_abbrev = self
            .status_abbrev
            .clone()
            .unwrap_or_else(|| status.abbrev().to_string());

        let runtime = self.runtime.unwrap_or_else(|| {
            if self.t_run > 0.0 {
                let end = if self.t_cleanup > 0.0 { self.t_cleanup } else { now };
                end - self.t_run
            } else {
                0.0
            }
        });
        let remaining = self.t_remaining.unwrap_or_else(|| {
            if status == JobStatus::Run && self.expiration > 0.0 {
                self.expiration - now
            } else {
                0.0
            }
        });

        let exception = match self.exception {
            Some(e) => JobException {
                occurred: e.occurred,
                severity: e.severity,
            },
            None => JobException {
                occurred: self.exception_occurred.unwrap_or(false),
                severity: self.exception_severity.unwrap_or(0),
            },
        };

        JobRecord {
            id: JobId(self.id),
            user: self.username,
            name: self.name,
            status,
            status_abbrev,
            queue: self.queue,
            nodelist: self.nodelist,
            ntasks: self.ntasks,
            nnodes: self.nnodes,
            t_submit: self.t_submit,
            t_run: self.t_run,
            t_cleanup: self.t_cleanup,
            remaining: whole_seconds(remaining),
            runtime: whole_seconds(runtime),
            reason_pending: self.annotations.sched.reason_pending,
            exception,
        }
    }
}

fn whole_seconds(seconds: f64) -> u64 {
    if seconds.is_finite() && seconds > 0.0 {
        seconds.floor() as u64
    } else {
        0
    }
}
