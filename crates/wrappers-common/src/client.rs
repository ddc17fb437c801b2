use crate::error::{MutationError, Result};
use crate::job::{JobId, JobRecord, JobStatus};
use crate::signal::Signal;
use std::fmt;

/// Whose jobs to fetch.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum UserScope {
    All,
    User(String),
}

impl UserScope {
    pub fn includes(&self, user: &str) -> bool {
        match self {
            UserScope::All => true,
            UserScope::User(name) => name == user,
        }
    }
}

impl From<&str> for UserScope {
    fn from(name: &str) -> Self {
        if name == "all" {
            UserScope::All
        } else {
            UserScope::User(name.to_string())
        }
    }
}

impl fmt::Display for UserScope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            UserScope::All => f.write_str("all"),
            UserScope::User(name) => f.write_str(name),
        }
    }
}

/// Coarse lifecycle bucket used to narrow a fetch.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum StateFilter {
    Pending,
    Running,
    /// Pending or running
    Active,
    Inactive,
}

impl StateFilter {
    pub fn as_str(&self) -> &'static str {
        match self {
            StateFilter::Pending => "pending",
            StateFilter::Running => "running",
            StateFilter::Active => "active",
            StateFilter::Inactive => "inactive",
        }
    }

    pub fn matches(&self, status: &JobStatus) -> bool {
        match self {
            StateFilter::Pending => status.is_pending(),
            StateFilter::Running => status.is_running(),
            StateFilter::Active => status.is_pending() || status.is_running(),
            StateFilter::Inactive => !(status.is_pending() || status.is_running()),
        }
    }

    /// Look `alias` up case-insensitively in a tool's table of accepted names.
    pub fn lookup(table: &[(&str, StateFilter)], alias: &str) -> Option<StateFilter> {
        let alias = alias.to_lowercase();
        table
            .iter()
            .find(|(name, _)| *name == alias)
            .map(|(_, state)| *state)
    }
}

impl fmt::Display for StateFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct JobQuery {
    pub user: UserScope,
    /// Only these jobs, if not empty
    pub ids: Vec<JobId>,
    /// Any of these states, or every state if empty
    pub states: Vec<StateFilter>,
}

impl JobQuery {
    pub fn new(user: UserScope) -> Self {
        Self {
            user,
            ids: Vec::new(),
            states: Vec::new(),
        }
    }

    pub fn ids(mut self, ids: Vec<JobId>) -> Self {
        self.ids = ids;
        self
    }

    pub fn states(mut self, states: Vec<StateFilter>) -> Self {
        self.states = states;
        self
    }

    /// Whether `job` falls within the scope of this query.
    pub fn matches(&self, job: &JobRecord) -> bool {
        self.user.includes(&job.user)
            && (self.ids.is_empty() || self.ids.contains(&job.id))
            && (self.states.is_empty() || self.states.iter().any(|s| s.matches(&job.status)))
    }
}

/// The scheduler the wrappers talk to.
#[allow(async_fn_in_trait)]
pub trait JobService {
    async fn list_jobs(&mut self, query: &JobQuery) -> Result<Vec<JobRecord>>;

    async fn cancel(&mut self, id: JobId) -> std::result::Result<(), MutationError>;

    async fn kill(&mut self, id: JobId, signal: Signal) -> std::result::Result<(), MutationError>;
}
