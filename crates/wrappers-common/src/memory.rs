use crate::client::{JobQuery, JobService};
use crate::error::{MutationError, Result};
use crate::job::{JobId, JobRecord};
use crate::signal::Signal;
use std::collections::HashMap;

/// A request the scheduler received.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Mutation {
    Cancel(JobId),
    Kill(JobId, Signal),
}

/// A [`JobService`] over a fixed set of jobs that remembers every request.
#[derive(Clone, Debug, Default)]
pub struct InMemoryScheduler {
    jobs: Vec<JobRecord>,
    failures: HashMap<JobId, MutationError>,
    queries: Vec<JobQuery>,
    mutations: Vec<Mutation>,
}

impl InMemoryScheduler {
    pub fn new(jobs: Vec<JobRecord>) -> Self {
        Self {
            jobs,
            ..Default::default()
        }
    }

    /// Make every cancel or kill request for `id` fail with `error`.
    pub fn fail_with(mut self, id: JobId, error: MutationError) -> Self {
        self.failures.insert(id, error);
        self
    }

    pub fn queries(&self) -> &[JobQuery] {
        &self.queries
    }

    pub fn mutations(&self) -> &[Mutation] {
        &self.mutations
    }

    fn mutate(&mut self, mutation: Mutation) -> std::result::Result<(), MutationError> {
        let id = match mutation {
            Mutation::Cancel(id) | Mutation::Kill(id, _) => id,
        };
        self.mutations.push(mutation);
        match self.failures.get(&id) {
            Some(error) => Err(error.clone()),
            None if self.jobs.iter().any(|job| job.id == id) => Ok(()),
            None => Err(MutationError::NotFound),
        }
    }
}

impl JobService for InMemoryScheduler {
    async fn list_jobs(&mut self, query: &JobQuery) -> Result<Vec<JobRecord>> {
        self.queries.push(query.clone());
        Ok(self
            .jobs
            .iter()
            .filter(|job| query.matches(job))
            .cloned()
            .collect())
    }

    async fn cancel(&mut self, id: JobId) -> std::result::Result<(), MutationError> {
        self.mutate(Mutation::Cancel(id))
    }

    async fn kill(&mut self, id: JobId, signal: Signal) -> std::result::Result<(), MutationError> {
        self.mutate(Mutation::Kill(id, signal))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::{StateFilter, UserScope};
    use crate::job::JobStatus;

    fn jobs() -> Vec<JobRecord> {
        vec![
            JobRecord::new(JobId(1), "alice", "a").with_status(JobStatus::Run),
            JobRecord::new(JobId(2), "bob", "b"),
            JobRecord::new(JobId(3), "alice", "c").with_status(JobStatus::Completed),
        ]
    }

    #[tokio::test]
    async fn test_list_applies_query_scope() {
        let mut scheduler = InMemoryScheduler::new(jobs());
        let query = JobQuery::new(UserScope::from("alice")).states(vec![StateFilter::Active]);
        let found = scheduler.list_jobs(&query).await.unwrap();
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].id, JobId(1));
        assert_eq!(scheduler.queries(), &[query]);
    }

    #[tokio::test]
    async fn test_mutations_are_recorded() {
        let mut scheduler = InMemoryScheduler::new(jobs())
            .fail_with(JobId(2), MutationError::PermissionDenied);
        assert_eq!(scheduler.cancel(JobId(1)).await, Ok(()));
        assert_eq!(
            scheduler.kill(JobId(2), Signal(15)).await,
            Err(MutationError::PermissionDenied)
        );
        assert_eq!(scheduler.cancel(JobId(9)).await, Err(MutationError::NotFound));
        assert_eq!(
            scheduler.mutations(),
            &[
                Mutation::Cancel(JobId(1)),
                Mutation::Kill(JobId(2), Signal(15)),
                Mutation::Cancel(JobId(9)),
            ]
        );
    }
}
