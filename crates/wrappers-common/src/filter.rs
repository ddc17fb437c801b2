use crate::hostlist::Hostlist;
use crate::job::JobRecord;

/// A predicate evaluated on the client after the scheduler has answered.
#[derive(Clone, Debug, PartialEq)]
pub enum JobFilter {
    /// The job ran on at least one of these hosts.
    Nodes(Hostlist),
    /// Exact job name.
    Name(String),
    /// Exact partition (queue) name.
    Partition(String),
}

impl JobFilter {
    pub fn matches(&self, job: &JobRecord) -> bool {
        match self {
            JobFilter::Nodes(hosts) => Hostlist::parse(&job.nodelist)
                .map(|job_hosts| job_hosts.intersects(hosts))
                .unwrap_or(false),
            JobFilter::Name(name) => job.name == *name,
            JobFilter::Partition(queue) => job.queue == *queue,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            JobFilter::Nodes(_) => "nodelist",
            JobFilter::Name(_) => "name",
            JobFilter::Partition(_) => "partition",
        }
    }

    pub fn value(&self) -> String {
        match self {
            JobFilter::Nodes(hosts) => hosts.to_string(),
            JobFilter::Name(name) => name.clone(),
            JobFilter::Partition(queue) => queue.clone(),
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
enum Criterion {
    /// Already applied by the scheduler when fetching.
    Fetch { label: &'static str, value: String },
    Local(JobFilter),
}

/// Every criterion a job list was narrowed by, in the order given.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct FilterSet {
    criteria: Vec<Criterion>,
}

impl FilterSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a criterion the scheduler applies itself, for [`FilterSet::describe`].
    pub fn fetched(&mut self, label: &'static str, value: impl Into<String>) -> &mut Self {
        self.criteria.push(Criterion::Fetch {
            label,
            value: value.into(),
        });
        self
    }

    pub fn with(&mut self, filter: JobFilter) -> &mut Self {
        self.criteria.push(Criterion::Local(filter));
        self
    }

    fn local(&self) -> impl Iterator<Item = &JobFilter> {
        self.criteria.iter().filter_map(|c| match c {
            Criterion::Local(filter) => Some(filter),
            Criterion::Fetch { .. } => None,
        })
    }

    pub fn matches(&self, job: &JobRecord) -> bool {
        self.local().all(|filter| filter.matches(job))
    }

    /// Keep the jobs that pass every client side filter, preserving order.
    pub fn apply(&self, jobs: Vec<JobRecord>) -> Vec<JobRecord> {
        jobs.into_iter().filter(|job| self.matches(job)).collect()
    }

    /// `label=value` pairs, comma separated.
    pub fn describe(&self) -> String {
        self.criteria
            .iter()
            .map(|c| match c {
                Criterion::Fetch { label, value } => format!("{label}={value}"),
                Criterion::Local(filter) => format!("{}={}", filter.label(), filter.value()),
            })
            .collect::<Vec<_>>()
            .join(",")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::job::JobId;

    fn job(id: u64, name: &str, queue: &str, nodelist: &str) -> JobRecord {
        JobRecord::new(JobId(id), "alice", name)
            .with_queue(queue)
            .with_nodes(nodelist, 1)
    }

    #[test]
    fn test_node_filter_keeps_jobs_sharing_a_host() {
        let jobs = vec![
            job(1, "a", "batch", "a1"),
            job(2, "b", "batch", "a2,b1"),
            job(3, "c", "batch", "c1"),
        ];
        let mut filters = FilterSet::new();
        filters.with(JobFilter::Nodes(Hostlist::parse("b1").unwrap()));

        let kept = filters.apply(jobs);
        assert_eq!(kept.len(), 1);
        assert_eq!(kept[0].id, JobId(2));
    }

    #[test]
    fn test_node_filter_expands_job_nodelist() {
        let mut filters = FilterSet::new();
        filters.with(JobFilter::Nodes(Hostlist::parse("node3").unwrap()));
        assert!(filters.matches(&job(1, "a", "batch", "node[1-4]")));
        assert!(!filters.matches(&job(2, "a", "batch", "")));
        assert!(!filters.matches(&job(3, "a", "batch", "node[1-")));
    }

    #[test]
    fn test_empty_filter_set_is_identity() {
        let jobs = vec![job(1, "a", "x", "n1"), job(2, "b", "y", "n2")];
        assert_eq!(FilterSet::new().apply(jobs.clone()), jobs);
    }

    #[test]
    fn test_filters_are_combined_and_keep_order() {
        let jobs = vec![
            job(1, "sim", "debug", "n1"),
            job(2, "sim", "batch", "n1"),
            job(3, "post", "batch", "n1"),
            job(4, "sim", "batch", "n2"),
        ];
        let mut filters = FilterSet::new();
        filters
            .with(JobFilter::Name("sim".to_string()))
            .with(JobFilter::Partition("batch".to_string()));

        let ids: Vec<_> = filters.apply(jobs).iter().map(|j| j.id).collect();
        assert_eq!(ids, vec![JobId(2), JobId(4)]);
    }

    #[test]
    fn test_describe_lists_every_criterion() {
        let mut filters = FilterSet::new();
        filters
            .fetched("state", "running")
            .fetched("user", "alice")
            .with(JobFilter::Nodes(Hostlist::parse("n[1-2]").unwrap()))
            .with(JobFilter::Name("sim".to_string()));
        assert_eq!(
            filters.describe(),
            "state=running,user=alice,nodelist=n1,n2,name=sim"
        );
    }

    #[test]
    fn test_fetched_criteria_do_not_filter() {
        let mut filters = FilterSet::new();
        filters.fetched("user", "bob");
        assert!(filters.matches(&job(1, "a", "b", "")));
    }
}
