use crate::error::UsageError;
use std::fmt;
use std::str::FromStr;

const F58_ALPHABET: &[u8; 58] = b"123456789ABCDEFGHJKLMNPQRSTUVWXYZabcdefghijkmnopqrstuvwxyz";

/// A scheduler job id.
///
/// Displayed in the scheduler's short F58 encoding (`f` followed by base58
/// digits), parsed from F58, decimal or `0x` hex.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct JobId(pub u64);

impl JobId {
    pub fn f58(&self) -> String {
        let mut digits = Vec::new();
        let mut value = self.0;
        loop {
            digits.push(F58_ALPHABET[(value % 58) as usize] as char);
            value /= 58;
            if value == 0 {
                break;
            }
        }
        let mut encoded = String::with_capacity(digits.len() + 1);
        encoded.push('f');
        encoded.extend(digits.iter().rev());
        encoded
    }

    fn decode_f58(digits: &str) -> Option<u64> {
        if digits.is_empty() {
            return None;
        }
        digits.bytes().try_fold(0u64, |acc, b| {
            let digit = F58_ALPHABET.iter().position(|&c| c == b)? as u64;
            acc.checked_mul(58)?.checked_add(digit)
        })
    }
}

impl fmt::Display for JobId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.f58())
    }
}

impl FromStr for JobId {
    type Err = UsageError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        let parsed = if !s.is_empty() && s.bytes().all(|b| b.is_ascii_digit()) {
            s.parse::<u64>().ok()
        } else if let Some(hex) = s.strip_prefix("0x") {
            u64::from_str_radix(hex, 16).ok()
        } else if let Some(digits) = s.strip_prefix('ƒ').or_else(|| s.strip_prefix('f')) {
            JobId::decode_f58(digits)
        } else {
            None
        };
        parsed
            .map(JobId)
            .ok_or_else(|| UsageError::InvalidJobId(s.to_string()))
    }
}

/// Parse a comma separated list of job ids, skipping empty entries.
pub fn parse_job_ids(list: &str) -> Result<Vec<JobId>, UsageError> {
    list.split(',')
        .filter(|id| !id.trim().is_empty())
        .map(JobId::from_str)
        .collect()
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum JobStatus {
    Depend,
    Priority,
    Sched,
    Run,
    Cleanup,
    Completed,
    Failed,
    Canceled,
    Timeout,
    Inactive,
    Unknown(String),
}

impl JobStatus {
    pub fn as_str(&self) -> &str {
        match self {
            JobStatus::Depend => "DEPEND",
            JobStatus::Priority => "PRIORITY",
            JobStatus::Sched => "SCHED",
            JobStatus::Run => "RUN",
            JobStatus::Cleanup => "CLEANUP",
            JobStatus::Completed => "COMPLETED",
            JobStatus::Failed => "FAILED",
            JobStatus::Canceled => "CANCELED",
            JobStatus::Timeout => "TIMEOUT",
            JobStatus::Inactive => "INACTIVE",
            JobStatus::Unknown(word) => word,
        }
    }

    pub fn abbrev(&self) -> &str {
        match self {
            JobStatus::Depend => "D",
            JobStatus::Priority => "P",
            JobStatus::Sched => "S",
            JobStatus::Run => "R",
            JobStatus::Cleanup => "C",
            JobStatus::Completed => "CD",
            JobStatus::Failed => "F",
            JobStatus::Canceled => "CA",
            JobStatus::Timeout => "TO",
            JobStatus::Inactive => "I",
            JobStatus::Unknown(_) => "?",
        }
    }

    pub fn is_pending(&self) -> bool {
        matches!(
            self,
            JobStatus::Depend | JobStatus::Priority | JobStatus::Sched
        )
    }

    pub fn is_running(&self) -> bool {
        matches!(self, JobStatus::Run | JobStatus::Cleanup)
    }

    /// Finished with a known result.
    pub fn is_finished(&self) -> bool {
        matches!(
            self,
            JobStatus::Completed | JobStatus::Failed | JobStatus::Canceled | JobStatus::Timeout
        )
    }
}

impl From<&str> for JobStatus {
    fn from(s: &str) -> Self {
        match s.to_uppercase().as_str() {
            "DEPEND" | "D" => JobStatus::Depend,
            "PRIORITY" | "P" => JobStatus::Priority,
            "SCHED" | "S" | "PENDING" | "PD" => JobStatus::Sched,
            "RUN" | "RUNNING" | "R" => JobStatus::Run,
            "CLEANUP" | "C" | "CG" => JobStatus::Cleanup,
            "COMPLETED" | "CD" => JobStatus::Completed,
            "FAILED" | "F" => JobStatus::Failed,
            "CANCELED" | "CANCELLED" | "CA" => JobStatus::Canceled,
            "TIMEOUT" | "TO" => JobStatus::Timeout,
            "INACTIVE" | "I" => JobStatus::Inactive,
            other => JobStatus::Unknown(other.to_string()),
        }
    }
}

impl fmt::Display for JobStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Fatal job exception as reported by the scheduler.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct JobException {
    pub occurred: bool,
    pub severity: i32,
}

#[derive(Clone, Debug, PartialEq)]
pub struct JobRecord {
    pub id: JobId,

    /// Owning user name
    pub user: String,

    pub name: String,

    pub status: JobStatus,

    /// Short status code as shown by the scheduler, e.g. `R` or `CD`
    pub status_abbrev: String,

    /// Partition or queue, empty when the scheduler has no queues configured
    pub queue: String,

    /// Compact node list, e.g. `node[1-4]`
    pub nodelist: String,

    pub ntasks: u32,

    pub nnodes: u32,

    /// Epoch seconds, zero if the event has not happened yet
    pub t_submit: f64,
    pub t_run: f64,
    pub t_cleanup: f64,

    /// Seconds until the job's expiration
    pub remaining: u64,

    /// Seconds the job has been running
    pub runtime: u64,

    pub reason_pending: String,

    pub exception: JobException,
}

impl JobRecord {
    /// A pending job with the given id, owner and name. Other fields are empty.
    pub fn new(id: JobId, user: impl Into<String>, name: impl Into<String>) -> Self {
        let status = JobStatus::Sched;
        Self {
            id,
            user: user.into(),
            name: name.into(),
            status_abbrev: status.abbrev().to_string(),
            status,
            queue: String::new(),
            nodelist: String::new(),
            ntasks: 1,
            nnodes: 0,
            t_submit: 0.0,
            t_run: 0.0,
            t_cleanup: 0.0,
            remaining: 0,
            runtime: 0,
            reason_pending: String::new(),
            exception: JobException::default(),
        }
    }

    pub fn with_status(mut self, status: JobStatus) -> Self {
        self.status_abbrev = status.abbrev().to_string();
        self.status = status;
        self
    }

    pub fn with_queue(mut self, queue: impl Into<String>) -> Self {
        self.queue = queue.into();
        self
    }

    pub fn with_nodes(mut self, nodelist: impl Into<String>, nnodes: u32) -> Self {
        self.nodelist = nodelist.into();
        self.nnodes = nnodes;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_f58_encoding() {
        assert_eq!(JobId(0).f58(), "f1");
        assert_eq!(JobId(57).f58(), "fz");
        assert_eq!(JobId(58).f58(), "f21");
    }

    #[test]
    fn test_parse_f58_and_decimal() {
        let id: JobId = "f2ab2".parse().unwrap();
        assert_eq!(id.to_string(), "f2ab2");
        assert_eq!("ƒ2ab2".parse::<JobId>().unwrap(), id);
        // a leading zero digit is not canonical
        assert_eq!("f1ab2".parse::<JobId>().unwrap().to_string(), "fab2");
        assert_eq!("58".parse::<JobId>().unwrap(), JobId(58));
        assert_eq!("0x3a".parse::<JobId>().unwrap(), JobId(58));
    }

    #[test]
    fn test_parse_invalid_job_id() {
        assert_eq!(
            "f0O".parse::<JobId>(),
            Err(UsageError::InvalidJobId("f0O".to_string()))
        );
        assert!("".parse::<JobId>().is_err());
        assert!("f".parse::<JobId>().is_err());
        assert!("abc".parse::<JobId>().is_err());
    }

    #[test]
    fn test_parse_job_id_list() {
        let ids = parse_job_ids("12,f21,").unwrap();
        assert_eq!(ids, vec![JobId(12), JobId(58)]);
        assert!(parse_job_ids("12,nope").is_err());
    }

    #[test]
    fn test_status_from_str() {
        assert_eq!(JobStatus::from("RUN"), JobStatus::Run);
        assert_eq!(JobStatus::from("pd"), JobStatus::Sched);
        assert_eq!(JobStatus::from("CANCELED").abbrev(), "CA");
        assert!(matches!(JobStatus::from("WEIRD"), JobStatus::Unknown(_)));
    }

    #[test]
    fn test_status_classes() {
        assert!(JobStatus::Depend.is_pending());
        assert!(JobStatus::Cleanup.is_running());
        assert!(JobStatus::Timeout.is_finished());
        assert!(!JobStatus::Inactive.is_finished());
    }
}
