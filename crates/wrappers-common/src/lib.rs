pub mod cli;
pub mod client;
pub mod configuration;
pub mod error;
pub mod filter;
pub mod flux;
pub mod format;
pub mod hostlist;
pub mod job;
pub mod memory;
pub mod settings;
pub mod signal;
pub mod telemetry;
#[cfg(feature = "test-util")]
pub mod testing;

// re-export
pub use client::{JobQuery, JobService, StateFilter, UserScope};
pub use error::{Error, MutationError, Result, UsageError};
pub use filter::{FilterSet, JobFilter};
pub use flux::FluxCli;
pub use format::{FieldKey, FieldSource, Header, Template};
pub use hostlist::Hostlist;
pub use job::{JobId, JobRecord, JobStatus};
pub use memory::InMemoryScheduler;
pub use settings::Settings;
pub use signal::Signal;

#[doc(hidden)]
pub use tracing as __tracing;

/// `log!(warn, "...")` forwards to the matching `tracing` macro.
#[macro_export]
macro_rules! log {
    ($level:ident, $($arg:tt)+) => {
        $crate::__tracing::$level!($($arg)+)
    };
}
