use crate::error::UsageError;
use std::fmt;
use std::str::FromStr;

const KNOWN_SIGNALS: [(&str, u32); 7] = [
    ("HUP", 1),
    ("INT", 2),
    ("QUIT", 3),
    ("ABRT", 6),
    ("KILL", 9),
    ("ALRM", 14),
    ("TERM", 15),
];

/// A signal number to deliver to a job.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Signal(pub u32);

impl Signal {
    pub const KILL: Signal = Signal(9);
}

impl Default for Signal {
    fn default() -> Self {
        Signal::KILL
    }
}

impl fmt::Display for Signal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Accepts a positive number or a symbolic name such as `term` or `SIGTERM`.
impl FromStr for Signal {
    type Err = UsageError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let unknown = || UsageError::UnknownSignal(s.to_string());
        if let Ok(number) = s.parse::<u32>() {
            return if number > 0 { Ok(Signal(number)) } else { Err(unknown()) };
        }
        let upper = s.to_uppercase();
        let name = upper.strip_prefix("SIG").unwrap_or(&upper);
        KNOWN_SIGNALS
            .iter()
            .find(|(known, _)| *known == name)
            .map(|(_, number)| Signal(*number))
            .ok_or_else(unknown)
    }
}
