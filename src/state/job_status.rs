/// Crawl job status definitions
///
/// Every URL in the frontier is in exactly one of these states.
use std::fmt;

/// Represents the current status of a URL in the crawl frontier
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum JobStatus {
    /// URL has been discovered and is waiting to be claimed
    Todo,

    /// URL has been claimed by the orchestrator and handed to a worker
    InProgress,

    /// URL has been classified and its outcome persisted
    Done,
}

impl JobStatus {
    /// Returns true if the job needs no further processing
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Done)
    }

    /// Returns true if moving from `self` to `next` never goes backwards
    ///
    /// The crash-recovery sweep (IN_PROGRESS back to TODO) is deliberately not a
    /// forward transition; the store performs it explicitly.
    pub fn can_advance_to(&self, next: JobStatus) -> bool {
        self.rank() <= next.rank()
    }

    fn rank(&self) -> u8 {
        match self {
            Self::Todo => 0,
            Self::InProgress => 1,
            Self::Done => 2,
        }
    }

    /// Converts the status to its database string representation
    pub fn to_db_string(&self) -> &'static str {
        match self {
            Self::Todo => "TODO",
            Self::InProgress => "IN_PROGRESS",
            Self::Done => "DONE",
        }
    }

    /// Parses a status from its database string representation
    ///
    /// Returns None if the string doesn't match any known status.
    pub fn from_db_string(s: &str) -> Option<Self> {
        match s {
            "TODO" => Some(Self::Todo),
            "IN_PROGRESS" => Some(Self::InProgress),
            "DONE" => Some(Self::Done),
            _ => None,
        }
    }

    /// Returns all possible statuses in lifecycle order
    pub fn all_statuses() -> [Self; 3] {
        [Self::Todo, Self::InProgress, Self::Done]
    }
}

impl fmt::Display for JobStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_db_string())
    }
}
