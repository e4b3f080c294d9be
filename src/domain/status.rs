use std::fmt;

const IN_PROGRESS: &str = "InProgress";
const COMPLETED: &str = "Completed";

/// Status of a provider-side invalidation.
///
/// The provider's vocabulary is not guaranteed stable, so anything that is neither
/// in progress nor completed is kept verbatim and treated as a failed terminal state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InvalidationStatus {
    InProgress,
    Completed,
    Other(String),
}

impl InvalidationStatus {
    pub fn parse(raw: &str) -> Self {
        match raw {
            IN_PROGRESS => Self::InProgress,
            COMPLETED => Self::Completed,
            other => Self::Other(other.to_string()),
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            Self::InProgress => IN_PROGRESS,
            Self::Completed => COMPLETED,
            Self::Other(raw) => raw.as_str(),
        }
    }
}

impl fmt::Display for InvalidationStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
