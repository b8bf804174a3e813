use std::fmt;
use std::str::FromStr;

/// Status of a dubbing job as reported by the remote service.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DubStatus {
    Queued,
    Dubbing,
    Dubbed,
    Failed,
}

impl DubStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            DubStatus::Queued => "queued",
            DubStatus::Dubbing => "dubbing",
            DubStatus::Dubbed => "dubbed",
            DubStatus::Failed => "failed",
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, DubStatus::Dubbed | DubStatus::Failed)
    }
}

impl FromStr for DubStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "queued" => Ok(DubStatus::Queued),
            "dubbing" => Ok(DubStatus::Dubbing),
            "dubbed" => Ok(DubStatus::Dubbed),
            "failed" => Ok(DubStatus::Failed),
            _ => Err(format!("Invalid dub status: {}", s)),
        }
    }
}

impl fmt::Display for DubStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
