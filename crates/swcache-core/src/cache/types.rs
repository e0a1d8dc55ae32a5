//! Types stored in and reported by the cache database.

/// Lifecycle of one cache generation, stored as a string.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GenerationState {
    /// Install in progress or failed; never serves.
    Building,
    /// Every seed entry committed; may serve and may become active.
    Ready,
}

impl GenerationState {
    pub fn as_str(self) -> &'static str {
        match self {
            GenerationState::Building => "building",
            GenerationState::Ready => "ready",
        }
    }

    pub fn from_str(s: &str) -> Self {
        match s {
            "ready" => GenerationState::Ready,
            _ => GenerationState::Building,
        }
    }
}

/// Summary view used by `swcache status`.
#[derive(Debug, Clone)]
pub struct GenerationSummary {
    pub name: String,
    pub state: GenerationState,
    pub entries: i64,
    pub active: bool,
}

#[derive(Debug, Clone)]
pub struct EntrySummary {
    pub method: String,
    pub url: String,
    pub status: u16,
    pub size: i64,
    pub body_sha256: String,
}
