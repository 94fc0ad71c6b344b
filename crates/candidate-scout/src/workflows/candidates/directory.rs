use async_trait::async_trait;

use super::domain::{Candidate, CandidateSummary};

/// Source of candidate profiles: a paged listing plus a per-handle detail lookup.
#[async_trait]
pub trait CandidateDirectory: Send + Sync {
    /// Next page of directory entries. An empty page means the directory is exhausted.
    async fn list_candidates(&self) -> Result<Vec<CandidateSummary>, DirectoryError>;

    /// Full record for `login`. `Ok(None)` is the normal "skip this entry" outcome.
    async fn candidate_detail(&self, login: &str) -> Result<Option<Candidate>, DirectoryError>;
}

/// Transport or payload failure while talking to the directory.
#[derive(Debug, thiserror::Error)]
pub enum DirectoryError {
    #[error("directory request failed: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("directory responded with status {status}: {body}")]
    Status { status: u16, body: String },
    #[error("directory payload could not be decoded: {0}")]
    Decode(String),
    #[error("directory client misconfigured: {0}")]
    Configuration(String),
}
