use std::fmt;

use serde::{Deserialize, Serialize};

/// Stable directory identifier; the primary key for dedup and removal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CandidateId(pub u64);

impl fmt::Display for CandidateId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Full profile record for a single directory entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Candidate {
    pub id: CandidateId,
    pub login: String,
    pub name: Option<String>,
    pub location: Option<String>,
    pub company: Option<String>,
    pub email: Option<String>,
    pub bio: Option<String>,
    pub avatar_url: String,
    pub html_url: String,
}

impl Candidate {
    /// A profile without a handle cannot be presented and is skipped by triage.
    pub fn has_handle(&self) -> bool {
        !self.login.trim().is_empty()
    }

    pub fn card_view(&self) -> CandidateCardView {
        CandidateCardView {
            id: self.id,
            display_name: self
                .name
                .clone()
                .unwrap_or_else(|| "No Name Provided".to_string()),
            handle: format!("@{}", self.login),
            login: self.login.clone(),
            location: self.location.clone(),
            bio: self.bio.clone(),
            company: self.company.clone(),
            email: self.email.clone(),
            avatar_url: self.avatar_url.clone(),
            html_url: self.html_url.clone(),
        }
    }

    pub fn row_view(&self) -> CandidateRowView {
        CandidateRowView {
            id: self.id,
            avatar_url: self.avatar_url.clone(),
            name: or_not_available(&self.name),
            login: self.login.clone(),
            location: or_not_available(&self.location),
            company: or_not_available(&self.company),
            email: or_not_available(&self.email),
            html_url: self.html_url.clone(),
        }
    }
}

fn or_not_available(value: &Option<String>) -> String {
    value.clone().unwrap_or_else(|| NOT_AVAILABLE.to_string())
}

pub const NOT_AVAILABLE: &str = "N/A";

/// One entry of a directory listing page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CandidateSummary {
    pub login: String,
    #[serde(default)]
    pub id: Option<CandidateId>,
    #[serde(default)]
    pub avatar_url: Option<String>,
}

impl CandidateSummary {
    pub fn new(login: impl Into<String>) -> Self {
        Self {
            login: login.into(),
            id: None,
            avatar_url: None,
        }
    }
}

/// Presentation of the candidate currently under triage.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CandidateCardView {
    pub id: CandidateId,
    pub display_name: String,
    pub handle: String,
    pub login: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bio: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub company: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    pub avatar_url: String,
    pub html_url: String,
}

/// One row of the saved-candidates table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CandidateRowView {
    pub id: CandidateId,
    pub avatar_url: String,
    pub name: String,
    pub login: String,
    pub location: String,
    pub company: String,
    pub email: String,
    pub html_url: String,
}
