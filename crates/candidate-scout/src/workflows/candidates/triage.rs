use std::collections::VecDeque;
use std::sync::Arc;

use serde::Serialize;
use tracing::{debug, error, info, warn};

use super::directory::{CandidateDirectory, DirectoryError};
use super::domain::{Candidate, CandidateCardView, CandidateSummary};
use super::store::{AcceptanceStore, AppendOutcome, KeyValueSlot, StoreError};
use crate::config::TriageConfig;

/// Message shown when the directory cannot be reached or answers garbage.
pub const FETCH_FAILED_MESSAGE: &str = "Error fetching candidate. Please try again.";
/// Message shown when a fetch gave up after too many incomplete profiles.
pub const SKIP_LIMIT_MESSAGE: &str = "No complete candidate profiles found. Please try again.";

/// Where a triage session currently stands.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TriageState {
    Loading,
    Ready(Candidate),
    Exhausted,
    Failed(String),
}

impl TriageState {
    pub fn label(&self) -> &'static str {
        match self {
            TriageState::Loading => "loading",
            TriageState::Ready(_) => "ready",
            TriageState::Exhausted => "exhausted",
            TriageState::Failed(_) => "failed",
        }
    }

    pub fn current(&self) -> Option<&Candidate> {
        match self {
            TriageState::Ready(candidate) => Some(candidate),
            _ => None,
        }
    }

    pub fn view(&self) -> TriageView {
        TriageView {
            status: self.label(),
            loading: matches!(self, TriageState::Loading),
            exhausted: matches!(self, TriageState::Exhausted),
            error: match self {
                TriageState::Failed(message) => Some(message.clone()),
                _ => None,
            },
            candidate: self.current().map(Candidate::card_view),
        }
    }
}

/// Flattened session state for presentation.
#[derive(Debug, Clone, Serialize)]
pub struct TriageView {
    pub status: &'static str,
    pub loading: bool,
    pub exhausted: bool,
    pub error: Option<String>,
    pub candidate: Option<CandidateCardView>,
}

#[derive(Debug, thiserror::Error)]
pub enum TriageError {
    #[error("cannot {action} while triage is {state}")]
    InvalidAction {
        action: &'static str,
        state: &'static str,
    },
    #[error(transparent)]
    Store(#[from] StoreError),
}

enum FetchOutcome {
    Found(Candidate),
    Exhausted,
    SkipLimit,
}

/// One-at-a-time accept/reject review over the directory.
///
/// Requests are issued strictly one after another; the next one starts only after the
/// previous one resolved.
pub struct TriageSession<D, S> {
    directory: Arc<D>,
    store: Arc<AcceptanceStore<S>>,
    max_skips: usize,
    state: TriageState,
    pending: VecDeque<CandidateSummary>,
}

impl<D, S> TriageSession<D, S>
where
    D: CandidateDirectory,
    S: KeyValueSlot,
{
    pub fn new(directory: Arc<D>, store: Arc<AcceptanceStore<S>>, config: TriageConfig) -> Self {
        Self {
            directory,
            store,
            max_skips: config.max_skips.max(1),
            state: TriageState::Loading,
            pending: VecDeque::new(),
        }
    }

    pub fn state(&self) -> &TriageState {
        &self.state
    }

    pub fn store(&self) -> &Arc<AcceptanceStore<S>> {
        &self.store
    }

    /// Reset the session and load the first candidate.
    pub async fn activate(&mut self) -> &TriageState {
        self.pending.clear();
        self.fetch().await
    }

    /// Save the current candidate, then move on to the next one.
    ///
    /// When the store cannot be written the session keeps the same candidate so the
    /// decision can be repeated.
    pub async fn accept(&mut self) -> Result<AppendOutcome, TriageError> {
        let candidate = self.require_ready("accept")?.clone();
        let login = candidate.login.clone();

        let outcome = self.store.append(candidate)?;
        info!(%login, ?outcome, "candidate accepted");

        self.fetch().await;
        Ok(outcome)
    }

    /// Drop the current candidate without saving it, then move on.
    pub async fn reject(&mut self) -> Result<(), TriageError> {
        let login = self.require_ready("reject")?.login.clone();
        info!(%login, "candidate rejected");

        self.fetch().await;
        Ok(())
    }

    /// Fetch again after a failure.
    pub async fn retry(&mut self) -> Result<&TriageState, TriageError> {
        if !matches!(self.state, TriageState::Failed(_)) {
            return Err(TriageError::InvalidAction {
                action: "retry",
                state: self.state.label(),
            });
        }
        Ok(self.fetch().await)
    }

    fn require_ready(&self, action: &'static str) -> Result<&Candidate, TriageError> {
        self.state.current().ok_or(TriageError::InvalidAction {
            action,
            state: self.state.label(),
        })
    }

    async fn fetch(&mut self) -> &TriageState {
        self.state = TriageState::Loading;

        self.state = match self.next_candidate().await {
            Ok(FetchOutcome::Found(candidate)) => {
                debug!(login = %candidate.login, "candidate ready");
                TriageState::Ready(candidate)
            }
            Ok(FetchOutcome::Exhausted) => {
                info!("directory exhausted");
                TriageState::Exhausted
            }
            Ok(FetchOutcome::SkipLimit) => {
                warn!(
                    max_skips = self.max_skips,
                    "gave up after consecutive incomplete profiles"
                );
                TriageState::Failed(SKIP_LIMIT_MESSAGE.to_string())
            }
            Err(err) => {
                error!(error = %err, "failed to fetch candidate");
                TriageState::Failed(FETCH_FAILED_MESSAGE.to_string())
            }
        };

        &self.state
    }

    async fn next_candidate(&mut self) -> Result<FetchOutcome, DirectoryError> {
        let mut skipped = 0;

        loop {
            let Some(entry) = self.next_entry().await? else {
                return Ok(FetchOutcome::Exhausted);
            };

            let detail = if entry.login.trim().is_empty() {
                None
            } else {
                self.directory.candidate_detail(&entry.login).await?
            };

            match detail {
                Some(candidate) if candidate.has_handle() => {
                    return Ok(FetchOutcome::Found(candidate))
                }
                _ => {
                    skipped += 1;
                    debug!(login = %entry.login, skipped, "skipping incomplete profile");
                    if skipped >= self.max_skips {
                        return Ok(FetchOutcome::SkipLimit);
                    }
                }
            }
        }
    }

    /// Front of the current page, listing a new page once the previous one is used up.
    async fn next_entry(&mut self) -> Result<Option<CandidateSummary>, DirectoryError> {
        if self.pending.is_empty() {
            let page = self.directory.list_candidates().await?;
            debug!(entries = page.len(), "directory page listed");
            self.pending.extend(page);
        }
        Ok(self.pending.pop_front())
    }
}
