use std::sync::Arc;

use serde::Serialize;
use tokio::sync::{Mutex, MutexGuard};

use super::directory::CandidateDirectory;
use super::domain::CandidateId;
use super::review::{ReviewTable, ReviewView, SortField};
use super::store::{AcceptanceStore, AppendOutcome, KeyValueSlot, StoreError};
use super::triage::{TriageError, TriageSession, TriageState, TriageView};
use crate::config::TriageConfig;

/// Service composing one triage session and one review table over a shared store.
///
/// The session lock is held for the whole of a fetch. Decisions arriving meanwhile are
/// refused with the loading state, never queued behind it.
pub struct CandidateScoutService<D, S> {
    store: Arc<AcceptanceStore<S>>,
    triage: Mutex<TriageSession<D, S>>,
    review: Mutex<ReviewTable<S>>,
}

/// Result of an accept decision together with the next triage state.
#[derive(Debug, Clone, Serialize)]
pub struct AcceptView {
    pub outcome: AppendOutcome,
    pub triage: TriageView,
}

/// Result of a remove action together with the refreshed table.
#[derive(Debug, Clone, Serialize)]
pub struct RemovalView {
    pub id: CandidateId,
    pub removed: bool,
    pub review: ReviewView,
}

impl<D, S> CandidateScoutService<D, S>
where
    D: CandidateDirectory + 'static,
    S: KeyValueSlot + 'static,
{
    pub fn new(
        directory: Arc<D>,
        store: Arc<AcceptanceStore<S>>,
        config: TriageConfig,
    ) -> Result<Self, StoreError> {
        let review = ReviewTable::open(store.clone())?;
        let triage = TriageSession::new(directory, store.clone(), config);

        Ok(Self {
            store,
            triage: Mutex::new(triage),
            review: Mutex::new(review),
        })
    }

    pub fn store(&self) -> &Arc<AcceptanceStore<S>> {
        &self.store
    }

    pub async fn triage_view(&self) -> TriageView {
        match self.triage.try_lock() {
            Ok(session) => session.state().view(),
            Err(_) => TriageState::Loading.view(),
        }
    }

    /// (Re)activate the triage view: reset the session and load a candidate.
    ///
    /// While a fetch is already running this reports the loading state and starts nothing.
    pub async fn activate(&self) -> TriageView {
        match self.triage.try_lock() {
            Ok(mut session) => session.activate().await.view(),
            Err(_) => TriageState::Loading.view(),
        }
    }

    pub async fn accept(&self) -> Result<AcceptView, ScoutServiceError> {
        let mut session = self.idle_session("accept")?;
        let outcome = session.accept().await?;
        Ok(AcceptView {
            outcome,
            triage: session.state().view(),
        })
    }

    pub async fn reject(&self) -> Result<TriageView, ScoutServiceError> {
        let mut session = self.idle_session("reject")?;
        session.reject().await?;
        Ok(session.state().view())
    }

    pub async fn retry(&self) -> Result<TriageView, ScoutServiceError> {
        let mut session = self.idle_session("retry")?;
        Ok(session.retry().await?.view())
    }

    fn idle_session(
        &self,
        action: &'static str,
    ) -> Result<MutexGuard<'_, TriageSession<D, S>>, ScoutServiceError> {
        self.triage.try_lock().map_err(|_| {
            ScoutServiceError::Triage(TriageError::InvalidAction {
                action,
                state: TriageState::Loading.label(),
            })
        })
    }

    pub async fn review_view(&self) -> Result<ReviewView, ScoutServiceError> {
        let mut table = self.review.lock().await;
        table.sync()?;
        Ok(table.view())
    }

    pub async fn set_filter(&self, needle: String) -> Result<ReviewView, ScoutServiceError> {
        let mut table = self.review.lock().await;
        table.sync()?;
        table.set_filter(needle);
        Ok(table.view())
    }

    pub async fn toggle_sort(&self, field: SortField) -> Result<ReviewView, ScoutServiceError> {
        let mut table = self.review.lock().await;
        table.sync()?;
        table.toggle_sort(field);
        Ok(table.view())
    }

    /// Storage-change notification from another process.
    pub async fn refresh(&self) -> Result<ReviewView, ScoutServiceError> {
        self.store.notify_external();
        self.review_view().await
    }

    pub async fn remove(&self, id: CandidateId) -> Result<RemovalView, ScoutServiceError> {
        let mut table = self.review.lock().await;
        table.sync()?;
        let removed = table.remove(id)?;
        Ok(RemovalView {
            id,
            removed,
            review: table.view(),
        })
    }
}

/// Error raised by the scout service.
#[derive(Debug, thiserror::Error)]
pub enum ScoutServiceError {
    #[error(transparent)]
    Triage(#[from] TriageError),
    #[error(transparent)]
    Store(#[from] StoreError),
}
