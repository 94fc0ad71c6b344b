//! Candidate triage: directory lookups, the acceptance store and the review table.
//!
//! The triage session pulls one complete profile at a time from a [`CandidateDirectory`]
//! and routes accepted candidates into the [`AcceptanceStore`]. The [`ReviewTable`]
//! derives a filtered, sorted view of the saved list and only reloads it when the store's
//! change feed says so.

pub mod directory;
pub mod domain;
pub mod github;
pub mod review;
pub mod router;
pub mod service;
pub mod store;
pub mod triage;

#[cfg(test)]
mod tests;

pub use directory::{CandidateDirectory, DirectoryError};
pub use domain::{
    Candidate, CandidateCardView, CandidateId, CandidateRowView, CandidateSummary, NOT_AVAILABLE,
};
pub use github::GitHubDirectory;
pub use review::{
    derive_rows, matches_filter, ColumnHeader, ReviewTable, ReviewView, SortDirection,
    SortField, SortSpec, UnknownSortField,
};
pub use router::scout_router;
pub use service::{AcceptView, CandidateScoutService, RemovalView, ScoutServiceError};
pub use store::{
    AcceptanceStore, AppendOutcome, FileSlot, KeyValueSlot, MemorySlot, SlotError,
    StorageChange, StorageEvents, StorageSubscription, StoreError, SAVED_CANDIDATES_KEY,
};
pub use triage::{
    TriageError, TriageSession, TriageState, TriageView, FETCH_FAILED_MESSAGE,
    SKIP_LIMIT_MESSAGE,
};
