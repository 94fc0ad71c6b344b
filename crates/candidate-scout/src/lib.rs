//! Candidate triage over a public developer directory.
//!
//! Candidates are pulled one at a time from a [`CandidateDirectory`], accepted or rejected,
//! and accepted profiles are kept in a local [`AcceptanceStore`] for review.
//!
//! [`CandidateDirectory`]: workflows::candidates::CandidateDirectory
//! [`AcceptanceStore`]: workflows::candidates::AcceptanceStore

pub mod config;
pub mod error;
pub mod telemetry;
pub mod workflows;
