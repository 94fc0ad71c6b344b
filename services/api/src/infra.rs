use candidate_scout::config::{AppConfig, DirectoryConfig, StorageConfig};
use candidate_scout::error::AppError;
use candidate_scout::telemetry;
use candidate_scout::workflows::candidates::{
    AcceptanceStore, Candidate, CandidateId, FileSlot, GitHubDirectory, SAVED_CANDIDATES_KEY,
};
use metrics_exporter_prometheus::PrometheusHandle;
use std::sync::atomic::AtomicBool;
use std::sync::Arc;
use tracing::debug;

#[derive(Clone)]
pub(crate) struct AppState {
    pub(crate) readiness: Arc<AtomicBool>,
    pub(crate) metrics: Arc<PrometheusHandle>,
}

/// Configuration plus the global subscriber, for the one-shot CLI commands.
pub(crate) fn load_config() -> Result<AppConfig, AppError> {
    let config = AppConfig::load()?;
    telemetry::init(&config.telemetry)?;
    Ok(config)
}

pub(crate) fn open_store(config: &StorageConfig) -> Arc<AcceptanceStore<FileSlot>> {
    let slot = FileSlot::new(&config.data_dir, SAVED_CANDIDATES_KEY);
    debug!(path = %slot.path().display(), "opening acceptance store");
    Arc::new(AcceptanceStore::new(Arc::new(slot)))
}

pub(crate) fn open_directory(config: &DirectoryConfig) -> Result<Arc<GitHubDirectory>, AppError> {
    Ok(Arc::new(GitHubDirectory::new(config)?))
}

/// Fixed profile for checking the review table without hitting the directory.
pub(crate) fn sample_candidate() -> Candidate {
    Candidate {
        id: CandidateId(12345),
        login: "testuser".to_string(),
        name: Some("Test User".to_string()),
        location: Some("Test Location".to_string()),
        company: Some("Test Company".to_string()),
        email: Some("test@example.com".to_string()),
        bio: Some("This is a test user".to_string()),
        avatar_url: "https://avatars.githubusercontent.com/u/12345".to_string(),
        html_url: "https://github.com/testuser".to_string(),
    }
}
