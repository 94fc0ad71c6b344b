use async_trait::async_trait;
use candidate_scout::config::TriageConfig;
use candidate_scout::workflows::candidates::{
    AcceptanceStore, Candidate, CandidateDirectory, CandidateId, CandidateScoutService,
    CandidateSummary, DirectoryError, MemorySlot,
};
use std::sync::{Arc, Mutex};

/// Directory with a single page; every listed handle resolves to its profile.
pub(crate) struct FixedDirectory {
    page: Mutex<Option<Vec<Candidate>>>,
    profiles: Vec<Candidate>,
}

#[async_trait]
impl CandidateDirectory for FixedDirectory {
    async fn list_candidates(&self) -> Result<Vec<CandidateSummary>, DirectoryError> {
        let page = self
            .page
            .lock()
            .expect("page mutex poisoned")
            .take()
            .unwrap_or_default();
        Ok(page
            .into_iter()
            .map(|candidate| CandidateSummary::new(candidate.login))
            .collect())
    }

    async fn candidate_detail(&self, login: &str) -> Result<Option<Candidate>, DirectoryError> {
        Ok(self
            .profiles
            .iter()
            .find(|candidate| candidate.login == login)
            .cloned())
    }
}

pub(crate) fn fixed_directory(profiles: Vec<Candidate>) -> FixedDirectory {
    FixedDirectory {
        page: Mutex::new(Some(profiles.clone())),
        profiles,
    }
}

pub(crate) fn profile(id: u64, login: &str, name: Option<&str>) -> Candidate {
    Candidate {
        id: CandidateId(id),
        login: login.to_string(),
        name: name.map(str::to_string),
        location: None,
        company: None,
        email: None,
        bio: None,
        avatar_url: format!("https://avatars.example/u/{id}"),
        html_url: format!("https://github.com/{login}"),
    }
}

pub(crate) fn memory_store() -> Arc<AcceptanceStore<MemorySlot>> {
    Arc::new(AcceptanceStore::new(Arc::new(MemorySlot::default())))
}

pub(crate) fn memory_service(
    directory: FixedDirectory,
) -> Arc<CandidateScoutService<FixedDirectory, MemorySlot>> {
    Arc::new(
        CandidateScoutService::new(Arc::new(directory), memory_store(), TriageConfig::default())
            .expect("service builds"),
    )
}
