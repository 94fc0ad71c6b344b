use std::collections::{HashMap, VecDeque};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use tokio::sync::{Notify, Semaphore};

use async_trait::async_trait;
use axum::response::Response;
use serde_json::Value;

use crate::config::TriageConfig;
use crate::workflows::candidates::directory::{CandidateDirectory, DirectoryError};
use crate::workflows::candidates::domain::{Candidate, CandidateId, CandidateSummary};
use crate::workflows::candidates::service::CandidateScoutService;
use crate::workflows::candidates::store::{
    AcceptanceStore, KeyValueSlot, MemorySlot, SlotError, SAVED_CANDIDATES_KEY,
};
use crate::workflows::candidates::triage::TriageSession;

pub(super) fn candidate(id: u64, login: &str, name: Option<&str>) -> Candidate {
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

pub(super) fn located(
    id: u64,
    login: &str,
    name: Option<&str>,
    location: Option<&str>,
    company: Option<&str>,
) -> Candidate {
    let mut candidate = candidate(id, login, name);
    candidate.location = location.map(str::to_string);
    candidate.company = company.map(str::to_string);
    candidate
}

pub(super) enum PageScript {
    Page(Vec<&'static str>),
    Fail,
}

pub(super) enum DetailScript {
    Found(Candidate),
    Missing,
    Fail,
}

/// Directory fake replaying scripted pages; once the script runs out it either repeats the
/// last page forever or reports an empty page.
#[derive(Default)]
pub(super) struct ScriptedDirectory {
    pages: Mutex<VecDeque<PageScript>>,
    repeat: Mutex<Option<Vec<&'static str>>>,
    details: Mutex<HashMap<String, DetailScript>>,
    list_calls: AtomicUsize,
    detail_calls: Mutex<Vec<String>>,
}

impl ScriptedDirectory {
    pub(super) fn with_pages(pages: Vec<PageScript>) -> Self {
        let directory = Self::default();
        directory
            .pages
            .lock()
            .expect("pages mutex poisoned")
            .extend(pages);
        directory
    }

    pub(super) fn repeating(page: Vec<&'static str>) -> Self {
        let directory = Self::default();
        *directory.repeat.lock().expect("repeat mutex poisoned") = Some(page);
        directory
    }

    pub(super) fn detail(self, login: &str, script: DetailScript) -> Self {
        self.details
            .lock()
            .expect("details mutex poisoned")
            .insert(login.to_string(), script);
        self
    }

    pub(super) fn found(self, candidate: Candidate) -> Self {
        let login = candidate.login.clone();
        self.detail(&login, DetailScript::Found(candidate))
    }

    pub(super) fn list_calls(&self) -> usize {
        self.list_calls.load(Ordering::SeqCst)
    }

    pub(super) fn detail_calls(&self) -> Vec<String> {
        self.detail_calls
            .lock()
            .expect("calls mutex poisoned")
            .clone()
    }
}

#[async_trait]
impl CandidateDirectory for ScriptedDirectory {
    async fn list_candidates(&self) -> Result<Vec<CandidateSummary>, DirectoryError> {
        self.list_calls.fetch_add(1, Ordering::SeqCst);

        let next = self.pages.lock().expect("pages mutex poisoned").pop_front();
        match next {
            Some(PageScript::Page(logins)) => {
                Ok(logins.into_iter().map(CandidateSummary::new).collect())
            }
            Some(PageScript::Fail) => Err(DirectoryError::Status {
                status: 502,
                body: "bad gateway".to_string(),
            }),
            None => {
                let repeat = self.repeat.lock().expect("repeat mutex poisoned");
                Ok(repeat
                    .iter()
                    .flatten()
                    .map(|login| CandidateSummary::new(*login))
                    .collect())
            }
        }
    }

    async fn candidate_detail(&self, login: &str) -> Result<Option<Candidate>, DirectoryError> {
        self.detail_calls
            .lock()
            .expect("calls mutex poisoned")
            .push(login.to_string());

        match self
            .details
            .lock()
            .expect("details mutex poisoned")
            .get(login)
        {
            Some(DetailScript::Found(candidate)) => Ok(Some(candidate.clone())),
            Some(DetailScript::Missing) | None => Ok(None),
            Some(DetailScript::Fail) => Err(DirectoryError::Decode("truncated body".to_string())),
        }
    }
}

/// Wraps a scripted directory and holds the detail lookup of one handle until released.
pub(super) struct GatedDirectory {
    inner: ScriptedDirectory,
    gated: String,
    entered: Notify,
    gate: Semaphore,
}

impl GatedDirectory {
    pub(super) fn new(inner: ScriptedDirectory, gated: &str) -> Self {
        Self {
            inner,
            gated: gated.to_string(),
            entered: Notify::new(),
            gate: Semaphore::new(0),
        }
    }

    /// Resolves once a lookup of the gated handle is parked.
    pub(super) async fn wait_until_parked(&self) {
        self.entered.notified().await;
    }

    pub(super) fn release(&self) {
        self.gate.add_permits(1);
    }
}

#[async_trait]
impl CandidateDirectory for GatedDirectory {
    async fn list_candidates(&self) -> Result<Vec<CandidateSummary>, DirectoryError> {
        self.inner.list_candidates().await
    }

    async fn candidate_detail(&self, login: &str) -> Result<Option<Candidate>, DirectoryError> {
        if login == self.gated {
            self.entered.notify_one();
            let _permit = self.gate.acquire().await.expect("gate closed");
        }
        self.inner.candidate_detail(login).await
    }
}

/// Slot that reads fine but refuses every write.
#[derive(Default)]
pub(super) struct ReadOnlySlot {
    pub(super) value: Option<String>,
}

impl KeyValueSlot for ReadOnlySlot {
    fn key(&self) -> &str {
        SAVED_CANDIDATES_KEY
    }

    fn read(&self) -> Result<Option<String>, SlotError> {
        Ok(self.value.clone())
    }

    fn write(&self, _value: &str) -> Result<(), SlotError> {
        Err(SlotError::Unavailable("read only".to_string()))
    }
}

pub(super) fn memory_store() -> Arc<AcceptanceStore<MemorySlot>> {
    Arc::new(AcceptanceStore::new(Arc::new(MemorySlot::default())))
}

pub(super) fn seeded_store(candidates: &[Candidate]) -> Arc<AcceptanceStore<MemorySlot>> {
    let encoded = serde_json::to_string(candidates).expect("candidates encode");
    Arc::new(AcceptanceStore::new(Arc::new(MemorySlot::with_value(
        SAVED_CANDIDATES_KEY,
        encoded,
    ))))
}

pub(super) fn triage_config(max_skips: usize) -> TriageConfig {
    TriageConfig { max_skips }
}

pub(super) fn build_session(
    directory: ScriptedDirectory,
) -> (
    TriageSession<ScriptedDirectory, MemorySlot>,
    Arc<ScriptedDirectory>,
    Arc<AcceptanceStore<MemorySlot>>,
) {
    let directory = Arc::new(directory);
    let store = memory_store();
    let session = TriageSession::new(directory.clone(), store.clone(), triage_config(5));
    (session, directory, store)
}

pub(super) fn build_service(
    directory: ScriptedDirectory,
    store: Arc<AcceptanceStore<MemorySlot>>,
) -> Arc<CandidateScoutService<ScriptedDirectory, MemorySlot>> {
    Arc::new(
        CandidateScoutService::new(Arc::new(directory), store, triage_config(5))
            .expect("service builds"),
    )
}

pub(super) fn logins(candidates: &[&Candidate]) -> Vec<String> {
    candidates
        .iter()
        .map(|candidate| candidate.login.clone())
        .collect()
}

pub(super) async fn read_json_body(response: Response) -> Value {
    let body = axum::body::to_bytes(response.into_body(), 64 * 1024)
        .await
        .expect("read body");
    serde_json::from_slice(&body).expect("json payload")
}
