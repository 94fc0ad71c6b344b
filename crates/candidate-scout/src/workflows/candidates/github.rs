use std::sync::atomic::{AtomicU64, Ordering};

use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, AUTHORIZATION, USER_AGENT};
use reqwest::{Client, StatusCode, Url};
use serde::Deserialize;
use tracing::debug;

use super::directory::{CandidateDirectory, DirectoryError};
use super::domain::{Candidate, CandidateId, CandidateSummary};
use crate::config::DirectoryConfig;

const CLIENT_USER_AGENT: &str = "candidate-scout";
const GITHUB_MEDIA_TYPE: &str = "application/vnd.github.v3+json";

/// Directory backed by the GitHub REST API (`/users` and `/users/{login}`).
///
/// Listing walks the user index with the `since` cursor; every page moves the cursor past
/// the highest id it returned, so consecutive listings never repeat an entry.
pub struct GitHubDirectory {
    client: Client,
    base_url: Url,
    page_size: u8,
    cursor: AtomicU64,
}

impl GitHubDirectory {
    pub fn new(config: &DirectoryConfig) -> Result<Self, DirectoryError> {
        let base_url = Url::parse(&config.api_url)
            .map_err(|err| DirectoryError::Configuration(format!("invalid API url: {err}")))?;
        if base_url.cannot_be_a_base() {
            return Err(DirectoryError::Configuration(format!(
                "API url '{}' cannot carry a path",
                config.api_url
            )));
        }

        Ok(Self {
            client: build_client(config.token.as_deref())?,
            base_url,
            page_size: config.page_size,
            cursor: AtomicU64::new(config.since),
        })
    }

    /// Directory id the next listing starts after.
    pub fn cursor(&self) -> u64 {
        self.cursor.load(Ordering::Acquire)
    }

    fn endpoint(&self, segments: &[&str]) -> Url {
        let mut url = self.base_url.clone();
        if let Ok(mut path) = url.path_segments_mut() {
            path.pop_if_empty().extend(segments);
        }
        url
    }
}

/// Creates a preconfigured HTTP client with the directory's required headers.
fn build_client(token: Option<&str>) -> Result<Client, DirectoryError> {
    let mut headers = HeaderMap::new();
    headers.insert(USER_AGENT, HeaderValue::from_static(CLIENT_USER_AGENT));
    headers.insert(ACCEPT, HeaderValue::from_static(GITHUB_MEDIA_TYPE));

    if let Some(token) = token {
        let mut value = HeaderValue::from_str(&format!("Bearer {token}")).map_err(|_| {
            DirectoryError::Configuration("GITHUB_TOKEN is not a valid header value".to_string())
        })?;
        value.set_sensitive(true);
        headers.insert(AUTHORIZATION, value);
    }

    Ok(Client::builder().default_headers(headers).build()?)
}

#[async_trait]
impl CandidateDirectory for GitHubDirectory {
    async fn list_candidates(&self) -> Result<Vec<CandidateSummary>, DirectoryError> {
        let since = self.cursor();
        let url = self.endpoint(&["users"]);
        debug!(%url, since, "listing directory page");

        let response = self
            .client
            .get(url)
            .query(&[
                ("since", since.to_string()),
                ("per_page", self.page_size.to_string()),
            ])
            .send()
            .await?;

        let status = response.status();
        let body = response.text().await?;
        if !status.is_success() {
            return Err(DirectoryError::Status {
                status: status.as_u16(),
                body,
            });
        }

        let listed: Vec<ListedUser> =
            serde_json::from_str(&body).map_err(|err| DirectoryError::Decode(err.to_string()))?;

        if let Some(highest) = listed.iter().map(|user| user.id).max() {
            self.cursor.fetch_max(highest, Ordering::AcqRel);
        }

        Ok(listed.into_iter().map(ListedUser::into_summary).collect())
    }

    async fn candidate_detail(&self, login: &str) -> Result<Option<Candidate>, DirectoryError> {
        let url = self.endpoint(&["users", login]);
        debug!(%url, "fetching candidate detail");

        let response = self.client.get(url).send().await?;
        let status = response.status();
        if status == StatusCode::NOT_FOUND {
            return Ok(None);
        }

        let body = response.text().await?;
        if !status.is_success() {
            return Err(DirectoryError::Status {
                status: status.as_u16(),
                body,
            });
        }

        let detail: UserDetail =
            serde_json::from_str(&body).map_err(|err| DirectoryError::Decode(err.to_string()))?;
        Ok(detail.into_candidate())
    }
}

#[derive(Debug, Deserialize)]
struct ListedUser {
    login: String,
    id: u64,
    #[serde(default)]
    avatar_url: Option<String>,
}

impl ListedUser {
    fn into_summary(self) -> CandidateSummary {
        CandidateSummary {
            login: self.login,
            id: Some(CandidateId(self.id)),
            avatar_url: self.avatar_url,
        }
    }
}

/// Lenient detail payload; a record without id or handle is an incomplete profile.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct UserDetail {
    id: Option<u64>,
    login: Option<String>,
    name: Option<String>,
    location: Option<String>,
    company: Option<String>,
    email: Option<String>,
    bio: Option<String>,
    avatar_url: Option<String>,
    html_url: Option<String>,
}

impl UserDetail {
    fn into_candidate(self) -> Option<Candidate> {
        let id = self.id?;
        let login = self.login.filter(|login| !login.trim().is_empty())?;

        Some(Candidate {
            id: CandidateId(id),
            login,
            name: self.name,
            location: self.location,
            company: self.company,
            email: self.email,
            bio: self.bio,
            avatar_url: self.avatar_url.unwrap_or_default(),
            html_url: self.html_url.unwrap_or_default(),
        })
    }
}
