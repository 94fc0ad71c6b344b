use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{delete, get, post, put},
    Json, Router,
};
use serde::{Deserialize, Serialize};

use crate::error::AppError;

use super::directory::CandidateDirectory;
use super::domain::CandidateId;
use super::review::SortField;
use super::service::{CandidateScoutService, ScoutServiceError};
use super::store::KeyValueSlot;

type SharedService<D, S> = Arc<CandidateScoutService<D, S>>;

/// Router builder exposing the triage and review views.
pub fn scout_router<D, S>(service: SharedService<D, S>) -> Router
where
    D: CandidateDirectory + 'static,
    S: KeyValueSlot + 'static,
{
    Router::new()
        .route("/api/v1/triage", get(triage_handler::<D, S>))
        .route("/api/v1/triage/activate", post(activate_handler::<D, S>))
        .route("/api/v1/triage/accept", post(accept_handler::<D, S>))
        .route("/api/v1/triage/reject", post(reject_handler::<D, S>))
        .route("/api/v1/triage/retry", post(retry_handler::<D, S>))
        .route("/api/v1/review", get(review_handler::<D, S>))
        .route("/api/v1/review/filter", put(filter_handler::<D, S>))
        .route("/api/v1/review/sort/:field", post(sort_handler::<D, S>))
        .route("/api/v1/review/refresh", post(refresh_handler::<D, S>))
        .route("/api/v1/review/candidates/:id", delete(remove_handler::<D, S>))
        .with_state(service)
}

#[derive(Debug, Deserialize)]
pub(crate) struct FilterRequest {
    #[serde(default)]
    pub(crate) needle: String,
}

pub(crate) async fn triage_handler<D, S>(State(service): State<SharedService<D, S>>) -> Response
where
    D: CandidateDirectory + 'static,
    S: KeyValueSlot + 'static,
{
    (StatusCode::OK, Json(service.triage_view().await)).into_response()
}

pub(crate) async fn activate_handler<D, S>(State(service): State<SharedService<D, S>>) -> Response
where
    D: CandidateDirectory + 'static,
    S: KeyValueSlot + 'static,
{
    (StatusCode::OK, Json(service.activate().await)).into_response()
}

pub(crate) async fn accept_handler<D, S>(State(service): State<SharedService<D, S>>) -> Response
where
    D: CandidateDirectory + 'static,
    S: KeyValueSlot + 'static,
{
    respond(service.accept().await)
}

pub(crate) async fn reject_handler<D, S>(State(service): State<SharedService<D, S>>) -> Response
where
    D: CandidateDirectory + 'static,
    S: KeyValueSlot + 'static,
{
    respond(service.reject().await)
}

pub(crate) async fn retry_handler<D, S>(State(service): State<SharedService<D, S>>) -> Response
where
    D: CandidateDirectory + 'static,
    S: KeyValueSlot + 'static,
{
    respond(service.retry().await)
}

pub(crate) async fn review_handler<D, S>(State(service): State<SharedService<D, S>>) -> Response
where
    D: CandidateDirectory + 'static,
    S: KeyValueSlot + 'static,
{
    respond(service.review_view().await)
}

pub(crate) async fn filter_handler<D, S>(
    State(service): State<SharedService<D, S>>,
    Json(request): Json<FilterRequest>,
) -> Response
where
    D: CandidateDirectory + 'static,
    S: KeyValueSlot + 'static,
{
    respond(service.set_filter(request.needle).await)
}

pub(crate) async fn sort_handler<D, S>(
    State(service): State<SharedService<D, S>>,
    Path(field): Path<String>,
) -> Response
where
    D: CandidateDirectory + 'static,
    S: KeyValueSlot + 'static,
{
    let field = match field.parse::<SortField>() {
        Ok(field) => field,
        Err(err) => return AppError::from(err).into_response(),
    };

    respond(service.toggle_sort(field).await)
}

pub(crate) async fn refresh_handler<D, S>(State(service): State<SharedService<D, S>>) -> Response
where
    D: CandidateDirectory + 'static,
    S: KeyValueSlot + 'static,
{
    respond(service.refresh().await)
}

pub(crate) async fn remove_handler<D, S>(
    State(service): State<SharedService<D, S>>,
    Path(id): Path<u64>,
) -> Response
where
    D: CandidateDirectory + 'static,
    S: KeyValueSlot + 'static,
{
    respond(service.remove(CandidateId(id)).await)
}

fn respond<T: Serialize>(result: Result<T, ScoutServiceError>) -> Response {
    match result {
        Ok(view) => (StatusCode::OK, Json(view)).into_response(),
        Err(err) => AppError::from(err).into_response(),
    }
}
