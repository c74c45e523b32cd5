use axum::{
    extract::{rejection::JsonRejection, State},
    http::StatusCode,
    response::{IntoResponse, Json},
};
use serde::Serialize;
use serde_json::Value;
use std::sync::Arc;

use crate::config::ServiceConfig;
use crate::model::{validate_review, DealershipParams, Document, FindQuery, ReviewParams};
use crate::store::traits::DocumentStore;

/// Shared handler state: the store plus the database names and query limit.
pub struct AppState<S> {
    pub store: Arc<S>,
    pub dealerships_db: String,
    pub reviews_db: String,
    pub find_limit: u32,
}

impl<S> AppState<S> {
    pub fn new(store: Arc<S>, service: &ServiceConfig) -> Self {
        Self {
            store,
            dealerships_db: service.dealerships_db.clone(),
            reviews_db: service.reviews_db.clone(),
            find_limit: service.find_limit,
        }
    }
}

impl<S> Clone for AppState<S> {
    fn clone(&self) -> Self {
        Self {
            store: Arc::clone(&self.store),
            dealerships_db: self.dealerships_db.clone(),
            reviews_db: self.reviews_db.clone(),
            find_limit: self.find_limit,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
}

#[derive(Debug, Serialize)]
pub struct MessageResponse {
    pub message: String,
}

impl ErrorResponse {
    pub fn new(error: impl Into<String>) -> Self {
        Self {
            error: error.into(),
        }
    }
}

pub type ApiError = (StatusCode, Json<ErrorResponse>);

pub(crate) fn bad_request(message: impl Into<String>) -> ApiError {
    (StatusCode::BAD_REQUEST, Json(ErrorResponse::new(message)))
}

fn internal_error(message: &str) -> ApiError {
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(ErrorResponse::new(message)),
    )
}

/// Plain-text 404 for unknown paths and unsupported methods
pub async fn not_found() -> impl IntoResponse {
    (StatusCode::NOT_FOUND, "Not Found")
}

/// GET /api/dealership with optional `state` and `id` filters
pub async fn search_dealerships<S: DocumentStore>(
    State(state): State<AppState<S>>,
    params: DealershipParams,
) -> Result<Json<Vec<Document>>, ApiError> {
    let query = FindQuery::new(params.selector()).with_limit(state.find_limit);

    match state.store.find(&state.dealerships_db, &query).await {
        Ok(dealerships) => Ok(Json(dealerships)),
        Err(err) => {
            log::error!("Error fetching dealerships: {}", err);
            Err(internal_error(
                "An error occurred while fetching dealerships.",
            ))
        }
    }
}

/// GET /api/dealership returning every document
pub async fn list_dealerships<S: DocumentStore>(
    State(state): State<AppState<S>>,
) -> Result<Json<Vec<Document>>, ApiError> {
    match state.store.all_docs(&state.dealerships_db).await {
        Ok(dealerships) => Ok(Json(dealerships)),
        Err(err) => {
            log::error!("Error fetching dealerships: {}", err);
            Err(internal_error(
                "An error occurred while fetching dealerships.",
            ))
        }
    }
}

/// GET /api/get_reviews?id=<dealership>
///
/// Unlimited: every review of the dealership is returned.
pub async fn get_reviews<S: DocumentStore>(
    State(state): State<AppState<S>>,
    params: ReviewParams,
) -> Result<Json<Vec<Document>>, ApiError> {
    let query = FindQuery::new(params.selector());

    match state.store.find(&state.reviews_db, &query).await {
        Ok(reviews) => Ok(Json(reviews)),
        Err(err) => {
            log::error!(
                "Error fetching reviews for dealership {}: {}",
                params.dealership,
                err
            );
            Err(internal_error("An error occurred while fetching reviews."))
        }
    }
}

/// POST /api/post_review
pub async fn post_review<S: DocumentStore>(
    State(state): State<AppState<S>>,
    body: Result<Json<Value>, JsonRejection>,
) -> Result<(StatusCode, Json<MessageResponse>), ApiError> {
    let Json(body) = body.map_err(|rejection| {
        log::debug!("Rejected review body: {}", rejection);
        bad_request("Invalid JSON data")
    })?;

    let review = validate_review(body).map_err(|err| bad_request(err.to_string()))?;

    match state.store.insert(&state.reviews_db, review).await {
        Ok(stored) => {
            log::info!("Stored review {} in '{}'", stored.id, state.reviews_db);
            Ok((
                StatusCode::CREATED,
                Json(MessageResponse {
                    message: "Review posted successfully".to_string(),
                }),
            ))
        }
        Err(err) => {
            log::error!("Error posting review: {}", err);
            Err(internal_error("An error occurred while posting the review."))
        }
    }
}
