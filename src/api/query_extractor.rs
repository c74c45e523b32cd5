use axum::{
    async_trait,
    extract::{FromRequestParts, Query},
    http::request::Parts,
};
use std::convert::Infallible;

use crate::api::handlers::{bad_request, ApiError};
use crate::model::{DealershipParams, QueryPairs, ReviewParams};

/// Axum extractor for the dealership filters.
///
/// Never rejects: missing, empty and unknown parameters simply add no filter.
#[async_trait]
impl<S> FromRequestParts<S> for DealershipParams
where
    S: Send + Sync,
{
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        Ok(DealershipParams::from_pairs(&query_pairs(parts)))
    }
}

/// Axum extractor for the review lookup; rejects with a JSON 400.
#[async_trait]
impl<S> FromRequestParts<S> for ReviewParams
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        ReviewParams::from_pairs(&query_pairs(parts)).map_err(|err| bad_request(err.to_string()))
    }
}

/// Decoded query-string pairs, empty when there is no query
fn query_pairs(parts: &Parts) -> QueryPairs {
    Query::<QueryPairs>::try_from_uri(&parts.uri)
        .map(|Query(pairs)| pairs)
        .unwrap_or_default()
}
