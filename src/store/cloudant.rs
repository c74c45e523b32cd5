use std::time::Duration;

use reqwest::{Client, RequestBuilder, Response};
use secrecy::{ExposeSecret, Secret};
use serde::Deserialize;

use crate::model::{Document, DocumentRef, FindQuery};
use crate::store::iam::IamAuthenticator;
use crate::store::traits::DocumentStore;
use crate::store::{StoreError, StoreResult};

// Cloudant JSON response shapes

#[derive(Debug, Deserialize)]
struct FindResponse {
    docs: Vec<Document>,
    #[serde(default)]
    warning: Option<String>,
}

#[derive(Debug, Deserialize)]
struct AllDocsResponse {
    rows: Vec<AllDocsRow>,
}

#[derive(Debug, Deserialize)]
struct AllDocsRow {
    #[serde(default)]
    doc: Option<Document>,
}

#[derive(Debug, Deserialize)]
struct CloudantError {
    #[serde(default)]
    error: String,
    #[serde(default)]
    reason: String,
}

/// How requests to Cloudant are authorized.
pub enum Credentials {
    Iam(IamAuthenticator),
    Basic {
        username: String,
        password: Secret<String>,
    },
    None,
}

/// Store backed by a Cloudant (or any CouchDB-compatible) service.
pub struct CloudantStore {
    client: Client,
    base_url: String,
    credentials: Credentials,
}

impl CloudantStore {
    /// Build an HTTP client with the given per-request timeout
    pub fn http_client(timeout: Duration) -> StoreResult<Client> {
        Ok(Client::builder().timeout(timeout).build()?)
    }

    /// `url` is the service root, e.g. `https://<account>.cloudantnosqldb.appdomain.cloud`
    pub fn new(url: &str, client: Client, credentials: Credentials) -> Self {
        Self {
            client,
            base_url: url.trim_end_matches('/').to_string(),
            credentials,
        }
    }

    fn url(&self, db: &str, path: &str) -> String {
        if path.is_empty() {
            format!("{}/{}", self.base_url, db)
        } else {
            format!("{}/{}/{}", self.base_url, db, path.trim_start_matches('/'))
        }
    }

    async fn authorize(&self, request: RequestBuilder) -> StoreResult<RequestBuilder> {
        Ok(match &self.credentials {
            Credentials::Iam(iam) => request.bearer_auth(iam.access_token().await?),
            Credentials::Basic { username, password } => {
                request.basic_auth(username, Some(password.expose_secret()))
            }
            Credentials::None => request,
        })
    }

    async fn send(&self, request: RequestBuilder) -> StoreResult<Response> {
        let response = self.authorize(request).await?.send().await?;
        self.check_error(response).await
    }

    async fn check_error(&self, response: Response) -> StoreResult<Response> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        match status.as_u16() {
            401 => {
                // A revoked token is dropped so the next call exchanges again
                if let Credentials::Iam(iam) = &self.credentials {
                    iam.invalidate().await;
                }
                Err(StoreError::Unauthorized(reason(response).await))
            }
            403 => Err(StoreError::Forbidden(reason(response).await)),
            404 => Err(StoreError::NotFound(reason(response).await)),
            409 => Err(StoreError::Conflict(reason(response).await)),
            code => {
                let body = response.text().await.unwrap_or_default();
                Err(StoreError::Http { status: code, body })
            }
        }
    }
}

async fn reason(response: Response) -> String {
    match response.json::<CloudantError>().await {
        Ok(body) if !body.reason.is_empty() => body.reason,
        Ok(body) if !body.error.is_empty() => body.error,
        _ => "no reason given".to_string(),
    }
}

async fn decode<T: serde::de::DeserializeOwned>(response: Response) -> StoreResult<T> {
    response
        .json::<T>()
        .await
        .map_err(|e| StoreError::InvalidResponse(e.to_string()))
}

#[async_trait::async_trait]
impl DocumentStore for CloudantStore {
    async fn ping(&self, db: &str) -> StoreResult<()> {
        self.send(self.client.get(self.url(db, ""))).await?;
        Ok(())
    }

    async fn find(&self, db: &str, query: &FindQuery) -> StoreResult<Vec<Document>> {
        let response = self
            .send(self.client.post(self.url(db, "_find")).json(query))
            .await?;
        let found: FindResponse = decode(response).await?;

        if let Some(warning) = found.warning {
            log::warn!("Query on '{}' returned a warning: {}", db, warning);
        }

        Ok(found.docs)
    }

    async fn all_docs(&self, db: &str) -> StoreResult<Vec<Document>> {
        let response = self
            .send(
                self.client
                    .get(self.url(db, "_all_docs"))
                    .query(&[("include_docs", "true")]),
            )
            .await?;
        let all: AllDocsResponse = decode(response).await?;

        Ok(all.rows.into_iter().filter_map(|row| row.doc).collect())
    }

    async fn insert(&self, db: &str, document: Document) -> StoreResult<DocumentRef> {
        let response = self
            .send(self.client.post(self.url(db, "")).json(&document))
            .await?;
        decode(response).await
    }
}
