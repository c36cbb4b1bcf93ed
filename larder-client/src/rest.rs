//! REST client for the recipe backend.

use std::time::Duration;

use async_trait::async_trait;
use larder_core::{
    BackendError, BackendResult, CancelSignal, PantryItem, RecipeBackend, RecipeSummary,
    SearchMode, SearchQuery,
};
use reqwest::header::{HeaderMap, HeaderValue, COOKIE};
use reqwest::StatusCode;
use serde::{Deserialize, Serialize};

use crate::config::ClientConfig;

#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),
    #[error("Serialization error: {0}")]
    Serde(#[from] serde_json::Error),
    #[error("HTTP {status}: {message}")]
    Status { status: u16, message: String },
    #[error("Request rejected: {0}")]
    Rejected(String),
    #[error("Config error: {0}")]
    Config(String),
}

/// Convert ClientError to BackendError at the trait seam.
impl From<ClientError> for BackendError {
    fn from(e: ClientError) -> Self {
        match e {
            ClientError::Http(err) if err.is_decode() => BackendError::InvalidResponse {
                reason: err.to_string(),
            },
            ClientError::Http(err) => BackendError::Transport {
                reason: err.to_string(),
            },
            ClientError::Serde(err) => BackendError::InvalidResponse {
                reason: err.to_string(),
            },
            ClientError::Status { status, message } => BackendError::Status { status, message },
            ClientError::Rejected(message) => BackendError::Rejected { message },
            ClientError::Config(reason) => BackendError::Transport { reason },
        }
    }
}

/// The `{success, ...}` wrapper every endpoint answers with.
///
/// Only the fields this client reads are declared; a missing `success`
/// counts as success.
#[derive(Debug, Default, Deserialize)]
struct Envelope {
    #[serde(default = "default_success")]
    success: bool,
    #[serde(default)]
    message: Option<String>,
    #[serde(default)]
    user: Option<String>,
    #[serde(default)]
    recipes: Option<Vec<RecipeSummary>>,
    #[serde(default)]
    items: Option<Vec<PantryItem>>,
}

fn default_success() -> bool {
    true
}

impl Envelope {
    fn into_success(self) -> Result<Self, ClientError> {
        if self.success {
            Ok(self)
        } else {
            Err(ClientError::Rejected(
                self.message
                    .unwrap_or_else(|| "request was not successful".to_string()),
            ))
        }
    }
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    message: Option<String>,
}

#[derive(Serialize)]
struct CategoryParams<'a> {
    name: &'a str,
    page: u32,
}

#[derive(Serialize)]
struct PantryUpdate<'a> {
    items: &'a [PantryItem],
}

#[derive(Clone)]
pub struct RestClient {
    client: reqwest::Client,
    base_url: String,
    session_header: HeaderMap,
}

impl RestClient {
    pub fn new(config: &ClientConfig) -> Result<Self, ClientError> {
        config
            .validate()
            .map_err(|e| ClientError::Config(e.to_string()))?;

        let timeout = Duration::from_millis(config.request_timeout_ms);
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .cookie_store(true)
            .build()?;

        let session_header = build_session_headers(config.session_cookie.as_deref())?;
        Ok(Self {
            client,
            base_url: config.api_base_url.trim().trim_end_matches('/').to_string(),
            session_header,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn search_path(mode: SearchMode) -> &'static str {
        match mode {
            SearchMode::All => "/api/recipes/search",
            SearchMode::ByIngredients => "/api/recipes/search/ingredients",
            SearchMode::ByName => "/api/recipes/search/name",
        }
    }

    async fn get_json<Q>(&self, path: &str, query: Option<&Q>) -> Result<Envelope, ClientError>
    where
        Q: Serialize + ?Sized,
    {
        let url = format!("{}{}", self.base_url, path);
        let mut request = self.client.get(url).headers(self.session_header.clone());
        if let Some(query) = query {
            request = request.query(query);
        }
        let response = request.send().await?;
        self.parse_response(response).await
    }

    async fn post_json<B>(&self, path: &str, body: &B) -> Result<Envelope, ClientError>
    where
        B: Serialize + ?Sized,
    {
        let url = format!("{}{}", self.base_url, path);
        let response = self
            .client
            .post(url)
            .headers(self.session_header.clone())
            .json(body)
            .send()
            .await?;
        self.parse_response(response).await
    }

    async fn parse_response(&self, response: reqwest::Response) -> Result<Envelope, ClientError> {
        let status = response.status();
        let text = response.text().await?;
        if status.is_success() {
            if text.trim().is_empty() {
                return Ok(Envelope {
                    success: true,
                    ..Envelope::default()
                });
            }
            Ok(serde_json::from_str::<Envelope>(&text)?)
        } else {
            let message = serde_json::from_str::<ErrorBody>(&text)
                .ok()
                .and_then(|body| body.message)
                .unwrap_or_else(|| format!("HTTP error! status: {}", status.as_u16()));
            Err(ClientError::Status {
                status: status.as_u16(),
                message,
            })
        }
    }

    async fn recipes_at(&self, path: &str) -> Result<Vec<RecipeSummary>, ClientError> {
        let envelope = self.get_json::<()>(path, None).await?.into_success()?;
        Ok(envelope.recipes.unwrap_or_default())
    }
}

#[async_trait]
impl RecipeBackend for RestClient {
    async fn whoami(&self) -> BackendResult<Option<String>> {
        match self.get_json::<()>("/api/auth/whoami", None).await {
            Ok(envelope) if envelope.success => {
                Ok(envelope.user.filter(|user| !user.trim().is_empty()))
            }
            Ok(_) => Ok(None),
            Err(ClientError::Status { status, .. })
                if status == StatusCode::UNAUTHORIZED.as_u16() =>
            {
                Ok(None)
            }
            Err(err) => Err(err.into()),
        }
    }

    async fn search(
        &self,
        query: &SearchQuery,
        cancel: &CancelSignal,
    ) -> BackendResult<Vec<RecipeSummary>> {
        let path = Self::search_path(query.mode);
        tracing::debug!(
            path,
            term = %query.term,
            page = query.page,
            per_page = query.per_page,
            "Dispatching search"
        );
        let envelope = cancel.guard(self.get_json(path, Some(query))).await??;
        let envelope = envelope.into_success()?;
        Ok(envelope.recipes.unwrap_or_default())
    }

    async fn recommendations(&self) -> BackendResult<Vec<RecipeSummary>> {
        Ok(self.recipes_at("/api/recipes/recommendations").await?)
    }

    async fn category(&self, name: &str) -> BackendResult<Vec<RecipeSummary>> {
        let params = CategoryParams { name, page: 1 };
        let envelope = self
            .get_json("/api/recipes/category", Some(&params))
            .await?
            .into_success()?;
        Ok(envelope.recipes.unwrap_or_default())
    }

    async fn random_recipes(&self) -> BackendResult<Vec<RecipeSummary>> {
        Ok(self.recipes_at("/api/recipes/random").await?)
    }

    async fn pantry_items(&self) -> BackendResult<Vec<PantryItem>> {
        let envelope = self
            .get_json::<()>("/api/pantry/items", None)
            .await?
            .into_success()?;
        Ok(envelope.items.unwrap_or_default())
    }

    async fn update_pantry(&self, items: &[PantryItem]) -> BackendResult<()> {
        self.post_json("/api/pantry/items", &PantryUpdate { items })
            .await?
            .into_success()?;
        Ok(())
    }
}

fn build_session_headers(cookie: Option<&str>) -> Result<HeaderMap, ClientError> {
    let mut headers = HeaderMap::new();
    if let Some(cookie) = cookie {
        headers.insert(
            COOKIE,
            HeaderValue::from_str(cookie.trim()).map_err(|e| ClientError::Config(e.to_string()))?,
        );
    }
    Ok(headers)
}
