//! Model listing against an OpenAI-compatible endpoint

use super::error::ApiError;
use reqwest::blocking::Client;
use serde::Deserialize;
use tracing::debug;

/// Default API base URL when no override is configured.
pub const OPENAI_API_BASE: &str = "https://api.openai.com/v1";

/// Environment variable consulted for a base-URL override.
pub const OPENAI_API_BASE_ENV: &str = "OPENAI_API_BASE";

#[derive(Debug, Deserialize)]
struct ModelEntry {
    id: String,
}

#[derive(Debug, Deserialize)]
struct ModelListResponse {
    data: Vec<ModelEntry>,
}

/// Blocking client for the model-listing endpoint.
pub struct ModelsClient {
    http: Client,
    api_base: String,
    api_key: String,
}

impl ModelsClient {
    /// Create a client for the given credential and base URL.
    pub fn new(api_key: impl Into<String>, api_base: impl Into<String>) -> Result<Self, ApiError> {
        let http = Client::builder().build()?;
        Ok(Self {
            http,
            api_base: api_base.into(),
            api_key: api_key.into(),
        })
    }

    /// List the model identifiers available to this credential, in the
    /// order the service returns them.
    pub fn list(&self) -> Result<Vec<String>, ApiError> {
        let url = format!("{}/models", self.api_base);
        debug!("listing models from {url}");

        let response = self.http.get(&url).bearer_auth(&self.api_key).send()?;

        let status = response.status();
        if !status.is_success() {
            let body = response.json().ok();
            return Err(ApiError::Status {
                status: status.as_u16(),
                body,
            });
        }

        let listing: ModelListResponse = response
            .json()
            .map_err(|e| ApiError::ResponseValidation {
                status: status.as_u16(),
                body: Some(serde_json::json!({ "message": e.to_string() })),
            })?;

        Ok(listing.data.into_iter().map(|m| m.id).collect())
    }
}

/// List available models for an API key.
///
/// The base URL comes from the `OPENAI_API_BASE` environment variable when
/// set, otherwise [`OPENAI_API_BASE`]. Only this path reads the variable.
pub fn get_available_models(api_key: &str) -> Result<Vec<String>, ApiError> {
    let api_base =
        std::env::var(OPENAI_API_BASE_ENV).unwrap_or_else(|_| OPENAI_API_BASE.to_string());
    ModelsClient::new(api_key, api_base)?.list()
}
