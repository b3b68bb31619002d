//! Command implementations.

pub mod config;
pub mod export;
pub mod mappings;
pub mod show;

pub use config::run_config;
pub use export::run_export;
pub use mappings::{run_add, run_bulk_add, run_delete, run_list, run_update};
pub use show::run_show;

use std::sync::Arc;

use gm_mapping::{AuthorityError, AuthorityResult, ConfigPersistenceCoordinator, MappingSession};
use reqwest::Method;
use serde::Deserialize;

use crate::CliConfig;
use crate::authority::HttpAuthority;
use crate::output::ConsoleStatusListener;

/// API client for the remote configuration store.
pub struct ApiClient {
    client: reqwest::Client,
    base_url: String,
    token: Option<String>,
}

impl ApiClient {
    /// Creates a new API client.
    ///
    /// ## Errors
    ///
    /// Returns an error if the HTTP client cannot be built.
    pub fn new(
        config: &CliConfig,
        server_override: Option<&str>,
        token_override: Option<&str>,
    ) -> crate::CliResult<Self> {
        let server = config.effective_server(server_override);
        let base_url = format!(
            "{}{}",
            server.trim_end_matches('/'),
            config.api_prefix.trim_end_matches('/')
        );

        let client = reqwest::Client::builder()
            .timeout(config.timeout())
            .build()?;

        Ok(Self {
            client,
            base_url,
            token: config.effective_token(token_override),
        })
    }

    /// Returns the full URL of `path`.
    #[must_use]
    pub fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// Makes a GET request.
    ///
    /// ## Errors
    ///
    /// Returns the rejection or transport failure.
    pub async fn get<T: serde::de::DeserializeOwned>(&self, path: &str) -> AuthorityResult<T> {
        let response = send(self.request(Method::GET, path)).await?;
        handle_response(response).await
    }

    /// Makes a POST request, ignoring the response body.
    ///
    /// ## Errors
    ///
    /// Returns the rejection or transport failure.
    pub async fn post<B: serde::Serialize + Sync>(
        &self,
        path: &str,
        body: &B,
    ) -> AuthorityResult<()> {
        let response = send(self.request(Method::POST, path).json(body)).await?;
        handle_empty_response(response).await
    }

    /// Makes a PATCH request, ignoring the response body.
    ///
    /// ## Errors
    ///
    /// Returns the rejection or transport failure.
    pub async fn patch<B: serde::Serialize + Sync>(
        &self,
        path: &str,
        body: &B,
    ) -> AuthorityResult<()> {
        let response = send(self.request(Method::PATCH, path).json(body)).await?;
        handle_empty_response(response).await
    }

    /// Gets the base URL.
    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn request(&self, method: Method, path: &str) -> reqwest::RequestBuilder {
        let builder = self.client.request(method, self.url(path));
        match &self.token {
            Some(token) => builder.bearer_auth(token),
            None => builder,
        }
    }
}

async fn send(builder: reqwest::RequestBuilder) -> AuthorityResult<reqwest::Response> {
    builder
        .send()
        .await
        .map_err(|e| AuthorityError::transport(e.to_string()))
}

/// Handles a response with a body.
async fn handle_response<T: serde::de::DeserializeOwned>(
    response: reqwest::Response,
) -> AuthorityResult<T> {
    let status = response.status();

    if status.is_success() {
        response
            .json()
            .await
            .map_err(|e| AuthorityError::transport(format!("invalid response body: {e}")))
    } else {
        Err(rejection(status.as_u16(), response).await)
    }
}

/// Handles a response whose body is not needed.
async fn handle_empty_response(response: reqwest::Response) -> AuthorityResult<()> {
    let status = response.status();

    if status.is_success() {
        Ok(())
    } else {
        Err(rejection(status.as_u16(), response).await)
    }
}

async fn rejection(status: u16, response: reqwest::Response) -> AuthorityError {
    let body = response
        .text()
        .await
        .unwrap_or_else(|_| "Unknown error".to_string());
    AuthorityError::Rejected {
        status,
        messages: rejection_messages(&body),
    }
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    message: Option<String>,
    #[serde(default)]
    errors: Vec<ErrorDetail>,
}

#[derive(Debug, Deserialize)]
struct ErrorDetail {
    message: Option<String>,
}

/// Extracts the messages of an error response body.
///
/// Per-field messages are preferred, then the top-level message, then the
/// raw body.
#[must_use]
pub fn rejection_messages(body: &str) -> Vec<String> {
    if let Ok(parsed) = serde_json::from_str::<ErrorBody>(body) {
        let fields: Vec<String> = parsed
            .errors
            .into_iter()
            .filter_map(|e| e.message)
            .filter(|m| !m.is_empty())
            .collect();
        if !fields.is_empty() {
            return fields;
        }
        if let Some(message) = parsed.message.filter(|m| !m.is_empty()) {
            return vec![message];
        }
    }

    let raw = body.trim();
    if raw.is_empty() {
        vec!["Unknown error".to_string()]
    } else {
        vec![raw.to_string()]
    }
}

/// Connects to the remote store and opens a mapping session.
///
/// ## Errors
///
/// Returns an error if the client cannot be built or the configuration
/// cannot be fetched.
pub async fn open_session(
    config: &CliConfig,
    server: Option<&str>,
    token: Option<&str>,
) -> crate::CliResult<MappingSession<HttpAuthority>> {
    let client = ApiClient::new(config, server, token)?;
    tracing::debug!(base_url = client.base_url(), "Opening session");

    let authority = Arc::new(HttpAuthority::new(client));
    let coordinator = ConfigPersistenceCoordinator::new(authority, &config.settings.commit)
        .with_listener(Arc::new(ConsoleStatusListener));
    Ok(MappingSession::open(coordinator, &config.settings).await?)
}
