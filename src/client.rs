use std::sync::Arc;

#[cfg(feature = "metrics")]
use metrics::counter;
#[cfg(feature = "tracing")]
use tracing::instrument;

use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION, CONTENT_TYPE};
use tokio_util::sync::CancellationToken;

use crate::dispatch::{post_json, post_json_stream};
use crate::transport::reqwest_transport::ReqwestTransport;
use crate::transport::Transport;
use crate::types::{
    ChatRequest, ChatResponse, CompletionRequest, CompletionResponse, EmbeddingRequest,
    EmbeddingResponse,
};
use crate::{Error, Result};

/// Credential mode, fixed at construction. Selects which authentication
/// header the client sends on every request.
#[derive(Clone, Debug)]
pub enum Auth {
    /// `api-key: <token>` (shared key).
    ApiKey(String),
    /// `Authorization: Bearer <token>` (Azure Active Directory).
    BearerToken(String),
}

impl Auth {
    /// Build the full header set for one request: the JSON content type
    /// plus exactly one authentication scheme.
    fn headers(&self) -> Result<HeaderMap> {
        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));

        match self {
            Auth::ApiKey(key) => {
                let value = HeaderValue::from_str(key)
                    .map_err(|e| Error::Client(format!("invalid api key: {}", e)))?;
                headers.insert("api-key", value);
            }
            Auth::BearerToken(token) => {
                let value = HeaderValue::from_str(&format!("Bearer {}", token))
                    .map_err(|e| Error::Client(format!("invalid access token: {}", e)))?;
                headers.insert(AUTHORIZATION, value);
            }
        }
        Ok(headers)
    }
}

/// Client for one Azure OpenAI deployment.
///
/// Configuration is immutable after `build()`; the client is cheap to
/// clone and safe to share across tasks, since no state is carried
/// between calls.
#[derive(Clone)]
pub struct AzureOpenAIClient {
    transport: Arc<dyn Transport>,
    resource_name: String,
    deployment_name: String,
    api_version: String,
    auth: Auth,
}

impl AzureOpenAIClient {
    pub fn builder() -> AzureOpenAIClientBuilder {
        AzureOpenAIClientBuilder {
            resource_name: None,
            deployment_name: None,
            api_version: None,
            auth: None,
            transport: None,
        }
    }

    /// Fully-qualified URL for an operation path, carrying the
    /// api-version query parameter.
    fn endpoint(&self, path: &str) -> String {
        format!(
            "https://{}.openai.azure.com/openai/deployments/{}/{}?api-version={}",
            self.resource_name, self.deployment_name, path, self.api_version
        )
    }

    /// Text completion, single response.
    #[cfg_attr(feature = "tracing", instrument(skip(self, request)))]
    pub async fn completion(&self, request: &CompletionRequest) -> Result<CompletionResponse> {
        if request.stream {
            return Err(Error::StreamingRequested);
        }

        #[cfg(feature = "metrics")]
        counter!("azure_openai.requests_total", "operation" => "completion").increment(1);

        let url = self.endpoint("completions");
        post_json(self.transport.as_ref(), &url, self.auth.headers()?, request).await
    }

    /// Chat completion, single response.
    #[cfg_attr(feature = "tracing", instrument(skip(self, request)))]
    pub async fn chat_completion(&self, request: &ChatRequest) -> Result<ChatResponse> {
        if request.stream {
            return Err(Error::StreamingRequested);
        }

        #[cfg(feature = "metrics")]
        counter!("azure_openai.requests_total", "operation" => "chat_completion").increment(1);

        let url = self.endpoint("chat/completions");
        post_json(self.transport.as_ref(), &url, self.auth.headers()?, request).await
    }

    /// Embedding vectors for a batch of inputs.
    #[cfg_attr(feature = "tracing", instrument(skip(self, request)))]
    pub async fn embedding(&self, request: &EmbeddingRequest) -> Result<EmbeddingResponse> {
        #[cfg(feature = "metrics")]
        counter!("azure_openai.requests_total", "operation" => "embedding").increment(1);

        let url = self.endpoint("embeddings");
        post_json(self.transport.as_ref(), &url, self.auth.headers()?, request).await
    }

    /// Text completion as server-sent events. `sink` runs once per chunk,
    /// in arrival order, on the task driving the call; its error aborts
    /// the stream and is returned unchanged.
    #[cfg_attr(feature = "tracing", instrument(skip(self, request, token, sink)))]
    pub async fn completion_stream<F>(
        &self,
        request: &CompletionRequest,
        token: &CancellationToken,
        sink: F,
    ) -> Result<()>
    where
        F: FnMut(CompletionResponse) -> Result<()>,
    {
        if !request.stream {
            return Err(Error::NotStreaming);
        }

        #[cfg(feature = "metrics")]
        counter!("azure_openai.requests_total", "operation" => "completion_stream").increment(1);

        let url = self.endpoint("completions");
        post_json_stream(
            self.transport.as_ref(),
            &url,
            self.auth.headers()?,
            request,
            token,
            sink,
        )
        .await
    }

    /// Chat completion as server-sent events; see [`completion_stream`].
    ///
    /// [`completion_stream`]: AzureOpenAIClient::completion_stream
    #[cfg_attr(feature = "tracing", instrument(skip(self, request, token, sink)))]
    pub async fn chat_completion_stream<F>(
        &self,
        request: &ChatRequest,
        token: &CancellationToken,
        sink: F,
    ) -> Result<()>
    where
        F: FnMut(ChatResponse) -> Result<()>,
    {
        if !request.stream {
            return Err(Error::NotStreaming);
        }

        #[cfg(feature = "metrics")]
        counter!("azure_openai.requests_total", "operation" => "chat_completion_stream")
            .increment(1);

        let url = self.endpoint("chat/completions");
        post_json_stream(
            self.transport.as_ref(),
            &url,
            self.auth.headers()?,
            request,
            token,
            sink,
        )
        .await
    }
}

pub struct AzureOpenAIClientBuilder {
    resource_name: Option<String>,
    deployment_name: Option<String>,
    api_version: Option<String>,
    auth: Option<Auth>,
    transport: Option<Arc<dyn Transport>>,
}

impl AzureOpenAIClientBuilder {
    pub fn resource_name(mut self, resource_name: impl Into<String>) -> Self {
        self.resource_name = Some(resource_name.into());
        self
    }

    pub fn deployment_name(mut self, deployment_name: impl Into<String>) -> Self {
        self.deployment_name = Some(deployment_name.into());
        self
    }

    pub fn api_version(mut self, api_version: impl Into<String>) -> Self {
        self.api_version = Some(api_version.into());
        self
    }

    /// Authenticate with a shared API key.
    pub fn api_key(mut self, key: impl Into<String>) -> Self {
        self.auth = Some(Auth::ApiKey(key.into()));
        self
    }

    /// Authenticate with an Azure Active Directory bearer token.
    pub fn bearer_token(mut self, token: impl Into<String>) -> Self {
        self.auth = Some(Auth::BearerToken(token.into()));
        self
    }

    /// Replace the HTTP stack, e.g. with a mock for tests.
    pub fn transport(mut self, transport: Arc<dyn Transport>) -> Self {
        self.transport = Some(transport);
        self
    }

    #[cfg_attr(feature = "tracing", instrument(skip(self)))]
    pub fn build(self) -> Result<AzureOpenAIClient> {
        let resource_name = self
            .resource_name
            .ok_or_else(|| Error::Client("resource name is required".to_string()))?;
        let deployment_name = self
            .deployment_name
            .ok_or_else(|| Error::Client("deployment name is required".to_string()))?;
        let api_version = self
            .api_version
            .ok_or_else(|| Error::Client("api version is required".to_string()))?;
        let auth = self
            .auth
            .ok_or_else(|| Error::Client("an api key or bearer token is required".to_string()))?;

        let transport = match self.transport {
            Some(t) => t,
            None => Arc::new(ReqwestTransport::new()?),
        };

        Ok(AzureOpenAIClient {
            transport,
            resource_name,
            deployment_name,
            api_version,
            auth,
        })
    }
}
