// ABOUTME: reqwest-backed implementation of the provider and identity token traits.
// ABOUTME: Performs exactly one HTTP request per call; no retries happen here.

use async_trait::async_trait;
use reqwest::header::{ACCEPT, AUTHORIZATION, CONTENT_TYPE, HeaderMap, HeaderValue};
use reqwest::{Client, Method, RequestBuilder};
use serde::Deserialize;
use serde::de::DeserializeOwned;
use snafu::ResultExt;
use std::time::Duration;

use super::error::{ApiError, DecodeSnafu, ResponseBody, StatusSnafu, TransportSnafu};
use super::traits::{IdTokenError, IdTokenProvider, PagesApi};
use crate::config::{Endpoints, IdTokenSource, Secret};
use crate::types::{
    Artifact, Deployment, DeploymentRequest, DeploymentStatus, RunArtifact, RunId, Workflow,
    WorkflowId, WorkflowRun,
};

const USER_AGENT: &str = concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION"));
const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Build the HTTP client shared by every remote call.
pub fn http_client() -> reqwest::Result<Client> {
    let mut headers = HeaderMap::new();
    headers.insert(
        ACCEPT,
        HeaderValue::from_static("application/vnd.github.v3+json"),
    );
    headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));

    Client::builder()
        .user_agent(USER_AGENT)
        .default_headers(headers)
        .timeout(REQUEST_TIMEOUT)
        .build()
}

/// Client for the hosting provider's REST API, bound to one repository.
pub struct GithubClient {
    http: Client,
    endpoints: Endpoints,
    token: Secret,
}

#[derive(Deserialize)]
struct WorkflowList {
    #[serde(default)]
    workflows: Vec<Workflow>,
}

#[derive(Deserialize)]
struct WorkflowRunList {
    #[serde(default)]
    workflow_runs: Vec<WorkflowRun>,
}

#[derive(Deserialize)]
struct ArtifactList {
    #[serde(default)]
    artifacts: Vec<Artifact>,
}

#[derive(Deserialize)]
struct RunArtifactList {
    #[serde(default)]
    value: Vec<RunArtifact>,
}

impl GithubClient {
    pub fn new(http: Client, endpoints: Endpoints, token: Secret) -> Self {
        Self {
            http,
            endpoints,
            token,
        }
    }

    fn request(&self, method: Method, url: &str) -> RequestBuilder {
        self.http
            .request(method, url)
            .header(AUTHORIZATION, format!("Bearer {}", self.token.expose()))
    }

    async fn get_json<T: DeserializeOwned>(&self, url: &str) -> Result<T, ApiError> {
        let body = send(self.request(Method::GET, url), url).await?;
        decode(url, &body)
    }
}

/// Send a request and return the body of a successful response.
async fn send(request: RequestBuilder, url: &str) -> Result<String, ApiError> {
    tracing::debug!(url, "sending request");

    let response = request.send().await.context(TransportSnafu { url })?;
    let status = response.status();
    let body = response.text().await.context(TransportSnafu { url })?;

    if !status.is_success() {
        return StatusSnafu {
            url,
            status: status.as_u16(),
            body: ResponseBody::parse(&body),
        }
        .fail();
    }

    Ok(body)
}

fn decode<T: DeserializeOwned>(url: &str, body: &str) -> Result<T, ApiError> {
    serde_json::from_str(body).context(DecodeSnafu { url })
}

#[async_trait]
impl PagesApi for GithubClient {
    async fn list_workflows(&self) -> Result<Vec<Workflow>, ApiError> {
        let list: WorkflowList = self.get_json(&self.endpoints.workflows()).await?;
        Ok(list.workflows)
    }

    async fn list_workflow_runs(
        &self,
        workflow_id: WorkflowId,
    ) -> Result<Vec<WorkflowRun>, ApiError> {
        let list: WorkflowRunList = self
            .get_json(&self.endpoints.workflow_runs(workflow_id))
            .await?;
        Ok(list.workflow_runs)
    }

    async fn list_artifacts(&self) -> Result<Vec<Artifact>, ApiError> {
        let list: ArtifactList = self.get_json(&self.endpoints.artifacts()).await?;
        Ok(list.artifacts)
    }

    async fn list_run_artifacts(&self, run_id: RunId) -> Result<Vec<RunArtifact>, ApiError> {
        let list: RunArtifactList = self
            .get_json(&self.endpoints.run_artifacts(run_id))
            .await?;
        Ok(list.value)
    }

    async fn create_deployment(
        &self,
        url: &str,
        request: &DeploymentRequest,
    ) -> Result<Deployment, ApiError> {
        let body = send(self.request(Method::POST, url).json(request), url).await?;
        decode(url, &body)
    }

    async fn deployment_status(&self, url: &str) -> Result<DeploymentStatus, ApiError> {
        self.get_json(url).await
    }

    async fn cancel_deployment(&self, url: &str) -> Result<(), ApiError> {
        send(self.request(Method::PUT, url).json(&serde_json::json!({})), url).await?;
        Ok(())
    }
}

/// Identity tokens from a fixed value or the pipeline's OIDC endpoint.
pub struct IdTokenClient {
    http: Client,
    source: IdTokenSource,
}

#[derive(Deserialize)]
struct IdTokenResponse {
    #[serde(default)]
    value: Option<String>,
}

impl IdTokenClient {
    pub fn new(http: Client, source: IdTokenSource) -> Self {
        Self { http, source }
    }
}

#[async_trait]
impl IdTokenProvider for IdTokenClient {
    async fn id_token(&self) -> Result<Secret, IdTokenError> {
        match &self.source {
            IdTokenSource::Provided(token) => Ok(token.clone()),
            IdTokenSource::Oidc {
                request_url,
                request_token,
            } => {
                let request = self.http.get(request_url).header(
                    AUTHORIZATION,
                    format!("Bearer {}", request_token.expose()),
                );
                let body = send(request, request_url).await?;
                let response: IdTokenResponse = decode(request_url, &body)?;
                response
                    .value
                    .filter(|v| !v.is_empty())
                    .map(Secret::new)
                    .ok_or(IdTokenError::Empty)
            }
            IdTokenSource::Unavailable => Err(IdTokenError::NotConfigured),
        }
    }
}
