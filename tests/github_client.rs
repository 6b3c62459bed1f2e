// ABOUTME: HTTP-level tests for GithubClient against a local axum server.
// ABOUTME: Checks request shape, headers and how responses map onto ApiError.

use axum::Router;
use axum::extract::State;
use axum::http::{HeaderMap, Method, StatusCode, Uri, header::AUTHORIZATION};
use pages_deployer::api::{ApiErrorKind, GithubClient, PagesApi, http_client};
use pages_deployer::config::{Endpoints, Secret};
use pages_deployer::deploy::{SubmissionError, SubmissionErrorKind};
use pages_deployer::types::{DeploymentRequest, DeploymentStatus, RunId};
use std::net::SocketAddr;
use std::sync::{Arc, Mutex};
use tokio::net::TcpListener;

const TOKEN: &str = "gh-token";
const BUILD_VERSION: &str = "deadbeef";

#[derive(Debug, Clone)]
struct Recorded {
    method: Method,
    uri: String,
    authorization: Option<String>,
    body: String,
}

/// Answers every request with the same canned response and records it.
struct Stub {
    status: StatusCode,
    body: String,
    requests: Mutex<Vec<Recorded>>,
}

impl Stub {
    fn requests(&self) -> Vec<Recorded> {
        self.requests.lock().unwrap().clone()
    }
}

async fn record(
    State(stub): State<Arc<Stub>>,
    method: Method,
    uri: Uri,
    headers: HeaderMap,
    body: String,
) -> (StatusCode, String) {
    let authorization = headers
        .get(AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .map(str::to_string);
    stub.requests.lock().unwrap().push(Recorded {
        method,
        uri: uri.to_string(),
        authorization,
        body,
    });
    (stub.status, stub.body.clone())
}

async fn serve(status: u16, body: &str) -> (Arc<Stub>, SocketAddr) {
    let stub = Arc::new(Stub {
        status: StatusCode::from_u16(status).unwrap(),
        body: body.to_string(),
        requests: Mutex::new(Vec::new()),
    });
    let app = Router::new().fallback(record).with_state(stub.clone());
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move { axum::serve(listener, app).await });
    (stub, addr)
}

fn client(addr: SocketAddr) -> (GithubClient, Endpoints) {
    let endpoints = Endpoints::new(
        &format!("http://{addr}"),
        &format!("http://{addr}/runtime/"),
        "octo/site".parse().unwrap(),
        BUILD_VERSION,
    );
    let client = GithubClient::new(http_client().unwrap(), endpoints.clone(), Secret::new(TOKEN));
    (client, endpoints)
}

fn request() -> DeploymentRequest {
    DeploymentRequest {
        artifact_url: "http://runtime.test/artifact".to_string(),
        pages_build_version: BUILD_VERSION.to_string(),
        oidc_token: "jwt".to_string(),
    }
}

mod requests {
    use super::*;

    #[tokio::test]
    async fn listing_sends_bearer_token_and_full_page_size() {
        let (stub, addr) = serve(
            200,
            r#"{"total_count":1,"workflows":[{"id":3,"name":"Build","path":".github/workflows/build.yml"}]}"#,
        )
        .await;
        let (client, _) = client(addr);

        let workflows = client.list_workflows().await.unwrap();

        assert_eq!(workflows.len(), 1);
        assert_eq!(workflows[0].name, "Build");
        let sent = stub.requests();
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0].method, Method::GET);
        assert_eq!(sent[0].uri, "/repos/octo/site/actions/workflows?per_page=100");
        assert_eq!(
            sent[0].authorization.as_deref(),
            Some(format!("Bearer {TOKEN}").as_str())
        );
    }

    #[tokio::test]
    async fn run_artifacts_come_from_the_runtime_service() {
        let (stub, addr) = serve(
            200,
            r#"{"count":1,"value":[{"name":"github-pages","url":"http://runtime.test/c/7"}]}"#,
        )
        .await;
        let (client, _) = client(addr);

        let listed = client.list_run_artifacts(RunId::new(77)).await.unwrap();

        assert_eq!(listed.len(), 1);
        assert_eq!(listed[0].url, "http://runtime.test/c/7");
        assert_eq!(
            stub.requests()[0].uri,
            "/runtime/_apis/pipelines/workflows/77/artifacts?api-version=6.0-preview"
        );
    }

    #[tokio::test]
    async fn create_posts_the_json_payload() {
        let (stub, addr) = serve(
            200,
            r#"{"status_url":"http://x/status","page_url":"https://octo.github.io/site/"}"#,
        )
        .await;
        let (client, endpoints) = client(addr);

        let deployment = client
            .create_deployment(&endpoints.deployment(), &request())
            .await
            .unwrap();

        assert_eq!(deployment.status_url, "http://x/status");
        let sent = &stub.requests()[0];
        assert_eq!(sent.method, Method::POST);
        assert_eq!(sent.uri, "/repos/octo/site/pages/deployment");
        let body: serde_json::Value = serde_json::from_str(&sent.body).unwrap();
        assert_eq!(body["pages_build_version"], BUILD_VERSION);
        assert_eq!(body["oidc_token"], "jwt");
    }

    #[tokio::test]
    async fn cancel_is_a_put_with_an_empty_object() {
        let (stub, addr) = serve(200, "").await;
        let (client, endpoints) = client(addr);

        client
            .cancel_deployment(&endpoints.deployment_cancel())
            .await
            .unwrap();

        let sent = &stub.requests()[0];
        assert_eq!(sent.method, Method::PUT);
        assert_eq!(sent.uri, "/repos/octo/site/pages/deployment/cancel/deadbeef");
        assert_eq!(sent.body, "{}");
    }

    #[tokio::test]
    async fn status_body_is_decoded() {
        let (_stub, addr) = serve(200, r#"{"status":"deployment_in_progress"}"#).await;
        let (client, endpoints) = client(addr);

        let status = client
            .deployment_status(&endpoints.deployment_status())
            .await
            .unwrap();

        assert_eq!(status, DeploymentStatus::named("deployment_in_progress"));
    }
}

mod failures {
    use super::*;

    #[tokio::test]
    async fn forbidden_create_is_a_status_error() {
        let (_stub, addr) = serve(403, r#"{"message":"Resource not accessible"}"#).await;
        let (client, endpoints) = client(addr);

        let err = client
            .create_deployment(&endpoints.deployment(), &request())
            .await
            .unwrap_err();

        assert_eq!(err.kind(), ApiErrorKind::Status);
        assert_eq!(err.response().map(|(s, _)| s), Some(403));
        let classified = SubmissionError::classify(err, BUILD_VERSION);
        assert_eq!(classified.kind(), SubmissionErrorKind::Forbidden);
    }

    #[tokio::test]
    async fn rejected_create_keeps_the_server_message() {
        let (_stub, addr) = serve(400, r#"{"message":"Artifact exceeds size"}"#).await;
        let (client, endpoints) = client(addr);

        let err = client
            .create_deployment(&endpoints.deployment(), &request())
            .await
            .unwrap_err();

        let (_, body) = err.response().unwrap();
        assert_eq!(body.message(), "Artifact exceeds size");
        let classified = SubmissionError::classify(err, BUILD_VERSION);
        assert_eq!(classified.kind(), SubmissionErrorKind::Rejected);
        assert!(classified.to_string().ends_with("Responded with: Artifact exceeds size"));
    }

    #[tokio::test]
    async fn malformed_success_body_is_a_decode_error() {
        let (_stub, addr) = serve(200, "<html>").await;
        let (client, _) = client(addr);

        let err = client.list_artifacts().await.unwrap_err();

        assert_eq!(err.kind(), ApiErrorKind::Decode);
    }

    #[tokio::test]
    async fn refused_connection_is_a_transport_error() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);
        let (client, endpoints) = client(addr);

        let err = client
            .create_deployment(&endpoints.deployment(), &request())
            .await
            .unwrap_err();

        assert_eq!(err.kind(), ApiErrorKind::Transport);
        assert!(err.response().is_none());
        let classified = SubmissionError::classify(err, BUILD_VERSION);
        assert_eq!(classified.kind(), SubmissionErrorKind::Transport);
    }
}
