/// Backend Gateway — the single point of contact with the roadmap backend.
///
/// ARCHITECTURAL RULE: No other module may issue HTTP requests.
/// Every exchange goes through `BackendGateway`, so the controller can be driven
/// by an in-memory gateway in tests.
///
/// There are no automatic retries and no client-side cache: a failed exchange is
/// reported once and the user decides whether to repeat it.
use std::fmt;
use std::time::{Duration, Instant};

use async_trait::async_trait;
use reqwest::multipart::{Form, Part};
use reqwest::{Client, RequestBuilder};
use serde::de::DeserializeOwned;
use thiserror::Error;
use tracing::{debug, warn};
use uuid::Uuid;

use crate::role::TargetRole;
use crate::roadmap::{ProbeResult, RoadmapResult};
use crate::session::SessionId;
use crate::upload::ResumeFile;

pub mod wire;

pub use wire::GenerateRoadmapRequest;
use wire::{
    decode_envelope, ExtractRequest, ManualSessionRequest, ProbePayload, ProbeRequest,
    SessionPayload, SkillsPayload,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Endpoint {
    Upload,
    Extraction,
    Session,
    Roadmap,
    Probe,
}

impl Endpoint {
    pub fn path(&self) -> &'static str {
        match self {
            Endpoint::Upload => "/upload-resume",
            Endpoint::Extraction => "/extract-skills",
            Endpoint::Session => "/create-manual-session",
            Endpoint::Roadmap => "/generate-roadmap",
            Endpoint::Probe => "/performance-test",
        }
    }

    /// Name of the failure kind callers match on.
    pub fn error_kind(&self) -> &'static str {
        match self {
            Endpoint::Upload => "UploadError",
            Endpoint::Extraction => "ExtractionError",
            Endpoint::Session => "SessionError",
            Endpoint::Roadmap => "RoadmapError",
            Endpoint::Probe => "ProbeError",
        }
    }

    /// Message shown when the backend rejects a request without saying why.
    fn fallback_message(&self) -> &'static str {
        match self {
            Endpoint::Upload => "Upload failed",
            Endpoint::Extraction => "Could not extract skills.",
            Endpoint::Session => "Could not create a manual skills session.",
            Endpoint::Roadmap => "Could not generate roadmap.",
            Endpoint::Probe => "Performance test failed",
        }
    }
}

impl fmt::Display for Endpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Endpoint::Upload => "Resume upload",
            Endpoint::Extraction => "Skill extraction",
            Endpoint::Session => "Manual session creation",
            Endpoint::Roadmap => "Roadmap generation",
            Endpoint::Probe => "Performance test",
        })
    }
}

/// The exchange never produced a usable JSON body.
#[derive(Debug, Error)]
pub enum TransportError {
    #[error("network error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("HTTP {status} with a non-JSON body")]
    Status { status: u16 },

    #[error("response body is not JSON: {0}")]
    Body(#[from] serde_json::Error),
}

#[derive(Debug, Error)]
pub enum GatewayFailure {
    #[error(transparent)]
    Transport(#[from] TransportError),

    /// The backend answered `success:false`.
    #[error("{message}")]
    Rejected { status: u16, message: String },

    /// JSON came back, but not in the documented shape.
    #[error("malformed response: {detail}")]
    Malformed { detail: String },
}

#[derive(Debug, Error)]
#[error("{endpoint} failed: {failure}")]
pub struct GatewayError {
    pub endpoint: Endpoint,
    #[source]
    pub failure: GatewayFailure,
}

impl GatewayError {
    pub fn new(endpoint: Endpoint, failure: impl Into<GatewayFailure>) -> Self {
        Self {
            endpoint,
            failure: failure.into(),
        }
    }

    pub fn kind(&self) -> &'static str {
        self.endpoint.error_kind()
    }

    /// Transport failures are worth retrying unchanged; application failures are not.
    pub fn is_transport(&self) -> bool {
        matches!(self.failure, GatewayFailure::Transport(_))
    }

    /// The text to put in front of the user.
    pub fn user_message(&self) -> String {
        match &self.failure {
            GatewayFailure::Rejected { message, .. } => format!("Error: {message}"),
            GatewayFailure::Transport(e) => format!("Network error: {e}"),
            GatewayFailure::Malformed { .. } => {
                format!("Error: {}", self.endpoint.fallback_message())
            }
        }
    }
}

/// The five backend exchanges. Implemented over HTTP by [`HttpGateway`].
#[async_trait]
pub trait BackendGateway: Send + Sync {
    async fn upload_resume(&self, file: &ResumeFile) -> Result<SessionId, GatewayError>;

    async fn extract_skills(&self, session_id: &SessionId) -> Result<Vec<String>, GatewayError>;

    async fn create_manual_session(&self, skill_text: &str) -> Result<SessionId, GatewayError>;

    async fn generate_roadmap(
        &self,
        request: &GenerateRoadmapRequest,
    ) -> Result<RoadmapResult, GatewayError>;

    async fn run_performance_probe(
        &self,
        sample_input: &str,
        role: TargetRole,
    ) -> Result<ProbeResult, GatewayError>;
}

#[derive(Clone)]
pub struct HttpGateway {
    client: Client,
    base_url: String,
}

impl HttpGateway {
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self, reqwest::Error> {
        Ok(Self {
            client: Client::builder().timeout(timeout).build()?,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    fn post(&self, endpoint: Endpoint) -> RequestBuilder {
        self.client
            .post(format!("{}{}", self.base_url, endpoint.path()))
    }

    /// Sends one request and decodes the `{success, ...}` envelope.
    async fn exchange<T: DeserializeOwned>(
        &self,
        endpoint: Endpoint,
        request: RequestBuilder,
    ) -> Result<T, GatewayError> {
        let request_id = Uuid::new_v4();
        let started = Instant::now();

        let response = request
            .header("x-request-id", request_id.to_string())
            .send()
            .await
            .map_err(|e| {
                warn!(%request_id, endpoint = endpoint.path(), "request failed: {e}");
                GatewayError::new(endpoint, TransportError::Http(e))
            })?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| GatewayError::new(endpoint, TransportError::Http(e)))?;

        debug!(
            %request_id,
            endpoint = endpoint.path(),
            status = status.as_u16(),
            elapsed_ms = started.elapsed().as_millis() as u64,
            "backend exchange finished"
        );

        decode_envelope(status, &body, endpoint.fallback_message()).map_err(|failure| {
            warn!(%request_id, endpoint = endpoint.path(), "{failure}");
            GatewayError::new(endpoint, failure)
        })
    }
}

#[async_trait]
impl BackendGateway for HttpGateway {
    async fn upload_resume(&self, file: &ResumeFile) -> Result<SessionId, GatewayError> {
        let endpoint = Endpoint::Upload;
        let mime = file.mime_type().unwrap_or("application/octet-stream");
        let part = Part::bytes(file.content.to_vec())
            .file_name(file.file_name.clone())
            .mime_str(mime)
            .map_err(|e| GatewayError::new(endpoint, TransportError::Http(e)))?;
        let form = Form::new().part("resume", part);

        let payload: SessionPayload = self
            .exchange(endpoint, self.post(endpoint).multipart(form))
            .await?;
        Ok(payload.session_id)
    }

    async fn extract_skills(&self, session_id: &SessionId) -> Result<Vec<String>, GatewayError> {
        let endpoint = Endpoint::Extraction;
        let payload: SkillsPayload = self
            .exchange(
                endpoint,
                self.post(endpoint).json(&ExtractRequest { session_id }),
            )
            .await?;
        Ok(payload.skills)
    }

    async fn create_manual_session(&self, skill_text: &str) -> Result<SessionId, GatewayError> {
        let endpoint = Endpoint::Session;
        let payload: SessionPayload = self
            .exchange(
                endpoint,
                self.post(endpoint)
                    .json(&ManualSessionRequest { skills: skill_text }),
            )
            .await?;
        Ok(payload.session_id)
    }

    async fn generate_roadmap(
        &self,
        request: &GenerateRoadmapRequest,
    ) -> Result<RoadmapResult, GatewayError> {
        let endpoint = Endpoint::Roadmap;
        self.exchange(endpoint, self.post(endpoint).json(request))
            .await
    }

    async fn run_performance_probe(
        &self,
        sample_input: &str,
        role: TargetRole,
    ) -> Result<ProbeResult, GatewayError> {
        let endpoint = Endpoint::Probe;
        let payload: ProbePayload = self
            .exchange(
                endpoint,
                self.post(endpoint).json(&ProbeRequest {
                    input: sample_input,
                    role,
                }),
            )
            .await?;
        Ok(payload.performance_comparison)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::{Arc, Mutex};

    use axum::extract::{Multipart, State};
    use axum::http::StatusCode;
    use axum::routing::post;
    use axum::{Json, Router};
    use serde_json::{json, Value};

    type Calls = Arc<Mutex<Vec<(String, Value)>>>;

    async fn spawn_backend(router: Router) -> String {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, router).await.unwrap();
        });
        format!("http://{addr}")
    }

    fn gateway(base_url: &str) -> HttpGateway {
        HttpGateway::new(base_url, Duration::from_secs(5)).unwrap()
    }

    fn record(calls: &Calls, path: &str, body: Value) {
        calls.lock().unwrap().push((path.to_string(), body));
    }

    /// A well-behaved backend that records every request body it receives.
    fn happy_backend(calls: Calls) -> Router {
        Router::new()
            .route(
                "/upload-resume",
                post(|State(calls): State<Calls>, mut form: Multipart| async move {
                    while let Some(field) = form.next_field().await.unwrap() {
                        let name = field.name().unwrap_or_default().to_string();
                        let file_name = field.file_name().unwrap_or_default().to_string();
                        let content_type = field.content_type().unwrap_or_default().to_string();
                        let bytes = field.bytes().await.unwrap();
                        record(
                            &calls,
                            "/upload-resume",
                            json!({
                                "field": name,
                                "file_name": file_name,
                                "content_type": content_type,
                                "content": String::from_utf8_lossy(&bytes),
                            }),
                        );
                    }
                    Json(json!({"success": true, "session_id": "sess1"}))
                }),
            )
            .route(
                "/extract-skills",
                post(|State(calls): State<Calls>, Json(body): Json<Value>| async move {
                    record(&calls, "/extract-skills", body);
                    Json(json!({"success": true, "skills": ["Python", "SQL"]}))
                }),
            )
            .route(
                "/create-manual-session",
                post(|State(calls): State<Calls>, Json(body): Json<Value>| async move {
                    record(&calls, "/create-manual-session", body);
                    Json(json!({"success": true, "session_id": "manual_session_1"}))
                }),
            )
            .route(
                "/generate-roadmap",
                post(|State(calls): State<Calls>, Json(body): Json<Value>| async move {
                    record(&calls, "/generate-roadmap", body);
                    Json(json!({
                        "success": true,
                        "roadmap": [{
                            "phase": "Phase 1: Foundations",
                            "skills": [{
                                "skill": "Statistics",
                                "course": {
                                    "title": "Intro to Statistics",
                                    "url": "https://example.com/stats",
                                    "platform": "Coursera",
                                    "reason": "Core for modeling"
                                }
                            }]
                        }],
                        "resources": "Check Kaggle",
                        "performance": {"generation_time": 1.2, "cache_hit_ratio": 0.5}
                    }))
                }),
            )
            .route(
                "/performance-test",
                post(|State(calls): State<Calls>, Json(body): Json<Value>| async move {
                    record(&calls, "/performance-test", body);
                    Json(json!({
                        "success": true,
                        "performance_comparison": {
                            "optimized_time": 3.0,
                            "cached_time": 0.1,
                            "cache_speedup": 30.0,
                            "performance_summary": {"cache_hit_ratio": 1.0}
                        }
                    }))
                }),
            )
            .with_state(calls)
    }

    #[tokio::test]
    async fn test_upload_posts_resume_field() {
        let calls = Calls::default();
        let url = spawn_backend(happy_backend(calls.clone())).await;

        let file = ResumeFile::new("cv.pdf", "%PDF-1.4");
        let id = gateway(&url).upload_resume(&file).await.unwrap();
        assert_eq!(id.as_str(), "sess1");

        let calls = calls.lock().unwrap();
        assert_eq!(calls.len(), 1);
        assert_eq!(
            calls[0].1,
            json!({
                "field": "resume",
                "file_name": "cv.pdf",
                "content_type": "application/pdf",
                "content": "%PDF-1.4"
            })
        );
    }

    #[tokio::test]
    async fn test_json_endpoints_send_documented_bodies() {
        let calls = Calls::default();
        let url = spawn_backend(happy_backend(calls.clone())).await;
        let gw = gateway(&url);

        let skills = gw.extract_skills(&SessionId::new("sess1")).await.unwrap();
        assert_eq!(skills, vec!["Python", "SQL"]);

        let manual = gw.create_manual_session("Go Rust").await.unwrap();
        assert_eq!(manual.as_str(), "manual_session_1");

        let request = GenerateRoadmapRequest {
            skills: skills.clone(),
            role: TargetRole::DataScientist,
            session_id: SessionId::new("sess1"),
            force_refresh: true,
        };
        let roadmap = gw.generate_roadmap(&request).await.unwrap();
        assert_eq!(roadmap.phases.len(), 1);
        assert_eq!(roadmap.resources_text(), "Check Kaggle");
        assert_eq!(
            roadmap.performance.and_then(|p| p.generation_time),
            Some(1.2)
        );

        let probe = gw
            .run_performance_probe("Test engineer", TargetRole::MlEngineer)
            .await
            .unwrap();
        assert_eq!(probe.speedup_factor, 30.0);

        let calls = calls.lock().unwrap();
        let bodies: Vec<_> = calls.iter().map(|(p, b)| (p.as_str(), b.clone())).collect();
        assert_eq!(
            bodies,
            vec![
                ("/extract-skills", json!({"session_id": "sess1"})),
                ("/create-manual-session", json!({"skills": "Go Rust"})),
                (
                    "/generate-roadmap",
                    json!({
                        "skills": ["Python", "SQL"],
                        "role": "data-scientist",
                        "session_id": "sess1",
                        "force_refresh": true
                    })
                ),
                (
                    "/performance-test",
                    json!({"input": "Test engineer", "role": "ml-engineer"})
                ),
            ]
        );
    }

    #[tokio::test]
    async fn test_application_failure_keeps_server_message() {
        let router = Router::new().route(
            "/generate-roadmap",
            post(|| async {
                (
                    StatusCode::NOT_FOUND,
                    Json(json!({"success": false, "error": "Session file not found"})),
                )
            }),
        );
        let url = spawn_backend(router).await;

        let request = GenerateRoadmapRequest {
            skills: vec!["Go".to_string()],
            role: TargetRole::DevopsEngineer,
            session_id: SessionId::new("gone"),
            force_refresh: false,
        };
        let err = gateway(&url).generate_roadmap(&request).await.unwrap_err();
        assert_eq!(err.kind(), "RoadmapError");
        assert!(!err.is_transport());
        assert_eq!(err.user_message(), "Error: Session file not found");
    }

    #[tokio::test]
    async fn test_non_json_error_page_is_transport_failure() {
        let router = Router::new().route(
            "/extract-skills",
            post(|| async { (StatusCode::INTERNAL_SERVER_ERROR, "Internal Server Error") }),
        );
        let url = spawn_backend(router).await;

        let err = gateway(&url)
            .extract_skills(&SessionId::new("sess1"))
            .await
            .unwrap_err();
        assert_eq!(err.kind(), "ExtractionError");
        assert!(err.is_transport());
    }

    #[tokio::test]
    async fn test_unreachable_backend_is_transport_failure() {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        let err = gateway(&format!("http://{addr}/"))
            .create_manual_session("Go")
            .await
            .unwrap_err();
        assert_eq!(err.kind(), "SessionError");
        assert!(err.is_transport());
        assert!(matches!(
            err.failure,
            GatewayFailure::Transport(TransportError::Http(_))
        ));
    }

    #[tokio::test]
    async fn test_upload_success_without_session_id_is_malformed() {
        let router = Router::new().route(
            "/upload-resume",
            post(|| async { Json(json!({"success": true})) }),
        );
        let url = spawn_backend(router).await;

        let err = gateway(&url)
            .upload_resume(&ResumeFile::new("cv.docx", "doc"))
            .await
            .unwrap_err();
        assert_eq!(err.kind(), "UploadError");
        assert!(matches!(err.failure, GatewayFailure::Malformed { .. }));
        assert_eq!(err.user_message(), "Error: Upload failed");
    }
}
