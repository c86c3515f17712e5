//! Interaction Controller — turns user actions into state changes and backend calls.
//!
//! The controller owns the skill list and the session binding. Every action reads
//! what it needs from them once, at dispatch time, and the response handler works
//! only from that snapshot, so responses may complete in any order.
//!
//! Manual sessions are refreshed lazily: editing skills never talks to the
//! backend; the next extraction or generation call recreates the session first
//! when the skill list has moved on since the last one was created.
//!
//! The state lock is never held across an `.await`.

use std::collections::HashSet;
use std::fmt;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::{Duration, Instant};

use tracing::{debug, info, warn};

use crate::errors::{ActionError, ValidationError};
use crate::gateway::{BackendGateway, GenerateRoadmapRequest};
use crate::notice::Notifier;
use crate::role::TargetRole;
use crate::roadmap::render::DEFAULT_REVEAL_STEP;
use crate::roadmap::{render, PerformanceSummary, ProbeResult, RenderedRoadmap};
use crate::session::{Provenance, SessionBinding, SessionId};
use crate::skills::{AddOutcome, Skill, SkillSet};
use crate::upload::ResumeFile;

pub const DEFAULT_PROBE_INPUT: &str = "Test engineer with Python, SQL, and React experience";

/// Actions that talk to the backend. At most one of each kind is in flight;
/// generate and force-refresh share `Generate`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ActionKind {
    Upload,
    Extract,
    Generate,
    Probe,
}

impl fmt::Display for ActionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            ActionKind::Upload => "Resume upload",
            ActionKind::Extract => "Skill extraction",
            ActionKind::Generate => "Roadmap generation",
            ActionKind::Probe => "Performance test",
        })
    }
}

#[derive(Debug, Clone)]
pub enum Action {
    Upload(ResumeFile),
    AddSkills(String),
    RemoveSkill(String),
    Extract,
    Generate { role: String, force_refresh: bool },
    Probe { role: String, sample_input: Option<String> },
}

#[derive(Debug, Clone)]
pub enum Outcome {
    Uploaded(SessionId),
    SkillsAdded(AddOutcome),
    SkillRemoved(bool),
    Extracted(Vec<Skill>),
    Roadmap(RoadmapView),
    Probe(ProbeResult),
}

/// Everything the host needs to show a finished roadmap request.
#[derive(Debug, Clone)]
pub struct RoadmapView {
    /// The request exactly as it was sent.
    pub request: GenerateRoadmapRequest,
    pub rendered: RenderedRoadmap,
    pub resources: String,
    pub performance: Option<PerformanceSummary>,
    pub elapsed: Duration,
}

#[derive(Debug, Default)]
struct ControllerState {
    skills: SkillSet,
    session: SessionBinding,
    in_flight: HashSet<ActionKind>,
}

/// Dispatch-time copy of the state a request depends on.
struct Snapshot {
    skills: Vec<String>,
    joined: String,
    revision: u64,
    session: SessionBinding,
}

/// Marks an action kind as in flight until dropped.
struct InFlightGuard<'a> {
    state: &'a Mutex<ControllerState>,
    kind: ActionKind,
}

impl Drop for InFlightGuard<'_> {
    fn drop(&mut self) {
        let mut state = self.state.lock().unwrap_or_else(PoisonError::into_inner);
        state.in_flight.remove(&self.kind);
    }
}

pub struct InteractionController {
    gateway: Arc<dyn BackendGateway>,
    state: Mutex<ControllerState>,
    notifier: Notifier,
    reveal_step: Duration,
}

impl InteractionController {
    pub fn new(gateway: Arc<dyn BackendGateway>, notifier: Notifier) -> Self {
        Self {
            gateway,
            state: Mutex::new(ControllerState::default()),
            notifier,
            reveal_step: DEFAULT_REVEAL_STEP,
        }
    }

    pub fn with_reveal_step(mut self, step: Duration) -> Self {
        self.reveal_step = step;
        self
    }

    pub fn skills(&self) -> Vec<Skill> {
        self.lock().skills.list().to_vec()
    }

    pub fn session(&self) -> SessionBinding {
        self.lock().session.clone()
    }

    pub fn is_in_flight(&self, kind: ActionKind) -> bool {
        self.lock().in_flight.contains(&kind)
    }

    /// Routes a typed action to its handler.
    pub async fn dispatch(&self, action: Action) -> Result<Outcome, ActionError> {
        match action {
            Action::Upload(file) => self.upload_resume(file).await.map(Outcome::Uploaded),
            Action::AddSkills(raw) => Ok(Outcome::SkillsAdded(self.add_skills(&raw))),
            Action::RemoveSkill(skill) => Ok(Outcome::SkillRemoved(self.remove_skill(&skill))),
            Action::Extract => self.extract_skills().await.map(Outcome::Extracted),
            Action::Generate {
                role,
                force_refresh,
            } => self
                .generate_roadmap(&role, force_refresh)
                .await
                .map(Outcome::Roadmap),
            Action::Probe { role, sample_input } => self
                .run_performance_probe(&role, sample_input.as_deref())
                .await
                .map(Outcome::Probe),
        }
    }

    pub async fn upload_resume(&self, file: ResumeFile) -> Result<SessionId, ActionError> {
        let result = self.try_upload(&file).await;
        self.surface(result)
    }

    /// Adds whitespace-separated skills. Duplicates are reported as warnings only.
    pub fn add_skills(&self, raw_text: &str) -> AddOutcome {
        let outcome = self.lock().skills.add(raw_text);
        for duplicate in &outcome.duplicates {
            self.notifier
                .warning(format!("Skill \"{duplicate}\" already added!"));
        }
        if outcome.changed() {
            debug!(added = outcome.added.len(), "skills added");
        }
        outcome
    }

    pub fn remove_skill(&self, skill: &str) -> bool {
        self.lock().skills.remove(skill)
    }

    pub async fn extract_skills(&self) -> Result<Vec<Skill>, ActionError> {
        let result = self.try_extract().await;
        self.surface(result)
    }

    pub async fn generate_roadmap(
        &self,
        role: &str,
        force_refresh: bool,
    ) -> Result<RoadmapView, ActionError> {
        let result = self.try_generate(role, force_refresh).await;
        self.surface(result)
    }

    pub async fn run_performance_probe(
        &self,
        role: &str,
        sample_input: Option<&str>,
    ) -> Result<ProbeResult, ActionError> {
        let result = self.try_probe(role, sample_input).await;
        self.surface(result)
    }

    async fn try_upload(&self, file: &ResumeFile) -> Result<SessionId, ActionError> {
        let _guard = self.begin(ActionKind::Upload)?;
        file.validate()?;

        info!(file = %file.file_name, bytes = file.content.len(), "uploading resume");
        let id = self.gateway.upload_resume(file).await?;

        self.lock().session.bind_upload(id.clone());
        self.notifier.success("Resume uploaded successfully!");
        Ok(id)
    }

    async fn try_extract(&self) -> Result<Vec<Skill>, ActionError> {
        let _guard = self.begin(ActionKind::Extract)?;
        let snapshot = self.snapshot();
        if snapshot.session.provenance() == Provenance::None {
            return Err(ValidationError::NoSession.into());
        }

        let session_id = self.ensure_session(&snapshot).await?;
        let extracted = self.gateway.extract_skills(&session_id).await?;

        let skills = {
            let mut state = self.lock();
            state.skills.replace_all(&extracted);
            state.skills.list().to_vec()
        };
        info!(%session_id, count = skills.len(), "skills extracted");
        self.notifier.success(format!(
            "Extracted {} skills from your resume!",
            skills.len()
        ));
        Ok(skills)
    }

    async fn try_generate(
        &self,
        role: &str,
        force_refresh: bool,
    ) -> Result<RoadmapView, ActionError> {
        let _guard = self.begin(ActionKind::Generate)?;
        let role: TargetRole = role.parse()?;
        let snapshot = self.snapshot();
        if snapshot.skills.is_empty() {
            return Err(ValidationError::NoSkills.into());
        }

        if force_refresh {
            self.notifier.info("Forcing refresh - bypassing cache...");
        }
        let session_id = self.ensure_session(&snapshot).await?;

        let request = GenerateRoadmapRequest {
            skills: snapshot.skills,
            role,
            session_id,
            force_refresh,
        };
        info!(
            role = %request.role,
            session_id = %request.session_id,
            skills = request.skills.len(),
            force_refresh,
            "generating roadmap"
        );

        let started = Instant::now();
        let result = self.gateway.generate_roadmap(&request).await?;
        let elapsed = started.elapsed();

        let rendered = render(&result.phases, self.reveal_step);
        debug!(
            items = rendered.items().len(),
            elapsed_ms = elapsed.as_millis() as u64,
            "roadmap rendered"
        );

        Ok(RoadmapView {
            resources: result.resources_text().to_string(),
            performance: result
                .performance
                .as_ref()
                .map(|metrics| PerformanceSummary::new(metrics, elapsed)),
            rendered,
            request,
            elapsed,
        })
    }

    async fn try_probe(
        &self,
        role: &str,
        sample_input: Option<&str>,
    ) -> Result<ProbeResult, ActionError> {
        let _guard = self.begin(ActionKind::Probe)?;
        let role: TargetRole = role.parse()?;

        self.notifier.info("Running performance test...");
        let probe = self
            .gateway
            .run_performance_probe(sample_input.unwrap_or(DEFAULT_PROBE_INPUT), role)
            .await?;

        self.notifier.success(probe.headline());
        Ok(probe)
    }

    /// Returns the session to use for a request built from `snapshot`, creating
    /// a manual session first when the binding is missing or stale. On failure
    /// the binding is left untouched.
    async fn ensure_session(&self, snapshot: &Snapshot) -> Result<SessionId, ActionError> {
        if !snapshot.session.needs_manual_refresh(snapshot.revision) {
            if let Some(id) = snapshot.session.id() {
                return Ok(id.clone());
            }
        }
        if snapshot.skills.is_empty() {
            return Err(ValidationError::NoSession.into());
        }

        debug!(revision = snapshot.revision, "refreshing manual session");
        let id = self
            .gateway
            .create_manual_session(&snapshot.joined)
            .await
            .map_err(|e| {
                warn!("manual session creation failed: {e}");
                ActionError::NoSession(e)
            })?;

        let bound = {
            let mut state = self.lock();
            // An upload that finished meanwhile takes precedence over a manual snapshot.
            let bound = state.session.provenance() != Provenance::Upload;
            if bound {
                state.session.bind_manual(id.clone(), snapshot.revision);
            }
            bound
        };
        if bound {
            self.notifier.success("Manual skills session created!");
        }
        Ok(id)
    }

    fn begin(&self, kind: ActionKind) -> Result<InFlightGuard<'_>, ActionError> {
        if !self.lock().in_flight.insert(kind) {
            return Err(ActionError::Busy(kind));
        }
        Ok(InFlightGuard {
            state: &self.state,
            kind,
        })
    }

    fn snapshot(&self) -> Snapshot {
        let state = self.lock();
        Snapshot {
            skills: state.skills.to_vec(),
            joined: state.skills.joined(),
            revision: state.skills.revision(),
            session: state.session.clone(),
        }
    }

    /// Puts a failed action in front of the user. Never swallows the error.
    fn surface<T>(&self, result: Result<T, ActionError>) -> Result<T, ActionError> {
        if let Err(err) = &result {
            match err {
                ActionError::Validation(e) => self.notifier.warning(e.to_string()),
                ActionError::Busy(_) => self.notifier.warning(err.to_string()),
                ActionError::NoSession(_) => self
                    .notifier
                    .warning("Failed to create session for manual skills!"),
                ActionError::Gateway(e) => self.notifier.error(e.user_message()),
            }
            debug!(category = ?err.category(), retryable = err.is_retryable(), "action failed: {err}");
        }
        result
    }

    fn lock(&self) -> MutexGuard<'_, ControllerState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
