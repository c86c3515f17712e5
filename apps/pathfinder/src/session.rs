use std::fmt;

use serde::{Deserialize, Serialize};

/// Opaque server-side session identifier.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SessionId(String);

impl SessionId {
    pub fn new(id: impl Into<String>) -> Self {
        SessionId(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Provenance {
    None,
    Upload,
    Manual,
}

/// Which server session the page is talking to, and where it came from.
///
/// A manual session is a snapshot of the skill list at `revision`; once the
/// skill list moves past that revision the server copy is stale and must be
/// recreated before the next extraction or generation call. Upload-derived
/// sessions are keyed by the resume, so skill edits never invalidate them.
///
/// There is no way back to `Unbound`: once bound, the binding is only ever
/// replaced.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum SessionBinding {
    #[default]
    Unbound,
    BoundUpload(SessionId),
    BoundManual { id: SessionId, revision: u64 },
}

impl SessionBinding {
    pub fn bind_upload(&mut self, id: SessionId) {
        *self = SessionBinding::BoundUpload(id);
    }

    pub fn bind_manual(&mut self, id: SessionId, revision: u64) {
        *self = SessionBinding::BoundManual { id, revision };
    }

    pub fn provenance(&self) -> Provenance {
        match self {
            SessionBinding::Unbound => Provenance::None,
            SessionBinding::BoundUpload(_) => Provenance::Upload,
            SessionBinding::BoundManual { .. } => Provenance::Manual,
        }
    }

    pub fn id(&self) -> Option<&SessionId> {
        match self {
            SessionBinding::Unbound => None,
            SessionBinding::BoundUpload(id) | SessionBinding::BoundManual { id, .. } => Some(id),
        }
    }

    /// Whether a manual session must be (re)created for a skill list at `current_revision`.
    pub fn needs_manual_refresh(&self, current_revision: u64) -> bool {
        match self {
            SessionBinding::Unbound => true,
            SessionBinding::BoundUpload(_) => false,
            SessionBinding::BoundManual { revision, .. } => *revision != current_revision,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unbound_needs_refresh() {
        let binding = SessionBinding::default();
        assert!(binding.needs_manual_refresh(0));
        assert_eq!(binding.provenance(), Provenance::None);
        assert!(binding.id().is_none());
    }

    #[test]
    fn test_upload_binding_never_goes_stale() {
        let mut binding = SessionBinding::default();
        binding.bind_upload(SessionId::new("sess1"));
        assert!(!binding.needs_manual_refresh(0));
        assert!(!binding.needs_manual_refresh(42));
        assert_eq!(binding.id().map(SessionId::as_str), Some("sess1"));
    }

    #[test]
    fn test_manual_binding_is_stale_after_revision_moves() {
        let mut binding = SessionBinding::default();
        binding.bind_manual(SessionId::new("manual_session_1"), 3);
        assert!(!binding.needs_manual_refresh(3));
        assert!(binding.needs_manual_refresh(4));

        binding.bind_manual(SessionId::new("manual_session_2"), 4);
        assert!(!binding.needs_manual_refresh(4));
        assert_eq!(binding.provenance(), Provenance::Manual);
    }

    #[test]
    fn test_upload_replaces_manual_binding() {
        let mut binding = SessionBinding::default();
        binding.bind_manual(SessionId::new("manual_session_1"), 1);
        binding.bind_upload(SessionId::new("session_99"));
        assert_eq!(binding.provenance(), Provenance::Upload);
        assert!(!binding.needs_manual_refresh(7));
    }
}
