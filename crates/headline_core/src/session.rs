use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionId(pub String);

impl SessionId {
    pub fn new() -> Self {
        Self(uuid::Uuid::new_v4().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Default for SessionId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for SessionId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Lifecycle of one request/response cycle inside a session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionPhase {
    #[default]
    Idle,
    AwaitingResponse,
    Streaming,
    Finalized,
    Error,
}

impl SessionPhase {
    /// A request is outstanding; a new submit must be refused.
    pub fn is_in_flight(&self) -> bool {
        matches!(self, SessionPhase::AwaitingResponse | SessionPhase::Streaming)
    }

    pub fn accepts_submit(&self) -> bool {
        matches!(self, SessionPhase::Idle | SessionPhase::Finalized)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_session_id_new() {
        let id = SessionId::new();
        assert!(!id.0.is_empty());
        assert_eq!(id.as_str().len(), 36); // UUID format
    }

    #[test]
    fn test_session_id_display() {
        let id = SessionId::new();
        assert_eq!(format!("{}", id), id.as_str());
    }

    #[test]
    fn test_phase_default_is_idle() {
        assert_eq!(SessionPhase::default(), SessionPhase::Idle);
    }

    #[test]
    fn test_phase_in_flight() {
        assert!(SessionPhase::AwaitingResponse.is_in_flight());
        assert!(SessionPhase::Streaming.is_in_flight());
        assert!(!SessionPhase::Idle.is_in_flight());
        assert!(!SessionPhase::Error.is_in_flight());
    }

    #[test]
    fn test_phase_accepts_submit() {
        assert!(SessionPhase::Idle.accepts_submit());
        assert!(SessionPhase::Finalized.accepts_submit());
        assert!(!SessionPhase::Error.accepts_submit());
        assert!(!SessionPhase::Streaming.accepts_submit());
    }

    #[test]
    fn test_phase_serialization() {
        let json = serde_json::to_string(&SessionPhase::AwaitingResponse).unwrap();
        assert_eq!(json, "\"awaiting_response\"");
    }
}
