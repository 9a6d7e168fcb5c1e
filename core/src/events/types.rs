use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::error::PreloadError;
use crate::state::SessionHandle;

/// Status events observable by consumers (loading indicators, audit logs).
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "type")]
pub enum PreloadEvent {
    #[serde(rename = "preload.started")]
    Started {
        session_id: String,
        location: String,
        ts: DateTime<Utc>,
    },

    /// Also emitted for a superseded session so any loading indicator clears;
    /// `elapsed_ms` is absent in that case.
    #[serde(rename = "preload.finished")]
    Finished {
        session_id: String,
        location: String,
        #[serde(skip_serializing_if = "Option::is_none")]
        elapsed_ms: Option<u64>,
        superseded: bool,
        ts: DateTime<Utc>,
    },

    #[serde(rename = "preload.failed")]
    Failed {
        session_id: String,
        location: String,
        error: String,
        code: u16,
        ts: DateTime<Utc>,
    },
}

impl PreloadEvent {
    pub fn started(session: &SessionHandle) -> Self {
        Self::Started {
            session_id: session.id().to_string(),
            location: session.location().url(),
            ts: Utc::now(),
        }
    }

    pub fn finished(session: &SessionHandle, elapsed: Duration) -> Self {
        Self::Finished {
            session_id: session.id().to_string(),
            location: session.location().url(),
            elapsed_ms: Some(elapsed.as_millis() as u64),
            superseded: false,
            ts: Utc::now(),
        }
    }

    pub fn superseded(session: &SessionHandle) -> Self {
        Self::Finished {
            session_id: session.id().to_string(),
            location: session.location().url(),
            elapsed_ms: None,
            superseded: true,
            ts: Utc::now(),
        }
    }

    pub fn failed(session: &SessionHandle, error: &PreloadError) -> Self {
        Self::Failed {
            session_id: session.id().to_string(),
            location: session.location().url(),
            error: error.to_string(),
            code: error.error_code().as_u16(),
            ts: Utc::now(),
        }
    }

    pub fn kind(&self) -> &'static str {
        match self {
            Self::Started { .. } => "preload.started",
            Self::Finished { .. } => "preload.finished",
            Self::Failed { .. } => "preload.failed",
        }
    }

    pub fn session_id(&self) -> &str {
        match self {
            Self::Started { session_id, .. }
            | Self::Finished { session_id, .. }
            | Self::Failed { session_id, .. } => session_id,
        }
    }

    pub fn is_superseded(&self) -> bool {
        matches!(self, Self::Finished { superseded: true, .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::location::Location;

    #[test]
    fn test_serialized_shape() {
        let session = SessionHandle::new(Location::parse("/users/1?tab=a"));
        let value = serde_json::to_value(PreloadEvent::superseded(&session)).unwrap();

        assert_eq!(value["type"], "preload.finished");
        assert_eq!(value["location"], "/users/1?tab=a");
        assert_eq!(value["superseded"], true);
        assert!(value.get("elapsed_ms").is_none());
    }

    #[test]
    fn test_failed_event_carries_code() {
        let session = SessionHandle::new(Location::new("/"));
        let event = PreloadEvent::failed(&session, &PreloadError::configuration("a", "b"));
        assert_eq!(event.kind(), "preload.failed");
        assert_eq!(event.session_id(), session.id());
        match event {
            PreloadEvent::Failed { code, .. } => assert_eq!(code, 20),
            other => panic!("unexpected event: {other:?}"),
        }
    }
}
